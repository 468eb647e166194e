use std::fs;
use std::path::PathBuf;

use anyhow::{Context, bail};

use roster_terminal::calendar::{format_display_date, today};
use roster_terminal::config::AppConfig;
use roster_terminal::engine::suggest;
use roster_terminal::feed::load_snapshot;
use roster_terminal::pool::build_pool;
use roster_terminal::selector::select_next_match;
use roster_terminal::sheets::{parse_roster_csv, parse_settings_csv, parse_stats_csv};
use roster_terminal::sorter::sort_suggestions;

/// Prints the suggestion card once and exits.
///
/// With three paths (`stats.csv roster.csv settings.csv`) it reads local
/// exports; without arguments it loads whatever the environment configures
/// (the demo league by default).
fn main() -> anyhow::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    let config = AppConfig::from_env();

    let paths: Vec<PathBuf> = std::env::args().skip(1).map(PathBuf::from).collect();
    let (stats, roster, settings) = match paths.as_slice() {
        [] => {
            let snapshot = load_snapshot(&config)?;
            (snapshot.stats, snapshot.roster, snapshot.settings)
        }
        [stats, roster, settings] => {
            let read = |path: &PathBuf| {
                fs::read_to_string(path).with_context(|| format!("read {}", path.display()))
            };
            (
                parse_stats_csv(&read(stats)?)?,
                parse_roster_csv(&read(roster)?, &config.league)?,
                parse_settings_csv(&read(settings)?, &config.league)?,
            )
        }
        _ => bail!("usage: suggest_once [stats.csv roster.csv settings.csv]"),
    };

    let Some(settings) = settings else {
        eprintln!("no settings row for league {}", config.league);
        return Ok(());
    };
    let now = today(config.time_zone);
    let Some(target) = select_next_match(&roster, now) else {
        return Ok(());
    };

    let pool = build_pool(&stats, &roster);
    let suggestions = suggest(target, &pool, &settings, &roster, &config.policy);
    let rows = sort_suggestions(&suggestions, &pool.stats_index);

    println!("Date: {}", format_display_date(target.parsed_date));
    println!(
        "Team: {}",
        if target.opponent.is_empty() {
            "TBD"
        } else {
            target.opponent.as_str()
        }
    );
    for row in rows {
        println!(
            "{:<24} H {:<4} [{} {} | {}]",
            row.display_name,
            row.hdcp_label,
            row.suggestion.slot.label(),
            row.suggestion.strategy.label(),
            row.suggestion.note.label()
        );
    }
    Ok(())
}

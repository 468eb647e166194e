use std::collections::{HashMap, HashSet};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::calendar::{parse_roster_date, today};
use crate::config::AppConfig;
use crate::demo_feed;
use crate::model::{Bowler, Match, SettingsConfig, SlotEntry, SlotKey};
use crate::sheet_cache::fetch_sheet_text;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Csv,
    Demo,
}

#[derive(Debug, Clone)]
pub struct Fetched<T> {
    pub data: T,
    pub source: DataSource,
    pub updated_at: DateTime<Utc>,
}

impl<T> Fetched<T> {
    fn new(data: T, source: DataSource) -> Self {
        Self {
            data,
            source,
            updated_at: Utc::now(),
        }
    }
}

pub fn fetch_stats(config: &AppConfig) -> Result<Fetched<Vec<Bowler>>> {
    if config.use_dummy_data {
        return Ok(Fetched::new(demo_feed::demo_stats(), DataSource::Demo));
    }
    let body = fetch_sheet(config.stats_sheet_url.as_deref(), "stats")?;
    Ok(Fetched::new(parse_stats_csv(&body)?, DataSource::Csv))
}

pub fn fetch_roster(config: &AppConfig) -> Result<Fetched<Vec<Match>>> {
    if config.use_dummy_data {
        let roster = demo_feed::demo_roster(today(config.time_zone));
        return Ok(Fetched::new(roster, DataSource::Demo));
    }
    let body = fetch_sheet(config.rosters_sheet_url.as_deref(), "roster")?;
    Ok(Fetched::new(
        parse_roster_csv(&body, &config.league)?,
        DataSource::Csv,
    ))
}

/// `data` is `None` when the sheet has no row for the configured league.
pub fn fetch_settings(config: &AppConfig) -> Result<Fetched<Option<SettingsConfig>>> {
    if config.use_dummy_data {
        return Ok(Fetched::new(
            Some(demo_feed::demo_settings()),
            DataSource::Demo,
        ));
    }
    let body = fetch_sheet(config.settings_sheet_url.as_deref(), "settings")?;
    Ok(Fetched::new(
        parse_settings_csv(&body, &config.league)?,
        DataSource::Csv,
    ))
}

fn fetch_sheet(url: Option<&str>, what: &str) -> Result<String> {
    let url = url.with_context(|| format!("no {what} sheet url configured"))?;
    fetch_sheet_text(url).with_context(|| format!("{what} sheet request failed"))
}

/// Alternate header spellings, mapped onto the canonical column before
/// deserializing.
const STATS_HEADER_ALIASES: &[(&str, &str)] = &[
    ("name", "bowler"),
    ("sex", "gender"),
    ("handicap", "hdcp"),
    ("avg", "average"),
    ("games", "total games"),
    ("pinfall", "total score"),
];

const ROSTER_HEADER_ALIASES: &[(&str, &str)] = &[
    ("bowler reserved", "bowler r"),
    ("status reserved", "status r"),
];

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StatsRow {
    bowler: Option<String>,
    gender: Option<String>,
    active: Option<String>,
    hdcp: Option<String>,
    average: Option<String>,
    #[serde(rename = "total games")]
    total_games: Option<String>,
    #[serde(rename = "total score")]
    total_score: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RosterRow {
    league: Option<String>,
    date: Option<String>,
    opponent: Option<String>,
    #[serde(rename = "bowler a")]
    bowler_a: Option<String>,
    #[serde(rename = "status a")]
    status_a: Option<String>,
    #[serde(rename = "bowler b")]
    bowler_b: Option<String>,
    #[serde(rename = "status b")]
    status_b: Option<String>,
    #[serde(rename = "bowler c")]
    bowler_c: Option<String>,
    #[serde(rename = "status c")]
    status_c: Option<String>,
    #[serde(rename = "bowler r")]
    bowler_r: Option<String>,
    #[serde(rename = "status r")]
    status_r: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SettingsRow {
    league: Option<String>,
    active: Option<String>,
    a: Option<String>,
    b: Option<String>,
    c: Option<String>,
    reserved: Option<String>,
    season: Option<String>,
    title: Option<String>,
}

pub fn parse_stats_csv(raw: &str) -> Result<Vec<Bowler>> {
    let rows: Vec<StatsRow> = read_rows(raw, STATS_HEADER_ALIASES).context("invalid stats csv")?;
    Ok(rows
        .into_iter()
        .filter_map(|row| {
            let name = row.bowler.filter(|n| !n.trim().is_empty())?;
            Some(Bowler {
                name,
                active: row.active.as_deref().map(is_truthy).unwrap_or(true),
                hdcp: lenient_u32(row.hdcp.as_deref()),
                average: lenient_f64(row.average.as_deref()),
                total_games: lenient_u32(row.total_games.as_deref()),
                gender: row.gender.filter(|g| !g.is_empty()),
                total_score: row
                    .total_score
                    .as_deref()
                    .filter(|v| !v.is_empty())
                    .map(|v| lenient_u32(Some(v))),
            })
        })
        .collect())
}

/// Rows for `league` only, undated rows dropped, sorted by date.
pub fn parse_roster_csv(raw: &str, league: &str) -> Result<Vec<Match>> {
    let rows: Vec<RosterRow> = read_rows(raw, ROSTER_HEADER_ALIASES).context("invalid roster csv")?;
    let mut matches: Vec<Match> = rows
        .into_iter()
        .filter(|row| same_league(row.league.as_deref(), league))
        .filter_map(|row| {
            let date = row.date.unwrap_or_default();
            let parsed_date = parse_roster_date(&date)?;
            let mut slots = HashMap::new();
            for (key, name, status) in [
                (SlotKey::A, row.bowler_a, row.status_a),
                (SlotKey::B, row.bowler_b, row.status_b),
                (SlotKey::C, row.bowler_c, row.status_c),
                (SlotKey::Reserved, row.bowler_r, row.status_r),
            ] {
                slots.insert(
                    key,
                    SlotEntry::new(name.unwrap_or_default(), status.unwrap_or_default()),
                );
            }
            Some(Match {
                league: row.league.unwrap_or_default().to_lowercase(),
                date,
                parsed_date,
                opponent: row.opponent.unwrap_or_default(),
                slots,
            })
        })
        .collect();
    matches.sort_by_key(|m| m.parsed_date);
    Ok(matches)
}

pub fn parse_settings_csv(raw: &str, league: &str) -> Result<Option<SettingsConfig>> {
    let rows: Vec<SettingsRow> = read_rows(raw, &[]).context("invalid settings csv")?;
    let Some(row) = rows
        .into_iter()
        .find(|row| same_league(row.league.as_deref(), league))
    else {
        return Ok(None);
    };

    let mut modes = HashMap::new();
    for (key, mode) in [
        (SlotKey::A, row.a),
        (SlotKey::B, row.b),
        (SlotKey::C, row.c),
        (SlotKey::Reserved, row.reserved),
    ] {
        if let Some(mode) = mode {
            modes.insert(key, mode);
        }
    }

    Ok(Some(SettingsConfig {
        league: row.league.unwrap_or_default().to_lowercase(),
        active: row.active.as_deref().map(is_truthy).unwrap_or(false),
        season: row.season.filter(|s| !s.is_empty()),
        title: row.title.filter(|t| !t.is_empty()),
        modes,
    }))
}

/// Header names are matched after trimming and lower-casing, so `Total Games`
/// and ` total games` land on the same field.
fn read_rows<T: DeserializeOwned>(raw: &str, aliases: &[(&str, &str)]) -> Result<Vec<T>> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(raw.as_bytes());
    let headers = canonical_headers(reader.headers().context("missing header row")?, aliases);
    reader.set_headers(headers);

    let mut out = Vec::new();
    for (idx, row) in reader.deserialize::<T>().enumerate() {
        out.push(row.with_context(|| format!("row {}", idx + 2))?);
    }
    Ok(out)
}

/// Lower-cases each header and resolves aliases. When two columns land on the
/// same name the leftmost one keeps it; later ones get a name no row struct
/// reads.
fn canonical_headers(raw: &StringRecord, aliases: &[(&str, &str)]) -> StringRecord {
    let mut seen = HashSet::new();
    raw.iter()
        .enumerate()
        .map(|(idx, header)| {
            let lowered = header.trim().to_lowercase();
            let name = aliases
                .iter()
                .find(|(alias, _)| *alias == lowered)
                .map(|(_, canonical)| canonical.to_string())
                .unwrap_or(lowered);
            if seen.insert(name.clone()) {
                name
            } else {
                format!("#{idx} {name}")
            }
        })
        .collect()
}

fn same_league(row_league: Option<&str>, league: &str) -> bool {
    row_league
        .map(|l| l.trim().eq_ignore_ascii_case(league.trim()))
        .unwrap_or(false)
}

fn is_truthy(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_uppercase().as_str(),
        "TRUE" | "YES" | "Y" | "1"
    )
}

fn lenient_f64(raw: Option<&str>) -> f64 {
    raw.and_then(|v| v.trim().replace(',', "").parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Sheet cells sometimes hold `12.0` or blanks; anything unusable reads as 0.
/// Fractions round half away from zero, so a `12.5` handicap reads as 13.
fn lenient_u32(raw: Option<&str>) -> u32 {
    let value = lenient_f64(raw);
    if value <= 0.0 {
        0
    } else {
        value.round().min(u32::MAX as f64) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fractional_counts_round_to_nearest() {
        assert_eq!(lenient_u32(Some("12.5")), 13);
        assert_eq!(lenient_u32(Some("12.4")), 12);
        assert_eq!(lenient_u32(Some("1,204")), 1204);
        assert_eq!(lenient_u32(Some("-3")), 0);
        assert_eq!(lenient_u32(Some("n/a")), 0);
        assert_eq!(lenient_u32(None), 0);
    }

    #[test]
    fn aliases_resolve_and_first_column_wins() {
        let raw = StringRecord::from(vec![" Name", "Bowler", "Games", "Total Games", "Avg"]);
        let headers = canonical_headers(&raw, STATS_HEADER_ALIASES);
        assert_eq!(&headers[0], "bowler");
        assert_eq!(&headers[1], "#1 bowler");
        assert_eq!(&headers[2], "total games");
        assert_eq!(&headers[3], "#3 total games");
        assert_eq!(&headers[4], "average");
    }

    #[test]
    fn settings_headers_only_lowercase() {
        let raw = StringRecord::from(vec!["League", "A", "Reserved"]);
        let headers = canonical_headers(&raw, &[]);
        assert_eq!(headers.iter().collect::<Vec<_>>(), ["league", "a", "reserved"]);
    }
}

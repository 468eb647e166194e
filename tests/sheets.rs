use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;

use roster_terminal::model::{SlotKey, Strategy};
use roster_terminal::names::normalize_name;
use roster_terminal::sheets::{parse_roster_csv, parse_settings_csv, parse_stats_csv};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn parses_stats_fixture() {
    let raw = read_fixture("stats.csv");
    let stats = parse_stats_csv(&raw).expect("fixture should parse");
    assert_eq!(stats.len(), 4);

    assert_eq!(normalize_name(&stats[0].name), "Alice");
    assert!(stats[0].active);
    assert_eq!(stats[0].hdcp, 10);
    assert_eq!(stats[0].total_games, 8);
    assert_eq!(stats[0].total_score, Some(1400));

    assert!(!stats[1].active);
    assert!((stats[1].average - 160.4).abs() < 1e-9);

    // Blank Active cell means active.
    assert_eq!(stats[2].name, "Bob");
    assert!(stats[2].active);

    // Unparseable and missing numbers fall back to zero.
    assert_eq!(stats[3].name, "Eve");
    assert_eq!(stats[3].hdcp, 0);
    assert_eq!(stats[3].average, 0.0);
    assert_eq!(stats[3].total_games, 0);
    assert_eq!(stats[3].total_score, None);
}

#[test]
fn parses_roster_fixture_for_one_league() {
    let raw = read_fixture("roster.csv");
    let roster = parse_roster_csv(&raw, "sgcc").expect("fixture should parse");
    assert_eq!(roster.len(), 2);

    assert_eq!(roster[0].opponent, "Team A");
    assert_eq!(
        roster[0].parsed_date,
        NaiveDate::from_ymd_opt(2026, 1, 2).unwrap()
    );
    assert_eq!(roster[1].opponent, "Team B");
    assert_eq!(roster[1].date, "15/Jan/2026");

    let second = &roster[1];
    assert_eq!(second.assigned_slots().len(), 3);
    assert_eq!(second.slot(SlotKey::Reserved).occupant(), "ReserveOne");
    assert!(second.slot(SlotKey::A).is_confirmed());
    assert!(!second.slot(SlotKey::B).is_confirmed());
    assert!(!second.slot(SlotKey::C).is_assigned());
}

#[test]
fn roster_league_match_ignores_case() {
    let raw = read_fixture("roster.csv");
    let roster = parse_roster_csv(&raw, "SGCC").expect("fixture should parse");
    assert_eq!(roster.len(), 2);
    assert!(roster.iter().all(|m| m.league == "sgcc"));

    let other = parse_roster_csv(&raw, "tampines").expect("fixture should parse");
    assert_eq!(other.len(), 1);
    assert!(parse_roster_csv(&raw, "nowhere").unwrap().is_empty());
}

#[test]
fn parses_settings_fixture() {
    let raw = read_fixture("settings.csv");
    let settings = parse_settings_csv(&raw, "sgcc")
        .expect("fixture should parse")
        .expect("sgcc row present");

    assert_eq!(settings.title.as_deref(), Some("SGCC Prime League"));
    assert_eq!(settings.season.as_deref(), Some("2026"));
    assert!(settings.active);
    assert_eq!(settings.strategy(SlotKey::A), Strategy::Anchor);
    assert_eq!(settings.strategy(SlotKey::B), Strategy::GroupLeast);
    assert_eq!(settings.strategy(SlotKey::C), Strategy::Manual);
    // Empty cell falls back to LEAST.
    assert_eq!(settings.strategy(SlotKey::Reserved), Strategy::Least);
}

#[test]
fn settings_for_unknown_league_is_none() {
    let raw = read_fixture("settings.csv");
    assert!(parse_settings_csv(&raw, "nope").unwrap().is_none());
}

#[test]
fn headers_are_matched_loosely() {
    let raw = "  BOWLER , active, HDCP ,AVERAGE,total games\nZed,no,3,150,12\n";
    let stats = parse_stats_csv(raw).unwrap();
    assert_eq!(stats.len(), 1);
    assert_eq!(stats[0].name, "Zed");
    assert!(!stats[0].active);
    assert_eq!(stats[0].hdcp, 3);
    assert_eq!(stats[0].total_games, 12);
}

#[test]
fn duplicate_and_alias_columns_keep_the_leftmost() {
    let raw = read_fixture("stats_duplicate_columns.csv");
    let stats = parse_stats_csv(&raw).expect("duplicate columns should parse");
    assert_eq!(stats.len(), 2);

    assert_eq!(stats[0].name, "Zed");
    assert_eq!(stats[0].hdcp, 3);
    assert_eq!(stats[0].total_games, 12);
    assert_eq!(stats[0].total_score, Some(1800));

    assert_eq!(normalize_name(&stats[1].name), "Yuri");
    assert!(!stats[1].active);
    assert_eq!(stats[1].hdcp, 13);
    assert_eq!(stats[1].total_games, 20);
}

#[test]
fn alias_only_headers_fill_canonical_fields() {
    let raw = "Name,Sex,Handicap,Avg,Games\nZed,M,4,162.5,10\n";
    let stats = parse_stats_csv(raw).unwrap();
    assert_eq!(stats[0].name, "Zed");
    assert_eq!(stats[0].gender.as_deref(), Some("M"));
    assert_eq!(stats[0].hdcp, 4);
    assert!((stats[0].average - 162.5).abs() < 1e-9);
    assert_eq!(stats[0].total_games, 10);

    let roster = parse_roster_csv(
        "League,Date,Opponent,Bowler Reserved,Status Reserved,Bowler R\nsgcc,2026-01-09,Team C,Rae,YES,Other\n",
        "sgcc",
    )
    .unwrap();
    assert_eq!(roster[0].slot(SlotKey::Reserved).occupant(), "Rae");
    assert!(roster[0].slot(SlotKey::Reserved).is_confirmed());
}

use chrono::NaiveDate;

use roster_terminal::model::{Bowler, Match, SlotKey};
use roster_terminal::pool::{LOOKAHEAD_GAMES_PER_SLOT, build_pool, lookahead_games};
use roster_terminal::selector::select_next_match;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn bowler(name: &str, active: bool, total_games: u32) -> Bowler {
    Bowler {
        name: name.to_string(),
        active,
        hdcp: 5,
        average: 170.0,
        total_games,
        gender: Some("F".to_string()),
        total_score: None,
    }
}

#[test]
fn selects_first_fully_open_match_from_today() {
    let today = date(2026, 5, 6);
    let roster = vec![
        Match::new("sgcc", date(2026, 4, 29), "Past Open"),
        Match::new("sgcc", date(2026, 5, 6), "Partly Set").with_slot(SlotKey::A, "Alice", "YES"),
        Match::new("sgcc", date(2026, 5, 13), "Reserve Only")
            .with_slot(SlotKey::Reserved, "🟢\u{a0}Bob", ""),
        Match::new("sgcc", date(2026, 5, 20), "Open Week"),
        Match::new("sgcc", date(2026, 5, 27), "Later Open"),
    ];

    let target = select_next_match(&roster, today).unwrap();
    assert_eq!(target.opponent, "Open Week");
}

#[test]
fn match_on_today_counts_as_upcoming() {
    let today = date(2026, 5, 6);
    let roster = vec![Match::new("sgcc", today, "Tonight")];
    assert_eq!(
        select_next_match(&roster, today).map(|m| m.opponent.as_str()),
        Some("Tonight")
    );
}

#[test]
fn marker_only_names_do_not_count_as_assigned() {
    let today = date(2026, 5, 6);
    let roster = vec![
        Match::new("sgcc", date(2026, 5, 13), "Blank Markers")
            .with_slot(SlotKey::A, "🟢\u{a0}", "")
            .with_slot(SlotKey::B, "  ", ""),
    ];
    assert!(select_next_match(&roster, today).is_some());
}

#[test]
fn no_open_match_gives_none() {
    let today = date(2026, 5, 6);
    let roster = vec![
        Match::new("sgcc", date(2026, 5, 13), "Set").with_slot(SlotKey::C, "Carol", "NO"),
    ];
    assert!(select_next_match(&roster, today).is_none());
    assert!(select_next_match(&[], today).is_none());
}

#[test]
fn lookahead_counts_confirmed_bowling_slots_only() {
    let roster = vec![
        Match::new("sgcc", date(2026, 5, 13), "One")
            .with_slot(SlotKey::A, "🟢\u{a0}\u{a0}Alice", "yes")
            .with_slot(SlotKey::B, "Bob", "NO")
            .with_slot(SlotKey::Reserved, "Carol", "YES"),
        Match::new("sgcc", date(2026, 5, 20), "Two").with_slot(SlotKey::C, "ALICE", " YES "),
    ];

    let extra = lookahead_games(&roster);
    assert_eq!(extra.get("alice"), Some(&(2 * LOOKAHEAD_GAMES_PER_SLOT)));
    assert_eq!(extra.get("bob"), None);
    assert_eq!(extra.get("carol"), None);
}

#[test]
fn pool_holds_active_bowlers_and_index_holds_everyone() {
    let stats = vec![
        bowler("🟢\u{a0}\u{a0}Alice", true, 8),
        bowler("🔴\u{a0}\u{a0}Grace", false, 12),
        bowler("🟢\u{a0}", true, 3),
    ];
    let roster = vec![
        Match::new("sgcc", date(2026, 5, 13), "One").with_slot(SlotKey::A, "Alice", "YES"),
    ];

    let pool = build_pool(&stats, &roster);
    assert_eq!(pool.pool.len(), 1);
    assert_eq!(pool.pool[0].name, "Alice");
    assert_eq!(pool.pool[0].total_games, 8 + LOOKAHEAD_GAMES_PER_SLOT);

    // The index keeps raw stats, without the lookahead.
    assert_eq!(pool.stats_index["alice"].total_games, 8);
    assert!(pool.stats_index.contains_key("grace"));
    assert!(!pool.stats_index.contains_key(""));
}

#[test]
fn pool_entries_carry_their_identity_key() {
    let stats = vec![
        bowler("🟢\u{a0}\u{a0}Alice", true, 4),
        bowler("  Bob   Lee ", true, 6),
    ];
    let pool = build_pool(&stats, &[]);
    let keys: Vec<(&str, &str)> = pool
        .pool
        .iter()
        .map(|e| (e.name.as_str(), e.key.as_str()))
        .collect();
    assert_eq!(keys, vec![("Alice", "alice"), ("Bob Lee", "bob lee")]);
}

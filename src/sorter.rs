use std::cmp::Ordering;
use std::collections::HashMap;

use crate::model::{NO_SUGGESTION, SlotKey, Suggestion};
use crate::names::identity_key;
use crate::pool::BowlerStats;

/// Sort keys used when the suggested name has no stats row (or there is no
/// name at all). They push the row to the bottom of its group.
const MISSING_HDCP: i64 = -1;
const MISSING_AVERAGE: f64 = f64::MAX;
const MISSING_GAMES: i64 = -1;

#[derive(Debug, Clone, PartialEq)]
pub struct SuggestionRow {
    pub suggestion: Suggestion,
    pub is_reserve: bool,
    pub display_name: String,
    /// `-` for the "no suggestion" sentinel, otherwise the handicap (or -1).
    pub hdcp_label: String,
    pub sort_hdcp: i64,
    pub sort_average: f64,
    pub sort_games: i64,
}

pub fn sort_suggestions(
    suggestions: &[Suggestion],
    stats_index: &HashMap<String, BowlerStats>,
) -> Vec<SuggestionRow> {
    let mut rows: Vec<SuggestionRow> = suggestions
        .iter()
        .map(|s| decorate(s, stats_index))
        .collect();
    rows.sort_by(display_order);
    rows
}

fn decorate(suggestion: &Suggestion, stats_index: &HashMap<String, BowlerStats>) -> SuggestionRow {
    let is_reserve = suggestion.slot == SlotKey::Reserved;
    let stats = suggestion
        .name
        .as_deref()
        .and_then(|name| stats_index.get(&identity_key(name)));
    let (sort_hdcp, sort_average, sort_games) = match stats {
        Some(s) => (i64::from(s.hdcp), s.average, i64::from(s.total_games)),
        None => (MISSING_HDCP, MISSING_AVERAGE, MISSING_GAMES),
    };

    let display_name = match suggestion.name.as_deref() {
        Some(name) if is_reserve => format!("{name} (Reserve)"),
        Some(name) => name.to_string(),
        None => NO_SUGGESTION.to_string(),
    };
    let hdcp_label = if suggestion.name.is_some() {
        sort_hdcp.to_string()
    } else {
        NO_SUGGESTION.to_string()
    };

    SuggestionRow {
        suggestion: suggestion.clone(),
        is_reserve,
        display_name,
        hdcp_label,
        sort_hdcp,
        sort_average,
        sort_games,
    }
}

/// Bowlers first, reserve last; then higher handicap, lower average, more games.
fn display_order(a: &SuggestionRow, b: &SuggestionRow) -> Ordering {
    a.is_reserve
        .cmp(&b.is_reserve)
        .then_with(|| b.sort_hdcp.cmp(&a.sort_hdcp))
        .then_with(|| a.sort_average.total_cmp(&b.sort_average))
        .then_with(|| b.sort_games.cmp(&a.sort_games))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Strategy, SuggestionNote};

    fn generated(slot: SlotKey, name: Option<&str>) -> Suggestion {
        Suggestion {
            slot,
            strategy: Strategy::Least,
            mode: "LEAST".to_string(),
            name: name.map(str::to_string),
            generated: name.is_some(),
            note: if name.is_some() {
                SuggestionNote::Generated
            } else {
                SuggestionNote::NoEligibleBowler
            },
        }
    }

    fn stats(hdcp: u32, average: f64, games: u32) -> BowlerStats {
        BowlerStats {
            hdcp,
            average,
            total_games: games,
        }
    }

    #[test]
    fn reserve_sorts_last_and_is_annotated() {
        let mut index = HashMap::new();
        index.insert("alice".to_string(), stats(10, 175.0, 8));
        index.insert("bob".to_string(), stats(2, 190.0, 9));
        let rows = sort_suggestions(
            &[
                generated(SlotKey::A, Some("Bob")),
                generated(SlotKey::Reserved, Some("Alice")),
            ],
            &index,
        );
        assert_eq!(rows[0].display_name, "Bob");
        assert_eq!(rows[1].display_name, "Alice (Reserve)");
        assert!(rows[1].is_reserve);
    }

    #[test]
    fn higher_handicap_first_then_lower_average() {
        let mut index = HashMap::new();
        index.insert("a".to_string(), stats(5, 170.0, 1));
        index.insert("b".to_string(), stats(9, 160.0, 1));
        index.insert("c".to_string(), stats(5, 150.0, 1));
        let rows = sort_suggestions(
            &[
                generated(SlotKey::A, Some("A")),
                generated(SlotKey::B, Some("B")),
                generated(SlotKey::C, Some("C")),
            ],
            &index,
        );
        let names: Vec<&str> = rows.iter().map(|r| r.display_name.as_str()).collect();
        assert_eq!(names, vec!["B", "C", "A"]);
    }

    #[test]
    fn equal_handicap_and_average_puts_more_games_first() {
        let mut index = HashMap::new();
        index.insert("few".to_string(), stats(6, 170.0, 4));
        index.insert("many".to_string(), stats(6, 170.0, 16));
        index.insert("some".to_string(), stats(6, 170.0, 9));
        let rows = sort_suggestions(
            &[
                generated(SlotKey::A, Some("Few")),
                generated(SlotKey::B, Some("Some")),
                generated(SlotKey::C, Some("Many")),
            ],
            &index,
        );
        let names: Vec<&str> = rows.iter().map(|r| r.display_name.as_str()).collect();
        assert_eq!(names, vec!["Many", "Some", "Few"]);
    }

    #[test]
    fn sentinel_uses_worst_case_stats() {
        let mut index = HashMap::new();
        index.insert("a".to_string(), stats(0, 200.0, 1));
        let rows = sort_suggestions(
            &[generated(SlotKey::A, None), generated(SlotKey::B, Some("A"))],
            &index,
        );
        assert_eq!(rows[0].display_name, "A");
        assert_eq!(rows[1].display_name, "-");
        assert_eq!(rows[1].hdcp_label, "-");
        assert_eq!(rows[1].sort_hdcp, -1);
        assert_eq!(rows[1].sort_games, -1);
    }

    #[test]
    fn reserve_sentinel_is_not_annotated() {
        let rows = sort_suggestions(&[generated(SlotKey::Reserved, None)], &HashMap::new());
        assert_eq!(rows[0].display_name, "-");
        assert!(rows[0].is_reserve);
    }
}

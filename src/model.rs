use std::collections::HashMap;

use chrono::NaiveDate;

use crate::names::normalize_name;

/// Placeholder shown wherever a slot has no name to offer.
pub const NO_SUGGESTION: &str = "-";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SlotKey {
    A,
    B,
    C,
    Reserved,
}

impl SlotKey {
    pub const ALL: [SlotKey; 4] = [SlotKey::A, SlotKey::B, SlotKey::C, SlotKey::Reserved];

    pub fn label(self) -> &'static str {
        match self {
            SlotKey::A => "A",
            SlotKey::B => "B",
            SlotKey::C => "C",
            SlotKey::Reserved => "Reserved",
        }
    }

    pub fn is_reserve(self) -> bool {
        self == SlotKey::Reserved
    }

    /// Slots whose occupant actually bowls the match.
    pub fn bowls(self) -> bool {
        !self.is_reserve()
    }
}

/// Row from the stats sheet. `name` is kept as published; compare through
/// [`crate::names::identity_key`].
#[derive(Debug, Clone, PartialEq)]
pub struct Bowler {
    pub name: String,
    pub active: bool,
    pub hdcp: u32,
    pub average: f64,
    pub total_games: u32,
    pub gender: Option<String>,
    pub total_score: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotEntry {
    pub name: String,
    pub status: String,
}

impl SlotEntry {
    pub fn new(name: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: status.into(),
        }
    }

    pub fn occupant(&self) -> String {
        normalize_name(&self.name)
    }

    pub fn is_assigned(&self) -> bool {
        !self.occupant().is_empty()
    }

    pub fn is_confirmed(&self) -> bool {
        self.status.trim().eq_ignore_ascii_case("YES")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    pub league: String,
    pub date: String,
    pub parsed_date: NaiveDate,
    pub opponent: String,
    pub slots: HashMap<SlotKey, SlotEntry>,
}

impl Match {
    pub fn new(league: &str, parsed_date: NaiveDate, opponent: &str) -> Self {
        Self {
            league: league.to_string(),
            date: crate::calendar::format_display_date(parsed_date),
            parsed_date,
            opponent: opponent.to_string(),
            slots: HashMap::new(),
        }
    }

    pub fn with_slot(mut self, key: SlotKey, name: &str, status: &str) -> Self {
        self.slots.insert(key, SlotEntry::new(name, status));
        self
    }

    /// Missing slots read as empty entries.
    pub fn slot(&self, key: SlotKey) -> &SlotEntry {
        static UNASSIGNED: SlotEntry = SlotEntry {
            name: String::new(),
            status: String::new(),
        };
        self.slots.get(&key).unwrap_or(&UNASSIGNED)
    }

    pub fn slot_entries(&self) -> impl Iterator<Item = (SlotKey, &SlotEntry)> + '_ {
        SlotKey::ALL.into_iter().map(|key| (key, self.slot(key)))
    }

    /// Filled slots only, in slot order.
    pub fn assigned_slots(&self) -> Vec<(SlotKey, &SlotEntry)> {
        self.slot_entries()
            .filter(|(_, entry)| entry.is_assigned())
            .collect()
    }

    pub fn is_fully_unassigned(&self) -> bool {
        SlotKey::ALL.iter().all(|key| !self.slot(*key).is_assigned())
    }
}

/// Per-slot strategy tokens plus the descriptive columns of the settings row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsConfig {
    pub league: String,
    pub active: bool,
    pub season: Option<String>,
    pub title: Option<String>,
    pub modes: HashMap<SlotKey, String>,
}

impl SettingsConfig {
    pub fn with_modes(modes: impl IntoIterator<Item = (SlotKey, &'static str)>) -> Self {
        Self {
            modes: modes
                .into_iter()
                .map(|(key, mode)| (key, mode.to_string()))
                .collect(),
            ..Self::default()
        }
    }

    pub fn raw_mode(&self, key: SlotKey) -> &str {
        self.modes.get(&key).map(String::as_str).unwrap_or_default()
    }

    pub fn strategy(&self, key: SlotKey) -> Strategy {
        Strategy::resolve(self.raw_mode(key))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    Manual,
    Anchor,
    GroupLeast,
    Least,
}

impl Strategy {
    /// Upper-cases, drops whitespace and reads `;` as `,`. Anything
    /// unrecognised, including an empty cell, falls back to `Least`.
    pub fn resolve(token: &str) -> Self {
        let normalized: String = token
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| if c == ';' { ',' } else { c })
            .collect::<String>()
            .to_uppercase();
        match normalized.as_str() {
            "MANUAL" => Strategy::Manual,
            "ANCHOR" => Strategy::Anchor,
            "GROUP,LEAST" | "GROUP_LEAST" => Strategy::GroupLeast,
            _ => Strategy::Least,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Strategy::Manual => "MANUAL",
            Strategy::Anchor => "ANCHOR",
            Strategy::GroupLeast => "GROUP,LEAST",
            Strategy::Least => "LEAST",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionNote {
    AlreadyAssigned,
    ManualSkipped,
    Generated,
    NoEligibleBowler,
}

impl SuggestionNote {
    pub fn label(self) -> &'static str {
        match self {
            SuggestionNote::AlreadyAssigned => "Already assigned",
            SuggestionNote::ManualSkipped => "Manual - skipped",
            SuggestionNote::Generated => "Generated",
            SuggestionNote::NoEligibleBowler => "No eligible bowler",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    pub slot: SlotKey,
    pub strategy: Strategy,
    /// Upper-cased mode text as configured, kept for display.
    pub mode: String,
    /// `None` is the "no suggestion" sentinel.
    pub name: Option<String>,
    pub generated: bool,
    pub note: SuggestionNote,
}

impl Suggestion {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(NO_SUGGESTION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_strategy_tokens() {
        for token in [
            "GROUP_LEAST",
            "group_least",
            " Group ; Least ",
            "group,least",
            "group\u{a0};least",
        ] {
            assert_eq!(Strategy::resolve(token), Strategy::GroupLeast, "{token:?}");
        }
        assert_eq!(Strategy::resolve("manual"), Strategy::Manual);
        assert_eq!(Strategy::resolve(" Anchor\u{a0}"), Strategy::Anchor);
        assert_eq!(Strategy::resolve("LEAST"), Strategy::Least);
    }

    #[test]
    fn unknown_or_blank_tokens_fall_back_to_least() {
        for token in ["", "   ", "GROUP", "LEAST,GROUP", "anchors"] {
            assert_eq!(Strategy::resolve(token), Strategy::Least, "{token:?}");
        }
    }

    #[test]
    fn missing_slot_reads_as_unassigned() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 4).unwrap();
        let m = Match::new("sgcc", date, "Team D").with_slot(SlotKey::A, "🟢\u{a0}Alice", "YES");
        assert_eq!(m.slot(SlotKey::A).occupant(), "Alice");
        assert!(m.slot(SlotKey::A).is_confirmed());
        assert_eq!(m.slot(SlotKey::B), &SlotEntry::default());
        assert!(!m.slot(SlotKey::Reserved).is_assigned());
        assert_eq!(m.assigned_slots().len(), 1);
        assert!(!m.is_fully_unassigned());
    }
}

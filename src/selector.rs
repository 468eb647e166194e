use chrono::NaiveDate;

use crate::model::Match;

/// First match on or after `today`, in roster order, with all four slots open.
/// A match where anyone is already pencilled in is someone else's job.
pub fn select_next_match(roster: &[Match], today: NaiveDate) -> Option<&Match> {
    roster
        .iter()
        .filter(|m| m.parsed_date >= today)
        .find(|m| m.is_fully_unassigned())
}

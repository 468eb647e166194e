use chrono::{Datelike, NaiveDate, Utc};
use chrono_tz::Tz;

pub const DEFAULT_TIME_ZONE: Tz = chrono_tz::Asia::Singapore;

const MONTH_SHORT: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Grouping key for a calendar month. Ordering follows (year, month).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl std::fmt::Display for MonthKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.year, self.month)
    }
}

/// Civil date "now" as seen on the wall clock of `tz`.
pub fn today(tz: Tz) -> NaiveDate {
    Utc::now().with_timezone(&tz).date_naive()
}

pub fn month_key(date: NaiveDate) -> MonthKey {
    MonthKey {
        year: date.year(),
        month: date.month(),
    }
}

/// Roster sheets write dates as `15/Jan/2026`; ISO dates are accepted too.
pub fn parse_roster_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }

    let mut parts = trimmed.split('/');
    let day = parts.next()?.trim().parse::<u32>().ok()?;
    let month_raw = parts.next()?.trim();
    let year = parts.next()?.trim().parse::<i32>().ok()?;
    if parts.next().is_some() {
        return None;
    }
    let month = MONTH_SHORT
        .iter()
        .position(|m| m.eq_ignore_ascii_case(month_raw))
        .map(|idx| idx as u32 + 1)
        .or_else(|| month_raw.parse::<u32>().ok())?;
    NaiveDate::from_ymd_opt(year, month, day)
}

pub fn format_display_date(date: NaiveDate) -> String {
    let month = MONTH_SHORT
        .get(date.month0() as usize)
        .copied()
        .unwrap_or_default();
    format!("{:02}/{}/{}", date.day(), month, date.year())
}

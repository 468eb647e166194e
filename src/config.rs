use std::env;
use std::time::Duration;

use chrono_tz::Tz;

use crate::calendar::DEFAULT_TIME_ZONE;
use crate::engine::{
    DEFAULT_GROUP_BOWLERS, DEFAULT_QUOTA_BOWLER, DEFAULT_QUOTA_MONTHLY_CAP, EnginePolicy,
    QuotaPolicy,
};

pub const DUMMY_LEAGUE: &str = "dummy";
pub const DEFAULT_VIEW: &str = "default";
pub const DUMMY_TITLE: &str = "Generic League";
pub const DUMMY_LOGO: &str = "generic";

const DEFAULT_REFRESH_SECS: u64 = 300;
const MIN_REFRESH_SECS: u64 = 30;

const MASTER_SHEET: &str =
    "2PACX-1vQLJDJ0tRftkDJQ8v0DO35q6Kymvp2GmdMwfeP8r6GuHcEAL97EJp1K9qlF8oOLTWvTW-Xg8d0l3UtP";
const DEFAULT_STATS_GID: &str = "1560652729";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub league: String,
    pub view: String,
    pub title: String,
    pub logo: String,
    pub use_dummy_data: bool,
    pub refresh_interval: Duration,
    pub stats_sheet_url: Option<String>,
    pub rosters_sheet_url: Option<String>,
    pub settings_sheet_url: Option<String>,
    pub time_zone: Tz,
    pub policy: EnginePolicy,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|val| val.trim().to_string())
                .filter(|val| !val.is_empty())
        };

        let league = get("ROSTER_LEAGUE")
            .map(|val| val.to_lowercase())
            .unwrap_or_else(|| DUMMY_LEAGUE.to_string());
        let view = get("ROSTER_VIEW")
            .map(|val| val.to_lowercase())
            .unwrap_or_else(|| DEFAULT_VIEW.to_string());
        let use_dummy_data = league == DUMMY_LEAGUE;

        let (default_title, logo) = if use_dummy_data {
            (DUMMY_TITLE.to_string(), DUMMY_LOGO.to_string())
        } else {
            (capitalize(&league), league.clone())
        };
        let title = get("ROSTER_TITLE").unwrap_or(default_title);

        let refresh_secs = get("REFRESH_SECS")
            .and_then(|val| val.parse::<u64>().ok())
            .unwrap_or(DEFAULT_REFRESH_SECS)
            .max(MIN_REFRESH_SECS);

        let time_zone = get("ROSTER_TZ")
            .and_then(|val| val.parse::<Tz>().ok())
            .unwrap_or(DEFAULT_TIME_ZONE);

        let stats_sheet_url = get("STATS_SHEET_URL").or_else(|| {
            (!use_dummy_data).then(|| published_csv_url(MASTER_SHEET, DEFAULT_STATS_GID))
        });

        Self {
            policy: policy_from(&get),
            league,
            view,
            title,
            logo,
            use_dummy_data,
            refresh_interval: Duration::from_secs(refresh_secs),
            stats_sheet_url,
            rosters_sheet_url: get("ROSTERS_SHEET_URL"),
            settings_sheet_url: get("SETTINGS_SHEET_URL"),
            time_zone,
        }
    }

    /// A non-empty sheet title wins over the derived one.
    pub fn apply_settings_title(&mut self, title: Option<&str>) {
        if let Some(title) = title.map(str::trim).filter(|t| !t.is_empty()) {
            self.title = title.to_string();
        }
    }
}

fn policy_from(get: &dyn Fn(&str) -> Option<String>) -> EnginePolicy {
    let quota_bowler = get("QUOTA_BOWLER").unwrap_or_else(|| DEFAULT_QUOTA_BOWLER.to_string());
    let quota_cap = get("QUOTA_MONTHLY_CAP")
        .and_then(|val| val.parse::<u32>().ok())
        .unwrap_or(DEFAULT_QUOTA_MONTHLY_CAP);
    let quota = (!quota_bowler.eq_ignore_ascii_case("none"))
        .then(|| QuotaPolicy::new(&quota_bowler, quota_cap));

    let group: Vec<String> = match get("GROUP_BOWLERS") {
        Some(raw) => raw
            .split([',', ';'])
            .map(|part| part.trim().to_string())
            .filter(|part| !part.is_empty())
            .collect(),
        None => DEFAULT_GROUP_BOWLERS.iter().map(|s| s.to_string()).collect(),
    };
    EnginePolicy::new(quota, group)
}

pub fn published_csv_url(sheet: &str, gid: &str) -> String {
    format!("https://docs.google.com/spreadsheets/d/e/{sheet}/pub?gid={gid}&single=true&output=csv")
}

fn capitalize(raw: &str) -> String {
    let mut chars = raw.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

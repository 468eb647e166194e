use std::collections::VecDeque;

use chrono::{DateTime, NaiveDate, Utc};

use crate::calendar::today;
use crate::config::AppConfig;
use crate::engine::suggest;
use crate::model::{Bowler, Match, SettingsConfig};
use crate::pool::{CandidatePool, build_pool};
use crate::selector::select_next_match;
use crate::sheets::DataSource;
use crate::sorter::{SuggestionRow, sort_suggestions};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Suggestion,
    Roster,
    Stats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderCommand {
    Refresh { cycle: u64 },
}

/// The three sheets as fetched together for one cycle.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub stats: Vec<Bowler>,
    pub roster: Vec<Match>,
    pub settings: Option<SettingsConfig>,
    pub source: DataSource,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug)]
pub enum Delta {
    Snapshot { cycle: u64, snapshot: Snapshot },
    CycleFailed { cycle: u64, error: String },
    Log(String),
}

#[derive(Debug, Clone)]
pub struct SuggestionCard {
    pub target: Match,
    pub rows: Vec<SuggestionRow>,
}

#[derive(Debug)]
pub struct AppState {
    pub config: AppConfig,
    pub screen: Screen,
    pub loading: bool,
    /// Latest cycle handed to the provider; older snapshots are stale.
    pub cycle: u64,
    pub committed_cycle: Option<u64>,
    pub stats: Vec<Bowler>,
    pub roster: Vec<Match>,
    pub settings: Option<SettingsConfig>,
    pub pool: CandidatePool,
    pub card: Option<SuggestionCard>,
    pub source: Option<DataSource>,
    pub updated_at: Option<DateTime<Utc>>,
    pub roster_scroll: u16,
    pub stats_scroll: u16,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            screen: Screen::Suggestion,
            loading: true,
            cycle: 0,
            committed_cycle: None,
            stats: Vec::new(),
            roster: Vec::new(),
            settings: None,
            pool: CandidatePool::default(),
            card: None,
            source: None,
            updated_at: None,
            roster_scroll: 0,
            stats_scroll: 0,
            logs: VecDeque::new(),
            help_overlay: false,
        }
    }

    /// Starts a new cycle; anything still in flight for earlier ones is ignored
    /// when it lands.
    pub fn begin_cycle(&mut self) -> u64 {
        self.cycle += 1;
        self.loading = true;
        self.cycle
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        const MAX_LOGS: usize = 200;
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    pub fn upcoming_roster(&self, today: NaiveDate) -> Vec<&Match> {
        self.roster
            .iter()
            .filter(|m| m.parsed_date >= today)
            .collect()
    }

    /// Stats table order: highest average first, name as tie-break.
    pub fn stats_sorted(&self) -> Vec<&Bowler> {
        let mut rows: Vec<&Bowler> = self.stats.iter().collect();
        rows.sort_by(|a, b| {
            b.average
                .total_cmp(&a.average)
                .then_with(|| a.name.cmp(&b.name))
        });
        rows
    }

    pub fn scroll_down(&mut self) {
        match self.screen {
            Screen::Roster => self.roster_scroll = self.roster_scroll.saturating_add(1),
            Screen::Stats => self.stats_scroll = self.stats_scroll.saturating_add(1),
            Screen::Suggestion => {}
        }
    }

    pub fn scroll_up(&mut self) {
        match self.screen {
            Screen::Roster => self.roster_scroll = self.roster_scroll.saturating_sub(1),
            Screen::Stats => self.stats_scroll = self.stats_scroll.saturating_sub(1),
            Screen::Suggestion => {}
        }
    }

    fn clear_data(&mut self) {
        self.stats.clear();
        self.roster.clear();
        self.settings = None;
        self.pool = CandidatePool::default();
        self.card = None;
    }

    fn commit(&mut self, cycle: u64, snapshot: Snapshot, today: NaiveDate) {
        self.config
            .apply_settings_title(snapshot.settings.as_ref().and_then(|s| s.title.as_deref()));
        self.pool = build_pool(&snapshot.stats, &snapshot.roster);
        self.stats = snapshot.stats;
        self.roster = snapshot.roster;
        self.settings = snapshot.settings;
        self.source = Some(snapshot.source);
        self.updated_at = Some(snapshot.updated_at);
        self.committed_cycle = Some(cycle);
        self.loading = false;
        self.card = self.compute_card(today);
    }

    fn compute_card(&self, today: NaiveDate) -> Option<SuggestionCard> {
        let settings = self.settings.as_ref()?;
        let target = select_next_match(&self.roster, today)?;
        let suggestions = suggest(
            target,
            &self.pool,
            settings,
            &self.roster,
            &self.config.policy,
        );
        Some(SuggestionCard {
            target: target.clone(),
            rows: sort_suggestions(&suggestions, &self.pool.stats_index),
        })
    }
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    let now = today(state.config.time_zone);
    apply_delta_at(state, delta, now);
}

/// Same as [`apply_delta`] with "today" pinned, which keeps tests off the clock.
pub fn apply_delta_at(state: &mut AppState, delta: Delta, today: NaiveDate) {
    match delta {
        Delta::Snapshot { cycle, snapshot } => {
            if cycle != state.cycle {
                state.push_log(format!(
                    "[INFO] Dropped stale snapshot from cycle {cycle} (current {})",
                    state.cycle
                ));
                return;
            }
            state.commit(cycle, snapshot, today);
            let summary = match &state.card {
                Some(card) => format!(
                    "[INFO] Suggestions ready for {} vs {}",
                    card.target.date, card.target.opponent
                ),
                None => "[INFO] No open upcoming match to suggest for".to_string(),
            };
            state.push_log(summary);
        }
        Delta::CycleFailed { cycle, error } => {
            if cycle != state.cycle {
                return;
            }
            state.loading = false;
            state.clear_data();
            state.push_log(format!("[WARN] Sheet refresh failed: {error}"));
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}

//! Greedy slot-by-slot suggestion engine.
//!
//! Slots are resolved in the fixed order A, B, C, Reserved. Each step sees what
//! earlier steps picked (the "already chosen" set and the quota counter), so
//! the whole pass is a fold over [`SlotKey::ALL`] rather than four independent
//! lookups.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::calendar::month_key;
use crate::model::{Match, SettingsConfig, SlotKey, Strategy, Suggestion, SuggestionNote};
use crate::names::identity_key;
use crate::pool::{CandidatePool, PoolEntry};

/// One participant who may only be auto-assigned a limited number of times per
/// calendar month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotaPolicy {
    pub participant: String,
    pub monthly_cap: u32,
}

impl QuotaPolicy {
    pub fn new(participant: &str, monthly_cap: u32) -> Self {
        Self {
            participant: identity_key(participant),
            monthly_cap,
        }
    }

    fn covers(&self, name: &str) -> bool {
        identity_key(name) == self.participant
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnginePolicy {
    pub quota: Option<QuotaPolicy>,
    /// Identity keys whose presence in slot A enables the group override.
    pub group: HashSet<String>,
}

pub const DEFAULT_QUOTA_BOWLER: &str = "william";
pub const DEFAULT_QUOTA_MONTHLY_CAP: u32 = 1;
pub const DEFAULT_GROUP_BOWLERS: [&str; 4] = ["dan", "bernard", "jacob", "daniel"];

impl Default for EnginePolicy {
    fn default() -> Self {
        Self::new(
            Some(QuotaPolicy::new(
                DEFAULT_QUOTA_BOWLER,
                DEFAULT_QUOTA_MONTHLY_CAP,
            )),
            DEFAULT_GROUP_BOWLERS,
        )
    }
}

impl EnginePolicy {
    pub fn new<I, S>(quota: Option<QuotaPolicy>, group: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            quota,
            group: group
                .into_iter()
                .map(|name| identity_key(name.as_ref()))
                .filter(|key| !key.is_empty())
                .collect(),
        }
    }
}

/// State carried from one slot to the next.
#[derive(Debug, Clone, Default)]
struct AssignState {
    chosen: HashSet<String>,
    quota_generated: u32,
    slot_a: String,
}

struct Pass<'a> {
    target: &'a Match,
    pool: &'a [PoolEntry],
    settings: &'a SettingsConfig,
    quota: Option<&'a QuotaPolicy>,
    group: &'a HashSet<String>,
    /// Quota usage before this pass: the month's roster plus the match itself.
    quota_used: u32,
}

/// Proposes one occupant per slot for `target`, in slot order.
///
/// `roster` is the full roster (all months); it is only read to count how often
/// the quota participant already appears in the target's month.
pub fn suggest(
    target: &Match,
    pool: &CandidatePool,
    settings: &SettingsConfig,
    roster: &[Match],
    policy: &EnginePolicy,
) -> [Suggestion; 4] {
    let pass = Pass {
        target,
        pool: &pool.pool,
        settings,
        quota: policy.quota.as_ref(),
        group: &policy.group,
        quota_used: policy
            .quota
            .as_ref()
            .map(|quota| quota_used_before(target, roster, quota))
            .unwrap_or(0),
    };

    let seed = AssignState {
        chosen: target
            .slot_entries()
            .map(|(_, entry)| identity_key(&entry.name))
            .filter(|key| !key.is_empty())
            .collect(),
        ..AssignState::default()
    };

    let mut state = seed;
    SlotKey::ALL.map(|slot| {
        let (next, suggestion) = pass.step(std::mem::take(&mut state), slot);
        state = next;
        suggestion
    })
}

fn quota_used_before(target: &Match, roster: &[Match], quota: &QuotaPolicy) -> u32 {
    let month = month_key(target.parsed_date);
    let in_month: usize = roster
        .iter()
        .filter(|m| month_key(m.parsed_date) == month)
        .map(|m| {
            m.slot_entries()
                .filter(|(_, entry)| quota.covers(&entry.name))
                .count()
        })
        .sum();
    let in_target = target
        .slot_entries()
        .filter(|(_, entry)| quota.covers(&entry.name))
        .count();
    (in_month + in_target) as u32
}

impl<'a> Pass<'a> {
    fn step(&self, mut state: AssignState, slot: SlotKey) -> (AssignState, Suggestion) {
        let entry = self.target.slot(slot);
        let mode = self.settings.raw_mode(slot).to_uppercase();
        let strategy = Strategy::resolve(&mode);

        if entry.is_assigned() {
            let name = entry.occupant();
            if slot == SlotKey::A {
                state.slot_a = name.to_lowercase();
            }
            return (
                state,
                Suggestion {
                    slot,
                    strategy,
                    mode,
                    name: Some(name),
                    generated: false,
                    note: SuggestionNote::AlreadyAssigned,
                },
            );
        }

        let picked = match strategy {
            Strategy::Manual => {
                return (
                    state,
                    Suggestion {
                        slot,
                        strategy,
                        mode,
                        name: None,
                        generated: false,
                        note: SuggestionNote::ManualSkipped,
                    },
                );
            }
            Strategy::Anchor => {
                let candidates: Vec<&'a PoolEntry> = self
                    .open_candidates(&state)
                    .filter(|b| b.hdcp == 0)
                    .filter(|b| slot != SlotKey::A || !self.is_quota_participant(b))
                    .collect();
                pick_least_games(&candidates)
            }
            Strategy::GroupLeast => self.pick_group_least(&state),
            Strategy::Least => {
                let keep_participant_out = matches!(slot, SlotKey::C | SlotKey::Reserved);
                let candidates: Vec<&'a PoolEntry> = self
                    .open_candidates(&state)
                    .filter(|b| !keep_participant_out || !self.is_quota_participant(b))
                    .collect();
                pick_least_games(&candidates)
            }
        };

        let Some(picked) = picked else {
            return (
                state,
                Suggestion {
                    slot,
                    strategy,
                    mode,
                    name: None,
                    generated: false,
                    note: SuggestionNote::NoEligibleBowler,
                },
            );
        };

        if self.is_quota_participant(picked) {
            state.quota_generated += 1;
        }
        if slot == SlotKey::A {
            state.slot_a = picked.key.clone();
        }
        state.chosen.insert(picked.key.clone());

        (
            state,
            Suggestion {
                slot,
                strategy,
                mode,
                name: Some(picked.name.clone()),
                generated: true,
                note: SuggestionNote::Generated,
            },
        )
    }

    /// Prefer the quota participant when slot A holds a group member and the
    /// participant would win the fairness tie-break anyway.
    fn pick_group_least(&self, state: &AssignState) -> Option<&'a PoolEntry> {
        let candidates: Vec<&'a PoolEntry> = self.open_candidates(state).collect();
        let fairest = pick_least_games(&candidates);

        if self.group.contains(&state.slot_a) && self.quota_open(state) {
            let participant = candidates
                .iter()
                .copied()
                .find(|b| self.is_quota_participant(b));
            if let (Some(participant), Some(fairest)) = (participant, fairest)
                && participant.key == fairest.key
            {
                return Some(participant);
            }
        }
        fairest
    }

    /// Pool members not yet placed in this match. The quota participant drops
    /// out for every strategy once their monthly allowance is spent.
    fn open_candidates<'s>(
        &'s self,
        state: &'s AssignState,
    ) -> impl Iterator<Item = &'a PoolEntry> + 's {
        let quota_open = self.quota_open(state);
        self.pool
            .iter()
            .filter(move |b| !state.chosen.contains(&b.key))
            .filter(move |b| quota_open || !self.is_quota_participant(b))
    }

    fn quota_open(&self, state: &AssignState) -> bool {
        match self.quota {
            Some(quota) => self.quota_used + state.quota_generated < quota.monthly_cap,
            None => true,
        }
    }

    fn is_quota_participant(&self, entry: &PoolEntry) -> bool {
        self.quota.is_some_and(|quota| quota.participant == entry.key)
    }
}

/// Fewest games, then lowest average, then name.
pub fn fairness_order(a: &PoolEntry, b: &PoolEntry) -> Ordering {
    a.total_games
        .cmp(&b.total_games)
        .then_with(|| a.average.total_cmp(&b.average))
        .then_with(|| a.name.cmp(&b.name))
}

pub fn pick_least_games<'a>(candidates: &[&'a PoolEntry]) -> Option<&'a PoolEntry> {
    candidates
        .iter()
        .copied()
        .min_by(|a, b| fairness_order(a, b))
}

use std::collections::HashMap;

use crate::model::{Bowler, Match};
use crate::names::{identity_key, normalize_name};

/// Games credited per confirmed future slot (one league night is a 4-game block).
pub const LOOKAHEAD_GAMES_PER_SLOT: u32 = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct PoolEntry {
    pub name: String,
    /// Identity key of `name`, computed once when the pool is built.
    pub key: String,
    pub hdcp: u32,
    pub average: f64,
    /// Stats games plus confirmed lookahead games.
    pub total_games: u32,
}

impl PoolEntry {
    /// `name` must already be normalized.
    pub fn new(name: String, hdcp: u32, average: f64, total_games: u32) -> Self {
        Self {
            key: name.to_lowercase(),
            name,
            hdcp,
            average,
            total_games,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BowlerStats {
    pub hdcp: u32,
    pub average: f64,
    pub total_games: u32,
}

#[derive(Debug, Clone, Default)]
pub struct CandidatePool {
    /// Active bowlers only, lookahead-adjusted.
    pub pool: Vec<PoolEntry>,
    /// Every bowler by identity key, raw stats.
    pub stats_index: HashMap<String, BowlerStats>,
}

pub fn lookahead_games(roster: &[Match]) -> HashMap<String, u32> {
    let mut extra: HashMap<String, u32> = HashMap::new();
    for m in roster {
        for (key, entry) in m.slot_entries() {
            if !key.bowls() || !entry.is_confirmed() {
                continue;
            }
            let name = identity_key(&entry.name);
            if name.is_empty() {
                continue;
            }
            *extra.entry(name).or_insert(0) += LOOKAHEAD_GAMES_PER_SLOT;
        }
    }
    extra
}

pub fn build_pool(stats: &[Bowler], roster: &[Match]) -> CandidatePool {
    let extra = lookahead_games(roster);

    let pool = stats
        .iter()
        .filter(|b| b.active)
        .map(|b| {
            let name = normalize_name(&b.name);
            let bonus = extra.get(&name.to_lowercase()).copied().unwrap_or(0);
            PoolEntry::new(
                name,
                b.hdcp,
                b.average,
                b.total_games.saturating_add(bonus),
            )
        })
        .filter(|entry| !entry.name.is_empty())
        .collect();

    let mut stats_index = HashMap::new();
    for b in stats {
        let key = identity_key(&b.name);
        if key.is_empty() {
            continue;
        }
        stats_index.insert(
            key,
            BowlerStats {
                hdcp: b.hdcp,
                average: b.average,
                total_games: b.total_games,
            },
        );
    }

    CandidatePool { pool, stats_index }
}

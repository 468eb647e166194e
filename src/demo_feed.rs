//! Offline data for the `dummy` league so the terminal has something to show
//! without any sheet configured. Stats come from a fixed-seed RNG, so every
//! run (and every refresh) renders the same league.

use chrono::{Duration as ChronoDuration, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::DUMMY_LEAGUE;
use crate::model::{Bowler, Match, SettingsConfig, SlotKey};

const DEMO_SEED: u64 = 0x5eed_b0_71;

const DEMO_BOWLERS: [(&str, &str, bool); 10] = [
    ("Alice", "F", true),
    ("Bernard", "M", true),
    ("Carol", "F", true),
    ("Dan", "M", true),
    ("Evelyn", "F", true),
    ("Farid", "M", true),
    ("Grace", "F", false),
    ("Hiro", "M", true),
    ("Jacob", "M", true),
    ("William", "M", true),
];

const DEMO_OPPONENTS: [&str; 5] = [
    "Pin Crushers",
    "Gutter Gang",
    "Split Happens",
    "Lane Legends",
    "Strike Force",
];

pub fn demo_stats() -> Vec<Bowler> {
    let mut rng = StdRng::seed_from_u64(DEMO_SEED);
    DEMO_BOWLERS
        .iter()
        .map(|(name, gender, active)| {
            let average = rng.gen_range(140.0..205.0_f64).round();
            let games = rng.gen_range(2..9) * 4;
            // Handicap shrinks as the average approaches the scratch line.
            let hdcp = if average >= 190.0 {
                0
            } else {
                ((190.0 - average) * 0.4).round() as u32
            };
            let marker = if *active { "🟢" } else { "🔴" };
            Bowler {
                name: format!("{marker}\u{a0}\u{a0}{name}"),
                active: *active,
                hdcp,
                average,
                total_games: games,
                gender: Some(gender.to_string()),
                total_score: Some((average * games as f64).round() as u32),
            }
        })
        .collect()
}

/// Weekly fixtures around `today`: two played, one partly set, two open.
pub fn demo_roster(today: NaiveDate) -> Vec<Match> {
    let fixture = |week: i64, opponent: &str| {
        let date = today + ChronoDuration::days(week * 7);
        Match::new(DUMMY_LEAGUE, date, opponent)
    };

    vec![
        fixture(-2, DEMO_OPPONENTS[0])
            .with_slot(SlotKey::A, "Alice", "YES")
            .with_slot(SlotKey::B, "Bernard", "YES")
            .with_slot(SlotKey::C, "William", "YES")
            .with_slot(SlotKey::Reserved, "Carol", "NO"),
        fixture(-1, DEMO_OPPONENTS[1])
            .with_slot(SlotKey::A, "Dan", "YES")
            .with_slot(SlotKey::B, "Evelyn", "YES")
            .with_slot(SlotKey::C, "Hiro", "YES"),
        fixture(1, DEMO_OPPONENTS[2])
            .with_slot(SlotKey::A, "Jacob", "YES")
            .with_slot(SlotKey::B, "Farid", ""),
        fixture(2, DEMO_OPPONENTS[3]),
        fixture(3, DEMO_OPPONENTS[4]),
    ]
}

pub fn demo_settings() -> SettingsConfig {
    let mut settings = SettingsConfig::with_modes([
        (SlotKey::A, "ANCHOR"),
        (SlotKey::B, "GROUP,LEAST"),
        (SlotKey::C, "LEAST"),
        (SlotKey::Reserved, "LEAST"),
    ]);
    settings.league = DUMMY_LEAGUE.to_string();
    settings.active = true;
    settings.title = Some("Generic League".to_string());
    settings
}

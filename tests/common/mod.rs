//! Shared helpers for integration tests.

#![allow(dead_code)]

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tournament_manager_web::{
    Capacity, MatchDuration, Sport, Team, Tournament, TournamentConfig, TournamentFormat,
};

pub fn config(format: TournamentFormat, capacity: Capacity) -> TournamentConfig {
    TournamentConfig::new(
        "Copa Barrio",
        Sport::Field,
        format,
        capacity,
        MatchDuration::Thirty,
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
    )
    .unwrap()
}

pub fn teams(n: usize) -> Vec<Team> {
    (0..n).map(|i| Team::new(format!("T{i}"))).collect()
}

pub fn tournament_with_teams(format: TournamentFormat, n: usize) -> Tournament {
    Tournament::with_teams(config(format, Capacity::Eight), teams(n))
}

pub fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

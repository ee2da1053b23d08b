//! Data structures for the tournament: teams, config, matches, rounds and bracket state.

mod bracket;
mod config;
mod game;
mod team;
mod tournament;

pub use bracket::{BracketError, BracketState};
pub use config::{
    Capacity, InvalidConfigValue, MatchDuration, Sport, TournamentConfig, TournamentFormat,
};
pub use game::{Group, Grouping, Match, Round, RoundStructure, Side};
pub use team::{Team, TeamId};
pub use tournament::{Tournament, TournamentError, TournamentId, TournamentUpdate};

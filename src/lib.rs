//! Amateur sports tournament manager: library with models, bracket logic and round persistence.

pub mod logic;
pub mod models;
pub mod persistence;

pub use logic::{
    advance, confirm_round, generate_initial_round, generate_pairings, generate_pairings_with_rng,
    import_teams_csv, parse_score, set_match_score, set_score, submit_round, ScoreInput,
    DEFAULT_GROUP_SIZE,
};
pub use models::{
    BracketError, BracketState, Capacity, Group, Grouping, InvalidConfigValue, Match,
    MatchDuration, Round, RoundStructure, Side, Sport, Team, TeamId, Tournament, TournamentConfig,
    TournamentError, TournamentFormat, TournamentId, TournamentUpdate,
};
pub use persistence::{
    load_bracket, save_bracket, sweep_orphans, JsonFileRoundStore, MemoryRoundStore,
    PersistenceError, RoundStore,
};

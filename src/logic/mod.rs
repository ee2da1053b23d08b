//! Tournament business logic: pairing generation, score entry, round advancement, roster import.

mod advancement;
mod pairing;
mod roster;
mod scores;

pub use advancement::{advance, confirm_round, submit_round};
pub use pairing::{
    generate_initial_round, generate_pairings, generate_pairings_with_rng, DEFAULT_GROUP_SIZE,
};
pub use roster::import_teams_csv;
pub use scores::{parse_score, set_match_score, set_score, ScoreInput};

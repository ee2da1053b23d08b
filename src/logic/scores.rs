//! Score entry: parse raw input and write it into a single match.

use crate::models::{BracketError, BracketState, Round, Side, Tournament, TournamentError};
use serde::{Deserialize, Serialize};

/// Raw score as typed by the user: text from a form field or a JSON number.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScoreInput {
    Number(i64),
    Text(String),
    /// Any other JSON value (`null`, floats, out-of-range integers, ...).
    Other(serde_json::Value),
}

impl From<&str> for ScoreInput {
    fn from(s: &str) -> Self {
        ScoreInput::Text(s.to_string())
    }
}

impl From<i64> for ScoreInput {
    fn from(n: i64) -> Self {
        ScoreInput::Number(n)
    }
}

/// Parse a score. Empty text or `null` clears it (`Ok(None)`); anything else
/// must be a non-negative integer.
pub fn parse_score(input: &ScoreInput) -> Result<Option<u32>, BracketError> {
    match input {
        ScoreInput::Number(n) => u32::try_from(*n)
            .map(Some)
            .map_err(|_| BracketError::InvalidScore(n.to_string())),
        ScoreInput::Text(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            // u32's parser accepts a leading '+'; only plain digits count here.
            if !trimmed.bytes().all(|b| b.is_ascii_digit()) {
                return Err(BracketError::InvalidScore(raw.clone()));
            }
            trimmed
                .parse::<u32>()
                .map(Some)
                .map_err(|_| BracketError::InvalidScore(raw.clone()))
        }
        ScoreInput::Other(serde_json::Value::Null) => Ok(None),
        ScoreInput::Other(other) => Err(BracketError::InvalidScore(other.to_string())),
    }
}

/// Set one side's score of one match. On error nothing is written.
pub fn set_score(
    round: &mut Round,
    match_index: usize,
    side: Side,
    input: &ScoreInput,
) -> Result<(), BracketError> {
    let value = parse_score(input)?;
    let m = round
        .matches
        .get_mut(match_index)
        .ok_or(BracketError::MatchNotFound(match_index))?;
    *m.score_mut(side) = value;
    Ok(())
}

/// Set a score in the tournament's current (frontier) round.
pub fn set_match_score(
    tournament: &mut Tournament,
    round_index: usize,
    match_index: usize,
    side: Side,
    input: &ScoreInput,
) -> Result<(), TournamentError> {
    let rounds = match &mut tournament.bracket {
        BracketState::Elimination { rounds } => rounds,
        BracketState::Groups { .. } => return Err(BracketError::NotElimination.into()),
        BracketState::Empty => return Err(TournamentError::InvalidState),
    };
    let frontier = rounds
        .len()
        .checked_sub(1)
        .ok_or(TournamentError::InvalidState)?;
    if round_index > frontier {
        return Err(BracketError::RoundNotFound(round_index).into());
    }
    if round_index != frontier {
        return Err(BracketError::NotFrontierRound { frontier }.into());
    }
    set_score(&mut rounds[round_index], match_index, side, input)?;
    Ok(())
}

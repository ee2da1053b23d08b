//! Round confirmation: winners of paired matches meet in the next round.

use crate::models::{BracketError, BracketState, Match, Round, Tournament, TournamentError};

/// Build the next round from a complete round.
///
/// Winners of matches `2i` and `2i + 1` meet in match `i` of the next round.
/// The winner of a trailing unpaired match does not advance. A one-match round
/// yields an empty round, which marks the end of the bracket.
pub fn advance(round: &Round) -> Result<Round, BracketError> {
    if let Some(match_index) = round.matches.iter().position(|m| !m.is_complete()) {
        return Err(BracketError::IncompleteRound { match_index });
    }
    let matches = round
        .winner_pairs()
        .into_iter()
        .map(|(first, second)| Match::new(first, second))
        .collect();
    Ok(Round::new(matches))
}

/// Confirm the frontier round and append the next one. Returns the new round.
pub fn confirm_round(
    bracket: &mut BracketState,
    round_index: usize,
) -> Result<&Round, BracketError> {
    let rounds = match bracket {
        BracketState::Elimination { rounds } => rounds,
        BracketState::Groups { .. } => return Err(BracketError::NotElimination),
        BracketState::Empty => return Err(BracketError::RoundNotFound(round_index)),
    };
    let frontier = rounds
        .len()
        .checked_sub(1)
        .ok_or(BracketError::RoundNotFound(round_index))?;
    if round_index > frontier {
        return Err(BracketError::RoundNotFound(round_index));
    }
    if round_index != frontier {
        return Err(BracketError::NotFrontierRound { frontier });
    }
    let current = &rounds[frontier];
    if current.matches.is_empty() {
        return Err(BracketError::BracketFinished);
    }
    let next = advance(current)?;
    rounds.push(next);
    Ok(&rounds[frontier + 1])
}

/// Confirm the given round of the tournament's elimination bracket.
pub fn submit_round(tournament: &mut Tournament, round_index: usize) -> Result<(), TournamentError> {
    if tournament.bracket.is_empty() {
        return Err(TournamentError::InvalidState);
    }
    confirm_round(&mut tournament.bracket, round_index)?;
    Ok(())
}

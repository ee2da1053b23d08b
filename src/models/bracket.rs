//! BracketState (round history of a tournament) and engine errors.

use crate::models::game::{Grouping, Round, RoundStructure};
use crate::models::team::TeamId;
use serde::{Deserialize, Serialize};

/// Errors reported by pairing generation, score entry and round confirmation.
/// A failed call never leaves partial changes behind.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum BracketError {
    /// No teams to pair.
    EmptyRoster,
    /// Roster is smaller than the declared capacity.
    InsufficientTeams { required: usize, available: usize },
    /// Group size must be at least 1.
    InvalidGroupSize,
    /// Score input is not empty and not a non-negative integer.
    InvalidScore(String),
    RoundNotFound(usize),
    MatchNotFound(usize),
    /// A match of the round still lacks a score.
    IncompleteRound { match_index: usize },
    /// Only the most recent round accepts scores or confirmation.
    NotFrontierRound { frontier: usize },
    /// Group format has no rounds to advance.
    NotElimination,
    /// The bracket already reached its terminal (empty) round.
    BracketFinished,
}

impl std::fmt::Display for BracketError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BracketError::EmptyRoster => write!(f, "No teams to pair"),
            BracketError::InsufficientTeams {
                required,
                available,
            } => write!(
                f,
                "Need at least {} teams to generate pairings (have {})",
                required, available
            ),
            BracketError::InvalidGroupSize => write!(f, "Group size must be at least 1"),
            BracketError::InvalidScore(raw) => {
                write!(f, "Score must be a non-negative whole number (got {:?})", raw)
            }
            BracketError::RoundNotFound(i) => write!(f, "Round {} does not exist", i),
            BracketError::MatchNotFound(i) => write!(f, "Match {} does not exist", i),
            BracketError::IncompleteRound { match_index } => {
                write!(f, "Match {} has no result yet", match_index)
            }
            BracketError::NotFrontierRound { frontier } => {
                write!(f, "Only the current round ({}) can be changed", frontier)
            }
            BracketError::NotElimination => write!(f, "Group format has no rounds to advance"),
            BracketError::BracketFinished => write!(f, "The bracket is already finished"),
        }
    }
}

impl std::error::Error for BracketError {}

/// Pairing history of a tournament.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BracketState {
    /// Nothing generated yet.
    #[default]
    Empty,
    /// Append-only list of rounds; the last one is the frontier.
    Elimination { rounds: Vec<Round> },
    /// The single static grouping.
    Groups { grouping: Grouping },
}

impl BracketState {
    pub fn is_empty(&self) -> bool {
        matches!(self, BracketState::Empty)
    }

    /// Elimination rounds (empty slice for other states).
    pub fn rounds(&self) -> &[Round] {
        match self {
            BracketState::Elimination { rounds } => rounds,
            _ => &[],
        }
    }

    /// Index of the most recent round, if any.
    pub fn frontier(&self) -> Option<usize> {
        self.rounds().len().checked_sub(1)
    }

    /// True once a confirmation produced a round with no matches.
    pub fn is_finished(&self) -> bool {
        self.rounds().last().is_some_and(|r| r.matches.is_empty())
    }

    /// Winner of the last real match, once the bracket is finished.
    pub fn champion(&self) -> Option<TeamId> {
        let rounds = self.rounds();
        match rounds {
            [.., final_round, terminal] if terminal.matches.is_empty() => {
                match final_round.matches.as_slice() {
                    [only] => only.winner(),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    /// True if pairings can still be reshuffled: nothing scored, nothing confirmed.
    pub fn can_regenerate(&self) -> bool {
        match self {
            BracketState::Empty | BracketState::Groups { .. } => true,
            BracketState::Elimination { rounds } => {
                rounds.len() <= 1 && rounds.iter().all(Round::is_untouched)
            }
        }
    }

    /// Flatten into the persisted ordered list of rounds.
    pub fn to_structures(&self) -> Vec<RoundStructure> {
        match self {
            BracketState::Empty => Vec::new(),
            BracketState::Elimination { rounds } => rounds
                .iter()
                .cloned()
                .map(RoundStructure::Elimination)
                .collect(),
            BracketState::Groups { grouping } => vec![RoundStructure::Groups(grouping.clone())],
        }
    }

    /// Rebuild from a persisted list. None if the list mixes groupings with
    /// rounds, holds more than one grouping, or is not a valid elimination
    /// history (see [`BracketState::is_valid_history`]).
    pub fn from_structures(structures: Vec<RoundStructure>) -> Option<Self> {
        if structures.is_empty() {
            return Some(BracketState::Empty);
        }
        let mut rounds = Vec::with_capacity(structures.len());
        let mut grouping = None;
        for s in structures {
            match s {
                RoundStructure::Elimination(round) if grouping.is_none() => rounds.push(round),
                RoundStructure::Groups(g) if rounds.is_empty() && grouping.is_none() => {
                    grouping = Some(g)
                }
                _ => return None,
            }
        }
        match grouping {
            Some(grouping) => Some(BracketState::Groups { grouping }),
            None if Self::is_valid_history(&rounds) => Some(BracketState::Elimination { rounds }),
            None => None,
        }
    }

    /// Every round before the last is non-empty and complete, and the round
    /// after it pairs exactly its winners.
    pub fn is_valid_history(rounds: &[Round]) -> bool {
        rounds.windows(2).all(|w| {
            let (done, next) = (&w[0], &w[1]);
            let pairs: Vec<_> = next
                .matches
                .iter()
                .map(|m| (m.team_a_id, m.team_b_id))
                .collect();
            !done.matches.is_empty() && done.is_complete() && pairs == done.winner_pairs()
        })
    }
}

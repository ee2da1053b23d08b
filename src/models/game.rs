//! Match, Round, Group and the persisted round structure.

use crate::models::team::TeamId;
use serde::{Deserialize, Serialize};

/// Which side of a match a score belongs to.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum Side {
    #[serde(alias = "a")]
    A,
    #[serde(alias = "b")]
    B,
}

/// A pairing of two teams with their scores (None until entered).
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub team_a_id: TeamId,
    pub team_b_id: TeamId,
    pub score_a: Option<u32>,
    pub score_b: Option<u32>,
}

impl Match {
    pub fn new(team_a_id: TeamId, team_b_id: TeamId) -> Self {
        Self {
            team_a_id,
            team_b_id,
            score_a: None,
            score_b: None,
        }
    }

    /// True once both sides have a score.
    pub fn is_complete(&self) -> bool {
        self.score_a.is_some() && self.score_b.is_some()
    }

    pub fn score(&self, side: Side) -> Option<u32> {
        match side {
            Side::A => self.score_a,
            Side::B => self.score_b,
        }
    }

    pub fn team(&self, side: Side) -> TeamId {
        match side {
            Side::A => self.team_a_id,
            Side::B => self.team_b_id,
        }
    }

    /// Winning side of a complete match. Side A needs a strictly greater score;
    /// a tie goes to side B.
    pub fn winning_side(&self) -> Option<Side> {
        match (self.score_a, self.score_b) {
            (Some(a), Some(b)) if a > b => Some(Side::A),
            (Some(_), Some(_)) => Some(Side::B),
            _ => None,
        }
    }

    /// Winning team of a complete match (see [`Match::winning_side`]).
    pub fn winner(&self) -> Option<TeamId> {
        self.winning_side().map(|side| self.team(side))
    }

    pub fn involves(&self, team_id: TeamId) -> bool {
        self.team_a_id == team_id || self.team_b_id == team_id
    }

    pub(crate) fn score_mut(&mut self, side: Side) -> &mut Option<u32> {
        match side {
            Side::A => &mut self.score_a,
            Side::B => &mut self.score_b,
        }
    }
}

/// One elimination round: an ordered list of matches.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Round {
    pub matches: Vec<Match>,
}

impl Round {
    pub fn new(matches: Vec<Match>) -> Self {
        Self { matches }
    }

    /// Every match has both scores.
    pub fn is_complete(&self) -> bool {
        self.matches.iter().all(Match::is_complete)
    }

    /// True if no score has been entered on any match.
    pub fn is_untouched(&self) -> bool {
        self.matches
            .iter()
            .all(|m| m.score_a.is_none() && m.score_b.is_none())
    }

    /// Winners of matches `2i` and `2i + 1`, paired up. A trailing unpaired
    /// match contributes nothing; incomplete pairs are skipped.
    pub fn winner_pairs(&self) -> Vec<(TeamId, TeamId)> {
        self.matches
            .chunks_exact(2)
            .filter_map(|pair| Some((pair[0].winner()?, pair[1].winner()?)))
            .collect()
    }

    pub fn team_ids(&self) -> impl Iterator<Item = TeamId> + '_ {
        self.matches
            .iter()
            .flat_map(|m| [m.team_a_id, m.team_b_id])
    }
}

/// A static group of teams (group format).
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Group {
    pub teams: Vec<TeamId>,
}

/// The single grouping step of the group format.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Grouping {
    pub groups: Vec<Group>,
}

/// Output of pairing generation, and the unit the persistence layer stores:
/// `{ "matches": [...] }` or `{ "groups": [[...], ...] }`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RoundStructure {
    Elimination(Round),
    Groups(Grouping),
}

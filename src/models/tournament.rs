//! Tournament and TournamentError.

use crate::models::bracket::{BracketError, BracketState};
use crate::models::config::{
    Capacity, InvalidConfigValue, MatchDuration, Sport, TournamentConfig, TournamentFormat,
};
use crate::models::team::{Team, TeamId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Errors that can occur during tournament operations.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TournamentError {
    /// Team name is empty after trimming.
    EmptyTeamName,
    /// A team with this name already exists (names are unique, case-insensitive).
    DuplicateTeamName,
    /// Team not found in the roster.
    TeamNotFound(TeamId),
    /// Tournament is not in a state that allows this action.
    InvalidState,
    /// Pairings already have scores or confirmed rounds and can no longer be reshuffled.
    PairingsLocked,
    /// A config value is outside the allowed set.
    InvalidConfig(InvalidConfigValue),
    /// Roster import failed at the given (1-based) data row.
    ImportFailed { row: usize, message: String },
    /// Error from the bracket engine.
    Bracket(BracketError),
}

impl std::fmt::Display for TournamentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TournamentError::EmptyTeamName => write!(f, "Team name must not be empty"),
            TournamentError::DuplicateTeamName => write!(f, "A team with this name already exists"),
            TournamentError::TeamNotFound(_) => write!(f, "Team not found"),
            TournamentError::InvalidState => write!(f, "Invalid state for this action"),
            TournamentError::PairingsLocked => {
                write!(f, "Pairings can no longer be regenerated once results are entered")
            }
            TournamentError::InvalidConfig(e) => write!(f, "{}", e),
            TournamentError::ImportFailed { row, message } => {
                write!(f, "Import failed at row {}: {}", row, message)
            }
            TournamentError::Bracket(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for TournamentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TournamentError::InvalidConfig(e) => Some(e),
            TournamentError::Bracket(e) => Some(e),
            _ => None,
        }
    }
}

impl From<BracketError> for TournamentError {
    fn from(e: BracketError) -> Self {
        TournamentError::Bracket(e)
    }
}

impl From<InvalidConfigValue> for TournamentError {
    fn from(e: InvalidConfigValue) -> Self {
        TournamentError::InvalidConfig(e)
    }
}

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

/// Editable tournament details. `None` keeps the current value.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct TournamentUpdate {
    pub name: Option<String>,
    pub sport: Option<Sport>,
    pub format: Option<TournamentFormat>,
    pub capacity: Option<Capacity>,
    pub match_duration: Option<MatchDuration>,
    pub start_date: Option<NaiveDate>,
}

/// Full tournament state: config, roster and pairing history.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub config: TournamentConfig,
    /// Registered teams, in registration order.
    pub teams: Vec<Team>,
    pub bracket: BracketState,
}

impl Tournament {
    /// Create a new tournament with an empty roster and no pairings.
    pub fn new(config: TournamentConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            config,
            teams: Vec::new(),
            bracket: BracketState::Empty,
        }
    }

    /// Create a tournament with an initial roster. Pairings are not generated.
    pub fn with_teams(config: TournamentConfig, teams: Vec<Team>) -> Self {
        Self {
            teams,
            ..Self::new(config)
        }
    }

    pub fn team(&self, id: TeamId) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == id)
    }

    /// Winner of a finished elimination bracket.
    pub fn champion(&self) -> Option<&Team> {
        self.bracket.champion().and_then(|id| self.team(id))
    }

    fn check_name_free(&self, name: &str, except: Option<TeamId>) -> Result<(), TournamentError> {
        let folded = name.to_lowercase();
        let taken = self
            .teams
            .iter()
            .any(|t| Some(t.id) != except && t.name.to_lowercase() == folded);
        if taken {
            return Err(TournamentError::DuplicateTeamName);
        }
        Ok(())
    }

    /// Add a team. Names must be unique (case-insensitive). Allowed at any time:
    /// pairings already generated keep using their own snapshot of the roster.
    pub fn add_team(&mut self, name: impl Into<String>) -> Result<TeamId, TournamentError> {
        let name = name.into();
        let name_trimmed = name.trim();
        if name_trimmed.is_empty() {
            return Err(TournamentError::EmptyTeamName);
        }
        self.check_name_free(name_trimmed, None)?;
        let team = Team::new(name_trimmed);
        let id = team.id;
        self.teams.push(team);
        Ok(id)
    }

    /// Rename a team; its id (and so its place in pairings) is unchanged.
    pub fn rename_team(
        &mut self,
        team_id: TeamId,
        name: impl Into<String>,
    ) -> Result<(), TournamentError> {
        let name = name.into();
        let name_trimmed = name.trim();
        if name_trimmed.is_empty() {
            return Err(TournamentError::EmptyTeamName);
        }
        self.check_name_free(name_trimmed, Some(team_id))?;
        self.teams
            .iter_mut()
            .find(|t| t.id == team_id)
            .ok_or(TournamentError::TeamNotFound(team_id))?
            .rename(name_trimmed);
        Ok(())
    }

    /// Remove a team by id (only before pairings are generated).
    pub fn remove_team(&mut self, team_id: TeamId) -> Result<(), TournamentError> {
        if !self.bracket.is_empty() {
            return Err(TournamentError::InvalidState);
        }
        let idx = self
            .teams
            .iter()
            .position(|t| t.id == team_id)
            .ok_or(TournamentError::TeamNotFound(team_id))?;
        self.teams.remove(idx);
        Ok(())
    }

    /// Apply edited details. Format and capacity are engine inputs and can only
    /// change while no pairings exist.
    pub fn update_details(&mut self, update: TournamentUpdate) -> Result<(), TournamentError> {
        let changes_engine_input = update.format.is_some_and(|f| f != self.config.format)
            || update.capacity.is_some_and(|c| c != self.config.capacity);
        if changes_engine_input && !self.bracket.is_empty() {
            return Err(TournamentError::InvalidState);
        }
        let name = match update.name.as_deref().map(str::trim) {
            Some("") => {
                return Err(TournamentError::InvalidConfig(InvalidConfigValue {
                    field: "name",
                    value: String::new(),
                }))
            }
            Some(name) => name.to_string(),
            None => self.config.name.clone(),
        };

        let config = &mut self.config;
        config.name = name;
        if let Some(sport) = update.sport {
            config.sport = sport;
        }
        if let Some(format) = update.format {
            config.format = format;
        }
        if let Some(capacity) = update.capacity {
            config.capacity = capacity;
        }
        if let Some(duration) = update.match_duration {
            config.match_duration = duration;
        }
        if let Some(date) = update.start_date {
            config.start_date = date;
        }
        Ok(())
    }
}

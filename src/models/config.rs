//! Tournament configuration: format, capacity and descriptive metadata.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How pairings are generated for a tournament.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentFormat {
    /// Teams are split into fixed-size groups; no advancement.
    #[serde(alias = "fase_grupos")]
    Group,
    /// Single elimination: losers are removed each round.
    #[serde(alias = "eliminacion_directa", alias = "single-elimination")]
    Elimination,
}

/// Error for config values that fall outside the allowed set.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InvalidConfigValue {
    pub field: &'static str,
    pub value: String,
}

impl fmt::Display for InvalidConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid {}: {}", self.field, self.value)
    }
}

impl std::error::Error for InvalidConfigValue {}

impl FromStr for TournamentFormat {
    type Err = InvalidConfigValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "group" | "fase_grupos" => Ok(TournamentFormat::Group),
            "elimination" | "single-elimination" | "eliminacion_directa" => {
                Ok(TournamentFormat::Elimination)
            }
            other => Err(InvalidConfigValue {
                field: "format",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for TournamentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TournamentFormat::Group => write!(f, "group"),
            TournamentFormat::Elimination => write!(f, "elimination"),
        }
    }
}

/// Declared number of teams. Serialized as the plain integer (8, 16 or 32).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum Capacity {
    Eight,
    Sixteen,
    ThirtyTwo,
}

impl Capacity {
    pub fn teams(self) -> usize {
        match self {
            Capacity::Eight => 8,
            Capacity::Sixteen => 16,
            Capacity::ThirtyTwo => 32,
        }
    }
}

impl TryFrom<u32> for Capacity {
    type Error = InvalidConfigValue;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            8 => Ok(Capacity::Eight),
            16 => Ok(Capacity::Sixteen),
            32 => Ok(Capacity::ThirtyTwo),
            other => Err(InvalidConfigValue {
                field: "capacity",
                value: other.to_string(),
            }),
        }
    }
}

impl From<Capacity> for u32 {
    fn from(capacity: Capacity) -> u32 {
        capacity.teams() as u32
    }
}

/// Match length in minutes. Display only; the engine never reads it.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum MatchDuration {
    Twenty,
    Thirty,
    FortyFive,
    #[default]
    Sixty,
}

impl MatchDuration {
    pub fn minutes(self) -> u32 {
        match self {
            MatchDuration::Twenty => 20,
            MatchDuration::Thirty => 30,
            MatchDuration::FortyFive => 45,
            MatchDuration::Sixty => 60,
        }
    }
}

impl TryFrom<u32> for MatchDuration {
    type Error = InvalidConfigValue;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            20 => Ok(MatchDuration::Twenty),
            30 => Ok(MatchDuration::Thirty),
            45 => Ok(MatchDuration::FortyFive),
            60 => Ok(MatchDuration::Sixty),
            other => Err(InvalidConfigValue {
                field: "match_duration",
                value: other.to_string(),
            }),
        }
    }
}

impl From<MatchDuration> for u32 {
    fn from(duration: MatchDuration) -> u32 {
        duration.minutes()
    }
}

/// Kind of football played.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sport {
    #[default]
    #[serde(alias = "campo")]
    Field,
    #[serde(alias = "salon")]
    Indoor,
}

/// Settings chosen when the tournament is created.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TournamentConfig {
    pub name: String,
    pub sport: Sport,
    pub format: TournamentFormat,
    pub capacity: Capacity,
    pub match_duration: MatchDuration,
    pub start_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl TournamentConfig {
    /// Build a config stamped with the current time. The name is trimmed and must not be empty.
    pub fn new(
        name: &str,
        sport: Sport,
        format: TournamentFormat,
        capacity: Capacity,
        match_duration: MatchDuration,
        start_date: NaiveDate,
    ) -> Result<Self, InvalidConfigValue> {
        let name = name.trim();
        if name.is_empty() {
            return Err(InvalidConfigValue {
                field: "name",
                value: String::new(),
            });
        }
        Ok(Self {
            name: name.to_string(),
            sport,
            format,
            capacity,
            match_duration,
            start_date,
            created_at: Utc::now(),
        })
    }
}

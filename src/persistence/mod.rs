//! Round persistence: where generated rounds are saved and loaded.
//!
//! Stores only ever see the persisted shape (an ordered list of
//! [`RoundStructure`]s per tournament); the engine does not depend on them.

mod json_file;
mod memory;

pub use json_file::JsonFileRoundStore;
pub use memory::MemoryRoundStore;

use crate::models::{BracketState, RoundStructure, TournamentId};

/// Errors raised by round stores.
#[derive(Debug)]
pub enum PersistenceError {
    Io(std::io::Error),
    Serialization(serde_json::Error),
    /// Stored rounds do not form a valid bracket history.
    MalformedHistory(TournamentId),
    /// Shared state was poisoned by a panicking writer.
    Poisoned,
}

impl std::fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PersistenceError::Io(e) => write!(f, "Storage I/O error: {}", e),
            PersistenceError::Serialization(e) => write!(f, "Storage format error: {}", e),
            PersistenceError::MalformedHistory(id) => {
                write!(f, "Stored rounds for tournament {} are malformed", id)
            }
            PersistenceError::Poisoned => write!(f, "lock error"),
        }
    }
}

impl std::error::Error for PersistenceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PersistenceError::Io(e) => Some(e),
            PersistenceError::Serialization(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PersistenceError {
    fn from(e: std::io::Error) -> Self {
        PersistenceError::Io(e)
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(e: serde_json::Error) -> Self {
        PersistenceError::Serialization(e)
    }
}

/// Storage for a tournament's ordered round list.
pub trait RoundStore: Send + Sync {
    /// Replace the stored rounds of a tournament.
    fn save(&self, id: TournamentId, rounds: &[RoundStructure]) -> Result<(), PersistenceError>;

    /// Stored rounds, or None if nothing was saved for this tournament.
    fn load(&self, id: TournamentId) -> Result<Option<Vec<RoundStructure>>, PersistenceError>;

    /// Forget a tournament. Removing an unknown id is not an error.
    fn remove(&self, id: TournamentId) -> Result<(), PersistenceError>;

    /// Ids of every tournament with stored rounds.
    fn ids(&self) -> Result<Vec<TournamentId>, PersistenceError>;
}

/// Remove stored rounds of every tournament for which `is_live` is false.
/// Returns how many were removed.
///
/// Stored ids are listed before `is_live` is asked, so a tournament that
/// registers before its first save is never swept.
pub fn sweep_orphans<F>(store: &dyn RoundStore, is_live: F) -> Result<usize, PersistenceError>
where
    F: Fn(&TournamentId) -> bool,
{
    let mut removed = 0;
    for id in store.ids()? {
        if !is_live(&id) {
            store.remove(id)?;
            removed += 1;
        }
    }
    Ok(removed)
}

/// Save a bracket's rounds.
pub fn save_bracket(
    store: &dyn RoundStore,
    id: TournamentId,
    bracket: &BracketState,
) -> Result<(), PersistenceError> {
    store.save(id, &bracket.to_structures())
}

/// Load and validate a bracket. Unknown ids load as an empty bracket.
pub fn load_bracket(
    store: &dyn RoundStore,
    id: TournamentId,
) -> Result<BracketState, PersistenceError> {
    match store.load(id)? {
        None => Ok(BracketState::Empty),
        Some(structures) => BracketState::from_structures(structures)
            .ok_or(PersistenceError::MalformedHistory(id)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use uuid::Uuid;

    #[test]
    fn sweep_keeps_live_tournaments() {
        let store = MemoryRoundStore::new();
        let (live, orphan) = (Uuid::new_v4(), Uuid::new_v4());
        store.save(live, &[]).unwrap();
        store.save(orphan, &[]).unwrap();

        let keep: HashSet<_> = [live].into_iter().collect();
        assert_eq!(sweep_orphans(&store, |id| keep.contains(id)).unwrap(), 1);
        assert_eq!(store.ids().unwrap(), vec![live]);
        assert_eq!(sweep_orphans(&store, |id| keep.contains(id)).unwrap(), 0);

        assert_eq!(sweep_orphans(&store, |_| false).unwrap(), 1);
        assert!(store.ids().unwrap().is_empty());
    }
}

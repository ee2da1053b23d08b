//! In-process round store.

use super::{PersistenceError, RoundStore};
use crate::models::{RoundStructure, TournamentId};
use std::collections::HashMap;
use std::sync::RwLock;

/// Rounds kept in a map; lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryRoundStore {
    rounds: RwLock<HashMap<TournamentId, Vec<RoundStructure>>>,
}

impl MemoryRoundStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RoundStore for MemoryRoundStore {
    fn save(&self, id: TournamentId, rounds: &[RoundStructure]) -> Result<(), PersistenceError> {
        let mut g = self.rounds.write().map_err(|_| PersistenceError::Poisoned)?;
        g.insert(id, rounds.to_vec());
        Ok(())
    }

    fn load(&self, id: TournamentId) -> Result<Option<Vec<RoundStructure>>, PersistenceError> {
        let g = self.rounds.read().map_err(|_| PersistenceError::Poisoned)?;
        Ok(g.get(&id).cloned())
    }

    fn remove(&self, id: TournamentId) -> Result<(), PersistenceError> {
        let mut g = self.rounds.write().map_err(|_| PersistenceError::Poisoned)?;
        g.remove(&id);
        Ok(())
    }

    fn ids(&self) -> Result<Vec<TournamentId>, PersistenceError> {
        let g = self.rounds.read().map_err(|_| PersistenceError::Poisoned)?;
        Ok(g.keys().copied().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Match, Round};
    use uuid::Uuid;

    #[test]
    fn save_load_remove() {
        let store = MemoryRoundStore::new();
        let id = Uuid::new_v4();
        assert_eq!(store.load(id).unwrap(), None);

        let rounds = vec![RoundStructure::Elimination(Round::new(vec![Match::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
        )]))];
        store.save(id, &rounds).unwrap();
        assert_eq!(store.load(id).unwrap(), Some(rounds));
        assert_eq!(store.ids().unwrap(), vec![id]);

        store.remove(id).unwrap();
        assert_eq!(store.load(id).unwrap(), None);
        assert!(store.ids().unwrap().is_empty());
        store.remove(id).unwrap();
    }
}

//! Round store backed by one JSON file per tournament.

use super::{PersistenceError, RoundStore};
use crate::models::{RoundStructure, TournamentId};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Writes `<dir>/<tournament id>.json` holding the round list.
#[derive(Clone, Debug)]
pub struct JsonFileRoundStore {
    dir: PathBuf,
}

impl JsonFileRoundStore {
    /// Open a store in `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, PersistenceError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        log::info!("Round store directory: {}", dir.display());
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: TournamentId) -> PathBuf {
        self.dir.join(format!("{}.json", id))
    }
}

impl RoundStore for JsonFileRoundStore {
    fn save(&self, id: TournamentId, rounds: &[RoundStructure]) -> Result<(), PersistenceError> {
        let path = self.path_for(id);
        let tmp = path.with_extension("json.tmp");
        let body = serde_json::to_vec_pretty(rounds)?;
        fs::write(&tmp, body)?;
        fs::rename(&tmp, &path)?;
        log::debug!("Saved {} round(s) for tournament {}", rounds.len(), id);
        Ok(())
    }

    fn load(&self, id: TournamentId) -> Result<Option<Vec<RoundStructure>>, PersistenceError> {
        match fs::read(self.path_for(id)) {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn remove(&self, id: TournamentId) -> Result<(), PersistenceError> {
        match fs::remove_file(self.path_for(id)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Files named `<uuid>.json`; anything else in the directory is ignored.
    fn ids(&self) -> Result<Vec<TournamentId>, PersistenceError> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(id) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.parse::<TournamentId>().ok())
            {
                ids.push(id);
            }
        }
        Ok(ids)
    }
}

//! Roster import from CSV (one team per row, `name` column).

use crate::models::{TeamId, Tournament, TournamentError};
use serde::Deserialize;
use std::io::Read;

#[derive(Deserialize)]
struct TeamRecord {
    name: String,
}

/// Add every team listed in the CSV. The file must have a header row with a
/// `name` column; other columns are ignored. Rows are validated before any
/// team is added, so a failure leaves the roster unchanged.
pub fn import_teams_csv<R: Read>(
    tournament: &mut Tournament,
    reader: R,
) -> Result<Vec<TeamId>, TournamentError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut names = Vec::new();
    for (i, result) in rdr.deserialize().enumerate() {
        let record: TeamRecord = result.map_err(|e| TournamentError::ImportFailed {
            row: i + 1,
            message: e.to_string(),
        })?;
        names.push(record.name);
    }

    let mut staged = tournament.clone();
    let mut ids = Vec::with_capacity(names.len());
    for (i, name) in names.into_iter().enumerate() {
        let id = staged
            .add_team(name)
            .map_err(|e| TournamentError::ImportFailed {
                row: i + 1,
                message: e.to_string(),
            })?;
        ids.push(id);
    }
    tournament.teams = staged.teams;
    Ok(ids)
}

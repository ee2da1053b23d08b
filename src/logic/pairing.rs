//! Pairing generation: shuffle the roster into round-0 matches or static groups.

use crate::models::{
    BracketError, BracketState, Group, Grouping, Match, Round, RoundStructure, Team,
    Tournament, TournamentError, TournamentFormat,
};
use rand::seq::SliceRandom;
use rand::Rng;

/// Default number of teams per group for the group format.
pub const DEFAULT_GROUP_SIZE: usize = 4;

/// Generate the initial pairing structure from a roster snapshot.
///
/// 1. Check the roster against the declared capacity (number of teams).
/// 2. Shuffle uniformly with `rng`.
/// 3. Elimination: consecutive pairs become matches; with an odd count the last team sits out.
/// 4. Group: consecutive chunks of `group_size`; the last group may be smaller.
pub fn generate_initial_round<R: Rng + ?Sized>(
    teams: &[Team],
    format: TournamentFormat,
    capacity: usize,
    group_size: usize,
    rng: &mut R,
) -> Result<RoundStructure, BracketError> {
    if teams.len() < capacity {
        return Err(BracketError::InsufficientTeams {
            required: capacity,
            available: teams.len(),
        });
    }
    // Only reachable with a declared capacity of zero.
    if teams.is_empty() {
        return Err(BracketError::EmptyRoster);
    }
    if format == TournamentFormat::Group && group_size == 0 {
        return Err(BracketError::InvalidGroupSize);
    }

    let mut ids: Vec<_> = teams.iter().map(|t| t.id).collect();
    ids.shuffle(rng);

    let structure = match format {
        TournamentFormat::Elimination => RoundStructure::Elimination(Round::new(
            ids.chunks_exact(2)
                .map(|pair| Match::new(pair[0], pair[1]))
                .collect(),
        )),
        TournamentFormat::Group => RoundStructure::Groups(Grouping {
            groups: ids
                .chunks(group_size)
                .map(|chunk| Group {
                    teams: chunk.to_vec(),
                })
                .collect(),
        }),
    };
    Ok(structure)
}

/// Generate (or reshuffle) the tournament's pairings using the thread RNG.
pub fn generate_pairings(
    tournament: &mut Tournament,
    group_size: usize,
) -> Result<(), TournamentError> {
    generate_pairings_with_rng(tournament, group_size, &mut rand::thread_rng())
}

/// Same as [`generate_pairings`] with an explicit random source.
///
/// Reshuffling is allowed until the first score is entered; after that the
/// pairings are locked.
pub fn generate_pairings_with_rng<R: Rng + ?Sized>(
    tournament: &mut Tournament,
    group_size: usize,
    rng: &mut R,
) -> Result<(), TournamentError> {
    if !tournament.bracket.can_regenerate() {
        return Err(TournamentError::PairingsLocked);
    }
    let structure = generate_initial_round(
        &tournament.teams,
        tournament.config.format,
        tournament.config.capacity.teams(),
        group_size,
        rng,
    )?;
    tournament.bracket = match structure {
        RoundStructure::Elimination(round) => BracketState::Elimination {
            rounds: vec![round],
        },
        RoundStructure::Groups(grouping) => BracketState::Groups { grouping },
    };
    Ok(())
}

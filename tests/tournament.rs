//! Integration tests for roster management, details editing, CSV import and round storage.

mod common;

use common::{config, rng, tournament_with_teams};
use tournament_manager_web::{
    generate_pairings_with_rng, import_teams_csv, load_bracket, save_bracket, set_match_score,
    submit_round, BracketState, Capacity, Match, MatchDuration, MemoryRoundStore,
    PersistenceError, Round, RoundStore, RoundStructure, Side, Tournament, TournamentError,
    TournamentFormat, TournamentUpdate,
};
use uuid::Uuid;

#[test]
fn team_names_are_trimmed_and_unique() {
    let mut t = Tournament::new(config(TournamentFormat::Elimination, Capacity::Eight));
    let id = t.add_team("  Leones ").unwrap();
    assert_eq!(t.team(id).unwrap().name, "Leones");
    assert_eq!(t.add_team("leones"), Err(TournamentError::DuplicateTeamName));
    t.add_team("Águilas").unwrap();
    assert_eq!(t.add_team("águilas"), Err(TournamentError::DuplicateTeamName));
    assert_eq!(t.add_team("ÁGUILAS"), Err(TournamentError::DuplicateTeamName));
    assert_eq!(t.add_team("   "), Err(TournamentError::EmptyTeamName));
    assert_eq!(t.teams.len(), 2);
}

#[test]
fn rename_keeps_id_and_checks_duplicates() {
    let mut t = Tournament::new(config(TournamentFormat::Elimination, Capacity::Eight));
    let a = t.add_team("Águilas").unwrap();
    t.add_team("Tigres").unwrap();

    t.rename_team(a, "Halcones").unwrap();
    assert_eq!(t.team(a).unwrap().name, "Halcones");
    t.rename_team(a, "HALCONES").unwrap();
    assert_eq!(
        t.rename_team(a, "tigres"),
        Err(TournamentError::DuplicateTeamName)
    );
    let b = t.add_team("Cóndores").unwrap();
    assert_eq!(
        t.rename_team(a, "CÓNDORES"),
        Err(TournamentError::DuplicateTeamName)
    );
    t.rename_team(b, "cóndores").unwrap();
    let ghost = Uuid::new_v4();
    assert_eq!(
        t.rename_team(ghost, "Nadie"),
        Err(TournamentError::TeamNotFound(ghost))
    );
}

#[test]
fn remove_only_before_pairings() {
    let mut t = tournament_with_teams(TournamentFormat::Elimination, 9);
    let first = t.teams[0].id;
    t.remove_team(first).unwrap();
    assert_eq!(t.teams.len(), 8);

    generate_pairings_with_rng(&mut t, 4, &mut rng(1)).unwrap();
    let second = t.teams[0].id;
    assert_eq!(t.remove_team(second), Err(TournamentError::InvalidState));
    assert_eq!(t.teams.len(), 8);
}

#[test]
fn format_and_capacity_frozen_once_paired() {
    let mut t = tournament_with_teams(TournamentFormat::Elimination, 8);
    t.update_details(TournamentUpdate {
        format: Some(TournamentFormat::Group),
        ..TournamentUpdate::default()
    })
    .unwrap();
    assert_eq!(t.config.format, TournamentFormat::Group);

    generate_pairings_with_rng(&mut t, 4, &mut rng(2)).unwrap();
    assert_eq!(
        t.update_details(TournamentUpdate {
            capacity: Some(Capacity::Sixteen),
            ..TournamentUpdate::default()
        }),
        Err(TournamentError::InvalidState)
    );

    t.update_details(TournamentUpdate {
        name: Some("Copa Verano".to_string()),
        match_duration: Some(MatchDuration::FortyFive),
        format: Some(TournamentFormat::Group),
        ..TournamentUpdate::default()
    })
    .unwrap();
    assert_eq!(t.config.name, "Copa Verano");
    assert_eq!(t.config.match_duration, MatchDuration::FortyFive);
}

#[test]
fn update_rejects_blank_name() {
    let mut t = tournament_with_teams(TournamentFormat::Elimination, 8);
    let err = t
        .update_details(TournamentUpdate {
            name: Some("  ".to_string()),
            ..TournamentUpdate::default()
        })
        .unwrap_err();
    assert!(matches!(err, TournamentError::InvalidConfig(_)));
    assert_eq!(t.config.name, "Copa Barrio");
}

#[test]
fn csv_import_adds_named_teams() {
    let mut t = Tournament::new(config(TournamentFormat::Group, Capacity::Eight));
    let csv = "name,city\nLeones,Lima\n Tigres ,Quito\nCóndores,La Paz\n";
    let ids = import_teams_csv(&mut t, csv.as_bytes()).unwrap();
    assert_eq!(ids.len(), 3);
    let names: Vec<_> = t.teams.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["Leones", "Tigres", "Cóndores"]);
}

#[test]
fn csv_import_is_all_or_nothing() {
    let mut t = Tournament::new(config(TournamentFormat::Group, Capacity::Eight));
    t.add_team("Leones").unwrap();
    let csv = "name\nTigres\nleones\n";
    let err = import_teams_csv(&mut t, csv.as_bytes()).unwrap_err();
    assert!(matches!(err, TournamentError::ImportFailed { row: 2, .. }));
    assert_eq!(t.teams.len(), 1);

    let missing_column = "team\nPumas\n";
    assert!(import_teams_csv(&mut t, missing_column.as_bytes()).is_err());
    assert_eq!(t.teams.len(), 1);
}

#[test]
fn bracket_round_trips_through_store() {
    let store = MemoryRoundStore::new();
    let mut t = tournament_with_teams(TournamentFormat::Elimination, 8);
    assert_eq!(load_bracket(&store, t.id).unwrap(), BracketState::Empty);

    generate_pairings_with_rng(&mut t, 4, &mut rng(7)).unwrap();
    set_match_score(&mut t, 0, 1, Side::B, &"3".into()).unwrap();
    save_bracket(&store, t.id, &t.bracket).unwrap();

    assert_eq!(load_bracket(&store, t.id).unwrap(), t.bracket);
}

#[test]
fn malformed_history_is_reported() {
    let store = MemoryRoundStore::new();
    let id = Uuid::new_v4();
    let groups = RoundStructure::Groups(Default::default());
    store.save(id, &[groups.clone(), groups]).unwrap();
    assert!(matches!(
        load_bracket(&store, id),
        Err(PersistenceError::MalformedHistory(bad)) if bad == id
    ));
}

#[test]
fn confirmed_rounds_reload_from_store() {
    let store = MemoryRoundStore::new();
    let mut t = tournament_with_teams(TournamentFormat::Elimination, 8);
    generate_pairings_with_rng(&mut t, 4, &mut rng(11)).unwrap();
    for m in 0..4 {
        set_match_score(&mut t, 0, m, Side::A, &"2".into()).unwrap();
        set_match_score(&mut t, 0, m, Side::B, &"1".into()).unwrap();
    }
    submit_round(&mut t, 0).unwrap();
    save_bracket(&store, t.id, &t.bracket).unwrap();

    let loaded = load_bracket(&store, t.id).unwrap();
    assert_eq!(loaded.rounds().len(), 2);
    assert_eq!(loaded, t.bracket);
}

#[test]
fn rounds_after_unfinished_round_are_malformed() {
    let store = MemoryRoundStore::new();
    let id = Uuid::new_v4();
    let unscored = Round::new(vec![Match::new(Uuid::new_v4(), Uuid::new_v4())]);
    store
        .save(
            id,
            &[
                RoundStructure::Elimination(unscored.clone()),
                RoundStructure::Elimination(Round::default()),
                RoundStructure::Elimination(unscored),
            ],
        )
        .unwrap();
    assert!(matches!(
        load_bracket(&store, id),
        Err(PersistenceError::MalformedHistory(bad)) if bad == id
    ));
}

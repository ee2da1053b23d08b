//! Single binary web server: REST API over the tournament library.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default.
//! Env: HOST, PORT, DATA_DIR (persist rounds as JSON files), GROUP_SIZE, INACTIVITY_HOURS.

use actix_web::{
    delete, get, middleware::Logger, post, put,
    web::{self, Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tournament_manager_web::{
    generate_pairings, import_teams_csv, load_bracket, save_bracket, set_match_score,
    submit_round, sweep_orphans, Capacity, JsonFileRoundStore, MatchDuration, MemoryRoundStore, RoundStore,
    RoundStructure, ScoreInput, Side, Sport, TeamId, Tournament, TournamentConfig,
    TournamentError, TournamentFormat, TournamentId, TournamentUpdate, DEFAULT_GROUP_SIZE,
};
use uuid::Uuid;

/// Per-tournament entry: tournament data + last activity time (for auto-cleanup).
struct TournamentEntry {
    tournament: Tournament,
    last_activity: Instant,
    /// A change is waiting for its rounds to be saved.
    saving: bool,
}

impl TournamentEntry {
    fn new(tournament: Tournament) -> Self {
        Self {
            tournament,
            last_activity: Instant::now(),
            saving: false,
        }
    }
}

struct AppState {
    tournaments: RwLock<HashMap<TournamentId, TournamentEntry>>,
    store: Box<dyn RoundStore>,
    default_group_size: usize,
}

impl AppState {
    fn new(store: Box<dyn RoundStore>, default_group_size: usize) -> Self {
        Self {
            tournaments: RwLock::new(HashMap::new()),
            store,
            default_group_size,
        }
    }

    /// Unknown while the lock is poisoned; treated as live so nothing is swept.
    fn is_live(&self, id: &TournamentId) -> bool {
        self.tournaments
            .read()
            .map(|g| g.contains_key(id))
            .unwrap_or(true)
    }
}

type SharedState = Data<AppState>;

/// Settings read from the environment at startup.
struct ServerConfig {
    host: String,
    port: u16,
    data_dir: Option<String>,
    group_size: usize,
    inactivity_timeout: Duration,
}

impl ServerConfig {
    fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env_parse("PORT").unwrap_or(8080);
        let data_dir = std::env::var("DATA_DIR").ok().filter(|d| !d.trim().is_empty());
        let group_size = env_parse("GROUP_SIZE")
            .filter(|&n: &usize| n > 0)
            .unwrap_or(DEFAULT_GROUP_SIZE);
        let hours: u64 = env_parse("INACTIVITY_HOURS").unwrap_or(12);
        Self {
            host,
            port,
            data_dir,
            group_size,
            inactivity_timeout: Duration::from_secs(hours * 3600),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            log::warn!("Ignoring invalid {}={:?}", key, raw);
            None
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct CreateTournamentBody {
    name: String,
    #[serde(default)]
    sport: Sport,
    format: TournamentFormat,
    capacity: Capacity,
    #[serde(default)]
    match_duration: MatchDuration,
    start_date: Option<NaiveDate>,
}

#[derive(Deserialize)]
struct TeamNameBody {
    name: String,
}

#[derive(Deserialize)]
struct GeneratePairingsBody {
    group_size: Option<usize>,
}

#[derive(Deserialize)]
struct SetScoreBody {
    side: Side,
    value: ScoreInput,
}

#[derive(Serialize)]
struct RoundsResponse {
    rounds: Vec<RoundStructure>,
    champion: Option<TeamId>,
}

/// Path segment: tournament id (e.g. /api/tournaments/{id})
#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

/// Path segments: tournament id and team id.
#[derive(Deserialize)]
struct TournamentTeamPath {
    id: TournamentId,
    team_id: Uuid,
}

#[derive(Deserialize)]
struct RoundPath {
    id: TournamentId,
    round: usize,
}

#[derive(Deserialize)]
struct MatchPath {
    id: TournamentId,
    round: usize,
    #[serde(rename = "match")]
    match_index: usize,
}

fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({ "error": "No tournament" }))
}

fn bad_request(e: TournamentError) -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() }))
}

fn lock_error() -> HttpResponse {
    HttpResponse::InternalServerError().body("lock error")
}

fn storage_error(e: impl std::fmt::Display) -> HttpResponse {
    HttpResponse::InternalServerError().json(serde_json::json!({ "error": e.to_string() }))
}

/// Run `change` against one tournament. The change is applied to a copy and
/// committed only if it succeeds; with `persist`, the new rounds must also be
/// saved before the copy replaces the live tournament.
///
/// The save runs on the blocking pool without the map lock held. Until it
/// finishes, other changes to the same tournament get 409 Conflict.
async fn apply_change<F>(state: SharedState, id: TournamentId, persist: bool, change: F) -> HttpResponse
where
    F: FnOnce(&mut Tournament) -> Result<(), TournamentError>,
{
    let staged = {
        let mut g = match state.tournaments.write() {
            Ok(guard) => guard,
            Err(_) => return lock_error(),
        };
        let entry = match g.get_mut(&id) {
            Some(e) => e,
            None => return not_found(),
        };
        if entry.saving {
            return HttpResponse::Conflict()
                .json(serde_json::json!({ "error": "Another change is still being saved" }));
        }
        entry.last_activity = Instant::now();
        let mut staged = entry.tournament.clone();
        if let Err(e) = change(&mut staged) {
            log::debug!("Tournament {}: rejected change: {}", id, e);
            return bad_request(e);
        }
        if !persist {
            entry.tournament = staged;
            return HttpResponse::Ok().json(&entry.tournament);
        }
        entry.saving = true;
        staged
    };

    let bracket = staged.bracket.clone();
    let saver = state.clone();
    let saved = web::block(move || save_bracket(saver.store.as_ref(), id, &bracket)).await;

    let mut g = match state.tournaments.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    if let Some(entry) = g.get_mut(&id) {
        entry.saving = false;
        return match saved {
            Ok(Ok(())) => {
                entry.tournament = staged;
                HttpResponse::Ok().json(&entry.tournament)
            }
            Ok(Err(e)) => {
                log::error!("Tournament {}: failed to save rounds: {}", id, e);
                storage_error(e)
            }
            Err(e) => {
                log::error!("Tournament {}: save task failed: {}", id, e);
                storage_error(e)
            }
        };
    }
    drop(g);
    // Deleted while saving: the save may have written the file again.
    if let Err(e) = state.store.remove(id) {
        log::warn!("Tournament {}: failed to remove stored rounds: {}", id, e);
    }
    not_found()
}

/// Drop tournaments idle for `timeout`, then remove stored rounds that belong
/// to no live tournament. Returns how many tournaments were dropped.
async fn cleanup_inactive(state: &SharedState, timeout: Duration) -> usize {
    let expired = {
        let mut g = match state.tournaments.write() {
            Ok(guard) => guard,
            Err(_) => return 0,
        };
        let expired: Vec<TournamentId> = g
            .iter()
            .filter(|(_, entry)| !entry.saving && entry.last_activity.elapsed() >= timeout)
            .map(|(id, _)| *id)
            .collect();
        for id in &expired {
            g.remove(id);
        }
        expired.len()
    };
    if expired > 0 {
        log::info!("Cleaned up {} inactive tournament(s)", expired);
    }

    let sweeper = state.clone();
    match web::block(move || sweep_orphans(sweeper.store.as_ref(), |id| sweeper.is_live(id))).await {
        Ok(Ok(0)) => {}
        Ok(Ok(n)) => log::info!("Removed stored rounds of {} unknown tournament(s)", n),
        Ok(Err(e)) => log::warn!("Failed to sweep stored rounds: {}", e),
        Err(e) => log::warn!("Sweep task failed: {}", e),
    }
    expired
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "tournament-manager-web",
    })
}

/// List all live tournaments.
#[get("/api/tournaments")]
async fn api_list_tournaments(state: SharedState) -> HttpResponse {
    let g = match state.tournaments.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let mut list: Vec<&Tournament> = g.values().map(|e| &e.tournament).collect();
    list.sort_by_key(|t| t.config.created_at);
    HttpResponse::Ok().json(list)
}

/// Create a new tournament (returns it with id; client stores id for subsequent requests).
#[post("/api/tournaments")]
async fn api_create_tournament(state: SharedState, body: Json<CreateTournamentBody>) -> HttpResponse {
    let body = body.into_inner();
    let start_date = body.start_date.unwrap_or_else(|| Utc::now().date_naive());
    let config = match TournamentConfig::new(
        &body.name,
        body.sport,
        body.format,
        body.capacity,
        body.match_duration,
        start_date,
    ) {
        Ok(c) => c,
        Err(e) => return bad_request(e.into()),
    };
    let tournament = Tournament::new(config);
    let id = tournament.id;
    let mut g = match state.tournaments.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    log::info!(
        "Created tournament {} ({}, {} teams)",
        id,
        tournament.config.format,
        tournament.config.capacity.teams()
    );
    let entry = g.entry(id).or_insert_with(|| TournamentEntry::new(tournament));
    HttpResponse::Ok().json(&entry.tournament)
}

/// Get a tournament by id (404 if not found). Touching it refreshes last_activity.
#[get("/api/tournaments/{id}")]
async fn api_get_tournament(state: SharedState, path: Path<TournamentPath>) -> HttpResponse {
    let mut g = match state.tournaments.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.get_mut(&path.id) {
        Some(entry) => {
            entry.last_activity = Instant::now();
            HttpResponse::Ok().json(&entry.tournament)
        }
        None => not_found(),
    }
}

/// Edit tournament details (format and capacity only before pairings exist).
#[put("/api/tournaments/{id}")]
async fn api_update_tournament(
    state: SharedState,
    path: Path<TournamentPath>,
    body: Json<TournamentUpdate>,
) -> HttpResponse {
    let update = body.into_inner();
    apply_change(state, path.id, false, |t| t.update_details(update)).await
}

/// Delete a tournament and its stored rounds.
#[delete("/api/tournaments/{id}")]
async fn api_delete_tournament(state: SharedState, path: Path<TournamentPath>) -> HttpResponse {
    let removed = match state.tournaments.write() {
        Ok(mut g) => g.remove(&path.id),
        Err(_) => return lock_error(),
    };
    if removed.is_none() {
        return not_found();
    }
    if let Err(e) = state.store.remove(path.id) {
        log::warn!("Tournament {}: failed to remove stored rounds: {}", path.id, e);
    }
    log::info!("Deleted tournament {}", path.id);
    HttpResponse::NoContent().finish()
}

/// Add a team to the roster.
#[post("/api/tournaments/{id}/teams")]
async fn api_add_team(state: SharedState, path: Path<TournamentPath>, body: Json<TeamNameBody>) -> HttpResponse {
    apply_change(state, path.id, false, |t| t.add_team(body.name.as_str()).map(|_| ())).await
}

/// Import teams from a CSV body with a `name` header column.
#[post("/api/tournaments/{id}/teams/import")]
async fn api_import_teams(state: SharedState, path: Path<TournamentPath>, body: String) -> HttpResponse {
    apply_change(state, path.id, false, |t| {
        let added = import_teams_csv(t, body.as_bytes())?;
        log::info!("Tournament {}: imported {} team(s)", path.id, added.len());
        Ok(())
    })
    .await
}

/// Rename a team.
#[put("/api/tournaments/{id}/teams/{team_id}")]
async fn api_rename_team(
    state: SharedState,
    path: Path<TournamentTeamPath>,
    body: Json<TeamNameBody>,
) -> HttpResponse {
    apply_change(state, path.id, false, |t| {
        t.rename_team(path.team_id, body.name.as_str())
    })
    .await
}

/// Remove a team (only before pairings are generated).
#[delete("/api/tournaments/{id}/teams/{team_id}")]
async fn api_remove_team(state: SharedState, path: Path<TournamentTeamPath>) -> HttpResponse {
    apply_change(state, path.id, false, |t| t.remove_team(path.team_id)).await
}

/// Generate (or reshuffle, while nothing is scored) the pairings.
#[post("/api/tournaments/{id}/pairings")]
async fn api_generate_pairings(
    state: SharedState,
    path: Path<TournamentPath>,
    body: Option<Json<GeneratePairingsBody>>,
) -> HttpResponse {
    let group_size = body
        .as_ref()
        .and_then(|b| b.group_size)
        .unwrap_or(state.default_group_size);
    apply_change(state, path.id, true, |t| generate_pairings(t, group_size)).await
}

/// Set one side's score of a match in the current round. Empty text clears it.
#[put("/api/tournaments/{id}/rounds/{round}/matches/{match}/score")]
async fn api_set_score(state: SharedState, path: Path<MatchPath>, body: Json<SetScoreBody>) -> HttpResponse {
    apply_change(state, path.id, true, |t| {
        set_match_score(t, path.round, path.match_index, body.side, &body.value)
    })
    .await
}

/// Confirm the current round and generate the next one.
#[post("/api/tournaments/{id}/rounds/{round}/confirm")]
async fn api_confirm_round(state: SharedState, path: Path<RoundPath>) -> HttpResponse {
    apply_change(state, path.id, true, |t| {
        submit_round(t, path.round)?;
        if let Some(champion) = t.champion() {
            log::info!("Tournament {}: {} wins", path.id, champion.name);
        }
        Ok(())
    })
    .await
}

/// Stored rounds in their persisted shape, as read back from the round store.
#[get("/api/tournaments/{id}/rounds")]
async fn api_get_rounds(state: SharedState, path: Path<TournamentPath>) -> HttpResponse {
    match state.tournaments.read() {
        Ok(g) if !g.contains_key(&path.id) => return not_found(),
        Ok(_) => {}
        Err(_) => return lock_error(),
    }
    match load_bracket(state.store.as_ref(), path.id) {
        Ok(bracket) => HttpResponse::Ok().json(RoundsResponse {
            rounds: bracket.to_structures(),
            champion: bracket.champion(),
        }),
        Err(e) => {
            log::error!("Tournament {}: failed to load rounds: {}", path.id, e);
            storage_error(e)
        }
    }
}

/// Avoid 404 in browser tab: favicon not required for app logic.
#[get("/favicon.ico")]
async fn favicon() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = ServerConfig::from_env();
    let store: Box<dyn RoundStore> = match &config.data_dir {
        Some(dir) => match JsonFileRoundStore::open(dir) {
            Ok(s) => Box::new(s),
            Err(e) => {
                log::error!("Cannot open DATA_DIR {}: {}", dir, e);
                return Err(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()));
            }
        },
        None => {
            log::info!("DATA_DIR not set; rounds are kept in memory");
            Box::new(MemoryRoundStore::new())
        }
    };

    // Tournaments live in memory only, so rounds left by an earlier run belong to no one.
    match sweep_orphans(store.as_ref(), |_| false) {
        Ok(0) => {}
        Ok(n) => log::info!("Removed stored rounds of {} tournament(s) from a previous run", n),
        Err(e) => log::warn!("Failed to sweep stored rounds: {}", e),
    }

    let bind = (config.host.clone(), config.port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state = Data::new(AppState::new(store, config.group_size));

    // Background task: every 30 minutes, remove inactive tournaments and their stored rounds
    let state_cleanup = state.clone();
    let timeout = config.inactivity_timeout;
    actix_web::rt::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(30 * 60));
        loop {
            interval.tick().await;
            cleanup_inactive(&state_cleanup, timeout).await;
        }
    });

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(state.clone())
            .service(api_health)
            .service(favicon)
            .service(api_list_tournaments)
            .service(api_create_tournament)
            .service(api_get_tournament)
            .service(api_update_tournament)
            .service(api_delete_tournament)
            .service(api_import_teams)
            .service(api_add_team)
            .service(api_rename_team)
            .service(api_remove_team)
            .service(api_generate_pairings)
            .service(api_set_score)
            .service(api_confirm_round)
            .service(api_get_rounds)
    })
    .bind(bind)?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use std::sync::{mpsc, Mutex};
    use tokio::sync::mpsc as async_mpsc;
    use tournament_manager_web::{PersistenceError, Team};

    /// Memory store whose saves wait until the test releases them.
    struct GatedStore {
        inner: MemoryRoundStore,
        entered: async_mpsc::UnboundedSender<()>,
        release: Mutex<mpsc::Receiver<()>>,
    }

    impl RoundStore for GatedStore {
        fn save(&self, id: TournamentId, rounds: &[RoundStructure]) -> Result<(), PersistenceError> {
            let _ = self.entered.send(());
            let _ = self.release.lock().map_err(|_| PersistenceError::Poisoned)?.recv();
            self.inner.save(id, rounds)
        }

        fn load(&self, id: TournamentId) -> Result<Option<Vec<RoundStructure>>, PersistenceError> {
            self.inner.load(id)
        }

        fn remove(&self, id: TournamentId) -> Result<(), PersistenceError> {
            self.inner.remove(id)
        }

        fn ids(&self) -> Result<Vec<TournamentId>, PersistenceError> {
            self.inner.ids()
        }
    }

    fn gated_state() -> (SharedState, async_mpsc::UnboundedReceiver<()>, mpsc::Sender<()>) {
        let (entered, entered_rx) = async_mpsc::unbounded_channel();
        let (release, release_rx) = mpsc::channel();
        let store = GatedStore {
            inner: MemoryRoundStore::new(),
            entered,
            release: Mutex::new(release_rx),
        };
        (Data::new(AppState::new(Box::new(store), 4)), entered_rx, release)
    }

    fn insert_tournament(state: &SharedState) -> TournamentId {
        let config = TournamentConfig::new(
            "Copa Barrio",
            Sport::Field,
            TournamentFormat::Elimination,
            Capacity::Eight,
            MatchDuration::Thirty,
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        )
        .unwrap();
        let teams = (0..8).map(|i| Team::new(format!("T{i}"))).collect();
        let tournament = Tournament::with_teams(config, teams);
        let id = tournament.id;
        state
            .tournaments
            .write()
            .unwrap()
            .insert(id, TournamentEntry::new(tournament));
        id
    }

    #[actix_web::test]
    async fn save_runs_outside_the_lock() {
        let (state, mut entered, release) = gated_state();
        let id = insert_tournament(&state);

        let pairing = actix_web::rt::spawn(apply_change(state.clone(), id, true, |t| {
            generate_pairings(t, 4)
        }));
        entered.recv().await.unwrap();

        assert!(state.tournaments.try_write().is_ok());
        let busy = apply_change(state.clone(), id, false, |t| t.add_team("Pumas").map(|_| ())).await;
        assert_eq!(busy.status(), StatusCode::CONFLICT);

        release.send(()).unwrap();
        let done = pairing.await.unwrap();
        assert_eq!(done.status(), StatusCode::OK);

        let g = state.tournaments.read().unwrap();
        let entry = &g[&id];
        assert!(!entry.saving);
        assert_eq!(entry.tournament.teams.len(), 8);
        assert_eq!(entry.tournament.bracket.rounds().len(), 1);
        assert_eq!(
            load_bracket(state.store.as_ref(), id).unwrap(),
            entry.tournament.bracket
        );
    }

    #[actix_web::test]
    async fn delete_during_save_removes_rounds() {
        let (state, mut entered, release) = gated_state();
        let id = insert_tournament(&state);

        let pairing = actix_web::rt::spawn(apply_change(state.clone(), id, true, |t| {
            generate_pairings(t, 4)
        }));
        entered.recv().await.unwrap();
        state.tournaments.write().unwrap().remove(&id);
        release.send(()).unwrap();

        let done = pairing.await.unwrap();
        assert_eq!(done.status(), StatusCode::NOT_FOUND);
        assert!(state.store.ids().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn cleanup_sweeps_rounds_of_unknown_tournaments() {
        let state = Data::new(AppState::new(Box::new(MemoryRoundStore::new()), 4));
        let id = insert_tournament(&state);
        let resp = apply_change(state.clone(), id, true, |t| generate_pairings(t, 4)).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let orphan = Uuid::new_v4();
        state.store.save(orphan, &[]).unwrap();

        assert_eq!(cleanup_inactive(&state, Duration::from_secs(3600)).await, 0);
        assert_eq!(state.store.ids().unwrap(), vec![id]);

        assert_eq!(cleanup_inactive(&state, Duration::ZERO).await, 1);
        assert!(state.tournaments.read().unwrap().is_empty());
        assert!(state.store.ids().unwrap().is_empty());
    }
}

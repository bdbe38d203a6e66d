//! Single binary web server: tournament brackets over a JSON REST API.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Override with env (or .env): HOST, PORT,
//! ADMIN_KEY (required in the `x-admin-key` header of admin requests when set),
//! DEFAULT_BRACKET_SIZE.

use actix_web::{
    get, post,
    web::{Data, Json, Path, Query},
    App, HttpRequest, HttpResponse, HttpServer, Responder,
};
use bracket_tournament_web::bracket::templates::SUPPORTED_SIZES;
use bracket_tournament_web::{
    bracket_view, export_attendees, insert_seed, move_attendee, register_players,
    restart_tournament, seed_players, start_tournament, submit_result, AdminKeyPermit, AttendeeId,
    BracketError, Config, MatchBoard, MatchQueue, MemoryStore, NewPlayer, Permit, PlayerId,
    QueueError, Seat, Store, StoreError, Submission, TournamentError, TournamentId,
    TournamentRecord,
};
use log::{error, info, warn};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::watch;

const ADMIN_KEY_HEADER: &str = "x-admin-key";

/// Everything the handlers share, built once in `main`.
struct AppState {
    config: Config,
    store: Arc<dyn Store>,
    queue: MatchQueue,
    board: MatchBoard,
    permit: AdminKeyPermit,
    shutdown: watch::Receiver<bool>,
}

type State = Data<AppState>;

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct CreateTournamentBody {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    size: Option<usize>,
}

#[derive(Deserialize)]
struct RegisterBody {
    players: Vec<NewPlayer>,
    #[serde(default)]
    self_register: bool,
}

#[derive(Deserialize)]
struct SeedBody {
    players: Vec<PlayerId>,
}

#[derive(Deserialize)]
struct InsertSeedBody {
    attendee_id: AttendeeId,
    slot: usize,
}

#[derive(Deserialize)]
struct ResultBody {
    winner: AttendeeId,
    #[serde(default)]
    match_number: Option<usize>,
}

#[derive(Deserialize)]
struct MoveBody {
    attendee_id: AttendeeId,
    to: Seat,
}

#[derive(Deserialize)]
struct ExportQuery {
    #[serde(default)]
    seeded: bool,
}

/// Path segment: tournament id (e.g. /api/tournaments/{id})
#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

fn error_body(message: impl ToString) -> serde_json::Value {
    json!({ "error": message.to_string() })
}

fn error_response(e: TournamentError) -> HttpResponse {
    use TournamentError as T;
    match &e {
        T::Store(
            StoreError::TournamentNotFound(_)
            | StoreError::AttendeeNotFound(_)
            | StoreError::PlayerNotFound(_)
            | StoreError::NotRegistered(_),
        )
        | T::Queue(QueueError::NotRegistered(_) | QueueError::Bracket(BracketError::SeatNotFound(_)))
        | T::Bracket(BracketError::SeatNotFound(_)) => HttpResponse::NotFound().json(error_body(&e)),
        T::AlreadyRunning
        | T::Store(StoreError::AlreadyRegistered | StoreError::TournamentFull(_))
        | T::Queue(
            QueueError::EmptyQueue
            | QueueError::AlreadyCompleted
            | QueueError::Stale
            | QueueError::Cancelled,
        ) => HttpResponse::Conflict().json(error_body(&e)),
        T::Store(StoreError::Lock) | T::Queue(QueueError::Persistence(_)) | T::Csv(_) => {
            error!("Request failed: {}", e);
            HttpResponse::InternalServerError().json(error_body(&e))
        }
        _ => HttpResponse::BadRequest().json(error_body(&e)),
    }
}

/// Run the permission gate against the request's admin key header.
fn check_permit(state: &AppState, req: &HttpRequest) -> Result<(), HttpResponse> {
    let key = req
        .headers()
        .get(ADMIN_KEY_HEADER)
        .and_then(|v| v.to_str().ok());
    state
        .permit
        .has_permit(key)
        .map_err(|e| HttpResponse::Forbidden().json(error_body(e)))
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "bracket-tournament-web",
    })
}

/// Create a tournament; size defaults to DEFAULT_BRACKET_SIZE.
#[post("/api/tournaments")]
async fn api_create_tournament(state: State, req: HttpRequest, body: Json<CreateTournamentBody>) -> HttpResponse {
    if let Err(denied) = check_permit(&state, &req) {
        return denied;
    }
    let body = body.into_inner();
    let size = body.size.unwrap_or(state.config.default_bracket_size);
    if !SUPPORTED_SIZES.contains(&size) {
        return HttpResponse::BadRequest().json(error_body(BracketError::TemplateNotFound(size)));
    }
    let mut record = TournamentRecord::new(body.name.trim(), size);
    record.description = body.description;
    match state.store.create_tournament(record) {
        Ok(t) => {
            info!("Created tournament {} ({})", t.name, t.id);
            HttpResponse::Ok().json(t)
        }
        Err(e) => error_response(e.into()),
    }
}

#[get("/api/tournaments")]
async fn api_list_tournaments(state: State) -> HttpResponse {
    match state.store.list_tournaments() {
        Ok(list) => HttpResponse::Ok().json(list),
        Err(e) => error_response(e.into()),
    }
}

/// Tournament record with its attendees.
#[get("/api/tournaments/{id}")]
async fn api_get_tournament(state: State, path: Path<TournamentPath>) -> HttpResponse {
    let tournament = match state.store.tournament(path.id) {
        Ok(t) => t,
        Err(e) => return error_response(e.into()),
    };
    match state.store.attendees(path.id, false) {
        Ok(attendees) => HttpResponse::Ok().json(json!({
            "tournament": tournament,
            "attendees": attendees,
            "running": state.queue.is_running(path.id),
        })),
        Err(e) => error_response(e.into()),
    }
}

/// Register players. Self-registration (one player) needs no admin key.
#[post("/api/tournaments/{id}/attendees")]
async fn api_register(
    state: State,
    req: HttpRequest,
    path: Path<TournamentPath>,
    body: Json<RegisterBody>,
) -> HttpResponse {
    let self_register = body.self_register && body.players.len() == 1;
    if !self_register {
        if let Err(denied) = check_permit(&state, &req) {
            return denied;
        }
    }
    match register_players(&*state.store, path.id, &body.players, self_register) {
        Ok(added) => HttpResponse::Ok().json(added),
        Err(e) => error_response(e),
    }
}

/// Seed an ordered player list (best first).
#[post("/api/tournaments/{id}/seeds")]
async fn api_seed(state: State, req: HttpRequest, path: Path<TournamentPath>, body: Json<SeedBody>) -> HttpResponse {
    if let Err(denied) = check_permit(&state, &req) {
        return denied;
    }
    match seed_players(&*state.store, &state.queue, path.id, &body.players) {
        Ok(seeded) => HttpResponse::Ok().json(seeded),
        Err(e) => error_response(e),
    }
}

/// Insert one attendee at a 1-based starting slot.
#[post("/api/tournaments/{id}/seeds/insert")]
async fn api_insert_seed(
    state: State,
    req: HttpRequest,
    path: Path<TournamentPath>,
    body: Json<InsertSeedBody>,
) -> HttpResponse {
    if let Err(denied) = check_permit(&state, &req) {
        return denied;
    }
    match insert_seed(&*state.store, &state.queue, path.id, body.attendee_id, body.slot) {
        Ok(seeded) => HttpResponse::Ok().json(seeded),
        Err(e) => error_response(e),
    }
}

/// Start (or resume) the tournament; matches appear on the board one at a time.
#[post("/api/tournaments/{id}/start")]
async fn api_start(state: State, req: HttpRequest, path: Path<TournamentPath>) -> HttpResponse {
    if let Err(denied) = check_permit(&state, &req) {
        return denied;
    }
    state.board.clear(path.id);
    let board = state.board.clone();
    match start_tournament(
        &*state.store,
        &state.queue,
        path.id,
        state.shutdown.clone(),
        move |matchup| board.announce(matchup),
    ) {
        Ok(report) => HttpResponse::Ok().json(report),
        Err(e) => error_response(e),
    }
}

/// The open match and the announcement log.
#[get("/api/tournaments/{id}/match")]
async fn api_current_match(state: State, path: Path<TournamentPath>) -> HttpResponse {
    if let Err(e) = state.store.tournament(path.id) {
        return error_response(e.into());
    }
    HttpResponse::Ok().json(json!({
        "open_match": state.queue.open_match(path.id),
        "board": state.board.current(path.id).unwrap_or_default(),
    }))
}

/// Declare the winner of the open match.
#[post("/api/tournaments/{id}/result")]
async fn api_result(state: State, req: HttpRequest, path: Path<TournamentPath>, body: Json<ResultBody>) -> HttpResponse {
    if let Err(denied) = check_permit(&state, &req) {
        return denied;
    }
    match submit_result(&*state.store, &state.queue, path.id, body.winner, body.match_number) {
        Ok(Submission::Advanced(result)) => {
            state.board.resolve(path.id, result.number);
            HttpResponse::Ok().json(Submission::Advanced(result))
        }
        Ok(Submission::Champion(result)) => {
            let winner = result.winner.clone();
            state.board.crown(result.clone());
            HttpResponse::Ok().json(json!({ "winner": winner, "result": result }))
        }
        Err(e) => error_response(e),
    }
}

/// Manually place an attendee at a seat of the running bracket.
#[post("/api/tournaments/{id}/move")]
async fn api_move(state: State, req: HttpRequest, path: Path<TournamentPath>, body: Json<MoveBody>) -> HttpResponse {
    if let Err(denied) = check_permit(&state, &req) {
        return denied;
    }
    match move_attendee(&*state.store, &state.queue, path.id, body.attendee_id, body.to) {
        Ok(()) => HttpResponse::Ok().json(json!({ "ok": true })),
        Err(e) => error_response(e),
    }
}

/// Restart: starting seats restored, results and queue cleared.
#[post("/api/tournaments/{id}/restart")]
async fn api_restart(state: State, req: HttpRequest, path: Path<TournamentPath>) -> HttpResponse {
    if let Err(denied) = check_permit(&state, &req) {
        return denied;
    }
    match restart_tournament(&*state.store, &state.queue, path.id) {
        Ok(t) => {
            state.board.clear(path.id);
            HttpResponse::Ok().json(t)
        }
        Err(e) => error_response(e),
    }
}

#[get("/api/tournaments/{id}/bracket")]
async fn api_bracket(state: State, path: Path<TournamentPath>) -> HttpResponse {
    match bracket_view(&*state.store, &state.queue, path.id) {
        Ok(view) => HttpResponse::Ok().json(view),
        Err(e) => error_response(e),
    }
}

/// CSV of attendees; `?seeded=true` keeps only seated ones.
#[get("/api/tournaments/{id}/export.csv")]
async fn api_export(state: State, path: Path<TournamentPath>, query: Query<ExportQuery>) -> HttpResponse {
    match export_attendees(&*state.store, path.id, query.seeded) {
        Ok(bytes) => HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .insert_header((
                "content-disposition",
                format!("attachment; filename=\"{}.csv\"", path.id),
            ))
            .body(bytes),
        Err(e) => error_response(e),
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    let bind = (config.host.clone(), config.port);
    info!("Starting server at http://{}:{}", bind.0, bind.1);
    if config.admin_key.is_none() {
        warn!("ADMIN_KEY is not set, admin endpoints are open");
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let state = Data::new(AppState {
        permit: AdminKeyPermit::new(config.admin_key.clone()),
        config,
        store: Arc::new(MemoryStore::new()),
        queue: MatchQueue::new(),
        board: MatchBoard::new(),
        shutdown: shutdown_rx,
    });

    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_create_tournament)
            .service(api_list_tournaments)
            .service(api_get_tournament)
            .service(api_register)
            .service(api_seed)
            .service(api_insert_seed)
            .service(api_start)
            .service(api_current_match)
            .service(api_result)
            .service(api_move)
            .service(api_restart)
            .service(api_bracket)
            .service(api_export)
    })
    .bind(bind)?
    .run()
    .await;

    shutdown_tx.send_replace(true);
    info!("Server stopped");
    server
}

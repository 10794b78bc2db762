//! Single binary web server: registration intake, admin area, and bracket API.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Override with env: HOST, PORT (see `Config`).

use actix_session::config::PersistentSession;
use actix_session::storage::CookieSessionStore;
use actix_session::{Session, SessionMiddleware};
use actix_web::cookie::{time, Key};
use actix_web::{
    delete, get, post, put,
    web::{Data, Json, Path, Query},
    App, HttpResponse, HttpServer,
};
use interclass_web::config::Config;
use interclass_web::logic::{
    add_representative, advance_knockout, change_password, create_admin, ensure_master_admin,
    generate_bracket, group_standings, list_admins, load_teams, record_result, registrations_csv,
    remove_admin, remove_representative, roster_csv, roster_file_name, seed_semifinals,
    session_admin, update_details, verify_credentials, verify_representative, AdminError, BracketError,
    IntakeAction, IntakeForm, MatchDetails, NewAdmin, RegistrationError, ResultError,
};
use interclass_web::models::{
    parse_registrations, teams_for, AdminId, AdminInfo, Category, MatchId, Registration,
    RegistrationId, RegistrationRow, RepresentativeId, Sport,
};
use interclass_web::store::{DataStore, MatchFilter, MemoryStore, StoreError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Shared data store (one per process).
type AppState = Data<dyn DataStore>;

/// Session key holding the signed-in admin's id.
const SESSION_ADMIN: &str = "admin";

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct IntakeBody {
    #[serde(default)]
    form: IntakeForm,
    #[serde(flatten)]
    action: IntakeAction,
}

#[derive(Serialize)]
struct IntakeResponse {
    blob: String,
    form: IntakeForm,
}

#[derive(Deserialize)]
struct LoginBody {
    username: String,
    password: String,
}

#[derive(Deserialize)]
struct RepresentativeBody {
    code: String,
    name: String,
    year: String,
    course: String,
}

#[derive(Deserialize)]
struct ScoreBody {
    score_1: u32,
    score_2: u32,
}

#[derive(Deserialize)]
struct PasswordBody {
    current_password: String,
    new_password: String,
}

/// Admin dashboard filters; all optional.
#[derive(Deserialize)]
struct RegistrationQuery {
    sport: Option<Sport>,
    category: Option<Category>,
    year: Option<String>,
    course: Option<String>,
}

impl RegistrationQuery {
    fn accepts(&self, r: &Registration) -> bool {
        self.sport.map_or(true, |s| s == r.sport)
            && self.category.map_or(true, |c| c == r.category)
            && self.year.as_ref().map_or(true, |y| *y == r.year)
            && self.course.as_ref().map_or(true, |c| *c == r.course)
    }
}

#[derive(Deserialize)]
struct DivisionPath {
    sport: Sport,
    category: Category,
}

#[derive(Deserialize)]
struct CodePath {
    code: String,
}

#[derive(Deserialize)]
struct MatchPath {
    id: MatchId,
}

#[derive(Deserialize)]
struct RepresentativePath {
    id: RepresentativeId,
}

#[derive(Deserialize)]
struct RegistrationPath {
    id: RegistrationId,
}

#[derive(Deserialize)]
struct AdminPath {
    id: AdminId,
}

fn bad_request(msg: impl ToString) -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({ "error": msg.to_string() }))
}

fn not_found(msg: impl ToString) -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({ "error": msg.to_string() }))
}

fn store_failure(e: &StoreError) -> HttpResponse {
    log::warn!("Store failure: {e}");
    HttpResponse::InternalServerError().json(serde_json::json!({ "error": "Store error" }))
}

fn bracket_error(e: BracketError) -> HttpResponse {
    match &e {
        BracketError::AlreadyGenerated => {
            HttpResponse::Conflict().json(serde_json::json!({ "error": e.to_string() }))
        }
        BracketError::InsufficientTeams => bad_request(&e),
        BracketError::Store(inner) => store_failure(inner),
    }
}

fn result_error(e: ResultError) -> HttpResponse {
    match &e {
        ResultError::MatchNotFound(_) => not_found(&e),
        ResultError::AlreadyAdvanced => {
            HttpResponse::Conflict().json(serde_json::json!({ "error": e.to_string() }))
        }
        ResultError::Store(inner) => store_failure(inner),
        _ => bad_request(&e),
    }
}

fn registration_error(e: RegistrationError) -> HttpResponse {
    match &e {
        RegistrationError::RepresentativeNotFound => not_found(&e),
        RegistrationError::Store(inner) => store_failure(inner),
        _ => bad_request(&e),
    }
}

fn admin_error(e: AdminError) -> HttpResponse {
    match &e {
        AdminError::InvalidCredentials | AdminError::WrongPassword => {
            HttpResponse::Unauthorized().json(serde_json::json!({ "error": e.to_string() }))
        }
        AdminError::RepresentativeNotFound(_) | AdminError::AdminNotFound(_) => not_found(&e),
        AdminError::Store(inner) => store_failure(inner),
        _ => bad_request(&e),
    }
}

/// Signed-in admin, reloaded from the store, or the response to send instead.
///
/// The session only carries the admin id, so removed accounts lose access at once.
async fn current_admin(state: &AppState, session: &Session) -> Result<AdminInfo, HttpResponse> {
    let unauthorized =
        || HttpResponse::Unauthorized().json(serde_json::json!({ "error": "Not signed in" }));
    let Ok(Some(id)) = session.get::<AdminId>(SESSION_ADMIN) else {
        return Err(unauthorized());
    };
    match session_admin(state.get_ref(), id).await {
        Ok(admin) => Ok(admin),
        Err(AdminError::AdminNotFound(_)) => {
            session.purge();
            Err(unauthorized())
        }
        Err(e) => Err(admin_error(e)),
    }
}

async fn master_admin(state: &AppState, session: &Session) -> Result<AdminInfo, HttpResponse> {
    let admin = current_admin(state, session).await?;
    if !admin.is_master {
        return Err(HttpResponse::Forbidden().json(serde_json::json!({ "error": "Master admin only" })));
    }
    Ok(admin)
}

/// Early-return the error response of a `Result<_, HttpResponse>`.
macro_rules! try_response {
    ($e:expr) => {
        match $e {
            Ok(v) => v,
            Err(resp) => return resp,
        }
    };
}

async fn registrations(state: &AppState) -> Result<Vec<Registration>, StoreError> {
    let rows = state.list_registrations().await?;
    Ok(parse_registrations(&rows))
}

#[get("/api/health")]
async fn api_health() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "interclass-web",
    })
}

/// Public bracket page data: teams and matches.
#[get("/api/public")]
async fn api_public(state: AppState) -> HttpResponse {
    let teams = match load_teams(state.get_ref()).await {
        Ok(t) => t,
        Err(e) => return store_failure(&e),
    };
    match state.list_matches(MatchFilter::default()).await {
        Ok(matches) => HttpResponse::Ok().json(serde_json::json!({ "teams": teams, "matches": matches })),
        Err(e) => store_failure(&e),
    }
}

/// Step one of the intake form: check a representative code.
#[get("/api/representatives/{code}/verify")]
async fn api_verify_representative(state: AppState, path: Path<CodePath>) -> HttpResponse {
    match verify_representative(state.get_ref(), &path.code).await {
        Ok(Some(rep)) => HttpResponse::Ok().json(rep),
        Ok(None) => not_found("Representative code not found"),
        Err(e) => admin_error(e),
    }
}

/// Advance the intake form by one action. The client keeps the returned state.
#[post("/api/intake")]
async fn api_intake(state: AppState, body: Json<IntakeBody>) -> HttpResponse {
    let IntakeBody { form, action } = body.into_inner();
    match form.advance(state.get_ref(), action).await {
        Ok(next) => HttpResponse::Ok().json(IntakeResponse {
            blob: next.to_blob(),
            form: next,
        }),
        Err(e) => registration_error(e),
    }
}

#[post("/api/admin/login")]
async fn api_login(state: AppState, session: Session, body: Json<LoginBody>) -> HttpResponse {
    match verify_credentials(state.get_ref(), &body.username, &body.password).await {
        Ok(admin) => {
            session.renew();
            if let Err(e) = session.insert(SESSION_ADMIN, admin.id) {
                log::warn!("Could not store session: {e}");
                return HttpResponse::InternalServerError().json(serde_json::json!({ "error": "Session error" }));
            }
            HttpResponse::Ok().json(admin)
        }
        Err(e) => admin_error(e),
    }
}

#[post("/api/admin/logout")]
async fn api_logout(session: Session) -> HttpResponse {
    session.purge();
    HttpResponse::NoContent().finish()
}

#[get("/api/admin/me")]
async fn api_me(state: AppState, session: Session) -> HttpResponse {
    let admin = try_response!(current_admin(&state, &session).await);
    HttpResponse::Ok().json(admin)
}

#[get("/api/admin/representatives")]
async fn api_list_representatives(state: AppState, session: Session) -> HttpResponse {
    try_response!(current_admin(&state, &session).await);
    match state.list_representatives().await {
        Ok(reps) => HttpResponse::Ok().json(reps),
        Err(e) => store_failure(&e),
    }
}

#[post("/api/admin/representatives")]
async fn api_add_representative(
    state: AppState,
    session: Session,
    body: Json<RepresentativeBody>,
) -> HttpResponse {
    try_response!(current_admin(&state, &session).await);
    match add_representative(state.get_ref(), &body.code, &body.name, &body.year, &body.course).await {
        Ok(rep) => HttpResponse::Ok().json(rep),
        Err(e) => admin_error(e),
    }
}

#[delete("/api/admin/representatives/{id}")]
async fn api_remove_representative(
    state: AppState,
    session: Session,
    path: Path<RepresentativePath>,
) -> HttpResponse {
    try_response!(current_admin(&state, &session).await);
    match remove_representative(state.get_ref(), path.id).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => admin_error(e),
    }
}

#[get("/api/admin/registrations")]
async fn api_list_registrations(
    state: AppState,
    session: Session,
    query: Query<RegistrationQuery>,
) -> HttpResponse {
    try_response!(current_admin(&state, &session).await);
    match registrations(&state).await {
        Ok(list) => {
            let list: Vec<_> = list.into_iter().filter(|r| query.accepts(r)).collect();
            HttpResponse::Ok().json(list)
        }
        Err(e) => store_failure(&e),
    }
}

/// Bulk import of rows from the hosted registration table. Rows are kept as-is.
#[post("/api/admin/registrations/import")]
async fn api_import_registrations(
    state: AppState,
    session: Session,
    body: Json<Vec<RegistrationRow>>,
) -> HttpResponse {
    try_response!(current_admin(&state, &session).await);
    let rows = body.into_inner();
    let valid = parse_registrations(&rows).len();
    match state.import_registrations(rows).await {
        Ok(imported) => {
            log::info!("Imported {imported} registration rows ({valid} valid)");
            HttpResponse::Ok().json(serde_json::json!({ "imported": imported, "valid": valid }))
        }
        Err(e) => store_failure(&e),
    }
}

fn csv_response(file_name: &str, body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"{file_name}\""),
        ))
        .body(body)
}

#[get("/api/admin/registrations.csv")]
async fn api_registrations_csv(
    state: AppState,
    session: Session,
    query: Query<RegistrationQuery>,
) -> HttpResponse {
    try_response!(current_admin(&state, &session).await);
    let list: Vec<_> = match registrations(&state).await {
        Ok(list) => list.into_iter().filter(|r| query.accepts(r)).collect(),
        Err(e) => return store_failure(&e),
    };
    match registrations_csv(&list) {
        Ok(body) => {
            let name = format!("registrations_{}.csv", chrono::Utc::now().format("%Y-%m-%d"));
            csv_response(&name, body)
        }
        Err(e) => {
            log::warn!("CSV export failed: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({ "error": "Export failed" }))
        }
    }
}

#[get("/api/admin/registrations/{id}/roster.csv")]
async fn api_roster_csv(
    state: AppState,
    session: Session,
    path: Path<RegistrationPath>,
) -> HttpResponse {
    try_response!(current_admin(&state, &session).await);
    let registration = match registrations(&state).await {
        Ok(list) => list.into_iter().find(|r| r.id == path.id),
        Err(e) => return store_failure(&e),
    };
    let Some(registration) = registration else {
        return not_found("Registration not found");
    };
    match roster_csv(&registration) {
        Ok(body) => csv_response(&roster_file_name(&registration), body),
        Err(e) => {
            log::warn!("CSV export failed: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({ "error": "Export failed" }))
        }
    }
}

#[get("/api/admin/teams")]
async fn api_teams(state: AppState, session: Session) -> HttpResponse {
    try_response!(current_admin(&state, &session).await);
    match load_teams(state.get_ref()).await {
        Ok(teams) => HttpResponse::Ok().json(teams),
        Err(e) => store_failure(&e),
    }
}

#[get("/api/admin/matches")]
async fn api_matches(state: AppState, session: Session) -> HttpResponse {
    try_response!(current_admin(&state, &session).await);
    match state.list_matches(MatchFilter::default()).await {
        Ok(matches) => HttpResponse::Ok().json(matches),
        Err(e) => store_failure(&e),
    }
}

/// Generate the bracket for one sport/category (once).
#[post("/api/admin/brackets/{sport}/{category}")]
async fn api_generate_bracket(
    state: AppState,
    session: Session,
    path: Path<DivisionPath>,
) -> HttpResponse {
    let admin = try_response!(current_admin(&state, &session).await);
    let teams = match load_teams(state.get_ref()).await {
        Ok(t) => t,
        Err(e) => return store_failure(&e),
    };
    let teams = teams_for(&teams, path.sport, path.category);
    log::info!(
        "{} generating bracket for {} {} ({} teams)",
        admin.username,
        path.sport,
        path.category,
        teams.len()
    );
    match generate_bracket(state.get_ref(), path.sport, path.category, teams).await {
        Ok(matches) => HttpResponse::Ok().json(matches),
        Err(e) => bracket_error(e),
    }
}

#[post("/api/admin/brackets/{sport}/{category}/seed-semifinals")]
async fn api_seed_semifinals(
    state: AppState,
    session: Session,
    path: Path<DivisionPath>,
) -> HttpResponse {
    try_response!(current_admin(&state, &session).await);
    match seed_semifinals(state.get_ref(), path.sport, path.category).await {
        Ok(updated) => HttpResponse::Ok().json(updated),
        Err(e) => result_error(e),
    }
}

#[post("/api/admin/brackets/{sport}/{category}/advance")]
async fn api_advance_knockout(
    state: AppState,
    session: Session,
    path: Path<DivisionPath>,
) -> HttpResponse {
    try_response!(current_admin(&state, &session).await);
    match advance_knockout(state.get_ref(), path.sport, path.category).await {
        Ok(updated) => HttpResponse::Ok().json(updated),
        Err(e) => result_error(e),
    }
}

#[get("/api/admin/standings/{sport}/{category}")]
async fn api_standings(state: AppState, session: Session, path: Path<DivisionPath>) -> HttpResponse {
    try_response!(current_admin(&state, &session).await);
    match state
        .list_matches(MatchFilter::division(path.sport, path.category))
        .await
    {
        Ok(matches) => HttpResponse::Ok().json(group_standings(&matches)),
        Err(e) => store_failure(&e),
    }
}

#[put("/api/admin/matches/{id}/result")]
async fn api_record_result(
    state: AppState,
    session: Session,
    path: Path<MatchPath>,
    body: Json<ScoreBody>,
) -> HttpResponse {
    try_response!(current_admin(&state, &session).await);
    match record_result(state.get_ref(), path.id, body.score_1, body.score_2).await {
        Ok(m) => HttpResponse::Ok().json(m),
        Err(e) => result_error(e),
    }
}

/// Assign teams to a match's slots and set its schedule.
#[put("/api/admin/matches/{id}")]
async fn api_update_match(
    state: AppState,
    session: Session,
    path: Path<MatchPath>,
    body: Json<MatchDetails>,
) -> HttpResponse {
    try_response!(current_admin(&state, &session).await);
    let m = match state.get_match(path.id).await {
        Ok(Some(m)) => m,
        Ok(None) => return not_found("Match not found"),
        Err(e) => return store_failure(&e),
    };
    let teams = match load_teams(state.get_ref()).await {
        Ok(t) => t,
        Err(e) => return store_failure(&e),
    };
    let division = teams_for(&teams, m.sport, m.category);
    match update_details(state.get_ref(), path.id, body.into_inner(), division).await {
        Ok(m) => HttpResponse::Ok().json(m),
        Err(e) => result_error(e),
    }
}

#[get("/api/admin/accounts")]
async fn api_list_admins(state: AppState, session: Session) -> HttpResponse {
    try_response!(master_admin(&state, &session).await);
    match list_admins(state.get_ref()).await {
        Ok(admins) => HttpResponse::Ok().json(admins),
        Err(e) => admin_error(e),
    }
}

#[post("/api/admin/accounts")]
async fn api_create_admin(state: AppState, session: Session, body: Json<NewAdmin>) -> HttpResponse {
    try_response!(master_admin(&state, &session).await);
    match create_admin(state.get_ref(), &body).await {
        Ok(admin) => HttpResponse::Ok().json(admin),
        Err(e) => admin_error(e),
    }
}

#[delete("/api/admin/accounts/{id}")]
async fn api_remove_admin(state: AppState, session: Session, path: Path<AdminPath>) -> HttpResponse {
    try_response!(master_admin(&state, &session).await);
    match remove_admin(state.get_ref(), path.id).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => admin_error(e),
    }
}

#[put("/api/admin/password")]
async fn api_change_password(
    state: AppState,
    session: Session,
    body: Json<PasswordBody>,
) -> HttpResponse {
    let admin = try_response!(current_admin(&state, &session).await);
    match change_password(state.get_ref(), admin.id, &body.current_password, &body.new_password).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => admin_error(e),
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env();
    let store = Arc::new(MemoryStore::new());

    if let Some(master) = &config.master_admin {
        if let Err(e) = ensure_master_admin(store.as_ref(), master).await {
            log::error!("Could not create master admin {}: {e}", master.username);
        }
    } else {
        log::warn!("ADMIN_USERNAME/ADMIN_PASSWORD not set: no admin can sign in");
    }

    let key = match &config.session_key {
        Some(bytes) => Key::from(bytes.as_slice()),
        None => {
            log::warn!("SESSION_KEY not set, generating a random one (sessions end on restart)");
            Key::generate()
        }
    };

    let bind = (config.host.clone(), config.port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state: AppState = Data::from(store as Arc<dyn DataStore>);
    let secure_cookies = config.secure_cookies;

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), key.clone())
                    .cookie_name("admin_session".to_string())
                    .cookie_secure(secure_cookies)
                    .session_lifecycle(PersistentSession::default().session_ttl(time::Duration::hours(24)))
                    .build(),
            )
            .service(api_health)
            .service(api_public)
            .service(api_verify_representative)
            .service(api_intake)
            .service(api_login)
            .service(api_logout)
            .service(api_me)
            .service(api_list_representatives)
            .service(api_add_representative)
            .service(api_remove_representative)
            .service(api_import_registrations)
            .service(api_registrations_csv)
            .service(api_roster_csv)
            .service(api_list_registrations)
            .service(api_teams)
            .service(api_matches)
            .service(api_generate_bracket)
            .service(api_seed_semifinals)
            .service(api_advance_knockout)
            .service(api_standings)
            .service(api_record_result)
            .service(api_update_match)
            .service(api_list_admins)
            .service(api_create_admin)
            .service(api_remove_admin)
            .service(api_change_password)
    })
    .bind(bind)?
    .run()
    .await
}

use actix_session::storage::CookieSessionStore;
use actix_session::{Session, SessionMiddleware};
use actix_web::cookie::Key;
use actix_web::{http::header, middleware, web, App, HttpRequest, HttpResponse, HttpServer, Result};
use log::{info, warn};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::config::AppConfig;
use crate::loader::{Clock, SystemClock};
use crate::roster::generate::{sample_requirements, sample_staff};
use crate::roster::{
    generate_for_month, parse_json, Employee, ShiftRequirements, YearMonth,
    DEFAULT_MAX_CONSECUTIVE_DAYS,
};
use crate::session::{User, UserResponse};

const SESSION_USER_KEY: &str = "user";

/// Roster bytes served to clients, mirrored to `roster_file`
///
/// Without an uploaded roster the current month is generated from `staff` and
/// `requirements` on every request.
pub struct AppState {
    pub roster: Mutex<Option<Vec<u8>>>,
    pub roster_file: PathBuf,
    pub staff: Vec<Employee>,
    pub requirements: ShiftRequirements,
    pub admin_password: String,
    pub auth_url: String,
}

impl AppState {
    /// Builds the state, picking up a roster already saved on disk
    pub fn from_config(config: &AppConfig) -> Self {
        let roster = match std::fs::read(&config.roster_file) {
            Ok(bytes) => {
                info!("Serving roster from {}", config.roster_file.display());
                Some(bytes)
            }
            Err(e) => {
                warn!(
                    "No roster loaded from {}: {}",
                    config.roster_file.display(),
                    e
                );
                None
            }
        };

        Self {
            roster: Mutex::new(roster),
            roster_file: config.roster_file.clone(),
            staff: sample_staff(),
            requirements: sample_requirements(),
            admin_password: config.admin_password.clone(),
            auth_url: config.auth_url.clone(),
        }
    }
}

#[derive(Deserialize)]
pub struct LoginRequest {
    password: String,
    display_name: String,
    user_id: Option<String>,
}

fn lock_poisoned() -> actix_web::Error {
    actix_web::error::ErrorInternalServerError("roster state unavailable")
}

async fn index() -> Result<HttpResponse> {
    Ok(HttpResponse::Ok()
        .content_type("text/plain")
        .body("Shift calendar backend is running."))
}

fn is_signed_in(session: &Session) -> Result<bool> {
    Ok(session.get::<User>(SESSION_USER_KEY)?.is_some())
}

fn unauthenticated() -> HttpResponse {
    HttpResponse::Unauthorized().json(serde_json::json!({"error": "Not authenticated"}))
}

/// Generates the current month from the configured staff
fn generated_schedule(state: &AppState) -> HttpResponse {
    let month = YearMonth::of(&SystemClock.today());
    match generate_for_month(
        &state.staff,
        &state.requirements,
        month,
        DEFAULT_MAX_CONSECUTIVE_DAYS,
    ) {
        Ok(roster) => HttpResponse::Ok().json(roster.to_json()),
        Err(e) => {
            warn!("No roster could be generated for {}: {}", month, e);
            HttpResponse::NotFound().json(serde_json::json!({
                "error": format!("Schedule not available: {}", e)
            }))
        }
    }
}

// Roster endpoint, falls back to a generated month when nothing was uploaded
async fn get_schedule(session: Session, state: web::Data<AppState>) -> Result<HttpResponse> {
    if !is_signed_in(&session)? {
        return Ok(unauthenticated());
    }

    let uploaded = state.roster.lock().map_err(|_| lock_poisoned())?.clone();
    match uploaded {
        Some(bytes) => Ok(HttpResponse::Ok()
            .content_type("application/json")
            .body(bytes)),
        None => Ok(generated_schedule(&state)),
    }
}

// Always generates, ignoring any uploaded roster
async fn auto_calendar(session: Session, state: web::Data<AppState>) -> Result<HttpResponse> {
    if !is_signed_in(&session)? {
        return Ok(unauthenticated());
    }
    Ok(generated_schedule(&state))
}

// Admin roster upload endpoint
async fn admin_upload(
    req: HttpRequest,
    body: web::Bytes,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    // Check password from header
    let password = req
        .headers()
        .get("X-Admin-Password")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if password != state.admin_password {
        return Ok(HttpResponse::Unauthorized().json(serde_json::json!({"success": false, "error": "Unauthorized"})));
    }

    // Rosters describe the current month, validate against it
    let month = YearMonth::of(&SystemClock.today());
    let events = match parse_json(&body, month.year, month.month) {
        Ok(events) => events,
        Err(e) => {
            return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                "success": false,
                "error": format!("Invalid roster: {}", e)
            })))
        }
    };

    if let Some(parent) = state.roster_file.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| {
                actix_web::error::ErrorInternalServerError(format!("Failed to save roster: {}", e))
            })?;
        }
    }
    std::fs::write(&state.roster_file, &body).map_err(|e| {
        actix_web::error::ErrorInternalServerError(format!("Failed to save roster: {}", e))
    })?;

    *state.roster.lock().map_err(|_| lock_poisoned())? = Some(body.to_vec());
    info!("Roster replaced: {} shift events for {}", events.len(), month);

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "events": events.len(),
    })))
}

// Development sign-in, stands in for the identity provider callback
async fn login(
    req: web::Json<LoginRequest>,
    session: Session,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if req.password != state.admin_password {
        return Ok(HttpResponse::Unauthorized().json(serde_json::json!({"success": false, "error": "Invalid password"})));
    }
    if req.display_name.trim().is_empty() {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({"success": false, "error": "Display name is required"})));
    }

    let req = req.into_inner();
    let user = User {
        user_id: req.user_id.unwrap_or_else(|| req.display_name.clone()),
        display_name: req.display_name,
        picture_url: None,
        status_message: None,
    };

    session.renew();
    session.insert(SESSION_USER_KEY, &user)?;
    info!("Session started for {}", user.display_name);

    Ok(HttpResponse::Ok().json(serde_json::json!({"success": true})))
}

async fn auth_redirect(state: web::Data<AppState>) -> Result<HttpResponse> {
    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, state.auth_url.clone()))
        .finish())
}

async fn get_user(session: Session) -> Result<HttpResponse> {
    match session.get::<User>(SESSION_USER_KEY)? {
        Some(user) => Ok(HttpResponse::Ok().json(UserResponse {
            authenticated: true,
            user: Some(user),
        })),
        None => Ok(HttpResponse::Unauthorized().json(UserResponse {
            authenticated: false,
            user: None,
        })),
    }
}

async fn logout(session: Session) -> Result<HttpResponse> {
    session.purge();
    Ok(HttpResponse::Ok().json(serde_json::json!({"message": "Logged out successfully."})))
}

/// Registers every route; shared by the server and the endpoint tests
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/api/schedule", web::get().to(get_schedule))
        .route("/api/v1/auto_calendar", web::get().to(auto_calendar))
        .route("/api/upload", web::post().to(admin_upload))
        .route("/api/login", web::post().to(login))
        .route("/api/user", web::get().to(get_user))
        .route("/api/logout", web::post().to(logout))
        .route("/auth/login", web::get().to(auth_redirect));
}

/// Cookie-backed session store; cookies are not marked secure so plain HTTP works locally
pub fn session_middleware(key: Key) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_secure(false)
        .build()
}

pub async fn start_server(port: u16, config: AppConfig) -> std::io::Result<()> {
    let app_state = web::Data::new(AppState::from_config(&config));
    // Sessions do not outlive the process
    let key = Key::generate();

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(session_middleware(key.clone()))
            .wrap(middleware::Logger::default())
            .configure(configure)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}

use crate::config::CONFIG;
use crate::repo::{SqliteTodoRepo, SqliteUserRepo};
use crate::server::guards::auth::RequireKeyAuth;
use crate::server::routes::{todos, users};
use crate::service::{TodoService, UserService};

use axum::{
    Json, Router,
    extract::Request,
    http::{HeaderName, HeaderValue, StatusCode, Version, header::USER_AGENT},
    middleware::{self, Next},
    response::Response,
    routing::get,
};
use base64::Engine as _;
use rand::RngCore;
use serde_json::{Value, json};
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Instant;
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{error, info, warn};

const MAX_REQUEST_ID_LEN: usize = 128;
const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

fn generate_request_id() -> String {
    // 96 bits => 16 chars base64url (no padding).
    let mut bytes = [0u8; 12];
    rand::rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

fn format_http_version(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "HTTP/0.9",
        Version::HTTP_10 => "HTTP/1.0",
        Version::HTTP_11 => "HTTP/1.1",
        Version::HTTP_2 => "HTTP/2",
        Version::HTTP_3 => "HTTP/3",
        _ => "HTTP/?",
    }
}

#[derive(Clone)]
pub struct AppState {
    pub users: UserService,
    pub todos: TodoService,
    pub api_key: Arc<str>,
}

impl AppState {
    /// Wires repositories into services over one shared pool.
    pub fn new(pool: SqlitePool, api_key: Arc<str>) -> Self {
        let user_repo = Arc::new(SqliteUserRepo::new(pool.clone()));
        let todo_repo = Arc::new(SqliteTodoRepo::new(pool));

        Self {
            users: UserService::new(user_repo.clone()),
            todos: TodoService::new(todo_repo, user_repo),
            api_key,
        }
    }
}

async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn not_found_handler() -> StatusCode {
    StatusCode::NOT_FOUND
}

async fn access_log(req: Request, next: Next) -> Response {
    // Capture request metadata before moving `req` into the handler stack.
    let method = req.method().clone();
    let uri = req.uri().clone();
    let version = req.version();

    let request_id = req
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty() && v.len() <= MAX_REQUEST_ID_LEN)
        .map(str::to_string)
        .unwrap_or_else(generate_request_id);

    let user_agent = req
        .headers()
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();

    let start = Instant::now();
    let mut resp = next.run(req).await;

    // Always reflect `x-request-id` for easier correlation, even if the client didn't send one.
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        resp.headers_mut().insert(X_REQUEST_ID, value);
    }

    let status = resp.status();
    let latency_ms = start.elapsed().as_millis() as u64;
    let path = uri.path();
    let protocol = format_http_version(version);

    if status.is_server_error() {
        error!(
            "| {:>3} | {} | {:^7} | {:<8} | {} | {}ms | {}",
            status.as_u16(),
            request_id,
            method.as_str(),
            protocol,
            path,
            latency_ms,
            user_agent
        );
    } else if status.is_client_error() {
        warn!(
            "| {:>3} | {} | {:^7} | {:<8} | {} | {}ms | {}",
            status.as_u16(),
            request_id,
            method.as_str(),
            protocol,
            path,
            latency_ms,
            user_agent
        );
    } else {
        info!(
            "| {:>3} | {} | {:^7} | {:<8} | {} | {}ms | {}",
            status.as_u16(),
            request_id,
            method.as_str(),
            protocol,
            path,
            latency_ms,
            user_agent
        );
    }

    resp
}

fn guarded(resource: Router<AppState>, state: &AppState) -> Router<AppState> {
    resource.layer(middleware::from_extractor_with_state::<RequireKeyAuth, _>(
        state.clone(),
    ))
}

/// Health route, fallback and shared middleware around a set of resource
/// routes. Every deployable unit finishes through here so local serving
/// and function dispatch behave identically.
fn finish_router(resources: Router<AppState>, state: AppState) -> Router {
    Router::new()
        .route("/", get(health_handler))
        .merge(resources)
        .fallback(not_found_handler)
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(CONFIG.basic.request_body_limit))
        .layer(middleware::from_fn(access_log))
}

/// Full API: users and todos in one unit.
pub fn app_router(state: AppState) -> Router {
    let resources = Router::new()
        .merge(guarded(users::router(), &state))
        .merge(guarded(todos::router(), &state));
    finish_router(resources, state)
}

/// Users-only deployable unit.
pub fn users_router(state: AppState) -> Router {
    let resources = guarded(users::router(), &state);
    finish_router(resources, state)
}

/// Todos-only deployable unit.
pub fn todos_router(state: AppState) -> Router {
    let resources = guarded(todos::router(), &state);
    finish_router(resources, state)
}

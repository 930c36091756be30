/**
 * API REST GATE - Serveur HTTP de login PrintWatch
 *
 * RÔLE :
 * Point d'entrée humain : page de login, vérification des identifiants,
 * ouverture de session et redirection vers le dashboard (board).
 *
 * ROUTES :
 * - GET  /              page de login statique
 * - POST /api/login     {username, password} -> cookie de session ou 401
 * - POST /api/logout    ferme la session courante
 * - GET  /api/session   utilisateur courant (consommé par le board) ou 401
 * - GET  /dashboard     redirige vers le board si session, sinon vers /
 * - GET  /healthz       liveness
 *
 * SÉCURITÉ :
 * - Même réponse 401 pour utilisateur inconnu et mauvais mot de passe
 * - Cookie HttpOnly signé, session côté serveur à durée fixe
 */

use crate::sessions::{clear_cookie, session_cookie, set_cookie, SessionStore};
use axum::body::Bytes;
use axum::extract::{Request, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use printwatch_core::auth::CredentialTable;
use printwatch_core::config::GateConfig;
use printwatch_core::models::SessionUser;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

const LOGIN_PAGE: &str = include_str!("../static/index.html");
const LOGIN_SCRIPT: &str = include_str!("../static/script.js");

#[derive(Clone)]
pub struct AppState {
    pub credentials: Arc<CredentialTable>,
    pub sessions: SessionStore,
    pub cfg: Arc<GateConfig>,
}

#[derive(Debug, Default, Deserialize)]
struct LoginIn {
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    password: Option<String>,
}

async fn log_requests(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let res = next.run(req).await;
    debug!("{} {} -> {}", method, path, res.status());
    res
}

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(login_page))
        .route("/static/script.js", get(login_script))
        .route("/api/login", post(login))
        .route("/api/logout", post(logout))
        .route("/api/session", get(current_session))
        .route("/dashboard", get(dashboard))
        .route("/healthz", get(|| async { "ok" }))
        .with_state(app_state)
        .layer(middleware::from_fn(log_requests))
}

// GET /
async fn login_page() -> Html<&'static str> {
    Html(LOGIN_PAGE)
}

// GET /static/script.js
async fn login_script() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/javascript; charset=utf-8")], LOGIN_SCRIPT)
}

// POST /api/login
async fn login(State(app): State<AppState>, body: Bytes) -> Response {
    // corps illisible = identifiants vides
    let input: LoginIn = serde_json::from_slice(&body).unwrap_or_default();
    let username = input.username.unwrap_or_default();
    let password = input.password.unwrap_or_default();

    match app.credentials.verify(&username, &password) {
        Ok(user) => {
            info!("login ok for {} ({:?})", user.username, user.role);
            let cookie = app.sessions.create(user.clone());
            (
                [(header::SET_COOKIE, set_cookie(&cookie, app.sessions.ttl()))],
                Json(serde_json::json!({ "ok": true, "user": user })),
            )
                .into_response()
        }
        Err(e) => {
            warn!("login refused for {:?}", username.trim());
            (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({ "ok": false, "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

// POST /api/logout
async fn logout(State(app): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(cookie) = session_cookie(&headers) {
        if app.sessions.revoke(&cookie) {
            info!("session closed");
        }
    }
    (
        [(header::SET_COOKIE, clear_cookie())],
        Json(serde_json::json!({ "ok": true })),
    )
        .into_response()
}

// GET /api/session
async fn current_session(
    State(app): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SessionUser>, StatusCode> {
    session_cookie(&headers)
        .and_then(|cookie| app.sessions.resolve(&cookie))
        .map(Json)
        .ok_or(StatusCode::UNAUTHORIZED)
}

// GET /dashboard
async fn dashboard(State(app): State<AppState>, headers: HeaderMap) -> Redirect {
    let user = session_cookie(&headers).and_then(|cookie| app.sessions.resolve(&cookie));
    if user.is_none() {
        return Redirect::to("/");
    }
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    Redirect::to(&board_location(&app.cfg, host))
}

/// Adresse du board : URL configurée, sinon même hôte que la requête sur le port du board
fn board_location(cfg: &GateConfig, host_header: &str) -> String {
    if let Some(url) = &cfg.board_url {
        return url.clone();
    }
    format!("http://{}:{}", strip_port(host_header), cfg.board_port)
}

fn strip_port(host: &str) -> &str {
    if host.starts_with('[') {
        // IPv6 littérale : [::1]:8080
        return match host.find(']') {
            Some(end) => &host[..=end],
            None => host,
        };
    }
    host.split(':').next().unwrap_or(host)
}

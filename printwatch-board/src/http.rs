/**
 * API REST BOARD - Dashboard de disponibilité des imprimantes
 *
 * RÔLE :
 * Chaque rendu déclenche un cycle complet de ping sur la liste courante,
 * agrège le résultat et le sert en HTML, JSON ou CSV.
 *
 * ROUTES :
 * - GET    /                      dashboard HTML (?q= filtre IP/setor)
 * - GET    /api/status            snapshot JSON (?q=)
 * - GET    /export.csv            export CSV des lignes filtrées
 * - GET    /api/printers          liste persistée
 * - POST   /api/printers          ajout {ip, setor}           (admin)
 * - POST   /api/printers/remove   retrait {entry}             (admin)
 * - DELETE /api/printers          vide la liste               (admin)
 * - GET    /healthz               liveness
 *
 * DROITS :
 * Le rôle vient du gate (cookie transmis à /api/session). Sans session
 * valide le dashboard reste consultable en lecture seule.
 */

use crate::render::{self, DashboardView};
use crate::state::AppState;
use axum::body::Bytes;
use axum::extract::{Query, Request, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use printwatch_core::book::{BookError, PrinterBook};
use printwatch_core::clock;
use printwatch_core::models::{Printer, SessionUser};
use printwatch_core::snapshot::export_file_name;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error, info};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Somente o admin pode editar a lista.")]
    Forbidden,
    #[error("Corpo da requisição inválido.")]
    BadBody,
    #[error(transparent)]
    Book(#[from] BookError),
    #[error("Falha ao gerar CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("Falha interna: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::BadBody => StatusCode::BAD_REQUEST,
            ApiError::Book(BookError::MissingIp | BookError::InvalidIp(_)) => StatusCode::BAD_REQUEST,
            ApiError::Book(BookError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Book(_) | ApiError::Csv(_) | ApiError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!("{}", self);
        }
        (status, Json(json!({ "ok": false, "error": self.to_string() }))).into_response()
    }
}

#[derive(Debug, Default, Deserialize)]
struct FilterQuery {
    #[serde(default)]
    q: String,
}

#[derive(Debug, Deserialize)]
struct AddIn {
    #[serde(default)]
    ip: String,
    #[serde(default)]
    setor: String,
}

#[derive(Debug, Deserialize)]
struct RemoveIn {
    entry: String,
}

#[derive(Debug, Serialize)]
struct PrinterOut {
    ip: String,
    setor: String,
    entry: String,
}

impl From<&Printer> for PrinterOut {
    fn from(p: &Printer) -> Self {
        Self {
            ip: p.ip.clone(),
            setor: p.label.clone(),
            entry: p.display_entry(),
        }
    }
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
        .route("/", get(dashboard))
        .route("/api/status", get(status))
        .route("/export.csv", get(export_csv))
        .route(
            "/api/printers",
            get(list_printers).post(add_printer).delete(clear_printers),
        )
        .route("/api/printers/remove", post(remove_printer))
        .route("/healthz", get(|| async { "ok" }))
        .with_state(app_state)
        .layer(middleware::from_fn(log_requests))
}

async fn current_user(app: &AppState, headers: &HeaderMap) -> Option<SessionUser> {
    let cookie = headers.get(header::COOKIE).and_then(|v| v.to_str().ok());
    app.gate.whoami(cookie).await
}

async fn require_admin(app: &AppState, headers: &HeaderMap) -> Result<SessionUser, ApiError> {
    match current_user(app, headers).await {
        Some(user) if user.is_admin() => Ok(user),
        _ => Err(ApiError::Forbidden),
    }
}

/// Decoded only once the caller is known to be admin, so anonymous callers
/// always get the 403 shape whatever they sent.
fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| {
        debug!("rejected request body: {}", e);
        ApiError::BadBody
    })
}

/// Runs a book mutation off the async workers: every mutation rewrites the
/// JSON file while holding the lock.
async fn edit_book<T, F>(app: &AppState, edit: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&mut PrinterBook) -> T + Send + 'static,
{
    let book = app.book.clone();
    Ok(tokio::task::spawn_blocking(move || edit(&mut *book.lock())).await?)
}

// GET /
async fn dashboard(
    State(app): State<AppState>,
    headers: HeaderMap,
    Query(filter): Query<FilterQuery>,
) -> Html<String> {
    let user = current_user(&app, &headers).await;
    let snapshot = app.run_cycle().await.filtered(&filter.q);
    let entries = app.book.lock().entries();

    Html(render::dashboard(&DashboardView {
        snapshot: &snapshot,
        entries: &entries,
        user: user.as_ref(),
        query: &filter.q,
        refresh_ms: app.cfg.refresh_interval_ms,
    }))
}

// GET /api/status
async fn status(State(app): State<AppState>, Query(filter): Query<FilterQuery>) -> impl IntoResponse {
    Json(app.run_cycle().await.filtered(&filter.q))
}

// GET /export.csv
async fn export_csv(
    State(app): State<AppState>,
    Query(filter): Query<FilterQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let snapshot = app.run_cycle().await.filtered(&filter.q);
    let body = snapshot.to_csv()?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        export_file_name(&clock::file_stamp())
    );
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}

// GET /api/printers
async fn list_printers(State(app): State<AppState>) -> impl IntoResponse {
    let list: Vec<PrinterOut> = app.book.lock().printers().iter().map(PrinterOut::from).collect();
    Json(list)
}

// POST /api/printers
async fn add_printer(
    State(app): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let user = require_admin(&app, &headers).await?;
    let input: AddIn = parse_body(&body)?;
    let applied = edit_book(&app, move |book| book.add(&input.ip, &input.setor)).await??;
    info!("{} added {}", user.username, applied.value.display_entry());

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "ok": true,
            "printer": PrinterOut::from(&applied.value),
            "warning": applied.warning,
        })),
    ))
}

// POST /api/printers/remove
async fn remove_printer(
    State(app): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let user = require_admin(&app, &headers).await?;
    let input: RemoveIn = parse_body(&body)?;
    let applied = edit_book(&app, move |book| book.remove_entry(&input.entry)).await??;
    info!("{} removed {}", user.username, applied.value.display_entry());

    Ok(Json(json!({
        "ok": true,
        "printer": PrinterOut::from(&applied.value),
        "warning": applied.warning,
    })))
}

// DELETE /api/printers
async fn clear_printers(State(app): State<AppState>, headers: HeaderMap) -> Result<impl IntoResponse, ApiError> {
    let user = require_admin(&app, &headers).await?;
    let applied = edit_book(&app, PrinterBook::clear).await?;
    info!("{} cleared the list ({} removed)", user.username, applied.value);

    Ok(Json(json!({
        "ok": true,
        "removed": applied.value,
        "warning": applied.warning,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate_client::GateClient;
    use crate::state::new_state;
    use printwatch_core::config::BoardConfig;
    use printwatch_core::models::Role;
    use printwatch_devkit::test_utils::serve_local;
    use printwatch_devkit::{StubGate, StubProbe, TestHarness};
    use serde_json::Value;
    use std::sync::Arc;

    struct Board {
        base: String,
        http: reqwest::Client,
        gate: StubGate,
        harness: TestHarness,
        probe: StubProbe,
    }

    async fn spawn_board(role: Role, printers: &[Printer]) -> Board {
        let harness = TestHarness::new().unwrap();
        harness.write_printers(printers).unwrap();
        let gate = StubGate::spawn(role, "tok.sig").await.unwrap();
        let probe = StubProbe::new().with_reachable(["10.0.0.1"]);

        let cfg = BoardConfig {
            data_path: harness.data_path(),
            concurrency: 8,
            ..BoardConfig::default()
        };
        let app = AppState {
            book: new_state(PrinterBook::load(harness.data_path())),
            probe: Arc::new(probe.clone()),
            cfg: Arc::new(cfg),
            gate: GateClient::new(&gate.url()).unwrap(),
        };
        let addr = serve_local(build_router(app)).await.unwrap();

        Board {
            base: format!("http://{addr}"),
            http: reqwest::Client::new(),
            gate,
            harness,
            probe,
        }
    }

    fn two_printers() -> Vec<Printer> {
        vec![Printer::new("10.0.0.2", "Recepção"), Printer::new("10.0.0.1", "UTI")]
    }

    #[tokio::test]
    async fn test_status_counts_and_filter() {
        let board = spawn_board(Role::Viewer, &two_printers()).await;

        let all: Value = board.http.get(format!("{}/api/status", board.base)).send().await.unwrap().json().await.unwrap();
        assert_eq!(all["up"], 1);
        assert_eq!(all["down"], 1);
        assert_eq!(all["total"], 2);
        assert_eq!(all["rows"][0]["ip"], "10.0.0.1");

        let filtered: Value = board
            .http
            .get(format!("{}/api/status?q=recep", board.base))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(filtered["rows"].as_array().unwrap().len(), 1);
        assert_eq!(filtered["total"], 2);
        assert_eq!(board.probe.calls().len(), 4);
    }

    #[tokio::test]
    async fn test_export_csv() {
        let board = spawn_board(Role::Viewer, &two_printers()).await;
        let res = board.http.get(format!("{}/export.csv", board.base)).send().await.unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        let disposition = res.headers()[header::CONTENT_DISPOSITION].to_str().unwrap().to_string();
        assert!(disposition.contains("impressoras_"));
        assert!(disposition.ends_with(".csv\""));

        let body = res.text().await.unwrap();
        let mut lines = body.lines();
        assert_eq!(lines.next(), Some("IP,Setor,Status,Checado às"));
        assert!(lines.next().unwrap().starts_with("10.0.0.1,UTI,Online,"));
    }

    #[tokio::test]
    async fn test_viewer_cannot_edit() {
        let board = spawn_board(Role::Viewer, &two_printers()).await;

        let res = board
            .http
            .post(format!("{}/api/printers", board.base))
            .header(header::COOKIE, board.gate.cookie_header())
            .json(&json!({"ip": "10.0.0.9", "setor": "X"}))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);

        let res = board.http.delete(format!("{}/api/printers", board.base)).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        assert_eq!(board.harness.read_printers().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_export_csv_keeps_encoded_filter() {
        let printers = vec![
            Printer::new("10.0.0.1", "UTI & CC"),
            Printer::new("10.0.0.2", "UTI"),
            Printer::new("10.0.0.3", "CC"),
        ];
        let board = spawn_board(Role::Viewer, &printers).await;

        let body = board
            .http
            .get(format!("{}/export.csv?q=UTI%20%26%20CC", board.base))
            .send()
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        let rows: Vec<&str> = body.lines().skip(1).collect();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].starts_with("10.0.0.1,UTI & CC,Online,"));
    }

    #[tokio::test]
    async fn test_malformed_body_error_shape() {
        let board = spawn_board(Role::Admin, &two_printers()).await;

        // anonymous: refused before the body is even looked at
        let res = board
            .http
            .post(format!("{}/api/printers", board.base))
            .body("not json")
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        let body: Value = res.json().await.unwrap();
        assert_eq!(body["ok"], false);
        assert_eq!(body["error"], "Somente o admin pode editar a lista.");

        let res = board
            .http
            .post(format!("{}/api/printers/remove", board.base))
            .header(header::COOKIE, board.gate.cookie_header())
            .body("{\"nope\": 1}")
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = res.json().await.unwrap();
        assert_eq!(body["error"], "Corpo da requisição inválido.");
        assert_eq!(board.harness.read_printers().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_admin_add_remove_clear() {
        let board = spawn_board(Role::Admin, &two_printers()).await;
        let cookie = board.gate.cookie_header();

        let res = board
            .http
            .post(format!("{}/api/printers", board.base))
            .header(header::COOKIE, &cookie)
            .json(&json!({"ip": " 10.0.0.9 ", "setor": "Almoxarifado"}))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = res.json().await.unwrap();
        assert_eq!(body["printer"]["entry"], "10.0.0.9 — Almoxarifado");
        assert!(body["warning"].is_null());
        assert_eq!(board.harness.read_printers().unwrap().len(), 3);

        let res = board
            .http
            .post(format!("{}/api/printers", board.base))
            .header(header::COOKIE, &cookie)
            .json(&json!({"ip": "300.1.1.1", "setor": "X"}))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = res.json().await.unwrap();
        assert_eq!(body["error"], "IP inválido: 300.1.1.1");

        let res = board
            .http
            .post(format!("{}/api/printers/remove", board.base))
            .header(header::COOKIE, &cookie)
            .json(&json!({"entry": "10.0.0.2 — Recepção"}))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let res = board
            .http
            .post(format!("{}/api/printers/remove", board.base))
            .header(header::COOKIE, &cookie)
            .json(&json!({"entry": "10.0.0.2 — Recepção"}))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let list: Value = board.http.get(format!("{}/api/printers", board.base)).send().await.unwrap().json().await.unwrap();
        assert_eq!(list.as_array().unwrap().len(), 2);
        assert_eq!(list[0]["setor"], "UTI");

        let res = board
            .http
            .delete(format!("{}/api/printers", board.base))
            .header(header::COOKIE, &cookie)
            .send()
            .await
            .unwrap();
        let body: Value = res.json().await.unwrap();
        assert_eq!(body["removed"], 2);
        assert!(board.harness.read_printers().unwrap().is_empty());

        let idle: Value = board.http.get(format!("{}/api/status", board.base)).send().await.unwrap().json().await.unwrap();
        assert_eq!(idle["idle"], true);
    }

    #[tokio::test]
    async fn test_dashboard_page() {
        let board = spawn_board(Role::Admin, &two_printers()).await;

        let anon = board.http.get(format!("{}/", board.base)).send().await.unwrap().text().await.unwrap();
        assert!(anon.contains("Modo leitura"));
        assert!(anon.contains("🟢 Online"));

        let admin = board
            .http
            .get(format!("{}/?q=uti", board.base))
            .header(header::COOKIE, board.gate.cookie_header())
            .send()
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert!(admin.contains("Stub (admin)"));
        assert!(!admin.contains("<td>Recepção</td>"));
    }
}

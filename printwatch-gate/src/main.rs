/**
 * PRINTWATCH GATE - Point d'entrée du service de login
 *
 * RÔLE : Charge la configuration (env / .env), construit la table des
 * identifiants et le store de sessions, puis sert l'API HTTP.
 *
 * UTILITÉ : Seule porte d'entrée humaine ; le dashboard (board) lui demande
 * qui est connecté via GET /api/session.
 */

mod http;
mod sessions;
mod state;

use crate::http::AppState;
use crate::sessions::SessionStore;
use anyhow::Context;
use printwatch_core::config::GateConfig;
use printwatch_core::logging::init_logging;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Charger les variables d'environnement depuis .env (si présent)
    dotenvy::dotenv().ok();
    init_logging();

    let cfg = GateConfig::from_env();
    let credentials = cfg.credentials();
    info!("credential table ready ({} accounts)", credentials.usernames().len());

    // sessions côté serveur + purge toutes les 5 min
    let sessions = SessionStore::new(&cfg.session_secret, cfg.session_ttl);
    sessions.spawn_sweeper(Duration::from_secs(300));

    let addr = cfg.listen_addr;
    let app_state = AppState {
        credentials: Arc::new(credentials),
        sessions,
        cfg: Arc::new(cfg),
    };

    let app = http::build_router(app_state);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("listening on http://{addr}");
    axum::serve(listener, app).await.context("http server stopped")?;
    Ok(())
}

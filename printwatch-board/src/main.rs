/**
 * PRINTWATCH BOARD - Point d'entrée du dashboard
 *
 * RÔLE : Charge printwatch.yaml et la liste printers.json, localise le
 * binaire ping du système puis sert le dashboard HTTP.
 *
 * UTILITÉ : Vue temps réel du parc d'imprimantes ; l'édition de la liste
 * est réservée au rôle admin résolu auprès du gate.
 */

mod gate_client;
mod http;
mod render;
mod state;

use crate::gate_client::GateClient;
use crate::state::{new_state, AppState};
use anyhow::Context;
use printwatch_core::book::PrinterBook;
use printwatch_core::config::BoardConfig;
use printwatch_core::logging::init_logging;
use printwatch_core::probe::SystemPing;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_logging();

    let cfg = BoardConfig::load().await;
    info!(
        "board config: data={} timeout={}s concurrency={} refresh={}ms",
        cfg.data_path.display(),
        cfg.ping_timeout_secs,
        cfg.concurrency,
        cfg.refresh_interval_ms
    );

    let book = PrinterBook::load(cfg.data_path.clone());
    let probe = SystemPing::new();
    let gate = GateClient::new(&cfg.gate_url).context("http client for the gate")?;

    let addr = cfg.listen_addr;
    let app_state = AppState {
        book: new_state(book),
        probe: Arc::new(probe),
        cfg: Arc::new(cfg),
        gate,
    };

    let app = http::build_router(app_state);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("dashboard on http://{addr}");
    axum::serve(listener, app).await.context("http server stopped")?;
    Ok(())
}

use crate::gate_client::GateClient;
use parking_lot::Mutex;
use printwatch_core::book::PrinterBook;
use printwatch_core::clock;
use printwatch_core::config::BoardConfig;
use printwatch_core::probe::Probe;
use printwatch_core::snapshot::Snapshot;
use printwatch_core::sweep::{sweep, CheckMode};
use std::sync::Arc;

pub type Shared<T> = Arc<Mutex<T>>;

pub fn new_state<T>(value: T) -> Shared<T> {
    Arc::new(Mutex::new(value))
}

#[derive(Clone)]
pub struct AppState {
    pub book: Shared<PrinterBook>,
    pub probe: Arc<dyn Probe>,
    pub cfg: Arc<BoardConfig>,
    pub gate: GateClient,
}

impl AppState {
    /// One full check cycle over the current list.
    ///
    /// The list is copied out first so edits are never blocked behind pings.
    pub async fn run_cycle(&self) -> Snapshot {
        let printers = self.book.lock().printers().to_vec();
        if printers.is_empty() {
            return Snapshot::idle();
        }

        let ips: Vec<String> = printers.iter().map(|p| p.ip.clone()).collect();
        let mode = CheckMode::from_concurrency(self.cfg.concurrency);
        let checks = sweep(self.probe.as_ref(), &ips, self.cfg.ping_timeout(), mode).await;
        Snapshot::build(&printers, checks, clock::display_stamp())
    }
}

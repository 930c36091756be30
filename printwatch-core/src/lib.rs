//! PrintWatch core - shared logic for the login gate and the printer board
//!
//! Provides:
//! - Printer records and their JSON persistence (`book`)
//! - Dotted-quad IPv4 validation (`ipv4`)
//! - Reachability checks through the system `ping` binary (`probe`)
//! - Sequential and bounded fan-out sweeps over a printer list (`sweep`)
//! - Up/down aggregation, sorting, filtering and CSV export (`snapshot`)
//! - The static credential table used by the login gate (`auth`)
//! - Environment / YAML configuration and logging setup

pub mod auth;
pub mod book;
pub mod clock;
pub mod config;
pub mod ipv4;
pub mod logging;
pub mod models;
pub mod probe;
pub mod snapshot;
pub mod sweep;

pub use auth::{AuthError, CredentialTable};
pub use book::{Applied, BookError, PrinterBook};
pub use config::{BoardConfig, GateConfig};
pub use models::{HostCheck, Printer, Role, SessionUser};
pub use probe::{Probe, SystemPing};
pub use snapshot::{Snapshot, StatusRow};
pub use sweep::{sweep, CheckMode};

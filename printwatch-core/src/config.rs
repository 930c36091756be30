//! Configuration for the gate (environment) and the board (YAML + environment).
//!
//! Missing or invalid values fall back to defaults with a warning.

use crate::auth::CredentialTable;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

pub const DEFAULT_ADMIN_PASSWORD: &str = "admin";
pub const DEFAULT_USER_PASSWORD: &str = "user123";
pub const DEFAULT_SESSION_SECRET: &str = "change-me";

#[derive(Debug, Clone)]
pub struct GateConfig {
    pub admin_password: String,
    pub user_password: String,
    pub session_secret: String,
    pub session_ttl: Duration,
    pub listen_addr: SocketAddr,
    pub board_port: u16,
    pub board_url: Option<String>,
}

impl GateConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let admin_password = non_empty("ADMIN_PASSWORD").unwrap_or_else(|| {
            warn!("ADMIN_PASSWORD not set, using the built-in default");
            DEFAULT_ADMIN_PASSWORD.to_string()
        });
        let user_password = non_empty("USER_PASSWORD").unwrap_or_else(|| DEFAULT_USER_PASSWORD.to_string());
        let session_secret = non_empty("SESSION_SECRET").unwrap_or_else(|| {
            warn!("SESSION_SECRET not set, session cookies use a well-known key");
            DEFAULT_SESSION_SECRET.to_string()
        });
        let ttl_hours = parse_or("SESSION_TTL_HOURS", non_empty("SESSION_TTL_HOURS"), 8u64).max(1);
        let listen_addr = parse_or(
            "PRINTWATCH_GATE_ADDR",
            non_empty("PRINTWATCH_GATE_ADDR"),
            SocketAddr::from(([0, 0, 0, 0], 8080)),
        );
        let board_port = parse_or("PRINTWATCH_BOARD_PORT", non_empty("PRINTWATCH_BOARD_PORT"), 8501u16);

        Self {
            admin_password,
            user_password,
            session_secret,
            session_ttl: Duration::from_secs(ttl_hours * 3600),
            listen_addr,
            board_port,
            board_url: non_empty("PRINTWATCH_BOARD_URL"),
        }
    }

    pub fn credentials(&self) -> CredentialTable {
        CredentialTable::new(&self.admin_password, &self.user_password)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub data_path: PathBuf,
    pub refresh_interval_ms: u64,
    pub ping_timeout_secs: f64,
    pub concurrency: usize,
    pub listen_addr: SocketAddr,
    pub gate_url: String,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("printers.json"),
            refresh_interval_ms: 3000,
            ping_timeout_secs: 1.0,
            concurrency: 200,
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8501)),
            gate_url: "http://127.0.0.1:8080".to_string(),
        }
    }
}

impl BoardConfig {
    /// YAML file named by `PRINTWATCH_BOARD_CONFIG` (default `printwatch.yaml`),
    /// then `PRINTWATCH_DATA` for the printer file.
    pub async fn load() -> Self {
        let path = std::env::var("PRINTWATCH_BOARD_CONFIG").unwrap_or_else(|_| "printwatch.yaml".into());
        let mut cfg = Self::load_file(Path::new(&path)).await;
        if let Ok(data) = std::env::var("PRINTWATCH_DATA") {
            if !data.is_empty() {
                cfg.data_path = PathBuf::from(data);
            }
        }
        cfg.normalized()
    }

    pub async fn load_file(path: &Path) -> Self {
        if !path.exists() {
            info!("no {}, using default board config", path.display());
            return Self::default();
        }
        let txt = tokio::fs::read_to_string(path).await.unwrap_or_default();
        Self::from_yaml(&txt)
    }

    pub fn from_yaml(txt: &str) -> Self {
        if txt.trim().is_empty() {
            return Self::default();
        }
        serde_yaml::from_str(txt).unwrap_or_else(|e| {
            warn!("invalid board config: {}", e);
            Self::default()
        })
    }

    /// Clamps values to the ranges the dashboard accepts.
    pub fn normalized(mut self) -> Self {
        self.refresh_interval_ms = self.refresh_interval_ms.max(500);
        if !self.ping_timeout_secs.is_finite() || self.ping_timeout_secs < 0.2 {
            self.ping_timeout_secs = 0.2;
        }
        self.concurrency = self.concurrency.clamp(1, 1000);
        self
    }

    pub fn ping_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.ping_timeout_secs)
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, raw: Option<String>, default: T) -> T {
    match raw {
        Some(v) => v.parse().unwrap_or_else(|_| {
            warn!("invalid {} value {:?}, using default", key, v);
            default
        }),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_gate_defaults() {
        let cfg = GateConfig::from_lookup(|_| None);
        assert_eq!(cfg.admin_password, DEFAULT_ADMIN_PASSWORD);
        assert_eq!(cfg.session_ttl, Duration::from_secs(8 * 3600));
        assert_eq!(cfg.listen_addr.port(), 8080);
        assert_eq!(cfg.board_port, 8501);
        assert!(cfg.board_url.is_none());
    }

    #[test]
    fn test_gate_overrides() {
        let env: HashMap<&str, &str> = [
            ("ADMIN_PASSWORD", "root-pw"),
            ("SESSION_SECRET", "k"),
            ("SESSION_TTL_HOURS", "2"),
            ("PRINTWATCH_BOARD_PORT", "not-a-port"),
            ("PRINTWATCH_BOARD_URL", "http://board.lan:9000"),
        ]
        .into_iter()
        .collect();
        let cfg = GateConfig::from_lookup(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(cfg.admin_password, "root-pw");
        assert_eq!(cfg.session_secret, "k");
        assert_eq!(cfg.session_ttl, Duration::from_secs(7200));
        assert_eq!(cfg.board_port, 8501);
        assert_eq!(cfg.board_url.as_deref(), Some("http://board.lan:9000"));
        assert!(cfg.credentials().verify("Admin", "root-pw").is_ok());
    }

    #[test]
    fn test_board_yaml_partial() {
        let cfg = BoardConfig::from_yaml("concurrency: 16\nping_timeout_secs: 0.5\n");
        assert_eq!(cfg.concurrency, 16);
        assert_eq!(cfg.ping_timeout(), Duration::from_millis(500));
        assert_eq!(cfg.refresh_interval_ms, 3000);
        assert_eq!(cfg.data_path, PathBuf::from("printers.json"));
    }

    #[test]
    fn test_board_yaml_invalid_or_empty() {
        assert_eq!(BoardConfig::from_yaml("concurrency: [oops"), BoardConfig::default());
        assert_eq!(BoardConfig::from_yaml("  \n"), BoardConfig::default());
    }

    #[test]
    fn test_board_normalized() {
        let cfg = BoardConfig {
            refresh_interval_ms: 10,
            ping_timeout_secs: 0.01,
            concurrency: 5000,
            ..BoardConfig::default()
        }
        .normalized();
        assert_eq!(cfg.refresh_interval_ms, 500);
        assert_eq!(cfg.ping_timeout_secs, 0.2);
        assert_eq!(cfg.concurrency, 1000);
    }

    #[tokio::test]
    async fn test_board_missing_file() {
        let cfg = BoardConfig::load_file(Path::new("/nonexistent/printwatch.yaml")).await;
        assert_eq!(cfg, BoardConfig::default());
    }
}

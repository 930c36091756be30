//! Reachability probe backed by the system `ping` binary
//!
//! A host is up when a single echo request exits with status 0. Anything
//! else (missing binary, spawn failure, non-zero exit, deadline exceeded)
//! degrades to "down" for that host only.

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

/// Extra time granted to the child on top of the ping timeout itself.
pub const DEADLINE_GRACE: Duration = Duration::from_secs(1);

#[async_trait]
pub trait Probe: Send + Sync {
    /// `true` when `ip` answered within `timeout`.
    async fn check(&self, ip: &str, timeout: Duration) -> bool;
}

/// Flag dialects of `ping` across operating systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PingPlatform {
    Linux,
    MacOs,
    Windows,
    Other,
}

impl PingPlatform {
    pub fn current() -> Self {
        if cfg!(target_os = "linux") || cfg!(target_os = "android") {
            Self::Linux
        } else if cfg!(target_os = "macos") {
            Self::MacOs
        } else if cfg!(target_os = "windows") {
            Self::Windows
        } else {
            Self::Other
        }
    }

    /// Arguments for a single-packet ping of `ip`.
    pub fn args(self, ip: &str, timeout: Duration) -> Vec<String> {
        let millis = timeout.as_millis().max(1).to_string();
        match self {
            // iputils wants whole seconds; 0 would mean "no timeout"
            Self::Linux => {
                let secs = timeout.as_secs_f64().ceil().max(1.0) as u64;
                vec!["-c".into(), "1".into(), "-W".into(), secs.to_string(), ip.into()]
            }
            Self::MacOs => vec!["-c".into(), "1".into(), "-W".into(), millis, ip.into()],
            Self::Windows => vec!["-n".into(), "1".into(), "-w".into(), millis, ip.into()],
            Self::Other => vec!["-c".into(), "1".into(), ip.into()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Exited(Option<i32>),
    TimedOut,
    SpawnFailed(String),
}

impl ProbeOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Exited(Some(0)))
    }
}

/// Runs `cmd` to completion, killing it once `deadline` has elapsed.
pub async fn run_with_deadline(mut cmd: Command, deadline: Duration) -> ProbeOutcome {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true);

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => return ProbeOutcome::SpawnFailed(e.to_string()),
    };

    match tokio::time::timeout(deadline, child.wait()).await {
        Ok(Ok(status)) => ProbeOutcome::Exited(status.code()),
        Ok(Err(e)) => ProbeOutcome::SpawnFailed(e.to_string()),
        Err(_) => {
            if let Err(e) = child.kill().await {
                debug!("failed to kill timed out child: {}", e);
            }
            ProbeOutcome::TimedOut
        }
    }
}

/// Probe shelling out to the `ping` found on `PATH`.
#[derive(Debug, Clone)]
pub struct SystemPing {
    binary: Option<PathBuf>,
    platform: PingPlatform,
}

impl SystemPing {
    pub fn new() -> Self {
        let binary = which::which("ping").ok();
        if binary.is_none() {
            warn!("no ping executable on PATH, every printer will be reported down");
        }
        Self {
            binary,
            platform: PingPlatform::current(),
        }
    }

    /// Probe using an explicit binary (or none at all).
    pub fn with_binary(binary: Option<PathBuf>, platform: PingPlatform) -> Self {
        Self { binary, platform }
    }

    pub fn is_available(&self) -> bool {
        self.binary.is_some()
    }
}

impl Default for SystemPing {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Probe for SystemPing {
    async fn check(&self, ip: &str, timeout: Duration) -> bool {
        let Some(binary) = &self.binary else {
            return false;
        };

        let mut cmd = Command::new(binary);
        cmd.args(self.platform.args(ip, timeout));

        let outcome = run_with_deadline(cmd, timeout + DEADLINE_GRACE).await;
        match &outcome {
            ProbeOutcome::SpawnFailed(e) => debug!("ping {} could not run: {}", ip, e),
            ProbeOutcome::TimedOut => debug!("ping {} killed after deadline", ip),
            ProbeOutcome::Exited(code) => debug!("ping {} exited with {:?}", ip, code),
        }
        outcome.is_success()
    }
}

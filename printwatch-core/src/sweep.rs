//! One check cycle over the configured printers.
//!
//! Two execution modes: strictly sequential, or a bounded fan-out where a
//! semaphore caps the number of pings in flight. Every check of a cycle is
//! awaited before the cycle returns; a straggler only ever costs its own
//! deadline.

use crate::clock;
use crate::models::HostCheck;
use crate::probe::Probe;
use futures::future::join_all;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckMode {
    Sequential,
    Bounded(usize),
}

impl CheckMode {
    pub fn from_concurrency(limit: usize) -> Self {
        if limit <= 1 {
            Self::Sequential
        } else {
            Self::Bounded(limit)
        }
    }
}

/// Checks every address in `ips`; results come back in input order.
pub async fn sweep(probe: &dyn Probe, ips: &[String], timeout: Duration, mode: CheckMode) -> Vec<HostCheck> {
    if ips.is_empty() {
        return Vec::new();
    }

    let started = Instant::now();
    let results = match mode {
        CheckMode::Sequential => {
            let mut out = Vec::with_capacity(ips.len());
            for ip in ips {
                out.push(check_one(probe, ip, timeout).await);
            }
            out
        }
        CheckMode::Bounded(limit) => {
            let admission = Semaphore::new(limit.max(1));
            let checks = ips.iter().map(|ip| {
                let admission = &admission;
                async move {
                    // the semaphore is never closed
                    let _permit = admission.acquire().await.ok();
                    check_one(probe, ip, timeout).await
                }
            });
            join_all(checks).await
        }
    };

    let up = results.iter().filter(|r| r.reachable).count();
    info!(
        "checked {} printers in {:?} ({} up, {} down, {:?})",
        results.len(),
        started.elapsed(),
        up,
        results.len() - up,
        mode
    );
    results
}

async fn check_one(probe: &dyn Probe, ip: &str, timeout: Duration) -> HostCheck {
    let reachable = probe.check(ip, timeout).await;
    debug!("{} is {}", ip, if reachable { "up" } else { "down" });
    HostCheck {
        ip: ip.to_string(),
        reachable,
        timestamp: clock::display_stamp(),
    }
}

//! Client for the login gate's `GET /api/session`.
//!
//! The board has no sessions of its own: it forwards the caller's `Cookie`
//! header to the gate and trusts the answer. An unreachable gate means
//! read-only access.

use axum::http::header;
use printwatch_core::models::SessionUser;
use std::time::Duration;
use tracing::{debug, warn};

const GATE_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Clone, Debug)]
pub struct GateClient {
    base_url: String,
    http: reqwest::Client,
}

impl GateClient {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(GATE_TIMEOUT).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Logged-in user behind `cookie_header`, if the gate knows one.
    pub async fn whoami(&self, cookie_header: Option<&str>) -> Option<SessionUser> {
        let cookie = cookie_header?;
        let res = match self
            .http
            .get(format!("{}/api/session", self.base_url))
            .header(header::COOKIE, cookie)
            .send()
            .await
        {
            Ok(res) => res,
            Err(e) => {
                warn!("gate unreachable at {}: {}", self.base_url, e);
                return None;
            }
        };

        if !res.status().is_success() {
            debug!("gate answered {} for session lookup", res.status());
            return None;
        }
        res.json::<SessionUser>().await.ok()
    }
}

/*!
 * SESSIONS - État de session côté serveur pour le gate de login
 *
 * RÔLE : Associe un jeton opaque (cookie) à l'utilisateur authentifié,
 * avec une durée de vie fixe (8h par défaut).
 *
 * FONCTIONNEMENT :
 * - Jeton = UUID v4 + signature hex sha256(secret:uuid)
 * - Map jeton -> utilisateur + expiration, protégée par un mutex
 * - Sessions expirées purgées à l'accès et par une tâche périodique
 */

use crate::state::{new_state, Shared};
use axum::http::{header, HeaderMap};
use printwatch_core::models::SessionUser;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use time::OffsetDateTime;
use tracing::{debug, info};
use uuid::Uuid;

pub const COOKIE_NAME: &str = "printwatch_session";

#[derive(Debug, Clone)]
struct SessionEntry {
    user: SessionUser,
    expires_at: OffsetDateTime,
}

#[derive(Clone)]
pub struct SessionStore {
    sessions: Shared<HashMap<String, SessionEntry>>,
    secret: Arc<String>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            sessions: new_state(HashMap::new()),
            secret: Arc::new(secret.to_string()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Ouvre une session et renvoie la valeur du cookie
    pub fn create(&self, user: SessionUser) -> String {
        let token = Uuid::new_v4().to_string();
        let entry = SessionEntry {
            user,
            expires_at: OffsetDateTime::now_utc() + self.ttl,
        };
        debug!("session opened for {}", entry.user.username);
        self.sessions.lock().insert(token.clone(), entry);
        format!("{}.{}", token, self.sign(&token))
    }

    /// Utilisateur de la session, si le cookie est intègre et non expiré
    pub fn resolve(&self, cookie_value: &str) -> Option<SessionUser> {
        let token = self.verify(cookie_value)?;
        let mut sessions = self.sessions.lock();
        let expired = match sessions.get(token) {
            Some(entry) if entry.expires_at > OffsetDateTime::now_utc() => return Some(entry.user.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            sessions.remove(token);
            debug!("session expired");
        }
        None
    }

    pub fn revoke(&self, cookie_value: &str) -> bool {
        match self.verify(cookie_value) {
            Some(token) => self.sessions.lock().remove(token).is_some(),
            None => false,
        }
    }

    pub fn purge_expired(&self) -> usize {
        let now = OffsetDateTime::now_utc();
        let mut sessions = self.sessions.lock();
        let before = sessions.len();
        sessions.retain(|_, entry| entry.expires_at > now);
        before - sessions.len()
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    /// Purge périodique des sessions expirées
    pub fn spawn_sweeper(&self, every: Duration) {
        let store = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                let purged = store.purge_expired();
                if purged > 0 {
                    info!("purged {} expired sessions ({} active)", purged, store.len());
                }
            }
        });
    }

    fn sign(&self, token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.secret.as_bytes());
        hasher.update(b":");
        hasher.update(token.as_bytes());
        hex::encode(hasher.finalize())
    }

    fn verify<'a>(&self, cookie_value: &'a str) -> Option<&'a str> {
        let (token, signature) = cookie_value.rsplit_once('.')?;
        (self.sign(token) == signature).then_some(token)
    }
}

/// Valeur de notre cookie dans l'en-tête Cookie de la requête
pub fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == COOKIE_NAME)
        .map(|(_, value)| value.to_string())
}

pub fn set_cookie(value: &str, max_age: Duration) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        COOKIE_NAME,
        value,
        max_age.as_secs()
    )
}

pub fn clear_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", COOKIE_NAME)
}

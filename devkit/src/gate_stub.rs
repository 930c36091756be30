/*!
Gate de login simulé

Sert uniquement `GET /api/session`: répond l'utilisateur configuré quand
l'en-tête Cookie contient le cookie attendu, 401 sinon. Permet de tester
le contrôle de rôle du board sans démarrer le vrai gate.
*/

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use printwatch_core::models::{Role, SessionUser};
use std::net::SocketAddr;
use std::sync::Arc;

use crate::test_utils::serve_local;

#[derive(Clone)]
struct StubSession {
    cookie: String,
    user: SessionUser,
}

/// Gate simulé lancé sur 127.0.0.1 avec un port libre
pub struct StubGate {
    pub addr: SocketAddr,
    pub cookie: String,
}

impl StubGate {
    /// Démarre un gate qui reconnaît `cookie` comme une session de rôle `role`
    pub async fn spawn(role: Role, cookie: &str) -> anyhow::Result<Self> {
        let user = SessionUser {
            username: match role {
                Role::Admin => "Admin".to_string(),
                Role::Viewer => "usuario".to_string(),
            },
            name: "Stub".to_string(),
            role,
        };
        let session = Arc::new(StubSession {
            cookie: cookie.to_string(),
            user,
        });

        let app = Router::new()
            .route("/api/session", get(whoami))
            .with_state(session);
        let addr = serve_local(app).await?;

        Ok(Self {
            addr,
            cookie: cookie.to_string(),
        })
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// En-tête Cookie à envoyer au board
    pub fn cookie_header(&self) -> String {
        format!("printwatch_session={}", self.cookie)
    }
}

async fn whoami(
    State(session): State<Arc<StubSession>>,
    headers: HeaderMap,
) -> Result<Json<SessionUser>, StatusCode> {
    let sent = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if sent.contains(&session.cookie) {
        Ok(Json(session.user.clone()))
    } else {
        Err(StatusCode::UNAUTHORIZED)
    }
}

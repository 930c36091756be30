/*!
Test Harness pour PrintWatch

Facilite l'écriture de tests avec:
- Répertoire temporaire et fichier printers.json isolé
- Génération d'un parc simulé (N imprimantes, fraction joignable)
- Lancement d'un routeur axum sur un port local libre
*/

use crate::probe_stub::StubProbe;
use anyhow::Result;
use axum::Router;
use printwatch_core::models::Printer;
use std::net::SocketAddr;
use std::path::PathBuf;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Harness de test avec fichier de données isolé
pub struct TestHarness {
    dir: TempDir,
}

impl TestHarness {
    pub fn new() -> Result<Self> {
        Ok(Self { dir: TempDir::new()? })
    }

    /// Chemin du printers.json de ce test (pas créé tant qu'on n'écrit pas)
    pub fn data_path(&self) -> PathBuf {
        self.dir.path().join("printers.json")
    }

    pub fn write_printers(&self, printers: &[Printer]) -> Result<()> {
        std::fs::write(self.data_path(), serde_json::to_string_pretty(printers)?)?;
        Ok(())
    }

    /// Contenu actuel du fichier, tel que relu depuis le disque
    pub fn read_printers(&self) -> Result<Vec<Printer>> {
        let raw = std::fs::read_to_string(self.data_path())?;
        Ok(serde_json::from_str(&raw)?)
    }
}

/// Parc de `total` imprimantes dont les `up` premières répondent
pub fn simulated_fleet(total: usize, up: usize) -> (Vec<Printer>, StubProbe) {
    let printers: Vec<Printer> = (0..total)
        .map(|i| Printer::new(format!("10.{}.{}.{}", i / 65536 % 256, i / 256 % 256, i % 256), format!("Setor {i}")))
        .collect();
    let probe = StubProbe::new().with_reachable(printers.iter().take(up).map(|p| p.ip.clone()));
    (printers, probe)
}

/// Sert `app` sur 127.0.0.1 (port libre) en tâche de fond
pub async fn serve_local(app: Router) -> Result<SocketAddr> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("test server stopped: {}", e);
        }
    });
    Ok(addr)
}

//! Printer book - the persisted list of monitored printers
//!
//! The in-memory list is the source of truth; every mutation rewrites the
//! whole JSON file right away (last writer wins, no locking).

use crate::ipv4::is_valid_ipv4;
use crate::models::Printer;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, thiserror::Error)]
pub enum BookError {
    #[error("Informe o IP.")]
    MissingIp,
    #[error("IP inválido: {0}")]
    InvalidIp(String),
    #[error("Impressora não encontrada: {0}")]
    NotFound(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result of a mutation that went through, with the save warning if the
/// file could not be rewritten.
#[derive(Debug, Clone, PartialEq)]
pub struct Applied<T> {
    pub value: T,
    pub warning: Option<String>,
}

pub fn default_printers() -> Vec<Printer> {
    vec![
        Printer::new("192.168.1.10", "Recepção"),
        Printer::new("192.168.1.11", "Centro Cirúrgico"),
    ]
}

#[derive(Debug)]
pub struct PrinterBook {
    path: PathBuf,
    printers: Vec<Printer>,
}

impl PrinterBook {
    /// Reads the list from `path`, falling back to the default printers when
    /// the file is missing or cannot be parsed.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let printers = match read_printers(&path) {
            Ok(Some(list)) => {
                info!("loaded {} printers from {}", list.len(), path.display());
                list
            }
            Ok(None) => {
                info!("no printer file at {}, using defaults", path.display());
                default_printers()
            }
            Err(e) => {
                warn!("failed to read {}: {}, using defaults", path.display(), e);
                default_printers()
            }
        };
        Self { path, printers }
    }

    pub fn with_printers(path: impl Into<PathBuf>, printers: Vec<Printer>) -> Self {
        Self {
            path: path.into(),
            printers,
        }
    }

    pub fn save(&self) -> Result<(), BookError> {
        let content = serde_json::to_string_pretty(&self.printers)?;
        std::fs::write(&self.path, content)?;
        debug!("saved {} printers to {}", self.printers.len(), self.path.display());
        Ok(())
    }

    pub fn add(&mut self, ip: &str, label: &str) -> Result<Applied<Printer>, BookError> {
        let ip = ip.trim();
        if ip.is_empty() {
            return Err(BookError::MissingIp);
        }
        if !is_valid_ipv4(ip) {
            return Err(BookError::InvalidIp(ip.to_string()));
        }

        let printer = Printer::new(ip, label.trim());
        self.printers.push(printer.clone());
        info!("added printer {}", printer.display_entry());
        Ok(self.persisted(printer))
    }

    /// Removes the first printer whose display entry matches.
    pub fn remove_entry(&mut self, entry: &str) -> Result<Applied<Printer>, BookError> {
        let idx = self
            .printers
            .iter()
            .position(|p| p.display_entry() == entry)
            .ok_or_else(|| BookError::NotFound(entry.to_string()))?;

        let removed = self.printers.remove(idx);
        info!("removed printer {}", removed.display_entry());
        Ok(self.persisted(removed))
    }

    /// Empties the list; returns how many printers were dropped.
    pub fn clear(&mut self) -> Applied<usize> {
        let dropped = self.printers.len();
        self.printers.clear();
        info!("cleared printer list ({} entries)", dropped);
        self.persisted(dropped)
    }

    pub fn printers(&self) -> &[Printer] {
        &self.printers
    }

    pub fn entries(&self) -> Vec<String> {
        self.printers.iter().map(Printer::display_entry).collect()
    }

    pub fn ips(&self) -> Vec<String> {
        self.printers.iter().map(|p| p.ip.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.printers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.printers.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persisted<T>(&self, value: T) -> Applied<T> {
        let warning = match self.save() {
            Ok(()) => None,
            Err(e) => {
                warn!("failed to save {}: {}", self.path.display(), e);
                Some(format!("Falha ao salvar {}: {}", self.path.display(), e))
            }
        };
        Applied { value, warning }
    }
}

fn read_printers(path: &Path) -> Result<Option<Vec<Printer>>, BookError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)?;
    Ok(Some(serde_json::from_str(&content)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn stored(path: &Path) -> Vec<Printer> {
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let book = PrinterBook::load(dir.path().join("printers.json"));
        assert_eq!(book.printers(), default_printers().as_slice());
        assert!(!book.path().exists());
    }

    #[test]
    fn test_corrupt_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("printers.json");
        std::fs::write(&path, "{ not json").unwrap();

        let book = PrinterBook::load(&path);
        assert_eq!(book.len(), 2);
        assert_eq!(book.printers()[0].ip, "192.168.1.10");
    }

    #[test]
    fn test_add_valid_ip_appends_and_persists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("printers.json");
        let mut book = PrinterBook::with_printers(&path, vec![]);

        let applied = book.add(" 192.168.1.50 ", " Almoxarifado ").unwrap();
        assert_eq!(applied.value, Printer::new("192.168.1.50", "Almoxarifado"));
        assert!(applied.warning.is_none());
        assert_eq!(book.len(), 1);
        assert_eq!(stored(&path), vec![Printer::new("192.168.1.50", "Almoxarifado")]);
    }

    #[test]
    fn test_add_invalid_ip_changes_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("printers.json");
        let mut book = PrinterBook::with_printers(&path, default_printers());
        book.save().unwrap();
        let before = std::fs::read_to_string(&path).unwrap();

        assert!(matches!(book.add("256.1.1.1", "X"), Err(BookError::InvalidIp(_))));
        assert!(matches!(book.add("   ", "X"), Err(BookError::MissingIp)));
        assert_eq!(book.len(), 2);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    }

    #[test]
    fn test_remove_entry() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("printers.json");
        let mut book = PrinterBook::with_printers(&path, default_printers());
        book.add("10.0.0.7", "Farmácia").unwrap();

        let removed = book.remove_entry("10.0.0.7 — Farmácia").unwrap();
        assert_eq!(removed.value.ip, "10.0.0.7");
        assert_eq!(book.len(), 2);
        assert!(!stored(&path).iter().any(|p| p.ip == "10.0.0.7"));

        assert!(matches!(
            book.remove_entry("10.0.0.7 — Farmácia"),
            Err(BookError::NotFound(_))
        ));
    }

    #[test]
    fn test_clear_empties_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("printers.json");
        let mut book = PrinterBook::with_printers(&path, default_printers());

        let applied = book.clear();
        assert_eq!(applied.value, 2);
        assert!(book.is_empty());
        assert!(stored(&path).is_empty());
    }

    #[test]
    fn test_save_reload_keeps_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("printers.json");
        let list = vec![
            Printer::new("10.0.0.9", "UTI"),
            Printer::new("10.0.0.2", "Recepção"),
            Printer::new("10.0.0.5", ""),
        ];
        PrinterBook::with_printers(&path, list.clone()).save().unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("Recepção"), "non-ASCII labels are kept readable");
        assert_eq!(PrinterBook::load(&path).printers(), list.as_slice());
    }

    #[test]
    fn test_save_failure_is_a_warning() {
        let dir = TempDir::new().unwrap();
        // a directory path cannot be written as a file
        let mut book = PrinterBook::with_printers(dir.path(), vec![]);

        let applied = book.add("10.1.1.1", "Lab").unwrap();
        assert!(applied.warning.is_some());
        assert_eq!(book.len(), 1);
    }
}

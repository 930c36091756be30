//! Aggregated view of one check cycle: counters, sorted rows, filtering
//! and CSV export.

use crate::ipv4::octets;
use crate::models::{HostCheck, Printer};
use serde::Serialize;
use std::cmp::Ordering;

pub const CSV_HEADERS: [&str; 4] = ["IP", "Setor", "Status", "Checado às"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusRow {
    pub ip: String,
    pub label: String,
    pub reachable: bool,
    pub checked_at: String,
}

impl StatusRow {
    pub fn status_text(&self) -> &'static str {
        if self.reachable {
            "Online"
        } else {
            "Offline"
        }
    }

    fn matches(&self, needle: &str) -> bool {
        self.ip.to_lowercase().contains(needle) || self.label.to_lowercase().contains(needle)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub rows: Vec<StatusRow>,
    pub up: usize,
    pub down: usize,
    pub total: usize,
    pub checked_at: Option<String>,
    pub idle: bool,
}

impl Snapshot {
    /// Nothing configured, nothing checked.
    pub fn idle() -> Self {
        Self {
            rows: Vec::new(),
            up: 0,
            down: 0,
            total: 0,
            checked_at: None,
            idle: true,
        }
    }

    /// Pairs `printers` with the `checks` of the same cycle (same order).
    pub fn build(printers: &[Printer], checks: Vec<HostCheck>, checked_at: String) -> Self {
        if printers.is_empty() {
            return Self::idle();
        }

        let mut rows: Vec<StatusRow> = printers
            .iter()
            .zip(checks)
            .map(|(printer, check)| StatusRow {
                ip: check.ip,
                label: printer.label.clone(),
                reachable: check.reachable,
                checked_at: check.timestamp,
            })
            .collect();
        rows.sort_by(|a, b| compare_ips(&a.ip, &b.ip));

        let total = rows.len();
        let up = rows.iter().filter(|r| r.reachable).count();
        Self {
            rows,
            up,
            down: total - up,
            total,
            checked_at: Some(checked_at),
            idle: false,
        }
    }

    /// Rows whose IP or label contains `query` (case-insensitive).
    /// Counters keep describing the whole list.
    pub fn filtered(mut self, query: &str) -> Self {
        let needle = query.trim().to_lowercase();
        if !needle.is_empty() {
            self.rows.retain(|r| r.matches(&needle));
        }
        self
    }

    pub fn to_csv(&self) -> Result<String, csv::Error> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(CSV_HEADERS)?;
        for row in &self.rows {
            writer.write_record([
                row.ip.as_str(),
                row.label.as_str(),
                row.status_text(),
                row.checked_at.as_str(),
            ])?;
        }
        let bytes = writer.into_inner().map_err(|e| e.into_error())?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Numeric octet order for dotted quads, lexical order for anything else.
/// Dotted quads sort before other entries.
pub fn compare_ips(a: &str, b: &str) -> Ordering {
    match (octets(a), octets(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

pub fn export_file_name(stamp: &str) -> String {
    format!("impressoras_{stamp}.csv")
}

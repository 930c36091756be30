use serde::{Deserialize, Serialize};

/// A configured printer: its address and the sector it sits in.
///
/// On disk the label keeps its historical key, `setor`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Printer {
    pub ip: String,
    #[serde(rename = "setor", default)]
    pub label: String,
}

impl Printer {
    pub fn new(ip: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            ip: ip.into(),
            label: label.into(),
        }
    }

    /// Identifier shown in the removal selector.
    pub fn display_entry(&self) -> String {
        format!("{} — {}", self.ip, self.label)
    }
}

/// Outcome of one reachability check, valid for a single render pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostCheck {
    pub ip: String,
    pub reachable: bool,
    pub timestamp: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Viewer,
}

/// Identity carried by a login session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub username: String,
    pub name: String,
    pub role: Role,
}

impl SessionUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

//! Static credential table for the login gate.
//!
//! Plain-text comparison, no hashing, lockout or throttling.

use crate::models::{Role, SessionUser};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Same error for unknown users and wrong passwords.
    #[error("Credenciais inválidas.")]
    InvalidCredentials,
}

#[derive(Debug, Clone)]
struct Account {
    display_name: String,
    password: String,
    role: Role,
}

#[derive(Debug, Clone)]
pub struct CredentialTable {
    accounts: HashMap<String, Account>,
}

impl CredentialTable {
    pub fn new(admin_password: &str, user_password: &str) -> Self {
        let mut accounts = HashMap::new();
        accounts.insert(
            "Admin".to_string(),
            Account {
                display_name: "Administrador".to_string(),
                password: admin_password.to_string(),
                role: Role::Admin,
            },
        );
        accounts.insert(
            "usuario".to_string(),
            Account {
                display_name: "Usuário".to_string(),
                password: user_password.to_string(),
                role: Role::Viewer,
            },
        );
        Self { accounts }
    }

    pub fn verify(&self, username: &str, password: &str) -> Result<SessionUser, AuthError> {
        let username = username.trim();
        match self.accounts.get(username) {
            Some(account) if account.password == password => Ok(SessionUser {
                username: username.to_string(),
                name: account.display_name.clone(),
                role: account.role,
            }),
            _ => Err(AuthError::InvalidCredentials),
        }
    }

    pub fn usernames(&self) -> Vec<&str> {
        self.accounts.keys().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> CredentialTable {
        CredentialTable::new("s3cret", "user123")
    }

    #[test]
    fn test_valid_credentials() {
        let admin = table().verify("Admin", "s3cret").unwrap();
        assert_eq!(admin.name, "Administrador");
        assert!(admin.is_admin());

        let viewer = table().verify(" usuario ", "user123").unwrap();
        assert_eq!(viewer.username, "usuario");
        assert_eq!(viewer.role, Role::Viewer);
    }

    #[test]
    fn test_unknown_user_and_wrong_password_look_the_same() {
        let wrong_pw = table().verify("Admin", "nope").unwrap_err();
        let unknown = table().verify("root", "s3cret").unwrap_err();
        assert_eq!(wrong_pw, unknown);
        assert_eq!(wrong_pw.to_string(), "Credenciais inválidas.");
    }

    #[test]
    fn test_password_is_not_trimmed() {
        assert!(table().verify("Admin", " s3cret").is_err());
        assert!(table().verify("", "").is_err());
    }
}

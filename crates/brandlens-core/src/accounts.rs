//! Microblog account pool with round-robin rotation.
//!
//! Accounts are loaded from a YAML file once at startup; rotation state is
//! an explicit cursor on the pool rather than ambient global state, so
//! parallel runs with distinct pools stay isolated.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::Deserialize;

use crate::error::ConfigError;

/// One microblog API account.
#[derive(Debug, Clone, Deserialize)]
pub struct MicroblogAccount {
    pub label: String,
    pub bearer_token: String,
}

#[derive(Debug, Deserialize)]
struct AccountsFile {
    accounts: Vec<MicroblogAccount>,
}

/// Load and validate microblog accounts from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails
/// validation (empty token, duplicate label, or no accounts at all).
pub fn load_accounts(path: &Path) -> Result<Vec<MicroblogAccount>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::AccountsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_accounts(&content)
}

/// Parse and validate the accounts file content.
///
/// # Errors
///
/// Returns `ConfigError` on parse or validation failure.
pub fn parse_accounts(content: &str) -> Result<Vec<MicroblogAccount>, ConfigError> {
    let file: AccountsFile = serde_yaml::from_str(content)?;

    if file.accounts.is_empty() {
        return Err(ConfigError::Validation(
            "accounts file must list at least one account".to_string(),
        ));
    }

    let mut seen_labels = std::collections::HashSet::new();
    for account in &file.accounts {
        if account.bearer_token.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "account '{}' has an empty bearer token",
                account.label
            )));
        }
        if !seen_labels.insert(account.label.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate account label: '{}'",
                account.label
            )));
        }
    }

    Ok(file.accounts)
}

/// Round-robin pool of microblog accounts.
#[derive(Debug)]
pub struct AccountPool {
    accounts: Vec<MicroblogAccount>,
    cursor: AtomicUsize,
}

impl AccountPool {
    /// Build a pool from a non-empty account list.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if `accounts` is empty.
    pub fn new(accounts: Vec<MicroblogAccount>) -> Result<Self, ConfigError> {
        if accounts.is_empty() {
            return Err(ConfigError::Validation(
                "account pool must not be empty".to_string(),
            ));
        }
        Ok(Self {
            accounts,
            cursor: AtomicUsize::new(0),
        })
    }

    /// Next account in rotation.
    pub fn next(&self) -> &MicroblogAccount {
        let index = self.cursor.fetch_add(1, Ordering::Relaxed) % self.accounts.len();
        &self.accounts[index]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = "accounts:\n  - label: primary\n    bearer_token: tok-1\n  - label: backup\n    bearer_token: tok-2\n";

    #[test]
    fn parses_valid_accounts_file() {
        let accounts = parse_accounts(VALID).unwrap();
        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[0].label, "primary");
        assert_eq!(accounts[1].bearer_token, "tok-2");
    }

    #[test]
    fn rejects_empty_account_list() {
        let result = parse_accounts("accounts: []\n");
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn rejects_blank_bearer_token() {
        let content = "accounts:\n  - label: primary\n    bearer_token: \"  \"\n";
        let result = parse_accounts(content);
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn rejects_duplicate_labels_case_insensitively() {
        let content =
            "accounts:\n  - label: Primary\n    bearer_token: a\n  - label: primary\n    bearer_token: b\n";
        let result = parse_accounts(content);
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn pool_rotates_round_robin() {
        let pool = AccountPool::new(parse_accounts(VALID).unwrap()).unwrap();
        assert_eq!(pool.next().label, "primary");
        assert_eq!(pool.next().label, "backup");
        assert_eq!(pool.next().label, "primary");
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn pool_rejects_empty_list() {
        let result = AccountPool::new(Vec::new());
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }
}

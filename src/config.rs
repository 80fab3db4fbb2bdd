use std::path::PathBuf;

use thiserror::Error;

use crate::admin::{AdminCredential, DEFAULT_PASSWORD_HASH};
use crate::matcher::DEFAULT_THRESHOLD;

pub const DATA_VAR: &str = "RESULTS_DATA";
pub const VISITOR_LOG_VAR: &str = "RESULTS_VISITOR_LOG";
pub const THRESHOLD_VAR: &str = "RESULTS_MATCH_THRESHOLD";
pub const ADMIN_USER_VAR: &str = "RESULTS_ADMIN_USER";
pub const ADMIN_HASH_VAR: &str = "RESULTS_ADMIN_PASSWORD_HASH";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} must be an integer between 0 and 100, got '{value}'")]
    Threshold { var: &'static str, value: String },

    #[error("{var} must be a 64 character hex SHA-256 digest")]
    PasswordHash { var: &'static str },
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub data_path: PathBuf,
    pub visitor_log: PathBuf,
    pub match_threshold: u8,
    pub admin: AdminCredential,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("student_data"),
            visitor_log: PathBuf::from("visitor_log.txt"),
            match_threshold: DEFAULT_THRESHOLD,
            admin: AdminCredential {
                username: "admin".to_string(),
                password_sha256_hex: DEFAULT_PASSWORD_HASH.to_string(),
            },
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Builds settings from any variable source; unset or blank variables
    /// keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|value| !value.trim().is_empty());
        let mut settings = Self::default();

        if let Some(value) = get(DATA_VAR) {
            settings.data_path = PathBuf::from(value);
        }
        if let Some(value) = get(VISITOR_LOG_VAR) {
            settings.visitor_log = PathBuf::from(value);
        }
        if let Some(value) = get(THRESHOLD_VAR) {
            settings.match_threshold = parse_threshold(THRESHOLD_VAR, &value)?;
        }
        if let Some(value) = get(ADMIN_USER_VAR) {
            settings.admin.username = value;
        }
        if let Some(value) = get(ADMIN_HASH_VAR) {
            let value = value.trim().to_string();
            if value.len() != 64 || !value.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(ConfigError::PasswordHash { var: ADMIN_HASH_VAR });
            }
            settings.admin.password_sha256_hex = value;
        }

        Ok(settings)
    }
}

pub fn parse_threshold(var: &'static str, value: &str) -> Result<u8, ConfigError> {
    value
        .trim()
        .parse::<u8>()
        .ok()
        .filter(|threshold| *threshold <= 100)
        .ok_or_else(|| ConfigError::Threshold {
            var,
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|var| map.get(var).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let settings = settings(&[]).unwrap();
        assert_eq!(settings.data_path, PathBuf::from("student_data"));
        assert_eq!(settings.match_threshold, 75);
        assert_eq!(settings.admin.username, "admin");
    }

    #[test]
    fn variables_override_defaults() {
        let settings = settings(&[
            (DATA_VAR, "/srv/results"),
            (THRESHOLD_VAR, "70"),
            (ADMIN_USER_VAR, "surveillant"),
            (VISITOR_LOG_VAR, " "),
        ])
        .unwrap();
        assert_eq!(settings.data_path, PathBuf::from("/srv/results"));
        assert_eq!(settings.match_threshold, 70);
        assert_eq!(settings.admin.username, "surveillant");
        assert_eq!(settings.visitor_log, PathBuf::from("visitor_log.txt"));
    }

    #[test]
    fn bad_values_are_rejected() {
        assert!(matches!(
            settings(&[(THRESHOLD_VAR, "101")]),
            Err(ConfigError::Threshold { .. })
        ));
        assert!(matches!(
            settings(&[(THRESHOLD_VAR, "high")]),
            Err(ConfigError::Threshold { .. })
        ));
        assert!(matches!(
            settings(&[(ADMIN_HASH_VAR, "abc")]),
            Err(ConfigError::PasswordHash { .. })
        ));
    }
}

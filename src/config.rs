use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;
use crate::loader::DEFAULT_FETCH_TIMEOUT;

/// Runtime settings for both the server and the console client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub roster_url: String,
    pub session_url: String,
    pub session_cookie: Option<String>,
    pub fetch_timeout: Duration,
    pub roster_file: PathBuf,
    pub admin_password: String,
    pub auth_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            roster_url: "http://localhost:8080/api/schedule".to_string(),
            session_url: "http://localhost:8080".to_string(),
            session_cookie: None,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            roster_file: PathBuf::from("data/roster.json"),
            admin_password: "admin123".to_string(), // Default password, change this!
            auth_url: "/api/login".to_string(),
        }
    }
}

impl AppConfig {
    /// Reads settings from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`, falling back to defaults for unset keys
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let fetch_timeout = match lookup("FETCH_TIMEOUT_SECS") {
            Some(value) => {
                let secs: u64 = value
                    .trim()
                    .parse()
                    .ok()
                    .filter(|secs| *secs > 0)
                    .ok_or(ConfigError::InvalidValue {
                        key: "FETCH_TIMEOUT_SECS",
                        value,
                    })?;
                Duration::from_secs(secs)
            }
            None => defaults.fetch_timeout,
        };

        Ok(Self {
            roster_url: lookup("ROSTER_URL").unwrap_or(defaults.roster_url),
            session_url: lookup("SESSION_URL").unwrap_or(defaults.session_url),
            session_cookie: lookup("SESSION_COOKIE").filter(|c| !c.trim().is_empty()),
            fetch_timeout,
            roster_file: lookup("ROSTER_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.roster_file),
            admin_password: lookup("ADMIN_PASSWORD").unwrap_or(defaults.admin_password),
            auth_url: lookup("AUTH_URL").unwrap_or(defaults.auth_url),
        })
    }
}

//! Client configuration.
//!
//! Loaded from `~/.folio-auth/config.toml` when present, otherwise
//! defaulted; individual fields can be overridden via environment
//! variables (`FOLIO_AUTH_URL`, `FOLIO_AUTH_TIMEOUT_SECS`,
//! `FOLIO_AUTH_PIN_LENGTH`).

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::pin::{PinPolicy, DEFAULT_PIN_LENGTH};

/// Default backend base URL (local development server).
const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// Default request timeout for the auth endpoints (seconds).
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Backend base URL the `/auth/*` endpoints hang off.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Second-factor digit count.
    #[serde(default = "default_pin_length")]
    pub pin_length: usize,

    /// Override for the token file location. Defaults to
    /// `<app dir>/session.token`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_path: Option<PathBuf>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_pin_length() -> usize {
    DEFAULT_PIN_LENGTH
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_timeout_secs(),
            pin_length: default_pin_length(),
            token_path: None,
        }
    }
}

impl AuthConfig {
    /// App directory (`~/.folio-auth`).
    pub fn app_dir() -> Result<PathBuf> {
        let home = directories::UserDirs::new()
            .map(|u| u.home_dir().to_path_buf())
            .ok_or_else(|| anyhow::anyhow!("could not find home directory"))?;
        Ok(home.join(".folio-auth"))
    }

    /// Load `config.toml` from the app dir (defaults when absent), then
    /// apply environment overrides.
    pub fn load() -> Result<Self> {
        let path = Self::app_dir()?.join("config.toml");
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            toml::from_str(&contents)
                .map_err(|e| anyhow::anyhow!("failed to parse {}: {e}", path.display()))?
        } else {
            Self::default()
        };
        config.apply_env();
        Ok(config)
    }

    /// Environment overrides; malformed numeric values are ignored.
    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("FOLIO_AUTH_URL") {
            if !url.is_empty() {
                self.base_url = url;
            }
        }
        if let Ok(secs) = std::env::var("FOLIO_AUTH_TIMEOUT_SECS") {
            if let Ok(secs) = secs.parse() {
                self.request_timeout_secs = secs;
            }
        }
        if let Ok(len) = std::env::var("FOLIO_AUTH_PIN_LENGTH") {
            if let Ok(len) = len.parse() {
                self.pin_length = len;
            }
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn pin_policy(&self) -> PinPolicy {
        PinPolicy::with_length(self.pin_length)
    }

    /// Where the session token lives.
    pub fn token_path(&self) -> Result<PathBuf> {
        match &self.token_path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::app_dir()?.join("session.token")),
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = AuthConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.pin_length, 9);
        assert_eq!(config.pin_policy().length, 9);
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let config: AuthConfig =
            toml::from_str(r#"base_url = "https://api.folio.dev""#).unwrap();
        assert_eq!(config.base_url, "https://api.folio.dev");
        assert_eq!(config.pin_length, DEFAULT_PIN_LENGTH);
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn round_trips_through_toml() {
        let mut config = AuthConfig::default();
        config.pin_length = 6;
        config.token_path = Some(PathBuf::from("/tmp/folio.token"));

        let serialized = toml::to_string(&config).unwrap();
        let parsed: AuthConfig = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed.pin_length, 6);
        assert_eq!(parsed.token_path.as_deref(), Some(std::path::Path::new("/tmp/folio.token")));
    }

    #[test]
    fn explicit_token_path_wins() {
        let mut config = AuthConfig::default();
        config.token_path = Some(PathBuf::from("/tmp/elsewhere.token"));
        assert_eq!(
            config.token_path().unwrap(),
            PathBuf::from("/tmp/elsewhere.token")
        );
    }
}

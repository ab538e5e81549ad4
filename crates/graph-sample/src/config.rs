//! # Application Configuration
//!
//! [`AppConfig`] is the leaf component every service reads its settings from. It
//! is loaded from an optional TOML file; missing keys fall back to defaults.
//!
//! ```toml
//! jwt_secret = "change-me"
//! session_timeout_secs = 1800
//! refresh_threshold_secs = 300
//! cookie_name = "auth-token"
//! ```

use crate::error::ConfigError;
use component_graph::{Component, ConstructError};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HMAC secret used to sign session tokens.
    pub jwt_secret: String,
    pub session_timeout_secs: u64,
    /// Tokens expiring sooner than this are re-issued on the next request.
    pub refresh_threshold_secs: u64,
    pub cookie_name: String,
    /// Mark the session cookie `Secure`.
    pub secure_cookie: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "jwtdemo".to_string(),
            session_timeout_secs: 30 * 60,
            refresh_threshold_secs: 5 * 60,
            cookie_name: "auth-token".to_string(),
            secure_cookie: true,
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Reads `path` if given, otherwise returns the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    pub fn session_timeout(&self) -> Duration {
        Duration::from_secs(self.session_timeout_secs)
    }

    pub fn refresh_threshold(&self) -> Duration {
        Duration::from_secs(self.refresh_threshold_secs)
    }
}

impl Component for AppConfig {
    type Instance = AppConfig;

    fn construct(&self) -> Result<AppConfig, ConstructError> {
        if self.refresh_threshold_secs >= self.session_timeout_secs {
            return Err(format!(
                "refresh threshold ({}s) must be shorter than the session timeout ({}s)",
                self.refresh_threshold_secs, self.session_timeout_secs
            )
            .into());
        }
        Ok(self.clone())
    }
}

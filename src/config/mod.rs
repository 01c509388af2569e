//! Application configuration

pub mod profile;

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use profile::{ConfigError, PresentationProfile, ResetIdentityPolicy};

const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the chat service; requests go to `{server_url}/chat`
    pub server_url: String,
    pub request_timeout_secs: u64,
    /// Optional TOML presentation profile
    pub profile_path: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let request_timeout_secs = match env::var("PARLEY_REQUEST_TIMEOUT_SECS") {
            Ok(raw) => raw.trim().parse().map_err(|_| {
                ConfigError::Validation(format!(
                    "PARLEY_REQUEST_TIMEOUT_SECS must be a whole number of seconds, got '{}'",
                    raw
                ))
            })?,
            Err(_) => DEFAULT_REQUEST_TIMEOUT_SECS,
        };

        Ok(Self {
            server_url: env::var("PARLEY_SERVER_URL").unwrap_or_else(|_| DEFAULT_SERVER_URL.into()),
            request_timeout_secs,
            profile_path: env::var("PARLEY_PROFILE").ok().map(PathBuf::from),
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Load the presentation profile, falling back to defaults when none is configured
    pub fn load_profile(&self) -> Result<PresentationProfile, ConfigError> {
        match &self.profile_path {
            Some(path) => PresentationProfile::from_file(path),
            None => Ok(PresentationProfile::default()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.into(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            profile_path: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server_url, "http://127.0.0.1:5000");
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert!(config.profile_path.is_none());
    }

    #[test]
    fn test_default_profile_without_path() {
        let profile = Config::default().load_profile().unwrap();
        assert_eq!(profile.reset_delay(), Duration::from_millis(2000));
    }

    #[test]
    fn test_missing_profile_file_is_error() {
        let config = Config {
            profile_path: Some(PathBuf::from("/nonexistent/parley-profile.toml")),
            ..Config::default()
        };
        assert!(matches!(config.load_profile(), Err(ConfigError::Io(_))));
    }
}

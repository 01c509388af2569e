//! Presentation profile loaded from TOML files
//!
//! The profile controls how the transcript looks and how the client restarts:
//! - Greeting shown at the start of every session
//! - Sender labels and timestamp format
//! - Reset delay and what happens to the participant identity on reset

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::identity::DEFAULT_IDENTITY_KEY;
use crate::render::{is_valid_timestamp_format, DEFAULT_TIMESTAMP_FORMAT};

/// What a reset does to the participant identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResetIdentityPolicy {
    /// Keep the identity for the whole tab lifetime
    #[default]
    Preserve,
    /// Start the new session under a fresh identity
    Rotate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PresentationProfile {
    /// Bot message rendered at the start of every session
    pub greeting: String,

    /// Prefix entries with their sender label
    pub show_labels: bool,

    pub bot_label: String,

    pub user_label: String,

    /// chrono format string for entry timestamps
    pub timestamp_format: String,

    /// Delay between a reset signal and the restart
    pub reset_delay_ms: u64,

    pub reset_identity: ResetIdentityPolicy,

    /// Tab storage key holding the participant identity
    pub identity_key: String,
}

impl PresentationProfile {
    /// Load a profile from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load a profile from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let profile: PresentationProfile = toml::from_str(content)?;
        profile.validate()?;
        Ok(profile)
    }

    pub fn reset_delay(&self) -> Duration {
        Duration::from_millis(self.reset_delay_ms)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.identity_key.trim().is_empty() {
            return Err(ConfigError::Validation("identity_key must not be empty".into()));
        }
        if !is_valid_timestamp_format(&self.timestamp_format) {
            return Err(ConfigError::Validation(format!(
                "timestamp_format '{}' is not a valid strftime format",
                self.timestamp_format
            )));
        }
        Ok(())
    }
}

impl Default for PresentationProfile {
    fn default() -> Self {
        Self {
            greeting: "Welcome! Please provide a Google Doc link to get started.".into(),
            show_labels: true,
            bot_label: "Bot".into(),
            user_label: "You".into(),
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.into(),
            reset_delay_ms: 2000,
            reset_identity: ResetIdentityPolicy::default(),
            identity_key: DEFAULT_IDENTITY_KEY.into(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_PROFILE: &str = r#"
greeting = "Hello! Paste a document link."
show_labels = false
timestamp_format = "%H:%M:%S"
reset_delay_ms = 500
reset_identity = "rotate"
identity_key = "docbot_user"
"#;

    #[test]
    fn test_parse_profile() {
        let profile = PresentationProfile::from_toml(SAMPLE_PROFILE).unwrap();

        assert_eq!(profile.greeting, "Hello! Paste a document link.");
        assert!(!profile.show_labels);
        assert_eq!(profile.timestamp_format, "%H:%M:%S");
        assert_eq!(profile.reset_delay(), Duration::from_millis(500));
        assert_eq!(profile.reset_identity, ResetIdentityPolicy::Rotate);
        assert_eq!(profile.identity_key, "docbot_user");
        assert_eq!(profile.bot_label, "Bot"); // Default
    }

    #[test]
    fn test_empty_profile_uses_defaults() {
        let profile = PresentationProfile::from_toml("").unwrap();

        assert!(profile.show_labels);
        assert_eq!(profile.user_label, "You");
        assert_eq!(profile.reset_delay_ms, 2000);
        assert_eq!(profile.reset_identity, ResetIdentityPolicy::Preserve);
        assert_eq!(profile.identity_key, "chat_user_id");
    }

    #[test]
    fn test_unknown_policy_rejected() {
        let result = PresentationProfile::from_toml(r#"reset_identity = "shuffle""#);
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn test_invalid_timestamp_format_rejected() {
        let result = PresentationProfile::from_toml(r#"timestamp_format = "%Q""#);
        assert!(matches!(result, Err(ConfigError::Validation(_))));

        let result = PresentationProfile::from_toml(r#"timestamp_format = """#);
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_blank_identity_key_rejected() {
        let result = PresentationProfile::from_toml(r#"identity_key = "  ""#);
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }
}

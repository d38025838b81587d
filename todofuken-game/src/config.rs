//! Engine configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when configuration is malformed.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid engine config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("`{field}` must not be empty")]
    EmptyKey { field: &'static str },
    #[error("`session_key` and `records_key` must differ (both `{0}`)")]
    SharedKey(String),
    #[error("`record_limit` must be at least 1")]
    ZeroRecordLimit,
}

/// Storage slot names, history bound and RNG seeding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Slot holding the in-progress session.
    pub session_key: String,
    /// Slot holding the completed-session history.
    pub records_key: String,
    /// Maximum records kept.
    pub record_limit: usize,
    /// Fixed RNG seed. `None` seeds from platform entropy.
    pub seed: Option<u64>,
}

impl EngineConfig {
    pub const DEFAULT_SESSION_KEY: &'static str = "gameState";
    pub const DEFAULT_RECORDS_KEY: &'static str = "gameRecords";
    pub const DEFAULT_RECORD_LIMIT: usize = 50;

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Parse and validate a JSON config. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a field is out of range.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns an error if a slot name is empty, both slots share a name, or
    /// the record limit is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session_key.is_empty() {
            return Err(ConfigError::EmptyKey {
                field: "session_key",
            });
        }
        if self.records_key.is_empty() {
            return Err(ConfigError::EmptyKey {
                field: "records_key",
            });
        }
        if self.session_key == self.records_key {
            return Err(ConfigError::SharedKey(self.session_key.clone()));
        }
        if self.record_limit == 0 {
            return Err(ConfigError::ZeroRecordLimit);
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            session_key: Self::DEFAULT_SESSION_KEY.to_string(),
            records_key: Self::DEFAULT_RECORDS_KEY.to_string(),
            record_limit: Self::DEFAULT_RECORD_LIMIT,
            seed: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_yields_defaults() {
        let config = EngineConfig::from_json("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.session_key, "gameState");
        assert_eq!(config.records_key, "gameRecords");
        assert_eq!(config.record_limit, 50);
    }

    #[test]
    fn partial_json_overrides_fields() {
        let config = EngineConfig::from_json(r#"{"seed": 42, "record_limit": 5}"#).unwrap();
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.record_limit, 5);
        assert_eq!(config.session_key, "gameState");
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(matches!(
            EngineConfig::from_json(r#"{"record_limit": 0}"#),
            Err(ConfigError::ZeroRecordLimit)
        ));
        assert!(matches!(
            EngineConfig::from_json(r#"{"records_key": "gameState"}"#),
            Err(ConfigError::SharedKey(_))
        ));
        assert!(matches!(
            EngineConfig::from_json(r#"{"session_key": ""}"#),
            Err(ConfigError::EmptyKey { .. })
        ));
        assert!(matches!(
            EngineConfig::from_json("not json"),
            Err(ConfigError::Json(_))
        ));
    }
}

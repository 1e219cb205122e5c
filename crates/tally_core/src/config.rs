//! Ledger configuration.
//!
//! [`LedgerConfig`] holds the few knobs that shape storage keys and growth
//! defaults. It can be built in code, deserialized from JSON, or read from
//! `TALLY_*` environment variables.

use serde::{Deserialize, Serialize};

/// Environment variable overriding [`LedgerConfig::key_prefix`].
pub const KEY_PREFIX_ENV: &str = "TALLY_KEY_PREFIX";

/// Environment variable overriding [`LedgerConfig::unknown_owner`].
pub const UNKNOWN_OWNER_ENV: &str = "TALLY_UNKNOWN_OWNER";

/// Environment variable overriding [`LedgerConfig::default_interval_secs`].
pub const DEFAULT_INTERVAL_ENV: &str = "TALLY_DEFAULT_INTERVAL";

/// Errors raised while loading a [`LedgerConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The JSON document could not be parsed.
    #[error("invalid ledger config: {0}")]
    Json(#[from] serde_json::Error),

    /// An environment variable held an unusable value.
    #[error("invalid value for {var}: {reason}")]
    InvalidEnv {
        /// Name of the offending variable.
        var: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// A field value is out of range.
    #[error("invalid ledger config: {0}")]
    Invalid(String),
}

/// Storage-key and growth defaults shared by every resource of a ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Prefix prepended to every resource key.
    pub key_prefix: String,
    /// Owner id used when the ambient user/chat is unknown.
    pub unknown_owner: String,
    /// Owner id used for the global namespace.
    pub global_owner: String,
    /// Interval applied when growth options leave it unset, in seconds.
    pub default_interval_secs: f64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            key_prefix: "ResourcesLib_".to_string(),
            unknown_owner: "unknown".to_string(),
            global_owner: "global".to_string(),
            default_interval_secs: 60.0,
        }
    }
}

impl LedgerConfig {
    /// Parses a JSON document. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] for malformed JSON and
    /// [`ConfigError::Invalid`] when a field is out of range.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Builds a config from the defaults overridden by `TALLY_*` variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnv`] when a variable is set to an
    /// unusable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(prefix) = lookup(KEY_PREFIX_ENV) {
            config.key_prefix = prefix;
        }
        if let Some(owner) = lookup(UNKNOWN_OWNER_ENV) {
            if owner.is_empty() {
                return Err(ConfigError::InvalidEnv {
                    var: UNKNOWN_OWNER_ENV,
                    reason: "must not be empty".to_string(),
                });
            }
            config.unknown_owner = owner;
        }
        if let Some(raw) = lookup(DEFAULT_INTERVAL_ENV) {
            config.default_interval_secs =
                raw.trim()
                    .parse::<f64>()
                    .map_err(|err| ConfigError::InvalidEnv {
                        var: DEFAULT_INTERVAL_ENV,
                        reason: err.to_string(),
                    })?;
        }

        config.validate().map_err(|err| match err {
            ConfigError::Invalid(reason) => ConfigError::InvalidEnv {
                var: DEFAULT_INTERVAL_ENV,
                reason,
            },
            other => other,
        })?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.default_interval_secs.is_finite() || self.default_interval_secs <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "default_interval_secs must be a positive number, got {}",
                self.default_interval_secs
            )));
        }
        if self.unknown_owner.is_empty() || self.global_owner.is_empty() {
            return Err(ConfigError::Invalid(
                "owner sentinels must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_match_legacy_layout() {
        let config = LedgerConfig::default();
        assert_eq!(config.key_prefix, "ResourcesLib_");
        assert_eq!(config.unknown_owner, "unknown");
        assert_eq!(config.global_owner, "global");
        assert_eq!(config.default_interval_secs, 60.0);
    }

    #[test]
    fn json_fills_missing_fields() {
        let config = LedgerConfig::from_json(r#"{"key_prefix": "bot42_"}"#).unwrap();
        assert_eq!(config.key_prefix, "bot42_");
        assert_eq!(config.unknown_owner, "unknown");
    }

    #[test]
    fn json_rejects_non_positive_interval() {
        let err = LedgerConfig::from_json(r#"{"default_interval_secs": 0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn env_overrides_defaults() {
        let config = LedgerConfig::from_lookup(lookup(&[
            (KEY_PREFIX_ENV, "x_"),
            (UNKNOWN_OWNER_ENV, "anon"),
            (DEFAULT_INTERVAL_ENV, " 30 "),
        ]))
        .unwrap();

        assert_eq!(config.key_prefix, "x_");
        assert_eq!(config.unknown_owner, "anon");
        assert_eq!(config.default_interval_secs, 30.0);
    }

    #[test]
    fn env_rejects_bad_interval() {
        let err = LedgerConfig::from_lookup(lookup(&[(DEFAULT_INTERVAL_ENV, "soon")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidEnv {
                var: DEFAULT_INTERVAL_ENV,
                ..
            }
        ));

        let err = LedgerConfig::from_lookup(lookup(&[(DEFAULT_INTERVAL_ENV, "-5")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { .. }));
    }

    #[test]
    fn env_rejects_empty_sentinel() {
        let err = LedgerConfig::from_lookup(lookup(&[(UNKNOWN_OWNER_ENV, "")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { .. }));
    }
}

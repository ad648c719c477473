//! Engine configuration

use clique_types::{CliqueError, CliqueResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunables shared by every engine component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Capacity used when a group is created without an explicit one
    pub default_target_capacity: usize,
    /// Readiness percentage that completes warm-up
    pub required_readiness_percent: u8,
    /// Upper bound on a single recommender call
    pub recommender_timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_target_capacity: 6,
            required_readiness_percent: 100,
            recommender_timeout_secs: 30,
        }
    }
}

impl EngineConfig {
    /// Parse a TOML document; missing keys keep their defaults.
    pub fn from_toml_str(contents: &str) -> CliqueResult<Self> {
        let config: EngineConfig =
            toml::from_str(contents).map_err(|e| CliqueError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> CliqueResult<()> {
        if self.default_target_capacity == 0 {
            return Err(CliqueError::Config(
                "default_target_capacity must be at least 1".into(),
            ));
        }
        if self.required_readiness_percent == 0 || self.required_readiness_percent > 100 {
            return Err(CliqueError::Config(format!(
                "required_readiness_percent must be within 1..=100, got {}",
                self.required_readiness_percent
            )));
        }
        if self.recommender_timeout_secs == 0 {
            return Err(CliqueError::Config(
                "recommender_timeout_secs must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn recommender_timeout(&self) -> Duration {
        Duration::from_secs(self.recommender_timeout_secs)
    }

    pub fn with_default_target_capacity(mut self, capacity: usize) -> Self {
        self.default_target_capacity = capacity;
        self
    }

    pub fn with_required_readiness_percent(mut self, percent: u8) -> Self {
        self.required_readiness_percent = percent;
        self
    }

    pub fn with_recommender_timeout_secs(mut self, secs: u64) -> Self {
        self.recommender_timeout_secs = secs;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.default_target_capacity, 6);
        assert_eq!(config.required_readiness_percent, 100);
        assert_eq!(config.recommender_timeout(), Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = EngineConfig::from_toml_str("default_target_capacity = 4\n").unwrap();
        assert_eq!(config.default_target_capacity, 4);
        assert_eq!(config.required_readiness_percent, 100);
    }

    #[test]
    fn test_rejects_out_of_range_percent() {
        let err = EngineConfig::from_toml_str("required_readiness_percent = 150\n").unwrap_err();
        assert!(matches!(err, CliqueError::Config(_)));
    }

    #[test]
    fn test_rejects_malformed_toml() {
        assert!(EngineConfig::from_toml_str("default_target_capacity = [").is_err());
    }
}

//! CLI configuration

use crate::error::{CliError, CliResult};
use clique_engine::EngineConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// CLI configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CliConfig {
    /// State file used when `--state` is not given
    pub state_file: Option<PathBuf>,

    /// Actor recorded in the audit log when `--actor` is not given
    pub default_actor: Option<String>,

    /// Engine tunables
    pub engine: EngineConfig,
}

impl CliConfig {
    /// Load configuration from file
    pub fn load(path: Option<&str>) -> CliResult<Self> {
        let config_path = match path.map(PathBuf::from).or_else(Self::default_config_path) {
            Some(p) => p,
            None => return Ok(CliConfig::default()),
        };

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            Self::from_toml_str(&contents)
        } else {
            Ok(CliConfig::default())
        }
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(contents: &str) -> CliResult<Self> {
        let config: CliConfig =
            toml::from_str(contents).map_err(|e| CliError::Config(e.to_string()))?;
        config.engine.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path
    fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("clique").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CliConfig::default();
        assert!(config.state_file.is_none());
        assert_eq!(config.engine, EngineConfig::default());
    }

    #[test]
    fn test_load_missing_config() {
        let config = CliConfig::load(Some("/nonexistent/path/config.toml")).unwrap();
        assert!(config.default_actor.is_none());
    }

    #[test]
    fn test_engine_section() {
        let config = CliConfig::from_toml_str(
            r#"
default_actor = "ops"

[engine]
default_target_capacity = 5
required_readiness_percent = 80
"#,
        )
        .unwrap();
        assert_eq!(config.default_actor.as_deref(), Some("ops"));
        assert_eq!(config.engine.default_target_capacity, 5);
        assert_eq!(config.engine.required_readiness_percent, 80);
        assert_eq!(config.engine.recommender_timeout_secs, 30);
    }

    #[test]
    fn test_invalid_engine_section() {
        let err = CliConfig::from_toml_str("[engine]\ndefault_target_capacity = 0\n").unwrap_err();
        assert!(matches!(err, CliError::Clique(_)));
    }
}

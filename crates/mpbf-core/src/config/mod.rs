//! Configuration for the MPBF assistant.
//!
//! Loaded from a YAML file (`mpbf.yaml`) and overridable through
//! environment variables for secrets: `MPBF_LLM_API_KEY` and
//! `MPBF_DATABASE_URL`. The host application constructs clients from this
//! config and injects them into the pipeline; nothing here connects at
//! module load.

pub mod database;
pub mod learning;
pub mod llm;
pub mod server;

pub use database::DatabaseConfig;
pub use learning::LearningConfig;
pub use llm::LlmConfig;
pub use server::ServerConfig;

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Complete assistant configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MpbfConfig {
    /// Project name, informational only.
    #[serde(default)]
    pub project: Option<String>,

    /// LLM completion endpoint settings.
    #[serde(default)]
    pub llm: LlmConfig,

    /// Operational database connection.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Learning log settings.
    #[serde(default)]
    pub learning: LearningConfig,

    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
}

impl MpbfConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            source: e,
        })?;
        Ok(config)
    }

    /// Apply environment-variable overrides for secrets.
    pub fn apply_env(&mut self) {
        if let Ok(key) = std::env::var("MPBF_LLM_API_KEY") {
            self.llm.api_key = key;
        }
        if let Ok(url) = std::env::var("MPBF_DATABASE_URL") {
            self.database.url = url;
        }
    }

    /// Load from file (when present) and apply environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let mut config = if path.as_ref().exists() {
            Self::from_file(path)?
        } else {
            Self::default()
        };
        config.apply_env();
        Ok(config)
    }
}

/// Errors loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        source: serde_yaml::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_usable() {
        let config = MpbfConfig::default();
        assert_eq!(config.server.bind, "0.0.0.0:8080");
        assert!(config.learning.enabled);
        assert_eq!(config.database.max_connections, 5);
    }

    #[test]
    fn parses_partial_yaml() {
        let yaml = r#"
project: mpbf
llm:
  model: gpt-4o
server:
  bind: "127.0.0.1:9000"
"#;
        let config: MpbfConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.project.as_deref(), Some("mpbf"));
        assert_eq!(config.llm.model, "gpt-4o");
        assert_eq!(config.server.bind, "127.0.0.1:9000");
        // Untouched sections keep their defaults.
        assert!(config.learning.enabled);
    }
}

//! Learning log configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the append-only learning log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearningConfig {
    /// Whether learning logging is enabled.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Also echo records to stdout (human-readable lines).
    #[serde(default)]
    pub stdout: bool,

    /// Directory for the JSON Lines log file.
    #[serde(default = "default_directory")]
    pub directory: String,
}

fn default_enabled() -> bool {
    true
}

fn default_directory() -> String {
    "data".to_string()
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            stdout: false,
            directory: default_directory(),
        }
    }
}

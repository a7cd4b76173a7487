//! Operational database configuration.

use serde::{Deserialize, Serialize};

/// Connection settings for the factory's Postgres database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Connection URL. Prefer the `MPBF_DATABASE_URL` environment
    /// variable over putting credentials in the file.
    #[serde(default = "default_url")]
    pub url: String,

    /// Pool size.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_url() -> String {
    "postgres://localhost:5432/mpbf".to_string()
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            max_connections: default_max_connections(),
        }
    }
}

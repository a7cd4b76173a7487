//! Learning logger implementation.

use mpbf_core::LearningConfig;
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::LearningError;
use crate::record::LearningRecord;
use crate::storage::{ConsoleStorage, DualStorage, FileStorage, LearningStorage, NullStorage};

/// The main learning logger.
///
/// Sits off the command hot path: [`LearningLogger::record`] swallows
/// storage failures so a broken log file can never fail a user command.
pub struct LearningLogger {
    config: LearningConfig,
    storage: Arc<dyn LearningStorage>,
}

impl LearningLogger {
    /// Create a new logger from configuration.
    pub fn new(config: LearningConfig) -> Result<Self, LearningError> {
        let storage: Arc<dyn LearningStorage> = if !config.enabled {
            Arc::new(NullStorage::new())
        } else {
            let file_path = Self::resolve_log_path(&config);
            if config.stdout {
                Arc::new(DualStorage::new(&file_path)?)
            } else {
                Arc::new(FileStorage::new(&file_path)?)
            }
        };

        Ok(Self { config, storage })
    }

    /// Create a logger with a custom storage backend.
    pub fn with_storage(config: LearningConfig, storage: Arc<dyn LearningStorage>) -> Self {
        Self { config, storage }
    }

    /// Create a disabled (no-op) logger.
    pub fn disabled() -> Self {
        Self {
            config: LearningConfig {
                enabled: false,
                ..Default::default()
            },
            storage: Arc::new(NullStorage::new()),
        }
    }

    /// Create a console-only logger (useful for development).
    pub fn console_only() -> Self {
        Self {
            config: LearningConfig {
                enabled: true,
                stdout: true,
                ..Default::default()
            },
            storage: Arc::new(ConsoleStorage::new()),
        }
    }

    fn resolve_log_path(config: &LearningConfig) -> PathBuf {
        let mut path = PathBuf::from(&config.directory);
        path.push("learning.log");
        path
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Record an outcome. Storage failures are logged and swallowed.
    pub async fn record(&self, record: LearningRecord) {
        if !self.config.enabled {
            return;
        }

        tracing::debug!(
            record_id = %record.record_id,
            user_id = record.user_id,
            action = %record.action_type,
            success = record.success,
            "learning record"
        );

        if let Err(error) = self.storage.store(record).await {
            tracing::warn!(%error, "failed to store learning record");
        }
    }
}

/// Filter for inspecting recorded learning records in tests. The log
/// itself is append-only; analysis runs offline on the JSON Lines file.
#[derive(Debug, Clone, Default)]
pub struct LearningFilter {
    /// Filter by user.
    pub user_id: Option<i64>,
    /// Filter by action tag.
    pub action_type: Option<String>,
    /// Filter by outcome.
    pub success: Option<bool>,
    /// Filter by start time.
    pub start_time: Option<chrono::DateTime<chrono::Utc>>,
    /// Filter by end time.
    pub end_time: Option<chrono::DateTime<chrono::Utc>>,
    /// Maximum number of results.
    pub limit: Option<usize>,
    /// Offset for pagination.
    pub offset: Option<usize>,
}

impl LearningFilter {
    /// Whether a record matches this filter (limit/offset excluded).
    pub fn matches(&self, record: &LearningRecord) -> bool {
        if let Some(user_id) = self.user_id {
            if record.user_id != user_id {
                return false;
            }
        }
        if let Some(ref action_type) = self.action_type {
            if &record.action_type != action_type {
                return false;
            }
        }
        if let Some(success) = self.success {
            if record.success != success {
                return false;
            }
        }
        if let Some(start) = self.start_time {
            if record.recorded_at < start {
                return false;
            }
        }
        if let Some(end) = self.end_time {
            if record.recorded_at > end {
                return false;
            }
        }
        true
    }
}

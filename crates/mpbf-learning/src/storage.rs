//! Learning storage backends.
//!
//! The log is append-only: backends only ever receive records, analysis
//! happens offline on the JSON Lines file. [`MemoryStorage`] additionally
//! lets tests inspect what was recorded.

use crate::error::LearningError;
use crate::logger::LearningFilter;
use crate::record::LearningRecord;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Trait for learning storage backends.
#[async_trait]
pub trait LearningStorage: Send + Sync {
    /// Append a learning record.
    async fn store(&self, record: LearningRecord) -> Result<(), LearningError>;
}

/// Console storage (human-readable lines to stdout).
pub struct ConsoleStorage;

impl ConsoleStorage {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConsoleStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LearningStorage for ConsoleStorage {
    async fn store(&self, record: LearningRecord) -> Result<(), LearningError> {
        println!("{}", record.to_log_line());
        Ok(())
    }
}

/// File storage (appends JSON Lines).
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl AsRef<Path>) -> Result<Self, LearningError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(Self { path })
    }
}

#[async_trait]
impl LearningStorage for FileStorage {
    async fn store(&self, record: LearningRecord) -> Result<(), LearningError> {
        let json = serde_json::to_string(&record)?;

        use std::io::Write;
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", json)?;

        Ok(())
    }
}

/// Dual storage: file for retention plus console for operators.
pub struct DualStorage {
    file: FileStorage,
    console: ConsoleStorage,
}

impl DualStorage {
    pub fn new(path: impl AsRef<Path>) -> Result<Self, LearningError> {
        Ok(Self {
            file: FileStorage::new(path)?,
            console: ConsoleStorage::new(),
        })
    }
}

#[async_trait]
impl LearningStorage for DualStorage {
    async fn store(&self, record: LearningRecord) -> Result<(), LearningError> {
        self.console.store(record.clone()).await?;
        self.file.store(record).await
    }
}

/// No-op storage for disabled logging.
pub struct NullStorage;

impl NullStorage {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NullStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LearningStorage for NullStorage {
    async fn store(&self, _record: LearningRecord) -> Result<(), LearningError> {
        Ok(())
    }
}

/// In-memory storage, used by tests to assert on what was recorded.
#[derive(Default)]
pub struct MemoryStorage {
    records: RwLock<Vec<LearningRecord>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything stored so far, in write order.
    pub fn records(&self) -> Vec<LearningRecord> {
        self.records
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Stored records matching a filter.
    pub fn matching(&self, filter: &LearningFilter) -> Vec<LearningRecord> {
        let mut results: Vec<_> = self
            .records()
            .into_iter()
            .filter(|r| filter.matches(r))
            .collect();
        if let Some(offset) = filter.offset {
            results = results.into_iter().skip(offset).collect();
        }
        if let Some(limit) = filter.limit {
            results.truncate(limit);
        }
        results
    }
}

#[async_trait]
impl LearningStorage for MemoryStorage {
    async fn store(&self, record: LearningRecord) -> Result<(), LearningError> {
        self.records
            .write()
            .map_err(|e| LearningError::StorageError(format!("failed to acquire write lock: {e}")))?
            .push(record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::LearningRecord;

    #[tokio::test]
    async fn test_console_storage() {
        let storage = ConsoleStorage::new();
        let record = LearningRecord::new(1, "create_order");
        storage.store(record).await.unwrap();
    }

    #[tokio::test]
    async fn test_file_storage_appends_json_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("learning.log");
        let storage = FileStorage::new(&path).unwrap();

        storage
            .store(LearningRecord::builder(1, "create_order").success(true).build())
            .await
            .unwrap();
        storage
            .store(LearningRecord::builder(2, "create_roll").success(false).build())
            .await
            .unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        for line in lines {
            let parsed: LearningRecord = serde_json::from_str(line).unwrap();
            assert!(!parsed.action_type.is_empty());
        }
    }

    #[tokio::test]
    async fn test_memory_storage_filters_by_user() {
        let storage = MemoryStorage::new();

        storage
            .store(LearningRecord::builder(1, "create_order").build())
            .await
            .unwrap();
        storage
            .store(LearningRecord::builder(2, "create_order").build())
            .await
            .unwrap();

        let results = storage.matching(&LearningFilter {
            user_id: Some(1),
            ..Default::default()
        });
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].user_id, 1);
    }
}

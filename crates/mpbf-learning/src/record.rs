//! Learning record types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One confirmed-command outcome.
///
/// A record captures what was attempted (`action_type` plus `context`),
/// whether it succeeded, and the end-to-end execution latency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearningRecord {
    /// Unique record ID.
    pub record_id: Uuid,

    /// When the record was created.
    pub recorded_at: DateTime<Utc>,

    /// User who issued the command.
    pub user_id: i64,

    /// Canonical action tag (e.g. "create_order") or a pipeline stage
    /// marker for non-action outcomes.
    pub action_type: String,

    /// Free-form context: the original message, extracted parameters,
    /// whatever helps later prompt tuning.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub context: serde_json::Value,

    /// Whether the action executed successfully.
    pub success: bool,

    /// Wall-clock time from confirmation to outcome.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_time_ms: Option<u64>,

    /// Error message when `success` is false.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LearningRecord {
    pub fn new(user_id: i64, action_type: impl Into<String>) -> Self {
        Self {
            record_id: Uuid::new_v4(),
            recorded_at: Utc::now(),
            user_id,
            action_type: action_type.into(),
            context: serde_json::Value::Null,
            success: false,
            execution_time_ms: None,
            error: None,
        }
    }

    pub fn builder(user_id: i64, action_type: impl Into<String>) -> LearningRecordBuilder {
        LearningRecordBuilder::new(user_id, action_type)
    }

    /// Format the record as a human-readable log line.
    ///
    /// Format: `[timestamp] LEARNING user=... action=... success=... [ms=...] [error=...]`
    pub fn to_log_line(&self) -> String {
        let mut line = format!(
            "[{}] LEARNING user={} action={} success={}",
            self.recorded_at.format("%Y-%m-%dT%H:%M:%S%.3fZ"),
            self.user_id,
            self.action_type,
            self.success,
        );

        if let Some(ms) = self.execution_time_ms {
            line.push_str(&format!(" ms={}", ms));
        }

        if let Some(ref error) = self.error {
            line.push_str(&format!(" error=\"{}\"", error.replace('"', "'")));
        }

        line
    }
}

/// Builder for learning records.
#[derive(Debug)]
pub struct LearningRecordBuilder {
    record: LearningRecord,
}

impl LearningRecordBuilder {
    pub fn new(user_id: i64, action_type: impl Into<String>) -> Self {
        Self {
            record: LearningRecord::new(user_id, action_type),
        }
    }

    pub fn context(mut self, context: serde_json::Value) -> Self {
        self.record.context = context;
        self
    }

    pub fn success(mut self, success: bool) -> Self {
        self.record.success = success;
        self
    }

    pub fn execution_time_ms(mut self, ms: u64) -> Self {
        self.record.execution_time_ms = Some(ms);
        self
    }

    pub fn error(mut self, error: impl Into<String>) -> Self {
        self.record.error = Some(error.into());
        self
    }

    pub fn build(self) -> LearningRecord {
        self.record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_builder() {
        let record = LearningRecord::builder(7, "create_order")
            .context(json!({"message": "اضف طلب لشركة النور"}))
            .success(true)
            .execution_time_ms(840)
            .build();

        assert_eq!(record.user_id, 7);
        assert_eq!(record.action_type, "create_order");
        assert!(record.success);
        assert_eq!(record.execution_time_ms, Some(840));
        assert!(record.error.is_none());
    }

    #[test]
    fn test_to_log_line() {
        let record = LearningRecord::builder(3, "delete_order")
            .success(false)
            .error("order 42 not found")
            .build();

        let line = record.to_log_line();
        assert!(line.contains("LEARNING"));
        assert!(line.contains("user=3"));
        assert!(line.contains("action=delete_order"));
        assert!(line.contains("success=false"));
        assert!(line.contains("error=\"order 42 not found\""));
    }

    #[test]
    fn test_json_lines_roundtrip() {
        let record = LearningRecord::builder(1, "create_customer")
            .context(json!({"name": "مصنع الخليج"}))
            .success(true)
            .build();

        let json = serde_json::to_string(&record).unwrap();
        let parsed: LearningRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.record_id, record.record_id);
        assert_eq!(parsed.context, record.context);
    }
}

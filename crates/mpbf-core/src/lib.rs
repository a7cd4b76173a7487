//! # mpbf-core
//!
//! Shared types for the MPBF assistant pipeline: the transient command
//! entities that flow between the classifier, the confirmation gate and
//! the executor, the closed action registry, language detection, the
//! bilingual message catalog, and configuration.

use serde::{Deserialize, Serialize};

pub mod action;
pub mod config;
pub mod language;
pub mod messages;

pub use action::{Action, RequiredField};
pub use config::{DatabaseConfig, LearningConfig, LlmConfig, MpbfConfig, ServerConfig};
pub use language::Language;

/// One user command. Immutable, one per pipeline invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCommand {
    /// Identity of the operator issuing the command.
    #[serde(rename = "userId")]
    pub user_id: i64,
    /// The free-text command, Arabic or English.
    pub message: String,
}

/// Structured guess produced by the intent classifier.
///
/// Read-only once produced; never persisted. `confidence` is clamped to
/// `[0, 1]`, `missing_info` lists human-readable names of required fields
/// the model could not find in the text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentResult {
    /// Classified purpose: query, create, update, delete, report, help,
    /// or "unknown" when classification failed.
    pub intent: String,
    /// Action tag (e.g. "create_customer") when the intent maps to one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    /// Whether answering requires touching the database.
    #[serde(rename = "requiresDatabase", default)]
    pub requires_database: bool,
    /// Whether the user asked for a report.
    #[serde(rename = "requestsReport", default)]
    pub requests_report: bool,
    /// Report type when `requests_report` is set.
    #[serde(rename = "reportType", default, skip_serializing_if = "Option::is_none")]
    pub report_type: Option<String>,
    /// Extracted parameters, keyed by field name.
    #[serde(default)]
    pub parameters: serde_json::Map<String, serde_json::Value>,
    /// Classifier confidence in `[0, 1]`.
    #[serde(default)]
    pub confidence: f64,
    /// Human-readable names of required fields absent from the text.
    #[serde(rename = "missingInfo", default)]
    pub missing_info: Vec<String>,
}

impl IntentResult {
    /// The degraded result used when the LLM call failed or returned
    /// something unusable. Never an error to the caller.
    pub fn unknown() -> Self {
        Self {
            intent: "unknown".to_string(),
            action: None,
            requires_database: false,
            requests_report: false,
            report_type: None,
            parameters: serde_json::Map::new(),
            confidence: 0.0,
            missing_info: Vec::new(),
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.intent == "unknown"
    }
}

/// A mutating action awaiting confirmation.
///
/// Handed back to the caller as part of the response and consumed exactly
/// once when resubmitted. The pipeline keeps no server-side copy; the
/// caller confirms by re-sending the structurally identical payload, which
/// is why this type derives `PartialEq`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingAction {
    /// Action tag from the closed registry.
    pub action: String,
    /// Extracted parameters for the action.
    pub parameters: serde_json::Value,
    /// Target table, when known at classification time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    /// Language detected from the original message; every user-facing
    /// string for this action follows it.
    pub language: Language,
}

/// Result of one executed database operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationOutcome {
    /// Operation verb: "insert", "update", "delete", "select".
    pub operation: String,
    /// Table the operation touched, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    /// Whether the operation succeeded.
    pub success: bool,
    /// Localized user-facing message, embedding generated identifiers.
    pub message: String,
    /// Raw result payload (created row, report data).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
}

impl OperationOutcome {
    pub fn success(
        operation: impl Into<String>,
        table: Option<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            operation: operation.into(),
            table,
            success: true,
            message: message.into(),
            result: None,
        }
    }

    pub fn failure(
        operation: impl Into<String>,
        table: Option<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            operation: operation.into(),
            table,
            success: false,
            message: message.into(),
            result: None,
        }
    }

    pub fn with_result(mut self, result: serde_json::Value) -> Self {
        self.result = Some(result);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_intent_is_degraded_default() {
        let intent = IntentResult::unknown();
        assert!(intent.is_unknown());
        assert_eq!(intent.confidence, 0.0);
        assert!(intent.parameters.is_empty());
        assert!(!intent.requires_database);
    }

    #[test]
    fn pending_action_structural_equality() {
        let a = PendingAction {
            action: "create_customer".to_string(),
            parameters: serde_json::json!({"name": "شركة النور", "phone": "0501234567"}),
            table: Some("customers".to_string()),
            language: Language::Arabic,
        };
        let b = a.clone();
        assert_eq!(a, b);

        let mut c = a.clone();
        c.parameters = serde_json::json!({"name": "شركة النور"});
        assert_ne!(a, c);
    }

    #[test]
    fn intent_result_round_trips_wire_names() {
        let json = serde_json::json!({
            "intent": "create",
            "action": "create_order",
            "requiresDatabase": true,
            "requestsReport": false,
            "parameters": {"customer_id": 7},
            "confidence": 0.92,
            "missingInfo": []
        });
        let intent: IntentResult = serde_json::from_value(json).unwrap();
        assert_eq!(intent.action.as_deref(), Some("create_order"));
        assert!(intent.requires_database);
        assert_eq!(intent.parameters["customer_id"], 7);
    }
}

//! Intent classification.
//!
//! One LLM round trip: user message plus a KPI snapshot in, a validated
//! `IntentResult` out. This stage never fails toward the caller - any
//! transport, parse, or schema problem degrades to `intent="unknown"`
//! with zero confidence, and the orchestrator answers with a localized
//! "didn't understand".

use crate::client::{CompletionClient, clean_json_response};
use crate::error::LlmError;
use crate::{prompts, schema};
use mpbf_core::IntentResult;
use std::sync::Arc;
use tracing::{debug, warn};

/// Classifies free-text commands into structured intents.
pub struct IntentClassifier {
    client: Arc<dyn CompletionClient>,
}

impl IntentClassifier {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }

    /// Classify a message. `context` is a short textual snapshot of the
    /// current factory KPIs.
    pub async fn classify(&self, message: &str, context: &str) -> IntentResult {
        match self.try_classify(message, context).await {
            Ok(intent) => intent,
            Err(e) => {
                warn!(error = %e, "intent classification degraded to unknown");
                IntentResult::unknown()
            }
        }
    }

    async fn try_classify(&self, message: &str, context: &str) -> Result<IntentResult, LlmError> {
        let raw = self
            .client
            .complete(
                &prompts::intent_system(),
                &prompts::intent_user(message, context),
                true,
            )
            .await?;

        let value: serde_json::Value = serde_json::from_str(clean_json_response(&raw))?;
        schema::validate(schema::intent_validator(), &value)?;

        let mut intent: IntentResult = serde_json::from_value(value)?;
        intent.confidence = intent.confidence.clamp(0.0, 1.0);

        debug!(
            intent = %intent.intent,
            action = ?intent.action,
            confidence = intent.confidence,
            "classified"
        );
        Ok(intent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockCompletionClient;

    fn classifier_with(mock: MockCompletionClient) -> IntentClassifier {
        IntentClassifier::new(Arc::new(mock))
    }

    #[tokio::test]
    async fn classifies_valid_payload() {
        let mock = MockCompletionClient::new().fallback(
            r#"{"intent":"create","action":"create_customer","requiresDatabase":true,
                "parameters":{"name":"شركة النور","phone":"0501234567"},
                "confidence":0.95,"missingInfo":[]}"#,
        );
        let intent = classifier_with(mock)
            .classify("سجل عميل اسمه شركة النور رقم 0501234567", "active orders: 3")
            .await;

        assert_eq!(intent.intent, "create");
        assert_eq!(intent.action.as_deref(), Some("create_customer"));
        assert_eq!(intent.parameters["name"], "شركة النور");
    }

    #[tokio::test]
    async fn transport_failure_degrades_to_unknown() {
        let intent = classifier_with(MockCompletionClient::failing())
            .classify("anything", "")
            .await;
        assert!(intent.is_unknown());
        assert_eq!(intent.confidence, 0.0);
    }

    #[tokio::test]
    async fn non_json_degrades_to_unknown() {
        let mock = MockCompletionClient::new().fallback("I am not JSON at all");
        let intent = classifier_with(mock).classify("hello", "").await;
        assert!(intent.is_unknown());
    }

    #[tokio::test]
    async fn schema_violation_degrades_to_unknown() {
        // intent present but wrong type elsewhere.
        let mock = MockCompletionClient::new()
            .fallback(r#"{"intent":"create","requiresDatabase":"definitely"}"#);
        let intent = classifier_with(mock).classify("hello", "").await;
        assert!(intent.is_unknown());
    }

    #[tokio::test]
    async fn confidence_is_clamped() {
        let mock = MockCompletionClient::new()
            .fallback(r#"{"intent":"query","confidence":1.7}"#);
        let intent = classifier_with(mock).classify("how many orders", "").await;
        assert_eq!(intent.confidence, 1.0);
    }

    #[tokio::test]
    async fn markdown_fenced_json_still_parses() {
        let mock = MockCompletionClient::new()
            .fallback("```json\n{\"intent\":\"report\",\"requestsReport\":true,\"confidence\":0.8}\n```");
        let intent = classifier_with(mock).classify("show me the report", "").await;
        assert_eq!(intent.intent, "report");
        assert!(intent.requests_report);
    }
}

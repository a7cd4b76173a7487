//! The confirmation gate.
//!
//! Mutating actions never reach the executor directly. The gate either
//! short-circuits with a clarification (required fields missing, no
//! pending action created) or hands the caller a `PendingAction` plus a
//! localized summary. Confirmation is resubmission of the structurally
//! identical payload; free text is never an implicit confirmation.

use mpbf_core::{Action, Language, PendingAction, messages};
use mpbf_store::FactoryStore;
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

/// Outcome of reviewing a mutating action before confirmation.
#[derive(Debug, Clone, PartialEq)]
pub enum GateDecision {
    /// Required fields are missing; no pending action was created.
    Clarify(String),
    /// The action is complete and awaits the caller's confirmation.
    AwaitConfirmation {
        summary: String,
        pending: PendingAction,
    },
}

pub struct ConfirmationGate {
    store: Arc<dyn FactoryStore>,
}

impl ConfirmationGate {
    pub fn new(store: Arc<dyn FactoryStore>) -> Self {
        Self { store }
    }

    /// Review a mutating action. Missing required fields produce a
    /// clarification enumerating each one, enriched with example values
    /// from existing records where that helps the operator answer.
    pub async fn review(
        &self,
        action: Action,
        parameters: Value,
        language: Language,
    ) -> GateDecision {
        let missing = action.missing_fields(&parameters, language);
        if !missing.is_empty() {
            let examples = self.customer_examples(action, &missing, language).await;
            return GateDecision::Clarify(messages::clarification(
                language,
                &missing,
                examples.as_deref(),
            ));
        }

        let summary = messages::confirmation_summary(language, action, &parameters);
        GateDecision::AwaitConfirmation {
            summary,
            pending: PendingAction {
                action: action.tag().to_string(),
                parameters,
                table: action.table().map(String::from),
                language,
            },
        }
    }

    /// Re-validate a resubmitted pending action. The payload travelled
    /// through the caller, so the tag and required fields are checked
    /// again; a tampered payload fails closed with a localized message.
    pub fn verify(&self, pending: &PendingAction) -> Result<Action, String> {
        let Some(action) = Action::parse(&pending.action) else {
            return Err(messages::unknown_action(pending.language));
        };
        let missing = action.missing_fields(&pending.parameters, pending.language);
        if !missing.is_empty() {
            return Err(messages::clarification(pending.language, &missing, None));
        }
        Ok(action)
    }

    /// Example customers for clarifications that ask for a customer
    /// reference. Best effort; a store failure just drops the examples.
    async fn customer_examples(
        &self,
        action: Action,
        missing: &[&str],
        language: Language,
    ) -> Option<String> {
        let wants_customer = action
            .required_fields()
            .iter()
            .any(|f| f.keys.contains(&"customer_id") && missing.contains(&f.display(language)));
        if !wants_customer {
            return None;
        }

        match self.store.sample_customers(3).await {
            Ok(customers) if !customers.is_empty() => Some(
                customers
                    .iter()
                    .map(|c| format!("{} ({})", c.id, c.name))
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
            Ok(_) => None,
            Err(error) => {
                warn!(%error, "could not load customer examples for clarification");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mpbf_store::InMemoryStore;
    use serde_json::json;

    fn gate() -> (ConfirmationGate, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        (ConfirmationGate::new(store.clone()), store)
    }

    #[tokio::test]
    async fn complete_action_awaits_confirmation() {
        let (gate, _) = gate();
        let decision = gate
            .review(
                Action::CreateCustomer,
                json!({"name": "شركة النور", "phone": "0501234567"}),
                Language::Arabic,
            )
            .await;

        match decision {
            GateDecision::AwaitConfirmation { summary, pending } => {
                assert!(summary.contains("تسجيل عميل جديد"));
                assert_eq!(pending.action, "create_customer");
                assert_eq!(pending.table.as_deref(), Some("customers"));
                assert_eq!(pending.language, Language::Arabic);
            }
            other => panic!("expected confirmation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_fields_short_circuit_without_pending_action() {
        let (gate, _) = gate();
        let decision = gate
            .review(Action::CreateOrder, json!({}), Language::Arabic)
            .await;

        match decision {
            GateDecision::Clarify(text) => {
                assert!(text.contains("معرف العميل أو اسمه"));
                assert!(text.contains("تاريخ التسليم"));
            }
            other => panic!("expected clarification, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn clarification_includes_customer_examples_when_available() {
        let (gate, store) = gate();
        store
            .insert_customer(&json!({"name": "Al-Noor Co", "phone": "0501234567"}))
            .await
            .unwrap();

        let decision = gate
            .review(
                Action::CreateCustomerProduct,
                json!({"category": "bags"}),
                Language::English,
            )
            .await;

        match decision {
            GateDecision::Clarify(text) => {
                assert!(text.contains("customer id"));
                assert!(text.contains("Al-Noor Co"));
            }
            other => panic!("expected clarification, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn verify_rejects_unknown_tags() {
        let (gate, _) = gate();
        let pending = PendingAction {
            action: "drop_all_tables".to_string(),
            parameters: json!({}),
            table: None,
            language: Language::English,
        };
        let err = gate.verify(&pending).unwrap_err();
        assert_eq!(err, messages::unknown_action(Language::English));
    }

    #[tokio::test]
    async fn verify_rejects_stripped_parameters() {
        let (gate, _) = gate();
        let pending = PendingAction {
            action: "create_customer".to_string(),
            parameters: json!({"name": "Delta Pack"}),
            table: Some("customers".to_string()),
            language: Language::English,
        };
        let err = gate.verify(&pending).unwrap_err();
        assert!(err.contains("phone number"));
    }
}

//! The action executor.
//!
//! Dispatch is a match on the closed [`Action`] enum; each mutating
//! branch performs exactly one parameterized write through the store.
//! Store failures are caught here and turned into localized failure
//! outcomes so the orchestrator only ever handles `OperationOutcome`.

use crate::report;
use mpbf_core::{Action, Language, OperationOutcome, messages};
use mpbf_store::StoreError;
use mpbf_store::{FactoryStore, NewRecord, param_str};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{info, warn};

pub struct ActionExecutor {
    store: Arc<dyn FactoryStore>,
}

impl ActionExecutor {
    pub fn new(store: Arc<dyn FactoryStore>) -> Self {
        Self { store }
    }

    /// Run one confirmed action. Never returns an error; failures become
    /// localized failure outcomes with operator-level detail only.
    pub async fn execute(
        &self,
        action: Action,
        parameters: &Value,
        language: Language,
    ) -> OperationOutcome {
        match self.run(action, parameters, language).await {
            Ok(outcome) => {
                info!(action = %action, table = ?action.table(), "action executed");
                outcome
            }
            Err(error) => {
                warn!(action = %action, %error, "action failed");
                OperationOutcome::failure(
                    action.operation(),
                    action.table().map(String::from),
                    messages::action_failed(language, action, &error.to_string()),
                )
            }
        }
    }

    async fn run(
        &self,
        action: Action,
        parameters: &Value,
        language: Language,
    ) -> Result<OperationOutcome, StoreError> {
        let record = match action {
            Action::CreateOrder => {
                // Caller-supplied order numbers win; the timestamp
                // fallback can collide under concurrent creates.
                let order_number = param_str(parameters, "order_number")
                    .map(String::from)
                    .unwrap_or_else(|| fallback_identifier("ORD"));
                self.store.insert_order(&order_number, parameters).await?
            }
            Action::UpdateOrder => {
                let order_id = order_id(parameters)?;
                self.store.update_order(order_id, parameters).await?;
                NewRecord {
                    id: order_id,
                    identifier: order_id.to_string(),
                }
            }
            Action::DeleteOrder => {
                let order_id = order_id(parameters)?;
                self.store.delete_order(order_id).await?;
                NewRecord {
                    id: order_id,
                    identifier: order_id.to_string(),
                }
            }
            Action::CreateRoll => {
                let roll_number = param_str(parameters, "roll_number")
                    .map(String::from)
                    .unwrap_or_else(|| fallback_identifier("ROLL"));
                self.store.insert_roll(&roll_number, parameters).await?
            }
            Action::CreateCustomer => self.store.insert_customer(parameters).await?,
            Action::CreateMachine => self.store.insert_machine(parameters).await?,
            Action::CreateCustomerProduct => {
                self.store.insert_customer_product(parameters).await?
            }
            Action::CreateMaintenance => {
                self.store.insert_maintenance_request(parameters).await?
            }
            Action::CreateQualityCheck => self.store.insert_quality_check(parameters).await?,
            Action::AnalyzePerformance => {
                let snapshot = self.store.kpi_snapshot().await?;
                return Ok(OperationOutcome::success(
                    action.operation(),
                    None,
                    report::kpi_report(&snapshot, language),
                )
                .with_result(json!(snapshot)));
            }
        };

        Ok(OperationOutcome::success(
            action.operation(),
            action.table().map(String::from),
            messages::action_succeeded(language, action, &record.identifier),
        )
        .with_result(json!(record)))
    }
}

fn order_id(parameters: &Value) -> Result<i64, StoreError> {
    mpbf_store::param_i64(parameters, "order_id").ok_or_else(|| StoreError::missing("order_id"))
}

/// Millisecond-timestamp identifier used when the caller supplied none.
fn fallback_identifier(prefix: &str) -> String {
    format!("{}-{}", prefix, chrono::Utc::now().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mpbf_store::InMemoryStore;
    use serde_json::json;

    fn executor() -> (ActionExecutor, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        (ActionExecutor::new(store.clone()), store)
    }

    #[tokio::test]
    async fn create_order_generates_fallback_identifier() {
        let (executor, store) = executor();
        let outcome = executor
            .execute(
                Action::CreateOrder,
                &json!({"customer_name": "شركة النور", "delivery_date": "2026-09-15"}),
                Language::Arabic,
            )
            .await;

        assert!(outcome.success);
        assert_eq!(outcome.operation, "insert");
        assert_eq!(outcome.table.as_deref(), Some("orders"));
        let orders = store.orders();
        assert_eq!(orders.len(), 1);
        let number = orders[0]["order_number"].as_str().unwrap();
        assert!(number.starts_with("ORD-"));
        assert!(outcome.message.contains(number));
    }

    #[tokio::test]
    async fn caller_supplied_order_number_wins() {
        let (executor, store) = executor();
        let outcome = executor
            .execute(
                Action::CreateOrder,
                &json!({
                    "order_number": "SO-2026-001",
                    "customer_id": 4,
                    "delivery_date": "2026-10-01"
                }),
                Language::English,
            )
            .await;

        assert!(outcome.success);
        assert_eq!(store.orders()[0]["order_number"], json!("SO-2026-001"));
        assert!(outcome.message.contains("SO-2026-001"));
    }

    #[tokio::test]
    async fn delete_missing_order_fails_with_localized_message() {
        let (executor, _) = executor();
        let outcome = executor
            .execute(Action::DeleteOrder, &json!({"order_id": 77}), Language::Arabic)
            .await;

        assert!(!outcome.success);
        assert!(outcome.message.starts_with("تعذر"));
        // Operator-level detail, no stack traces.
        assert!(outcome.message.contains("77"));
    }

    #[tokio::test]
    async fn analyze_performance_reads_without_writing() {
        let (executor, store) = executor();
        store.set_kpi(mpbf_store::KpiSnapshot {
            active_orders: 5,
            ..Default::default()
        });

        let outcome = executor
            .execute(Action::AnalyzePerformance, &json!({}), Language::English)
            .await;

        assert!(outcome.success);
        assert_eq!(outcome.operation, "select");
        assert!(outcome.table.is_none());
        assert!(outcome.message.contains("Active orders: 5"));
        assert!(store.orders().is_empty());
    }
}

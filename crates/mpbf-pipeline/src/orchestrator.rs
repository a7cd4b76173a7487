//! The command pipeline.
//!
//! Wires the classifier, gate, executor, fallback, learning log and
//! notification dispatcher behind two operations:
//!
//! - [`CommandPipeline::handle_user_command`] - classify free text and
//!   either answer directly or hand back a pending action to confirm.
//! - [`CommandPipeline::confirm_and_execute`] - run a resubmitted pending
//!   action, producing exactly one learning record per call.

use crate::executor::ActionExecutor;
use crate::fallback::FallbackHandler;
use crate::gate::{ConfirmationGate, GateDecision};
use crate::notify::{self, Notification, Notifier};
use mpbf_core::{Action, Language, PendingAction, UserCommand, messages};
use mpbf_learning::{LearningLogger, LearningRecord};
use mpbf_llm::{CompletionClient, EntityKind, FieldExtractor, IntentClassifier};
use mpbf_store::FactoryStore;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Reply status for confirmed executions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    Success,
    Error,
}

/// Response to a free-text command.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CommandResponse {
    /// A mutating action awaits confirmation. The caller confirms by
    /// resubmitting `pending_action` unchanged.
    NeedsConfirmation {
        summary: String,
        #[serde(rename = "pendingAction")]
        pending_action: PendingAction,
    },
    /// The command was answered directly (reports, clarifications,
    /// fallback answers, generic replies).
    Completed {
        status: ResponseStatus,
        message: String,
    },
}

/// Reply to a confirmed execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionReply {
    pub status: ResponseStatus,
    pub message: String,
}

pub struct CommandPipeline {
    classifier: IntentClassifier,
    extractor: FieldExtractor,
    gate: ConfirmationGate,
    executor: ActionExecutor,
    fallback: FallbackHandler,
    learning: LearningLogger,
    notifier: Arc<dyn Notifier>,
    store: Arc<dyn FactoryStore>,
}

impl CommandPipeline {
    pub fn new(
        client: Arc<dyn CompletionClient>,
        store: Arc<dyn FactoryStore>,
        learning: LearningLogger,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            classifier: IntentClassifier::new(client.clone()),
            extractor: FieldExtractor::new(client.clone()),
            gate: ConfirmationGate::new(store.clone()),
            executor: ActionExecutor::new(store.clone()),
            fallback: FallbackHandler::new(client, store.clone()),
            learning,
            notifier,
            store,
        }
    }

    /// Handle one free-text command.
    ///
    /// Sequential awaits, request-scoped, no retries. Classification
    /// failures degrade to a localized "didn't understand"; they are
    /// never an error to the caller.
    pub async fn handle_user_command(&self, command: &UserCommand) -> CommandResponse {
        let language = Language::detect(&command.message);
        let context = self.kpi_context().await;
        let intent = self.classifier.classify(&command.message, &context).await;

        debug!(
            user_id = command.user_id,
            intent = %intent.intent,
            action = ?intent.action,
            confidence = intent.confidence,
            "command classified"
        );

        if intent.is_unknown() {
            return CommandResponse::Completed {
                status: ResponseStatus::Success,
                message: messages::did_not_understand(language),
            };
        }

        let action = intent.action.as_deref().and_then(Action::parse);

        if intent.requests_report || action == Some(Action::AnalyzePerformance) {
            // Read-only: bypasses the gate.
            let outcome = self
                .executor
                .execute(Action::AnalyzePerformance, &Value::Null, language)
                .await;
            return CommandResponse::Completed {
                status: if outcome.success {
                    ResponseStatus::Success
                } else {
                    ResponseStatus::Error
                },
                message: outcome.message,
            };
        }

        match action {
            Some(action) => {
                let parameters = self
                    .enrich_parameters(action, intent.parameters, &command.message)
                    .await;
                match self.gate.review(action, parameters, language).await {
                    GateDecision::Clarify(message) => CommandResponse::Completed {
                        status: ResponseStatus::Success,
                        message,
                    },
                    GateDecision::AwaitConfirmation { summary, pending } => {
                        CommandResponse::NeedsConfirmation {
                            summary,
                            pending_action: pending,
                        }
                    }
                }
            }
            None if intent.requires_database => CommandResponse::Completed {
                status: ResponseStatus::Success,
                message: self.fallback.answer(&command.message, language).await,
            },
            None => CommandResponse::Completed {
                status: ResponseStatus::Success,
                message: messages::outside_domain(language),
            },
        }
    }

    /// Execute a resubmitted pending action.
    ///
    /// Re-validates the payload first, so a tampered tag or stripped
    /// parameters fail closed. Exactly one learning record is written
    /// per call; its `success` matches the outcome. Only an execution
    /// failure yields a non-success status.
    pub async fn confirm_and_execute(
        &self,
        user_id: i64,
        pending: &PendingAction,
    ) -> ExecutionReply {
        let started = Instant::now();

        let action = match self.gate.verify(pending) {
            Ok(action) => action,
            Err(message) => {
                self.learning
                    .record(
                        LearningRecord::builder(user_id, pending.action.clone())
                            .context(json!({"parameters": pending.parameters}))
                            .success(false)
                            .execution_time_ms(elapsed_ms(started))
                            .error("confirmation payload failed validation")
                            .build(),
                    )
                    .await;
                return ExecutionReply {
                    status: ResponseStatus::Success,
                    message,
                };
            }
        };

        let outcome = self
            .executor
            .execute(action, &pending.parameters, pending.language)
            .await;

        self.learning
            .record(
                LearningRecord::builder(user_id, action.tag())
                    .context(json!({
                        "parameters": pending.parameters,
                        "table": action.table(),
                        "operation": action.operation(),
                    }))
                    .success(outcome.success)
                    .execution_time_ms(elapsed_ms(started))
                    .build(),
            )
            .await;

        if outcome.success && notify::should_notify(action) {
            notify::dispatch(
                self.notifier.clone(),
                Notification::for_outcome(action, &outcome, pending.language),
            );
        }

        ExecutionReply {
            status: if outcome.success {
                ResponseStatus::Success
            } else {
                ResponseStatus::Error
            },
            message: outcome.message,
        }
    }

    /// KPI snapshot as classifier context. Best effort; a store failure
    /// classifies without context rather than failing the command.
    async fn kpi_context(&self) -> String {
        match self.store.kpi_snapshot().await {
            Ok(snapshot) => snapshot.to_context(),
            Err(error) => {
                warn!(%error, "KPI snapshot unavailable for classification context");
                String::new()
            }
        }
    }

    /// Fill required-field gaps through the entity extractor. Classifier
    /// parameters win over extracted ones; extraction failures keep what
    /// the classifier found.
    async fn enrich_parameters(
        &self,
        action: Action,
        parameters: serde_json::Map<String, Value>,
        message: &str,
    ) -> Value {
        let mut parameters = parameters;
        let incomplete = !action
            .missing_fields(&Value::Object(parameters.clone()), Language::English)
            .is_empty();

        if incomplete {
            if let Some(kind) = EntityKind::for_action(action) {
                match self.extractor.extract(kind, message).await {
                    Ok(extracted) => {
                        for (key, value) in extracted {
                            parameters.entry(key).or_insert(value);
                        }
                    }
                    Err(error) => {
                        warn!(%error, action = %action, "field extraction failed");
                    }
                }
            }
        }

        Value::Object(parameters)
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis().min(u64::MAX as u128) as u64
}

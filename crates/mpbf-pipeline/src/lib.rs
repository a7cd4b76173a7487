//! # mpbf-pipeline
//!
//! The assistant command pipeline for the plastic-bag factory manager.
//!
//! A free-text command flows through the intent classifier, the
//! confirmation gate, and the action executor:
//!
//! 1. Classify the message (with a KPI context snapshot) into an intent
//!    and an action tag from the closed registry.
//! 2. Mutating actions stop at the confirmation gate. The pending action
//!    travels back to the caller, who confirms by resubmitting the
//!    structurally identical payload.
//! 3. Confirmed actions execute exactly one parameterized write, produce
//!    one learning record, and fan out at most one best-effort
//!    notification.
//!
//! Unknown database questions fall through to a read-only keyword
//! fallback; everything else gets a localized generic reply.

pub mod executor;
pub mod fallback;
pub mod gate;
pub mod notify;
pub mod orchestrator;
pub mod report;

pub use executor::ActionExecutor;
pub use fallback::FallbackHandler;
pub use gate::{ConfirmationGate, GateDecision};
pub use notify::{ChannelNotifier, Notification, Notifier, TracingNotifier};
pub use orchestrator::{CommandPipeline, CommandResponse, ExecutionReply, ResponseStatus};

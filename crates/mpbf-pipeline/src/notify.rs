//! The notification dispatcher.
//!
//! A static allow-list decides which actions notify (order, maintenance
//! and quality-check creation). Dispatch is fire-and-forget through
//! `tokio::spawn`; a failed send never touches the committed mutation or
//! the already-built response.

use async_trait::async_trait;
use mpbf_core::{Action, Language, OperationOutcome, messages};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification channel closed")]
    ChannelClosed,

    #[error("dispatch failed: {0}")]
    Dispatch(String),
}

/// One outbound notification.
#[derive(Debug, Clone)]
pub struct Notification {
    /// Action tag that triggered it.
    pub action: String,
    /// Localized title.
    pub title: String,
    /// Localized body, same text the operator saw.
    pub body: String,
    /// Result payload of the triggering mutation.
    pub payload: Option<Value>,
}

impl Notification {
    pub fn for_outcome(action: Action, outcome: &OperationOutcome, language: Language) -> Self {
        Self {
            action: action.tag().to_string(),
            title: messages::action_title(action, language).to_string(),
            body: outcome.message.clone(),
            payload: outcome.result.clone(),
        }
    }
}

/// Seam to whatever carries notifications to supervisors.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notification: Notification) -> Result<(), NotifyError>;
}

/// Actions whose successful completion notifies supervisors.
pub fn should_notify(action: Action) -> bool {
    matches!(
        action,
        Action::CreateOrder | Action::CreateMaintenance | Action::CreateQualityCheck
    )
}

/// Fire-and-forget dispatch. Returns immediately; the send happens on a
/// spawned task and failures are traced only.
pub fn dispatch(notifier: Arc<dyn Notifier>, notification: Notification) {
    tokio::spawn(async move {
        let action = notification.action.clone();
        if let Err(error) = notifier.send(notification).await {
            warn!(%action, %error, "notification dispatch failed");
        }
    });
}

/// Notifier that only writes to the log. Default for deployments with
/// no delivery channel configured.
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn send(&self, notification: Notification) -> Result<(), NotifyError> {
        info!(
            action = %notification.action,
            title = %notification.title,
            body = %notification.body,
            "notification"
        );
        Ok(())
    }
}

/// Notifier that forwards into an mpsc channel, for host applications
/// that deliver notifications themselves.
pub struct ChannelNotifier {
    sender: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl Notifier for ChannelNotifier {
    async fn send(&self, notification: Notification) -> Result<(), NotifyError> {
        self.sender
            .send(notification)
            .map_err(|_| NotifyError::ChannelClosed)
    }
}

//! The triggering event and the completion handed back to its sender

use std::{
    future::Future,
    path::PathBuf,
    pin::Pin,
    task::{Context, Poll},
};

use mmsrx_common::SubscriptionId;
use mmsrx_store::{MessageId, NotificationUri};
use tokio::sync::oneshot;

use crate::error::ReceiveError;

/// A download finished and its bytes are waiting in a transient file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadCompleted {
    /// Transient file holding the fetched bytes; removed once read
    pub file_path: PathBuf,
    /// Falls back to the configured default when absent
    pub subscription_id: Option<SubscriptionId>,
    /// Relay content location the bytes were fetched from
    pub location_url: String,
    pub transaction_id: Option<String>,
    pub trigger_push: bool,
    /// The stored M-Notification.ind this download answers
    pub notification_ind_uri: Option<NotificationUri>,
    /// HTTP status the fetch reported
    pub transport_status: Option<u16>,
}

impl DownloadCompleted {
    #[must_use]
    pub fn new(file_path: impl Into<PathBuf>, location_url: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            subscription_id: None,
            location_url: location_url.into(),
            transaction_id: None,
            trigger_push: false,
            notification_ind_uri: None,
            transport_status: None,
        }
    }

    #[must_use]
    pub const fn with_subscription(mut self, subscription: SubscriptionId) -> Self {
        self.subscription_id = Some(subscription);
        self
    }

    #[must_use]
    pub fn with_transaction_id(mut self, transaction_id: impl Into<String>) -> Self {
        self.transaction_id = Some(transaction_id.into());
        self
    }

    #[must_use]
    pub fn with_notification(mut self, uri: impl Into<NotificationUri>) -> Self {
        self.notification_ind_uri = Some(uri.into());
        self
    }

    #[must_use]
    pub const fn with_transport_status(mut self, status: u16) -> Self {
        self.transport_status = Some(status);
        self
    }

    #[must_use]
    pub const fn with_trigger_push(mut self, trigger_push: bool) -> Self {
        self.trigger_push = trigger_push;
        self
    }
}

/// How a workflow run ended
#[derive(Debug)]
pub enum Outcome {
    /// The message was persisted under this id
    Received(MessageId),
    /// The run ended without persisting anything
    Failed(ReceiveError),
    /// The sender is blocked; nothing was persisted or acknowledged
    Blocked,
    /// The run was torn down before it could report, e.g. by a panic
    Aborted,
}

impl Outcome {
    #[must_use]
    pub const fn message_id(&self) -> Option<&MessageId> {
        match self {
            Self::Received(id) => Some(id),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked)
    }
}

/// Resolves once the workflow run for an event has finished
#[derive(Debug)]
pub struct Completion {
    rx: oneshot::Receiver<Outcome>,
}

impl Completion {
    /// A completion and the guard that must signal it
    pub(crate) fn pair() -> (CompletionGuard, Self) {
        let (tx, rx) = oneshot::channel();
        (CompletionGuard { tx: Some(tx) }, Self { rx })
    }
}

impl Future for Completion {
    type Output = Outcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|outcome| outcome.unwrap_or(Outcome::Aborted))
    }
}

/// Signals a [`Completion`] exactly once
///
/// If the guard is dropped without [`CompletionGuard::finish`] being called, the
/// completion resolves to [`Outcome::Aborted`].
#[derive(Debug)]
pub(crate) struct CompletionGuard {
    tx: Option<oneshot::Sender<Outcome>>,
}

impl CompletionGuard {
    pub(crate) fn finish(mut self, outcome: Outcome) {
        if let Some(tx) = self.tx.take() {
            // The caller may have stopped waiting
            let _ = tx.send(outcome);
        }
    }
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(Outcome::Aborted);
        }
    }
}

//! The receive workflow
//!
//! Each [`DownloadCompleted`] event runs on its own task:
//!
//! 1. Read the transient file (and remove it)
//! 2. Decode the M-Retrieve.conf
//! 3. Screen the sender; a blocked sender stops the run here
//! 4. Persist the message
//! 5. Queue the acknowledgments on the lane without waiting for them
//! 6. Clean up stale notifications based on the fetch status
//! 7. Report the outcome to the hooks
//!
//! The event's [`Completion`] resolves exactly once on every path.

use std::{fmt, panic::AssertUnwindSafe, sync::Arc};

use futures_util::FutureExt;
use mmsrx_ack::{
    AckConfig, AckDispatcher, AckSender, AckSubmitter, NetworkPolicy, RouteResolver, TaskInput,
    Transport, build_ack_tasks,
};
use mmsrx_common::{
    NotificationInd, Pdu, PduCodec, RETRIEVE_STATUS_ERROR_END, Signal, SubscriptionId, audit,
    internal,
};
use mmsrx_store::{MessageStore, NotificationStore, PersistRequest};
use tokio::{
    sync::{Semaphore, broadcast, mpsc},
    task::{JoinHandle, JoinSet},
};

use crate::{
    cleanup,
    config::Config,
    downloads::DownloadTracker,
    error::{DecodeError, ReceiveError},
    event::{Completion, DownloadCompleted, Outcome},
    hooks::{HooksCredentials, ReceiveHooks},
    intake,
    screen::{SenderScreen, Verdict},
};

/// The external pieces a receiver works against
#[derive(Clone)]
pub struct Collaborators {
    pub codec: Arc<dyn PduCodec>,
    pub messages: Arc<dyn MessageStore>,
    pub notifications: Arc<dyn NotificationStore>,
    pub hooks: Arc<dyn ReceiveHooks>,
}

impl Collaborators {
    /// Start an acknowledgment lane that sends through `transport`
    ///
    /// Carrier settings come from [`ReceiveHooks::relay_credentials`].
    #[must_use]
    pub fn spawn_ack_lane(
        &self,
        config: &AckConfig,
        transport: Arc<dyn Transport>,
        network: Arc<dyn NetworkPolicy>,
        shutdown: broadcast::Receiver<Signal>,
    ) -> (AckDispatcher, JoinHandle<()>) {
        let resolver = RouteResolver::new(
            Arc::new(HooksCredentials(Arc::clone(&self.hooks))),
            network,
        );
        let sender = AckSender::new(Arc::clone(&self.codec), resolver, transport, config);
        AckDispatcher::spawn(Arc::new(sender), shutdown)
    }
}

/// Runs the receive workflow for completed downloads
pub struct MmsReceiver {
    default_subscription: SubscriptionId,
    codec: Arc<dyn PduCodec>,
    messages: Arc<dyn MessageStore>,
    notifications: Arc<dyn NotificationStore>,
    hooks: Arc<dyn ReceiveHooks>,
    screen: SenderScreen,
    acks: Arc<dyn AckSubmitter>,
    downloads: DownloadTracker,
    limiter: Option<Arc<Semaphore>>,
}

impl fmt::Debug for MmsReceiver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MmsReceiver")
            .field("default_subscription", &self.default_subscription)
            .field("codec", &self.codec)
            .field("messages", &self.messages)
            .field("notifications", &self.notifications)
            .field("downloads", &self.downloads)
            .field(
                "max_concurrent_workflows",
                &self.limiter.as_ref().map(|l| l.available_permits()),
            )
            .finish_non_exhaustive()
    }
}

impl MmsReceiver {
    #[must_use]
    pub fn new(config: &Config, collaborators: Collaborators, acks: Arc<dyn AckSubmitter>) -> Self {
        let Collaborators {
            codec,
            messages,
            notifications,
            hooks,
        } = collaborators;

        Self {
            default_subscription: config.default_subscription,
            screen: SenderScreen::new(Arc::clone(&hooks), Arc::clone(&notifications)),
            codec,
            messages,
            notifications,
            hooks,
            acks,
            downloads: DownloadTracker::new(),
            limiter: config
                .max_concurrent_workflows
                .filter(|limit| *limit > 0)
                .map(|limit| Arc::new(Semaphore::new(limit))),
        }
    }

    /// Share `tracker` with the download step instead of a private one
    #[must_use]
    pub fn with_download_tracker(mut self, tracker: DownloadTracker) -> Self {
        self.downloads = tracker;
        self
    }

    #[must_use]
    pub const fn downloads(&self) -> &DownloadTracker {
        &self.downloads
    }

    /// Run the workflow for `event` on a background task
    ///
    /// Returns immediately; the [`Completion`] resolves once the run has finished,
    /// including when it panics.
    pub fn on_receive(self: &Arc<Self>, event: DownloadCompleted) -> Completion {
        let (guard, completion) = Completion::pair();
        let receiver = Arc::clone(self);

        tokio::spawn(async move {
            let _permit = match &receiver.limiter {
                Some(limiter) => Arc::clone(limiter).acquire_owned().await.ok(),
                None => None,
            };

            let outcome = receiver.process(event).await;
            guard.finish(outcome);
        });

        completion
    }

    /// Run the workflow for `event` to completion
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(location = %event.location_url, file = %event.file_path.display())
    )]
    pub async fn process(&self, event: DownloadCompleted) -> Outcome {
        let subscription = event.subscription_id.unwrap_or(self.default_subscription);
        let location = event.location_url.as_str();

        let outcome = match AssertUnwindSafe(self.receive(&event, subscription))
            .catch_unwind()
            .await
        {
            Ok(outcome) => outcome,
            Err(_) => {
                tracing::error!(location, "Receive workflow panicked");
                Outcome::Aborted
            }
        };

        cleanup::handle_fetch_status(self.notifications.as_ref(), event.transport_status, location)
            .await;

        if let Some(elapsed) = self.downloads.finish(location) {
            tracing::debug!(location, ?elapsed, "Download complete");
        }

        match &outcome {
            Outcome::Received(id) => self.hooks.on_message_received(id),
            Outcome::Failed(error) => {
                tracing::warn!(location, error = %error, "Receive failed");
                self.hooks.on_error(error);
            }
            Outcome::Blocked | Outcome::Aborted => {}
        }

        outcome
    }

    /// Steps 1 to 5: everything up to and including queueing acknowledgments
    async fn receive(&self, event: &DownloadCompleted, subscription: SubscriptionId) -> Outcome {
        let location = event.location_url.as_str();

        let payload: Arc<[u8]> = match intake::read_payload(&event.file_path).await {
            Ok(payload) => Arc::from(payload),
            Err(e) => return Outcome::Failed(e.into()),
        };

        if payload.is_empty() {
            self.mark_retrieve_failed(location).await;
            return Outcome::Failed(DecodeError::Empty.into());
        }

        let pdu = match self.codec.parse(&payload) {
            Ok(pdu) => pdu,
            Err(e) => return Outcome::Failed(DecodeError::Malformed(e).into()),
        };

        let Pdu::RetrieveConf(retrieve) = &pdu else {
            return Outcome::Failed(DecodeError::UnexpectedKind(pdu.message_type()).into());
        };

        if self.screen.screen(retrieve.sender(), location).await == Verdict::Blocked {
            return Outcome::Blocked;
        }

        let persisted = self
            .messages
            .persist(&PersistRequest {
                raw: Arc::clone(&payload),
                retrieve: retrieve.clone(),
                location: location.to_string(),
                transaction_id: event.transaction_id.clone(),
                subscription,
            })
            .await;

        self.submit_acknowledgments(event, subscription, &payload, &pdu)
            .await;

        match persisted {
            Ok(id) => {
                audit::log_message_received(
                    &id.to_string(),
                    retrieve.sender(),
                    location,
                    payload.len(),
                );
                Outcome::Received(id)
            }
            Err(e) => Outcome::Failed(ReceiveError::Persistence(e)),
        }
    }

    async fn submit_acknowledgments(
        &self,
        event: &DownloadCompleted,
        subscription: SubscriptionId,
        payload: &[u8],
        pdu: &Pdu,
    ) {
        let has_credentials = self.hooks.relay_credentials(subscription).is_some();
        let notification = if has_credentials {
            self.load_notification(event).await
        } else {
            None
        };
        let line_number = self.hooks.line_number(subscription);

        let tasks = build_ack_tasks(TaskInput {
            subscription,
            has_credentials,
            payload,
            pdu,
            notification: notification.as_ref(),
            content_location: &event.location_url,
            line_number: line_number.as_deref(),
        });

        if !tasks.is_empty() {
            internal!("Queueing {} acknowledgment(s) for {}", tasks.len(), event.location_url);
            self.acks.submit(tasks);
        }
    }

    async fn load_notification(&self, event: &DownloadCompleted) -> Option<NotificationInd> {
        let uri = event.notification_ind_uri.as_ref()?;
        match self.notifications.load(uri).await {
            Ok(notification) => Some(notification),
            Err(e) => {
                tracing::warn!(%uri, error = %e, "Unable to load stored notification");
                None
            }
        }
    }

    async fn mark_retrieve_failed(&self, location: &str) {
        if let Err(e) = self
            .notifications
            .update_retrieve_status(location, RETRIEVE_STATUS_ERROR_END)
            .await
        {
            tracing::error!(location, error = %e, "Failed to mark notification as failed");
        }
    }

    /// Process events until the channel closes or a shutdown signal arrives
    ///
    /// When the channel closes, the runs already started are awaited before this
    /// returns, so every acknowledgment they queue reaches the lane. On a shutdown
    /// signal it returns at once and those runs finish in the background.
    pub async fn serve(
        self: Arc<Self>,
        mut events: mpsc::Receiver<DownloadCompleted>,
        mut shutdown: broadcast::Receiver<Signal>,
    ) {
        internal!("Receiver starting");
        let mut runs = JoinSet::new();

        loop {
            tokio::select! {
                event = events.recv() => {
                    let Some(event) = event else {
                        internal!(
                            "Event source closed, waiting for {} run(s) to finish",
                            runs.len()
                        );
                        while runs.join_next().await.is_some() {}
                        break;
                    };

                    // Outcomes are reported through the hooks
                    runs.spawn(self.on_receive(event));
                }
                Some(_) = runs.join_next(), if !runs.is_empty() => {}
                sig = shutdown.recv() => {
                    match sig {
                        Ok(Signal::Shutdown | Signal::Finalised) => {
                            internal!("Receiver received shutdown signal");
                        }
                        Err(e) => {
                            tracing::error!("Receiver shutdown channel error: {e}");
                        }
                    }
                    runs.detach_all();
                    break;
                }
            }
        }

        internal!("Receiver shutdown complete");
    }
}

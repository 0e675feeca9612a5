//! The serialized acknowledgment lane
//!
//! Every workflow run hands its acknowledgment tasks to a single worker task through
//! an unbounded FIFO channel. The worker performs one send at a time, in submission
//! order, and never retries: a failed attempt is logged, audited and dropped.

use std::sync::Arc;

use mmsrx_common::{PduCodec, Signal, audit, internal, outgoing};
use tokio::{
    sync::{broadcast, mpsc},
    task::JoinHandle,
};

use crate::{
    config::AckConfig,
    error::{AckError, NetworkError},
    route::RouteResolver,
    tasks::AckTask,
    transport::{HttpRequest, Transport},
};

/// Anything that accepts acknowledgment tasks without waiting for them to be sent
pub trait AckSubmitter: Send + Sync {
    fn submit(&self, tasks: Vec<AckTask>);
}

/// Performs a single acknowledgment send
#[derive(Debug)]
pub struct AckSender {
    codec: Arc<dyn PduCodec>,
    resolver: RouteResolver,
    transport: Arc<dyn Transport>,
    notify_wap_mmsc: bool,
}

impl AckSender {
    #[must_use]
    pub fn new(
        codec: Arc<dyn PduCodec>,
        resolver: RouteResolver,
        transport: Arc<dyn Transport>,
        config: &AckConfig,
    ) -> Self {
        Self {
            codec,
            resolver,
            transport,
            notify_wap_mmsc: config.notify_wap_mmsc,
        }
    }

    /// Compose, route and post one acknowledgment
    ///
    /// Returns the relay's HTTP status, or `None` if no route exists because the
    /// subscription has no carrier settings.
    ///
    /// # Errors
    /// If composing fails, the route cannot be established, the post fails, or the
    /// relay answers with a status of 400 or above
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(kind = %task.attempt.kind(), location = %task.content_location)
    )]
    pub async fn send(&self, task: &AckTask) -> Result<Option<u16>, AckError> {
        let body = self.codec.compose(&task.attempt.to_pdu())?;

        let Some(route) = self.resolver.resolve(task.subscription).await? else {
            tracing::info!(
                subscription = %task.subscription,
                "No relay settings, acknowledgment skipped"
            );
            return Ok(None);
        };

        let url = if self.notify_wap_mmsc {
            task.content_location.clone()
        } else {
            route.relay_url.clone()
        };

        outgoing!("POST {} ({}, {} bytes)", url, task.attempt.kind(), body.len());

        let response = self
            .transport
            .post(HttpRequest {
                url: url.clone(),
                body,
                proxy: route.proxy(),
            })
            .await
            .map_err(NetworkError::from)?;

        if !response.is_success() {
            return Err(NetworkError::HttpStatus {
                url,
                status: response.status,
            }
            .into());
        }

        audit::log_ack_sent(
            &task.attempt.kind().to_string(),
            &url,
            response.status,
            route.direct,
        );

        Ok(Some(response.status))
    }
}

/// Handle to the acknowledgment lane
///
/// Cloning shares the same lane.
#[derive(Debug, Clone)]
pub struct AckDispatcher {
    queue: mpsc::UnboundedSender<AckTask>,
}

impl AckDispatcher {
    /// Start the lane worker
    ///
    /// The worker stops when a signal arrives or every handle has been dropped. On
    /// [`Signal::Finalised`] the tasks already queued are still sent; on
    /// [`Signal::Shutdown`] they are logged and discarded.
    #[must_use]
    pub fn spawn(
        sender: Arc<AckSender>,
        shutdown: broadcast::Receiver<Signal>,
    ) -> (Self, JoinHandle<()>) {
        let (queue, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run_lane(sender, rx, shutdown));
        (Self { queue }, handle)
    }
}

impl AckSubmitter for AckDispatcher {
    fn submit(&self, tasks: Vec<AckTask>) {
        for task in tasks {
            if let Err(e) = self.queue.send(task) {
                tracing::warn!(
                    kind = %e.0.attempt.kind(),
                    location = %e.0.content_location,
                    "Acknowledgment lane closed, task dropped"
                );
            }
        }
    }
}

async fn run_lane(
    sender: Arc<AckSender>,
    mut rx: mpsc::UnboundedReceiver<AckTask>,
    mut shutdown: broadcast::Receiver<Signal>,
) {
    internal!("Acknowledgment lane starting");

    loop {
        tokio::select! {
            biased;

            sig = shutdown.recv() => {
                rx.close();

                match sig {
                    Ok(Signal::Finalised) => {
                        internal!("Acknowledgment lane finalising, sending queued tasks");
                        let mut sent = 0usize;
                        while let Some(task) = rx.recv().await {
                            deliver(&sender, &task).await;
                            sent += 1;
                        }
                        internal!("Acknowledgment lane finalised ({sent} sent while draining)");
                    }
                    Ok(Signal::Shutdown) => {
                        internal!("Acknowledgment lane received shutdown signal");
                        discard_queued(&mut rx);
                    }
                    Err(e) => {
                        tracing::error!("Acknowledgment lane shutdown channel error: {e}");
                        discard_queued(&mut rx);
                    }
                }
                break;
            }
            task = rx.recv() => {
                let Some(task) = task else {
                    internal!("All submitters dropped, acknowledgment lane stopping");
                    break;
                };

                deliver(&sender, &task).await;
            }
        }
    }
}

fn discard_queued(rx: &mut mpsc::UnboundedReceiver<AckTask>) {
    let mut undelivered = 0usize;
    while let Ok(task) = rx.try_recv() {
        tracing::warn!(
            kind = %task.attempt.kind(),
            location = %task.content_location,
            "Acknowledgment not sent before shutdown"
        );
        undelivered += 1;
    }
    internal!("Acknowledgment lane shutdown complete ({undelivered} undelivered)");
}

async fn deliver(sender: &AckSender, task: &AckTask) {
    match sender.send(task).await {
        Ok(Some(status)) => {
            tracing::debug!(
                kind = %task.attempt.kind(),
                status,
                "Acknowledgment accepted"
            );
        }
        Ok(None) => {}
        Err(e) => {
            tracing::warn!(
                kind = %task.attempt.kind(),
                location = %task.content_location,
                error = %e,
                "Acknowledgment failed"
            );
            audit::log_ack_failed(
                &task.attempt.kind().to_string(),
                &task.content_location,
                &e.to_string(),
            );
        }
    }
}

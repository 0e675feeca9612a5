use std::sync::{Arc, LazyLock};

use mmsrx_ack::{HttpTransport, NetworkPolicy, StaticNetworkPolicy, Transport};
use mmsrx_common::{Signal, audit, internal, logging};
use tokio::sync::{broadcast, mpsc};

use crate::{
    config::Config,
    error::ConfigError,
    event::DownloadCompleted,
    receiver::{Collaborators, MmsReceiver},
};

pub static SHUTDOWN_BROADCAST: LazyLock<broadcast::Sender<Signal>> = LazyLock::new(|| {
    let (sender, _receiver) = broadcast::channel(64);
    sender
});

/// Wait for CTRL+C (or SIGTERM on unix), then broadcast [`Signal::Shutdown`]
#[tracing::instrument(level = "trace")]
pub async fn shutdown() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        let mut terminate =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                internal!("CTRL+C entered, shutting down");
            }
            _ = terminate.recv() => {
                internal!("Terminate Signal received, shutting down");
            }
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
        internal!("CTRL+C entered, shutting down");
    }

    SHUTDOWN_BROADCAST
        .send(Signal::Shutdown)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Interrupted, e.to_string()))?;

    Ok(())
}

/// Owns the configuration and wires a receiver to its acknowledgment lane
#[derive(Debug, Default)]
pub struct Controller {
    config: Config,
    transport: Option<Arc<dyn Transport>>,
    network: Option<Arc<dyn NetworkPolicy>>,
}

impl Controller {
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self {
            config,
            transport: None,
            network: None,
        }
    }

    /// A controller for the configuration file found on disk
    ///
    /// # Errors
    /// If no configuration can be found or parsed
    pub fn from_config_file() -> Result<Self, ConfigError> {
        Ok(Self::new(Config::load()?))
    }

    /// Send acknowledgments through `transport` instead of the HTTP client
    #[must_use]
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Decide routes with `network` instead of the configured static preference
    #[must_use]
    pub fn with_network_policy(mut self, network: Arc<dyn NetworkPolicy>) -> Self {
        self.network = Some(network);
        self
    }

    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Build the receiver and start its acknowledgment lane
    ///
    /// Both stop on the next signal broadcast through `shutdown`.
    pub fn start(
        self,
        collaborators: Collaborators,
        shutdown: &broadcast::Sender<Signal>,
    ) -> (Arc<MmsReceiver>, tokio::task::JoinHandle<()>) {
        audit::init(self.config.audit.clone());

        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new(self.config.acknowledgment.http.clone())),
        };
        let network: Arc<dyn NetworkPolicy> = match self.network {
            Some(network) => network,
            None => Arc::new(StaticNetworkPolicy::new(
                self.config.acknowledgment.prefer_direct_path,
            )),
        };

        let (lane, lane_handle) = collaborators.spawn_ack_lane(
            &self.config.acknowledgment,
            transport,
            network,
            shutdown.subscribe(),
        );

        let receiver = Arc::new(MmsReceiver::new(
            &self.config,
            collaborators,
            Arc::new(lane),
        ));

        (receiver, lane_handle)
    }

    /// Run until `events` closes or the process is asked to stop
    ///
    /// When `events` closes, the runs in flight finish and every acknowledgment they
    /// queued is sent before this returns. A shutdown signal discards queued
    /// acknowledgments instead.
    ///
    /// # Errors
    /// If the OS signal handlers cannot be installed
    #[tracing::instrument(level = "trace", skip_all, err)]
    pub async fn run(
        self,
        collaborators: Collaborators,
        events: mpsc::Receiver<DownloadCompleted>,
    ) -> std::io::Result<()> {
        logging::init();
        internal!("Controller running");

        let (receiver, lane) = self.start(collaborators, &SHUTDOWN_BROADCAST);
        let serve = receiver.serve(events, SHUTDOWN_BROADCAST.subscribe());

        let result = tokio::select! {
            () = serve => {
                let _ = SHUTDOWN_BROADCAST.send(Signal::Finalised);
                Ok(())
            }
            res = shutdown() => res,
        };

        if let Err(e) = lane.await {
            tracing::error!("Acknowledgment lane ended abnormally: {e}");
        }

        internal!("Controller shut down");
        result
    }
}

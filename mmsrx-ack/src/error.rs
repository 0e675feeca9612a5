//! Typed errors for acknowledgment sends.
//!
//! None of these reach the collaborator callbacks: a failed acknowledgment is
//! logged and audited by the lane, then dropped.

use mmsrx_common::{CodecError, SubscriptionId};
use thiserror::Error;

/// Top-level error for a single acknowledgment attempt.
#[derive(Debug, Error)]
pub enum AckError {
    /// The route back to the relay could not be established.
    #[error("Route error: {0}")]
    Route(#[from] RouteError),

    /// The acknowledgment PDU could not be encoded.
    #[error("Failed to compose acknowledgment: {0}")]
    Compose(#[from] CodecError),

    /// The send itself failed.
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),
}

impl AckError {
    /// Returns `true` if the failure happened on the wire.
    #[must_use]
    pub const fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    /// Returns `true` if the relay answered with an error status.
    #[must_use]
    pub const fn is_http_status(&self) -> bool {
        matches!(self, Self::Network(NetworkError::HttpStatus { .. }))
    }
}

/// Errors raised while resolving the route for a send.
#[derive(Debug, Error)]
pub enum RouteError {
    /// A proxied route was required but the carrier settings carry no proxy.
    #[error("No proxy configured for subscription {0} and the direct path is not preferred")]
    MissingProxy(SubscriptionId),

    /// The relay URL from the carrier settings is unusable.
    #[error("Invalid relay URL '{url}': {reason}")]
    InvalidRelayUrl { url: String, reason: String },

    /// The network layer refused to set up a route to the proxy host.
    #[error("Unable to route to {host}: {reason}")]
    RouteSetup { host: String, reason: String },
}

/// Errors raised while performing a send.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// The transport failed before a response arrived.
    #[error("{0}")]
    Transport(#[from] TransportError),

    /// The relay answered, but with a failure status.
    #[error("Relay at {url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },
}

/// Errors raised by a [`crate::Transport`] implementation.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    Client(String),

    /// Connecting to the relay or the proxy failed.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// The request did not complete within the configured timeout.
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Any other request failure.
    #[error("Request failed: {0}")]
    Request(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_connect() {
            Self::Connection(err.to_string())
        } else if err.is_builder() {
            Self::Client(err.to_string())
        } else {
            Self::Request(err.to_string())
        }
    }
}

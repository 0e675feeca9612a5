//! Errors surfaced by the receive workflow.
//!
//! [`ReceiveError`] is what the error callback sees. Acknowledgment failures never
//! appear here; they stay inside the acknowledgment lane.

use std::{io, path::PathBuf};

use mmsrx_common::{CodecError, MessageType};
use mmsrx_store::StoreError;
use thiserror::Error;

/// A workflow run that did not end with a persisted message.
#[derive(Debug, Error)]
pub enum ReceiveError {
    /// The downloaded payload could not be read.
    #[error("Unable to read downloaded message: {0}")]
    Intake(#[from] IntakeError),

    /// The payload was not a usable retrieval.
    #[error("Unable to decode downloaded message: {0}")]
    Decode(#[from] DecodeError),

    /// The message store refused the message.
    #[error("Unable to persist message: {0}")]
    Persistence(#[from] StoreError),
}

impl ReceiveError {
    #[must_use]
    pub const fn is_intake(&self) -> bool {
        matches!(self, Self::Intake(_))
    }

    #[must_use]
    pub const fn is_decode(&self) -> bool {
        matches!(self, Self::Decode(_))
    }

    #[must_use]
    pub const fn is_persistence(&self) -> bool {
        matches!(self, Self::Persistence(_))
    }
}

/// Reading the transient download file failed.
#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// The payload did not decode to an M-Retrieve.conf.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Nothing was downloaded.
    #[error("Empty payload")]
    Empty,

    /// The codec rejected the bytes.
    #[error("Malformed PDU: {0}")]
    Malformed(#[from] CodecError),

    /// The bytes decoded, but to a different PDU kind.
    #[error("Expected m-retrieve-conf, got {0}")]
    UnexpectedKind(MessageType),
}

/// Loading the configuration failed.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `MMSRX_CONFIG` names a file that does not exist.
    #[error("MMSRX_CONFIG points to non-existent file: {}", .0.display())]
    MissingOverride(PathBuf),

    /// None of the default locations hold a configuration file.
    #[error("No configuration file found. Tried:\n  - MMSRX_CONFIG environment variable\n{tried}")]
    NotFound { tried: String },

    #[error("Failed to read config from {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

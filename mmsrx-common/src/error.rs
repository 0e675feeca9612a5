//! Error types for the mmsrx-common crate.

use thiserror::Error;

use crate::pdu::MessageType;

/// Errors reported by a [`PduCodec`](crate::PduCodec) implementation.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The data ended before a complete PDU could be read.
    #[error("PDU truncated after {0} bytes")]
    Truncated(usize),

    /// A header carried a value the codec cannot represent.
    #[error("Invalid header value for {field}: {reason}")]
    InvalidHeader { field: &'static str, reason: String },

    /// The PDU declares an MMS version the codec does not speak.
    #[error("Unsupported MMS version: {0:#04x}")]
    UnsupportedVersion(u8),

    /// The codec cannot compose or parse this kind of PDU.
    #[error("Unsupported PDU type: {0}")]
    Unsupported(MessageType),

    /// Anything else the codec wants to surface.
    #[error("Codec error: {0}")]
    Other(String),
}

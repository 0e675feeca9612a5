//! Shared building blocks for the mmsrx workspace
//!
//! This crate holds everything the receive and acknowledgment crates agree on:
//! - Logging macros and subscriber setup
//! - Audit events for the message receipt lifecycle
//! - The PDU model exchanged with the external codec
//! - Fetch status classification and subscription identifiers

pub mod audit;
pub mod error;
pub mod logging;
pub mod pdu;
pub mod status;
pub mod types;

pub use error::CodecError;
pub use pdu::{
    AcknowledgeInd, MMS_VERSION_1_2, MessageType, NotificationInd, NotifyRespInd, OutboundPdu,
    Pdu, PduCodec, RETRIEVE_STATUS_ERROR_END, RetrieveConf, STATUS_RETRIEVED,
};
pub use status::FetchStatus;
pub use tracing;
pub use types::SubscriptionId;

/// Lifecycle signals broadcast to long-running loops
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Shutdown,
    Finalised,
}

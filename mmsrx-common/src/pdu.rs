//! PDU model shared with the external codec
//!
//! The binary envelope format is owned by a [`PduCodec`] implementation supplied by
//! the embedding application. This module only describes the values that cross that
//! boundary: what a parsed retrieval looks like, and what the acknowledgment PDUs
//! must carry.

use core::fmt::{self, Display, Formatter};
use std::sync::Arc;

use crate::error::CodecError;

/// MMS encapsulation version 1.2, the version acknowledgments are composed with
pub const MMS_VERSION_1_2: u8 = 0x92;

/// `X-Mms-Status` value telling the relay the content was retrieved
pub const STATUS_RETRIEVED: u8 = 0x81;

/// `X-Mms-Retrieve-Status` marking a notification whose retrieval ended in error
pub const RETRIEVE_STATUS_ERROR_END: u8 = 0xFF;

/// `X-Mms-Message-Type` header values
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum MessageType {
    SendReq,
    SendConf,
    NotificationInd,
    NotifyRespInd,
    RetrieveConf,
    AcknowledgeInd,
    DeliveryInd,
    Unknown(u8),
}

impl From<u8> for MessageType {
    fn from(value: u8) -> Self {
        match value {
            0x80 => Self::SendReq,
            0x81 => Self::SendConf,
            0x82 => Self::NotificationInd,
            0x83 => Self::NotifyRespInd,
            0x84 => Self::RetrieveConf,
            0x85 => Self::AcknowledgeInd,
            0x86 => Self::DeliveryInd,
            _ => Self::Unknown(value),
        }
    }
}

impl From<MessageType> for u8 {
    fn from(value: MessageType) -> Self {
        match value {
            MessageType::SendReq => 0x80,
            MessageType::SendConf => 0x81,
            MessageType::NotificationInd => 0x82,
            MessageType::NotifyRespInd => 0x83,
            MessageType::RetrieveConf => 0x84,
            MessageType::AcknowledgeInd => 0x85,
            MessageType::DeliveryInd => 0x86,
            MessageType::Unknown(value) => value,
        }
    }
}

impl Display for MessageType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::SendReq => f.write_str("m-send-req"),
            Self::SendConf => f.write_str("m-send-conf"),
            Self::NotificationInd => f.write_str("m-notification-ind"),
            Self::NotifyRespInd => f.write_str("m-notifyresp-ind"),
            Self::RetrieveConf => f.write_str("m-retrieve-conf"),
            Self::AcknowledgeInd => f.write_str("m-acknowledge-ind"),
            Self::DeliveryInd => f.write_str("m-delivery-ind"),
            Self::Unknown(value) => write!(f, "unknown ({value:#04x})"),
        }
    }
}

/// The content returned by the relay after a fetch (M-Retrieve.conf)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrieveConf {
    /// Sender address as encoded in the `From` header
    pub from: Option<String>,
    /// Present when the relay wants an M-Acknowledge.ind back
    pub transaction_id: Option<String>,
    pub message_id: Option<String>,
    pub content_type: Option<String>,
    pub body: Arc<[u8]>,
}

impl RetrieveConf {
    /// The sender address, if the relay supplied a non-empty one
    #[must_use]
    pub fn sender(&self) -> Option<&str> {
        self.from.as_deref().filter(|from| !from.is_empty())
    }

    /// The transaction id, if the relay supplied a non-empty one
    #[must_use]
    pub fn transaction_id(&self) -> Option<&str> {
        self.transaction_id.as_deref().filter(|id| !id.is_empty())
    }
}

/// A stored delivery notification (M-Notification.ind)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationInd {
    pub transaction_id: String,
    pub content_location: String,
    pub from: Option<String>,
    pub message_size: Option<u64>,
}

/// The result of parsing fetched bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pdu {
    RetrieveConf(RetrieveConf),
    NotificationInd(NotificationInd),
    Other(MessageType),
}

impl Pdu {
    #[must_use]
    pub const fn message_type(&self) -> MessageType {
        match self {
            Self::RetrieveConf(_) => MessageType::RetrieveConf,
            Self::NotificationInd(_) => MessageType::NotificationInd,
            Self::Other(message_type) => *message_type,
        }
    }
}

/// M-NotifyResp.ind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyRespInd {
    pub version: u8,
    pub transaction_id: String,
    pub status: u8,
}

impl NotifyRespInd {
    /// Response telling the relay the notified content has been retrieved
    #[must_use]
    pub fn retrieved(transaction_id: impl Into<String>) -> Self {
        Self {
            version: MMS_VERSION_1_2,
            transaction_id: transaction_id.into(),
            status: STATUS_RETRIEVED,
        }
    }
}

/// M-Acknowledge.ind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcknowledgeInd {
    pub version: u8,
    pub transaction_id: String,
    /// The device's own number; empty when unknown
    pub from: String,
}

impl AcknowledgeInd {
    #[must_use]
    pub fn new(transaction_id: impl Into<String>, from: Option<String>) -> Self {
        Self {
            version: MMS_VERSION_1_2,
            transaction_id: transaction_id.into(),
            from: from.unwrap_or_default(),
        }
    }
}

/// PDUs the engine sends back to the relay
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundPdu {
    NotifyResp(NotifyRespInd),
    Acknowledge(AcknowledgeInd),
}

impl OutboundPdu {
    #[must_use]
    pub const fn message_type(&self) -> MessageType {
        match self {
            Self::NotifyResp(_) => MessageType::NotifyRespInd,
            Self::Acknowledge(_) => MessageType::AcknowledgeInd,
        }
    }
}

/// The binary envelope codec, implemented outside this workspace
pub trait PduCodec: Send + Sync + std::fmt::Debug {
    /// Parse fetched bytes into a PDU
    ///
    /// # Errors
    /// If the bytes are not a well-formed PDU
    fn parse(&self, data: &[u8]) -> Result<Pdu, CodecError>;

    /// Encode an acknowledgment PDU
    ///
    /// # Errors
    /// If the PDU cannot be represented on the wire
    fn compose(&self, pdu: &OutboundPdu) -> Result<Vec<u8>, CodecError>;
}

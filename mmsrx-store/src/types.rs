use std::{
    fmt::{self, Display, Formatter},
    sync::Arc,
};

use mmsrx_common::{MessageType, NotificationInd, RetrieveConf, SubscriptionId};
use serde::{Deserialize, Serialize};

/// Identifier of a persisted message
///
/// A ULID, so identifiers sort by the time the message was stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId {
    id: ulid::Ulid,
}

impl MessageId {
    #[must_use]
    pub const fn new(id: ulid::Ulid) -> Self {
        Self { id }
    }

    /// Generate a new unique message ID
    #[must_use]
    pub fn generate() -> Self {
        Self {
            id: ulid::Ulid::new(),
        }
    }

    #[must_use]
    pub const fn ulid(&self) -> ulid::Ulid {
        self.id
    }

    /// Milliseconds since the Unix epoch at which the message was stored
    #[must_use]
    pub const fn timestamp_ms(&self) -> u64 {
        self.id.timestamp_ms()
    }
}

impl Display for MessageId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl Serialize for MessageId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.id.to_string())
    }
}

impl<'de> Deserialize<'de> for MessageId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let id = ulid::Ulid::from_string(&s).map_err(serde::de::Error::custom)?;
        Ok(Self { id })
    }
}

/// Opaque reference to a stored notification, as handed over by the download step
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationUri(String);

impl NotificationUri {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NotificationUri {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for NotificationUri {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Display for NotificationUri {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Everything the message store receives for one retrieved message
#[derive(Debug, Clone)]
pub struct PersistRequest {
    /// The raw fetched bytes
    pub raw: Arc<[u8]>,
    /// The decoded retrieval
    pub retrieve: RetrieveConf,
    /// Relay content location the message was fetched from
    pub location: String,
    /// Transaction id from the download event, if one was supplied
    pub transaction_id: Option<String>,
    pub subscription: SubscriptionId,
}

/// A row in the notification store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRecord {
    pub uri: NotificationUri,
    pub kind: MessageType,
    pub notification: NotificationInd,
    /// Last `X-Mms-Retrieve-Status` recorded against this row
    pub retrieve_status: Option<u8>,
}

impl NotificationRecord {
    /// A pending notification row for `notification`
    #[must_use]
    pub fn pending(uri: impl Into<NotificationUri>, notification: NotificationInd) -> Self {
        Self {
            uri: uri.into(),
            kind: MessageType::NotificationInd,
            notification,
            retrieve_status: None,
        }
    }

    /// Checks if this row is a notification for `location`
    #[must_use]
    pub fn matches(&self, location: &str) -> bool {
        self.kind == MessageType::NotificationInd
            && self.notification.content_location == location
    }
}

use async_trait::async_trait;
use mmsrx_common::NotificationInd;

use crate::types::{MessageId, NotificationUri, PersistRequest};

/// Persistent storage for retrieved messages
#[async_trait]
pub trait MessageStore: Send + Sync + std::fmt::Debug {
    /// Persist a retrieved message and return the identifier it was stored under
    ///
    /// # Errors
    /// If the message could not be written
    async fn persist(&self, request: &PersistRequest) -> crate::Result<MessageId>;
}

/// The store holding pending delivery notifications
///
/// Rows are keyed both by an opaque [`NotificationUri`] and by the relay content
/// location the notification refers to.
#[async_trait]
pub trait NotificationStore: Send + Sync + std::fmt::Debug {
    /// Load the notification stored at `uri`
    ///
    /// # Errors
    /// If no notification is stored there, or the row is not a notification
    async fn load(&self, uri: &NotificationUri) -> crate::Result<NotificationInd>;

    /// Delete every pending notification whose content location is `location`
    ///
    /// Returns how many rows were removed; deleting rows that are already gone
    /// removes nothing and is not an error.
    ///
    /// # Errors
    /// If the backend fails
    async fn delete_pending(&self, location: &str) -> crate::Result<usize>;

    /// Record an `X-Mms-Retrieve-Status` against every notification row for `location`
    ///
    /// # Errors
    /// If the backend fails
    async fn update_retrieve_status(&self, location: &str, status: u8) -> crate::Result<usize>;
}

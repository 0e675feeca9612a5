use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use async_trait::async_trait;
use dashmap::DashMap;
use mmsrx_common::NotificationInd;

use crate::{
    StoreError,
    store::{MessageStore, NotificationStore},
    types::{MessageId, NotificationRecord, NotificationUri, PersistRequest},
};

/// In-memory message store
///
/// Messages are kept in a `HashMap` protected by an `RwLock`. Intended for tests
/// and transient use; an optional capacity makes writes fail once it is reached.
#[derive(Debug, Clone, Default)]
pub struct MemoryMessageStore {
    pub(crate) messages: Arc<RwLock<HashMap<MessageId, PersistRequest>>>,
    /// Maximum number of messages to store (None = unlimited)
    capacity: Option<usize>,
}

impl MemoryMessageStore {
    /// Create a new empty store with unlimited capacity
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new store that refuses writes past `capacity` messages
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            messages: Arc::new(RwLock::new(HashMap::new())),
            capacity: Some(capacity),
        }
    }

    /// Get the current number of messages in the store
    ///
    /// Recovers if the lock is poisoned by accessing the underlying data.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fetch a stored message
    ///
    /// # Errors
    /// If the lock is poisoned
    pub fn get(&self, id: &MessageId) -> crate::Result<Option<PersistRequest>> {
        Ok(self.messages.read()?.get(id).cloned())
    }

    /// All stored messages, oldest first
    ///
    /// # Errors
    /// If the lock is poisoned
    pub fn list(&self) -> crate::Result<Vec<(MessageId, PersistRequest)>> {
        let mut messages: Vec<_> = self
            .messages
            .read()?
            .iter()
            .map(|(id, request)| (id.clone(), request.clone()))
            .collect();

        // ULIDs sort by creation time
        messages.sort_by(|(a, _), (b, _)| a.cmp(b));

        Ok(messages)
    }
}

#[async_trait]
impl MessageStore for MemoryMessageStore {
    async fn persist(&self, request: &PersistRequest) -> crate::Result<MessageId> {
        let id = MessageId::generate();
        let mut messages = self.messages.write()?;

        if let Some(capacity) = self.capacity
            && messages.len() >= capacity
        {
            return Err(StoreError::CapacityExceeded {
                used: messages.len(),
                capacity,
            });
        }

        messages.insert(id.clone(), request.clone());
        drop(messages);

        tracing::debug!(%id, location = %request.location, "Persisted message");
        Ok(id)
    }
}

/// In-memory notification store
#[derive(Debug, Clone, Default)]
pub struct MemoryNotificationStore {
    records: Arc<DashMap<NotificationUri, NotificationRecord>>,
}

impl MemoryNotificationStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a row
    pub fn insert(&self, record: NotificationRecord) {
        self.records.insert(record.uri.clone(), record);
    }

    /// Insert a pending notification row at `uri`
    pub fn insert_pending(&self, uri: impl Into<NotificationUri>, notification: NotificationInd) {
        self.insert(NotificationRecord::pending(uri, notification));
    }

    #[must_use]
    pub fn get(&self, uri: &NotificationUri) -> Option<NotificationRecord> {
        self.records.get(uri).map(|record| record.value().clone())
    }

    /// Rows of any kind whose content location is `location`
    #[must_use]
    pub fn records_for(&self, location: &str) -> Vec<NotificationRecord> {
        self.records
            .iter()
            .filter(|record| record.notification.content_location == location)
            .map(|record| record.value().clone())
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl NotificationStore for MemoryNotificationStore {
    async fn load(&self, uri: &NotificationUri) -> crate::Result<NotificationInd> {
        let record = self
            .records
            .get(uri)
            .ok_or_else(|| StoreError::NotificationNotFound(uri.clone()))?;

        if record.kind != mmsrx_common::MessageType::NotificationInd {
            return Err(StoreError::WrongKind {
                uri: uri.clone(),
                found: record.kind.to_string(),
            });
        }

        Ok(record.notification.clone())
    }

    async fn delete_pending(&self, location: &str) -> crate::Result<usize> {
        let uris: Vec<NotificationUri> = self
            .records
            .iter()
            .filter(|record| record.matches(location))
            .map(|record| record.key().clone())
            .collect();

        let removed = uris
            .iter()
            .filter(|uri| self.records.remove(*uri).is_some())
            .count();

        tracing::debug!(location, removed, "Deleted pending notifications");
        Ok(removed)
    }

    async fn update_retrieve_status(&self, location: &str, status: u8) -> crate::Result<usize> {
        let mut updated = 0;
        for mut record in self.records.iter_mut() {
            if record.matches(location) {
                record.retrieve_status = Some(status);
                updated += 1;
            }
        }

        Ok(updated)
    }
}

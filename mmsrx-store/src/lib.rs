//! Storage interfaces used by the receive workflow
//!
//! The message store and the notification-record store live outside this
//! workspace. This crate defines the narrow interface the workflow needs from
//! them, plus in-memory implementations for tests and development.

pub mod backends;
pub mod error;
pub mod store;
pub mod types;

pub use backends::{MemoryMessageStore, MemoryNotificationStore, TestMessageStore};
pub use error::{Result, StoreError};
pub use store::{MessageStore, NotificationStore};
pub use types::{MessageId, NotificationRecord, NotificationUri, PersistRequest};

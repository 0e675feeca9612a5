//! Receive-side completion and acknowledgment engine for MMS
//!
//! After a message's content has been fetched from the relay into a transient
//! file, [`MmsReceiver`] decodes it, screens the sender, persists it and queues the
//! acknowledgments the relay expects, cleaning up stale notifications along the way.

pub mod cleanup;
pub mod config;
pub mod controller;
pub mod downloads;
pub mod error;
pub mod event;
pub mod hooks;
pub mod intake;
pub mod receiver;
pub mod screen;

pub use config::Config;
pub use controller::{Controller, SHUTDOWN_BROADCAST};
pub use downloads::DownloadTracker;
pub use error::{ConfigError, DecodeError, IntakeError, ReceiveError};
pub use event::{Completion, DownloadCompleted, Outcome};
pub use hooks::{NoopHooks, ReceiveHooks};
pub use mmsrx_ack as ack;
pub use mmsrx_common as common;
pub use mmsrx_store as store;
pub use receiver::{Collaborators, MmsReceiver};

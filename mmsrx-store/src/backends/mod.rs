//! Store implementations
//!
//! - `memory`: In-memory message and notification stores
//! - `test`: Test utilities with failure injection and synchronization primitives

pub mod memory;

pub use memory::{MemoryMessageStore, MemoryNotificationStore};
pub use test::TestMessageStore;

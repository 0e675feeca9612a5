use std::sync::Arc;

use mmsrx_ack::{CredentialSource, RelayCredentials};
use mmsrx_common::SubscriptionId;
use mmsrx_store::MessageId;

use crate::error::ReceiveError;

/// Callbacks and lookups supplied by the embedding application
///
/// Every method has a default, so implementors only override what they need.
pub trait ReceiveHooks: Send + Sync {
    /// Whether messages from `address` should be dropped
    fn is_address_blocked(&self, _address: &str) -> bool {
        false
    }

    /// A message was persisted
    fn on_message_received(&self, _id: &MessageId) {}

    /// A run ended without persisting a message
    fn on_error(&self, _error: &ReceiveError) {}

    /// Carrier settings for reaching the relay
    fn relay_credentials(&self, _subscription: SubscriptionId) -> Option<RelayCredentials> {
        None
    }

    /// The device's own number, used as the acknowledgment sender
    fn line_number(&self, _subscription: SubscriptionId) -> Option<String> {
        None
    }
}

/// Hooks that block nobody and ignore every callback
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHooks;

impl ReceiveHooks for NoopHooks {}

/// Exposes [`ReceiveHooks::relay_credentials`] to the route resolver
pub(crate) struct HooksCredentials(pub(crate) Arc<dyn ReceiveHooks>);

impl CredentialSource for HooksCredentials {
    fn relay_credentials(&self, subscription: SubscriptionId) -> Option<RelayCredentials> {
        self.0.relay_credentials(subscription)
    }
}

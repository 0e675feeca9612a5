use std::sync::Arc;

use mmsrx_common::audit;
use mmsrx_store::NotificationStore;

use crate::hooks::ReceiveHooks;

/// Result of screening a sender
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Allowed,
    Blocked,
}

/// Drops messages from senders the application has blocked
pub struct SenderScreen {
    hooks: Arc<dyn ReceiveHooks>,
    notifications: Arc<dyn NotificationStore>,
}

impl std::fmt::Debug for SenderScreen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SenderScreen")
            .field("notifications", &self.notifications)
            .finish_non_exhaustive()
    }
}

impl SenderScreen {
    #[must_use]
    pub fn new(hooks: Arc<dyn ReceiveHooks>, notifications: Arc<dyn NotificationStore>) -> Self {
        Self {
            hooks,
            notifications,
        }
    }

    /// Screen `sender`; a blocked sender also loses its pending notification
    ///
    /// Messages without a sender are never blocked.
    pub async fn screen(&self, sender: Option<&str>, location: &str) -> Verdict {
        let Some(sender) = sender else {
            return Verdict::Allowed;
        };

        if !self.hooks.is_address_blocked(sender) {
            return Verdict::Allowed;
        }

        audit::log_sender_blocked(sender, location);

        match self.notifications.delete_pending(location).await {
            Ok(removed) => audit::log_notification_removed(location, "blocked", removed),
            Err(e) => {
                tracing::error!(location, error = %e, "Failed to remove notification for blocked sender");
            }
        }

        Verdict::Blocked
    }
}

use mmsrx_common::{FetchStatus, audit};
use mmsrx_store::NotificationStore;

/// Remove the pending notification when the fetch said it is stale
///
/// A 400 or 404 from the relay means the content will never be retrievable, so
/// the pending notification for `location` is deleted. Any other status, or none,
/// leaves it alone. Returns the number of rows removed; store failures are logged
/// and reported as `None`.
#[tracing::instrument(level = "debug", skip(notifications))]
pub async fn handle_fetch_status(
    notifications: &dyn NotificationStore,
    status: Option<u16>,
    location: &str,
) -> Option<usize> {
    let status = FetchStatus::from(status?);
    if !status.is_stale_notification() {
        return Some(0);
    }

    match notifications.delete_pending(location).await {
        Ok(removed) => {
            audit::log_notification_removed(location, &status.to_string(), removed);
            Some(removed)
        }
        Err(e) => {
            tracing::error!(location, error = %e, "Failed to remove stale notification");
            None
        }
    }
}

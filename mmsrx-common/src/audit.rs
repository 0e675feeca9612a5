//! Audit logging for message receipt events
//!
//! Structured events describing what happened to each fetched message, emitted at
//! INFO/WARN so they survive the default release filter.
//!
//! ## Audit Events
//!
//! - `MessageReceived`: Retrieved message persisted to the message store
//! - `SenderBlocked`: Message dropped by the sender screen
//! - `PendingNotificationRemoved`: Stale or blocked notification record deleted
//! - `AcknowledgmentSent`: Acknowledgment PDU accepted by the relay
//! - `AcknowledgmentFailed`: Acknowledgment PDU could not be delivered
//!
//! Sender addresses are phone numbers or email addresses; both can be redacted.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Audit logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Enable audit logging for receipt events
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Redact sender addresses from audit logs
    #[serde(default)]
    pub redact_sender: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            redact_sender: false,
        }
    }
}

const fn default_true() -> bool {
    true
}

static AUDIT_CONFIG: std::sync::OnceLock<Arc<AuditConfig>> = std::sync::OnceLock::new();

/// Initialize audit logging with configuration
pub fn init(config: AuditConfig) {
    AUDIT_CONFIG.get_or_init(|| Arc::new(config));
}

/// Get the current audit configuration
#[must_use]
pub fn config() -> Arc<AuditConfig> {
    AUDIT_CONFIG
        .get()
        .cloned()
        .unwrap_or_else(|| Arc::new(AuditConfig::default()))
}

/// Redact a sender address if redaction is enabled
///
/// Email addresses keep their domain; phone numbers keep their last two digits.
#[must_use]
pub fn redact_address(address: &str, redact: bool) -> String {
    if !redact {
        return address.to_string();
    }

    if let Some((_, domain)) = address.split_once('@') {
        return format!("[REDACTED]@{domain}");
    }

    let digits: Vec<char> = address.chars().filter(char::is_ascii_digit).collect();
    if digits.len() > 4 {
        let tail: String = digits[digits.len() - 2..].iter().collect();
        format!("[REDACTED]{tail}")
    } else {
        "[REDACTED]".to_string()
    }
}

/// Log message received event
///
/// # Fields
/// - `message_id`: Identifier assigned by the message store
/// - `sender`: Sender address (redacted if configured)
/// - `location`: Relay content location the message was fetched from
/// - `size`: Fetched payload size in bytes
pub fn log_message_received(message_id: &str, sender: Option<&str>, location: &str, size: usize) {
    let config = config();
    if !config.enabled {
        return;
    }

    let sender = sender.map_or_else(
        || "<unknown>".to_string(),
        |sender| redact_address(sender, config.redact_sender),
    );

    tracing::event!(
        tracing::Level::INFO,
        event = "MessageReceived",
        message_id = %message_id,
        sender = %sender,
        location = %location,
        size = size,
        "Audit: Message received and persisted"
    );
}

/// Log sender blocked event
pub fn log_sender_blocked(sender: &str, location: &str) {
    let config = config();
    if !config.enabled {
        return;
    }

    tracing::event!(
        tracing::Level::INFO,
        event = "SenderBlocked",
        sender = %redact_address(sender, config.redact_sender),
        location = %location,
        "Audit: Message from blocked sender dropped"
    );
}

/// Log pending notification removal
///
/// # Fields
/// - `location`: Content location of the notification
/// - `reason`: Why it was removed (`blocked`, `404 Not Found`, ...)
/// - `removed`: Number of records the store deleted
pub fn log_notification_removed(location: &str, reason: &str, removed: usize) {
    let config = config();
    if !config.enabled {
        return;
    }

    tracing::event!(
        tracing::Level::INFO,
        event = "PendingNotificationRemoved",
        location = %location,
        reason = %reason,
        removed = removed,
        "Audit: Pending notification removed"
    );
}

/// Log acknowledgment sent event
///
/// # Fields
/// - `kind`: PDU type sent
/// - `destination`: URL the PDU was posted to
/// - `status`: HTTP status returned by the relay
/// - `direct`: Whether the direct data path was used
pub fn log_ack_sent(kind: &str, destination: &str, status: u16, direct: bool) {
    let config = config();
    if !config.enabled {
        return;
    }

    tracing::event!(
        tracing::Level::INFO,
        event = "AcknowledgmentSent",
        kind = %kind,
        destination = %destination,
        status = status,
        direct = direct,
        "Audit: Acknowledgment sent"
    );
}

/// Log acknowledgment failure event
pub fn log_ack_failed(kind: &str, location: &str, error: &str) {
    let config = config();
    if !config.enabled {
        return;
    }

    tracing::event!(
        tracing::Level::WARN,
        event = "AcknowledgmentFailed",
        kind = %kind,
        location = %location,
        error = %error,
        "Audit: Acknowledgment failed"
    );
}

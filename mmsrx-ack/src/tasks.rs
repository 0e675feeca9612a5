use mmsrx_common::{
    AcknowledgeInd, MessageType, NotificationInd, NotifyRespInd, OutboundPdu, Pdu,
    SubscriptionId,
};

/// One acknowledgment to send
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AckAttempt {
    /// M-Acknowledge.ind, sent when the relay put a transaction id on the retrieval
    FinalAcknowledgment {
        transaction_id: String,
        /// The device's own number, if known
        from: Option<String>,
    },
    /// M-NotifyResp.ind for the stored notification
    DeliveryNotificationResponse { transaction_id: String },
}

impl AckAttempt {
    #[must_use]
    pub const fn kind(&self) -> MessageType {
        match self {
            Self::FinalAcknowledgment { .. } => MessageType::AcknowledgeInd,
            Self::DeliveryNotificationResponse { .. } => MessageType::NotifyRespInd,
        }
    }

    #[must_use]
    pub fn transaction_id(&self) -> &str {
        match self {
            Self::FinalAcknowledgment { transaction_id, .. }
            | Self::DeliveryNotificationResponse { transaction_id } => transaction_id,
        }
    }

    /// The PDU this attempt sends
    #[must_use]
    pub fn to_pdu(&self) -> OutboundPdu {
        match self {
            Self::FinalAcknowledgment {
                transaction_id,
                from,
            } => OutboundPdu::Acknowledge(AcknowledgeInd::new(transaction_id.clone(), from.clone())),
            Self::DeliveryNotificationResponse { transaction_id } => {
                OutboundPdu::NotifyResp(NotifyRespInd::retrieved(transaction_id.clone()))
            }
        }
    }
}

/// An attempt plus where it belongs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AckTask {
    pub attempt: AckAttempt,
    /// Content location of the message being acknowledged
    pub content_location: String,
    pub subscription: SubscriptionId,
}

/// What one workflow run knows when it builds its acknowledgments
#[derive(Debug, Clone, Copy)]
pub struct TaskInput<'a> {
    pub subscription: SubscriptionId,
    /// Whether carrier settings exist for the subscription
    pub has_credentials: bool,
    pub payload: &'a [u8],
    pub pdu: &'a Pdu,
    /// The stored notification this retrieval answers
    pub notification: Option<&'a NotificationInd>,
    pub content_location: &'a str,
    /// The device's own number, if known
    pub line_number: Option<&'a str>,
}

/// Build the acknowledgments for one retrieval
///
/// Returns nothing when acknowledgments cannot or should not be sent. Otherwise the
/// final acknowledgment (only when the retrieval carries a transaction id) comes
/// before the notification response.
#[must_use]
pub fn build_ack_tasks(input: TaskInput<'_>) -> Vec<AckTask> {
    if input.payload.is_empty() {
        tracing::debug!(location = input.content_location, "Blank response, no acknowledgments");
        return Vec::new();
    }

    if !input.has_credentials {
        tracing::debug!(
            subscription = %input.subscription,
            "No relay settings, no acknowledgments can be sent"
        );
        return Vec::new();
    }

    let Pdu::RetrieveConf(retrieve) = input.pdu else {
        tracing::warn!(
            kind = %input.pdu.message_type(),
            location = input.content_location,
            "Not a retrieval, no acknowledgments"
        );
        return Vec::new();
    };

    let Some(notification) = input.notification else {
        tracing::warn!(
            location = input.content_location,
            "Stored notification unavailable, no acknowledgments"
        );
        return Vec::new();
    };

    let task = |attempt| AckTask {
        attempt,
        content_location: input.content_location.to_string(),
        subscription: input.subscription,
    };

    let mut tasks = Vec::with_capacity(2);
    if let Some(transaction_id) = retrieve.transaction_id() {
        tasks.push(task(AckAttempt::FinalAcknowledgment {
            transaction_id: transaction_id.to_string(),
            from: input.line_number.map(ToString::to_string),
        }));
    }
    tasks.push(task(AckAttempt::DeliveryNotificationResponse {
        transaction_id: notification.transaction_id.clone(),
    }));

    tasks
}

//! Test doubles and harness for the receive workflow
#![allow(dead_code)] // Test utility module - not all helpers used in every test

pub mod harness;

use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use mmsrx::{
    ReceiveError, ReceiveHooks,
    ack::{
        AckSubmitter, AckTask, HttpRequest, ProxyAddress, RelayCredentials, Transport,
        TransportError, TransportResponse,
    },
    common::{
        CodecError, MessageType, NotificationInd, OutboundPdu, Pdu, PduCodec, RetrieveConf,
        SubscriptionId,
    },
    store::MessageId,
};
use tokio::sync::Notify;

pub use harness::{Harness, HarnessBuilder};

pub const RELAY_URL: &str = "http://mmsc.carrier.example/mms";

/// A readable stand-in for the binary codec
///
/// - `retrieve;from=<addr>;tx=<id>` parses to an M-Retrieve.conf (both fields optional)
/// - `kind=<hex>` parses to some other PDU kind
/// - anything else is malformed
///
/// Composed PDUs are written back as `notifyresp:<tx>` and `ack:<tx>:<from>`.
#[derive(Debug, Default)]
pub struct ScriptedCodec;

impl PduCodec for ScriptedCodec {
    fn parse(&self, data: &[u8]) -> Result<Pdu, CodecError> {
        let text = std::str::from_utf8(data).map_err(|e| CodecError::Other(e.to_string()))?;
        let mut fields = text.split(';');

        match fields.next() {
            Some("retrieve") => {
                let mut conf = RetrieveConf {
                    from: None,
                    transaction_id: None,
                    message_id: None,
                    content_type: Some("application/vnd.wap.multipart.related".to_string()),
                    body: Arc::from(data),
                };
                for field in fields {
                    match field.split_once('=') {
                        Some(("from", value)) => conf.from = Some(value.to_string()),
                        Some(("tx", value)) => conf.transaction_id = Some(value.to_string()),
                        _ => {
                            return Err(CodecError::InvalidHeader {
                                field: "unknown",
                                reason: field.to_string(),
                            });
                        }
                    }
                }
                Ok(Pdu::RetrieveConf(conf))
            }
            Some(kind) if kind.starts_with("kind=") => {
                let value = u8::from_str_radix(kind.trim_start_matches("kind=0x"), 16)
                    .map_err(|e| CodecError::Other(e.to_string()))?;
                Ok(Pdu::Other(MessageType::from(value)))
            }
            _ => Err(CodecError::Truncated(data.len())),
        }
    }

    fn compose(&self, pdu: &OutboundPdu) -> Result<Vec<u8>, CodecError> {
        Ok(match pdu {
            OutboundPdu::NotifyResp(resp) => format!("notifyresp:{}", resp.transaction_id),
            OutboundPdu::Acknowledge(ack) => format!("ack:{}:{}", ack.transaction_id, ack.from),
        }
        .into_bytes())
    }
}

/// Hooks that record every callback
#[derive(Default)]
pub struct RecordingHooks {
    pub blocked: HashSet<String>,
    pub credentials: Option<RelayCredentials>,
    pub line_number: Option<String>,
    pub panic_on_received: bool,
    pub panic_on_screen: bool,
    pub received: Mutex<Vec<MessageId>>,
    pub errors: Mutex<Vec<String>>,
    pub notify: Notify,
}

impl RecordingHooks {
    pub fn received(&self) -> Vec<MessageId> {
        self.received.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }

    pub fn callbacks(&self) -> usize {
        self.received.lock().unwrap().len() + self.errors.lock().unwrap().len()
    }

    pub async fn wait_for_callbacks(&self, expected: usize) {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                let notified = self.notify.notified();
                if self.callbacks() >= expected {
                    return;
                }
                notified.await;
            }
        })
        .await
        .expect("hooks saw the expected callbacks");
    }
}

impl ReceiveHooks for RecordingHooks {
    fn is_address_blocked(&self, address: &str) -> bool {
        assert!(!self.panic_on_screen, "scripted screening panic");
        self.blocked.contains(address)
    }

    fn on_message_received(&self, id: &MessageId) {
        assert!(!self.panic_on_received, "scripted hook panic");
        self.received.lock().unwrap().push(id.clone());
        self.notify.notify_waiters();
    }

    fn on_error(&self, error: &ReceiveError) {
        self.errors.lock().unwrap().push(error.to_string());
        self.notify.notify_waiters();
    }

    fn relay_credentials(&self, _subscription: SubscriptionId) -> Option<RelayCredentials> {
        self.credentials.clone()
    }

    fn line_number(&self, _subscription: SubscriptionId) -> Option<String> {
        self.line_number.clone()
    }
}

/// Collects submitted acknowledgment tasks instead of sending them
#[derive(Debug, Default)]
pub struct RecordingSubmitter {
    pub tasks: Mutex<Vec<AckTask>>,
}

impl RecordingSubmitter {
    pub fn tasks(&self) -> Vec<AckTask> {
        self.tasks.lock().unwrap().clone()
    }
}

impl AckSubmitter for RecordingSubmitter {
    fn submit(&self, tasks: Vec<AckTask>) {
        self.tasks.lock().unwrap().extend(tasks);
    }
}

/// Records every post and answers 200
#[derive(Debug, Default)]
pub struct RecordingTransport {
    pub requests: Mutex<Vec<HttpRequest>>,
    notify: Notify,
}

impl RecordingTransport {
    pub fn bodies(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| String::from_utf8_lossy(&r.body).to_string())
            .collect()
    }

    pub async fn wait_for_requests(&self, expected: usize) {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                let notified = self.notify.notified();
                if self.requests.lock().unwrap().len() >= expected {
                    return;
                }
                notified.await;
            }
        })
        .await
        .expect("transport saw the expected requests");
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn post(&self, request: HttpRequest) -> Result<TransportResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        self.notify.notify_waiters();
        Ok(TransportResponse {
            status: 200,
            body: Vec::new(),
        })
    }
}

pub fn proxied_credentials() -> RelayCredentials {
    RelayCredentials {
        mmsc_url: RELAY_URL.to_string(),
        proxy: Some(ProxyAddress::new("10.0.0.1", 8080)),
    }
}

pub fn notification(location: &str, transaction_id: &str) -> NotificationInd {
    NotificationInd {
        transaction_id: transaction_id.to_string(),
        content_location: location.to_string(),
        from: None,
        message_size: Some(2048),
    }
}

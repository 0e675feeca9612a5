//! Test doubles for the acknowledgment lane
#![allow(dead_code)] // Test utility module - not all helpers used in every test

use std::{
    collections::VecDeque,
    net::SocketAddr,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use mmsrx_ack::{
    CredentialSource, HttpRequest, ProxyAddress, RelayCredentials, Transport, TransportError,
    TransportResponse,
};
use mmsrx_common::{CodecError, OutboundPdu, Pdu, PduCodec, SubscriptionId};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
    sync::Notify,
};

pub const RELAY_URL: &str = "http://mmsc.carrier.example/mms";

/// Encodes acknowledgment PDUs as readable text
#[derive(Debug, Default)]
pub struct TextCodec {
    pub fail_compose: bool,
}

impl PduCodec for TextCodec {
    fn parse(&self, _data: &[u8]) -> Result<Pdu, CodecError> {
        Err(CodecError::Other("parse not scripted".to_string()))
    }

    fn compose(&self, pdu: &OutboundPdu) -> Result<Vec<u8>, CodecError> {
        if self.fail_compose {
            return Err(CodecError::InvalidHeader {
                field: "transaction-id",
                reason: "scripted failure".to_string(),
            });
        }

        Ok(match pdu {
            OutboundPdu::NotifyResp(resp) => format!("notifyresp:{}", resp.transaction_id),
            OutboundPdu::Acknowledge(ack) => format!("ack:{}:{}", ack.transaction_id, ack.from),
        }
        .into_bytes())
    }
}

/// Fixed carrier settings for every subscription
pub struct StaticCredentials(pub Option<RelayCredentials>);

impl StaticCredentials {
    pub fn proxied() -> Self {
        Self(Some(RelayCredentials {
            mmsc_url: RELAY_URL.to_string(),
            proxy: Some(ProxyAddress::new("10.0.0.1", 8080)),
        }))
    }

    pub fn without_proxy() -> Self {
        Self(Some(RelayCredentials {
            mmsc_url: RELAY_URL.to_string(),
            proxy: None,
        }))
    }
}

impl CredentialSource for StaticCredentials {
    fn relay_credentials(&self, _: SubscriptionId) -> Option<RelayCredentials> {
        self.0.clone()
    }
}

/// Records every post and answers from a script (default 200)
#[derive(Debug, Default)]
pub struct RecordingTransport {
    pub requests: Mutex<Vec<HttpRequest>>,
    pub statuses: Mutex<VecDeque<Result<u16, String>>>,
    pub delay: Option<Duration>,
    pub in_flight: Mutex<usize>,
    pub max_in_flight: Mutex<usize>,
    pub notify: Notify,
}

impl RecordingTransport {
    pub fn with_statuses(statuses: impl IntoIterator<Item = Result<u16, String>>) -> Self {
        Self {
            statuses: Mutex::new(statuses.into_iter().collect()),
            ..Default::default()
        }
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
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
        {
            let mut in_flight = self.in_flight.lock().unwrap();
            *in_flight += 1;
            let mut max = self.max_in_flight.lock().unwrap();
            *max = (*max).max(*in_flight);
        }

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        *self.in_flight.lock().unwrap() -= 1;
        self.requests.lock().unwrap().push(request);
        self.notify.notify_waiters();

        match self.statuses.lock().unwrap().pop_front().unwrap_or(Ok(200)) {
            Ok(status) => Ok(TransportResponse {
                status,
                body: Vec::new(),
            }),
            Err(e) => Err(TransportError::Connection(e)),
        }
    }
}

/// A captured HTTP request as seen on the wire
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub head: String,
    pub body: Vec<u8>,
}

/// Minimal HTTP relay answering every request with a fixed status
pub struct MockRelay {
    addr: SocketAddr,
    pub captured: Arc<Mutex<Vec<CapturedRequest>>>,
}

impl MockRelay {
    pub async fn start(status: u16) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let captured = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&captured);
        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let sink = Arc::clone(&sink);
                tokio::spawn(async move {
                    let mut buf = Vec::new();
                    let mut chunk = [0u8; 1024];
                    let (head, body_start) = loop {
                        let n = stream.read(&mut chunk).await.unwrap();
                        if n == 0 {
                            return;
                        }
                        buf.extend_from_slice(&chunk[..n]);
                        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                            break (String::from_utf8_lossy(&buf[..pos]).to_string(), pos + 4);
                        }
                    };

                    let length = head
                        .lines()
                        .find_map(|line| {
                            let (name, value) = line.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);

                    while buf.len() < body_start + length {
                        let n = stream.read(&mut chunk).await.unwrap();
                        if n == 0 {
                            break;
                        }
                        buf.extend_from_slice(&chunk[..n]);
                    }

                    sink.lock().unwrap().push(CapturedRequest {
                        head,
                        body: buf[body_start..].to_vec(),
                    });

                    let response = format!(
                        "HTTP/1.1 {status} Status\r\ncontent-length: 0\r\nconnection: close\r\n\r\n"
                    );
                    let _ = stream.write_all(response.as_bytes()).await;
                    let _ = stream.shutdown().await;
                });
            }
        });

        Self { addr, captured }
    }

    pub fn url(&self) -> String {
        format!("http://{}/mms", self.addr)
    }

    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.captured.lock().unwrap().clone()
    }
}

pub fn shared<T>(value: T) -> Arc<T> {
    Arc::new(value)
}

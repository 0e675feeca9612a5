//! HTTP transport used to post acknowledgment PDUs

use std::{fmt, time::Duration};

use async_trait::async_trait;
use dashmap::DashMap;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, HeaderMap, HeaderValue};

use crate::{config::HttpTimeouts, error::TransportError, route::ProxyAddress};

/// Content type of binary-encoded MMS PDUs
pub const MMS_CONTENT_TYPE: &str = "application/vnd.wap.mms-message";

const ACCEPT_VALUE: &str = "*/*, application/vnd.wap.mms-message, application/vnd.wap.sic";

/// A single POST to the relay
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub body: Vec<u8>,
    /// Send through this proxy instead of connecting directly
    pub proxy: Option<ProxyAddress>,
}

/// What the relay answered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl TransportResponse {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status < 400
    }
}

/// The HTTP primitive acknowledgment sends go through
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    /// POST `request.body` to `request.url`
    ///
    /// Any HTTP status is a successful return; only failures to get a response are
    /// errors.
    ///
    /// # Errors
    /// If the request cannot be built, sent, or answered in time
    async fn post(&self, request: HttpRequest) -> Result<TransportResponse, TransportError>;
}

/// [`Transport`] backed by `reqwest`
///
/// One client is built per distinct proxy and reused for later sends.
#[derive(Debug)]
pub struct HttpTransport {
    timeouts: HttpTimeouts,
    clients: DashMap<Option<ProxyAddress>, reqwest::Client>,
}

impl HttpTransport {
    #[must_use]
    pub fn new(timeouts: HttpTimeouts) -> Self {
        Self {
            timeouts,
            clients: DashMap::new(),
        }
    }

    fn client_for(&self, proxy: Option<&ProxyAddress>) -> Result<reqwest::Client, TransportError> {
        let key = proxy.cloned();
        if let Some(client) = self.clients.get(&key) {
            return Ok(client.clone());
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_VALUE));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US, en"));

        let mut builder = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(self.timeouts.connect_timeout_secs))
            .timeout(Duration::from_secs(self.timeouts.request_timeout_secs))
            .user_agent(self.timeouts.user_agent.clone())
            .default_headers(headers);

        builder = match proxy {
            Some(proxy) => builder.proxy(
                reqwest::Proxy::all(proxy.url()).map_err(|e| TransportError::Client(e.to_string()))?,
            ),
            None => builder.no_proxy(),
        };

        let client = builder.build()?;
        self.clients.insert(key, client.clone());
        Ok(client)
    }

    /// Number of distinct clients built so far
    #[must_use]
    pub fn cached_clients(&self) -> usize {
        self.clients.len()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(&self, request: HttpRequest) -> Result<TransportResponse, TransportError> {
        let client = self.client_for(request.proxy.as_ref())?;

        tracing::debug!(
            url = %request.url,
            proxy = ?request.proxy,
            size = request.body.len(),
            "Posting PDU"
        );

        let response = client
            .post(&request.url)
            .header(CONTENT_TYPE, MMS_CONTENT_TYPE)
            .body(request.body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();

        Ok(TransportResponse { status, body })
    }
}

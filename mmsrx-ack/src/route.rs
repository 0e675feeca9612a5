//! Route selection for acknowledgment sends
//!
//! Carrier settings name the relay URL and, usually, an HTTP proxy that must be used
//! on the carrier data network. When the device prefers another data path (Wi-Fi) the
//! proxy is bypassed and the relay is contacted directly.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use mmsrx_common::SubscriptionId;
use serde::{Deserialize, Serialize};

use crate::error::RouteError;

/// An HTTP proxy in front of the relay
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProxyAddress {
    pub host: String,
    pub port: u16,
}

impl ProxyAddress {
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// The proxy as a URL `reqwest` understands
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl fmt::Display for ProxyAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Carrier settings for reaching the relay from one subscription
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelayCredentials {
    pub mmsc_url: String,
    #[serde(default)]
    pub proxy: Option<ProxyAddress>,
}

/// Connection parameters for a single send
///
/// Resolved once per attempt and never reused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteParameters {
    pub relay_url: String,
    pub proxy_host: Option<String>,
    pub proxy_port: Option<u16>,
    pub direct: bool,
}

impl RouteParameters {
    /// The proxy to send through, if this route uses one
    #[must_use]
    pub fn proxy(&self) -> Option<ProxyAddress> {
        if self.direct {
            return None;
        }

        match (&self.proxy_host, self.proxy_port) {
            (Some(host), Some(port)) => Some(ProxyAddress::new(host.clone(), port)),
            _ => None,
        }
    }
}

/// Lookup of carrier settings per subscription
pub trait CredentialSource: Send + Sync {
    /// Carrier settings for `subscription`, if any are configured
    fn relay_credentials(&self, subscription: SubscriptionId) -> Option<RelayCredentials>;
}

/// The device's current network situation
#[async_trait]
pub trait NetworkPolicy: Send + Sync + fmt::Debug {
    /// Whether sends should bypass the carrier proxy
    fn prefers_direct_path(&self) -> bool;

    /// Make sure traffic for the relay can reach `proxy`
    ///
    /// # Errors
    /// If the network layer cannot provide a route
    async fn ensure_route_to_host(
        &self,
        relay_url: &str,
        proxy: &ProxyAddress,
    ) -> Result<(), RouteError>;
}

/// A [`NetworkPolicy`] with a fixed preference and no route management
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticNetworkPolicy {
    prefer_direct: bool,
}

impl StaticNetworkPolicy {
    #[must_use]
    pub const fn new(prefer_direct: bool) -> Self {
        Self { prefer_direct }
    }
}

#[async_trait]
impl NetworkPolicy for StaticNetworkPolicy {
    fn prefers_direct_path(&self) -> bool {
        self.prefer_direct
    }

    async fn ensure_route_to_host(
        &self,
        relay_url: &str,
        proxy: &ProxyAddress,
    ) -> Result<(), RouteError> {
        tracing::trace!(relay_url, %proxy, "Route to proxy assumed available");
        Ok(())
    }
}

/// Resolves [`RouteParameters`] for a subscription
#[derive(Clone)]
pub struct RouteResolver {
    credentials: Arc<dyn CredentialSource>,
    policy: Arc<dyn NetworkPolicy>,
}

impl fmt::Debug for RouteResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteResolver")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl RouteResolver {
    #[must_use]
    pub fn new(credentials: Arc<dyn CredentialSource>, policy: Arc<dyn NetworkPolicy>) -> Self {
        Self {
            credentials,
            policy,
        }
    }

    /// Resolve the route for one send
    ///
    /// Returns `Ok(None)` when the subscription has no carrier settings, in which
    /// case no acknowledgment can be sent.
    ///
    /// # Errors
    /// - [`RouteError::InvalidRelayUrl`] if the relay URL does not parse
    /// - [`RouteError::MissingProxy`] if a proxied route is needed but none is configured
    /// - [`RouteError::RouteSetup`] if the network policy cannot reach the proxy
    pub async fn resolve(
        &self,
        subscription: SubscriptionId,
    ) -> Result<Option<RouteParameters>, RouteError> {
        let Some(credentials) = self.credentials.relay_credentials(subscription) else {
            return Ok(None);
        };

        reqwest::Url::parse(&credentials.mmsc_url).map_err(|e| RouteError::InvalidRelayUrl {
            url: credentials.mmsc_url.clone(),
            reason: e.to_string(),
        })?;

        if self.policy.prefers_direct_path() {
            return Ok(Some(RouteParameters {
                relay_url: credentials.mmsc_url,
                proxy_host: None,
                proxy_port: None,
                direct: true,
            }));
        }

        let proxy = credentials
            .proxy
            .ok_or(RouteError::MissingProxy(subscription))?;

        self.policy
            .ensure_route_to_host(&credentials.mmsc_url, &proxy)
            .await?;

        Ok(Some(RouteParameters {
            relay_url: credentials.mmsc_url,
            proxy_host: Some(proxy.host),
            proxy_port: Some(proxy.port),
            direct: false,
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use pretty_assertions::assert_eq;

    use super::*;

    struct Fixed(Option<RelayCredentials>);

    impl CredentialSource for Fixed {
        fn relay_credentials(&self, _: SubscriptionId) -> Option<RelayCredentials> {
            self.0.clone()
        }
    }

    #[derive(Debug, Default)]
    struct RecordingPolicy {
        direct: bool,
        refuse: bool,
        routed: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl NetworkPolicy for RecordingPolicy {
        fn prefers_direct_path(&self) -> bool {
            self.direct
        }

        async fn ensure_route_to_host(
            &self,
            _relay_url: &str,
            proxy: &ProxyAddress,
        ) -> Result<(), RouteError> {
            if self.refuse {
                return Err(RouteError::RouteSetup {
                    host: proxy.host.clone(),
                    reason: "no carrier data".to_string(),
                });
            }
            self.routed.lock().unwrap().push(proxy.host.clone());
            Ok(())
        }
    }

    fn credentials(proxy: Option<ProxyAddress>) -> Option<RelayCredentials> {
        Some(RelayCredentials {
            mmsc_url: "http://mmsc.carrier.example/mms".to_string(),
            proxy,
        })
    }

    fn resolver(creds: Option<RelayCredentials>, policy: Arc<RecordingPolicy>) -> RouteResolver {
        RouteResolver::new(Arc::new(Fixed(creds)), policy)
    }

    #[tokio::test]
    async fn test_no_credentials() {
        let resolver = resolver(None, Arc::default());
        assert_eq!(resolver.resolve(SubscriptionId::DEFAULT).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_direct_path() {
        let policy = Arc::new(RecordingPolicy {
            direct: true,
            ..Default::default()
        });
        let resolver = resolver(
            credentials(Some(ProxyAddress::new("10.0.0.1", 8080))),
            Arc::clone(&policy),
        );

        let route = resolver.resolve(SubscriptionId::DEFAULT).await.unwrap().unwrap();
        assert!(route.direct);
        assert_eq!(route.proxy(), None);
        assert_eq!(route.proxy_host, None);
        assert!(policy.routed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_proxied_path() {
        let policy = Arc::new(RecordingPolicy::default());
        let resolver = resolver(
            credentials(Some(ProxyAddress::new("10.0.0.1", 8080))),
            Arc::clone(&policy),
        );

        let route = resolver.resolve(SubscriptionId::DEFAULT).await.unwrap().unwrap();
        assert_eq!(
            route,
            RouteParameters {
                relay_url: "http://mmsc.carrier.example/mms".to_string(),
                proxy_host: Some("10.0.0.1".to_string()),
                proxy_port: Some(8080),
                direct: false,
            }
        );
        assert_eq!(route.proxy(), Some(ProxyAddress::new("10.0.0.1", 8080)));
        assert_eq!(*policy.routed.lock().unwrap(), vec!["10.0.0.1".to_string()]);
    }

    #[tokio::test]
    async fn test_missing_proxy_fails_closed() {
        let resolver = resolver(credentials(None), Arc::default());
        let err = resolver.resolve(SubscriptionId(3)).await.unwrap_err();
        assert!(matches!(err, RouteError::MissingProxy(SubscriptionId(3))));
    }

    #[tokio::test]
    async fn test_route_setup_refused() {
        let policy = Arc::new(RecordingPolicy {
            refuse: true,
            ..Default::default()
        });
        let resolver = resolver(credentials(Some(ProxyAddress::new("10.0.0.1", 80))), policy);
        let err = resolver.resolve(SubscriptionId::DEFAULT).await.unwrap_err();
        assert!(matches!(err, RouteError::RouteSetup { .. }));
    }

    #[tokio::test]
    async fn test_invalid_relay_url() {
        let resolver = resolver(
            Some(RelayCredentials {
                mmsc_url: "not a url".to_string(),
                proxy: None,
            }),
            Arc::default(),
        );
        let err = resolver.resolve(SubscriptionId::DEFAULT).await.unwrap_err();
        assert!(matches!(err, RouteError::InvalidRelayUrl { .. }));
    }
}

use serde::{Deserialize, Serialize};

const fn default_connect_timeout() -> u64 {
    30
}

const fn default_request_timeout() -> u64 {
    60
}

fn default_user_agent() -> String {
    format!("mmsrx/{}", env!("CARGO_PKG_VERSION"))
}

/// HTTP timeouts and identity for acknowledgment sends
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpTimeouts {
    /// Time allowed to establish a connection (in seconds)
    ///
    /// Default: 30 seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Time allowed for the whole request, including the response (in seconds)
    ///
    /// Default: 60 seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// `User-Agent` header sent to the relay
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout(),
            request_timeout_secs: default_request_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Acknowledgment behaviour
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AckConfig {
    /// Post acknowledgments to the notification's content location rather than the
    /// relay URL from the carrier settings
    #[serde(default)]
    pub notify_wap_mmsc: bool,

    /// Send over the direct data path instead of through the carrier proxy
    #[serde(default)]
    pub prefer_direct_path: bool,

    #[serde(default)]
    pub http: HttpTimeouts,
}

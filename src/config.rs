use std::path::{Path, PathBuf};

use mmsrx_ack::AckConfig;
use mmsrx_common::{SubscriptionId, audit::AuditConfig};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const CONFIG_ENV: &str = "MMSRX_CONFIG";

/// Receiver configuration, usually loaded from `mmsrx.config.ron`
///
/// ```ron
/// Mmsrx (
///     default_subscription: 1,
///     max_concurrent_workflows: 8,
///     acknowledgment: (
///         notify_wap_mmsc: false,
///         prefer_direct_path: false,
///         http: (connect_timeout_secs: 30, request_timeout_secs: 60),
///     ),
///     audit: (enabled: true, redact_sender: true),
/// )
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "Mmsrx")]
pub struct Config {
    /// Subscription used when an event does not name one
    #[serde(default)]
    pub default_subscription: SubscriptionId,

    /// Upper bound on concurrently running workflows
    ///
    /// Default: None (one task per event, unbounded)
    #[serde(default)]
    pub max_concurrent_workflows: Option<usize>,

    #[serde(default)]
    pub acknowledgment: AckConfig,

    #[serde(default)]
    pub audit: AuditConfig,
}

impl Config {
    /// Load the configuration from the first file found
    ///
    /// # Errors
    /// If no file is found, or the one found cannot be read or parsed
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_path(&find_config_file()?)
    }

    /// Load the configuration from `path`
    ///
    /// # Errors
    /// If the file cannot be read or parsed
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::parse(&content)
    }

    /// Parse a RON configuration, with implicit `Some` for optional fields
    ///
    /// # Errors
    /// If the content is not a valid configuration
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(ron::Options::default()
            .with_default_extension(ron::extensions::Extensions::IMPLICIT_SOME)
            .from_str(content)?)
    }
}

/// Find the configuration file using the following precedence:
/// 1. `MMSRX_CONFIG` environment variable
/// 2. ./mmsrx.config.ron (current working directory)
/// 3. /etc/mmsrx/mmsrx.config.ron (system-wide config)
///
/// # Errors
/// If `MMSRX_CONFIG` names a missing file, or no default location has one
pub fn find_config_file() -> Result<PathBuf, ConfigError> {
    if let Ok(env_path) = std::env::var(CONFIG_ENV) {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::MissingOverride(path));
    }

    let default_paths = [
        PathBuf::from("./mmsrx.config.ron"),
        PathBuf::from("/etc/mmsrx/mmsrx.config.ron"),
    ];

    if let Some(path) = default_paths.iter().find(|path| path.exists()) {
        return Ok(path.clone());
    }

    let tried = default_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::NotFound { tried })
}

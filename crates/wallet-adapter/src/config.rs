//! # Adapter Configuration
//!
//! Connect-time settings: who is asking (dapp metadata), which chain, which
//! protocol shape, and how long to wait for the agent to show up.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;
use wallet_types::DappMetadata;

use crate::domain::{ChainSelector, ProtocolVersion};

/// Default agent lookup timeout.
pub const DEFAULT_LOOKUP_TIMEOUT_MS: u64 = 1000;

/// Default capacity of the adapter's notification channel.
pub const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 64;

/// Adapter configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    /// Metadata shown in the approval prompt.
    pub dapp: DappMetadata,

    /// Chain to open the session for.
    pub chain: ChainSelector,

    /// How long to wait for the agent to be found.
    pub lookup_timeout_ms: u64,

    /// Protocol shape the agent speaks.
    pub protocol: ProtocolVersion,

    /// Buffered notifications per adapter subscriber.
    pub event_channel_capacity: usize,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            dapp: DappMetadata::default(),
            chain: ChainSelector::default(),
            lookup_timeout_ms: DEFAULT_LOOKUP_TIMEOUT_MS,
            protocol: ProtocolVersion::default(),
            event_channel_capacity: DEFAULT_EVENT_CHANNEL_CAPACITY,
        }
    }
}

impl AdapterConfig {
    /// Create a config for testing (short timeout, named dapp).
    pub fn for_testing() -> Self {
        Self {
            dapp: DappMetadata::named("wallet-adapter-test"),
            lookup_timeout_ms: 200,
            event_channel_capacity: 16,
            ..Self::default()
        }
    }

    /// Defaults overlaid with `WALLET_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with values from `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(chain) = lookup("WALLET_CHAIN") {
            config.chain = ChainSelector::parse(&chain);
        }
        if let Some(timeout) = lookup("WALLET_LOOKUP_TIMEOUT_MS") {
            config.lookup_timeout_ms = timeout
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidTimeout(format!("not a number: {timeout}")))?;
        }
        if let Some(protocol) = lookup("WALLET_PROTOCOL") {
            config.protocol = match protocol.trim() {
                "account-bound" => ProtocolVersion::AccountBound,
                "chain-bound" => ProtocolVersion::ChainBound,
                other => return Err(ConfigError::Invalid(format!("unknown protocol: {other}"))),
            };
        }
        if let Some(name) = lookup("WALLET_DAPP_NAME") {
            config.dapp.name = Some(name);
        }
        if let Some(url) = lookup("WALLET_DAPP_URL") {
            config.dapp.url = Some(url);
        }
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lookup_timeout_ms == 0 {
            return Err(ConfigError::InvalidTimeout(
                "lookup_timeout_ms cannot be 0".into(),
            ));
        }

        if self.chain.chain_id().is_empty() {
            return Err(ConfigError::InvalidChain("chain id cannot be empty".into()));
        }

        if self.event_channel_capacity == 0 {
            return Err(ConfigError::Invalid(
                "event_channel_capacity cannot be 0".into(),
            ));
        }

        if let Some(url) = &self.dapp.url {
            Url::parse(url).map_err(|e| ConfigError::InvalidUrl(format!("{url}: {e}")))?;
        }

        Ok(())
    }

    /// Agent lookup timeout.
    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.lookup_timeout_ms)
    }

    /// Dapp metadata with the name filled in: the configured name, else the
    /// host of the dapp url, else the crate name.
    pub fn resolved_metadata(&self) -> DappMetadata {
        let name = self.dapp.name.clone().or_else(|| {
            self.dapp
                .url
                .as_deref()
                .and_then(|url| Url::parse(url).ok())
                .and_then(|url| url.host_str().map(str::to_string))
        });
        DappMetadata {
            name: Some(name.unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string())),
            ..self.dapp.clone()
        }
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Invalid timeout value
    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),
    /// Invalid chain selector
    #[error("invalid chain: {0}")]
    InvalidChain(String),
    /// Dapp url does not parse
    #[error("invalid dapp url: {0}")]
    InvalidUrl(String),
    /// General configuration error
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

//! # Wallet Telemetry
//!
//! Structured logging for the wallet adapter and the applications that embed
//! it. The adapter only emits `tracing` events; this crate installs the
//! subscriber that formats them.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use wallet_telemetry::{init_logging, TelemetryConfig};
//!
//! let config = TelemetryConfig::from_env();
//! init_logging(&config).expect("Failed to init logging");
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `OTEL_SERVICE_NAME` | `aztec-wallet-adapter` | Service name attached to logs |
//! | `WALLET_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `WALLET_JSON_LOGS` | `false` | Emit JSON lines instead of text |

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::{init_logging, init_test_logging};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// The log filter directive could not be parsed.
    #[error("Invalid log filter: {0}")]
    Filter(String),

    /// A global subscriber is already installed.
    #[error("Failed to install subscriber: {0}")]
    Install(String),
}

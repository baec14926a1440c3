//! Telemetry configuration from environment variables.

use std::env;

/// Configuration for log output.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name attached to every log line
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error or a full directive)
    pub log_level: String,

    /// Whether to emit JSON formatted logs
    pub json_logs: bool,

    /// Whether to include source file and line in each record
    pub with_source_location: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "aztec-wallet-adapter".to_string(),
            log_level: "info".to_string(),
            json_logs: false,
            with_source_location: false,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `OTEL_SERVICE_NAME`: Service name (default: aztec-wallet-adapter)
    /// - `WALLET_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `WALLET_JSON_LOGS`: Enable JSON logs (default: false)
    /// - `WALLET_LOG_SOURCE`: Include file/line (default: false)
    pub fn from_env() -> Self {
        Self {
            service_name: env::var("OTEL_SERVICE_NAME")
                .unwrap_or_else(|_| "aztec-wallet-adapter".to_string()),

            log_level: env::var("WALLET_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or_else(|_| "info".to_string()),

            json_logs: env::var("WALLET_JSON_LOGS")
                .map(|v| parse_flag(&v))
                .unwrap_or(false),

            with_source_location: env::var("WALLET_LOG_SOURCE")
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
        }
    }

    /// Configuration for test runs: verbose, plain text.
    pub fn for_testing() -> Self {
        Self {
            service_name: "aztec-wallet-adapter-tests".to_string(),
            log_level: "debug".to_string(),
            json_logs: false,
            with_source_location: true,
        }
    }
}

fn parse_flag(value: &str) -> bool {
    value.eq_ignore_ascii_case("true") || value == "1"
}

//! Adapter error types with JSON-RPC style error codes.
//!
//! Codes follow the JSON-RPC 2.0 ranges plus the EIP-1193 provider codes
//! wallets already report for user rejection and disconnection.

use thiserror::Error;
use wallet_types::SchemaError;

use crate::config::ConfigError;

/// Error codes reported by [`WalletError::code`].
pub mod codes {
    // JSON-RPC 2.0 standard errors
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;

    // Server errors (-32000 to -32099)
    pub const RESOURCE_UNAVAILABLE: i32 = -32002;
    pub const EXECUTION_ERROR: i32 = -32015;

    // Provider errors (EIP-1193)
    pub const USER_REJECTED: i32 = 4001;
    pub const UNAUTHORIZED: i32 = 4100;
    pub const UNSUPPORTED_METHOD: i32 = 4200;
    pub const DISCONNECTED: i32 = 4900;
}

/// Errors surfaced to the application by the adapter.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WalletError {
    /// The agent could not be found, reached, or the user declined.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// The one-time identity fetch after connecting did not succeed.
    #[error("Session initialization failed: {0}")]
    Initialization(String),

    /// No session account matches the requested authorizing address.
    #[error("Account {address} is not authorized in this session")]
    UnauthorizedAccount {
        /// The address the caller asked to act as.
        address: String,
    },

    /// The agent reported the operation as failed.
    #[error("{method} failed: {message}")]
    OperationFailed {
        /// Method name (`sendTx`, ...).
        method: String,
        /// Message reported by the agent.
        message: String,
    },

    /// The agent skipped the operation (user dismissed it).
    #[error("{method} was skipped by the wallet")]
    OperationSkipped {
        /// Method name.
        method: String,
    },

    /// The agent's result did not match the method's schema.
    #[error("Invalid {method} payload: {source}")]
    Validation {
        /// Method name.
        method: String,
        /// Schema failure.
        source: SchemaError,
    },

    /// The method is not available through this adapter.
    #[error("Unsupported method: {0}")]
    UnsupportedMethod(String),

    /// A cached identity fact was read while no session was live.
    #[error("Wallet was disconnected by the user")]
    StaleIdentity,

    /// The agent transport failed or answered out of protocol.
    #[error("Agent transport error: {0}")]
    Transport(String),

    /// The adapter configuration was rejected.
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

impl WalletError {
    /// Schema failure for `method`.
    pub fn validation(method: impl Into<String>, source: SchemaError) -> Self {
        Self::Validation {
            method: method.into(),
            source,
        }
    }

    /// Error code for this error.
    #[must_use]
    pub fn code(&self) -> i32 {
        match self {
            Self::Connection(_) | Self::StaleIdentity => codes::DISCONNECTED,
            Self::Initialization(_) => codes::INTERNAL_ERROR,
            Self::UnauthorizedAccount { .. } => codes::UNAUTHORIZED,
            Self::OperationFailed { .. } => codes::EXECUTION_ERROR,
            Self::OperationSkipped { .. } => codes::USER_REJECTED,
            Self::Validation { .. } => codes::INTERNAL_ERROR,
            Self::UnsupportedMethod(_) => codes::UNSUPPORTED_METHOD,
            Self::Transport(_) => codes::RESOURCE_UNAVAILABLE,
            Self::Config(_) => codes::INVALID_PARAMS,
        }
    }

    /// Whether the error means the session is gone and the next call will
    /// reconnect.
    #[must_use]
    pub fn is_session_error(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::StaleIdentity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(WalletError::StaleIdentity.code(), codes::DISCONNECTED);
        assert_eq!(
            WalletError::UnsupportedMethod("foo".into()).code(),
            codes::UNSUPPORTED_METHOD
        );
        assert_eq!(
            WalletError::OperationSkipped {
                method: "sendTx".into()
            }
            .code(),
            codes::USER_REJECTED
        );
    }

    #[test]
    fn test_operation_failed_names_method() {
        let err = WalletError::OperationFailed {
            method: "sendTx".into(),
            message: "insufficient fee".into(),
        };
        assert_eq!(err.to_string(), "sendTx failed: insufficient fee");
    }

    #[test]
    fn test_stale_identity_message() {
        assert_eq!(
            WalletError::StaleIdentity.to_string(),
            "Wallet was disconnected by the user"
        );
        assert!(WalletError::StaleIdentity.is_session_error());
    }

    #[test]
    fn test_validation_wraps_schema_error() {
        let err = WalletError::validation("getChainInfo", SchemaError::Malformed("x".into()));
        assert!(err.to_string().starts_with("Invalid getChainInfo payload"));
        assert_eq!(err.code(), codes::INTERNAL_ERROR);
    }
}

//! # Wallet Adapter
//!
//! A typed Wallet that delegates every operation to an out-of-process
//! signing agent over a permissioned, session-oriented channel.
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! Make a remote, user-revocable signer look like a local Wallet:
//! - Open a permissioned session on demand and reopen it after the user
//!   disconnects
//! - Keep cached identity consistent with the agent's account and
//!   permission notifications
//! - Map every Wallet call (single or batched) onto a validated
//!   request/response exchange
//!
//! ## Protocol Shapes
//!
//! | Shape | Scope of reads | Identity cache | accounts-changed |
//! |-------|----------------|----------------|------------------|
//! | `AccountBound` | session account | yes | disconnect if cached account gone |
//! | `ChainBound` | session chain | no | always disconnect |
//!
//! Authorizing calls (`sendTx`, `simulateTx`, `profileTx`, `createAuthWit`)
//! are always scoped to the session account whose identifier ends with the
//! call's `from` address.
//!
//! ## Module Structure
//!
//! ```text
//! wallet-adapter/
//! ├── domain/          # Method tables, operations/results, session state, errors
//! ├── ports/           # Wallet trait (inbound) + agent client traits (outbound)
//! ├── application/     # SessionManager, dispatchers, WalletAdapter
//! └── config.rs        # AdapterConfig
//! ```

pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

// Re-exports
pub use application::{
    BatchDispatcher, MethodCall, MethodResult, NamedCall, OperationDispatcher, SessionManager,
    WalletAdapter,
};
pub use config::{AdapterConfig, ConfigError};
pub use domain::{
    codes, ChainSelector, MethodKind, Operation, OperationResult, ProtocolVersion, Scope,
    SessionIdentity, SessionStats, SessionStatsSnapshot, WalletError, BATCHABLE_METHODS,
    IDENTITY_METHODS, SANDBOX_CHAIN_ID, TESTNET_CHAIN_ID,
};
pub use ports::{AgentClient, AgentConnector, AgentError, MockAgent, MockConnector, Wallet};

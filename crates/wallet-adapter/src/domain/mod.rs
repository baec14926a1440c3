//! Domain layer: method tables, wire model, session state and errors.

pub mod chain;
pub mod errors;
pub mod methods;
pub mod operation;
pub mod session;

pub use chain::{ChainSelector, SANDBOX_CHAIN_ID, TESTNET_CHAIN_ID};
pub use errors::{codes, WalletError};
pub use methods::{MethodKind, ProtocolVersion, BATCHABLE_METHODS, IDENTITY_METHODS};
pub use operation::{Operation, OperationResult, Scope};
pub use session::{SessionIdentity, SessionStats, SessionStatsSnapshot};

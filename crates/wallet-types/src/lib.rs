//! # Wallet Types Crate
//!
//! Ledger-domain values exchanged with the signing agent, plus the schema
//! layer that checks a raw agent payload before it is handed back to the
//! application.
//!
//! ## Design Principles
//!
//! - **Opaque pass-through**: addresses, payloads, artifacts and proofs are
//!   carried as validated serde values. Nothing here understands ledger
//!   semantics.
//! - **Validate on the way in**: every type an agent can return implements
//!   [`Schema`], so a malformed payload is rejected at the adapter boundary.
//! - **Shared vocabulary**: session metadata and permission grants live here
//!   because both the event bus and the adapter speak them.

pub mod entities;
pub mod errors;
pub mod schema;
pub mod session;

pub use entities::*;
pub use errors::SchemaError;
pub use schema::{parse, Schema};
pub use session::{AccountId, DappMetadata, PermissionGrant, PermissionRequest};

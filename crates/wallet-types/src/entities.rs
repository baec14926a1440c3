//! # Ledger Domain Values
//!
//! Wire values the adapter passes between the application and the agent.
//!
//! ## Clusters
//!
//! - **Identifiers**: `AztecAddress`, `Fr`, `TxHash` (0x-prefixed 32-byte hex)
//! - **Identity & chain**: `CompleteAddress`, `ChainInfo`, `Aliased<T>`
//! - **Contracts**: `ContractInstanceWithAddress`, `ContractArtifact`,
//!   `ContractMetadata`, `ContractClassMetadata`
//! - **Transactions**: `ExecutionPayload`, `FunctionCall`, the option structs,
//!   and the simulation/profile/receipt results
//! - **Authorization**: `AuthWitIntent`, `AuthWitness`
//!
//! Structured payloads whose internals belong to the ledger (artifacts,
//! execution payloads, proofs) are opaque JSON objects.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_with::skip_serializing_none;

use crate::errors::SchemaError;
use crate::schema::Schema;

/// Byte width of every field-sized identifier.
pub const FIELD_BYTES: usize = 32;

fn check_field_hex(field: &'static str, value: &str) -> Result<(), SchemaError> {
    let digits = value
        .strip_prefix("0x")
        .ok_or_else(|| SchemaError::invalid(field, "missing 0x prefix"))?;
    if digits.len() != FIELD_BYTES * 2 {
        return Err(SchemaError::invalid(
            field,
            format!("expected {} hex digits, got {}", FIELD_BYTES * 2, digits.len()),
        ));
    }
    hex::decode(digits).map_err(|e| SchemaError::invalid(field, e.to_string()))?;
    Ok(())
}

macro_rules! field_hex_type {
    ($(#[$meta:meta])* $name:ident, $field:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        // Hex digits are stored lowercase whichever way the value arrives.
        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                String::deserialize(deserializer).map(|raw| Self(raw.to_lowercase()))
            }
        }

        impl $name {
            /// Build from a 0x-prefixed hex string, rejecting bad formats.
            pub fn new(value: impl Into<String>) -> Result<Self, SchemaError> {
                let value = Self(value.into().to_lowercase());
                value.check()?;
                Ok(value)
            }

            /// Build from raw bytes.
            #[must_use]
            pub fn from_bytes(bytes: [u8; FIELD_BYTES]) -> Self {
                Self(format!("0x{}", hex::encode(bytes)))
            }

            /// The 0x-prefixed hex form.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Schema for $name {
            fn check(&self) -> Result<(), SchemaError> {
                check_field_hex($field, &self.0)
            }
        }

        impl FromStr for $name {
            type Err = SchemaError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

macro_rules! opaque_object_type {
    ($(#[$meta:meta])* $name:ident, $field:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Value);

        impl $name {
            /// The underlying JSON payload.
            #[must_use]
            pub fn as_value(&self) -> &Value {
                &self.0
            }
        }

        impl Schema for $name {
            fn check(&self) -> Result<(), SchemaError> {
                if self.0.is_object() {
                    Ok(())
                } else {
                    Err(SchemaError::invalid($field, "expected a JSON object"))
                }
            }
        }
    };
}

// =============================================================================
// IDENTIFIERS
// =============================================================================

field_hex_type!(
    /// An account or contract address.
    AztecAddress,
    "address"
);

field_hex_type!(
    /// A field element (chain id, version, class id, secret key, hash).
    Fr,
    "field element"
);

field_hex_type!(
    /// A transaction hash.
    TxHash,
    "tx hash"
);

// =============================================================================
// IDENTITY & CHAIN
// =============================================================================

/// Address plus the public keys and partial address it was derived from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteAddress {
    /// The account address.
    pub address: AztecAddress,
    /// Public key set, opaque to the adapter.
    pub public_keys: Value,
    /// Partial address used in derivation.
    pub partial_address: Fr,
}

impl Schema for CompleteAddress {
    fn check(&self) -> Result<(), SchemaError> {
        self.address.check()?;
        self.partial_address.check()?;
        if !self.public_keys.is_object() {
            return Err(SchemaError::invalid("publicKeys", "expected a JSON object"));
        }
        Ok(())
    }
}

/// Chain identity reported by the agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainInfo {
    /// L1 chain id.
    pub chain_id: Fr,
    /// Rollup protocol version.
    pub version: Fr,
}

impl Schema for ChainInfo {
    fn check(&self) -> Result<(), SchemaError> {
        self.chain_id.check()?;
        self.version.check()
    }
}

/// A value with a user-facing alias (address book, account list).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aliased<T> {
    /// Display alias.
    pub alias: String,
    /// The aliased value.
    pub item: T,
}

impl<T: Schema> Schema for Aliased<T> {
    fn check(&self) -> Result<(), SchemaError> {
        self.item.check()
    }
}

// =============================================================================
// CONTRACTS
// =============================================================================

/// A deployed contract instance, keyed by its address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractInstanceWithAddress {
    /// Instance address.
    pub address: AztecAddress,
    /// Remaining instance fields (class id, salt, deployer, keys).
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Schema for ContractInstanceWithAddress {
    fn check(&self) -> Result<(), SchemaError> {
        self.address.check()
    }
}

opaque_object_type!(
    /// Compiled contract artifact.
    ContractArtifact,
    "artifact"
);

/// What the agent knows about a contract instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractMetadata {
    /// The instance, when registered with the agent.
    #[serde(default)]
    pub contract_instance: Option<ContractInstanceWithAddress>,
    /// Whether the initializer has run.
    pub is_contract_initialized: bool,
    /// Whether the instance is publicly deployed.
    pub is_contract_published: bool,
}

impl Schema for ContractMetadata {
    fn check(&self) -> Result<(), SchemaError> {
        self.contract_instance.check()
    }
}

/// What the agent knows about a contract class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractClassMetadata {
    /// The class, when known.
    #[serde(default)]
    pub contract_class: Option<Value>,
    /// Whether the class is publicly registered.
    pub is_contract_class_publicly_registered: bool,
    /// The artifact, when requested and available.
    #[serde(default)]
    pub artifact: Option<ContractArtifact>,
}

impl Schema for ContractClassMetadata {
    fn check(&self) -> Result<(), SchemaError> {
        self.artifact.check()
    }
}

// =============================================================================
// TRANSACTIONS
// =============================================================================

opaque_object_type!(
    /// Calls, auth witnesses and capsules making up one transaction.
    ExecutionPayload,
    "execution payload"
);

opaque_object_type!(
    /// A single function call (used for utility simulation).
    FunctionCall,
    "function call"
);

opaque_object_type!(
    /// Fee payment settings.
    FeeOptions,
    "fee options"
);

opaque_object_type!(
    /// Result of a transaction simulation.
    TxSimulationResult,
    "simulation result"
);

opaque_object_type!(
    /// Result of a transaction profile run.
    TxProfileResult,
    "profile result"
);

opaque_object_type!(
    /// A decoded private event.
    PrivateEvent,
    "private event"
);

/// Return value of a utility function; any JSON value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UtilitySimulationResult(pub Value);

impl Schema for UtilitySimulationResult {}

/// Options for sending a transaction.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendOptions {
    /// Authorizing account.
    pub from: AztecAddress,
    /// Fee settings, agent defaults when absent.
    #[serde(default)]
    pub fee: Option<FeeOptions>,
}

/// Options for simulating a transaction.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulateOptions {
    /// Authorizing account.
    pub from: AztecAddress,
    /// Skip transaction validation checks.
    #[serde(default)]
    pub skip_tx_validation: bool,
    /// Skip fee enforcement.
    #[serde(default)]
    pub skip_fee_enforcement: bool,
    /// Fee settings.
    #[serde(default)]
    pub fee: Option<FeeOptions>,
}

/// Profiling granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProfileMode {
    /// Gate counts and execution steps.
    Full,
    /// Execution steps only.
    ExecutionSteps,
    /// Gate counts only.
    Gates,
}

/// Options for profiling a transaction.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileOptions {
    /// Authorizing account.
    pub from: AztecAddress,
    /// What to measure.
    pub profile_mode: ProfileMode,
    /// Skip generating the proof.
    #[serde(default)]
    pub skip_proof_generation: bool,
    /// Fee settings.
    #[serde(default)]
    pub fee: Option<FeeOptions>,
}

/// Receipt of a submitted transaction.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxReceipt {
    /// Transaction hash.
    pub tx_hash: TxHash,
    /// Status label as reported by the node (`pending`, `success`, ...).
    pub status: String,
    /// Revert or drop reason.
    #[serde(default)]
    pub error: Option<String>,
    /// Block the transaction was mined in.
    #[serde(default)]
    pub block_number: Option<u64>,
}

impl Schema for TxReceipt {
    fn check(&self) -> Result<(), SchemaError> {
        self.tx_hash.check()?;
        if self.status.is_empty() {
            return Err(SchemaError::invalid("status", "empty status"));
        }
        Ok(())
    }
}

/// Query for private events emitted by a contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivateEventQuery {
    /// Emitting contract.
    pub contract_address: AztecAddress,
    /// Event selector and field layout, opaque.
    pub event_metadata: Value,
    /// First block to scan.
    pub from_block: u64,
    /// Number of blocks to scan.
    pub num_blocks: u64,
    /// Recipients whose notes are searched.
    pub recipients: Vec<AztecAddress>,
}

/// Current base fees per gas dimension, as decimal integer strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GasFees {
    /// Fee per unit of data-availability gas.
    pub fee_per_da_gas: String,
    /// Fee per unit of L2 gas.
    pub fee_per_l2_gas: String,
}

impl Schema for GasFees {
    fn check(&self) -> Result<(), SchemaError> {
        for (field, value) in [
            ("feePerDaGas", &self.fee_per_da_gas),
            ("feePerL2Gas", &self.fee_per_l2_gas),
        ] {
            if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
                return Err(SchemaError::invalid(field, "expected a decimal integer"));
            }
        }
        Ok(())
    }
}

// =============================================================================
// AUTHORIZATION
// =============================================================================

opaque_object_type!(
    /// What an auth witness authorizes: a call intent or a raw message hash.
    AuthWitIntent,
    "intent"
);

/// A witness authorizing an action on behalf of an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthWitness {
    /// Hash of the authorized request.
    pub request_hash: Fr,
    /// Witness field elements.
    pub witness: Vec<Fr>,
}

impl Schema for AuthWitness {
    fn check(&self) -> Result<(), SchemaError> {
        self.request_hash.check()?;
        self.witness.check()
    }
}

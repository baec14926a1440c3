//! Method kinds understood by the agent and the per-protocol method tables.
//!
//! The agent speaks two protocol shapes:
//!
//! - **Account-bound**: every operation is scoped to an agent account, and
//!   the account's identity (address, keys, chain id, version) is fetched
//!   once per session and cached.
//! - **Chain-bound**: no identity cache. Reads are scoped to the chain,
//!   authorizing operations to the account resolved from `from`.

use serde::{Deserialize, Serialize};

/// Operation kind, serialized as the agent's `aztec_<method>` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MethodKind {
    #[serde(rename = "aztec_getChainInfo")]
    GetChainInfo,
    #[serde(rename = "aztec_getContractMetadata")]
    GetContractMetadata,
    #[serde(rename = "aztec_getContractClassMetadata")]
    GetContractClassMetadata,
    #[serde(rename = "aztec_getTxReceipt")]
    GetTxReceipt,
    #[serde(rename = "aztec_registerSender")]
    RegisterSender,
    #[serde(rename = "aztec_getAddressBook")]
    GetAddressBook,
    #[serde(rename = "aztec_getAccounts")]
    GetAccounts,
    #[serde(rename = "aztec_registerContract")]
    RegisterContract,
    #[serde(rename = "aztec_simulateTx")]
    SimulateTx,
    #[serde(rename = "aztec_simulateUtility")]
    SimulateUtility,
    #[serde(rename = "aztec_profileTx")]
    ProfileTx,
    #[serde(rename = "aztec_sendTx")]
    SendTx,
    #[serde(rename = "aztec_createAuthWit")]
    CreateAuthWit,
    #[serde(rename = "aztec_getPrivateEvents")]
    GetPrivateEvents,
    #[serde(rename = "aztec_getCurrentBaseFees")]
    GetCurrentBaseFees,
    #[serde(rename = "aztec_getAddress")]
    GetAddress,
    #[serde(rename = "aztec_getCompleteAddress")]
    GetCompleteAddress,
    #[serde(rename = "aztec_getChainId")]
    GetChainId,
    #[serde(rename = "aztec_getVersion")]
    GetVersion,
}

/// Kinds reachable through the Wallet interface and batches.
pub const BATCHABLE_METHODS: [MethodKind; 15] = [
    MethodKind::GetChainInfo,
    MethodKind::GetContractMetadata,
    MethodKind::GetContractClassMetadata,
    MethodKind::GetTxReceipt,
    MethodKind::RegisterSender,
    MethodKind::GetAddressBook,
    MethodKind::GetAccounts,
    MethodKind::RegisterContract,
    MethodKind::SimulateTx,
    MethodKind::SimulateUtility,
    MethodKind::ProfileTx,
    MethodKind::SendTx,
    MethodKind::CreateAuthWit,
    MethodKind::GetPrivateEvents,
    MethodKind::GetCurrentBaseFees,
];

/// The bundled identity fetch, in submission order.
pub const IDENTITY_METHODS: [MethodKind; 4] = [
    MethodKind::GetCompleteAddress,
    MethodKind::GetAddress,
    MethodKind::GetChainId,
    MethodKind::GetVersion,
];

impl MethodKind {
    /// Wire tag (`aztec_sendTx`).
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GetChainInfo => "aztec_getChainInfo",
            Self::GetContractMetadata => "aztec_getContractMetadata",
            Self::GetContractClassMetadata => "aztec_getContractClassMetadata",
            Self::GetTxReceipt => "aztec_getTxReceipt",
            Self::RegisterSender => "aztec_registerSender",
            Self::GetAddressBook => "aztec_getAddressBook",
            Self::GetAccounts => "aztec_getAccounts",
            Self::RegisterContract => "aztec_registerContract",
            Self::SimulateTx => "aztec_simulateTx",
            Self::SimulateUtility => "aztec_simulateUtility",
            Self::ProfileTx => "aztec_profileTx",
            Self::SendTx => "aztec_sendTx",
            Self::CreateAuthWit => "aztec_createAuthWit",
            Self::GetPrivateEvents => "aztec_getPrivateEvents",
            Self::GetCurrentBaseFees => "aztec_getCurrentBaseFees",
            Self::GetAddress => "aztec_getAddress",
            Self::GetCompleteAddress => "aztec_getCompleteAddress",
            Self::GetChainId => "aztec_getChainId",
            Self::GetVersion => "aztec_getVersion",
        }
    }

    /// Wallet method name (`sendTx`), used in errors and batch results.
    #[must_use]
    pub fn method_name(&self) -> &'static str {
        let tag = self.as_str();
        tag.strip_prefix("aztec_").unwrap_or(tag)
    }

    /// Whether this kind belongs to the identity bundle.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        IDENTITY_METHODS.contains(self)
    }
}

impl std::fmt::Display for MethodKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which protocol shape the agent speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProtocolVersion {
    /// Account-scoped operations with a cached identity.
    AccountBound,
    /// Chain-scoped reads, no identity cache.
    #[default]
    ChainBound,
}

impl ProtocolVersion {
    /// Method kinds requested at connect time and required to stay granted.
    #[must_use]
    pub fn required_methods(&self) -> Vec<MethodKind> {
        let mut methods = BATCHABLE_METHODS.to_vec();
        if self.caches_identity() {
            methods.extend_from_slice(&IDENTITY_METHODS);
        }
        methods
    }

    /// Whether the session caches the account identity.
    #[must_use]
    pub fn caches_identity(&self) -> bool {
        matches!(self, Self::AccountBound)
    }

    /// Name passed to the agent connector.
    #[must_use]
    pub fn protocol_name(&self) -> &'static str {
        match self {
            Self::AccountBound => "aztec-account",
            Self::ChainBound => "aztec-chain",
        }
    }
}

//! # Session Vocabulary
//!
//! Types describing a dapp session with the agent: who is asking, which
//! permissions were requested or granted, and the agent's account
//! identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::entities::AztecAddress;

/// Dapp metadata shown to the user when the agent asks for approval.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DappMetadata {
    /// Display name. Filled from the url host when absent.
    #[serde(default)]
    pub name: Option<String>,
    /// Short description.
    #[serde(default)]
    pub description: Option<String>,
    /// Logo url.
    #[serde(default)]
    pub logo: Option<String>,
    /// Dapp url.
    #[serde(default)]
    pub url: Option<String>,
}

impl DappMetadata {
    /// Metadata with only a name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

/// A set of methods allowed on a set of chains.
///
/// The same shape is used for what the adapter requests and for what the
/// agent reports as granted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionGrant {
    /// Chain identifiers this grant applies to.
    pub chains: Vec<String>,
    /// Method kinds allowed on those chains.
    pub methods: Vec<String>,
}

/// Permissions asked for at connect time.
pub type PermissionRequest = PermissionGrant;

impl PermissionGrant {
    /// Grant for a single chain.
    #[must_use]
    pub fn for_chain(chain: impl Into<String>, methods: Vec<String>) -> Self {
        Self {
            chains: vec![chain.into()],
            methods,
        }
    }

    /// Whether this grant allows `method` on `chain`.
    #[must_use]
    pub fn allows(&self, chain: &str, method: &str) -> bool {
        self.chains.iter().any(|c| c == chain) && self.methods.iter().any(|m| m == method)
    }

    /// Whether every method in `required` is allowed on `chain` by some grant.
    #[must_use]
    pub fn covers<'a>(
        grants: &[PermissionGrant],
        chain: &str,
        required: impl IntoIterator<Item = &'a str>,
    ) -> bool {
        required
            .into_iter()
            .all(|method| grants.iter().any(|g| g.allows(chain, method)))
    }
}

/// An agent account identifier, `<namespace>:<chain reference>:<address>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    /// Wrap a raw identifier as reported by the agent.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Identifier for `address` on `chain` (`aztec:31337` + address).
    #[must_use]
    pub fn on_chain(chain: &str, address: &AztecAddress) -> Self {
        Self(format!("{chain}:{address}"))
    }

    /// Raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the identifier's textual suffix is `address`, ignoring hex
    /// letter case.
    #[must_use]
    pub fn ends_with_address(&self, address: &AztecAddress) -> bool {
        let suffix = address.as_str();
        self.0
            .len()
            .checked_sub(suffix.len())
            .and_then(|start| self.0.get(start..))
            .is_some_and(|tail| tail.eq_ignore_ascii_case(suffix))
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

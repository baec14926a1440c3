//! Chain selection.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Chain identifier of a local sandbox.
pub const SANDBOX_CHAIN_ID: &str = "aztec:31337";

/// Chain identifier of the public testnet.
pub const TESTNET_CHAIN_ID: &str = "aztec:11155111";

/// Which chain the session is opened for.
///
/// `sandbox` and `testnet` are aliases for fixed identifiers; any other
/// value is used verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ChainSelector {
    /// Local sandbox.
    Sandbox,
    /// Public testnet.
    #[default]
    Testnet,
    /// A raw chain identifier.
    Custom(String),
}

impl ChainSelector {
    /// Resolve a user-supplied selector.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            v if v.eq_ignore_ascii_case("sandbox") => Self::Sandbox,
            v if v.eq_ignore_ascii_case("testnet") => Self::Testnet,
            v => Self::Custom(v.to_string()),
        }
    }

    /// The chain identifier the session is scoped to.
    #[must_use]
    pub fn chain_id(&self) -> &str {
        match self {
            Self::Sandbox => SANDBOX_CHAIN_ID,
            Self::Testnet => TESTNET_CHAIN_ID,
            Self::Custom(id) => id,
        }
    }
}

impl From<String> for ChainSelector {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<ChainSelector> for String {
    fn from(value: ChainSelector) -> Self {
        match value {
            ChainSelector::Sandbox => "sandbox".to_string(),
            ChainSelector::Testnet => "testnet".to_string(),
            ChainSelector::Custom(id) => id,
        }
    }
}

impl fmt::Display for ChainSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.chain_id())
    }
}

//! Operations submitted to the agent and the results it returns.
//!
//! An operation serializes flat:
//!
//! ```json
//! { "kind": "aztec_sendTx", "account": "aztec:31337:0x..", "exec": {..}, "opts": {..} }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use wallet_types::{AccountId, SchemaError};

use super::methods::MethodKind;

/// Where an operation runs: on the session chain or as a session account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Scope {
    /// Chain-scoped.
    Chain {
        /// Chain identifier.
        chain: String,
    },
    /// Account-scoped.
    Account {
        /// Agent account identifier.
        account: AccountId,
    },
}

impl Scope {
    /// Chain scope.
    pub fn chain(chain: impl Into<String>) -> Self {
        Self::Chain {
            chain: chain.into(),
        }
    }

    /// Account scope.
    #[must_use]
    pub fn account(account: AccountId) -> Self {
        Self::Account { account }
    }
}

/// One request to the agent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Operation {
    /// Method kind.
    pub kind: MethodKind,
    /// Chain or account scope.
    #[serde(flatten)]
    pub scope: Scope,
    /// Method fields.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Operation {
    /// Operation with no method fields.
    #[must_use]
    pub fn new(kind: MethodKind, scope: Scope) -> Self {
        Self {
            kind,
            scope,
            fields: Map::new(),
        }
    }

    /// Add a named field.
    pub fn with_field(
        mut self,
        name: &str,
        value: impl Serialize,
    ) -> Result<Self, SchemaError> {
        let value = serde_json::to_value(value).map_err(|e| SchemaError::Malformed(e.to_string()))?;
        self.fields.insert(name.to_string(), value);
        Ok(self)
    }

    /// Merge every field of a struct-like value into the operation.
    pub fn with_fields_from(mut self, value: impl Serialize) -> Result<Self, SchemaError> {
        match serde_json::to_value(value).map_err(|e| SchemaError::Malformed(e.to_string()))? {
            Value::Object(fields) => {
                self.fields.extend(fields);
                Ok(self)
            }
            other => Err(SchemaError::Malformed(format!(
                "expected an object of fields, got {other}"
            ))),
        }
    }

    /// Field lookup.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

/// The agent's answer to one operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum OperationResult {
    /// Completed with a value.
    Ok {
        /// Raw result payload.
        result: Value,
    },
    /// Attempted and failed.
    Failed {
        /// Agent-supplied message.
        error: String,
    },
    /// Not attempted (user dismissed, or an earlier entry failed).
    Skipped,
}

impl OperationResult {
    /// Successful result.
    #[must_use]
    pub fn ok(result: Value) -> Self {
        Self::Ok { result }
    }

    /// Failed result.
    pub fn failed(error: impl Into<String>) -> Self {
        Self::Failed {
            error: error.into(),
        }
    }

    /// Status label for logs.
    #[must_use]
    pub fn status(&self) -> &'static str {
        match self {
            Self::Ok { .. } => "ok",
            Self::Failed { .. } => "failed",
            Self::Skipped => "skipped",
        }
    }
}

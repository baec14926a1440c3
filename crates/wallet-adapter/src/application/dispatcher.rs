//! # Operation Dispatcher
//!
//! One typed call in, one typed value out: ensure a live session, encode
//! the call as a batch of one, unwrap the single result and validate it.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;
use wallet_types::Schema;

use super::calls::{parse_result, MethodCall};
use super::session::SessionManager;
use crate::domain::{MethodKind, OperationResult, WalletError};
use crate::ports::AgentClient;

/// Dispatches single Wallet calls.
pub struct OperationDispatcher<C> {
    session: Arc<SessionManager<C>>,
}

impl<C: AgentClient> OperationDispatcher<C> {
    pub fn new(session: Arc<SessionManager<C>>) -> Self {
        Self { session }
    }

    /// Run `call` and validate its result as `T`.
    pub async fn execute<T: Schema>(&self, call: &MethodCall) -> Result<T, WalletError> {
        self.session.ensure_connected().await?;

        let kind = call.kind();
        let operation = self.session.encode(call)?;
        let result = self
            .session
            .exchange(std::slice::from_ref(&operation))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| WalletError::Transport("agent returned no result".to_string()))?;

        debug!(method = kind.method_name(), status = result.status(), "Operation completed");
        parse_result(kind, unwrap_result(kind, result)?)
    }
}

/// The `ok` payload of `result`, or the error a failed/skipped entry maps to.
pub(crate) fn unwrap_result(kind: MethodKind, result: OperationResult) -> Result<Value, WalletError> {
    match result {
        OperationResult::Ok { result } => Ok(result),
        OperationResult::Failed { error } => Err(WalletError::OperationFailed {
            method: kind.method_name().to_string(),
            message: error,
        }),
        OperationResult::Skipped => Err(WalletError::OperationSkipped {
            method: kind.method_name().to_string(),
        }),
    }
}

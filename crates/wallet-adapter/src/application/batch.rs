//! # Batch Dispatcher
//!
//! Ordered heterogeneous calls in one `execute` exchange. All or nothing:
//! every call is encoded before anything is submitted, and the first
//! failed or skipped entry discards the whole batch.

use std::sync::Arc;

use tracing::{debug, warn};

use super::calls::{MethodCall, MethodResult, NamedCall};
use super::dispatcher::unwrap_result;
use super::session::SessionManager;
use crate::domain::{Operation, WalletError};
use crate::ports::AgentClient;

/// Dispatches batches of Wallet calls.
pub struct BatchDispatcher<C> {
    session: Arc<SessionManager<C>>,
}

impl<C: AgentClient> BatchDispatcher<C> {
    pub fn new(session: Arc<SessionManager<C>>) -> Self {
        Self { session }
    }

    /// Run `calls` in one exchange; results come back in input order.
    pub async fn batch(&self, calls: &[MethodCall]) -> Result<Vec<MethodResult>, WalletError> {
        if calls.is_empty() {
            return Ok(Vec::new());
        }
        self.session.ensure_connected().await?;

        let operations = calls
            .iter()
            .map(|call| self.session.encode(call))
            .collect::<Result<Vec<Operation>, _>>()?;

        let results = self.session.exchange(&operations).await?;
        debug!(calls = calls.len(), "Batch completed, decoding results");

        calls
            .iter()
            .zip(results)
            .map(|(call, result)| {
                let raw = unwrap_result(call.kind(), result).inspect_err(|e| {
                    warn!(method = call.name(), error = %e, "Batch entry did not succeed");
                })?;
                call.decode(raw)
            })
            .collect()
    }

    /// Resolve method names, then run the batch. Unknown names fail before
    /// anything is submitted.
    pub async fn batch_named(
        &self,
        calls: Vec<NamedCall>,
    ) -> Result<Vec<MethodResult>, WalletError> {
        let calls = calls
            .into_iter()
            .map(MethodCall::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        self.batch(&calls).await
    }
}

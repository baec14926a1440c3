//! # Session Manager
//!
//! Owns the agent client and everything the adapter knows about the live
//! session: whether one exists, which chain it is for, and (account-bound
//! protocol) the cached identity.
//!
//! ## Invariants
//!
//! - At most one agent `connect` per disconnected to connected transition.
//!   Concurrent callers serialize on `connect_lock` and re-check.
//! - The identity is one optional value: all four facts or none.
//! - `disconnect` clears local state before talking to the agent, and waits
//!   for an in-flight connect so a late identity fetch cannot repopulate a
//!   torn-down session.
//! - Missed agent notifications count as an invalidation.

use parking_lot::RwLock;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;
use wallet_types::{AccountId, AztecAddress, DappMetadata, PermissionGrant, PermissionRequest};

use agent_bus::AgentEvent;

use super::calls::{parse_result, MethodCall};
use crate::config::AdapterConfig;
use crate::domain::{
    MethodKind, Operation, OperationResult, ProtocolVersion, Scope, SessionIdentity,
    SessionStats, WalletError, IDENTITY_METHODS,
};
use crate::ports::AgentClient;

/// Connection state and cached identity for one adapter.
pub struct SessionManager<C> {
    client: C,
    metadata: DappMetadata,
    chain_id: String,
    protocol: ProtocolVersion,
    identity: RwLock<Option<SessionIdentity>>,
    session_id: RwLock<Option<Uuid>>,
    connect_lock: Mutex<()>,
    stats: SessionStats,
}

impl<C: AgentClient> SessionManager<C> {
    /// Session manager for `client`, not yet connected.
    pub fn new(client: C, config: &AdapterConfig) -> Self {
        Self {
            client,
            metadata: config.resolved_metadata(),
            chain_id: config.chain.chain_id().to_string(),
            protocol: config.protocol,
            identity: RwLock::new(None),
            session_id: RwLock::new(None),
            connect_lock: Mutex::new(()),
            stats: SessionStats::default(),
        }
    }

    /// Chain identifier the session is scoped to.
    pub fn chain_id(&self) -> &str {
        &self.chain_id
    }

    /// Protocol shape in use.
    pub fn protocol(&self) -> ProtocolVersion {
        self.protocol
    }

    /// Metadata shown to the user at approval time.
    pub fn metadata(&self) -> &DappMetadata {
        &self.metadata
    }

    /// The agent client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Session counters.
    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Id of the live session, for log correlation.
    pub fn session_id(&self) -> Option<Uuid> {
        *self.session_id.read()
    }

    /// The permission grant requested at connect time.
    pub fn permission_requests(&self) -> Vec<PermissionRequest> {
        let methods = self
            .protocol
            .required_methods()
            .iter()
            .map(|kind| kind.as_str().to_string())
            .collect();
        vec![PermissionGrant::for_chain(self.chain_id.clone(), methods)]
    }

    /// Whether a usable session exists right now.
    pub fn is_connected(&self) -> bool {
        self.client.is_connected()
            && (!self.protocol.caches_identity() || self.identity.read().is_some())
    }

    /// Establish the session if there is none. No-op when connected.
    pub async fn connect(&self) -> Result<(), WalletError> {
        self.ensure_connected().await
    }

    /// Connect (and fetch the identity) unless a session is already live.
    pub async fn ensure_connected(&self) -> Result<(), WalletError> {
        if self.is_connected() {
            return Ok(());
        }

        let _guard = self.connect_lock.lock().await;
        if self.is_connected() {
            debug!("Session established by a concurrent caller");
            return Ok(());
        }

        self.open_session().await?;
        if self.protocol.caches_identity() {
            self.fetch_identity().await?;
        }
        Ok(())
    }

    async fn open_session(&self) -> Result<(), WalletError> {
        if self.client.is_connected() {
            return Ok(());
        }

        info!(
            chain = %self.chain_id,
            protocol = self.protocol.protocol_name(),
            "Requesting wallet session"
        );
        self.stats.record_connect();
        self.client
            .connect(&self.metadata, &self.permission_requests())
            .await
            .map_err(|e| WalletError::Connection(e.to_string()))?;

        if !self.client.is_connected() {
            warn!(chain = %self.chain_id, "Wallet session request was declined");
            return Err(WalletError::Connection(
                "user declined the connection request".to_string(),
            ));
        }

        let session_id = Uuid::new_v4();
        *self.session_id.write() = Some(session_id);
        info!(%session_id, chain = %self.chain_id, "Wallet session established");
        Ok(())
    }

    /// Fetch the four identity facts in one exchange and cache them.
    async fn fetch_identity(&self) -> Result<(), WalletError> {
        let account = self.client.accounts().into_iter().next().ok_or_else(|| {
            WalletError::Initialization("agent exposed no accounts".to_string())
        })?;

        let scope = Scope::account(account.clone());
        let operations: Vec<Operation> = IDENTITY_METHODS
            .iter()
            .map(|kind| Operation::new(*kind, scope.clone()))
            .collect();
        let results = self
            .exchange(&operations)
            .await
            .map_err(|e| WalletError::Initialization(e.to_string()))?;

        let mut values = Vec::with_capacity(IDENTITY_METHODS.len());
        for (kind, result) in IDENTITY_METHODS.iter().zip(results) {
            match result {
                OperationResult::Ok { result } => values.push(result),
                OperationResult::Failed { error } => {
                    return Err(WalletError::Initialization(format!(
                        "{} failed: {error}",
                        kind.method_name()
                    )))
                }
                OperationResult::Skipped => {
                    return Err(WalletError::Initialization(format!(
                        "{} was skipped",
                        kind.method_name()
                    )))
                }
            }
        }

        let [complete_address, address, chain_id, version]: [Value; 4] =
            values.try_into().map_err(|_| {
                WalletError::Initialization("incomplete identity bundle".to_string())
            })?;
        let identity = SessionIdentity {
            account,
            complete_address: parse_result(MethodKind::GetCompleteAddress, complete_address)?,
            address: parse_result(MethodKind::GetAddress, address)?,
            chain_id: parse_result(MethodKind::GetChainId, chain_id)?,
            version: parse_result(MethodKind::GetVersion, version)?,
        };

        debug!(account = %identity.account, address = %identity.address, "Session identity cached");
        *self.identity.write() = Some(identity);
        Ok(())
    }

    /// Clear local state, then end the agent session.
    pub async fn disconnect(&self) -> Result<(), WalletError> {
        let _guard = self.connect_lock.lock().await;
        self.clear_identity();
        let session_id = self.session_id.write().take();
        info!(?session_id, "Disconnecting wallet session");
        self.client
            .disconnect()
            .await
            .map_err(|e| WalletError::Transport(e.to_string()))
    }

    fn clear_identity(&self) {
        if self.identity.write().take().is_some() {
            debug!("Session identity cleared");
        }
    }

    /// The cached identity. Never reconnects.
    pub fn identity(&self, accessor: &str) -> Result<SessionIdentity, WalletError> {
        if !self.protocol.caches_identity() {
            return Err(WalletError::UnsupportedMethod(accessor.to_string()));
        }
        if !self.client.is_connected() {
            return Err(WalletError::StaleIdentity);
        }
        self.identity.read().clone().ok_or(WalletError::StaleIdentity)
    }

    /// Scope for `call`: the account resolved from its `from`, otherwise the
    /// chain (chain-bound) or the session account (account-bound).
    pub(crate) fn scope_for(&self, call: &MethodCall) -> Result<Scope, WalletError> {
        if let Some(from) = call.authorizing_account() {
            return self.resolve_account(from).map(Scope::account);
        }
        match self.protocol {
            ProtocolVersion::ChainBound => Ok(Scope::chain(self.chain_id.clone())),
            ProtocolVersion::AccountBound => self
                .identity
                .read()
                .as_ref()
                .map(|identity| Scope::account(identity.account.clone()))
                .ok_or(WalletError::StaleIdentity),
        }
    }

    /// The session account whose identifier ends with `from`.
    pub fn resolve_account(&self, from: &AztecAddress) -> Result<AccountId, WalletError> {
        self.client
            .accounts()
            .into_iter()
            .find(|account| account.ends_with_address(from))
            .ok_or_else(|| {
                debug!(address = %from, "No session account for address");
                WalletError::UnauthorizedAccount {
                    address: from.to_string(),
                }
            })
    }

    /// Encode `call` under the scope this session gives it.
    pub(crate) fn encode(&self, call: &MethodCall) -> Result<Operation, WalletError> {
        let scope = self.scope_for(call)?;
        call.encode(scope)
    }

    /// One `execute` round trip. Guarantees one result per operation.
    pub(crate) async fn exchange(
        &self,
        operations: &[Operation],
    ) -> Result<Vec<OperationResult>, WalletError> {
        self.stats.record_exchange(operations.len());
        debug!(
            session_id = ?self.session_id(),
            operations = operations.len(),
            first = operations.first().map(|op| op.kind.as_str()),
            "Submitting operations"
        );

        let results = self
            .client
            .execute(operations)
            .await
            .map_err(|e| WalletError::Transport(e.to_string()))?;

        if results.len() != operations.len() {
            warn!(
                expected = operations.len(),
                received = results.len(),
                "Agent returned a mismatched result count"
            );
            return Err(WalletError::Transport(format!(
                "expected {} results, received {}",
                operations.len(),
                results.len()
            )));
        }
        Ok(results)
    }

    /// React to an agent notification.
    pub async fn handle_event(&self, event: &AgentEvent) {
        debug!(event = event.name(), "Agent event received");
        match event {
            AgentEvent::Connected => {}
            AgentEvent::Disconnected => {
                self.clear_identity();
                *self.session_id.write() = None;
            }
            AgentEvent::AccountsChanged(accounts) => {
                let invalidated = match self.protocol {
                    ProtocolVersion::ChainBound => true,
                    ProtocolVersion::AccountBound => self
                        .identity
                        .read()
                        .as_ref()
                        .is_some_and(|identity| !accounts.contains(&identity.account)),
                };
                if invalidated {
                    self.force_disconnect("accounts changed").await;
                }
            }
            AgentEvent::PermissionsChanged(grants) => {
                let required = self.protocol.required_methods();
                let covered = PermissionGrant::covers(
                    grants,
                    &self.chain_id,
                    required.iter().map(MethodKind::as_str),
                );
                if !covered {
                    self.force_disconnect("permissions narrowed").await;
                }
            }
        }
    }

    /// The event listener fell behind and `missed` notifications are gone.
    /// Any of them may have invalidated the session, so a live one is torn
    /// down and the next operation reconnects.
    pub async fn handle_missed_events(&self, missed: u64) {
        warn!(missed, "Agent notifications were dropped");
        if self.client.is_connected() || self.identity.read().is_some() {
            self.force_disconnect("missed agent notifications").await;
        }
    }

    async fn force_disconnect(&self, reason: &str) {
        warn!(reason, "Tearing down wallet session");
        self.stats.record_forced_disconnect();
        if let Err(e) = self.disconnect().await {
            warn!(error = %e, "Agent disconnect failed; local session already cleared");
        }
    }
}

//! # Outbound Ports
//!
//! The signing agent as seen by the adapter: a factory that locates the
//! agent, and the client the factory hands back.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use agent_bus::{AgentEvent, EventFilter, EventPublisher, InMemoryEventBus, Subscription};
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use thiserror::Error;
use wallet_types::{AccountId, DappMetadata, PermissionGrant, PermissionRequest};

use crate::domain::{MethodKind, Operation, OperationResult};

/// Errors reported by an agent client.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AgentError {
    /// No agent is installed or reachable.
    #[error("Agent unavailable: {0}")]
    Unavailable(String),

    /// The agent refused the request.
    #[error("Agent rejected the request: {0}")]
    Rejected(String),

    /// The channel to the agent failed.
    #[error("Agent transport failure: {0}")]
    Transport(String),
}

/// Session-oriented RPC channel to the signing agent.
#[async_trait]
pub trait AgentClient: Send + Sync {
    /// Ask the user to approve a session with the given permissions.
    ///
    /// Returning `Ok` does not mean the user approved; check
    /// [`AgentClient::is_connected`] afterwards.
    async fn connect(
        &self,
        metadata: &DappMetadata,
        permissions: &[PermissionRequest],
    ) -> Result<(), AgentError>;

    /// Run operations in order, one result per operation.
    async fn execute(&self, operations: &[Operation])
        -> Result<Vec<OperationResult>, AgentError>;

    /// End the session.
    async fn disconnect(&self) -> Result<(), AgentError>;

    /// Whether a session is live.
    fn is_connected(&self) -> bool;

    /// Account identifiers exposed to the session.
    fn accounts(&self) -> Vec<AccountId>;

    /// Session change notifications.
    fn subscribe(&self, filter: EventFilter) -> Subscription;
}

#[async_trait]
impl<T: AgentClient + ?Sized> AgentClient for Arc<T> {
    async fn connect(
        &self,
        metadata: &DappMetadata,
        permissions: &[PermissionRequest],
    ) -> Result<(), AgentError> {
        (**self).connect(metadata, permissions).await
    }

    async fn execute(
        &self,
        operations: &[Operation],
    ) -> Result<Vec<OperationResult>, AgentError> {
        (**self).execute(operations).await
    }

    async fn disconnect(&self) -> Result<(), AgentError> {
        (**self).disconnect().await
    }

    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }

    fn accounts(&self) -> Vec<AccountId> {
        (**self).accounts()
    }

    fn subscribe(&self, filter: EventFilter) -> Subscription {
        (**self).subscribe(filter)
    }
}

/// Locates the agent and creates a client for it.
#[async_trait]
pub trait AgentConnector: Send + Sync {
    /// Client type produced.
    type Client: AgentClient + 'static;

    /// Create a client speaking `protocol`. May wait for the agent to
    /// announce itself; the adapter bounds this with its lookup timeout.
    async fn create(&self, protocol: &str) -> Result<Self::Client, AgentError>;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// In-process agent with scripted responses.
///
/// Results are looked up by method kind; kinds without a script fail.
/// Events are injected with [`MockAgent::emit`], which updates the mock's
/// own state the way a real agent would before notifying subscribers.
pub struct MockAgent {
    bus: InMemoryEventBus,
    connected: AtomicBool,
    decline: AtomicBool,
    accounts: RwLock<Vec<AccountId>>,
    granted: RwLock<Vec<PermissionGrant>>,
    responses: RwLock<HashMap<MethodKind, OperationResult>>,
    executed: Mutex<Vec<Vec<Operation>>>,
    connect_calls: AtomicUsize,
    disconnect_calls: AtomicUsize,
    connect_delay: Duration,
}

impl MockAgent {
    /// Mock exposing `accounts`, not yet connected.
    #[must_use]
    pub fn new(accounts: Vec<AccountId>) -> Self {
        Self {
            bus: InMemoryEventBus::new(),
            connected: AtomicBool::new(false),
            decline: AtomicBool::new(false),
            accounts: RwLock::new(accounts),
            granted: RwLock::new(Vec::new()),
            responses: RwLock::new(HashMap::new()),
            executed: Mutex::new(Vec::new()),
            connect_calls: AtomicUsize::new(0),
            disconnect_calls: AtomicUsize::new(0),
            connect_delay: Duration::ZERO,
        }
    }

    /// Script the result returned for `kind`.
    #[must_use]
    pub fn with_response(self, kind: MethodKind, result: OperationResult) -> Self {
        self.set_response(kind, result);
        self
    }

    /// Make the approval prompt take `delay`.
    #[must_use]
    pub fn with_connect_delay(mut self, delay: Duration) -> Self {
        self.connect_delay = delay;
        self
    }

    /// Replace the scripted result for `kind`.
    pub fn set_response(&self, kind: MethodKind, result: OperationResult) {
        self.responses.write().insert(kind, result);
    }

    /// Make the user decline (or accept) future approval prompts.
    pub fn set_decline(&self, decline: bool) {
        self.decline.store(decline, Ordering::SeqCst);
    }

    /// Apply an event to the mock's state and notify subscribers.
    pub async fn emit(&self, event: AgentEvent) -> usize {
        match &event {
            AgentEvent::Connected => self.connected.store(true, Ordering::SeqCst),
            AgentEvent::Disconnected => self.connected.store(false, Ordering::SeqCst),
            AgentEvent::AccountsChanged(accounts) => *self.accounts.write() = accounts.clone(),
            AgentEvent::PermissionsChanged(grants) => *self.granted.write() = grants.clone(),
        }
        self.bus.publish(event).await
    }

    /// Number of `connect` calls received.
    #[must_use]
    pub fn connect_calls(&self) -> usize {
        self.connect_calls.load(Ordering::SeqCst)
    }

    /// Number of `disconnect` calls received.
    #[must_use]
    pub fn disconnect_calls(&self) -> usize {
        self.disconnect_calls.load(Ordering::SeqCst)
    }

    /// Number of `execute` calls received.
    #[must_use]
    pub fn execute_calls(&self) -> usize {
        self.executed.lock().len()
    }

    /// Every submitted batch, in arrival order.
    #[must_use]
    pub fn executed(&self) -> Vec<Vec<Operation>> {
        self.executed.lock().clone()
    }

    /// Permissions granted by the last approval.
    #[must_use]
    pub fn granted(&self) -> Vec<PermissionGrant> {
        self.granted.read().clone()
    }
}

#[async_trait]
impl AgentClient for MockAgent {
    async fn connect(
        &self,
        _metadata: &DappMetadata,
        permissions: &[PermissionRequest],
    ) -> Result<(), AgentError> {
        self.connect_calls.fetch_add(1, Ordering::SeqCst);
        if !self.connect_delay.is_zero() {
            tokio::time::sleep(self.connect_delay).await;
        }
        if self.decline.load(Ordering::SeqCst) {
            return Ok(());
        }
        *self.granted.write() = permissions.to_vec();
        self.connected.store(true, Ordering::SeqCst);
        self.bus.publish(AgentEvent::Connected).await;
        Ok(())
    }

    async fn execute(
        &self,
        operations: &[Operation],
    ) -> Result<Vec<OperationResult>, AgentError> {
        if !self.connected.load(Ordering::SeqCst) {
            return Err(AgentError::Transport("no live session".to_string()));
        }
        self.executed.lock().push(operations.to_vec());

        let responses = self.responses.read();
        Ok(operations
            .iter()
            .map(|op| {
                responses.get(&op.kind).cloned().unwrap_or_else(|| {
                    OperationResult::failed(format!("no mock response for {}", op.kind))
                })
            })
            .collect())
    }

    async fn disconnect(&self) -> Result<(), AgentError> {
        self.disconnect_calls.fetch_add(1, Ordering::SeqCst);
        if self.connected.swap(false, Ordering::SeqCst) {
            self.bus.publish(AgentEvent::Disconnected).await;
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn accounts(&self) -> Vec<AccountId> {
        self.accounts.read().clone()
    }

    fn subscribe(&self, filter: EventFilter) -> Subscription {
        self.bus.subscribe(filter)
    }
}

/// Connector handing out a shared [`MockAgent`].
#[derive(Default)]
pub struct MockConnector {
    /// Agent to return; `None` simulates a missing agent.
    pub agent: Option<Arc<MockAgent>>,
    /// Time spent "looking" for the agent.
    pub lookup_delay: Duration,
}

impl MockConnector {
    /// Connector that finds `agent` immediately.
    #[must_use]
    pub fn new(agent: Arc<MockAgent>) -> Self {
        Self {
            agent: Some(agent),
            lookup_delay: Duration::ZERO,
        }
    }
}

#[async_trait]
impl AgentConnector for MockConnector {
    type Client = Arc<MockAgent>;

    async fn create(&self, _protocol: &str) -> Result<Self::Client, AgentError> {
        if !self.lookup_delay.is_zero() {
            tokio::time::sleep(self.lookup_delay).await;
        }
        self.agent
            .clone()
            .ok_or_else(|| AgentError::Unavailable("no agent installed".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Scope;
    use serde_json::json;

    fn account() -> AccountId {
        AccountId::new("aztec:31337:0x01")
    }

    #[tokio::test]
    async fn test_mock_agent_connect_grants_permissions() {
        let agent = MockAgent::new(vec![account()]);
        let grant = PermissionGrant::for_chain("aztec:31337", vec!["aztec_sendTx".into()]);
        agent
            .connect(&DappMetadata::named("demo"), &[grant.clone()])
            .await
            .unwrap();

        assert!(agent.is_connected());
        assert_eq!(agent.connect_calls(), 1);
        assert_eq!(agent.granted(), vec![grant]);
    }

    #[tokio::test]
    async fn test_mock_agent_decline_stays_disconnected() {
        let agent = MockAgent::new(vec![account()]);
        agent.set_decline(true);
        agent.connect(&DappMetadata::default(), &[]).await.unwrap();
        assert!(!agent.is_connected());
    }

    #[tokio::test]
    async fn test_mock_agent_execute_requires_session() {
        let agent = MockAgent::new(vec![account()]);
        let op = Operation::new(MethodKind::GetChainInfo, Scope::chain("aztec:31337"));
        assert!(matches!(
            agent.execute(&[op]).await,
            Err(AgentError::Transport(_))
        ));
    }

    #[tokio::test]
    async fn test_mock_agent_scripted_and_unscripted_results() {
        let agent = MockAgent::new(vec![account()])
            .with_response(MethodKind::GetChainInfo, OperationResult::ok(json!({})));
        agent.connect(&DappMetadata::default(), &[]).await.unwrap();

        let ops = vec![
            Operation::new(MethodKind::GetChainInfo, Scope::chain("c")),
            Operation::new(MethodKind::SendTx, Scope::chain("c")),
        ];
        let results = agent.execute(&ops).await.unwrap();
        assert_eq!(results[0], OperationResult::ok(json!({})));
        assert!(matches!(results[1], OperationResult::Failed { .. }));
        assert_eq!(agent.execute_calls(), 1);
        assert_eq!(agent.executed()[0], ops);
    }

    #[tokio::test]
    async fn test_mock_agent_emit_updates_state() {
        let agent = MockAgent::new(vec![account()]);
        let mut sub = agent.subscribe(EventFilter::all());

        agent.emit(AgentEvent::AccountsChanged(vec![])).await;

        assert!(agent.accounts().is_empty());
        assert_eq!(sub.recv().await, Some(AgentEvent::AccountsChanged(vec![])));
    }

    #[tokio::test]
    async fn test_mock_connector_without_agent() {
        let connector = MockConnector::default();
        let result = connector.create("aztec-chain").await;
        assert!(matches!(result, Err(AgentError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_arc_client_delegates() {
        let agent = Arc::new(MockAgent::new(vec![account()]));
        let connector = MockConnector::new(agent.clone());
        let client = connector.create("aztec-chain").await.unwrap();
        client.connect(&DappMetadata::default(), &[]).await.unwrap();
        assert!(agent.is_connected());
        assert_eq!(client.accounts(), vec![account()]);
    }
}

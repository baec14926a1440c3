//! # Wallet Adapter Service
//!
//! The Wallet implementation applications hold. Every method is "build one
//! call, execute it with the right schema"; batches go through the batch
//! dispatcher. A background task applies agent notifications to the session
//! and re-publishes them to the adapter's own subscribers once handled.

use std::sync::Arc;

use agent_bus::{
    AgentEvent, EventFilter, EventPublisher, EventStream, EventTopic, InMemoryEventBus,
    Subscription, SubscriptionError,
};
use async_trait::async_trait;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use wallet_types::{
    Aliased, AuthWitIntent, AuthWitness, AztecAddress, ChainInfo, CompleteAddress,
    ContractArtifact, ContractClassMetadata, ContractInstanceWithAddress, ContractMetadata,
    ExecutionPayload, Fr, FunctionCall, GasFees, PrivateEvent, PrivateEventQuery,
    ProfileOptions, SendOptions, SimulateOptions, TxHash, TxProfileResult, TxReceipt,
    TxSimulationResult, UtilitySimulationResult,
};

use super::batch::BatchDispatcher;
use super::calls::{MethodCall, MethodResult, NamedCall};
use super::dispatcher::OperationDispatcher;
use super::session::SessionManager;
use crate::config::AdapterConfig;
use crate::domain::{SessionStatsSnapshot, WalletError};
use crate::ports::{AgentClient, AgentConnector, Wallet};

/// Wallet backed by an external signing agent.
pub struct WalletAdapter<C: AgentClient + 'static> {
    session: Arc<SessionManager<C>>,
    dispatcher: OperationDispatcher<C>,
    batcher: BatchDispatcher<C>,
    events: Arc<InMemoryEventBus>,
    listener: JoinHandle<()>,
}

impl<C: AgentClient + 'static> WalletAdapter<C> {
    /// Locate the agent through `connector` and open a session.
    ///
    /// The lookup is bounded by `config.lookup_timeout_ms`.
    pub async fn connect_with<K>(connector: &K, config: AdapterConfig) -> Result<Self, WalletError>
    where
        K: AgentConnector<Client = C>,
    {
        config.validate()?;
        let timeout = config.lookup_timeout();
        let protocol = config.protocol.protocol_name();

        debug!(protocol, timeout_ms = config.lookup_timeout_ms, "Looking up wallet agent");
        let client = tokio::time::timeout(timeout, connector.create(protocol))
            .await
            .map_err(|_| {
                WalletError::Connection(format!(
                    "no wallet agent found within {} ms",
                    config.lookup_timeout_ms
                ))
            })?
            .map_err(|e| WalletError::Connection(e.to_string()))?;

        let adapter = Self::new(client, config)?;
        adapter.connect().await?;
        Ok(adapter)
    }

    /// Wrap an existing client without connecting. Must be called from
    /// within a tokio runtime.
    pub fn new(client: C, config: AdapterConfig) -> Result<Self, WalletError> {
        config.validate()?;
        let runtime = Handle::try_current()
            .map_err(|e| WalletError::Connection(format!("no async runtime available: {e}")))?;

        let session = Arc::new(SessionManager::new(client, &config));
        let events = Arc::new(InMemoryEventBus::with_capacity(config.event_channel_capacity));
        let subscription = session.client().subscribe(EventFilter::all());
        let listener = runtime.spawn(listen(session.clone(), subscription, events.clone()));

        info!(
            chain = session.chain_id(),
            protocol = session.protocol().protocol_name(),
            "Wallet adapter created"
        );
        Ok(Self {
            dispatcher: OperationDispatcher::new(session.clone()),
            batcher: BatchDispatcher::new(session.clone()),
            session,
            events,
            listener,
        })
    }

    /// Establish the session. No-op when already connected.
    pub async fn connect(&self) -> Result<(), WalletError> {
        self.session.connect().await
    }

    /// End the session and forget the cached identity.
    pub async fn disconnect(&self) -> Result<(), WalletError> {
        self.session.disconnect().await
    }

    /// Whether a usable session exists.
    pub fn is_connected(&self) -> bool {
        self.session.is_connected()
    }

    /// The session manager.
    pub fn session(&self) -> &SessionManager<C> {
        &self.session
    }

    /// Session counters.
    pub fn stats(&self) -> SessionStatsSnapshot {
        self.session.stats().snapshot()
    }

    /// Session notifications, delivered after the adapter has applied them.
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        self.events.subscribe(filter)
    }

    /// Stream form of [`WalletAdapter::subscribe`].
    pub fn event_stream(&self, filter: EventFilter) -> EventStream {
        self.events.event_stream(filter)
    }

    /// Connect and disconnect notifications.
    pub fn on_session_change(&self) -> Subscription {
        self.subscribe(EventFilter::topics(vec![EventTopic::Session]))
    }

    /// Address of the session account (account-bound protocol).
    pub fn get_address(&self) -> Result<AztecAddress, WalletError> {
        Ok(self.session.identity("getAddress")?.address)
    }

    /// Complete address of the session account (account-bound protocol).
    pub fn get_complete_address(&self) -> Result<CompleteAddress, WalletError> {
        Ok(self.session.identity("getCompleteAddress")?.complete_address)
    }

    /// Chain id cached at connect time (account-bound protocol).
    pub fn get_chain_id(&self) -> Result<Fr, WalletError> {
        Ok(self.session.identity("getChainId")?.chain_id)
    }

    /// Protocol version cached at connect time (account-bound protocol).
    pub fn get_version(&self) -> Result<Fr, WalletError> {
        Ok(self.session.identity("getVersion")?.version)
    }

    /// Batch addressed by method names.
    pub async fn batch_named(&self, calls: Vec<NamedCall>) -> Result<Vec<MethodResult>, WalletError> {
        self.batcher.batch_named(calls).await
    }
}

impl<C: AgentClient + 'static> Drop for WalletAdapter<C> {
    fn drop(&mut self) {
        self.listener.abort();
    }
}

async fn listen<C: AgentClient + 'static>(
    session: Arc<SessionManager<C>>,
    mut subscription: Subscription,
    events: Arc<InMemoryEventBus>,
) {
    loop {
        match subscription.recv_checked().await {
            Ok(event) => {
                session.handle_event(&event).await;
                forward(&events, event).await;
            }
            Err(SubscriptionError::Lagged(missed)) => session.handle_missed_events(missed).await,
            Err(SubscriptionError::Closed) => break,
        }
    }
    debug!("Agent event stream closed");
}

async fn forward(events: &InMemoryEventBus, event: AgentEvent) {
    if events.subscriber_count() > 0 {
        events.publish(event).await;
    }
}

#[async_trait]
impl<C: AgentClient + 'static> Wallet for WalletAdapter<C> {
    async fn get_chain_info(&self) -> Result<ChainInfo, WalletError> {
        self.dispatcher.execute(&MethodCall::GetChainInfo).await
    }

    async fn get_contract_metadata(
        &self,
        address: &AztecAddress,
    ) -> Result<ContractMetadata, WalletError> {
        let call = MethodCall::GetContractMetadata {
            address: address.clone(),
        };
        self.dispatcher.execute(&call).await
    }

    async fn get_contract_class_metadata(
        &self,
        id: &Fr,
        include_artifact: bool,
    ) -> Result<ContractClassMetadata, WalletError> {
        let call = MethodCall::GetContractClassMetadata {
            id: id.clone(),
            include_artifact,
        };
        self.dispatcher.execute(&call).await
    }

    async fn get_tx_receipt(&self, tx_hash: &TxHash) -> Result<TxReceipt, WalletError> {
        let call = MethodCall::GetTxReceipt {
            tx_hash: tx_hash.clone(),
        };
        self.dispatcher.execute(&call).await
    }

    async fn register_sender(
        &self,
        address: &AztecAddress,
        alias: &str,
    ) -> Result<AztecAddress, WalletError> {
        let call = MethodCall::RegisterSender {
            address: address.clone(),
            alias: alias.to_string(),
        };
        self.dispatcher.execute(&call).await
    }

    async fn get_address_book(&self) -> Result<Vec<Aliased<AztecAddress>>, WalletError> {
        self.dispatcher.execute(&MethodCall::GetAddressBook).await
    }

    async fn get_accounts(&self) -> Result<Vec<Aliased<AztecAddress>>, WalletError> {
        self.dispatcher.execute(&MethodCall::GetAccounts).await
    }

    async fn register_contract(
        &self,
        instance: &ContractInstanceWithAddress,
        artifact: Option<&ContractArtifact>,
        secret_key: Option<&Fr>,
    ) -> Result<ContractInstanceWithAddress, WalletError> {
        let call = MethodCall::RegisterContract {
            instance: instance.clone(),
            artifact: artifact.cloned(),
            secret_key: secret_key.cloned(),
        };
        self.dispatcher.execute(&call).await
    }

    async fn simulate_tx(
        &self,
        exec: &ExecutionPayload,
        opts: &SimulateOptions,
    ) -> Result<TxSimulationResult, WalletError> {
        let call = MethodCall::SimulateTx {
            exec: exec.clone(),
            opts: opts.clone(),
        };
        self.dispatcher.execute(&call).await
    }

    async fn simulate_utility(
        &self,
        call: &FunctionCall,
        authwits: &[AuthWitness],
    ) -> Result<UtilitySimulationResult, WalletError> {
        let call = MethodCall::SimulateUtility {
            call: call.clone(),
            authwits: authwits.to_vec(),
        };
        self.dispatcher.execute(&call).await
    }

    async fn profile_tx(
        &self,
        exec: &ExecutionPayload,
        opts: &ProfileOptions,
    ) -> Result<TxProfileResult, WalletError> {
        let call = MethodCall::ProfileTx {
            exec: exec.clone(),
            opts: opts.clone(),
        };
        self.dispatcher.execute(&call).await
    }

    async fn send_tx(
        &self,
        exec: &ExecutionPayload,
        opts: &SendOptions,
    ) -> Result<TxHash, WalletError> {
        let call = MethodCall::SendTx {
            exec: exec.clone(),
            opts: opts.clone(),
        };
        self.dispatcher.execute(&call).await
    }

    async fn create_auth_wit(
        &self,
        from: &AztecAddress,
        intent: &AuthWitIntent,
    ) -> Result<AuthWitness, WalletError> {
        let call = MethodCall::CreateAuthWit {
            from: from.clone(),
            intent: intent.clone(),
        };
        self.dispatcher.execute(&call).await
    }

    async fn get_private_events(
        &self,
        query: &PrivateEventQuery,
    ) -> Result<Vec<PrivateEvent>, WalletError> {
        let call = MethodCall::GetPrivateEvents {
            query: query.clone(),
        };
        self.dispatcher.execute(&call).await
    }

    async fn get_current_base_fees(&self) -> Result<GasFees, WalletError> {
        self.dispatcher.execute(&MethodCall::GetCurrentBaseFees).await
    }

    async fn batch(&self, calls: &[MethodCall]) -> Result<Vec<MethodResult>, WalletError> {
        self.batcher.batch(calls).await
    }
}

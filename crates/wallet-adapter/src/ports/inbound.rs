//! # Inbound Ports
//!
//! The Wallet interface application code is written against.

use async_trait::async_trait;
use wallet_types::{
    Aliased, AuthWitIntent, AuthWitness, AztecAddress, ChainInfo, ContractArtifact,
    ContractClassMetadata, ContractInstanceWithAddress, ContractMetadata, ExecutionPayload, Fr,
    FunctionCall, GasFees, PrivateEvent, PrivateEventQuery, ProfileOptions, SendOptions,
    SimulateOptions, TxHash, TxProfileResult, TxReceipt, TxSimulationResult,
    UtilitySimulationResult,
};

use crate::application::calls::{MethodCall, MethodResult};
use crate::domain::WalletError;

/// Ledger interaction interface.
#[async_trait]
pub trait Wallet: Send + Sync {
    /// Chain id and protocol version.
    async fn get_chain_info(&self) -> Result<ChainInfo, WalletError>;

    /// What the wallet knows about a contract instance.
    async fn get_contract_metadata(
        &self,
        address: &AztecAddress,
    ) -> Result<ContractMetadata, WalletError>;

    /// What the wallet knows about a contract class.
    async fn get_contract_class_metadata(
        &self,
        id: &Fr,
        include_artifact: bool,
    ) -> Result<ContractClassMetadata, WalletError>;

    /// Receipt for a submitted transaction.
    async fn get_tx_receipt(&self, tx_hash: &TxHash) -> Result<TxReceipt, WalletError>;

    /// Register an address whose notes the wallet should discover.
    async fn register_sender(
        &self,
        address: &AztecAddress,
        alias: &str,
    ) -> Result<AztecAddress, WalletError>;

    /// Registered senders.
    async fn get_address_book(&self) -> Result<Vec<Aliased<AztecAddress>>, WalletError>;

    /// Accounts the wallet manages.
    async fn get_accounts(&self) -> Result<Vec<Aliased<AztecAddress>>, WalletError>;

    /// Register a contract instance, optionally with its artifact and secret key.
    async fn register_contract(
        &self,
        instance: &ContractInstanceWithAddress,
        artifact: Option<&ContractArtifact>,
        secret_key: Option<&Fr>,
    ) -> Result<ContractInstanceWithAddress, WalletError>;

    /// Simulate a transaction as `opts.from`.
    async fn simulate_tx(
        &self,
        exec: &ExecutionPayload,
        opts: &SimulateOptions,
    ) -> Result<TxSimulationResult, WalletError>;

    /// Run a utility (unconstrained) function.
    async fn simulate_utility(
        &self,
        call: &FunctionCall,
        authwits: &[AuthWitness],
    ) -> Result<UtilitySimulationResult, WalletError>;

    /// Profile a transaction as `opts.from`.
    async fn profile_tx(
        &self,
        exec: &ExecutionPayload,
        opts: &ProfileOptions,
    ) -> Result<TxProfileResult, WalletError>;

    /// Prove and send a transaction as `opts.from`.
    async fn send_tx(
        &self,
        exec: &ExecutionPayload,
        opts: &SendOptions,
    ) -> Result<TxHash, WalletError>;

    /// Create an auth witness signed by `from`.
    async fn create_auth_wit(
        &self,
        from: &AztecAddress,
        intent: &AuthWitIntent,
    ) -> Result<AuthWitness, WalletError>;

    /// Decrypted private events matching `query`.
    async fn get_private_events(
        &self,
        query: &PrivateEventQuery,
    ) -> Result<Vec<PrivateEvent>, WalletError>;

    /// Current base fees.
    async fn get_current_base_fees(&self) -> Result<GasFees, WalletError>;

    /// Run heterogeneous calls in one exchange. All or nothing.
    async fn batch(&self, calls: &[MethodCall]) -> Result<Vec<MethodResult>, WalletError>;
}

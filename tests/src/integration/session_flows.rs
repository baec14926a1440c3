//! # Session Flows
//!
//! Connect, transparent reconnect, and invalidation by agent notifications,
//! exercised through the public `WalletAdapter` surface.

use std::sync::Arc;
use std::time::Duration;

use agent_bus::AgentEvent;
use wallet_adapter::{
    AgentClient, MethodKind, MockAgent, MockConnector, OperationResult, ProtocolVersion, Scope,
    Wallet, WalletAdapter, WalletError, TESTNET_CHAIN_ID,
};
use wallet_types::{AccountId, PermissionGrant};

use super::fixtures::{
    address, config, eventually, fr, primary_account, scripted_agent, secondary_account,
};

async fn adapter(
    agent: &Arc<MockAgent>,
    protocol: ProtocolVersion,
) -> WalletAdapter<Arc<MockAgent>> {
    wallet_telemetry::init_test_logging();
    WalletAdapter::connect_with(&MockConnector::new(agent.clone()), config(protocol))
        .await
        .expect("adapter should connect")
}

#[tokio::test]
async fn test_two_connects_issue_one_agent_connect() {
    let agent = scripted_agent();
    let adapter = adapter(&agent, ProtocolVersion::AccountBound).await;

    adapter.connect().await.unwrap();
    adapter.connect().await.unwrap();

    assert_eq!(agent.connect_calls(), 1);
    assert_eq!(adapter.stats().agent_connects, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_calls_share_one_connect() {
    let agent = Arc::new(
        MockAgent::new(vec![primary_account()])
            .with_connect_delay(Duration::from_millis(25))
            .with_response(
                MethodKind::GetChainInfo,
                OperationResult::ok(super::fixtures::chain_info()),
            ),
    );
    let adapter = Arc::new(
        WalletAdapter::new(agent.clone(), config(ProtocolVersion::ChainBound)).unwrap(),
    );

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let adapter = adapter.clone();
            tokio::spawn(async move { adapter.get_chain_info().await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(agent.connect_calls(), 1);
    assert_eq!(agent.execute_calls(), 8);
}

#[tokio::test]
async fn test_identity_is_cached_once_per_session() {
    let agent = scripted_agent();
    let adapter = adapter(&agent, ProtocolVersion::AccountBound).await;

    assert_eq!(adapter.get_address().unwrap(), address(1));
    assert_eq!(adapter.get_chain_id().unwrap(), fr(0x11));
    assert_eq!(adapter.get_version().unwrap(), fr(0x22));
    assert_eq!(adapter.get_complete_address().unwrap().partial_address, fr(3));

    // Reads never go back to the agent.
    adapter.get_address().unwrap();
    assert_eq!(agent.execute_calls(), 1);
}

#[tokio::test]
async fn test_accounts_changed_without_cached_account_disconnects() {
    let agent = scripted_agent();
    let adapter = adapter(&agent, ProtocolVersion::AccountBound).await;
    assert!(adapter.is_connected());

    agent
        .emit(AgentEvent::AccountsChanged(vec![secondary_account()]))
        .await;

    assert!(eventually(|| !adapter.is_connected()).await);
    assert_eq!(adapter.get_address(), Err(WalletError::StaleIdentity));
    assert_eq!(adapter.get_complete_address(), Err(WalletError::StaleIdentity));
    assert_eq!(adapter.stats().forced_disconnects, 1);
}

#[tokio::test]
async fn test_accounts_changed_keeping_cached_account_is_harmless() {
    let agent = scripted_agent();
    let adapter = adapter(&agent, ProtocolVersion::AccountBound).await;

    agent
        .emit(AgentEvent::AccountsChanged(vec![
            secondary_account(),
            primary_account(),
        ]))
        .await;
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert!(adapter.is_connected());
    assert_eq!(agent.disconnect_calls(), 0);
}

#[tokio::test]
async fn test_chain_bound_disconnects_on_any_accounts_change() {
    let agent = scripted_agent();
    let adapter = adapter(&agent, ProtocolVersion::ChainBound).await;

    agent
        .emit(AgentEvent::AccountsChanged(vec![primary_account()]))
        .await;

    assert!(eventually(|| !adapter.is_connected()).await);
    assert!(eventually(|| agent.disconnect_calls() == 1).await);
}

#[tokio::test]
async fn test_read_while_disconnected_reconnects_once() {
    let agent = scripted_agent();
    let adapter = adapter(&agent, ProtocolVersion::ChainBound).await;

    agent.emit(AgentEvent::Disconnected).await;
    assert!(eventually(|| !adapter.is_connected()).await);

    let info = adapter.get_chain_info().await.unwrap();
    assert_eq!(info.chain_id, fr(0x11));

    assert_eq!(agent.connect_calls(), 2);
    let batches = agent.executed();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].len(), 1);
    assert_eq!(batches[0][0].kind, MethodKind::GetChainInfo);
    assert_eq!(batches[0][0].scope, Scope::chain(TESTNET_CHAIN_ID));
}

#[tokio::test]
async fn test_account_bound_reads_use_session_account() {
    let agent = scripted_agent();
    let adapter = adapter(&agent, ProtocolVersion::AccountBound).await;

    adapter.get_current_base_fees().await.unwrap();

    let batches = agent.executed();
    let last = batches.last().unwrap();
    assert_eq!(last[0].kind, MethodKind::GetCurrentBaseFees);
    assert_eq!(last[0].scope, Scope::account(primary_account()));
}

#[tokio::test]
async fn test_narrowed_permissions_tear_down_then_reconnect() {
    let agent = scripted_agent();
    let adapter = adapter(&agent, ProtocolVersion::ChainBound).await;

    agent
        .emit(AgentEvent::PermissionsChanged(vec![PermissionGrant::for_chain(
            TESTNET_CHAIN_ID,
            vec![MethodKind::GetChainInfo.as_str().to_string()],
        )]))
        .await;
    assert!(eventually(|| !adapter.is_connected()).await);

    adapter.get_chain_info().await.unwrap();
    assert!(adapter.is_connected());
    assert_eq!(agent.connect_calls(), 2);
    assert!(PermissionGrant::covers(
        &agent.granted(),
        TESTNET_CHAIN_ID,
        ProtocolVersion::ChainBound
            .required_methods()
            .iter()
            .map(MethodKind::as_str),
    ));
}

#[tokio::test]
async fn test_declined_then_accepted() {
    let agent = scripted_agent();
    agent.set_decline(true);
    let result =
        WalletAdapter::connect_with(&MockConnector::new(agent.clone()), config(ProtocolVersion::ChainBound))
            .await;
    assert!(matches!(result, Err(WalletError::Connection(_))));

    agent.set_decline(false);
    let adapter = adapter(&agent, ProtocolVersion::ChainBound).await;
    assert!(adapter.is_connected());
}

#[tokio::test]
async fn test_identity_failure_surfaces_as_initialization_error() {
    let agent = scripted_agent();
    agent.set_response(MethodKind::GetChainId, OperationResult::Skipped);

    let result =
        WalletAdapter::connect_with(&MockConnector::new(agent.clone()), config(ProtocolVersion::AccountBound))
            .await;
    assert!(matches!(result, Err(WalletError::Initialization(_))));
}

#[tokio::test]
async fn test_explicit_disconnect_and_hooks() {
    let agent = scripted_agent();
    let adapter = adapter(&agent, ProtocolVersion::AccountBound).await;
    let mut hook = adapter.on_session_change();

    adapter.disconnect().await.unwrap();
    assert!(!adapter.is_connected());
    assert_eq!(adapter.get_version(), Err(WalletError::StaleIdentity));
    // Accessors never reconnect.
    assert_eq!(agent.connect_calls(), 1);

    let event = tokio::time::timeout(Duration::from_secs(1), hook.recv())
        .await
        .unwrap();
    assert_eq!(event, Some(AgentEvent::Disconnected));
}

#[tokio::test]
async fn test_unknown_from_is_unauthorized() {
    let agent = scripted_agent();
    let adapter = adapter(&agent, ProtocolVersion::ChainBound).await;

    let result = adapter
        .create_auth_wit(
            &address(0x42),
            &wallet_types::AuthWitIntent(serde_json::json!({ "consumer": address(1) })),
        )
        .await;
    assert_eq!(
        result,
        Err(WalletError::UnauthorizedAccount {
            address: address(0x42).to_string()
        })
    );
    assert_eq!(agent.execute_calls(), 0);
}

#[tokio::test]
async fn test_agent_accounts_use_suffix_match() {
    let agent = Arc::new(
        MockAgent::new(vec![AccountId::new(format!("aztec:1:{}", address(5)))]).with_response(
            MethodKind::SendTx,
            OperationResult::ok(serde_json::json!(fr(6))),
        ),
    );
    let adapter = adapter(&agent, ProtocolVersion::ChainBound).await;

    adapter
        .send_tx(
            &wallet_types::ExecutionPayload(serde_json::json!({ "calls": [] })),
            &wallet_types::SendOptions {
                from: address(5),
                fee: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(
        agent.executed()[0][0].scope,
        Scope::account(AccountId::new(format!("aztec:1:{}", address(5))))
    );
    assert!(agent.is_connected());
}

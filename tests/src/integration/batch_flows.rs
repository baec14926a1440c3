//! # Batch Flows
//!
//! One exchange per batch, results in input order, all or nothing.

use std::sync::Arc;

use proptest::prelude::*;
use serde_json::json;
use wallet_adapter::{
    MethodCall, MethodKind, MethodResult, MockAgent, MockConnector, NamedCall, OperationResult,
    ProtocolVersion, Scope, Wallet, WalletAdapter, WalletError,
};
use wallet_types::{ExecutionPayload, SendOptions, TxHash, FIELD_BYTES};

use super::fixtures::{address, config, scripted_agent, secondary_account};

async fn adapter(agent: &Arc<MockAgent>) -> WalletAdapter<Arc<MockAgent>> {
    WalletAdapter::connect_with(
        &MockConnector::new(agent.clone()),
        config(ProtocolVersion::ChainBound),
    )
    .await
    .expect("adapter should connect")
}

fn send_tx(from_byte: u8) -> MethodCall {
    MethodCall::SendTx {
        exec: ExecutionPayload(json!({ "calls": [{ "to": address(8) }] })),
        opts: SendOptions {
            from: address(from_byte),
            fee: None,
        },
    }
}

fn register_sender() -> MethodCall {
    MethodCall::RegisterSender {
        address: address(7),
        alias: "dave".into(),
    }
}

#[tokio::test]
async fn test_unrelated_from_rejects_batch_before_execute() {
    let agent = scripted_agent();
    let adapter = adapter(&agent).await;

    let err = adapter
        .batch(&[register_sender(), send_tx(0x99)])
        .await
        .unwrap_err();

    assert_eq!(
        err,
        WalletError::UnauthorizedAccount {
            address: address(0x99).to_string()
        }
    );
    assert_eq!(agent.execute_calls(), 0);
}

#[tokio::test]
async fn test_mixed_batch_in_one_exchange() {
    let agent = scripted_agent();
    let adapter = adapter(&agent).await;

    let results = adapter
        .batch(&[
            MethodCall::GetChainInfo,
            register_sender(),
            send_tx(2),
            MethodCall::GetCurrentBaseFees,
        ])
        .await
        .unwrap();

    let names: Vec<&str> = results.iter().map(MethodResult::name).collect();
    assert_eq!(
        names,
        vec!["getChainInfo", "registerSender", "sendTx", "getCurrentBaseFees"]
    );
    assert_eq!(
        results[2],
        MethodResult::SendTx(TxHash::from_bytes([9; FIELD_BYTES]))
    );

    let batches = agent.executed();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0][1].scope, Scope::chain(wallet_adapter::TESTNET_CHAIN_ID));
    assert_eq!(batches[0][2].scope, Scope::account(secondary_account()));
}

#[tokio::test]
async fn test_skipped_entry_names_first_failure() {
    let agent = scripted_agent();
    agent.set_response(MethodKind::RegisterSender, OperationResult::Skipped);
    agent.set_response(MethodKind::SendTx, OperationResult::failed("out of gas"));
    let adapter = adapter(&agent).await;

    let err = adapter
        .batch(&[MethodCall::GetChainInfo, register_sender(), send_tx(1)])
        .await
        .unwrap_err();
    assert_eq!(
        err,
        WalletError::OperationSkipped {
            method: "registerSender".into()
        }
    );
}

#[tokio::test]
async fn test_invalid_payload_fails_whole_batch() {
    let agent = scripted_agent();
    agent.set_response(
        MethodKind::GetCurrentBaseFees,
        OperationResult::ok(json!({ "feePerDaGas": "ten", "feePerL2Gas": "1" })),
    );
    let adapter = adapter(&agent).await;

    let err = adapter
        .batch(&[MethodCall::GetChainInfo, MethodCall::GetCurrentBaseFees])
        .await
        .unwrap_err();
    assert!(matches!(err, WalletError::Validation { ref method, .. } if method == "getCurrentBaseFees"));
}

#[tokio::test]
async fn test_named_batch() {
    let agent = scripted_agent();
    let adapter = adapter(&agent).await;

    let results = adapter
        .batch_named(vec![
            NamedCall::new("getChainInfo", json!([])),
            NamedCall::new("registerSender", json!([address(7), "dave"])),
        ])
        .await
        .unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[1], MethodResult::RegisterSender(address(7)));
}

#[tokio::test]
async fn test_named_send_tx_with_uppercase_from() {
    let agent = scripted_agent();
    let adapter = adapter(&agent).await;

    let from = address(2).as_str().to_uppercase().replacen("0X", "0x", 1);
    let results = adapter
        .batch_named(vec![NamedCall::new(
            "sendTx",
            json!([{ "calls": [] }, { "from": from }]),
        )])
        .await
        .unwrap();

    assert_eq!(
        results,
        vec![MethodResult::SendTx(TxHash::from_bytes([9; FIELD_BYTES]))]
    );
    let submitted = agent.executed();
    assert_eq!(submitted[0][0].scope, Scope::account(secondary_account()));
}

#[tokio::test]
async fn test_named_batch_with_unknown_method() {
    let agent = scripted_agent();
    let adapter = adapter(&agent).await;

    let err = adapter
        .batch_named(vec![
            NamedCall::new("getChainInfo", json!([])),
            NamedCall::new("signMessage", json!(["hello"])),
        ])
        .await
        .unwrap_err();
    assert_eq!(err, WalletError::UnsupportedMethod("signMessage".into()));
    assert_eq!(agent.execute_calls(), 0);
}

#[tokio::test]
async fn test_batch_reconnects_once() {
    let agent = scripted_agent();
    let adapter = adapter(&agent).await;
    adapter.disconnect().await.unwrap();

    adapter
        .batch(&[MethodCall::GetChainInfo, MethodCall::GetCurrentBaseFees])
        .await
        .unwrap();
    assert_eq!(agent.connect_calls(), 2);
    assert_eq!(agent.execute_calls(), 1);
}

fn call_for(index: u8) -> MethodCall {
    match index % 4 {
        0 => MethodCall::GetChainInfo,
        1 => register_sender(),
        2 => send_tx(1),
        _ => MethodCall::GetCurrentBaseFees,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_batch_output_matches_input(indices in proptest::collection::vec(any::<u8>(), 1..12)) {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let calls: Vec<MethodCall> = indices.iter().copied().map(call_for).collect();

        let names = runtime.block_on(async {
            let agent = scripted_agent();
            let adapter = adapter(&agent).await;
            let results = adapter.batch(&calls).await.unwrap();
            assert_eq!(agent.execute_calls(), 1);
            results.iter().map(MethodResult::name).collect::<Vec<_>>()
        });

        let expected: Vec<&str> = calls.iter().map(MethodCall::name).collect();
        prop_assert_eq!(names, expected);
    }
}

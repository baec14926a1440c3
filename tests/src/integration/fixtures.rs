//! Scripted agents and sample ledger values shared by the flows.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wallet_adapter::{
    AdapterConfig, MethodKind, MockAgent, OperationResult, ProtocolVersion,
    TESTNET_CHAIN_ID,
};
use wallet_types::{AccountId, AztecAddress, Fr, TxHash, FIELD_BYTES};

/// Address with every byte set to `byte`.
pub fn address(byte: u8) -> AztecAddress {
    AztecAddress::from_bytes([byte; FIELD_BYTES])
}

/// Field element with every byte set to `byte`.
pub fn fr(byte: u8) -> Fr {
    Fr::from_bytes([byte; FIELD_BYTES])
}

/// The primary session account.
pub fn primary_account() -> AccountId {
    AccountId::on_chain(TESTNET_CHAIN_ID, &address(1))
}

/// A second session account.
pub fn secondary_account() -> AccountId {
    AccountId::on_chain(TESTNET_CHAIN_ID, &address(2))
}

/// Chain info every scripted agent reports.
pub fn chain_info() -> serde_json::Value {
    json!({ "chainId": fr(0x11), "version": fr(0x22) })
}

/// Test configuration for `protocol`.
pub fn config(protocol: ProtocolVersion) -> AdapterConfig {
    AdapterConfig {
        protocol,
        ..AdapterConfig::for_testing()
    }
}

/// Agent exposing both accounts, with the identity bundle and the common
/// read methods scripted.
pub fn scripted_agent() -> Arc<MockAgent> {
    Arc::new(
        MockAgent::new(vec![primary_account(), secondary_account()])
            .with_response(
                MethodKind::GetCompleteAddress,
                OperationResult::ok(json!({
                    "address": address(1),
                    "publicKeys": { "masterNullifierPublicKey": "0x01" },
                    "partialAddress": fr(3),
                })),
            )
            .with_response(MethodKind::GetAddress, OperationResult::ok(json!(address(1))))
            .with_response(MethodKind::GetChainId, OperationResult::ok(json!(fr(0x11))))
            .with_response(MethodKind::GetVersion, OperationResult::ok(json!(fr(0x22))))
            .with_response(MethodKind::GetChainInfo, OperationResult::ok(chain_info()))
            .with_response(
                MethodKind::RegisterSender,
                OperationResult::ok(json!(address(7))),
            )
            .with_response(
                MethodKind::SendTx,
                OperationResult::ok(json!(TxHash::from_bytes([9; FIELD_BYTES]))),
            )
            .with_response(
                MethodKind::GetCurrentBaseFees,
                OperationResult::ok(json!({ "feePerDaGas": "12", "feePerL2Gas": "34" })),
            ),
    )
}

/// Poll `condition` until it holds or a second passes; yields between polls
/// so the adapter's event listener can run.
pub async fn eventually(condition: impl Fn() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(1);
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    condition()
}

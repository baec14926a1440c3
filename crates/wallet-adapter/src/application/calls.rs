//! Typed Wallet calls and their results.
//!
//! Every Wallet method has a [`MethodCall`] variant. A call knows its method
//! kind, how to encode itself into an [`Operation`], which account (if any)
//! must authorize it, and how to decode the agent's raw result into the
//! matching [`MethodResult`] variant.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use wallet_types::{
    parse, Aliased, AuthWitIntent, AuthWitness, AztecAddress, ChainInfo, ContractArtifact,
    ContractClassMetadata, ContractInstanceWithAddress, ContractMetadata, ExecutionPayload, Fr,
    FunctionCall, GasFees, PrivateEvent, PrivateEventQuery, ProfileOptions, Schema, SchemaError,
    SendOptions, SimulateOptions, TxHash, TxProfileResult, TxReceipt, TxSimulationResult,
    UtilitySimulationResult,
};

use crate::domain::{MethodKind, Operation, Scope, WalletError};

/// One Wallet call, as submitted individually or inside a batch.
#[derive(Debug, Clone, PartialEq)]
pub enum MethodCall {
    GetChainInfo,
    GetContractMetadata {
        address: AztecAddress,
    },
    GetContractClassMetadata {
        id: Fr,
        include_artifact: bool,
    },
    GetTxReceipt {
        tx_hash: TxHash,
    },
    RegisterSender {
        address: AztecAddress,
        alias: String,
    },
    GetAddressBook,
    GetAccounts,
    RegisterContract {
        instance: ContractInstanceWithAddress,
        artifact: Option<ContractArtifact>,
        secret_key: Option<Fr>,
    },
    SimulateTx {
        exec: ExecutionPayload,
        opts: SimulateOptions,
    },
    SimulateUtility {
        call: FunctionCall,
        authwits: Vec<AuthWitness>,
    },
    ProfileTx {
        exec: ExecutionPayload,
        opts: ProfileOptions,
    },
    SendTx {
        exec: ExecutionPayload,
        opts: SendOptions,
    },
    CreateAuthWit {
        from: AztecAddress,
        intent: AuthWitIntent,
    },
    GetPrivateEvents {
        query: PrivateEventQuery,
    },
    GetCurrentBaseFees,
}

/// Decoded result of one call, tagged with its method name when serialized.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "name", content = "result", rename_all = "camelCase")]
pub enum MethodResult {
    GetChainInfo(ChainInfo),
    GetContractMetadata(ContractMetadata),
    GetContractClassMetadata(ContractClassMetadata),
    GetTxReceipt(TxReceipt),
    RegisterSender(AztecAddress),
    GetAddressBook(Vec<Aliased<AztecAddress>>),
    GetAccounts(Vec<Aliased<AztecAddress>>),
    RegisterContract(ContractInstanceWithAddress),
    SimulateTx(TxSimulationResult),
    SimulateUtility(UtilitySimulationResult),
    ProfileTx(TxProfileResult),
    SendTx(TxHash),
    CreateAuthWit(AuthWitness),
    GetPrivateEvents(Vec<PrivateEvent>),
    GetCurrentBaseFees(GasFees),
}

/// A call addressed by method name, for dynamic callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedCall {
    /// Wallet method name (`getChainInfo`).
    pub name: String,
    /// Positional arguments.
    #[serde(default)]
    pub args: Value,
}

impl NamedCall {
    pub fn new(name: impl Into<String>, args: Value) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }
}

impl MethodCall {
    /// The operation kind this call encodes to.
    #[must_use]
    pub fn kind(&self) -> MethodKind {
        match self {
            Self::GetChainInfo => MethodKind::GetChainInfo,
            Self::GetContractMetadata { .. } => MethodKind::GetContractMetadata,
            Self::GetContractClassMetadata { .. } => MethodKind::GetContractClassMetadata,
            Self::GetTxReceipt { .. } => MethodKind::GetTxReceipt,
            Self::RegisterSender { .. } => MethodKind::RegisterSender,
            Self::GetAddressBook => MethodKind::GetAddressBook,
            Self::GetAccounts => MethodKind::GetAccounts,
            Self::RegisterContract { .. } => MethodKind::RegisterContract,
            Self::SimulateTx { .. } => MethodKind::SimulateTx,
            Self::SimulateUtility { .. } => MethodKind::SimulateUtility,
            Self::ProfileTx { .. } => MethodKind::ProfileTx,
            Self::SendTx { .. } => MethodKind::SendTx,
            Self::CreateAuthWit { .. } => MethodKind::CreateAuthWit,
            Self::GetPrivateEvents { .. } => MethodKind::GetPrivateEvents,
            Self::GetCurrentBaseFees => MethodKind::GetCurrentBaseFees,
        }
    }

    /// Wallet method name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.kind().method_name()
    }

    /// The address that must authorize this call, for account-scoped calls.
    #[must_use]
    pub fn authorizing_account(&self) -> Option<&AztecAddress> {
        match self {
            Self::SimulateTx { opts, .. } => Some(&opts.from),
            Self::ProfileTx { opts, .. } => Some(&opts.from),
            Self::SendTx { opts, .. } => Some(&opts.from),
            Self::CreateAuthWit { from, .. } => Some(from),
            _ => None,
        }
    }

    /// Build the operation for this call under `scope`.
    pub fn encode(&self, scope: Scope) -> Result<Operation, WalletError> {
        self.encode_fields(Operation::new(self.kind(), scope))
            .map_err(|e| WalletError::validation(self.name(), e))
    }

    fn encode_fields(&self, op: Operation) -> Result<Operation, SchemaError> {
        match self {
            Self::GetChainInfo
            | Self::GetAddressBook
            | Self::GetAccounts
            | Self::GetCurrentBaseFees => Ok(op),
            Self::GetContractMetadata { address } => op.with_field("address", address),
            Self::GetContractClassMetadata {
                id,
                include_artifact,
            } => op
                .with_field("id", id)?
                .with_field("includeArtifact", include_artifact),
            Self::GetTxReceipt { tx_hash } => op.with_field("txHash", tx_hash),
            Self::RegisterSender { address, alias } => {
                op.with_field("address", address)?.with_field("alias", alias)
            }
            Self::RegisterContract {
                instance,
                artifact,
                secret_key,
            } => {
                let mut op = op.with_field("instance", instance)?;
                if let Some(artifact) = artifact {
                    op = op.with_field("artifact", artifact)?;
                }
                if let Some(secret_key) = secret_key {
                    op = op.with_field("secretKey", secret_key)?;
                }
                Ok(op)
            }
            Self::SimulateTx { exec, opts } => {
                op.with_field("exec", exec)?.with_field("opts", opts)
            }
            Self::SimulateUtility { call, authwits } => {
                op.with_field("call", call)?.with_field("authwits", authwits)
            }
            Self::ProfileTx { exec, opts } => op.with_field("exec", exec)?.with_field("opts", opts),
            Self::SendTx { exec, opts } => op.with_field("exec", exec)?.with_field("opts", opts),
            Self::CreateAuthWit { intent, .. } => op.with_field("intent", intent),
            Self::GetPrivateEvents { query } => op.with_fields_from(query),
        }
    }

    /// Validate an `ok` payload against this call's result schema.
    pub fn decode(&self, raw: Value) -> Result<MethodResult, WalletError> {
        let kind = self.kind();
        Ok(match self {
            Self::GetChainInfo => MethodResult::GetChainInfo(parse_result(kind, raw)?),
            Self::GetContractMetadata { .. } => {
                MethodResult::GetContractMetadata(parse_result(kind, raw)?)
            }
            Self::GetContractClassMetadata { .. } => {
                MethodResult::GetContractClassMetadata(parse_result(kind, raw)?)
            }
            Self::GetTxReceipt { .. } => MethodResult::GetTxReceipt(parse_result(kind, raw)?),
            Self::RegisterSender { .. } => MethodResult::RegisterSender(parse_result(kind, raw)?),
            Self::GetAddressBook => MethodResult::GetAddressBook(parse_result(kind, raw)?),
            Self::GetAccounts => MethodResult::GetAccounts(parse_result(kind, raw)?),
            Self::RegisterContract { .. } => {
                MethodResult::RegisterContract(parse_result(kind, raw)?)
            }
            Self::SimulateTx { .. } => MethodResult::SimulateTx(parse_result(kind, raw)?),
            Self::SimulateUtility { .. } => {
                MethodResult::SimulateUtility(parse_result(kind, raw)?)
            }
            Self::ProfileTx { .. } => MethodResult::ProfileTx(parse_result(kind, raw)?),
            Self::SendTx { .. } => MethodResult::SendTx(parse_result(kind, raw)?),
            Self::CreateAuthWit { .. } => MethodResult::CreateAuthWit(parse_result(kind, raw)?),
            Self::GetPrivateEvents { .. } => {
                MethodResult::GetPrivateEvents(parse_result(kind, raw)?)
            }
            Self::GetCurrentBaseFees => MethodResult::GetCurrentBaseFees(parse_result(kind, raw)?),
        })
    }

    /// Build a call from a method name and a JSON array of positional
    /// arguments. Unknown names fail with `UnsupportedMethod`.
    pub fn from_named(name: &str, args: Value) -> Result<Self, WalletError> {
        let check = |result: Result<(), SchemaError>| {
            result.map_err(|e| WalletError::validation(name, e))
        };

        let call = match name {
            "getChainInfo" => no_args(name, args).map(|()| Self::GetChainInfo)?,
            "getAddressBook" => no_args(name, args).map(|()| Self::GetAddressBook)?,
            "getAccounts" => no_args(name, args).map(|()| Self::GetAccounts)?,
            "getCurrentBaseFees" => no_args(name, args).map(|()| Self::GetCurrentBaseFees)?,
            "getContractMetadata" => {
                let (address,): (AztecAddress,) = positional(name, args, 1)?;
                check(address.check())?;
                Self::GetContractMetadata { address }
            }
            "getContractClassMetadata" => {
                let (id, include_artifact): (Fr, Option<bool>) = positional(name, args, 2)?;
                check(id.check())?;
                Self::GetContractClassMetadata {
                    id,
                    include_artifact: include_artifact.unwrap_or(false),
                }
            }
            "getTxReceipt" => {
                let (tx_hash,): (TxHash,) = positional(name, args, 1)?;
                check(tx_hash.check())?;
                Self::GetTxReceipt { tx_hash }
            }
            "registerSender" => {
                let (address, alias): (AztecAddress, Option<String>) =
                    positional(name, args, 2)?;
                check(address.check())?;
                Self::RegisterSender {
                    address,
                    alias: alias.unwrap_or_default(),
                }
            }
            "registerContract" => {
                let (instance, artifact, secret_key): (
                    ContractInstanceWithAddress,
                    Option<ContractArtifact>,
                    Option<Fr>,
                ) = positional(name, args, 3)?;
                check(instance.check())?;
                check(artifact.check())?;
                check(secret_key.check())?;
                Self::RegisterContract {
                    instance,
                    artifact,
                    secret_key,
                }
            }
            "simulateTx" => {
                let (exec, opts): (ExecutionPayload, SimulateOptions) =
                    positional(name, args, 2)?;
                check(exec.check())?;
                check(opts.from.check())?;
                Self::SimulateTx { exec, opts }
            }
            "simulateUtility" => {
                let (call, authwits): (FunctionCall, Option<Vec<AuthWitness>>) =
                    positional(name, args, 2)?;
                check(call.check())?;
                check(authwits.check())?;
                Self::SimulateUtility {
                    call,
                    authwits: authwits.unwrap_or_default(),
                }
            }
            "profileTx" => {
                let (exec, opts): (ExecutionPayload, ProfileOptions) = positional(name, args, 2)?;
                check(exec.check())?;
                check(opts.from.check())?;
                Self::ProfileTx { exec, opts }
            }
            "sendTx" => {
                let (exec, opts): (ExecutionPayload, SendOptions) = positional(name, args, 2)?;
                check(exec.check())?;
                check(opts.from.check())?;
                Self::SendTx { exec, opts }
            }
            "createAuthWit" => {
                let (from, intent): (AztecAddress, AuthWitIntent) = positional(name, args, 2)?;
                check(from.check())?;
                check(intent.check())?;
                Self::CreateAuthWit { from, intent }
            }
            "getPrivateEvents" => {
                let (query,): (PrivateEventQuery,) = positional(name, args, 1)?;
                check(query.contract_address.check())?;
                check(query.recipients.check())?;
                Self::GetPrivateEvents { query }
            }
            other => return Err(WalletError::UnsupportedMethod(other.to_string())),
        };
        Ok(call)
    }
}

impl TryFrom<NamedCall> for MethodCall {
    type Error = WalletError;

    fn try_from(call: NamedCall) -> Result<Self, Self::Error> {
        Self::from_named(&call.name, call.args)
    }
}

impl MethodResult {
    /// The method kind that produced this result.
    #[must_use]
    pub fn kind(&self) -> MethodKind {
        match self {
            Self::GetChainInfo(_) => MethodKind::GetChainInfo,
            Self::GetContractMetadata(_) => MethodKind::GetContractMetadata,
            Self::GetContractClassMetadata(_) => MethodKind::GetContractClassMetadata,
            Self::GetTxReceipt(_) => MethodKind::GetTxReceipt,
            Self::RegisterSender(_) => MethodKind::RegisterSender,
            Self::GetAddressBook(_) => MethodKind::GetAddressBook,
            Self::GetAccounts(_) => MethodKind::GetAccounts,
            Self::RegisterContract(_) => MethodKind::RegisterContract,
            Self::SimulateTx(_) => MethodKind::SimulateTx,
            Self::SimulateUtility(_) => MethodKind::SimulateUtility,
            Self::ProfileTx(_) => MethodKind::ProfileTx,
            Self::SendTx(_) => MethodKind::SendTx,
            Self::CreateAuthWit(_) => MethodKind::CreateAuthWit,
            Self::GetPrivateEvents(_) => MethodKind::GetPrivateEvents,
            Self::GetCurrentBaseFees(_) => MethodKind::GetCurrentBaseFees,
        }
    }

    /// Wallet method name of the call this result answers.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.kind().method_name()
    }
}

/// Validate a raw result as `T`, attributing failures to `kind`.
pub(crate) fn parse_result<T: Schema>(kind: MethodKind, raw: Value) -> Result<T, WalletError> {
    parse(raw).map_err(|e| WalletError::validation(kind.method_name(), e))
}

fn invalid_args(method: &str, reason: impl Into<String>) -> WalletError {
    WalletError::validation(method, SchemaError::Malformed(reason.into()))
}

fn argument_list(method: &str, args: Value) -> Result<Vec<Value>, WalletError> {
    match args {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => Ok(items),
        other => Err(invalid_args(
            method,
            format!("expected an argument array, got {other}"),
        )),
    }
}

fn no_args(method: &str, args: Value) -> Result<(), WalletError> {
    let items = argument_list(method, args)?;
    if items.is_empty() {
        Ok(())
    } else {
        Err(invalid_args(
            method,
            format!("takes no arguments, got {}", items.len()),
        ))
    }
}

/// Deserialize up to `arity` positional arguments; missing trailing
/// arguments become `null`.
fn positional<T: DeserializeOwned>(
    method: &str,
    args: Value,
    arity: usize,
) -> Result<T, WalletError> {
    let mut items = argument_list(method, args)?;
    if items.len() > arity {
        return Err(invalid_args(
            method,
            format!("expected at most {arity} arguments, got {}", items.len()),
        ));
    }
    items.resize(arity, Value::Null);
    serde_json::from_value(Value::Array(items)).map_err(|e| invalid_args(method, e.to_string()))
}

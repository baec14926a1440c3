//! Session state shared between the session manager and the dispatchers.

use std::sync::atomic::{AtomicU64, Ordering};

use wallet_types::{AccountId, AztecAddress, CompleteAddress, Fr};

/// Identity facts fetched once per live session (account-bound protocol).
///
/// Assigned as a whole: either all four facts are present or none are.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionIdentity {
    /// The agent account the session acts as.
    pub account: AccountId,
    /// Address with its keys.
    pub complete_address: CompleteAddress,
    /// Account address.
    pub address: AztecAddress,
    /// Chain id reported by the agent.
    pub chain_id: Fr,
    /// Protocol version reported by the agent.
    pub version: Fr,
}

/// Session counters for diagnostics.
#[derive(Debug, Default)]
pub struct SessionStats {
    /// Agent `connect` calls issued.
    pub agent_connects: AtomicU64,
    /// `execute` exchanges issued.
    pub exchanges: AtomicU64,
    /// Operations submitted across all exchanges.
    pub operations: AtomicU64,
    /// Sessions torn down by agent events.
    pub forced_disconnects: AtomicU64,
}

impl SessionStats {
    pub(crate) fn record_connect(&self) {
        self.agent_connects.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_exchange(&self, operations: usize) {
        self.exchanges.fetch_add(1, Ordering::Relaxed);
        self.operations
            .fetch_add(operations as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_forced_disconnect(&self) {
        self.forced_disconnects.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of the counters.
    #[must_use]
    pub fn snapshot(&self) -> SessionStatsSnapshot {
        SessionStatsSnapshot {
            agent_connects: self.agent_connects.load(Ordering::Relaxed),
            exchanges: self.exchanges.load(Ordering::Relaxed),
            operations: self.operations.load(Ordering::Relaxed),
            forced_disconnects: self.forced_disconnects.load(Ordering::Relaxed),
        }
    }
}

/// Plain copy of [`SessionStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStatsSnapshot {
    pub agent_connects: u64,
    pub exchanges: u64,
    pub operations: u64,
    pub forced_disconnects: u64,
}

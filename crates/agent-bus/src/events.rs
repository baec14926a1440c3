//! # Agent Events
//!
//! Notifications the signing agent emits about a dapp session.

use serde::{Deserialize, Serialize};
use wallet_types::{AccountId, PermissionGrant};

/// A session change reported by the agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentEvent {
    /// The dapp session became live.
    Connected,

    /// The session ended (user or agent initiated).
    Disconnected,

    /// The set of accounts exposed to the dapp changed.
    AccountsChanged(Vec<AccountId>),

    /// The permissions granted to the dapp changed.
    PermissionsChanged(Vec<PermissionGrant>),
}

impl AgentEvent {
    /// Category consulted by [`EventFilter`].
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::Connected | Self::Disconnected => EventTopic::Session,
            Self::AccountsChanged(_) => EventTopic::Accounts,
            Self::PermissionsChanged(_) => EventTopic::Permissions,
        }
    }

    /// Short name used in log fields.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
            Self::AccountsChanged(_) => "accounts_changed",
            Self::PermissionsChanged(_) => "permissions_changed",
        }
    }
}

/// Notification categories a listener can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Connect and disconnect notifications.
    Session,
    /// Account list changes.
    Accounts,
    /// Permission grant changes.
    Permissions,
    /// Wildcard.
    All,
}

/// Topic selection for one subscription.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Selected topics; empty selects everything.
    pub topics: Vec<EventTopic>,
}

impl EventFilter {
    /// Accept every notification.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Accept only `topics`.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self { topics }
    }

    /// Whether `event` passes.
    #[must_use]
    pub fn matches(&self, event: &AgentEvent) -> bool {
        self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic())
    }
}

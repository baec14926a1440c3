//! # Agent Bus - Session Change Notifications
//!
//! The signing agent reports session changes asynchronously: the user
//! switched accounts, narrowed the permissions granted to the dapp, or
//! disconnected it. This crate carries those notifications from the agent
//! transport to every interested listener.
//!
//! ```text
//! ┌──────────────┐   publish()   ┌──────────────┐  subscribe()  ┌──────────────┐
//! │ Agent client │ ────────────▶ │  Event Bus   │ ────────────▶ │ Wallet       │
//! │ (transport)  │               │ (broadcast)  │               │ adapter/app  │
//! └──────────────┘               └──────────────┘               └──────────────┘
//! ```
//!
//! Each subscriber gets every event published after it subscribed; a slow
//! subscriber that lags behind the channel capacity skips the oldest events.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod events;
pub mod publisher;
pub mod subscriber;

pub use events::{AgentEvent, EventFilter, EventTopic};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{EventStream, Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before the oldest are dropped.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_capacity() {
        assert_eq!(DEFAULT_CHANNEL_CAPACITY, 64);
    }
}

//! # Publishing
//!
//! Agent transports push session notifications through [`EventPublisher`];
//! [`InMemoryEventBus`] fans them out to every live subscription.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::{debug, trace};

use crate::events::{AgentEvent, EventFilter};
use crate::subscriber::{EventStream, Subscription};
use crate::DEFAULT_CHANNEL_CAPACITY;

/// Sink for agent notifications.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Deliver `event` to current subscribers; returns how many saw it.
    async fn publish(&self, event: AgentEvent) -> usize;

    /// Notifications accepted so far, delivered or not.
    fn events_published(&self) -> u64;
}

/// Broadcast-backed notification bus owned by one agent client.
pub struct InMemoryEventBus {
    sender: broadcast::Sender<AgentEvent>,
    capacity: usize,
    published: AtomicU64,
    undelivered: AtomicU64,
}

impl InMemoryEventBus {
    /// Bus buffering [`DEFAULT_CHANNEL_CAPACITY`] notifications per subscriber.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Bus buffering `capacity` notifications per subscriber (at least one).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            capacity,
            published: AtomicU64::new(0),
            undelivered: AtomicU64::new(0),
        }
    }

    /// Listen for notifications accepted by `filter`.
    #[must_use]
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        debug!(topics = ?filter.topics, "Agent notification listener attached");
        Subscription::new(self.sender.subscribe(), filter)
    }

    /// [`InMemoryEventBus::subscribe`] as a `Stream`.
    #[must_use]
    pub fn event_stream(&self, filter: EventFilter) -> EventStream {
        self.subscribe(filter).into_stream()
    }

    /// Live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Per-subscriber buffer size.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Notifications published while nobody was listening.
    #[must_use]
    pub fn events_undelivered(&self) -> u64 {
        self.undelivered.load(Ordering::Relaxed)
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: AgentEvent) -> usize {
        let name = event.name();
        self.published.fetch_add(1, Ordering::Relaxed);

        let delivered = self.sender.send(event).unwrap_or(0);
        if delivered == 0 {
            self.undelivered.fetch_add(1, Ordering::Relaxed);
            trace!(event = name, "Agent notification had no listeners");
        } else {
            debug!(event = name, listeners = delivered, "Agent notification delivered");
        }
        delivered
    }

    fn events_published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventTopic;
    use wallet_types::AccountId;

    #[tokio::test]
    async fn test_notification_without_listeners_is_counted() {
        let bus = InMemoryEventBus::new();

        assert_eq!(bus.publish(AgentEvent::Disconnected).await, 0);
        assert_eq!(bus.events_published(), 1);
        assert_eq!(bus.events_undelivered(), 1);
    }

    #[tokio::test]
    async fn test_every_listener_sees_the_notification() {
        let bus = InMemoryEventBus::new();
        let _adapter = bus.subscribe(EventFilter::all());
        let _accounts_only = bus.subscribe(EventFilter::topics(vec![EventTopic::Accounts]));

        // Topic filtering happens in the subscription, not at send time.
        let delivered = bus
            .publish(AgentEvent::AccountsChanged(vec![AccountId::new("aztec:1:0x01")]))
            .await;
        assert_eq!(delivered, 2);
        assert_eq!(bus.subscriber_count(), 2);
        assert_eq!(bus.events_undelivered(), 0);
    }

    #[tokio::test]
    async fn test_dropped_subscription_detaches() {
        let bus = InMemoryEventBus::new();
        let sub = bus.subscribe(EventFilter::all());
        drop(sub);
        assert_eq!(bus.subscriber_count(), 0);
        assert_eq!(bus.publish(AgentEvent::Connected).await, 0);
    }

    #[test]
    fn test_capacity_has_a_floor_of_one() {
        assert_eq!(InMemoryEventBus::with_capacity(0).capacity(), 1);
        assert_eq!(InMemoryEventBus::default().capacity(), DEFAULT_CHANNEL_CAPACITY);
    }
}

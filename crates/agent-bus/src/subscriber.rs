//! # Subscriptions
//!
//! A [`Subscription`] is one listener's view of the bus: it yields only the
//! notifications its filter accepts and skips past anything it fell too far
//! behind to see.

use std::pin::Pin;
use std::task::{Context, Poll};

use thiserror::Error;
use tokio::sync::broadcast::{
    self,
    error::{RecvError, TryRecvError},
};
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};
use tracing::debug;

use crate::events::{AgentEvent, EventFilter};

/// Subscription failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The bus (and with it the agent client) is gone.
    #[error("Agent notification bus closed")]
    Closed,

    /// The listener fell behind; carries the number of overwritten notifications.
    #[error("Listener missed {0} agent notifications")]
    Lagged(u64),
}

/// One listener on an [`InMemoryEventBus`](crate::InMemoryEventBus).
pub struct Subscription {
    receiver: broadcast::Receiver<AgentEvent>,
    filter: EventFilter,
}

impl Subscription {
    pub(crate) fn new(receiver: broadcast::Receiver<AgentEvent>, filter: EventFilter) -> Self {
        Self { receiver, filter }
    }

    /// Wait for the next accepted notification. `None` once the bus is dropped.
    pub async fn recv(&mut self) -> Option<AgentEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if self.filter.matches(&event) => return Some(event),
                Ok(_) => {}
                Err(RecvError::Lagged(missed)) => {
                    debug!(missed, "Notification listener fell behind");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Like [`Subscription::recv`], but a lag is returned to the caller
    /// instead of being skipped. Listeners that keep state derived from the
    /// notifications use this to learn that some were lost.
    pub async fn recv_checked(&mut self) -> Result<AgentEvent, SubscriptionError> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if self.filter.matches(&event) => return Ok(event),
                Ok(_) => {}
                Err(RecvError::Lagged(missed)) => return Err(SubscriptionError::Lagged(missed)),
                Err(RecvError::Closed) => return Err(SubscriptionError::Closed),
            }
        }
    }

    /// Next accepted notification if one is already buffered.
    pub fn try_recv(&mut self) -> Result<Option<AgentEvent>, SubscriptionError> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) if self.filter.matches(&event) => return Ok(Some(event)),
                Ok(_) | Err(TryRecvError::Lagged(_)) => {}
                Err(TryRecvError::Empty) => return Ok(None),
                Err(TryRecvError::Closed) => return Err(SubscriptionError::Closed),
            }
        }
    }

    /// The filter applied to this subscription.
    #[must_use]
    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }

    /// Convert into a `Stream`.
    #[must_use]
    pub fn into_stream(self) -> EventStream {
        EventStream::new(self)
    }
}

/// [`Subscription`] as a `tokio_stream::Stream`.
pub struct EventStream {
    inner: Pin<Box<dyn Stream<Item = AgentEvent> + Send>>,
    filter: EventFilter,
}

impl EventStream {
    #[must_use]
    pub fn new(subscription: Subscription) -> Self {
        let Subscription { receiver, filter } = subscription;
        let accept = filter.clone();
        let inner = BroadcastStream::new(receiver).filter_map(move |item| match item {
            Ok(event) => accept.matches(&event).then_some(event),
            Err(BroadcastStreamRecvError::Lagged(missed)) => {
                debug!(missed, "Notification stream fell behind");
                None
            }
        });
        Self {
            inner: Box::pin(inner),
            filter,
        }
    }

    /// The filter applied to this stream.
    #[must_use]
    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }
}

impl Stream for EventStream {
    type Item = AgentEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<AgentEvent>> {
        self.inner.as_mut().poll_next(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventTopic;
    use crate::publisher::InMemoryEventBus;
    use crate::EventPublisher;
    use std::time::Duration;
    use tokio::time::timeout;
    use wallet_types::{AccountId, PermissionGrant};

    const WAIT: Duration = Duration::from_millis(100);

    #[tokio::test]
    async fn test_listener_receives_disconnect() {
        let bus = InMemoryEventBus::new();
        let mut listener = bus.subscribe(EventFilter::all());

        bus.publish(AgentEvent::Disconnected).await;

        let event = timeout(WAIT, listener.recv()).await.expect("timeout");
        assert_eq!(event, Some(AgentEvent::Disconnected));
    }

    #[tokio::test]
    async fn test_accounts_listener_skips_session_events() {
        let bus = InMemoryEventBus::new();
        let mut listener = bus.subscribe(EventFilter::topics(vec![EventTopic::Accounts]));

        bus.publish(AgentEvent::Connected).await;
        let accounts = vec![AccountId::new("aztec:31337:0x01")];
        bus.publish(AgentEvent::AccountsChanged(accounts.clone()))
            .await;

        let event = timeout(WAIT, listener.recv()).await.expect("timeout");
        assert_eq!(event, Some(AgentEvent::AccountsChanged(accounts)));
    }

    #[tokio::test]
    async fn test_try_recv_on_quiet_bus() {
        let bus = InMemoryEventBus::new();
        let mut listener = bus.subscribe(EventFilter::all());
        assert_eq!(listener.try_recv(), Ok(None));
    }

    #[tokio::test]
    async fn test_lagging_listener_keeps_newest() {
        let bus = InMemoryEventBus::with_capacity(1);
        let mut listener = bus.subscribe(EventFilter::all());

        bus.publish(AgentEvent::Connected).await;
        bus.publish(AgentEvent::Disconnected).await;

        assert_eq!(listener.try_recv(), Ok(Some(AgentEvent::Disconnected)));
    }

    #[tokio::test]
    async fn test_checked_listener_reports_lag_then_resumes() {
        let bus = InMemoryEventBus::with_capacity(2);
        let mut listener = bus.subscribe(EventFilter::all());

        bus.publish(AgentEvent::PermissionsChanged(vec![])).await;
        bus.publish(AgentEvent::Connected).await;
        bus.publish(AgentEvent::Disconnected).await;

        assert_eq!(listener.recv_checked().await, Err(SubscriptionError::Lagged(1)));
        assert_eq!(listener.recv_checked().await, Ok(AgentEvent::Connected));
        assert_eq!(listener.recv_checked().await, Ok(AgentEvent::Disconnected));

        drop(bus);
        assert_eq!(listener.recv_checked().await, Err(SubscriptionError::Closed));
    }

    #[tokio::test]
    async fn test_listener_after_client_dropped() {
        let bus = InMemoryEventBus::new();
        let mut listener = bus.subscribe(EventFilter::all());
        drop(bus);
        assert_eq!(listener.recv().await, None);
        assert_eq!(listener.try_recv(), Err(SubscriptionError::Closed));
    }

    #[tokio::test]
    async fn test_permission_stream() {
        let bus = InMemoryEventBus::new();
        let mut stream = bus.event_stream(EventFilter::topics(vec![EventTopic::Permissions]));

        bus.publish(AgentEvent::Disconnected).await;
        bus.publish(AgentEvent::PermissionsChanged(vec![PermissionGrant::default()]))
            .await;

        let next = timeout(WAIT, stream.next()).await.expect("timeout");
        assert_eq!(
            next,
            Some(AgentEvent::PermissionsChanged(vec![PermissionGrant::default()]))
        );
        assert_eq!(EventStream::filter(&stream).topics, vec![EventTopic::Permissions]);
    }
}

//! Live broadcast hub.
//!
//! [`LiveHub`] keeps a registry of viewer subscriptions. Every subscription
//! owns its own bounded `tokio::sync::broadcast` channel, so a slow viewer
//! only ever loses its own oldest events and [`LiveHub::publish`] never
//! waits on anyone.
//!
//! The hub is meant to be created once at startup and shared via
//! `Arc<LiveHub>`.

use std::collections::HashMap;
use std::fmt;
use std::sync::{PoisonError, RwLock};

use guardian_core::topics::ALL_DEVICES;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::event::LiveEvent;

pub use tokio::sync::broadcast::error::{RecvError, TryRecvError};

/// Default per-subscriber buffer size.
pub const DEFAULT_BUFFER_CAPACITY: usize = 64;

// ---------------------------------------------------------------------------
// Scope / ids
// ---------------------------------------------------------------------------

/// Which events a subscription receives.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LiveScope {
    /// Events of one device, by external id.
    Device(String),
    /// Events of every device.
    All,
}

impl LiveScope {
    /// Map a path segment to a scope; `"all"` selects the ALL group.
    pub fn from_device_id(device_id: &str) -> Self {
        if device_id == ALL_DEVICES {
            Self::All
        } else {
            Self::Device(device_id.to_string())
        }
    }

    fn matches(&self, device_id: &str) -> bool {
        match self {
            Self::All => true,
            Self::Device(id) => id == device_id,
        }
    }
}

impl fmt::Display for LiveScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str(ALL_DEVICES),
            Self::Device(id) => f.write_str(id),
        }
    }
}

/// Opaque handle identifying one subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ---------------------------------------------------------------------------
// Subscription
// ---------------------------------------------------------------------------

/// Receiving end of a subscription.
///
/// Dropping it is enough to stop delivery: the hub prunes the entry on the
/// next publish that finds no receiver. Call [`LiveHub::unsubscribe`] to
/// remove it eagerly.
pub struct Subscription {
    id: SubscriptionId,
    scope: LiveScope,
    receiver: broadcast::Receiver<LiveEvent>,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn scope(&self) -> &LiveScope {
        &self.scope
    }

    /// Wait for the next event.
    ///
    /// Returns `RecvError::Lagged(n)` when `n` of the oldest buffered events
    /// were overwritten; the next call continues with the oldest retained
    /// event. Returns `RecvError::Closed` once the hub dropped this
    /// subscription and the buffer is drained.
    pub async fn recv(&mut self) -> Result<LiveEvent, RecvError> {
        self.receiver.recv().await
    }

    /// Take the next buffered event without waiting.
    pub fn try_recv(&mut self) -> Result<LiveEvent, TryRecvError> {
        self.receiver.try_recv()
    }
}

// ---------------------------------------------------------------------------
// LiveHub
// ---------------------------------------------------------------------------

struct Subscriber {
    scope: LiveScope,
    sender: broadcast::Sender<LiveEvent>,
}

/// Registry of live subscriptions with per-subscriber ring buffers.
pub struct LiveHub {
    capacity: usize,
    subscribers: RwLock<HashMap<SubscriptionId, Subscriber>>,
}

impl LiveHub {
    /// Create a hub whose subscribers buffer at most `capacity` events.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "live buffer capacity must be positive");
        Self {
            capacity,
            subscribers: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new subscription for `scope`.
    pub fn subscribe(&self, scope: LiveScope) -> Subscription {
        let (sender, receiver) = broadcast::channel(self.capacity);
        let id = SubscriptionId::new();
        self.subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                id,
                Subscriber {
                    scope: scope.clone(),
                    sender,
                },
            );
        tracing::debug!(subscription_id = %id, scope = %scope, "Live subscription added");
        Subscription {
            id,
            scope,
            receiver,
        }
    }

    /// Remove a subscription. Unknown ids are ignored.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        let removed = self
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
        if removed.is_some() {
            tracing::debug!(subscription_id = %id, "Live subscription removed");
        }
    }

    /// Deliver `event` to the device's subscribers and the ALL group.
    ///
    /// Never blocks. Subscribers whose receiving end is gone are removed.
    /// Returns the number of subscriptions the event was queued for.
    pub fn publish(&self, event: LiveEvent) -> usize {
        let mut delivered = 0;
        let mut dead = Vec::new();

        {
            let subscribers = self
                .subscribers
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            for (id, sub) in subscribers.iter() {
                if !sub.scope.matches(event.device_id()) {
                    continue;
                }
                match sub.sender.send(event.clone()) {
                    Ok(_) => delivered += 1,
                    Err(_) => dead.push(*id),
                }
            }
        }

        if !dead.is_empty() {
            let pruned = self.prune(&dead);
            if pruned > 0 {
                tracing::debug!(pruned, "Pruned dead live subscriptions");
            }
        }

        delivered
    }

    /// Remove the given subscriptions if they still have no receiver.
    /// Returns how many were removed.
    fn prune(&self, candidates: &[SubscriptionId]) -> usize {
        let mut subscribers = self
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let mut pruned = 0;
        for id in candidates {
            // The id may have been removed concurrently.
            if subscribers
                .get(id)
                .is_some_and(|sub| sub.sender.receiver_count() == 0)
            {
                subscribers.remove(id);
                pruned += 1;
            }
        }
        pruned
    }

    /// Number of registered subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Drop every subscription.
    ///
    /// Receivers drain what is buffered and then observe `Closed`. Used
    /// during graceful shutdown.
    pub fn close_all(&self) {
        let mut subscribers = self
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let count = subscribers.len();
        subscribers.clear();
        tracing::info!(count, "Closed all live subscriptions");
    }
}

impl Default for LiveHub {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Event sinks
//!
//! The manager hands every event to an [`EventSink`] synchronously and in
//! emission order. What happens next (forwarding to physical hubs, logging,
//! recording for tests) is up to the sink.

use super::messages::SubnetEvent;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info};

/// Receiver of subnet events.
///
/// `notify` is called once per event, in order, while the manager holds its
/// state exclusively. Implementations must not block and must handle their
/// own delivery failures.
pub trait EventSink: Send + Sync {
    fn notify(&self, event: &SubnetEvent);
}

impl<S: EventSink + ?Sized> EventSink for Arc<S> {
    fn notify(&self, event: &SubnetEvent) {
        (**self).notify(event)
    }
}

// ============================================================================
// InMemorySink
// ============================================================================

/// Records every event, for tests and report generation
#[derive(Debug, Default)]
pub struct InMemorySink {
    events: Mutex<Vec<SubnetEvent>>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of all recorded events
    pub fn events(&self) -> Vec<SubnetEvent> {
        self.events.lock().clone()
    }

    /// Drain recorded events
    pub fn take(&self) -> Vec<SubnetEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl EventSink for InMemorySink {
    fn notify(&self, event: &SubnetEvent) {
        self.events.lock().push(event.clone());
    }
}

// ============================================================================
// TracingSink
// ============================================================================

/// Logs each event at info level
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn notify(&self, event: &SubnetEvent) {
        info!(
            sequence = event.sequence,
            subnet_id = %event.subnet_id,
            kind = %event.kind(),
            routers = ?event.message.routers(),
            targets = ?event.message.targets(),
            "Sending {} command to subnet {}",
            event.kind(),
            event.subnet_id
        );
    }
}

// ============================================================================
// BroadcastSink
// ============================================================================

/// Forwards events to a tokio broadcast channel for async subscribers.
///
/// Events are dropped when nobody is subscribed; lagging receivers lose
/// the oldest events as usual for `broadcast`.
#[derive(Debug, Clone)]
pub struct BroadcastSink {
    tx: broadcast::Sender<SubnetEvent>,
}

impl BroadcastSink {
    /// Default channel capacity
    pub const DEFAULT_CAPACITY: usize = 256;

    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SubnetEvent> {
        self.tx.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for BroadcastSink {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

impl EventSink for BroadcastSink {
    fn notify(&self, event: &SubnetEvent) {
        match self.tx.send(event.clone()) {
            Ok(receivers) => {
                debug!(receivers, sequence = event.sequence, "Broadcast subnet event");
            }
            Err(_) => {
                debug!(sequence = event.sequence, "No receivers for event, message dropped");
            }
        }
    }
}

// ============================================================================
// FanoutSink
// ============================================================================

/// Delivers each event to several sinks, in registration order
#[derive(Default, Clone)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn EventSink>>,
}

impl FanoutSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl EventSink for FanoutSink {
    fn notify(&self, event: &SubnetEvent) {
        for sink in &self.sinks {
            sink.notify(event);
        }
    }
}

//! Bridge between the pipeline and the application-layer consumer.
//!
//! The host application attaches and detaches its consumer at will; the
//! platform keeps delivering broadcasts regardless. [`EventBridge`] buffers
//! classified events in a bounded queue while no consumer is attached and
//! flushes them, in arrival order, the moment one attaches. The queue drops
//! its oldest entry under capacity pressure: delivery is best-effort, and the
//! publishing caller runs inside a time-bounded platform callback that must
//! never stall.

use std::{
    collections::VecDeque,
    sync::{Mutex, MutexGuard, PoisonError},
};

use thiserror::Error;
use tracing::{debug, warn};

use crate::message::ClassifiedMessage;

/// Rejection reported by a consumer for one delivery attempt.
///
/// The bridge logs the failure and drops the event; nothing is retried or
/// requeued, since the platform-level event channel has no acknowledgment.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("consumer rejected event: {reason}")]
pub struct DeliveryError {
    reason: String,
}

impl DeliveryError {
    /// Describe why the consumer rejected the event.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Application-layer sink for classified messages.
pub trait EventConsumer: Send {
    /// Handle one classified message.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError`] when the event cannot be accepted; the
    /// bridge treats the event as consumed either way.
    fn deliver(&self, event: &ClassifiedMessage) -> Result<(), DeliveryError>;
}

/// Result of a [`EventBridge::publish`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PublishOutcome {
    /// A consumer was attached and accepted the event.
    Delivered,
    /// A consumer was attached but rejected the event; the event is dropped.
    Failed,
    /// No consumer was attached; the event was queued.
    Queued,
}

#[derive(Default)]
struct BridgeState {
    queue: VecDeque<ClassifiedMessage>,
    consumer: Option<Box<dyn EventConsumer>>,
}

/// Bounded buffer plus zero-or-one attached consumer.
///
/// One mutex covers both the queue and the consumer slot, so flush-on-attach
/// and any concurrent `publish` are mutually exclusive: an in-flight event is
/// either flushed from the queue or delivered directly, never both and never
/// neither.
pub struct EventBridge {
    capacity: usize,
    state: Mutex<BridgeState>,
}

impl EventBridge {
    /// Create a bridge holding at most `capacity` undelivered events.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            state: Mutex::new(BridgeState::default()),
        }
    }

    /// Install the active consumer, flushing any queued events to it in
    /// arrival order. Flush failures are logged and not retried.
    pub fn attach<C: EventConsumer + 'static>(&self, consumer: C) {
        let mut state = self.lock();
        state.consumer = Some(Box::new(consumer));

        let pending: Vec<ClassifiedMessage> = state.queue.drain(..).collect();
        if !pending.is_empty() {
            debug!(count = pending.len(), "flushing queued events to consumer");
        }
        if let Some(consumer) = state.consumer.as_ref() {
            for event in &pending {
                if let Err(error) = consumer.deliver(event) {
                    warn!(%error, "queued event delivery failed; event dropped");
                }
            }
        }
    }

    /// Remove the active consumer; later events buffer instead.
    pub fn detach(&self) {
        self.lock().consumer = None;
        debug!("consumer detached; buffering further events");
    }

    /// Whether a consumer is currently attached.
    #[must_use]
    pub fn is_attached(&self) -> bool { self.lock().consumer.is_some() }

    /// Number of events waiting for a consumer.
    #[must_use]
    pub fn queued_len(&self) -> usize { self.lock().queue.len() }

    /// Deliver an event to the attached consumer, or queue it.
    ///
    /// With a consumer attached the event is delivered synchronously and the
    /// outcome reported; a rejection is logged and the event dropped. With no
    /// consumer the event is queued, evicting the oldest entry first when the
    /// queue is at capacity. Never blocks beyond the internal mutex.
    pub fn publish(&self, event: ClassifiedMessage) -> PublishOutcome {
        let mut state = self.lock();

        if let Some(consumer) = state.consumer.as_ref() {
            return match consumer.deliver(&event) {
                Ok(()) => PublishOutcome::Delivered,
                Err(error) => {
                    warn!(%error, "event delivery failed; event dropped");
                    PublishOutcome::Failed
                }
            };
        }

        if state.queue.len() >= self.capacity {
            state.queue.pop_front();
            debug!("event queue full; oldest event dropped");
        }
        state.queue.push_back(event);
        PublishOutcome::Queued
    }

    /// A panicking consumer must not wedge the pipeline, so lock poisoning
    /// is absorbed rather than propagated.
    fn lock(&self) -> MutexGuard<'_, BridgeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for EventBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("EventBridge")
            .field("capacity", &self.capacity)
            .field("queued", &state.queue.len())
            .field("attached", &state.consumer.is_some())
            .finish()
    }
}

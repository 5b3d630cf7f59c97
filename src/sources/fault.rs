//! # Fault reporting for dispatched processing units.
//!
//! A source dispatches every target invocation fire-and-forget, so failures
//! cannot surface as return values at the emitting call site. Instead each
//! [`Broadcaster`](crate::Broadcaster) owns a [`FaultBus`] and publishes a
//! [`Fault`] for every failed or panicked invocation — but only when the
//! source was constructed with [`FaultPolicy::Check`]. Under
//! [`FaultPolicy::Ignore`] failures are silently discarded, by design, to
//! keep one misbehaving message from halting the pipeline.
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks.
//! - **Fire-and-forget**: faults are lost if nobody subscribed at send time.
//! - **Lag handling**: slow observers get `RecvError::Lagged(n)` and skip
//!   `n` oldest items.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::error::PipelineError;

/// How a source treats failures raised by its dispatched processing units.
///
/// Covers both target-side failures during broadcast and a propagator's own
/// asynchronous errors (e.g. a routing miss inside
/// [`KAnonymityFilter`](crate::KAnonymityFilter)).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FaultPolicy {
    /// Surface each failure on the source's fault bus. Delivery to other
    /// targets is unaffected either way.
    Check,
    /// Silently discard failures. The default for propagators.
    #[default]
    Ignore,
}

/// One failed invocation, as observed by a source in `Check` mode.
#[derive(Clone, Debug)]
pub struct Fault {
    /// Name of the component whose invocation failed (a target's
    /// [`name`](crate::EventTarget::name), or the reporting stage itself).
    pub origin: Arc<str>,
    /// The underlying failure.
    pub error: PipelineError,
}

/// Extracts a human-readable message from a caught panic payload.
pub(crate) fn panic_info(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Broadcast channel for faults.
///
/// Thin wrapper over [`tokio::sync::broadcast`]. Multiple dispatch tasks
/// publish concurrently; each observer receives clones of each fault.
/// Cheap to clone (internally holds an `Arc`-backed sender).
#[derive(Clone, Debug)]
pub(crate) struct FaultBus {
    tx: broadcast::Sender<Fault>,
}

impl FaultBus {
    /// Creates a new bus with the given channel capacity (minimum 1).
    pub(crate) fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _rx) = broadcast::channel::<Fault>(capacity);
        Self { tx }
    }

    /// Publishes a fault to all active observers.
    ///
    /// If there are no observers, the fault is dropped; this function still
    /// returns immediately.
    pub(crate) fn publish(&self, fault: Fault) {
        let _ = self.tx.send(fault);
    }

    /// Creates a new observer that will see subsequent faults.
    ///
    /// Each call creates an independent receiver; it only gets faults sent
    /// after it subscribed.
    pub(crate) fn subscribe(&self) -> broadcast::Receiver<Fault> {
        self.tx.subscribe()
    }
}

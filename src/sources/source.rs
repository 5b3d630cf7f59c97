//! # Source and propagator capabilities.
//!
//! [`EventSource`] is the public contract of any emitting component: it
//! accepts downstream target registrations. [`EventPropagator`] marks a
//! component that plays both roles — it consumes upstream messages as an
//! [`EventTarget`](crate::EventTarget) and re-emits to its own targets.
//!
//! Propagators get the source half by embedding a
//! [`Broadcaster`](crate::Broadcaster), not by inheriting from a base type;
//! the blanket impl below makes the composed capability explicit without
//! any extra wiring.

use tokio::sync::broadcast;

use crate::sources::fault::Fault;
use crate::targets::{EventTarget, TargetRef};

/// Contract for components that broadcast messages to registered targets.
pub trait EventSource: Send + Sync {
    /// Registers a downstream target.
    ///
    /// Registration happens before messages flow and is append-only; there
    /// is no unregister operation.
    fn register(&self, target: TargetRef);

    /// Creates an observer for failures raised inside this source's
    /// dispatched processing units.
    ///
    /// Silent unless the source was built with
    /// [`FaultPolicy::Check`](crate::FaultPolicy::Check).
    fn faults(&self) -> broadcast::Receiver<Fault>;
}

/// A component that is simultaneously a target and a source.
///
/// Filters are propagators: they sit in the chain consuming upstream
/// messages and broadcasting (possibly transformed, possibly suppressed)
/// messages downstream.
pub trait EventPropagator: EventTarget + EventSource {}

impl<T: EventTarget + EventSource> EventPropagator for T {}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_propagator<T: EventPropagator>() {}

    #[test]
    fn test_filters_compose_both_capabilities() {
        assert_propagator::<crate::DelayFilter>();
        assert_propagator::<crate::KAnonymityFilter>();
    }
}

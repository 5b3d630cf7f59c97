//! # Fan-out helper embedded by every emitting component.
//!
//! [`Broadcaster`] owns the registered-target list and broadcasts messages
//! and the end-of-stream signal to all of them, isolating each target's
//! failures from the others and from the emitting call site.
//!
//! ## Rules
//! - **Independent dispatch**: `send()` spawns one tokio task per target;
//!   a slow or failing target cannot block its siblings.
//! - **No cross-target ordering**: target A may still be processing message
//!   N while target B receives N+5.
//! - **Panic isolation**: each dispatch runs under `catch_unwind`; a panic
//!   becomes a [`Fault`] (policy permitting) and nothing else.
//! - **End once**: the end signal is delivered at most once per target;
//!   repeated `end()` calls are no-ops.
//! - **No retries**: a dropped or failed message is not redelivered.
//!
//! Calling `send()` after `end()` is a programming error; the broadcaster
//! does not defend against it beyond this documentation.

use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::FutureExt;
use parking_lot::RwLock;
use tokio::sync::broadcast;

use crate::error::PipelineError;
use crate::message::Message;
use crate::sources::fault::{panic_info, Fault, FaultBus, FaultPolicy};
use crate::targets::TargetRef;

/// Default fault-bus capacity; slow observers past this lag see `Lagged`.
const FAULT_BUS_CAPACITY: usize = 64;

/// Registration, fan-out, end signal, and fault reporting for one source.
///
/// Filters and device sources embed a `Broadcaster` rather than inheriting
/// base-source behavior; it is the reusable "source half" of an
/// [`EventPropagator`](crate::EventPropagator).
///
/// The target list is append-only and effectively fixed once messages start
/// flowing; `send` reads a snapshot and holds no lock across dispatch.
pub struct Broadcaster {
    /// Stage name, used as fault origin for the source's own errors.
    name: Arc<str>,
    targets: RwLock<Vec<TargetRef>>,
    policy: FaultPolicy,
    faults: FaultBus,
    ended: AtomicBool,
}

impl Broadcaster {
    /// Creates a broadcaster for the named stage.
    pub fn new(name: impl Into<Arc<str>>, policy: FaultPolicy) -> Self {
        Self {
            name: name.into(),
            targets: RwLock::new(Vec::new()),
            policy,
            faults: FaultBus::new(FAULT_BUS_CAPACITY),
            ended: AtomicBool::new(false),
        }
    }

    /// Registers a downstream target. Append-only; there is no unregister.
    ///
    /// Registration should complete before messages start flowing; targets
    /// registered later simply miss earlier messages.
    pub fn register(&self, target: TargetRef) {
        self.targets.write().push(target);
    }

    /// Broadcasts a message to every registered target.
    ///
    /// Each delivery is dispatched as an independent tokio task and awaited
    /// nowhere: this method returns immediately. Failures and panics inside
    /// a delivery are reported per the configured [`FaultPolicy`].
    ///
    /// Must be called within a tokio runtime.
    pub fn send(&self, message: Message) {
        let targets = self.targets.read().clone();
        for target in targets {
            let msg = message.clone();
            let policy = self.policy;
            let faults = self.faults.clone();
            tokio::spawn(async move {
                let outcome = AssertUnwindSafe(target.process_message(msg))
                    .catch_unwind()
                    .await;
                let error = match outcome {
                    Ok(Ok(())) => return,
                    Ok(Err(e)) => e,
                    Err(payload) => PipelineError::TargetPanicked {
                        info: panic_info(payload.as_ref()),
                    },
                };
                if policy == FaultPolicy::Check {
                    faults.publish(Fault {
                        origin: Arc::from(target.name()),
                        error,
                    });
                }
            });
        }
    }

    /// Signals end-of-stream to every registered target, once.
    ///
    /// Subsequent calls are no-ops. Each notification runs under
    /// `catch_unwind` so one panicking target cannot prevent end-signaling
    /// of the rest.
    pub fn end(&self) {
        if self.ended.swap(true, Ordering::SeqCst) {
            return;
        }
        let targets = self.targets.read().clone();
        for target in targets {
            let result = std::panic::catch_unwind(AssertUnwindSafe(|| target.end_processing()));
            if let Err(payload) = result {
                self.report(
                    target.name(),
                    PipelineError::TargetPanicked {
                        info: panic_info(payload.as_ref()),
                    },
                );
            }
        }
    }

    /// Reports a failure raised inside one of this source's own processing
    /// units, subject to the configured [`FaultPolicy`].
    pub fn report(&self, origin: &str, error: PipelineError) {
        if self.policy == FaultPolicy::Check {
            self.faults.publish(Fault {
                origin: Arc::from(origin),
                error,
            });
        }
    }

    /// Creates an observer for this source's faults.
    ///
    /// Only faults published after subscription are seen. Under
    /// [`FaultPolicy::Ignore`] the receiver stays silent.
    pub fn faults(&self) -> broadcast::Receiver<Fault> {
        self.faults.subscribe()
    }

    /// Stage name used as this source's own fault origin.
    pub fn stage_name(&self) -> &str {
        &self.name
    }
}

impl crate::EventSource for Broadcaster {
    fn register(&self, target: TargetRef) {
        Broadcaster::register(self, target);
    }

    fn faults(&self) -> broadcast::Receiver<Fault> {
        Broadcaster::faults(self)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::targets::EventTarget;

    /// Test target that records deliveries and end signals.
    struct Recorder {
        messages: parking_lot::Mutex<Vec<Message>>,
        ends: AtomicUsize,
    }

    impl Recorder {
        fn arc() -> Arc<Self> {
            Arc::new(Self {
                messages: parking_lot::Mutex::new(Vec::new()),
                ends: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl EventTarget for Recorder {
        async fn process_message(&self, message: Message) -> Result<(), PipelineError> {
            self.messages.lock().push(message);
            Ok(())
        }

        fn end_processing(&self) {
            self.ends.fetch_add(1, Ordering::SeqCst);
        }

        fn name(&self) -> &'static str {
            "recorder"
        }
    }

    /// Test target that always fails.
    struct Failing;

    #[async_trait]
    impl EventTarget for Failing {
        async fn process_message(&self, _message: Message) -> Result<(), PipelineError> {
            Err(PipelineError::invalid_argument("refused"))
        }

        fn end_processing(&self) {}

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    /// Test target that panics on every delivery.
    struct Panicking;

    #[async_trait]
    impl EventTarget for Panicking {
        async fn process_message(&self, _message: Message) -> Result<(), PipelineError> {
            panic!("boom");
        }

        fn end_processing(&self) {}

        fn name(&self) -> &'static str {
            "panicking"
        }
    }

    async fn settle() {
        // Let spawned dispatch tasks run to completion.
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    #[tokio::test]
    async fn test_send_reaches_every_target() {
        let source = Broadcaster::new("stage", FaultPolicy::Ignore);
        let a = Recorder::arc();
        let b = Recorder::arc();
        source.register(a.clone());
        source.register(b.clone());

        source.send(Message::new().with_id("m-1"));
        settle().await;

        assert_eq!(a.messages.lock().len(), 1);
        assert_eq!(b.messages.lock().len(), 1);
        assert_eq!(a.messages.lock()[0].id.as_deref(), Some("m-1"));
    }

    #[tokio::test]
    async fn test_failing_target_does_not_block_sibling() {
        let source = Broadcaster::new("stage", FaultPolicy::Ignore);
        let healthy = Recorder::arc();
        source.register(Arc::new(Failing));
        source.register(healthy.clone());

        source.send(Message::new());
        settle().await;

        assert_eq!(healthy.messages.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_panicking_target_is_isolated_and_reported() {
        let source = Broadcaster::new("stage", FaultPolicy::Check);
        let healthy = Recorder::arc();
        let mut faults = source.faults();
        source.register(Arc::new(Panicking));
        source.register(healthy.clone());

        source.send(Message::new());
        settle().await;

        assert_eq!(healthy.messages.lock().len(), 1);
        let fault = faults.try_recv().unwrap();
        assert_eq!(&*fault.origin, "panicking");
        assert_eq!(fault.error.as_label(), "target_panicked");
    }

    #[tokio::test]
    async fn test_ignore_policy_drops_faults() {
        let source = Broadcaster::new("stage", FaultPolicy::Ignore);
        let mut faults = source.faults();
        source.register(Arc::new(Failing));

        source.send(Message::new());
        settle().await;

        assert!(faults.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_check_policy_surfaces_target_errors() {
        let source = Broadcaster::new("stage", FaultPolicy::Check);
        let mut faults = source.faults();
        source.register(Arc::new(Failing));

        source.send(Message::new());
        settle().await;

        let fault = faults.try_recv().unwrap();
        assert_eq!(&*fault.origin, "failing");
        assert_eq!(fault.error.as_label(), "invalid_argument");
    }

    #[tokio::test]
    async fn test_end_signals_each_target_exactly_once() {
        let source = Broadcaster::new("stage", FaultPolicy::Ignore);
        let a = Recorder::arc();
        let b = Recorder::arc();
        source.register(a.clone());
        source.register(b.clone());

        source.end();
        source.end();

        assert_eq!(a.ends.load(Ordering::SeqCst), 1);
        assert_eq!(b.ends.load(Ordering::SeqCst), 1);
    }
}

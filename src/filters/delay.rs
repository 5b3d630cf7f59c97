//! # DelayFilter: debounce/throttle stage.
//!
//! Under a high-rate upstream, forwards at most one message per fixed
//! interval, always the most recently received one. Intermediate messages
//! are discarded, never queued: "send only the latest snapshot" semantics
//! typical of privacy-sensitive periodic disclosure.
//!
//! ## Behavior
//! ```text
//! process_message(m) ──► pending slot := m   (replaces previous, returns at once)
//!
//! timing loop (spawned at construction):
//!   loop {
//!     sleep(delay)  ── cancelled? ──► break (pending dropped, not flushed)
//!     take pending slot
//!     Some(m) ──► broadcast m downstream
//!     None    ──► nothing this tick
//!   }
//! ```
//!
//! The slot exchange is atomic with respect to concurrent producers and the
//! timer: exactly one of "replaced by newer message" or "taken by tick"
//! wins any race, and no message is delivered twice.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::error::PipelineError;
use crate::message::Message;
use crate::sources::{Broadcaster, Fault, FaultPolicy};
use crate::targets::{EventTarget, TargetRef};
use crate::EventSource;

/// Smallest accepted forwarding interval.
///
/// Shared floor for all timed components in the pipeline; periodic device
/// sources validate against the same bound.
pub const MIN_DELAY: Duration = Duration::from_millis(10);

/// Debounce/throttle propagator: keeps only the most recent message and
/// emits it on a fixed cadence.
///
/// The timing loop runs for the lifetime of the filter and is stopped by
/// [`end_processing`](EventTarget::end_processing); it observes cancellation
/// within one tick and starts no further work.
pub struct DelayFilter {
    source: Arc<Broadcaster>,
    pending: Arc<Mutex<Option<Message>>>,
    cancel: CancellationToken,
}

impl std::fmt::Debug for DelayFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DelayFilter").finish_non_exhaustive()
    }
}

impl DelayFilter {
    /// Creates a filter that ignores downstream failures
    /// ([`FaultPolicy::Ignore`], the propagator default).
    ///
    /// Fails with [`PipelineError::InvalidArgument`] if `delay` is below
    /// [`MIN_DELAY`]. Must be called within a tokio runtime: the timing
    /// loop is spawned here.
    pub fn new(delay: Duration) -> Result<Self, PipelineError> {
        Self::with_policy(delay, FaultPolicy::default())
    }

    /// Creates a filter with an explicit fault policy.
    pub fn with_policy(delay: Duration, policy: FaultPolicy) -> Result<Self, PipelineError> {
        if delay < MIN_DELAY {
            return Err(PipelineError::invalid_argument(format!(
                "delay must be at least {MIN_DELAY:?}, got {delay:?}"
            )));
        }
        let source = Arc::new(Broadcaster::new("delay_filter", policy));
        let pending = Arc::new(Mutex::new(None));
        let cancel = CancellationToken::new();

        tokio::spawn(Self::run_ticks(
            delay,
            Arc::clone(&source),
            Arc::clone(&pending),
            cancel.clone(),
        ));

        Ok(Self {
            source,
            pending,
            cancel,
        })
    }

    /// Timing loop: wait one interval, then take-and-clear the pending slot
    /// and broadcast whatever was there. An empty slot means nothing to send
    /// this tick, not an error.
    async fn run_ticks(
        delay: Duration,
        source: Arc<Broadcaster>,
        pending: Arc<Mutex<Option<Message>>>,
        cancel: CancellationToken,
    ) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = time::sleep(delay) => {
                    let taken = pending.lock().take();
                    if let Some(message) = taken {
                        source.send(message);
                    }
                }
            }
        }
    }
}

#[async_trait]
impl EventTarget for DelayFilter {
    /// Replaces the pending slot with `message`, discarding whatever was
    /// previously pending. Returns immediately; never waits for the timer.
    async fn process_message(&self, message: Message) -> Result<(), PipelineError> {
        self.pending.lock().replace(message);
        Ok(())
    }

    /// Stops the timing loop (any pending message is dropped, not flushed)
    /// and propagates end-of-stream downstream.
    fn end_processing(&self) {
        self.cancel.cancel();
        self.source.end();
    }

    fn name(&self) -> &'static str {
        "delay_filter"
    }
}

impl EventSource for DelayFilter {
    fn register(&self, target: TargetRef) {
        self.source.register(target);
    }

    fn faults(&self) -> broadcast::Receiver<Fault> {
        self.source.faults()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    struct Recorder {
        messages: Mutex<Vec<Message>>,
        ends: AtomicUsize,
    }

    impl Recorder {
        fn arc() -> Arc<Self> {
            Arc::new(Self {
                messages: Mutex::new(Vec::new()),
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
    }

    #[tokio::test]
    async fn test_delay_below_floor_rejected() {
        let err = DelayFilter::new(Duration::from_millis(9)).unwrap_err();
        assert_eq!(err.as_label(), "invalid_argument");
    }

    #[tokio::test]
    async fn test_delay_at_floor_accepted() {
        assert!(DelayFilter::new(Duration::from_millis(10)).is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_latest_message_wins_window() {
        let filter = DelayFilter::new(Duration::from_millis(50)).unwrap();
        let sink = Recorder::arc();
        filter.register(sink.clone());

        for id in ["m-1", "m-2", "m-3"] {
            filter
                .process_message(Message::new().with_id(id))
                .await
                .unwrap();
        }

        tokio::time::sleep(Duration::from_millis(60)).await;

        let delivered = sink.messages.lock().clone();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].id.as_deref(), Some("m-3"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_window_emits_nothing() {
        let filter = DelayFilter::new(Duration::from_millis(50)).unwrap();
        let sink = Recorder::arc();
        filter.register(sink.clone());

        filter
            .process_message(Message::new().with_id("only"))
            .await
            .unwrap();

        // First window delivers the message, the next two are empty.
        tokio::time::sleep(Duration::from_millis(180)).await;

        assert_eq!(sink.messages.lock().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_emission_per_window() {
        let filter = DelayFilter::new(Duration::from_millis(50)).unwrap();
        let sink = Recorder::arc();
        filter.register(sink.clone());

        filter
            .process_message(Message::new().with_id("w1"))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(60)).await;

        filter
            .process_message(Message::new().with_id("w2"))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(60)).await;

        let delivered = sink.messages.lock().clone();
        assert_eq!(delivered.len(), 2);
        assert_eq!(delivered[0].id.as_deref(), Some("w1"));
        assert_eq!(delivered[1].id.as_deref(), Some("w2"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_end_drops_pending_and_signals_once() {
        let filter = DelayFilter::new(Duration::from_millis(50)).unwrap();
        let sink = Recorder::arc();
        filter.register(sink.clone());

        filter
            .process_message(Message::new().with_id("pending"))
            .await
            .unwrap();
        filter.end_processing();

        // Loop observes cancellation before the next tick; pending is dropped.
        tokio::time::sleep(Duration::from_millis(120)).await;

        assert!(sink.messages.lock().is_empty());
        assert_eq!(sink.ends.load(Ordering::SeqCst), 1);
    }
}

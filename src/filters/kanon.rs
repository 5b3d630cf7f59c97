//! # KAnonymityFilter: anonymity-set router.
//!
//! Routes each incoming message to one of several independently stateful
//! anonymity sets, chosen by a classification function. Each set decides,
//! from its own accumulated state, whether enough similar messages have
//! arrived to safely emit an anonymized/aggregated result; the filter
//! forwards whatever the set returns, or nothing.
//!
//! ## Behavior
//! ```text
//! process_message(m) ──► independent tokio task:
//!     set_id := choose_set(&m)
//!     sets[set_id] missing ──► SetNotFound fault (classifier contract violation)
//!     sets[set_id].offer_message(m)
//!         Some(out) ──► broadcast out downstream
//!         None      ──► nothing emitted for this input
//! ```
//!
//! Because each call is dispatched independently, downstream emission order
//! is not guaranteed to match arrival order — not even for messages routed
//! to the same set. A set that requires ordered input must serialize
//! internally.

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::error::PipelineError;
use crate::message::Message;
use crate::sources::{Broadcaster, Fault, FaultPolicy};
use crate::targets::{EventTarget, TargetRef};
use crate::EventSource;

/// Shared handle to an anonymity set.
pub type SetRef = Arc<dyn KAnonymitySet>;

/// Contract for anonymity-set collaborators.
///
/// A set accumulates messages and withholds output until its own anonymity
/// threshold is reached. Implementations must tolerate concurrent
/// `offer_message` calls or document their own serialization; the filter
/// does not serialize per set.
pub trait KAnonymitySet: Send + Sync + 'static {
    /// Stable identifier, unique among the sets owned by one filter.
    fn id(&self) -> i32;

    /// Offers one message to the set.
    ///
    /// Returns the message to emit downstream, or `None` when the set is
    /// still below its threshold (or swallows the input for any other
    /// reason of its own).
    fn offer_message(&self, message: Message) -> Option<Message>;
}

/// Routing propagator for k-anonymity-style aggregation.
///
/// The set map and classifier are fixed at construction; steady-state
/// operation is read-only apart from whatever state the sets keep
/// themselves.
pub struct KAnonymityFilter {
    source: Arc<Broadcaster>,
    sets: Arc<HashMap<i32, SetRef>>,
    choose_set: Arc<dyn Fn(&Message) -> i32 + Send + Sync>,
}

impl std::fmt::Debug for KAnonymityFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KAnonymityFilter").finish_non_exhaustive()
    }
}

impl KAnonymityFilter {
    /// Creates a filter that ignores processing-unit failures
    /// ([`FaultPolicy::Ignore`], the propagator default).
    ///
    /// `choose_set` must return the id of one of the provided sets for
    /// every message; anything else is reported as
    /// [`PipelineError::SetNotFound`] at processing time.
    ///
    /// Fails with [`PipelineError::InvalidArgument`] if `sets` is empty or
    /// two sets share an id.
    pub fn new(
        sets: Vec<SetRef>,
        choose_set: impl Fn(&Message) -> i32 + Send + Sync + 'static,
    ) -> Result<Self, PipelineError> {
        Self::with_policy(sets, choose_set, FaultPolicy::default())
    }

    /// Creates a filter with an explicit fault policy.
    pub fn with_policy(
        sets: Vec<SetRef>,
        choose_set: impl Fn(&Message) -> i32 + Send + Sync + 'static,
        policy: FaultPolicy,
    ) -> Result<Self, PipelineError> {
        if sets.is_empty() {
            return Err(PipelineError::invalid_argument(
                "at least one anonymity set is required",
            ));
        }
        let mut by_id = HashMap::with_capacity(sets.len());
        for set in sets {
            let id = set.id();
            if by_id.insert(id, set).is_some() {
                return Err(PipelineError::invalid_argument(format!(
                    "two sets share the id {id}"
                )));
            }
        }
        Ok(Self {
            source: Arc::new(Broadcaster::new("k_anonymity_filter", policy)),
            sets: Arc::new(by_id),
            choose_set: Arc::new(choose_set),
        })
    }
}

#[async_trait]
impl EventTarget for KAnonymityFilter {
    /// Dispatches classification and the set offer as an independent unit
    /// of work; returns once the unit is spawned.
    ///
    /// A classifier returning an unknown id, or a panic inside the unit, is
    /// surfaced on the fault bus under [`FaultPolicy::Check`] and silently
    /// dropped otherwise.
    async fn process_message(&self, message: Message) -> Result<(), PipelineError> {
        let sets = Arc::clone(&self.sets);
        let choose_set = Arc::clone(&self.choose_set);
        let source = Arc::clone(&self.source);
        tokio::spawn(async move {
            let unit = std::panic::catch_unwind(AssertUnwindSafe(|| {
                let set_id = (choose_set.as_ref())(&message);
                match sets.get(&set_id) {
                    Some(set) => Ok(set.offer_message(message)),
                    None => Err(PipelineError::SetNotFound {
                        set_id,
                        message: message.to_string(),
                    }),
                }
            }));
            match unit {
                Ok(Ok(Some(result))) => source.send(result),
                Ok(Ok(None)) => {}
                Ok(Err(error)) => source.report(source.stage_name(), error),
                Err(payload) => source.report(
                    source.stage_name(),
                    PipelineError::TargetPanicked {
                        info: crate::sources::panic_info(payload.as_ref()),
                    },
                ),
            }
        });
        Ok(())
    }

    /// Propagates end-of-stream downstream. Sets are not notified; any
    /// flush behavior of a set is the set's own responsibility.
    fn end_processing(&self) {
        self.source.end();
    }

    fn name(&self) -> &'static str {
        "k_anonymity_filter"
    }
}

impl EventSource for KAnonymityFilter {
    fn register(&self, target: TargetRef) {
        self.source.register(target);
    }

    fn faults(&self) -> broadcast::Receiver<Fault> {
        self.source.faults()
    }
}

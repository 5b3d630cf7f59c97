//! Error types used by the propagation pipeline.
//!
//! A single enum, [`PipelineError`], covers both synchronous contract
//! violations (`InvalidArgument`) and failures raised inside dispatched
//! processing units (`SetNotFound`, `TargetPanicked`). The latter are
//! surfaced through the fault bus only when the owning source runs with
//! [`FaultPolicy::Check`](crate::FaultPolicy); see [`Broadcaster`](crate::Broadcaster).
//!
//! The type is `Clone` because faults are broadcast to any number of
//! observers.

use thiserror::Error;

/// # Errors produced by the propagation pipeline.
///
/// `InvalidArgument` is always raised synchronously at the violating call
/// and never deferred. The other variants originate inside asynchronously
/// dispatched work and reach the caller only via fault reporting.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// A construction parameter or message operation violated its contract
    /// (empty attribute key, out-of-range interval, empty set collection, ...).
    #[error("invalid argument: {reason}")]
    InvalidArgument {
        /// What was wrong with the argument.
        reason: String,
    },

    /// A classification function returned a set id with no matching
    /// anonymity set. This is a contract violation by the classifier, not
    /// an expected runtime condition.
    #[error("message {message} routed to set id {set_id} which is not registered")]
    SetNotFound {
        /// The id the classifier returned.
        set_id: i32,
        /// Rendering of the message that triggered the lookup.
        message: String,
    },

    /// A target panicked while processing a message or an end signal.
    /// The panic is caught and isolated; other targets are unaffected.
    #[error("target panicked: {info}")]
    TargetPanicked {
        /// Panic payload, when it was a string.
        info: String,
    },
}

impl PipelineError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use privflow::PipelineError;
    ///
    /// let err = PipelineError::invalid_argument("delay must be at least 10ms");
    /// assert_eq!(err.as_label(), "invalid_argument");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            PipelineError::InvalidArgument { .. } => "invalid_argument",
            PipelineError::SetNotFound { .. } => "set_not_found",
            PipelineError::TargetPanicked { .. } => "target_panicked",
        }
    }

    /// Shorthand constructor for [`PipelineError::InvalidArgument`].
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        PipelineError::InvalidArgument {
            reason: reason.into(),
        }
    }
}

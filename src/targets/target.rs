//! # Core target trait
//!
//! `EventTarget` is the extension point for plugging consumers into the
//! pipeline. A source delivers each message to each registered target in an
//! independently spawned task, so implementations never block the emitting
//! call site nor each other.
//!
//! ## Contract
//! - `process_message` means "accepted for processing", not "fully handled".
//! - Calls may run concurrently on the same target; implementations that
//!   need serialized delivery must synchronize internally.
//! - `end_processing` is invoked at most once per registration, after which
//!   no further `process_message` calls arrive from that source.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::PipelineError;
use crate::message::Message;

/// Shared handle to a target, suitable for registration with any source.
pub type TargetRef = Arc<dyn EventTarget>;

/// Contract for message consumers.
///
/// Implementations are driven from source-spawned dispatch tasks and should
/// avoid blocking the async runtime (prefer async I/O and cooperative waits).
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use privflow::{EventTarget, Message, PipelineError};
///
/// struct Collector;
///
/// #[async_trait]
/// impl EventTarget for Collector {
///     async fn process_message(&self, message: Message) -> Result<(), PipelineError> {
///         // persist, forward, aggregate...
///         let _ = message;
///         Ok(())
///     }
///
///     fn end_processing(&self) {
///         // flush, close handles...
///     }
/// }
/// ```
#[async_trait]
pub trait EventTarget: Send + Sync + 'static {
    /// Accepts one message for processing.
    ///
    /// Returning `Ok(())` signals acceptance only. Errors are observed by
    /// the dispatching source according to its
    /// [`FaultPolicy`](crate::FaultPolicy); they never affect delivery to
    /// other targets.
    async fn process_message(&self, message: Message) -> Result<(), PipelineError>;

    /// Notification that no further messages will arrive from this source.
    ///
    /// Called at most once per registration.
    fn end_processing(&self);

    /// Human-readable name (for fault reports and logs).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

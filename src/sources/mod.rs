//! # Producer side of the pipeline.
//!
//! This module provides the reusable source machinery every emitting
//! component embeds:
//!
//! - [`Broadcaster`]: registration + fan-out + end signal + fault reporting.
//!   Filters embed one instead of inheriting from a base class; capability
//!   composition over hierarchy.
//! - [`EventSource`] / [`EventPropagator`]: the public capability traits.
//! - [`FaultPolicy`] / [`Fault`]: checked vs. unchecked observation of
//!   failures raised inside dispatched processing units.
//!
//! ## Architecture
//! ```text
//! send(msg)
//!     │ snapshot target list
//!     ├──► tokio task ──► target1.process_message(msg.clone())
//!     │        └─ Err/panic ──► FaultBus (policy: Check) / dropped (Ignore)
//!     ├──► tokio task ──► target2.process_message(msg.clone())
//!     └──► tokio task ──► targetN.process_message(msg.clone())
//! ```
//!
//! One target's failure or slowness never blocks or fails delivery to
//! another target, and never propagates to the emitting call site.

mod broadcaster;
mod fault;
mod source;

pub use broadcaster::Broadcaster;
pub use fault::{Fault, FaultPolicy};
pub use source::{EventPropagator, EventSource};

pub(crate) use fault::panic_info;

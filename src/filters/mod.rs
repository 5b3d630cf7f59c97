//! # Privacy-preserving filter stages.
//!
//! Filters are [`EventPropagator`](crate::EventPropagator)s: they consume
//! upstream messages as targets and broadcast to their own downstream
//! targets.
//!
//! - [`DelayFilter`]: debounce/throttle — forwards at most one message per
//!   fixed interval, always the most recently received one.
//! - [`KAnonymityFilter`]: routes each message to one of several named
//!   anonymity sets; the set decides whether enough similar messages have
//!   accumulated to safely emit an aggregated result.
//!
//! ```text
//! upstream ──► DelayFilter ──► KAnonymityFilter ──► downstream
//!              (latest wins      (route by classifier,
//!               per interval)     emit what the set returns)
//! ```

mod delay;
mod kanon;

pub use delay::{DelayFilter, MIN_DELAY};
pub use kanon::{KAnonymityFilter, KAnonymitySet, SetRef};

//! # Consumer side of the pipeline.
//!
//! This module provides the [`EventTarget`] trait — the contract every
//! message consumer implements — and the shared handle type [`TargetRef`].
//!
//! ## Architecture
//! ```text
//! Message flow:
//!   Source ── send(Message) ──► per-target dispatch (one tokio task each)
//!                                   │
//!                              ┌────┴────┬──────────┬───────┐
//!                              ▼         ▼          ▼       ▼
//!                          DelayFilter  KAnon...  Custom  LogTarget
//!                                                        (feature "logging")
//! ```
//!
//! Targets must tolerate concurrent invocation: a source dispatches each
//! delivery independently and provides no serialization.

mod target;

#[cfg(feature = "logging")]
mod log;

pub use target::{EventTarget, TargetRef};

#[cfg(feature = "logging")]
pub use log::LogTarget;

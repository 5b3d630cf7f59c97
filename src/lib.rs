//! # privflow
//!
//! **Privflow** is a small in-process event-propagation pipeline for
//! telemetry/device messages with privacy-preserving filter stages.
//!
//! Producers ("sources") emit discrete, attribute-keyed [`Message`]s;
//! filters transform or suppress them before they reach consumers
//! ("targets"). Filters are [`EventPropagator`]s: simultaneously a target
//! (consuming upstream messages) and a source (re-emitting downstream).
//!
//! ## Architecture
//! ```text
//!     ┌──────────────┐        ┌──────────────┐        ┌──────────────┐
//!     │ DeviceSource │        │ DeviceSource │        │ DeviceSource │
//!     │  (external)  │        │  (external)  │        │  (external)  │
//!     └──────┬───────┘        └──────┬───────┘        └──────┬───────┘
//!            │ send(Message)         │                       │
//!            ▼                       ▼                       ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Broadcaster (embedded source helper)                             │
//! │  - registered targets (append-only)                               │
//! │  - independent per-target dispatch (one tokio task each)          │
//! │  - FaultPolicy: Check → fault bus, Ignore → dropped               │
//! └──────┬────────────────────────────────────────────────────────────┘
//!        ▼
//!     ┌──────────────────┐   pending slot, one tick per interval
//!     │   DelayFilter    │──► latest message wins, the rest discarded
//!     └──────┬───────────┘
//!            ▼
//!     ┌──────────────────┐   choose_set(msg) → set id
//!     │ KAnonymityFilter │──► sets[id].offer_message(msg)
//!     └──────┬───────────┘        Some(out) → broadcast, None → silence
//!            ▼
//!     ┌──────────────────┐
//!     │  EventTarget(s)  │   consumers; end_processing() exactly once
//!     └──────────────────┘
//! ```
//!
//! Control flow: registration happens before any message flows;
//! end-of-stream is a distinct terminal signal, separate from message
//! delivery. There are no retries and no cross-source ordering guarantees —
//! best-effort telemetry favors availability over delivery guarantees.
//!
//! ## Features
//! | Area          | Description                                              | Key types / traits                    |
//! |---------------|----------------------------------------------------------|---------------------------------------|
//! | **Messages**  | Attribute-keyed records with an optional identifier.     | [`Message`]                           |
//! | **Targets**   | Consumer contract: accept messages, observe stream end.  | [`EventTarget`], [`TargetRef`]        |
//! | **Sources**   | Fan-out with per-target fault isolation.                 | [`Broadcaster`], [`EventSource`]      |
//! | **Filters**   | Debounce and k-anonymity routing propagators.            | [`DelayFilter`], [`KAnonymityFilter`] |
//! | **Faults**    | Checked vs. unchecked failure observation.               | [`FaultPolicy`], [`Fault`]            |
//! | **Errors**    | Typed errors for contract violations and routing misses. | [`PipelineError`]                     |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogTarget`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use privflow::{
//!     DelayFilter, EventSource, EventTarget, KAnonymityFilter, KAnonymitySet, Message, SetRef,
//! };
//!
//! /// Never releases anything (threshold never reached).
//! struct Withhold;
//!
//! impl KAnonymitySet for Withhold {
//!     fn id(&self) -> i32 { 0 }
//!     fn offer_message(&self, _message: Message) -> Option<Message> { None }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let sets: Vec<SetRef> = vec![Arc::new(Withhold)];
//!     let kanon = Arc::new(KAnonymityFilter::new(sets, |_msg| 0)?);
//!
//!     let debounce = DelayFilter::new(Duration::from_millis(50))?;
//!     debounce.register(kanon.clone());
//!
//!     let msg = Message::new()
//!         .with_id("hr-42")
//!         .with_attribute("heart_rate", "71")?;
//!     debounce.process_message(msg).await?;
//!
//!     debounce.end_processing();
//!     Ok(())
//! }
//! ```

mod error;
mod filters;
mod message;
mod sources;
mod targets;

// ---- Public re-exports ----

pub use error::PipelineError;
pub use filters::{DelayFilter, KAnonymityFilter, KAnonymitySet, SetRef, MIN_DELAY};
pub use message::Message;
pub use sources::{Broadcaster, EventPropagator, EventSource, Fault, FaultPolicy};
pub use targets::{EventTarget, TargetRef};

// Optional: expose a simple built-in logging target (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use targets::LogTarget;

//! # Simple logging target for debugging and demos.
//!
//! [`LogTarget`] prints every message it receives to stdout in the message's
//! log rendering, plus a line when the stream ends.
//!
//! ## Output format
//! ```text
//! [message] MessageId: hr-42  [heart_rate : 71]
//! [end-of-stream]
//! ```
//!
//! Not intended for production use - implement a custom
//! [`EventTarget`](crate::EventTarget) for structured logging or metrics.

use async_trait::async_trait;

use crate::error::PipelineError;
use crate::message::Message;
use crate::targets::EventTarget;

/// Simple stdout logging target.
///
/// Enabled via the `logging` feature. Useful as the tail of a demo chain.
#[derive(Default)]
pub struct LogTarget;

#[async_trait]
impl EventTarget for LogTarget {
    async fn process_message(&self, message: Message) -> Result<(), PipelineError> {
        println!("[message] {message}");
        Ok(())
    }

    fn end_processing(&self) {
        println!("[end-of-stream]");
    }

    fn name(&self) -> &'static str {
        "log_target"
    }
}

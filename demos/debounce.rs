//! # Example: debounce
//!
//! Minimal [`DelayFilter`] usage: a burst of rapid messages collapses to
//! one emission per window, always the latest.
//!
//! ## Run
//! ```bash
//! cargo run --example debounce --features logging
//! ```

use std::sync::Arc;
use std::time::Duration;

use privflow::{DelayFilter, EventSource, EventTarget, LogTarget, Message};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = DelayFilter::new(Duration::from_millis(100))?;
    filter.register(Arc::new(LogTarget));

    // Ten rapid updates per window; only the last of each survives.
    for burst in 0..3u32 {
        for i in 0..10u32 {
            let msg = Message::new()
                .with_id(format!("burst-{burst}"))
                .with_attribute("value", format!("{}", burst * 10 + i))?;
            filter.process_message(msg).await?;
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        tokio::time::sleep(Duration::from_millis(80)).await;
    }

    filter.end_processing();
    tokio::time::sleep(Duration::from_millis(50)).await;
    Ok(())
}

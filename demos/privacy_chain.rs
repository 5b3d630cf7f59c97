//! # Example: privacy_chain
//!
//! Full privacy pipeline: a periodic producer feeds a debounce stage, which
//! feeds a k-anonymity router, which releases aggregates to stdout.
//!
//! Shows how to:
//! - Drive a [`Broadcaster`] directly as a device-style source.
//! - Chain propagators via [`EventSource::register`].
//! - Implement [`KAnonymitySet`] with a release threshold.
//!
//! ## Flow
//! ```text
//! producer loop ──► Broadcaster::send()
//!     └─► DelayFilter (200ms window, latest reading wins)
//!           └─► KAnonymityFilter (route by "zone" attribute)
//!                 ├─► zone "north" set (k = 3)
//!                 └─► zone "south" set (k = 3)
//!                       └─► LogTarget (stdout)
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example privacy_chain --features logging
//! ```

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use privflow::{
    Broadcaster, DelayFilter, EventSource, FaultPolicy, KAnonymityFilter, KAnonymitySet,
    LogTarget, Message, SetRef,
};

/// Withholds readings until `k` accumulated, then releases one aggregate
/// with the identifier stripped and the count attached.
struct ThresholdSet {
    id: i32,
    k: u32,
    buffered: Mutex<u32>,
}

impl ThresholdSet {
    fn arc(id: i32, k: u32) -> SetRef {
        Arc::new(Self {
            id,
            k,
            buffered: Mutex::new(0),
        })
    }
}

impl KAnonymitySet for ThresholdSet {
    fn id(&self) -> i32 {
        self.id
    }

    fn offer_message(&self, message: Message) -> Option<Message> {
        let mut buffered = self.buffered.lock();
        *buffered += 1;
        if *buffered < self.k {
            return None;
        }
        *buffered = 0;

        let mut aggregate = message;
        aggregate.id = None;
        aggregate.set_attribute("k", self.k.to_string()).ok()?;
        Some(aggregate)
    }
}

fn classify_by_zone(message: &Message) -> i32 {
    match message.get_attribute("zone") {
        Ok(Some("north")) => 0,
        _ => 1,
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("privacy_chain demo (run with --features logging)\n");

    let sets = vec![ThresholdSet::arc(0, 3), ThresholdSet::arc(1, 3)];
    let kanon = Arc::new(KAnonymityFilter::with_policy(
        sets,
        classify_by_zone,
        FaultPolicy::Check,
    )?);
    kanon.register(Arc::new(LogTarget));

    let debounce = DelayFilter::new(Duration::from_millis(200))?;
    debounce.register(kanon.clone());

    // Device-style producer: emits a reading every 20ms, ten times faster
    // than the debounce window, so most readings are discarded unseen.
    let producer = Broadcaster::new("demo_producer", FaultPolicy::Ignore);
    producer.register(Arc::new(debounce));

    for i in 0..120u32 {
        let zone = if i % 2 == 0 { "north" } else { "south" };
        let reading = Message::new()
            .with_id(format!("reading-{i}"))
            .with_attribute("zone", zone)?
            .with_attribute("temperature", format!("{}", 20 + i % 5))?;
        producer.send(reading);
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    producer.end();
    tokio::time::sleep(Duration::from_millis(300)).await;

    println!("\nfinished");
    Ok(())
}

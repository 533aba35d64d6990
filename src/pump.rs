//! Consumer side: pull records off the bridge queue and hand them to the application.
//!
//! Two strategies:
//! - `run_wait` - block in `wait` until the queue is closed and empty
//! - `run_poll` - drain everything on a fixed timer tick (batch processing)

use bridge_dispatch::{Consumer, EventKind, EventQueue, EventRecord, KindRegistry};
use log::{info, warn};
use std::time::Duration;

/// What the consumer saw.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PumpReport {
    pub delivered: usize,
    /// Per-kind tally, indexed by `EventKind::key()`.
    pub by_kind: [usize; EventKind::COUNT],
    /// Records whose kind is not a registered id.
    pub unknown: usize,
}

impl PumpReport {
    fn record(&mut self, kind: Option<EventKind>) {
        self.delivered += 1;
        match kind {
            Some(kind) => self.by_kind[kind.key() as usize] += 1,
            None => self.unknown += 1,
        }
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.by_kind[kind.key() as usize]
    }
}

/// Warns once per increase of the queue's drop counter.
struct DropWatch {
    seen: u64,
}

impl DropWatch {
    fn new() -> Self {
        Self { seen: 0 }
    }

    fn check(&mut self, queue: &EventQueue) {
        let dropped = queue.dropped();
        if dropped > self.seen {
            warn!(
                "Event queue overflowed: {} records dropped ({} total)",
                dropped - self.seen,
                dropped
            );
            self.seen = dropped;
        }
    }
}

fn deliver(kinds: &KindRegistry, record: &EventRecord, report: &mut PumpReport) {
    let kind = kinds.kind_of(record.kind);
    match kind {
        Some(kind) => info!(
            "{} from {} (params {:#x}, {})",
            kind, record.origin, record.param1, record.param2
        ),
        None => info!(
            "message {:#06x} from {} (params {:#x}, {})",
            record.kind, record.origin, record.param1, record.param2
        ),
    }
    report.record(kind);
}

/// Block on the queue until it is closed and drained, or the consumer is cancelled.
pub fn run_wait(consumer: &Consumer, kinds: &KindRegistry) -> PumpReport {
    let mut report = PumpReport::default();
    let mut drops = DropWatch::new();

    for record in consumer.iter() {
        drops.check(consumer.queue());
        deliver(kinds, &record, &mut report);
    }
    drops.check(consumer.queue());
    report
}

/// Drain the queue every `interval` until it is closed and drained.
pub fn run_poll(
    consumer: &Consumer,
    kinds: &KindRegistry,
    interval: Duration,
) -> std::io::Result<PumpReport> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;

    Ok(rt.block_on(async {
        let mut report = PumpReport::default();
        let mut drops = DropWatch::new();
        let mut ticker = tokio::time::interval(interval);

        loop {
            ticker.tick().await;
            // Checked before draining: once closed nothing new can arrive.
            let closed = consumer.queue().is_closed();

            drops.check(consumer.queue());
            consumer.drain(|record| deliver(kinds, &record, &mut report));

            if closed || consumer.cancel_token().is_cancelled() {
                break;
            }
        }
        report
    }))
}

//! bridge-queue: fixed-capacity event queue fed by a window procedure.
//!
//! - `EventRecord` - flat, `Copy` notification value crossing the queue
//! - `EventQueue` - circular buffer behind a mutex, paired with a readiness condvar
//! - `CancelToken` - wakes and aborts blocked waiters
//! - `Consumer` - poll / wait / drain handle for application threads
//!
//! The producer side never blocks for longer than the O(1) critical section and never
//! allocates. A full queue drops the newest record.

mod cancel;
mod consumer;
mod error;
mod queue;
mod record;

pub use cancel::CancelToken;
pub use consumer::{Consumer, Wait};
pub use error::QueueError;
pub use queue::{DEFAULT_CAPACITY, EventQueue, QueueStats};
pub use record::{EventRecord, Handle};

//! Bounded circular event queue.
//!
//! One mutex guards the ring (`head`, `len`, slots). A condvar is signalled on every
//! enqueue attempt; waiters always re-check the ring under the lock after waking, so a
//! signal that lands between the empty check and the wait is never lost.

use crate::cancel::CancelToken;
use crate::error::QueueError;
use crate::record::EventRecord;
use log::debug;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Queue capacity used when none is configured.
/// Matches the fixed buffer size the bridge has always shipped with.
pub const DEFAULT_CAPACITY: usize = 500;

/// Snapshot of queue counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct QueueStats {
    /// Records currently waiting.
    pub len: usize,
    /// Fixed capacity.
    pub capacity: usize,
    /// Successful enqueues since construction.
    pub enqueued: u64,
    /// Enqueues rejected because the queue was full or closed.
    pub dropped: u64,
}

struct Ring {
    slots: Box<[EventRecord]>,
    head: usize,
    len: usize,
    closed: bool,
}

impl Ring {
    fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn push(&mut self, record: EventRecord) -> bool {
        if self.len == self.capacity() {
            return false;
        }
        let tail = (self.head + self.len) % self.capacity();
        self.slots[tail] = record;
        self.len += 1;
        true
    }

    fn pop(&mut self) -> Option<EventRecord> {
        if self.len == 0 {
            return None;
        }
        let record = self.slots[self.head];
        self.head = (self.head + 1) % self.capacity();
        self.len -= 1;
        Some(record)
    }
}

pub(crate) struct Shared {
    ring: Mutex<Ring>,
    ready: Condvar,
    enqueued: AtomicU64,
    dropped: AtomicU64,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Ring> {
        // Every critical section leaves the ring consistent, so a poisoned lock is still usable.
        self.ring.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Wake every blocked waiter so it re-evaluates its exit conditions.
    pub(crate) fn wake_all(&self) {
        let _ring = self.lock();
        self.ready.notify_all();
    }
}

/// Fixed-capacity FIFO of [`EventRecord`]s shared by one producer and any number of consumers.
pub struct EventQueue {
    shared: Arc<Shared>,
}

impl EventQueue {
    /// Create a queue with [`DEFAULT_CAPACITY`] slots.
    pub fn new() -> Self {
        Self::with_capacity(NonZeroUsize::new(DEFAULT_CAPACITY).unwrap_or(NonZeroUsize::MIN))
    }

    /// Create a queue with `capacity` slots. All storage is allocated here, never on enqueue.
    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        let ring = Ring {
            slots: vec![EventRecord::default(); capacity.get()].into_boxed_slice(),
            head: 0,
            len: 0,
            closed: false,
        };

        Self {
            shared: Arc::new(Shared {
                ring: Mutex::new(ring),
                ready: Condvar::new(),
                enqueued: AtomicU64::new(0),
                dropped: AtomicU64::new(0),
            }),
        }
    }

    /// Push a record from the producer side.
    ///
    /// Safe to call from a reentrant window procedure: the lock is held for an O(1) copy, no
    /// memory is allocated and no callback is invoked. Returns `false` when the record was
    /// dropped because the queue is full (or closed); unread records are never overwritten.
    /// The readiness signal fires either way.
    pub fn enqueue(&self, record: EventRecord) -> bool {
        let mut ring = self.shared.lock();
        let written = !ring.closed && ring.push(record);
        self.shared.ready.notify_one();
        drop(ring);

        if written {
            self.shared.enqueued.fetch_add(1, Ordering::Relaxed);
        } else {
            self.shared.dropped.fetch_add(1, Ordering::Relaxed);
        }
        written
    }

    /// Pop the oldest record without blocking.
    ///
    /// Returns the number of records present *before* the pop (0 means the queue was empty and
    /// nothing was removed) together with the popped record.
    pub fn try_dequeue(&self) -> (usize, Option<EventRecord>) {
        let mut ring = self.shared.lock();
        let count = ring.len;
        (count, ring.pop())
    }

    /// Out-parameter form of [`try_dequeue`](Self::try_dequeue).
    ///
    /// `out` is left untouched when the queue is empty. A missing destination is rejected
    /// before the queue is touched.
    pub fn try_dequeue_into(&self, out: Option<&mut EventRecord>) -> Result<usize, QueueError> {
        let out = out.ok_or(QueueError::InvalidArgument)?;
        let (count, record) = self.try_dequeue();
        if let Some(record) = record {
            *out = record;
        }
        Ok(count)
    }

    /// Block until a record is available, then pop it.
    ///
    /// Must not be called from the producer's callback. Returns early with
    /// [`QueueError::Cancelled`] once `cancel` fires, [`QueueError::TimedOut`] when `timeout`
    /// elapses, or [`QueueError::Closed`] after [`close`](Self::close) once every pending record
    /// has been handed out.
    pub fn wait_dequeue(
        &self,
        cancel: &CancelToken,
        timeout: Option<Duration>,
    ) -> Result<EventRecord, QueueError> {
        let deadline = timeout.map(|t| Instant::now() + t);
        let mut ring = self.shared.lock();

        loop {
            if cancel.is_cancelled() {
                return Err(QueueError::Cancelled);
            }
            if let Some(record) = ring.pop() {
                return Ok(record);
            }
            if ring.closed {
                return Err(QueueError::Closed);
            }

            ring = match deadline {
                None => self
                    .shared
                    .ready
                    .wait(ring)
                    .unwrap_or_else(PoisonError::into_inner),
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Err(QueueError::TimedOut);
                    }
                    self.shared
                        .ready
                        .wait_timeout(ring, deadline - now)
                        .map(|(guard, _)| guard)
                        .unwrap_or_else(|e| e.into_inner().0)
                }
            };
        }
    }

    /// A token that aborts waits on this queue when cancelled.
    pub fn cancel_token(&self) -> CancelToken {
        CancelToken::bound_to(&self.shared)
    }

    /// Stop accepting records and wake all waiters.
    /// Records already queued can still be dequeued.
    pub fn close(&self) {
        let mut ring = self.shared.lock();
        if !ring.closed {
            ring.closed = true;
            debug!("Event queue closed with {} pending records", ring.len);
        }
        self.shared.ready.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.shared.lock().closed
    }

    pub fn len(&self) -> usize {
        self.shared.lock().len
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.shared.lock().capacity()
    }

    /// Records rejected so far.
    pub fn dropped(&self) -> u64 {
        self.shared.dropped.load(Ordering::Relaxed)
    }

    pub fn stats(&self) -> QueueStats {
        let (len, capacity) = {
            let ring = self.shared.lock();
            (ring.len, ring.capacity())
        };
        QueueStats {
            len,
            capacity,
            enqueued: self.shared.enqueued.load(Ordering::Relaxed),
            dropped: self.shared.dropped.load(Ordering::Relaxed),
        }
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

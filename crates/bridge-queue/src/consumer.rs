//! Application-side handle on the event queue.

use crate::cancel::CancelToken;
use crate::error::QueueError;
use crate::queue::EventQueue;
use crate::record::EventRecord;
use std::sync::Arc;
use std::time::Duration;

/// Poll, wait on, or drain the queue from an application thread.
///
/// Clones share the same cancel token, so cancelling one stops them all.
#[derive(Clone)]
pub struct Consumer {
    queue: Arc<EventQueue>,
    cancel: CancelToken,
    timeout: Option<Duration>,
}

impl Consumer {
    pub fn new(queue: Arc<EventQueue>) -> Self {
        let cancel = queue.cancel_token();
        Self {
            queue,
            cancel,
            timeout: None,
        }
    }

    /// Bound each [`wait`](Self::wait) by `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Non-blocking pop. The count is taken before removal; 0 means nothing was popped.
    pub fn poll(&self) -> (usize, Option<EventRecord>) {
        self.queue.try_dequeue()
    }

    /// Non-blocking pop into a caller-provided slot.
    pub fn poll_into(&self, out: Option<&mut EventRecord>) -> Result<usize, QueueError> {
        self.queue.try_dequeue_into(out)
    }

    /// Block until the next record arrives, the token is cancelled, the timeout elapses or the
    /// queue closes.
    pub fn wait(&self) -> Result<EventRecord, QueueError> {
        self.queue.wait_dequeue(&self.cancel, self.timeout)
    }

    /// Pop every record currently queued, oldest first. Returns how many were handled.
    pub fn drain<F>(&self, mut f: F) -> usize
    where
        F: FnMut(EventRecord),
    {
        let mut handled = 0;
        while let (_, Some(record)) = self.queue.try_dequeue() {
            f(record);
            handled += 1;
        }
        handled
    }

    /// Blocking iterator; ends on cancellation or once a closed queue is empty.
    pub fn iter(&self) -> Wait<'_> {
        Wait { consumer: self }
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn queue(&self) -> &Arc<EventQueue> {
        &self.queue
    }
}

/// Iterator returned by [`Consumer::iter`]. Timeouts are retried.
pub struct Wait<'a> {
    consumer: &'a Consumer,
}

impl Iterator for Wait<'_> {
    type Item = EventRecord;

    fn next(&mut self) -> Option<EventRecord> {
        loop {
            match self.consumer.wait() {
                Ok(record) => return Some(record),
                Err(QueueError::TimedOut) => continue,
                Err(_) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Handle;
    use std::thread;

    fn rec(n: usize) -> EventRecord {
        EventRecord::new(Handle(1), 0xC100, n, 0)
    }

    #[test]
    fn test_drain_pops_everything_in_order() {
        let consumer = Consumer::new(Arc::new(EventQueue::new()));
        for n in 0..5 {
            consumer.queue().enqueue(rec(n));
        }

        let mut seen = Vec::new();
        assert_eq!(consumer.drain(|r| seen.push(r.param1)), 5);
        assert_eq!(seen, vec![0, 1, 2, 3, 4]);
        assert_eq!(consumer.drain(|_| {}), 0);
    }

    #[test]
    fn test_iter_ends_when_closed_queue_is_empty() {
        let consumer = Consumer::new(Arc::new(EventQueue::new()))
            .with_timeout(Some(Duration::from_millis(5)));
        let producer = {
            let queue = consumer.queue().clone();
            thread::spawn(move || {
                for n in 0..3 {
                    queue.enqueue(rec(n));
                    thread::sleep(Duration::from_millis(10));
                }
                queue.close();
            })
        };

        let params: Vec<usize> = consumer.iter().map(|r| r.param1).collect();
        producer.join().unwrap();

        assert_eq!(params, vec![0, 1, 2]);
    }

    #[test]
    fn test_cancel_stops_clones() {
        let consumer = Consumer::new(Arc::new(EventQueue::new()));
        let other = consumer.clone();

        let waiter = thread::spawn(move || other.wait());
        thread::sleep(Duration::from_millis(20));
        consumer.cancel();

        assert_eq!(waiter.join().unwrap(), Err(QueueError::Cancelled));
    }

    #[test]
    fn test_poll_reports_pre_removal_count() {
        let consumer = Consumer::new(Arc::new(EventQueue::new()));
        consumer.queue().enqueue(rec(1));
        consumer.queue().enqueue(rec(2));

        assert_eq!(consumer.poll(), (2, Some(rec(1))));
        assert_eq!(consumer.poll(), (1, Some(rec(2))));
        assert_eq!(consumer.poll(), (0, None));
    }
}

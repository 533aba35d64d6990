//! Cancellation for blocking waits.

use crate::queue::Shared;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

/// Cloneable flag that aborts [`EventQueue::wait_dequeue`](crate::EventQueue::wait_dequeue).
///
/// Obtained from [`EventQueue::cancel_token`](crate::EventQueue::cancel_token). Cancelling
/// wakes every waiter on that queue; the flag is sticky.
#[derive(Clone)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
    queue: Weak<Shared>,
}

impl CancelToken {
    pub(crate) fn bound_to(queue: &Arc<Shared>) -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            queue: Arc::downgrade(queue),
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        // The flag is set before taking the queue lock, so a waiter either sees it on its
        // next check or is already parked and gets this notification.
        if let Some(queue) = self.queue.upgrade() {
            queue.wake_all();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::EventQueue;

    #[test]
    fn test_clones_share_flag() {
        let q = EventQueue::new();
        let a = q.cancel_token();
        let b = a.clone();

        a.cancel();
        assert!(b.is_cancelled());
        assert!(!q.cancel_token().is_cancelled());
    }

    #[test]
    fn test_cancel_after_queue_dropped() {
        let token = EventQueue::new().cancel_token();
        token.cancel();
        assert!(token.is_cancelled());
    }
}

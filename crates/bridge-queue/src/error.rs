//! Error types for bridge-queue

/// Consumer-side queue errors.
///
/// A full queue is not an error: the producer's record is dropped and counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    #[error("no destination supplied for the dequeued record")]
    InvalidArgument,

    #[error("wait cancelled")]
    Cancelled,

    #[error("wait timed out")]
    TimedOut,

    #[error("queue closed")]
    Closed,
}

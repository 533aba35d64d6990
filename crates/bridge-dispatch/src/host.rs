use bridge_queue::Handle;

/// The windowing system as seen from the dispatcher.
///
/// Both calls happen on the host's event thread, possibly while the dispatcher is already on
/// the stack for an outer message. `default_proc` may re-enter the dispatcher synchronously.
pub trait Host: Send + Sync {
    /// Post `code` to `target`'s message loop without waiting. Returns whether it was accepted.
    fn post_message(&self, target: Handle, code: u32, wparam: usize, lparam: isize) -> bool;

    /// Run the host's default procedure and return its result.
    fn default_proc(&self, target: Handle, code: u32, wparam: usize, lparam: isize) -> isize;
}

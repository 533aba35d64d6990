//! bridge-dispatch: window-procedure side of the bridge.
//!
//! A [`Dispatcher`] classifies raw host messages. Close, context-menu, command and resize
//! notifications are re-posted to the host's own message loop under their registered ids;
//! list-view item notifications are normalized into [`EventRecord`]s and pushed onto the
//! bounded queue. [`Bridge`] owns the queue, the kind registry and the dispatcher for the
//! lifetime of the subsystem.

mod bridge;
mod dispatcher;
mod host;
mod message;

#[cfg(test)]
mod testing;

#[cfg(all(windows, target_pointer_width = "64"))]
pub mod win32;

pub use bridge::{Bridge, BridgeOptions, ShutdownGuard};
pub use dispatcher::{DispatchOptions, Dispatcher};
pub use host::Host;
pub use message::*;

pub use bridge_kinds::{EventKind, KindRegistry, Registrar, UNAVAILABLE};
pub use bridge_queue::{Consumer, EventQueue, EventRecord, Handle, QueueError, QueueStats};

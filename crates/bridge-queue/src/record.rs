//! Core types for bridge-queue

use std::fmt;

/// Opaque identifier of the window or control an event came from.
/// The queue never dereferences it.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Handle(pub usize);

impl Handle {
    pub const NULL: Handle = Handle(0);

    pub fn is_null(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// One normalized notification.
///
/// Layout is fixed (`repr(C)`, no variable-length fields) since records are handed across
/// the raw window-procedure boundary by value.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EventRecord {
    /// Source window or control.
    pub origin: Handle,
    /// Registered kind id, or a raw message code passed through.
    pub kind: u32,
    /// First opaque word, meaning defined by `kind`.
    pub param1: usize,
    /// Second opaque word, meaning defined by `kind`.
    pub param2: isize,
}

impl EventRecord {
    pub fn new(origin: Handle, kind: u32, param1: usize, param2: isize) -> Self {
        Self {
            origin,
            kind,
            param1,
            param2,
        }
    }
}

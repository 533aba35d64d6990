//! bridge-kinds: registered event kinds and their cached ids.
//!
//! Each logical kind owns a static registration name. The first lookup registers the name
//! with the host (on Windows, `RegisterWindowMessageW`) and caches the id; later lookups are a
//! single atomic load.

mod kind;
mod registrar;
mod registry;

#[cfg(windows)]
mod win32;

pub use kind::EventKind;
pub use registrar::{AtomTable, Registrar};
pub use registry::{KindRegistry, UNAVAILABLE};

#[cfg(windows)]
pub use win32::Win32Registrar;

/// Create the registrar for the current platform.
pub fn default_registrar() -> Box<dyn Registrar> {
    #[cfg(windows)]
    {
        Box::new(Win32Registrar)
    }

    #[cfg(not(windows))]
    {
        Box::new(AtomTable::new())
    }
}

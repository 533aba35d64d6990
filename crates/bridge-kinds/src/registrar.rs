//! Host-side name registration.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Turns a registration name into a process-wide message id.
///
/// Implementations must be deterministic: the same name yields the same id on every call,
/// from any thread. `0` means registration failed.
pub trait Registrar: Send + Sync {
    fn register(&self, name: &str) -> u32;
}

/// In-process registrar handing out ids from the registered-message range
/// (`0xC000..=0xFFFF`), one per distinct name.
pub struct AtomTable {
    atoms: Mutex<HashMap<String, u32>>,
}

impl AtomTable {
    pub const FIRST_ID: u32 = 0xC000;
    pub const LAST_ID: u32 = 0xFFFF;

    pub fn new() -> Self {
        Self {
            atoms: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for AtomTable {
    fn default() -> Self {
        Self::new()
    }
}

impl Registrar for AtomTable {
    fn register(&self, name: &str) -> u32 {
        let mut atoms = self.atoms.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(&id) = atoms.get(name) {
            return id;
        }

        let id = Self::FIRST_ID + atoms.len() as u32;
        if id > Self::LAST_ID {
            return 0;
        }
        atoms.insert(name.to_string(), id);
        id
    }
}

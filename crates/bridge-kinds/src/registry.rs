//! Lazy, memoized kind → id table.

use crate::kind::EventKind;
use crate::registrar::Registrar;
use log::{debug, warn};
use std::sync::atomic::{AtomicU32, Ordering};

/// Returned for keys outside `0..EventKind::COUNT` and for kinds whose registration failed.
pub const UNAVAILABLE: u32 = 0;

/// Cache of registered ids, one slot per [`EventKind`].
///
/// A slot is filled on first use and never re-resolved. Two threads racing on the same empty
/// slot both register the name and store the same id, which is harmless because the
/// registrar is deterministic.
pub struct KindRegistry {
    ids: [AtomicU32; EventKind::COUNT],
    registrar: Box<dyn Registrar>,
}

impl KindRegistry {
    pub fn new(registrar: Box<dyn Registrar>) -> Self {
        Self {
            ids: std::array::from_fn(|_| AtomicU32::new(UNAVAILABLE)),
            registrar,
        }
    }

    /// Id for a raw key. Out-of-range keys yield [`UNAVAILABLE`] without touching the cache.
    pub fn resolve(&self, key: u32) -> u32 {
        match EventKind::from_key(key) {
            Some(kind) => self.id(kind),
            None => UNAVAILABLE,
        }
    }

    /// Id for `kind`, registering it on first use.
    pub fn id(&self, kind: EventKind) -> u32 {
        let slot = &self.ids[kind as usize];
        let cached = slot.load(Ordering::Acquire);
        if cached != UNAVAILABLE {
            return cached;
        }

        let id = self.registrar.register(kind.registration_name());
        if id != UNAVAILABLE {
            slot.store(id, Ordering::Release);
        }
        id
    }

    /// Id for `kind` if it has been resolved already. Never registers.
    pub fn cached(&self, kind: EventKind) -> Option<u32> {
        match self.ids[kind as usize].load(Ordering::Acquire) {
            UNAVAILABLE => None,
            id => Some(id),
        }
    }

    /// Resolve every kind up front. Returns how many registered successfully.
    pub fn preload(&self) -> usize {
        let mut resolved = 0;
        for kind in EventKind::ALL {
            match self.id(kind) {
                UNAVAILABLE => warn!("Failed to register event kind {}", kind),
                id => {
                    debug!("Event kind {} registered as {:#06x}", kind, id);
                    resolved += 1;
                }
            }
        }
        resolved
    }

    /// Reverse lookup of a resolved id, for classifying dequeued records.
    pub fn kind_of(&self, id: u32) -> Option<EventKind> {
        if id == UNAVAILABLE {
            return None;
        }
        EventKind::ALL
            .into_iter()
            .find(|&kind| self.cached(kind) == Some(id))
    }
}

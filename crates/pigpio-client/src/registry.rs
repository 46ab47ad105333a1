//! Local record of open daemon handles
//!
//! The daemon is the source of truth for handle validity. This registry only
//! lets the session reject handles it never opened (or already closed) and
//! audit what is still open at shutdown.

use pigpio_core::HandleKind;
use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

#[derive(Debug, Default)]
pub struct HandleRegistry {
    handles: Mutex<BTreeSet<(HandleKind, u32)>>,
}

impl HandleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeSet<(HandleKind, u32)>> {
        // The set is never left half-updated, so a poisoned lock is still usable
        self.handles.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record a handle returned by a successful open
    pub fn register(&self, kind: HandleKind, handle: u32) {
        if self.lock().insert((kind, handle)) {
            debug!(kind = %kind, handle, "Registered handle");
        } else {
            warn!(kind = %kind, handle, "Daemon reissued a handle that was already open");
        }
    }

    /// Forget a handle after a successful close. Returns whether it was known.
    pub fn release(&self, kind: HandleKind, handle: u32) -> bool {
        let removed = self.lock().remove(&(kind, handle));
        if removed {
            debug!(kind = %kind, handle, "Released handle");
        }
        removed
    }

    pub fn is_valid(&self, kind: HandleKind, handle: u32) -> bool {
        self.lock().contains(&(kind, handle))
    }

    /// All handles still open, ordered by kind then handle
    pub fn outstanding(&self) -> Vec<(HandleKind, u32)> {
        self.lock().iter().copied().collect()
    }

    /// Remove and return every handle
    pub fn drain(&self) -> Vec<(HandleKind, u32)> {
        let drained = std::mem::take(&mut *self.lock());
        drained.into_iter().collect()
    }

    pub fn count(&self, kind: HandleKind) -> usize {
        self.lock().iter().filter(|(k, _)| *k == kind).count()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

//! Single-slot observer registry.
//!
//! Each event kind has exactly one slot. Registering replaces whatever was
//! there before. Observers are cloned out of their slot before being
//! called, so no lock is held while user code runs.

use std::sync::{Arc, Mutex, PoisonError};

use crate::types::{TimerState, TimerStatus};

/// One optional observer.
pub(crate) struct Slot<T: ?Sized> {
    inner: Mutex<Option<Arc<T>>>,
}

impl<T: ?Sized> Default for Slot<T> {
    fn default() -> Self {
        Self {
            inner: Mutex::new(None),
        }
    }
}

impl<T: ?Sized> Slot<T> {
    pub(crate) fn replace(&self, observer: Arc<T>) {
        *self.lock() = Some(observer);
    }

    pub(crate) fn get(&self) -> Option<Arc<T>> {
        self.lock().clone()
    }

    pub(crate) fn clear(&self) {
        *self.lock() = None;
    }

    pub(crate) fn is_set(&self) -> bool {
        self.lock().is_some()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Arc<T>>> {
        // A panicking observer never runs under this lock
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// The three observer slots of a timer manager.
#[derive(Default)]
pub(crate) struct Observers {
    pub(crate) tick: Slot<dyn Fn(TimerState) + Send + Sync>,
    pub(crate) complete: Slot<dyn Fn() + Send + Sync>,
    pub(crate) status: Slot<dyn Fn(TimerStatus) + Send + Sync>,
}

impl Observers {
    pub(crate) fn clear(&self) {
        self.tick.clear();
        self.complete.clear();
        self.status.clear();
    }
}

//! In-memory state containers for list views.
//!
//! A [`Store`] is a single-writer, multi-reader cell. Writes replace the value
//! synchronously, so the next read after a setter returns always observes it.
//! Subscribers are woken on every write, which is how the query layer learns
//! that a derived key may have changed.

pub mod filter;
pub mod sort;

use std::sync::Arc;

use tokio::sync::watch;

pub use filter::{DatePreset, DateRange, FilterCriteria, FilterStore, RequestBody};
pub use sort::{SortDirection, SortKey, SortSpec, SortStore};

/// Shared handle to one piece of state.
///
/// Cloning the handle shares the underlying value; construct a new store for
/// an isolated instance.
#[derive(Debug)]
pub struct Store<T> {
    inner: Arc<watch::Sender<T>>,
}

impl<T> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Clone> Store<T> {
    pub fn new(initial: T) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self {
            inner: Arc::new(tx),
        }
    }

    /// Snapshot of the current value.
    pub fn get(&self) -> T {
        self.inner.borrow().clone()
    }

    /// Borrow the current value without cloning it.
    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow())
    }

    /// Replace the value wholesale.
    pub fn set(&self, value: T) {
        self.inner.send_replace(value);
    }

    /// Receiver that is notified on every subsequent write.
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.inner.subscribe()
    }
}

impl<T: Clone + Default> Default for Store<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

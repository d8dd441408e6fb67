use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

/// States published by a surface, waiting to be picked up in order.
///
/// The surface's history listener pushes every change of its current entry,
/// the composite editor drains them oldest first so each surface change
/// becomes its own global entry.
#[derive(Debug)]
pub struct PublishedQueue<S> {
    inner: Arc<Mutex<VecDeque<S>>>,
}

impl<S> Clone for PublishedQueue<S> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

impl<S> Default for PublishedQueue<S> {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(VecDeque::new())),
        }
    }
}

impl<S> PublishedQueue<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, state: S) {
        self.inner.lock().push_back(state);
    }

    /// Oldest unread state.
    pub fn take(&self) -> Option<S> {
        self.inner.lock().pop_front()
    }

    pub fn drain(&self) -> Vec<S> {
        self.inner.lock().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

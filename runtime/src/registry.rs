//! Listener registry with copy-on-write snapshots
//!
//! The registry keeps two generations of the listener list:
//!
//! - `current`: the snapshot taken by the most recent notification pass
//! - `next`: the list that `subscribe` and `unsubscribe` edit
//!
//! Both point at the same allocation until the first edit after a snapshot,
//! which copies `next` before changing it. A pass in flight iterates its own
//! `Arc` of the snapshot, so edits made by listeners never change the pass
//! that is running; they show up in the following pass.

use std::sync::Arc;

/// A zero-argument change listener
///
/// Identity is the `Arc` allocation: registering the same `Arc` twice
/// registers two occurrences.
pub type Listener = Arc<dyn Fn() + Send + Sync>;

pub(crate) struct ListenerRegistry {
    current: Arc<Vec<Listener>>,
    next: Arc<Vec<Listener>>,
}

impl ListenerRegistry {
    pub(crate) fn new() -> Self {
        let empty = Arc::new(Vec::new());
        Self {
            current: Arc::clone(&empty),
            next: empty,
        }
    }

    /// Copy `next` away from `current` if they still share storage
    fn next_mut(&mut self) -> &mut Vec<Listener> {
        if Arc::ptr_eq(&self.current, &self.next) {
            self.next = Arc::new(self.current.as_ref().clone());
        }
        Arc::make_mut(&mut self.next)
    }

    pub(crate) fn add(&mut self, listener: Listener) -> usize {
        let next = self.next_mut();
        next.push(listener);
        next.len()
    }

    /// Removes the first occurrence of `listener`; returns whether one was found
    pub(crate) fn remove(&mut self, listener: &Listener) -> bool {
        let next = self.next_mut();
        match next.iter().position(|l| Arc::ptr_eq(l, listener)) {
            Some(index) => {
                next.remove(index);
                true
            },
            None => false,
        }
    }

    /// Promote `next` to `current` and hand it out for a notification pass
    pub(crate) fn snapshot(&mut self) -> Arc<Vec<Listener>> {
        self.current = Arc::clone(&self.next);
        Arc::clone(&self.current)
    }

    pub(crate) fn len(&self) -> usize {
        self.next.len()
    }

    #[cfg(test)]
    fn shares_storage(&self) -> bool {
        Arc::ptr_eq(&self.current, &self.next)
    }
}

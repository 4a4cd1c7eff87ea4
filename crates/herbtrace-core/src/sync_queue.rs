//! Pending-submission queue for offline capture.
//!
//! Plain value; persisting it is up to the caller (it serializes as a JSON
//! array, oldest first).

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// FIFO of items waiting to be submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SyncQueue<T> {
    items: VecDeque<T>,
}

impl<T> Default for SyncQueue<T> {
    fn default() -> Self {
        Self {
            items: VecDeque::new(),
        }
    }
}

impl<T> SyncQueue<T> {
    /// Empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an item to the back.
    pub fn enqueue(&mut self, item: T) {
        self.items.push_back(item);
    }

    /// Puts items that failed to submit back at the front, keeping their order.
    pub fn requeue_front(&mut self, failed: Vec<T>) {
        for item in failed.into_iter().rev() {
            self.items.push_front(item);
        }
    }

    /// Removes and returns everything, oldest first.
    pub fn drain(&mut self) -> Vec<T> {
        self.items.drain(..).collect()
    }

    /// Number of pending items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Pending items, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }
}

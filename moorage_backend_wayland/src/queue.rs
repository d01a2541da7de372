// Copyright 2026 the Moorage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fixed-capacity FIFO shared by the backend's event queues.

use std::collections::VecDeque;

/// FIFO that evicts its oldest item when a push would exceed capacity.
#[derive(Debug, Clone)]
pub(crate) struct BoundedQueue<T> {
    items: VecDeque<T>,
    capacity: usize,
    evicted: u64,
}

impl<T> BoundedQueue<T> {
    /// `capacity == 0` is promoted to `1`.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
            evicted: 0,
        }
    }

    /// Appends `item`, returning the evicted oldest item when full.
    pub(crate) fn push(&mut self, item: T) -> Option<T> {
        let evicted = if self.items.len() < self.capacity {
            None
        } else {
            self.evicted += 1;
            self.items.pop_front()
        };
        self.items.push_back(item);
        evicted
    }

    pub(crate) fn pop(&mut self) -> Option<T> {
        self.items.pop_front()
    }

    /// Removes the queued items matching `f`.
    pub(crate) fn discard(&mut self, mut f: impl FnMut(&T) -> bool) -> usize {
        let before = self.items.len();
        self.items.retain(|item| !f(item));
        before - self.items.len()
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn evicted(&self) -> u64 {
        self.evicted
    }
}

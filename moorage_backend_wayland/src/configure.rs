// Copyright 2026 the Moorage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shell surface configure events and their queue.

use tracing::debug;
use wayland_client::backend::ObjectId;

use crate::queue::BoundedQueue;

/// A compositor-suggested size for one shell surface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfigureEvent {
    /// Protocol id of the `wl_shell_surface` being configured.
    pub shell_surface: ObjectId,
    /// Raw `wl_shell_surface.resize` edge bits.
    pub edges: u32,
    /// Suggested width in surface-local coordinates.
    pub width: i32,
    /// Suggested height in surface-local coordinates.
    pub height: i32,
}

/// Configures waiting for the toolkit, oldest first.
///
/// When full, the oldest configure is discarded.
#[derive(Debug, Clone)]
pub struct ConfigureQueue {
    inner: BoundedQueue<ConfigureEvent>,
}

impl ConfigureQueue {
    /// Capacity used by [`Default`].
    pub const DEFAULT_CAPACITY: usize = 32;

    /// Creates a queue holding at most `capacity` events, at least one.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: BoundedQueue::with_capacity(capacity),
        }
    }

    /// Enqueues a configure.
    pub fn push(&mut self, event: ConfigureEvent) {
        if let Some(lost) = self.inner.push(event) {
            debug!(
                shell_surface = %lost.shell_surface,
                width = lost.width,
                height = lost.height,
                "configure queue full, dropped oldest"
            );
        }
    }

    /// Pops the oldest configure.
    pub fn pop(&mut self) -> Option<ConfigureEvent> {
        self.inner.pop()
    }

    /// Drops every queued configure for `shell_surface`.
    ///
    /// Returns how many were dropped.
    pub fn forget(&mut self, shell_surface: &ObjectId) -> usize {
        self.inner.discard(|event| event.shell_surface == *shell_surface)
    }

    /// Queued configure count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` when nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.len() == 0
    }

    /// Maximum number of queued configures.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    /// Configures lost to overflow so far.
    #[must_use]
    pub fn dropped_count(&self) -> u64 {
        self.inner.evicted()
    }
}

impl Default for ConfigureQueue {
    fn default() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }
}

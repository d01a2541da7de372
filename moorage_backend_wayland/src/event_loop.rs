// Copyright 2026 the Moorage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The backend-owned event queue and the state its handlers update.
//!
//! # Queue ownership
//!
//! ```text
//! WaylandClient::connect
//!   registry_queue_init -> EventQueue<WaylandState> + GlobalList
//!   binds wl_output, and later wl_compositor / wl_shell / wl_shm,
//!   with QueueHandle<WaylandState>
//!
//! Integration::event_dispatcher (first call)
//!   -> WaylandClient::create_event_dispatcher
//!   -> EventDispatcher { EventQueue<WaylandState>, WaylandState }
//!
//! toolkit loop
//!   dispatcher.blocking_dispatch() / dispatch_pending()
//!   dispatcher.take_screen_changes() -> Integration::screens_changed
//!   dispatcher.pop_configure()       -> toolkit window resize
//! ```
//!
//! Every object whose events the backend handles must be created with the
//! client's queue handle; objects created on another queue are silently
//! never dispatched here.

use tracing::debug;
use wayland_client::protocol::wl_output::WlOutput;
use wayland_client::protocol::wl_shell_surface::WlShellSurface;
use wayland_client::protocol::wl_shm;
use wayland_client::{
    DispatchError, EventQueue, Proxy, QueueHandle,
    backend::{ReadEventsGuard, WaylandError},
};

use crate::configure::{ConfigureEvent, ConfigureQueue};
use crate::output::{OutputList, OutputSnapshot};

/// State updated by the backend's event handlers.
#[derive(Debug, Default)]
pub struct WaylandState {
    pub(crate) outputs: OutputList,
    output_proxies: Vec<(u32, WlOutput)>,
    pub(crate) shm_formats: Vec<wl_shm::Format>,
    pub(crate) configures: ConfigureQueue,
    screens_dirty: bool,
}

impl WaylandState {
    /// Creates an empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound outputs.
    #[must_use]
    pub fn outputs(&self) -> &OutputList {
        &self.outputs
    }

    /// Pixel formats the compositor accepts for shared-memory buffers.
    #[must_use]
    pub fn shm_formats(&self) -> &[wl_shm::Format] {
        &self.shm_formats
    }

    pub(crate) fn add_output(&mut self, registry_name: u32, proxy: WlOutput) {
        self.outputs.insert(registry_name);
        self.output_proxies.push((registry_name, proxy));
    }

    /// Forgets the output advertised as `registry_name`, releasing its proxy.
    pub(crate) fn remove_output(&mut self, registry_name: u32) {
        if let Some(index) = self
            .output_proxies
            .iter()
            .position(|(name, _)| *name == registry_name)
        {
            let (_, proxy) = self.output_proxies.swap_remove(index);
            if proxy.version() >= 3 {
                proxy.release();
            }
        }
        if self.outputs.remove(registry_name) {
            debug!(output = registry_name, "output removed");
            self.screens_dirty = true;
        }
    }

    /// Publishes the output's pending state on `wl_output.done`.
    pub(crate) fn commit_output(&mut self, registry_name: u32) {
        if self.outputs.commit(registry_name) {
            debug!(output = registry_name, "output changed");
            self.screens_dirty = true;
        }
    }

    /// Returns the current screens if outputs changed since the last call.
    pub fn take_screen_changes(&mut self) -> Option<OutputSnapshot> {
        if !core::mem::take(&mut self.screens_dirty) {
            return None;
        }
        Some(self.outputs.snapshot())
    }
}

/// The backend's event queue, owned by the integration's dispatcher slot.
#[derive(Debug)]
pub struct EventDispatcher {
    event_queue: EventQueue<WaylandState>,
    state: WaylandState,
}

impl EventDispatcher {
    pub(crate) fn new(event_queue: EventQueue<WaylandState>, state: WaylandState) -> Self {
        Self { event_queue, state }
    }

    /// Handle for creating objects whose events this dispatcher handles.
    #[must_use]
    pub fn queue_handle(&self) -> QueueHandle<WaylandState> {
        self.event_queue.handle()
    }

    /// Runs handlers for events already read from the socket.
    ///
    /// Does no socket I/O; pair with [`Self::flush`] and
    /// [`Self::prepare_read`] in a poll-based loop.
    pub fn dispatch_pending(&mut self) -> Result<usize, DispatchError> {
        self.event_queue.dispatch_pending(&mut self.state)
    }

    /// Flushes requests, blocks for new events if none are queued, and
    /// dispatches.
    pub fn blocking_dispatch(&mut self) -> Result<usize, DispatchError> {
        self.event_queue.blocking_dispatch(&mut self.state)
    }

    /// Flushes pending requests to the socket.
    pub fn flush(&self) -> Result<(), WaylandError> {
        self.event_queue.flush()
    }

    /// Starts a synchronized socket read.
    ///
    /// If this returns [`None`], dispatch queued events before trying again.
    #[must_use]
    pub fn prepare_read(&self) -> Option<ReadEventsGuard> {
        self.event_queue.prepare_read()
    }

    /// Returns the current screens if outputs changed since the last call.
    pub fn take_screen_changes(&mut self) -> Option<OutputSnapshot> {
        self.state.take_screen_changes()
    }

    /// Pops the oldest pending shell surface configure.
    pub fn pop_configure(&mut self) -> Option<ConfigureEvent> {
        self.state.configures.pop()
    }

    /// Drops queued configures for a shell surface about to be destroyed.
    pub fn forget_configures(&mut self, shell_surface: &WlShellSurface) {
        let dropped = self.state.configures.forget(&shell_surface.id());
        if dropped > 0 {
            debug!(shell_surface = %shell_surface.id(), dropped, "dropped stale configures");
        }
    }

    /// Backend state.
    #[must_use]
    pub fn state(&self) -> &WaylandState {
        &self.state
    }
}

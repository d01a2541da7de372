// Copyright 2026 the Moorage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! [`CompositorClient`] over a `wayland-client` connection.

use core::cell::RefCell;
use core::fmt;

use moorage_core::PlatformError;
use moorage_core::backend::{CompositorClient, Global, InterfaceKind};
use moorage_core::backing_store::PixelSize;
use thiserror::Error;
use tracing::{debug, info, warn};
use wayland_client::globals::{GlobalError, GlobalList, registry_queue_init};
use wayland_client::protocol::wl_compositor::WlCompositor;
use wayland_client::protocol::wl_shell::WlShell;
use wayland_client::protocol::wl_shell_surface::WlShellSurface;
use wayland_client::protocol::wl_shm::WlShm;
use wayland_client::protocol::wl_surface::WlSurface;
use wayland_client::{Connection, Proxy, QueueHandle};

use crate::dispatch::{self, OUTPUT_INTERFACE};
use crate::event_loop::{EventDispatcher, WaylandState};
use crate::shm::ShmBuffer;

/// Highest `wl_compositor` version used. Version 4 adds `damage_buffer`.
pub const COMPOSITOR_VERSION: u32 = 4;

/// Highest `wl_shell` version used.
pub const SHELL_VERSION: u32 = 1;

/// Highest `wl_shm` version used.
pub const SHM_VERSION: u32 = 1;

/// Failure to reach the compositor at startup.
#[derive(Debug, Error)]
pub enum ConnectError {
    /// No compositor socket could be opened.
    #[error("failed to connect to the compositor")]
    Connect(#[from] wayland_client::ConnectError),
    /// The initial registry roundtrip failed.
    #[error("failed to read the compositor's globals")]
    Globals(#[from] GlobalError),
}

/// A `wl_surface` destroyed on drop.
#[derive(Debug)]
pub struct WindowSurface(WlSurface);

impl WindowSurface {
    /// The protocol surface.
    #[must_use]
    pub fn wl_surface(&self) -> &WlSurface {
        &self.0
    }
}

impl Drop for WindowSurface {
    fn drop(&mut self) {
        self.0.destroy();
    }
}

/// A connected compositor client.
///
/// All objects are created on one event queue, handed out once through
/// [`CompositorClient::create_event_dispatcher`].
pub struct WaylandClient {
    connection: Connection,
    globals: GlobalList,
    queue_handle: QueueHandle<WaylandState>,
    dispatcher: RefCell<Option<EventDispatcher>>,
}

impl fmt::Debug for WaylandClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WaylandClient")
            .field("connection", &self.connection)
            .field("dispatcher_taken", &self.dispatcher.borrow().is_none())
            .finish_non_exhaustive()
    }
}

impl WaylandClient {
    /// Connects to the compositor named by `WAYLAND_DISPLAY` /
    /// `WAYLAND_SOCKET`.
    pub fn connect() -> Result<Self, ConnectError> {
        Self::from_connection(Connection::connect_to_env()?)
    }

    /// Wraps an existing connection.
    ///
    /// Performs one registry roundtrip and binds every advertised output.
    /// Compositor, shell and shared-memory globals stay unbound until first
    /// use.
    pub fn from_connection(connection: Connection) -> Result<Self, ConnectError> {
        let (globals, event_queue) = registry_queue_init::<WaylandState>(&connection)?;
        let queue_handle = event_queue.handle();

        let mut state = WaylandState::new();
        let outputs: Vec<(u32, u32)> = globals.contents().with_list(|list| {
            list.iter()
                .filter(|global| global.interface == OUTPUT_INTERFACE)
                .map(|global| (global.name, global.version))
                .collect()
        });
        for (name, version) in outputs {
            dispatch::bind_output(&mut state, globals.registry(), name, version, &queue_handle);
        }
        info!(outputs = state.outputs().len(), "connected to compositor");

        Ok(Self {
            connection,
            globals,
            queue_handle,
            dispatcher: RefCell::new(Some(EventDispatcher::new(event_queue, state))),
        })
    }

    /// The underlying connection.
    #[must_use]
    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    fn bind<I>(&self, global: Global, max_version: u32) -> I
    where
        I: Proxy + 'static,
        WaylandState: wayland_client::Dispatch<I, ()>,
    {
        self.globals.registry().bind::<I, _, _>(
            global.name,
            negotiated_version(global.version, max_version),
            &self.queue_handle,
            (),
        )
    }
}

/// Version to bind: the lower of what is advertised and what is spoken.
pub(crate) const fn negotiated_version(advertised: u32, supported: u32) -> u32 {
    if advertised < supported {
        advertised
    } else {
        supported
    }
}

impl CompositorClient for WaylandClient {
    type Display = Connection;
    type Compositor = WlCompositor;
    type Shell = WlShell;
    type ShmFactory = WlShm;
    type Surface = WindowSurface;
    type ShellSurface = WlShellSurface;
    type Buffer = ShmBuffer;
    type Dispatcher = EventDispatcher;

    fn display(&self) -> &Connection {
        &self.connection
    }

    fn lookup(&self, kind: InterfaceKind) -> Global {
        self.globals.contents().with_list(|list| {
            list.iter()
                .find(|global| global.interface == kind.interface_name())
                .map_or(Global::ABSENT, |global| Global {
                    name: global.name,
                    version: global.version,
                })
        })
    }

    fn bind_compositor(&self, global: Global) -> WlCompositor {
        self.bind(global, COMPOSITOR_VERSION)
    }

    fn bind_shell(&self, global: Global) -> WlShell {
        self.bind(global, SHELL_VERSION)
    }

    fn bind_shm(&self, global: Global) -> WlShm {
        self.bind(global, SHM_VERSION)
    }

    fn create_surface(
        &self,
        compositor: &WlCompositor,
        parent: Option<&WindowSurface>,
    ) -> WindowSurface {
        if let Some(parent) = parent {
            debug!(parent = %parent.0.id(), "wl_surface has no parent, ignoring");
        }
        WindowSurface(compositor.create_surface(&self.queue_handle, ()))
    }

    fn create_shell_surface(&self, shell: &WlShell, surface: &WindowSurface) -> WlShellSurface {
        let shell_surface = shell.get_shell_surface(&surface.0, &self.queue_handle, ());
        shell_surface.set_toplevel();
        shell_surface
    }

    fn allocate_buffer(&self, shm: &WlShm, size: PixelSize) -> Result<ShmBuffer, PlatformError> {
        ShmBuffer::allocate(shm, size, &self.queue_handle)
    }

    fn upload(&self, buffer: &ShmBuffer, pixels: &[u8]) -> Result<(), PlatformError> {
        buffer.write(pixels)
    }

    fn present(&self, surface: &WindowSurface, buffer: &ShmBuffer, size: PixelSize) {
        let surface = &surface.0;
        let width = i32::try_from(size.width).unwrap_or(i32::MAX);
        let height = i32::try_from(size.height).unwrap_or(i32::MAX);
        buffer.mark_attached();
        surface.attach(Some(buffer.wl_buffer()), 0, 0);
        if surface.version() >= 4 {
            surface.damage_buffer(0, 0, width, height);
        } else {
            surface.damage(0, 0, width, height);
        }
        surface.commit();
        if let Err(err) = self.connection.flush() {
            warn!(%err, "failed to flush commit");
        }
    }

    fn create_event_dispatcher(&self) -> EventDispatcher {
        self.dispatcher.borrow_mut().take().unwrap_or_else(|| {
            warn!("event queue already handed out, creating a detached dispatcher");
            EventDispatcher::new(self.connection.new_event_queue(), WaylandState::new())
        })
    }
}

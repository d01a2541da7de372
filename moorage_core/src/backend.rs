// Copyright 2026 the Moorage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend contract for compositor client integrations.
//!
//! Moorage splits protocol-specific work into *backend* crates. Each backend
//! provides the following pieces:
//!
//! - **Registry lookup**: [`CompositorClient::lookup`] reports whether the
//!   compositor advertises an interface, as a [`Global`]. A zero name means
//!   "not advertised". Lookups must not block; backends answer from the
//!   globals they already received.
//!
//! - **Binding**: `bind_*` turns an advertised [`Global`] into a client-side
//!   proxy. Only called once per interface kind, by
//!   [`ProtocolCache`](crate::cache::ProtocolCache).
//!
//! - **Object creation**: surfaces, shell surfaces and shared-memory buffers
//!   created from bound proxies.
//!
//! - **Dispatch**: the event dispatcher the toolkit pumps, created once per
//!   [`Integration`](crate::Integration).
//!
//! # Crate boundaries
//!
//! `moorage_core` owns the caching, fallback, and bookkeeping rules and this
//! contract module. Backend crates depend on `moorage_core` and provide the
//! wire-level glue. Hosts depend on both and wire them together.

use core::fmt;

use crate::backing_store::PixelSize;
use crate::error::PlatformError;

/// Optional compositor interfaces resolved through the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InterfaceKind {
    /// Surface-creation factory (`wl_compositor`).
    Compositor,
    /// Legacy shell factory (`wl_shell`).
    Shell,
    /// Shared-memory pool factory (`wl_shm`).
    Shm,
}

impl InterfaceKind {
    /// All kinds, in a fixed order.
    pub const ALL: [Self; 3] = [Self::Compositor, Self::Shell, Self::Shm];

    /// Returns the wire-level interface name.
    #[must_use]
    pub const fn interface_name(self) -> &'static str {
        match self {
            Self::Compositor => "wl_compositor",
            Self::Shell => "wl_shell",
            Self::Shm => "wl_shm",
        }
    }
}

impl fmt::Display for InterfaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.interface_name())
    }
}

/// A registry advertisement for one interface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Global {
    /// Registry name. Zero means the interface is not advertised.
    pub name: u32,
    /// Advertised interface version.
    pub version: u32,
}

impl Global {
    /// The "not advertised" result.
    pub const ABSENT: Self = Self {
        name: 0,
        version: 0,
    };

    /// Returns `true` if the registry reported a nonzero object name.
    #[must_use]
    pub const fn is_advertised(self) -> bool {
        self.name != 0
    }
}

/// A compositor client connection as seen by the integration layer.
///
/// All methods run on the single event-processing thread and must not block
/// on a compositor round trip.
pub trait CompositorClient {
    /// Native display handle exposed through the native interface.
    type Display: fmt::Debug;
    /// Bound surface-creation factory.
    type Compositor: fmt::Debug;
    /// Bound legacy shell factory.
    type Shell: fmt::Debug;
    /// Bound shared-memory pool factory. Cloned into each backing store.
    type ShmFactory: Clone + fmt::Debug;
    /// Compositor-side drawable surface.
    type Surface: fmt::Debug;
    /// Shell wrapper granting window-management semantics to a surface.
    type ShellSurface: fmt::Debug;
    /// Presentable shared-memory buffer.
    type Buffer: fmt::Debug;
    /// Per-process event dispatcher.
    type Dispatcher: fmt::Debug;

    /// Returns the native display handle.
    fn display(&self) -> &Self::Display;

    /// Queries the registry for `kind`.
    fn lookup(&self, kind: InterfaceKind) -> Global;

    /// Binds the surface-creation factory advertised as `global`.
    fn bind_compositor(&self, global: Global) -> Self::Compositor;

    /// Binds the legacy shell factory advertised as `global`.
    fn bind_shell(&self, global: Global) -> Self::Shell;

    /// Binds the shared-memory pool factory advertised as `global`.
    fn bind_shm(&self, global: Global) -> Self::ShmFactory;

    /// Creates a drawable surface.
    ///
    /// `parent` is the object that owns the new surface's lifetime, if any.
    /// The compositor factory itself is never a valid parent.
    fn create_surface(
        &self,
        compositor: &Self::Compositor,
        parent: Option<&Self::Surface>,
    ) -> Self::Surface;

    /// Wraps `surface` in a toplevel shell surface.
    fn create_shell_surface(
        &self,
        shell: &Self::Shell,
        surface: &Self::Surface,
    ) -> Self::ShellSurface;

    /// Allocates a shared-memory pool and a buffer of exactly `size` in it.
    fn allocate_buffer(
        &self,
        shm: &Self::ShmFactory,
        size: PixelSize,
    ) -> Result<Self::Buffer, PlatformError>;

    /// Copies `pixels` (ARGB8888, `size.stride()` bytes per row) into
    /// `buffer`.
    ///
    /// A backend that knows the compositor still reads `buffer` returns
    /// [`PlatformError::BufferBusy`] and leaves its contents alone.
    fn upload(&self, buffer: &Self::Buffer, pixels: &[u8]) -> Result<(), PlatformError>;

    /// Attaches `buffer` to `surface`, damages all of it, and commits.
    fn present(&self, surface: &Self::Surface, buffer: &Self::Buffer, size: PixelSize);

    /// Creates the event dispatcher. Called at most once per integration.
    fn create_event_dispatcher(&self) -> Self::Dispatcher;
}

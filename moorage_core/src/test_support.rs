// Copyright 2026 the Moorage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory compositor client and scene for unit tests.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use crate::backend::{CompositorClient, Global, InterfaceKind};
use crate::backing_store::PixelSize;
use crate::error::PlatformError;
use crate::gpu::{EglConfig, EglDisplay, EglSurface, ScenePlatform};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct MockProxy {
    pub(crate) id: u32,
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) struct MockShellSurface {
    pub(crate) wraps: u32,
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) struct MockBuffer {
    pub(crate) id: u32,
    pub(crate) size: PixelSize,
}

#[derive(Debug, Default)]
pub(crate) struct MockDispatcher {
    pub(crate) dispatched: usize,
}

#[derive(Debug)]
pub(crate) struct MockClient {
    advertised: Vec<InterfaceKind>,
    lookups: RefCell<HashMap<InterfaceKind, usize>>,
    next_id: Cell<u32>,
    surface_parents: RefCell<Vec<Option<u32>>>,
    allocations: Cell<usize>,
    uploads: Cell<usize>,
    buffers_held: Cell<bool>,
    last_upload: RefCell<Option<Vec<u8>>>,
    presented: RefCell<Vec<(u32, u32)>>,
    dispatchers: Cell<usize>,
}

impl MockClient {
    pub(crate) fn full() -> Self {
        Self::without(&[])
    }

    pub(crate) fn without(missing: &[InterfaceKind]) -> Self {
        Self {
            advertised: InterfaceKind::ALL
                .into_iter()
                .filter(|kind| !missing.contains(kind))
                .collect(),
            lookups: RefCell::default(),
            // Ids start above the registry names handed out by `lookup`.
            next_id: Cell::new(100),
            surface_parents: RefCell::default(),
            allocations: Cell::new(0),
            uploads: Cell::new(0),
            buffers_held: Cell::new(false),
            last_upload: RefCell::default(),
            presented: RefCell::default(),
            dispatchers: Cell::new(0),
        }
    }

    pub(crate) fn lookups(&self, kind: InterfaceKind) -> usize {
        self.lookups.borrow().get(&kind).copied().unwrap_or(0)
    }

    pub(crate) fn surfaces_created(&self) -> Vec<Option<u32>> {
        self.surface_parents.borrow().clone()
    }

    pub(crate) fn allocations(&self) -> usize {
        self.allocations.get()
    }

    pub(crate) fn uploads(&self) -> usize {
        self.uploads.get()
    }

    /// While set, uploads fail as if the compositor still read the buffer.
    pub(crate) fn hold_buffers(&self, held: bool) {
        self.buffers_held.set(held);
    }

    pub(crate) fn last_upload(&self) -> Option<Vec<u8>> {
        self.last_upload.borrow().clone()
    }

    pub(crate) fn presented(&self) -> Vec<(u32, u32)> {
        self.presented.borrow().clone()
    }

    pub(crate) fn dispatchers(&self) -> usize {
        self.dispatchers.get()
    }

    fn next(&self) -> u32 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }
}

impl CompositorClient for MockClient {
    type Display = ();
    type Compositor = MockProxy;
    type Shell = MockProxy;
    type ShmFactory = MockProxy;
    type Surface = MockProxy;
    type ShellSurface = MockShellSurface;
    type Buffer = MockBuffer;
    type Dispatcher = MockDispatcher;

    fn display(&self) -> &Self::Display {
        &()
    }

    fn lookup(&self, kind: InterfaceKind) -> Global {
        *self.lookups.borrow_mut().entry(kind).or_default() += 1;
        if !self.advertised.contains(&kind) {
            return Global::ABSENT;
        }
        let name = match kind {
            InterfaceKind::Compositor => 1,
            InterfaceKind::Shell => 2,
            InterfaceKind::Shm => 3,
        };
        Global { name, version: 1 }
    }

    fn bind_compositor(&self, global: Global) -> Self::Compositor {
        MockProxy { id: global.name }
    }

    fn bind_shell(&self, global: Global) -> Self::Shell {
        MockProxy { id: global.name }
    }

    fn bind_shm(&self, global: Global) -> Self::ShmFactory {
        MockProxy { id: global.name }
    }

    fn create_surface(
        &self,
        _compositor: &Self::Compositor,
        parent: Option<&Self::Surface>,
    ) -> Self::Surface {
        self.surface_parents
            .borrow_mut()
            .push(parent.map(|p| p.id));
        MockProxy { id: self.next() }
    }

    fn create_shell_surface(
        &self,
        _shell: &Self::Shell,
        surface: &Self::Surface,
    ) -> Self::ShellSurface {
        MockShellSurface { wraps: surface.id }
    }

    fn allocate_buffer(
        &self,
        _shm: &Self::ShmFactory,
        size: PixelSize,
    ) -> Result<Self::Buffer, PlatformError> {
        size.byte_len()?;
        self.allocations.set(self.allocations.get() + 1);
        Ok(MockBuffer {
            id: self.next(),
            size,
        })
    }

    fn upload(&self, _buffer: &Self::Buffer, pixels: &[u8]) -> Result<(), PlatformError> {
        if self.buffers_held.get() {
            return Err(PlatformError::BufferBusy);
        }
        self.uploads.set(self.uploads.get() + 1);
        *self.last_upload.borrow_mut() = Some(pixels.to_vec());
        Ok(())
    }

    fn present(&self, surface: &Self::Surface, buffer: &Self::Buffer, _size: PixelSize) {
        self.presented.borrow_mut().push((surface.id, buffer.id));
    }

    fn create_event_dispatcher(&self) -> Self::Dispatcher {
        self.dispatchers.set(self.dispatchers.get() + 1);
        MockDispatcher::default()
    }
}

/// Scene platform with fixed capability answers.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct MockScene {
    pub(crate) native_context: bool,
    pub(crate) display: Option<EglDisplay>,
    pub(crate) surface: Option<EglSurface>,
    pub(crate) config: Option<EglConfig>,
}

impl MockScene {
    pub(crate) fn with_surface() -> Self {
        Self {
            native_context: false,
            display: EglDisplay::from_raw(0x10),
            surface: EglSurface::from_raw(0x20),
            config: EglConfig::from_raw(0x30),
        }
    }
}

impl ScenePlatform for MockScene {
    fn supports_native_context(&self) -> bool {
        self.native_context
    }

    fn egl_display(&self) -> Option<EglDisplay> {
        self.display
    }

    fn egl_surface(&self) -> Option<EglSurface> {
        self.surface
    }

    fn egl_config(&self) -> Option<EglConfig> {
        self.config
    }
}

// Copyright 2026 the Moorage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Access to native handles for advanced interop.

use core::fmt;

use crate::backend::CompositorClient;
use crate::gpu::{EglDisplay, ScenePlatform};
use crate::integration::Integration;
use crate::screen::{Screen, ScreenId};
use crate::window::PlatformWindow;

/// Borrowed view of an [`Integration`]'s native handles.
pub struct NativeInterface<'a, B: CompositorClient, P> {
    integration: &'a Integration<B, P>,
}

impl<B: CompositorClient, P> fmt::Debug for NativeInterface<'_, B, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeInterface")
            .field("display", self.integration.protocols().client().display())
            .finish_non_exhaustive()
    }
}

impl<'a, B: CompositorClient, P: ScenePlatform> NativeInterface<'a, B, P> {
    pub(crate) fn new(integration: &'a Integration<B, P>) -> Self {
        Self { integration }
    }

    /// The compositor connection's display handle.
    #[must_use]
    pub fn display(&self) -> &'a B::Display {
        self.integration.protocols().client().display()
    }

    /// The surface-creation factory, resolving it if needed.
    #[must_use]
    pub fn compositor(&self) -> Option<&'a B::Compositor> {
        self.integration.protocols().compositor()
    }

    /// The compositor surface of `window`, if it has one.
    #[must_use]
    pub fn window_surface<'w>(&self, window: &'w PlatformWindow<B>) -> Option<&'w B::Surface> {
        window.surface()
    }

    /// The screen with `id`, if currently tracked.
    #[must_use]
    pub fn screen(&self, id: ScreenId) -> Option<&'a Screen> {
        self.integration.screens().iter().find(|s| s.id() == id)
    }

    /// The scene's EGL display, if any.
    #[must_use]
    pub fn egl_display(&self) -> Option<EglDisplay> {
        self.integration.scene().egl_display()
    }
}

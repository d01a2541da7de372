// Copyright 2026 the Moorage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fixed capability table queried by the toolkit at startup.

/// Rendering and windowing capabilities a toolkit may ask about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Pixmaps may be created off the main thread.
    ThreadedPixmaps,
    /// GPU rendering through shared contexts.
    OpenGl,
    /// GPU rendering off the main thread.
    ThreadedOpenGl,
    /// Queued buffer swaps for GPU rendering.
    BufferQueueingOpenGl,
    /// More than one toplevel window.
    MultipleWindows,
    /// Windows that are not forced full-screen.
    NonFullScreenWindows,
    /// Mixing raster and GPU content on one surface.
    RasterGlSurface,
    /// Embedding windows owned by other processes.
    ForeignWindows,
    /// Platform-managed window positioning.
    WindowManagement,
    /// Tracking application activation state.
    ApplicationState,
}

impl Capability {
    /// Every capability, for exhaustive queries.
    pub const ALL: [Self; 10] = [
        Self::ThreadedPixmaps,
        Self::OpenGl,
        Self::ThreadedOpenGl,
        Self::BufferQueueingOpenGl,
        Self::MultipleWindows,
        Self::NonFullScreenWindows,
        Self::RasterGlSurface,
        Self::ForeignWindows,
        Self::WindowManagement,
        Self::ApplicationState,
    ];
}

/// Returns whether the integration supports `cap`. Pure.
#[must_use]
pub const fn has_capability(cap: Capability) -> bool {
    match cap {
        Capability::ThreadedPixmaps
        | Capability::OpenGl
        | Capability::MultipleWindows
        | Capability::NonFullScreenWindows => true,
        Capability::ThreadedOpenGl
        | Capability::BufferQueueingOpenGl
        | Capability::RasterGlSurface
        | Capability::ForeignWindows
        | Capability::WindowManagement
        | Capability::ApplicationState => false,
    }
}

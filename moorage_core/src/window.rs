// Copyright 2026 the Moorage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Window and offscreen surface creation.

use core::fmt;

use kurbo::Rect;
use tracing::{debug, warn};

use crate::backend::CompositorClient;
use crate::backing_store::PixelSize;
use crate::cache::ProtocolCache;

/// Identifies a toolkit window for the lifetime of the integration.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WindowId(pub u64);

impl fmt::Debug for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WindowId({})", self.0)
    }
}

/// Toolkit-level window role.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum WindowKind {
    /// Ordinary toplevel window.
    #[default]
    Normal,
    /// Dialog, typically with a transient parent.
    Dialog,
    /// Popup or tooltip.
    Popup,
}

/// What the toolkit asks for when creating a window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WindowRequest {
    /// Logical geometry.
    pub geometry: Rect,
    /// Window role.
    pub kind: WindowKind,
    /// Device pixels per logical pixel.
    pub scale: f64,
}

impl Default for WindowRequest {
    fn default() -> Self {
        Self {
            geometry: Rect::ZERO,
            kind: WindowKind::Normal,
            scale: 1.0,
        }
    }
}

/// Compositor objects backing a drawable window.
#[derive(Debug)]
pub struct CompositorSurface<B: CompositorClient> {
    surface: B::Surface,
    shell_surface: B::ShellSurface,
}

/// A toolkit window as seen by the platform layer.
///
/// A window without a [`CompositorSurface`] is degraded: it exists for the
/// toolkit but cannot be drawn through the compositor. Dropping the window
/// releases its compositor objects.
#[derive(Debug)]
pub struct PlatformWindow<B: CompositorClient> {
    id: WindowId,
    kind: WindowKind,
    geometry: Rect,
    scale: f64,
    transient_parent: Option<WindowId>,
    compositor: Option<CompositorSurface<B>>,
}

impl<B: CompositorClient> PlatformWindow<B> {
    fn new(
        id: WindowId,
        request: &WindowRequest,
        compositor: Option<CompositorSurface<B>>,
    ) -> Self {
        Self {
            id,
            kind: request.kind,
            geometry: request.geometry,
            scale: request.scale,
            transient_parent: None,
            compositor,
        }
    }

    /// Window identity.
    #[must_use]
    pub fn id(&self) -> WindowId {
        self.id
    }

    /// Window role.
    #[must_use]
    pub fn kind(&self) -> WindowKind {
        self.kind
    }

    /// Returns `true` if the window has no compositor surface.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.compositor.is_none()
    }

    /// The compositor surface, if any.
    #[must_use]
    pub fn surface(&self) -> Option<&B::Surface> {
        self.compositor.as_ref().map(|c| &c.surface)
    }

    /// The shell surface wrapping [`Self::surface`], if any.
    #[must_use]
    pub fn shell_surface(&self) -> Option<&B::ShellSurface> {
        self.compositor.as_ref().map(|c| &c.shell_surface)
    }

    /// Logical geometry.
    #[must_use]
    pub fn geometry(&self) -> Rect {
        self.geometry
    }

    /// Updates the logical geometry. Buffers follow on the next flush.
    pub fn set_geometry(&mut self, geometry: Rect) {
        self.geometry = geometry;
    }

    /// Device pixels per logical pixel.
    #[must_use]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Sets the device scale factor.
    pub fn set_scale(&mut self, scale: f64) {
        self.scale = scale;
    }

    /// Buffer size needed to cover the current geometry.
    #[must_use]
    pub fn pixel_size(&self) -> PixelSize {
        PixelSize::from_logical(self.geometry.size(), self.scale)
    }

    /// Toolkit-level parent, e.g. for dialogs.
    #[must_use]
    pub fn transient_parent(&self) -> Option<WindowId> {
        self.transient_parent
    }

    /// Reparents the window at toolkit level.
    ///
    /// Compositor surface ownership is unaffected: surfaces are never
    /// parented, so reparenting cannot form an ownership cycle.
    pub fn set_transient_parent(&mut self, parent: Option<WindowId>) {
        if parent == Some(self.id) {
            warn!(window = ?self.id, "ignoring attempt to parent a window to itself");
            return;
        }
        self.transient_parent = parent;
    }

    /// Attaches `buffer` to the window surface and commits it.
    ///
    /// Degraded windows drop the frame.
    pub fn present(&self, client: &B, buffer: &B::Buffer, size: PixelSize) {
        match self.surface() {
            Some(surface) => client.present(surface, buffer, size),
            None => debug!(window = ?self.id, "degraded window, dropping frame"),
        }
    }
}

/// Creates the platform window for a toolkit window.
///
/// Never fails: without a compositor or shell the window is degraded.
pub fn create_window_surface<B: CompositorClient>(
    protocols: &ProtocolCache<B>,
    id: WindowId,
    request: &WindowRequest,
) -> PlatformWindow<B> {
    let (Some(compositor), Some(shell)) = (protocols.compositor(), protocols.shell()) else {
        warn!(window = ?id, "compositor or shell unavailable, creating degraded window");
        return PlatformWindow::new(id, request, None);
    };
    let client = protocols.client();
    // Never parent the surface to the compositor factory: a dialog that is
    // later reparented would otherwise own its own ancestor.
    let surface = client.create_surface(compositor, None);
    let shell_surface = client.create_shell_surface(shell, &surface);
    debug!(window = ?id, kind = ?request.kind, "created compositor-backed window");
    PlatformWindow::new(
        id,
        request,
        Some(CompositorSurface {
            surface,
            shell_surface,
        }),
    )
}

/// Requested format for an offscreen surface.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct OffscreenRequest {
    /// Logical size.
    pub size: kurbo::Size,
}

/// Placeholder for an offscreen surface. Never presented to the compositor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OffscreenSurface {
    size: kurbo::Size,
}

impl OffscreenSurface {
    /// Logical size.
    #[must_use]
    pub fn size(&self) -> kurbo::Size {
        self.size
    }

    /// Offscreen surfaces are always valid.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        true
    }
}

/// Creates an offscreen surface. Always succeeds; no compositor traffic.
#[must_use]
pub fn create_offscreen_surface(request: &OffscreenRequest) -> OffscreenSurface {
    OffscreenSurface { size: request.size }
}

#[cfg(test)]
mod tests {
    use super::{
        OffscreenRequest, WindowId, WindowKind, WindowRequest, create_offscreen_surface,
        create_window_surface,
    };
    use crate::backend::InterfaceKind;
    use crate::cache::ProtocolCache;
    use crate::test_support::MockClient;
    use kurbo::{Rect, Size};

    fn request() -> WindowRequest {
        WindowRequest {
            geometry: Rect::new(0.0, 0.0, 640.0, 480.0),
            kind: WindowKind::Dialog,
            scale: 1.0,
        }
    }

    #[test]
    fn full_protocol_set_creates_drawable_window() {
        let cache = ProtocolCache::new(MockClient::full());
        let window = create_window_surface(&cache, WindowId(1), &request());

        assert!(!window.is_degraded());
        let surface = window.surface().map(|s| s.id);
        let wrapped = window.shell_surface().map(|s| s.wraps);
        assert_eq!(
            wrapped,
            surface,
            "shell surface must wrap the window surface"
        );
    }

    #[test]
    fn missing_shell_degrades_without_failing() {
        let cache = ProtocolCache::new(MockClient::without(&[InterfaceKind::Shell]));
        let window = create_window_surface(&cache, WindowId(1), &request());

        assert!(window.is_degraded());
        assert!(window.surface().is_none());
        assert_eq!(window.geometry(), request().geometry);
        assert!(cache.client().surfaces_created().is_empty());
    }

    #[test]
    fn missing_compositor_degrades_without_failing() {
        let cache = ProtocolCache::new(MockClient::without(&[InterfaceKind::Compositor]));
        let window = create_window_surface(&cache, WindowId(2), &request());

        assert!(window.is_degraded());
        assert_eq!(window.id(), WindowId(2));
    }

    #[test]
    fn surfaces_are_never_parented_to_the_factory() {
        let cache = ProtocolCache::new(MockClient::full());
        let factory = cache.compositor().map(|c| c.id);

        for id in 0..3 {
            let _ = create_window_surface(&cache, WindowId(id), &request());
        }

        let parents = cache.client().surfaces_created();
        assert_eq!(parents.len(), 3);
        for parent in parents {
            assert_eq!(parent, None, "window surfaces have no parent");
            assert_ne!(parent, factory);
        }
    }

    #[test]
    fn reparenting_stays_at_toolkit_level() {
        let cache = ProtocolCache::new(MockClient::full());
        let mut dialog = create_window_surface(&cache, WindowId(5), &request());

        dialog.set_transient_parent(Some(WindowId(1)));
        assert_eq!(dialog.transient_parent(), Some(WindowId(1)));

        dialog.set_transient_parent(Some(WindowId(5)));
        assert_eq!(
            dialog.transient_parent(),
            Some(WindowId(1)),
            "self-parenting is rejected"
        );
        assert_eq!(cache.client().surfaces_created(), vec![None]);
    }

    #[test]
    fn offscreen_surfaces_always_succeed() {
        let surface = create_offscreen_surface(&OffscreenRequest {
            size: Size::new(64.0, 32.0),
        });
        assert!(surface.is_valid());
        assert_eq!(surface.size(), Size::new(64.0, 32.0));
    }
}

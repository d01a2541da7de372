// Copyright 2026 the Moorage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! GPU context creation with sharing against the compositor's scene.
//!
//! Scene backends expose GPU sharing at different granularities: some own
//! a context the integration can share directly, others only a raw display
//! and surface. [`create_context`] checks the capability before committing
//! to a strategy:
//!
//! 1. [`ContextSharing::Native`] when the scene supports it.
//! 2. [`ContextSharing::SceneSurface`] when the scene has both a display
//!    and a surface.
//! 3. No context. The window renders in software.
//!
//! Requesting native sharing from a scene that does not support it is a
//! caller error, so it is never attempted speculatively.

use core::fmt;
use core::num::NonZeroUsize;

use tracing::{debug, warn};

macro_rules! egl_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(NonZeroUsize);

        impl $name {
            /// Wraps a raw handle. Null maps to `None`.
            #[must_use]
            pub const fn from_raw(raw: usize) -> Option<Self> {
                match NonZeroUsize::new(raw) {
                    Some(raw) => Some(Self(raw)),
                    None => None,
                }
            }

            /// Returns the raw handle.
            #[must_use]
            pub const fn as_raw(self) -> usize {
                self.0.get()
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({:#x})"), self.0.get())
            }
        }
    };
}

egl_handle!(
    /// Opaque, non-null EGL display handle owned by the scene.
    EglDisplay
);
egl_handle!(
    /// Opaque, non-null EGL surface handle owned by the scene.
    EglSurface
);
egl_handle!(
    /// Opaque, non-null EGL framebuffer configuration.
    EglConfig
);

/// The compositor's own rendering scene, which owns the master GPU context.
pub trait ScenePlatform {
    /// Whether the scene can share its context object directly.
    fn supports_native_context(&self) -> bool;

    /// The scene's EGL display, if it has one.
    fn egl_display(&self) -> Option<EglDisplay>;

    /// The scene's EGL surface, if it has one.
    fn egl_surface(&self) -> Option<EglSurface>;

    /// The configuration the scene surface was created with.
    fn egl_config(&self) -> Option<EglConfig>;
}

/// Requested framebuffer format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SurfaceFormat {
    /// Red channel bits.
    pub red_bits: u8,
    /// Green channel bits.
    pub green_bits: u8,
    /// Blue channel bits.
    pub blue_bits: u8,
    /// Alpha channel bits.
    pub alpha_bits: u8,
    /// Depth buffer bits.
    pub depth_bits: u8,
    /// Stencil buffer bits.
    pub stencil_bits: u8,
    /// Multisample count, 0 for none.
    pub samples: u8,
}

impl Default for SurfaceFormat {
    fn default() -> Self {
        Self {
            red_bits: 8,
            green_bits: 8,
            blue_bits: 8,
            alpha_bits: 8,
            depth_bits: 24,
            stencil_bits: 8,
            samples: 0,
        }
    }
}

/// What the toolkit asks for when creating a GPU context.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ContextRequest {
    /// Requested framebuffer format.
    pub format: SurfaceFormat,
}

/// How a context shares GPU state with the scene's master context.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContextSharing {
    /// Shares the scene context object directly.
    Native,
    /// Shares against the scene's display and surface.
    SceneSurface {
        /// Scene display.
        display: EglDisplay,
        /// Scene surface.
        surface: EglSurface,
        /// Scene surface configuration, if the scene reports one.
        config: Option<EglConfig>,
    },
}

/// A GPU rendering context owned by one window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GraphicsContext {
    sharing: ContextSharing,
    format: SurfaceFormat,
}

impl GraphicsContext {
    /// The sharing strategy this context was built with.
    #[must_use]
    pub fn sharing(&self) -> ContextSharing {
        self.sharing
    }

    /// The requested format.
    #[must_use]
    pub fn format(&self) -> SurfaceFormat {
        self.format
    }

    /// The EGL display this context renders on, if known.
    #[must_use]
    pub fn display(&self) -> Option<EglDisplay> {
        match self.sharing {
            ContextSharing::Native => None,
            ContextSharing::SceneSurface { display, .. } => Some(display),
        }
    }
}

/// Creates a GPU context, trying each sharing tier in order.
///
/// Returns `None` when the scene offers no way to share; the caller falls
/// back to software rendering.
pub fn create_context(
    scene: &dyn ScenePlatform,
    request: &ContextRequest,
) -> Option<GraphicsContext> {
    let sharing = if scene.supports_native_context() {
        ContextSharing::Native
    } else if let (Some(display), Some(surface)) = (scene.egl_display(), scene.egl_surface()) {
        ContextSharing::SceneSurface {
            display,
            surface,
            config: scene.egl_config(),
        }
    } else {
        warn!("scene offers no GPU sharing, no context created");
        return None;
    };
    debug!(?sharing, "created shared GPU context");
    Some(GraphicsContext {
        sharing,
        format: request.format,
    })
}

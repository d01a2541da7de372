// Copyright 2026 the Moorage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared-memory backing stores for software-rendered windows.
//!
//! A [`BackingStore`] keeps a CPU-side ARGB8888 paint buffer and one
//! shared-memory buffer. The shared-memory buffer is replaced, never
//! resized in place, and only when a flush asks for a different size.

use kurbo::Size;
use tracing::{debug, info};

use crate::backend::CompositorClient;
use crate::cache::ProtocolCache;
use crate::error::PlatformError;
use crate::window::{PlatformWindow, WindowId};

/// Bytes per ARGB8888 pixel.
pub const BYTES_PER_PIXEL: u32 = 4;

/// Largest shared-memory pool the wire protocol can describe.
const MAX_POOL_BYTES: u64 = i32::MAX as u64;

/// Buffer dimensions in device pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PixelSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl PixelSize {
    /// Creates a size.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Converts a logical size to device pixels, rounding up.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "values are clamped to the u32 range before the cast"
    )]
    pub fn from_logical(size: Size, scale: f64) -> Self {
        let device = (size * scale).ceil();
        let clamp = |v: f64| {
            if v.is_finite() {
                v.clamp(0.0, f64::from(u32::MAX)) as u32
            } else {
                0
            }
        };
        Self::new(clamp(device.width), clamp(device.height))
    }

    /// Returns `true` if either dimension is zero.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Bytes per row.
    #[must_use]
    pub const fn stride(self) -> Option<u32> {
        self.width.checked_mul(BYTES_PER_PIXEL)
    }

    /// Total bytes, validated against the shared-memory pool limit.
    pub fn byte_len(self) -> Result<usize, PlatformError> {
        if self.is_empty() {
            return Err(PlatformError::EmptyBuffer {
                width: self.width,
                height: self.height,
            });
        }
        let too_large = || PlatformError::BufferTooLarge {
            width: self.width,
            height: self.height,
        };
        let stride = self.stride().ok_or_else(too_large)?;
        let len = u64::from(stride) * u64::from(self.height);
        if len > MAX_POOL_BYTES {
            return Err(too_large());
        }
        usize::try_from(len).map_err(|_| too_large())
    }
}

/// A shared-memory buffer and the size it was allocated for.
#[derive(Debug)]
pub struct BackingBuffer<T> {
    buffer: T,
    size: PixelSize,
}

impl<T> BackingBuffer<T> {
    /// The presentable buffer.
    #[must_use]
    pub fn buffer(&self) -> &T {
        &self.buffer
    }

    /// Allocated size.
    #[must_use]
    pub fn size(&self) -> PixelSize {
        self.size
    }
}

/// Software rendering target for one window.
#[derive(Debug)]
pub struct BackingStore<B: CompositorClient> {
    window: WindowId,
    shm: B::ShmFactory,
    pixels: Vec<u8>,
    pixels_size: PixelSize,
    current: Option<BackingBuffer<B::Buffer>>,
    allocations: u64,
}

impl<B: CompositorClient> BackingStore<B> {
    /// Creates a store for `window` that allocates from `shm`.
    #[must_use]
    pub fn new(window: WindowId, shm: B::ShmFactory) -> Self {
        Self {
            window,
            shm,
            pixels: Vec::new(),
            pixels_size: PixelSize::default(),
            current: None,
            allocations: 0,
        }
    }

    /// The owning window.
    #[must_use]
    pub fn window(&self) -> WindowId {
        self.window
    }

    /// Returns the CPU paint buffer for a frame of `size`.
    ///
    /// Contents are kept while the size is unchanged and cleared otherwise.
    pub fn paint_buffer(&mut self, size: PixelSize) -> Result<&mut [u8], PlatformError> {
        let len = size.byte_len()?;
        self.resize_pixels(size, len);
        Ok(&mut self.pixels)
    }

    /// Uploads the paint buffer and returns the buffer to present.
    ///
    /// Allocates a new shared-memory buffer only if `size` differs from the
    /// current allocation; otherwise the existing buffer is reused.
    pub fn flush(
        &mut self,
        client: &B,
        size: PixelSize,
    ) -> Result<&BackingBuffer<B::Buffer>, PlatformError> {
        let len = size.byte_len()?;
        self.resize_pixels(size, len);
        if self.current_size() != Some(size) {
            let buffer = client.allocate_buffer(&self.shm, size)?;
            self.allocations += 1;
            debug!(
                window = ?self.window,
                width = size.width,
                height = size.height,
                allocations = self.allocations,
                "allocated backing buffer"
            );
            self.current = Some(BackingBuffer { buffer, size });
        }
        let Some(current) = &self.current else {
            unreachable!("a buffer of the requested size was just ensured");
        };
        client.upload(&current.buffer, &self.pixels)?;
        Ok(current)
    }

    /// Size of the current shared-memory buffer, if any.
    #[must_use]
    pub fn current_size(&self) -> Option<PixelSize> {
        self.current.as_ref().map(BackingBuffer::size)
    }

    /// Number of shared-memory buffers allocated so far.
    #[must_use]
    pub fn allocation_count(&self) -> u64 {
        self.allocations
    }

    fn resize_pixels(&mut self, size: PixelSize, len: usize) {
        if self.pixels_size != size {
            self.pixels.clear();
            self.pixels.resize(len, 0);
            self.pixels_size = size;
        }
    }
}

/// Creates a backing store for `window`.
///
/// Returns `None` when the compositor has no shared-memory pools; the
/// window must then render through a GPU context.
pub fn create_backing_store<B: CompositorClient>(
    protocols: &ProtocolCache<B>,
    window: &PlatformWindow<B>,
) -> Option<BackingStore<B>> {
    let Some(shm) = protocols.shm() else {
        info!(window = ?window.id(), "no shared-memory pools, software rendering disabled");
        return None;
    };
    Some(BackingStore::new(window.id(), shm.clone()))
}

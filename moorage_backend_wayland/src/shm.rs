// Copyright 2026 the Moorage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared-memory buffers backed by anonymous memory files.
//!
//! Each [`ShmBuffer`] owns one pool sized exactly for one ARGB8888 buffer.
//! Pixels are copied in with positioned writes, so the client never maps
//! the pool.
//!
//! A presented buffer belongs to the compositor until `wl_buffer.release`.
//! Writes in between fail with [`PlatformError::BufferBusy`] instead of
//! changing pixels the compositor may be sampling.

use std::io;
use std::os::fd::{AsFd, OwnedFd};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use moorage_core::PlatformError;
use moorage_core::backing_store::PixelSize;
use rustix::fs::{MemfdFlags, ftruncate, memfd_create};
use tracing::trace;
use wayland_client::QueueHandle;
use wayland_client::protocol::wl_buffer::WlBuffer;
use wayland_client::protocol::wl_shm::{self, WlShm};
use wayland_client::protocol::wl_shm_pool::WlShmPool;

use crate::event_loop::WaylandState;

/// Set while the compositor may read a buffer, cleared by `wl_buffer.release`.
///
/// Shared between the [`ShmBuffer`] and the buffer's event handler.
#[derive(Clone, Debug, Default)]
pub(crate) struct HoldFlag(Arc<AtomicBool>);

impl HoldFlag {
    pub(crate) fn attach(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub(crate) fn release(&self) {
        self.0.store(false, Ordering::Release);
    }

    pub(crate) fn is_held(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    fn check_writable(&self) -> Result<(), PlatformError> {
        if self.is_held() {
            return Err(PlatformError::BufferBusy);
        }
        Ok(())
    }
}

/// A `wl_buffer` and the pool it lives in.
///
/// Dropping the buffer destroys both protocol objects.
#[derive(Debug)]
pub struct ShmBuffer {
    file: OwnedFd,
    pool: WlShmPool,
    buffer: WlBuffer,
    size: PixelSize,
    len: usize,
    hold: HoldFlag,
}

impl ShmBuffer {
    pub(crate) fn allocate(
        shm: &WlShm,
        size: PixelSize,
        queue_handle: &QueueHandle<WaylandState>,
    ) -> Result<Self, PlatformError> {
        let len = size.byte_len()?;
        let (width, height, stride, pool_len) = wire_dimensions(size, len)?;

        let file = memfd_create(c"moorage-shm", MemfdFlags::CLOEXEC)
            .map_err(|err| PlatformError::ShmPool(err.into()))?;
        ftruncate(&file, len as u64).map_err(|err| PlatformError::ShmPool(err.into()))?;

        let pool = shm.create_pool(file.as_fd(), pool_len, queue_handle, ());
        let hold = HoldFlag::default();
        let buffer = pool.create_buffer(
            0,
            width,
            height,
            stride,
            wl_shm::Format::Argb8888,
            queue_handle,
            hold.clone(),
        );
        trace!(width, height, bytes = len, "created shm pool");
        Ok(Self {
            file,
            pool,
            buffer,
            size,
            len,
            hold,
        })
    }

    /// Copies `pixels` into the pool.
    ///
    /// `pixels` must be exactly the buffer's byte length, and the
    /// compositor must have released the buffer.
    pub(crate) fn write(&self, pixels: &[u8]) -> Result<(), PlatformError> {
        self.hold.check_writable()?;
        if pixels.len() != self.len {
            return Err(PlatformError::Upload(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "expected {} bytes for {}x{}, got {}",
                    self.len,
                    self.size.width,
                    self.size.height,
                    pixels.len()
                ),
            )));
        }
        let mut written = 0;
        while written < pixels.len() {
            match rustix::io::pwrite(&self.file, &pixels[written..], written as u64) {
                Ok(0) => {
                    return Err(PlatformError::Upload(io::ErrorKind::WriteZero.into()));
                }
                Ok(n) => written += n,
                Err(rustix::io::Errno::INTR) => {}
                Err(err) => return Err(PlatformError::Upload(err.into())),
            }
        }
        Ok(())
    }

    /// The protocol buffer to attach.
    #[must_use]
    pub fn wl_buffer(&self) -> &WlBuffer {
        &self.buffer
    }

    /// Returns `true` between presenting the buffer and its release.
    #[must_use]
    pub fn is_held(&self) -> bool {
        self.hold.is_held()
    }

    pub(crate) fn mark_attached(&self) {
        self.hold.attach();
    }

    /// Allocated size.
    #[must_use]
    pub fn size(&self) -> PixelSize {
        self.size
    }
}

impl Drop for ShmBuffer {
    fn drop(&mut self) {
        self.buffer.destroy();
        self.pool.destroy();
    }
}

/// Converts a validated size to the protocol's signed integers.
fn wire_dimensions(size: PixelSize, len: usize) -> Result<(i32, i32, i32, i32), PlatformError> {
    let too_large = || PlatformError::BufferTooLarge {
        width: size.width,
        height: size.height,
    };
    let width = i32::try_from(size.width).map_err(|_| too_large())?;
    let height = i32::try_from(size.height).map_err(|_| too_large())?;
    let stride = size
        .stride()
        .and_then(|s| i32::try_from(s).ok())
        .ok_or_else(too_large)?;
    let pool_len = i32::try_from(len).map_err(|_| too_large())?;
    Ok((width, height, stride, pool_len))
}

#[cfg(test)]
mod tests {
    use super::{HoldFlag, wire_dimensions};
    use moorage_core::PlatformError;
    use moorage_core::backing_store::PixelSize;

    #[test]
    fn dimensions_fit_wire_integers() {
        let size = PixelSize::new(640, 480);
        let len = size.byte_len().unwrap();
        assert_eq!(
            wire_dimensions(size, len).unwrap(),
            (640, 480, 2560, 640 * 480 * 4)
        );
    }

    #[test]
    fn oversized_dimensions_are_rejected() {
        let size = PixelSize::new(u32::MAX, 1);
        assert!(matches!(
            wire_dimensions(size, 4),
            Err(PlatformError::BufferTooLarge { .. })
        ));
    }

    #[test]
    fn held_buffer_rejects_writes_until_released() {
        let hold = HoldFlag::default();
        assert!(hold.check_writable().is_ok());

        let handler_side = hold.clone();
        hold.attach();
        assert!(matches!(
            hold.check_writable(),
            Err(PlatformError::BufferBusy)
        ));

        handler_side.release();
        assert!(!hold.is_held());
        assert!(hold.check_writable().is_ok());
    }
}

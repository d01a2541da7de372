// Copyright 2026 the Moorage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.
//!
//! Missing compositor capabilities are not errors: they surface as `None`
//! or a degraded window. These types cover the remaining failures, none of
//! which is fatal to the process.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures while allocating or filling shared-memory buffers.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// A buffer with zero width or height was requested.
    #[error("cannot allocate an empty {width}x{height} buffer")]
    EmptyBuffer {
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
    },
    /// The requested buffer does not fit in a shared-memory pool.
    #[error("{width}x{height} buffer exceeds the shared-memory pool limit")]
    BufferTooLarge {
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
    },
    /// The backing file for a shared-memory pool could not be created.
    #[error("failed to create shared-memory pool")]
    ShmPool(#[source] io::Error),
    /// The compositor has not released the buffer since it was last
    /// presented; dispatch events and flush again.
    #[error("buffer is still held by the compositor")]
    BufferBusy,
    /// Pixels could not be written to the shared-memory pool.
    #[error("failed to upload pixels to shared-memory pool")]
    Upload(#[source] io::Error),
}

/// Failures while loading [`PlatformConfig`](crate::config::PlatformConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {}", path.display())]
    Read {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The configuration file is not valid TOML for this schema.
    #[error("failed to parse config")]
    Parse(#[from] toml::de::Error),
}

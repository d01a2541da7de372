// Copyright 2026 the Moorage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend-agnostic platform integration for docking a toolkit onto a
//! compositor client connection.
//!
//! `moorage_core` maps a toolkit's abstract platform contract (screens,
//! windows, offscreen surfaces, backing stores, input contexts, GPU
//! contexts) onto a compositor client protocol described by the
//! [`CompositorClient`](backend::CompositorClient) trait, and onto the
//! compositor's own GPU scene described by
//! [`ScenePlatform`](gpu::ScenePlatform).
//!
//! # Architecture
//!
//! ```text
//!   Toolkit
//!     │  create_window / create_backing_store / create_graphics_context
//!     ▼
//!   Integration ──► window::create_window_surface ─┐
//!     │         ──► BackingStore                   ├─► ProtocolCache ──► CompositorClient
//!     │         ──► gpu::create_context ──► ScenePlatform
//!     │
//!     └◄── ScreenRegistry ◄── ScreenSource (geometry change)
//! ```
//!
//! **[`cache`]**: Monotonic, look-up-once cache of optional compositor
//! interfaces (`{Unresolved, Bound, Unavailable}`).
//!
//! **[`screen`]**: Screen list with a dummy fallback, rebuilt and swapped
//! wholesale on every geometry change.
//!
//! **[`window`]**: Window and offscreen surface creation, with a degraded
//! path when the compositor or shell is missing.
//!
//! **[`backing_store`]**: Shared-memory pixel buffers for software-rendered
//! windows, reallocated only when the requested size changes.
//!
//! **[`gpu`]**: Three-tier GPU context sharing fallback.
//!
//! **[`integration`]**: The [`Integration`] facade the toolkit calls into.
//!
//! **[`capability`]**, **[`config`]**, **[`theme`]**, **[`input`]**,
//! **[`native`]**: Capability table, configuration, theme naming,
//! input-method wiring, and native handle access.
//!
//! All types assume a single event-processing thread.

pub mod backend;
pub mod backing_store;
pub mod cache;
pub mod capability;
pub mod config;
pub mod error;
pub mod gpu;
pub mod input;
pub mod integration;
pub mod native;
pub mod screen;
pub mod theme;
pub mod window;

#[cfg(test)]
mod test_support;

pub use error::{ConfigError, PlatformError};
pub use integration::Integration;

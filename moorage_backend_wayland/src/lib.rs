// Copyright 2026 the Moorage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Wayland backend for moorage.
//!
//! - Registry lookups answered from the globals received at connect time
//! - `wl_compositor` surfaces wrapped in toplevel `wl_shell` surfaces
//! - `wl_shm` buffers in anonymous memory files
//! - `wl_output` tracking exposed as a screen source
//!
//! ```rust,ignore
//! let client = WaylandClient::connect()?;
//! let mut integration = Integration::new(client, scene, config);
//! integration.initialize(&mut toolkit, None);
//!
//! let outputs = {
//!     let mut dispatcher = integration.event_dispatcher().borrow_mut();
//!     dispatcher.blocking_dispatch()?;
//!     dispatcher.take_screen_changes().unwrap_or_default()
//! };
//! integration.screens_created(&outputs, &mut toolkit);
//!
//! loop {
//!     let changes = {
//!         let mut dispatcher = integration.event_dispatcher().borrow_mut();
//!         dispatcher.blocking_dispatch()?;
//!         dispatcher.take_screen_changes()
//!     };
//!     if let Some(outputs) = changes {
//!         integration.screens_changed(&outputs, &mut toolkit);
//!     }
//! }
//! ```

mod client;
mod configure;
mod dispatch;
mod event_loop;
mod output;
mod queue;
mod shm;

pub use client::{
    COMPOSITOR_VERSION, ConnectError, SHELL_VERSION, SHM_VERSION, WaylandClient, WindowSurface,
};
pub use configure::{ConfigureEvent, ConfigureQueue};
pub use event_loop::{EventDispatcher, WaylandState};
pub use output::{OutputInfo, OutputList, OutputSnapshot};
pub use shm::ShmBuffer;

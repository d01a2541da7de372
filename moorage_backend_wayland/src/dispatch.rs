// Copyright 2026 the Moorage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Event handlers for every object the backend creates.

use kurbo::Point;
use tracing::{debug, trace};
use wayland_client::globals::GlobalListContents;
use wayland_client::protocol::wl_buffer::{self, WlBuffer};
use wayland_client::protocol::wl_compositor::WlCompositor;
use wayland_client::protocol::wl_output::{self, WlOutput};
use wayland_client::protocol::wl_registry::{self, WlRegistry};
use wayland_client::protocol::wl_shell::WlShell;
use wayland_client::protocol::wl_shell_surface::{self, WlShellSurface};
use wayland_client::protocol::wl_shm::{self, WlShm};
use wayland_client::protocol::wl_shm_pool::WlShmPool;
use wayland_client::protocol::wl_surface::WlSurface;
use wayland_client::{Connection, Dispatch, Proxy, QueueHandle, WEnum, delegate_noop};

use crate::client::negotiated_version;
use crate::configure::ConfigureEvent;
use crate::event_loop::WaylandState;
use crate::shm::HoldFlag;

/// Interface name of outputs in the registry.
pub(crate) const OUTPUT_INTERFACE: &str = "wl_output";

/// Highest `wl_output` version the handlers understand.
pub(crate) const OUTPUT_VERSION: u32 = 4;

/// Binds the output advertised as `name` and starts tracking it.
pub(crate) fn bind_output(
    state: &mut WaylandState,
    registry: &WlRegistry,
    name: u32,
    version: u32,
    queue_handle: &QueueHandle<WaylandState>,
) {
    let version = negotiated_version(version, OUTPUT_VERSION);
    let proxy = registry.bind::<WlOutput, _, _>(name, version, queue_handle, name);
    debug!(output = name, version, "bound output");
    state.add_output(name, proxy);
}

delegate_noop!(WaylandState: WlCompositor);
delegate_noop!(WaylandState: WlShell);
delegate_noop!(WaylandState: WlShmPool);
delegate_noop!(WaylandState: ignore WlSurface);

impl Dispatch<WlRegistry, GlobalListContents> for WaylandState {
    fn event(
        state: &mut Self,
        registry: &WlRegistry,
        event: wl_registry::Event,
        _: &GlobalListContents,
        _: &Connection,
        queue_handle: &QueueHandle<Self>,
    ) {
        match event {
            wl_registry::Event::Global {
                name,
                interface,
                version,
            } if interface == OUTPUT_INTERFACE => {
                bind_output(state, registry, name, version, queue_handle);
            }
            wl_registry::Event::GlobalRemove { name } => state.remove_output(name),
            _ => {}
        }
    }
}

impl Dispatch<WlOutput, u32> for WaylandState {
    fn event(
        state: &mut Self,
        _: &WlOutput,
        event: wl_output::Event,
        registry_name: &u32,
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
        let output = *registry_name;
        if let wl_output::Event::Done = event {
            state.commit_output(output);
            return;
        }
        let Some(pending) = state.outputs.pending_mut(output) else {
            return;
        };
        match event {
            wl_output::Event::Geometry { x, y, .. } => {
                pending.position = Point::new(f64::from(x), f64::from(y));
            }
            wl_output::Event::Mode {
                flags: WEnum::Value(flags),
                width,
                height,
                refresh,
            } if flags.contains(wl_output::Mode::Current) => {
                pending.mode = (width, height);
                pending.refresh_mhz = u32::try_from(refresh).ok();
            }
            wl_output::Event::Scale { factor } => pending.scale = factor,
            wl_output::Event::Name { name } => pending.name = Some(name),
            _ => {}
        }
    }
}

impl Dispatch<WlBuffer, HoldFlag> for WaylandState {
    fn event(
        _: &mut Self,
        buffer: &WlBuffer,
        event: wl_buffer::Event,
        hold: &HoldFlag,
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
        if let wl_buffer::Event::Release = event {
            trace!(buffer = %buffer.id(), "buffer released");
            hold.release();
        }
    }
}

impl Dispatch<WlShm, ()> for WaylandState {
    fn event(
        state: &mut Self,
        _: &WlShm,
        event: wl_shm::Event,
        _: &(),
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
        if let wl_shm::Event::Format {
            format: WEnum::Value(format),
        } = event
        {
            trace!(?format, "shm format");
            state.shm_formats.push(format);
        }
    }
}

impl Dispatch<WlShellSurface, ()> for WaylandState {
    fn event(
        state: &mut Self,
        shell_surface: &WlShellSurface,
        event: wl_shell_surface::Event,
        _: &(),
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
        match event {
            wl_shell_surface::Event::Ping { serial } => shell_surface.pong(serial),
            wl_shell_surface::Event::Configure {
                edges,
                width,
                height,
            } => {
                let edges = match edges {
                    WEnum::Value(edges) => edges.bits(),
                    WEnum::Unknown(raw) => raw,
                };
                state.configures.push(ConfigureEvent {
                    shell_surface: shell_surface.id(),
                    edges,
                    width,
                    height,
                });
            }
            _ => {}
        }
    }
}

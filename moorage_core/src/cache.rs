// Copyright 2026 the Moorage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Probe-once cache of optional compositor interfaces.
//!
//! The set of globals a compositor advertises does not change during a
//! session, so each interface kind is looked up in the registry exactly
//! once. A bound proxy and an "unavailable" answer are both final.

use std::cell::OnceCell;

use tracing::{debug, info};

use crate::backend::{CompositorClient, Global, InterfaceKind};

/// Resolution state of one optional interface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution<T> {
    /// Not looked up yet.
    Unresolved,
    /// Probed and bound.
    Bound(T),
    /// Looked up and not advertised. Never looked up again.
    Unavailable,
}

impl<T> Resolution<T> {
    /// Returns the bound value, if any.
    #[must_use]
    pub fn bound(self) -> Option<T> {
        match self {
            Self::Bound(value) => Some(value),
            Self::Unresolved | Self::Unavailable => None,
        }
    }

    /// Returns `true` once the slot has been resolved.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        !matches!(self, Self::Unresolved)
    }
}

/// A monotonic lazily-resolved slot.
#[derive(Debug)]
pub struct ProtocolSlot<T> {
    cell: OnceCell<Option<T>>,
}

impl<T> Default for ProtocolSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ProtocolSlot<T> {
    /// Creates an unresolved slot.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    /// Runs `query` on first access and caches its answer.
    ///
    /// `query` never runs again once the slot is resolved, whatever it
    /// returned.
    pub fn resolve(&self, query: impl FnOnce() -> Option<T>) -> Option<&T> {
        self.cell.get_or_init(query).as_ref()
    }

    /// Returns the current state without probing.
    #[must_use]
    pub fn resolution(&self) -> Resolution<&T> {
        match self.cell.get() {
            None => Resolution::Unresolved,
            Some(Some(value)) => Resolution::Bound(value),
            Some(None) => Resolution::Unavailable,
        }
    }
}

/// Owns the compositor client and its lazily-bound interface factories.
#[derive(Debug)]
pub struct ProtocolCache<B: CompositorClient> {
    client: B,
    compositor: ProtocolSlot<B::Compositor>,
    shell: ProtocolSlot<B::Shell>,
    shm: ProtocolSlot<B::ShmFactory>,
}

impl<B: CompositorClient> ProtocolCache<B> {
    /// Wraps `client` with every interface unresolved.
    #[must_use]
    pub fn new(client: B) -> Self {
        Self {
            client,
            compositor: ProtocolSlot::new(),
            shell: ProtocolSlot::new(),
            shm: ProtocolSlot::new(),
        }
    }

    /// Returns the underlying client.
    #[must_use]
    pub fn client(&self) -> &B {
        &self.client
    }

    /// Resolves the surface-creation factory.
    pub fn compositor(&self) -> Option<&B::Compositor> {
        self.compositor
            .resolve(|| look_up(&self.client, InterfaceKind::Compositor, B::bind_compositor))
    }

    /// Resolves the legacy shell factory.
    pub fn shell(&self) -> Option<&B::Shell> {
        self.shell
            .resolve(|| look_up(&self.client, InterfaceKind::Shell, B::bind_shell))
    }

    /// Resolves the shared-memory pool factory.
    pub fn shm(&self) -> Option<&B::ShmFactory> {
        self.shm
            .resolve(|| look_up(&self.client, InterfaceKind::Shm, B::bind_shm))
    }

    /// Resolves `kind` and reports whether it is bound.
    pub fn resolve(&self, kind: InterfaceKind) -> bool {
        match kind {
            InterfaceKind::Compositor => self.compositor().is_some(),
            InterfaceKind::Shell => self.shell().is_some(),
            InterfaceKind::Shm => self.shm().is_some(),
        }
    }

    /// Reports the state of `kind` without probing.
    #[must_use]
    pub fn state(&self, kind: InterfaceKind) -> Resolution<()> {
        match kind {
            InterfaceKind::Compositor => erase(self.compositor.resolution()),
            InterfaceKind::Shell => erase(self.shell.resolution()),
            InterfaceKind::Shm => erase(self.shm.resolution()),
        }
    }
}

fn erase<T>(resolution: Resolution<&T>) -> Resolution<()> {
    match resolution {
        Resolution::Unresolved => Resolution::Unresolved,
        Resolution::Bound(_) => Resolution::Bound(()),
        Resolution::Unavailable => Resolution::Unavailable,
    }
}

fn look_up<B: CompositorClient, T>(
    client: &B,
    kind: InterfaceKind,
    bind: impl FnOnce(&B, Global) -> T,
) -> Option<T> {
    let global = client.lookup(kind);
    if !global.is_advertised() {
        info!(interface = %kind, "interface not advertised, caching as unavailable");
        return None;
    }
    debug!(
        interface = %kind,
        name = global.name,
        version = global.version,
        "binding interface"
    );
    Some(bind(client, global))
}

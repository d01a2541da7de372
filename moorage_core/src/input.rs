// Copyright 2026 the Moorage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Virtual input-method wiring.
//!
//! When a virtual input method is installed it replaces whatever input
//! method the environment selected, and keeps input focus on the virtual
//! keyboard while one exists.

use core::fmt;

use tracing::{debug, info};

use crate::config::PlatformConfig;
use crate::window::WindowId;

/// Identifies a toolkit object that can receive input focus.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FocusObject(pub u64);

impl fmt::Debug for FocusObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FocusObject({})", self.0)
    }
}

/// Why a window became active.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FocusReason {
    /// The window was activated programmatically.
    ActiveWindow,
    /// Pointer interaction.
    Mouse,
    /// Keyboard focus chain.
    Tab,
    /// Anything else.
    Other,
}

/// A platform input context, such as a virtual keyboard plugin.
pub trait InputContext: fmt::Debug {
    /// Directs input-method events at `object`.
    fn set_focus_object(&mut self, object: FocusObject);

    /// The current focus object, if any.
    fn focus_object(&self) -> Option<FocusObject>;
}

/// Creates input contexts by key.
pub trait InputContextFactory {
    /// Creates the input context registered as `key`.
    fn create(&self, key: &str) -> Option<Box<dyn InputContext>>;
}

/// The compositor's virtual keyboard, when one exists.
pub trait VirtualKeyboard {
    /// The object input-method focus should rest on.
    fn focus_object(&self) -> FocusObject;

    /// The keyboard's input panel window, if shown.
    fn input_panel(&self) -> Option<WindowId>;
}

/// Toolkit-side receiver of window activation requests.
pub trait WindowActivation {
    /// Makes `window` the active window.
    fn activate_window(&mut self, window: WindowId, reason: FocusReason);
}

/// Owns the installed input context and reacts to focus notifications.
#[derive(Debug, Default)]
pub struct InputMethodWiring {
    context: Option<Box<dyn InputContext>>,
}

impl InputMethodWiring {
    /// Installs the configured virtual input method.
    ///
    /// The environment-selected module is cleared whenever a virtual input
    /// method is configured, even if `factory` cannot create it, so the
    /// toolkit never loads a second input method.
    pub fn install(factory: &dyn InputContextFactory, config: &mut PlatformConfig) -> Self {
        let Some(key) = config.virtual_input_method.clone() else {
            debug!("no virtual input method configured");
            return Self::default();
        };
        let context = factory.create(&key);
        config.clear_input_method_module();
        match &context {
            Some(_) => info!(key = %key, "installed virtual input method"),
            None => info!(key = %key, "virtual input method unavailable"),
        }
        Self { context }
    }

    /// The installed context, if any.
    #[must_use]
    pub fn context(&self) -> Option<&dyn InputContext> {
        self.context.as_deref()
    }

    /// Handles a toolkit focus change.
    ///
    /// Focus moving anywhere other than the virtual keyboard is redirected
    /// back to it.
    pub fn focus_object_changed(
        &mut self,
        focus: Option<FocusObject>,
        keyboard: Option<&dyn VirtualKeyboard>,
    ) {
        let (Some(context), Some(keyboard)) = (self.context.as_deref_mut(), keyboard) else {
            return;
        };
        let target = keyboard.focus_object();
        if focus != Some(target) {
            context.set_focus_object(target);
        }
    }

    /// Handles workspace creation: focuses the virtual keyboard.
    pub fn workspace_created(&mut self, keyboard: Option<&dyn VirtualKeyboard>) {
        if let (Some(context), Some(keyboard)) = (self.context.as_deref_mut(), keyboard) {
            context.set_focus_object(keyboard.focus_object());
        }
    }

    /// Handles input-method visibility changes.
    ///
    /// Becoming visible activates the virtual keyboard's input panel.
    pub fn visibility_changed(
        &self,
        visible: bool,
        keyboard: Option<&dyn VirtualKeyboard>,
        activation: &mut dyn WindowActivation,
    ) {
        if !visible || self.context.is_none() {
            return;
        }
        if let Some(panel) = keyboard.and_then(|keyboard| keyboard.input_panel()) {
            debug!(window = ?panel, "activating input panel");
            activation.activate_window(panel, FocusReason::ActiveWindow);
        }
    }
}

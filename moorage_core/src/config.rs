// Copyright 2026 the Moorage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Platform configuration.
//!
//! Values come from, in increasing precedence: built-in defaults, an
//! optional TOML file named by [`CONFIG_PATH_VAR`], and the environment.
//! The integration reads the process environment once, at load time; the
//! toolkit reads input-method selection back from the loaded config.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::ConfigError;

/// Set (to anything) when running inside a full desktop session.
pub const FULL_SESSION_VAR: &str = "KDE_FULL_SESSION";

/// Names the input-method module the toolkit should load.
pub const INPUT_METHOD_VAR: &str = "QT_IM_MODULE";

/// Path of an optional TOML configuration file.
pub const CONFIG_PATH_VAR: &str = "MOORAGE_CONFIG";

/// Input-method key of the built-in virtual keyboard.
pub const DEFAULT_VIRTUAL_INPUT_METHOD: &str = "qtvirtualkeyboard";

/// Settings for the platform integration.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlatformConfig {
    /// Running inside a full desktop session. Selects the theme.
    pub full_session: bool,
    /// Input-method module selected by the environment. Cleared once the
    /// virtual input method is installed.
    pub input_method_module: Option<String>,
    /// Key of the virtual input method to install, or `None` to skip it.
    pub virtual_input_method: Option<String>,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            full_session: false,
            input_method_module: None,
            virtual_input_method: Some(DEFAULT_VIRTUAL_INPUT_METHOD.to_owned()),
        }
    }
}

impl PlatformConfig {
    /// Parses a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Reads and parses a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Loads the config from the process environment.
    ///
    /// Reads the file named by [`CONFIG_PATH_VAR`] if set, then applies
    /// environment overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`Self::from_env`], with a custom variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = match lookup(CONFIG_PATH_VAR) {
            Some(path) => {
                debug!(path = %path, "loading platform config file");
                Self::from_file(Path::new(&path))?
            }
            None => Self::default(),
        };
        config.apply_overrides(lookup);
        Ok(config)
    }

    /// Applies environment overrides on top of the current values.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if lookup(FULL_SESSION_VAR).is_some() {
            self.full_session = true;
        }
        if let Some(module) = lookup(INPUT_METHOD_VAR).filter(|m| !m.is_empty()) {
            self.input_method_module = Some(module);
        }
    }

    /// Forgets the environment-selected input method.
    pub fn clear_input_method_module(&mut self) {
        if let Some(module) = self.input_method_module.take() {
            debug!(module = %module, "cleared environment input method");
        }
    }
}

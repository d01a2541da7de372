// Copyright 2026 the Moorage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Theme and font delegation to a desktop-integration backend.

use core::fmt;

use crate::config::PlatformConfig;

/// Theme name used inside a full desktop session.
pub const KDE_THEME_NAME: &str = "kde";

/// Theme name used everywhere else.
pub const GENERIC_THEME_NAME: &str = "generic";

/// Theme families the generic backend knows how to create.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ThemeKind {
    /// Full desktop session theme.
    Kde,
    /// GTK-based desktop theme.
    Gnome,
    /// Toolkit defaults.
    Generic,
}

/// A platform theme.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Theme {
    kind: ThemeKind,
    name: String,
}

impl Theme {
    /// Theme family.
    #[must_use]
    pub fn kind(&self) -> ThemeKind {
        self.kind
    }

    /// Name the theme was requested by.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Generic CSS-style font families.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GenericFamily {
    /// Proportional sans-serif.
    SansSerif,
    /// Proportional serif.
    Serif,
    /// Fixed-width.
    Monospace,
}

/// Resolves generic font families to concrete family names.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FontDatabase {
    sans_serif: String,
    serif: String,
    monospace: String,
}

impl Default for FontDatabase {
    fn default() -> Self {
        Self {
            sans_serif: "sans-serif".to_owned(),
            serif: "serif".to_owned(),
            monospace: "monospace".to_owned(),
        }
    }
}

impl FontDatabase {
    /// Returns the concrete family for `family`.
    #[must_use]
    pub fn resolve(&self, family: GenericFamily) -> &str {
        match family {
            GenericFamily::SansSerif => &self.sans_serif,
            GenericFamily::Serif => &self.serif,
            GenericFamily::Monospace => &self.monospace,
        }
    }
}

/// Desktop services the integration delegates fonts and themes to.
pub trait DesktopBackend: fmt::Debug {
    /// The font database.
    fn font_database(&self) -> &FontDatabase;

    /// Creates the theme called `name`, if the backend knows it.
    fn create_theme(&self, name: &str) -> Option<Theme>;
}

/// Desktop backend for generic Unix sessions.
#[derive(Clone, Debug, Default)]
pub struct GenericUnixDesktop {
    fonts: FontDatabase,
}

impl DesktopBackend for GenericUnixDesktop {
    fn font_database(&self) -> &FontDatabase {
        &self.fonts
    }

    fn create_theme(&self, name: &str) -> Option<Theme> {
        let kind = match name.to_ascii_lowercase().as_str() {
            KDE_THEME_NAME => ThemeKind::Kde,
            "gnome" | "gtk3" => ThemeKind::Gnome,
            GENERIC_THEME_NAME => ThemeKind::Generic,
            _ => return None,
        };
        Some(Theme {
            kind,
            name: name.to_owned(),
        })
    }
}

/// Theme names the toolkit should try, in order.
#[must_use]
pub fn theme_names(config: &PlatformConfig) -> Vec<String> {
    let name = if config.full_session {
        KDE_THEME_NAME
    } else {
        GENERIC_THEME_NAME
    };
    vec![name.to_owned()]
}

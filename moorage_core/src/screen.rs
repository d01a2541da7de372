// Copyright 2026 the Moorage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Logical screens and the registry that tracks them.
//!
//! [`ScreenRegistry`] never holds an empty set: a dummy screen stands in
//! until the session reports real ones, and again whenever it reports none.
//! Every geometry change rebuilds the whole set and swaps it in, so the
//! toolkit must re-resolve screens after each change notification.

use core::fmt;

use kurbo::Rect;
use tracing::debug;

/// Refresh rate reported for screens whose source has none, in mHz.
pub const DEFAULT_REFRESH_RATE_MHZ: u32 = 60_000;

/// Identifies a screen by its index in the session, or [`ScreenId::DUMMY`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScreenId(pub i32);

impl ScreenId {
    /// Placeholder used when no real screen exists.
    pub const DUMMY: Self = Self(-1);

    /// Returns `true` for the placeholder id.
    #[must_use]
    pub const fn is_dummy(self) -> bool {
        self.0 == Self::DUMMY.0
    }

    /// Returns the session index, or `None` for the dummy.
    #[must_use]
    pub fn index(self) -> Option<usize> {
        usize::try_from(self.0).ok()
    }
}

impl fmt::Debug for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_dummy() {
            f.write_str("ScreenId(dummy)")
        } else {
            write!(f, "ScreenId({})", self.0)
        }
    }
}

/// A logical screen.
#[derive(Clone, Debug, PartialEq)]
pub struct Screen {
    id: ScreenId,
    geometry: Rect,
    refresh_rate_mhz: u32,
    scale: f64,
    name: Option<String>,
}

impl Screen {
    /// Creates the placeholder screen.
    #[must_use]
    pub fn dummy() -> Self {
        Self {
            id: ScreenId::DUMMY,
            geometry: Rect::ZERO,
            refresh_rate_mhz: DEFAULT_REFRESH_RATE_MHZ,
            scale: 1.0,
            name: None,
        }
    }

    /// Snapshots screen `index` from `source`.
    #[must_use]
    pub fn from_source(source: &dyn ScreenSource, index: usize) -> Self {
        Self {
            id: ScreenId(i32::try_from(index).unwrap_or(i32::MAX)),
            geometry: source.geometry(index),
            refresh_rate_mhz: source
                .refresh_rate_mhz(index)
                .unwrap_or(DEFAULT_REFRESH_RATE_MHZ),
            scale: source.scale(index),
            name: source.name(index),
        }
    }

    /// Screen identity.
    #[must_use]
    pub fn id(&self) -> ScreenId {
        self.id
    }

    /// Logical geometry in the compositor's global space.
    #[must_use]
    pub fn geometry(&self) -> Rect {
        self.geometry
    }

    /// Refresh rate in mHz.
    #[must_use]
    pub fn refresh_rate_mhz(&self) -> u32 {
        self.refresh_rate_mhz
    }

    /// Device pixels per logical pixel.
    #[must_use]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Output name, if the source reports one.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns `true` for the placeholder screen.
    #[must_use]
    pub fn is_dummy(&self) -> bool {
        self.id.is_dummy()
    }
}

/// The compositor session's view of its screens.
pub trait ScreenSource {
    /// Number of screens currently reported.
    fn count(&self) -> usize;

    /// Geometry of screen `index`.
    fn geometry(&self, index: usize) -> Rect;

    /// Refresh rate of screen `index` in mHz, if known.
    fn refresh_rate_mhz(&self, index: usize) -> Option<u32> {
        let _ = index;
        None
    }

    /// Scale factor of screen `index`.
    fn scale(&self, index: usize) -> f64 {
        let _ = index;
        1.0
    }

    /// Name of screen `index`, if known.
    fn name(&self, index: usize) -> Option<String> {
        let _ = index;
        None
    }
}

/// A fixed list of screen rectangles.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StaticScreens(pub Vec<Rect>);

impl ScreenSource for StaticScreens {
    fn count(&self) -> usize {
        self.0.len()
    }

    fn geometry(&self, index: usize) -> Rect {
        self.0.get(index).copied().unwrap_or(Rect::ZERO)
    }
}

/// Toolkit-side receiver of screen lifecycle notifications.
pub trait ScreenSink {
    /// A screen was added.
    fn screen_added(&mut self, screen: &Screen);

    /// A screen was removed. The screen is destroyed after this call.
    fn screen_removed(&mut self, screen: Screen);
}

/// Owns the list of active logical screens.
#[derive(Debug)]
pub struct ScreenRegistry {
    screens: Vec<Screen>,
}

impl ScreenRegistry {
    /// Creates a registry holding one dummy screen and announces it.
    pub fn with_dummy(sink: &mut dyn ScreenSink) -> Self {
        let dummy = Screen::dummy();
        sink.screen_added(&dummy);
        Self {
            screens: vec![dummy],
        }
    }

    /// Re-enumerates every screen in `source` and swaps in the new set.
    ///
    /// Additions are announced in index order before any removal; the
    /// previous set is then removed last-added first.
    pub fn rebuild(&mut self, source: &dyn ScreenSource, sink: &mut dyn ScreenSink) {
        let count = source.count();
        let mut screens = Vec::with_capacity(count.max(1));
        for index in 0..count {
            let screen = Screen::from_source(source, index);
            sink.screen_added(&screen);
            screens.push(screen);
        }
        if screens.is_empty() {
            let dummy = Screen::dummy();
            sink.screen_added(&dummy);
            screens.push(dummy);
        }
        debug!(
            previous = self.screens.len(),
            current = screens.len(),
            "rebuilt screen set"
        );
        while let Some(old) = self.screens.pop() {
            sink.screen_removed(old);
        }
        self.screens = screens;
    }

    /// Returns the tracked screens. Never empty.
    #[must_use]
    pub fn screens(&self) -> &[Screen] {
        &self.screens
    }

    /// Looks up a screen by id.
    #[must_use]
    pub fn get(&self, id: ScreenId) -> Option<&Screen> {
        self.screens.iter().find(|screen| screen.id() == id)
    }

    /// Returns the first screen.
    #[must_use]
    pub fn primary(&self) -> &Screen {
        // `screens` is never empty; construction and rebuild both ensure it.
        &self.screens[0]
    }

    /// Returns the screen whose geometry contains `point`, else the primary.
    #[must_use]
    pub fn screen_at(&self, point: kurbo::Point) -> &Screen {
        self.screens
            .iter()
            .find(|screen| screen.geometry().contains(point))
            .unwrap_or_else(|| self.primary())
    }
}

#[cfg(test)]
mod tests {
    use super::{Screen, ScreenId, ScreenRegistry, ScreenSink, StaticScreens};
    use kurbo::{Point, Rect};

    #[derive(Debug, Default)]
    struct Recorder {
        events: Vec<(bool, ScreenId)>,
    }

    impl ScreenSink for Recorder {
        fn screen_added(&mut self, screen: &Screen) {
            self.events.push((true, screen.id()));
        }

        fn screen_removed(&mut self, screen: Screen) {
            self.events.push((false, screen.id()));
        }
    }

    fn screens(count: usize) -> StaticScreens {
        StaticScreens(
            (0..count)
                .map(|i| Rect::new(i as f64 * 1920.0, 0.0, (i + 1) as f64 * 1920.0, 1080.0))
                .collect(),
        )
    }

    fn ids(registry: &ScreenRegistry) -> Vec<i32> {
        registry.screens().iter().map(|s| s.id().0).collect()
    }

    #[test]
    fn initialize_announces_one_dummy() {
        let mut sink = Recorder::default();
        let registry = ScreenRegistry::with_dummy(&mut sink);

        assert_eq!(ids(&registry), vec![-1]);
        assert_eq!(sink.events, vec![(true, ScreenId::DUMMY)]);
    }

    #[test]
    fn rebuild_adds_new_before_removing_old_in_reverse() {
        let mut sink = Recorder::default();
        let mut registry = ScreenRegistry::with_dummy(&mut sink);
        registry.rebuild(&screens(2), &mut sink);
        sink.events.clear();

        registry.rebuild(&screens(3), &mut sink);

        assert_eq!(
            sink.events,
            vec![
                (true, ScreenId(0)),
                (true, ScreenId(1)),
                (true, ScreenId(2)),
                (false, ScreenId(1)),
                (false, ScreenId(0)),
            ]
        );
        assert_eq!(ids(&registry), vec![0, 1, 2]);
    }

    #[test]
    fn screen_set_is_never_empty() {
        let mut sink = Recorder::default();
        let mut registry = ScreenRegistry::with_dummy(&mut sink);

        for count in [0, 2, 0, 0, 1, 4, 0, 3] {
            registry.rebuild(&screens(count), &mut sink);
            if count == 0 {
                assert_eq!(ids(&registry), vec![-1], "zero screens falls back to dummy");
            } else {
                let expected: Vec<i32> = (0..count as i32).collect();
                assert_eq!(ids(&registry), expected);
            }
        }
    }

    #[test]
    fn geometry_comes_from_source() {
        let mut sink = Recorder::default();
        let mut registry = ScreenRegistry::with_dummy(&mut sink);
        registry.rebuild(&screens(2), &mut sink);

        let second = registry.get(ScreenId(1)).map(Screen::geometry);
        assert_eq!(second, Some(Rect::new(1920.0, 0.0, 3840.0, 1080.0)));
        assert_eq!(
            registry.screen_at(Point::new(2000.0, 10.0)).id(),
            ScreenId(1)
        );
        assert_eq!(
            registry.screen_at(Point::new(-5.0, -5.0)).id(),
            ScreenId(0),
            "points off every screen resolve to the primary"
        );
    }

    #[test]
    fn dummy_id_has_no_index() {
        assert_eq!(ScreenId::DUMMY.index(), None);
        assert_eq!(ScreenId(3).index(), Some(3));
        assert!(Screen::dummy().is_dummy());
    }
}

// Copyright 2026 the Moorage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `wl_output` tracking and the screen view built from it.

use kurbo::{Point, Rect, Size};
use moorage_core::screen::ScreenSource;

/// Properties accumulated from one output's events.
///
/// Fields are double-buffered by the protocol: nothing is visible to
/// [`ScreenSource`] until the first `done`.
#[derive(Clone, Debug, PartialEq)]
pub struct OutputInfo {
    /// Position in the compositor's global space.
    pub position: Point,
    /// Current mode in device pixels.
    pub mode: (i32, i32),
    /// Current mode refresh rate in millihertz, if reported.
    pub refresh_mhz: Option<u32>,
    /// Integer scale factor.
    pub scale: i32,
    /// Connector name, e.g. `DP-1`.
    pub name: Option<String>,
}

impl Default for OutputInfo {
    fn default() -> Self {
        Self {
            position: Point::ORIGIN,
            mode: (0, 0),
            refresh_mhz: None,
            scale: 1,
            name: None,
        }
    }
}

impl OutputInfo {
    /// Logical geometry: the current mode divided by the scale factor.
    #[must_use]
    pub fn geometry(&self) -> Rect {
        let scale = f64::from(self.scale.max(1));
        let size = Size::new(f64::from(self.mode.0), f64::from(self.mode.1)) / scale;
        Rect::from_origin_size(self.position, size)
    }
}

#[derive(Debug)]
struct TrackedOutput {
    registry_name: u32,
    pending: OutputInfo,
    current: Option<OutputInfo>,
}

/// Protocol state of all bound outputs, in announcement order.
///
/// The `wl_output` proxies live in [`WaylandState`](crate::WaylandState).
#[derive(Debug, Default)]
pub struct OutputList {
    outputs: Vec<TrackedOutput>,
}

impl OutputList {
    pub(crate) fn insert(&mut self, registry_name: u32) {
        self.outputs.push(TrackedOutput {
            registry_name,
            pending: OutputInfo::default(),
            current: None,
        });
    }

    /// Drops the output advertised as `registry_name`.
    ///
    /// Returns `true` if it had been announced.
    pub(crate) fn remove(&mut self, registry_name: u32) -> bool {
        let Some(index) = self
            .outputs
            .iter()
            .position(|o| o.registry_name == registry_name)
        else {
            return false;
        };
        self.outputs.remove(index).current.is_some()
    }

    pub(crate) fn pending_mut(&mut self, registry_name: u32) -> Option<&mut OutputInfo> {
        self.outputs
            .iter_mut()
            .find(|o| o.registry_name == registry_name)
            .map(|o| &mut o.pending)
    }

    /// Publishes the pending state of `registry_name`.
    ///
    /// Returns `true` if the published state differs from the previous one.
    pub(crate) fn commit(&mut self, registry_name: u32) -> bool {
        let Some(output) = self
            .outputs
            .iter_mut()
            .find(|o| o.registry_name == registry_name)
        else {
            return false;
        };
        let changed = output.current.as_ref() != Some(&output.pending);
        output.current = Some(output.pending.clone());
        changed
    }

    /// Number of outputs bound, announced or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    /// Returns `true` if no output is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    /// Copies the announced outputs into a [`ScreenSource`].
    #[must_use]
    pub fn snapshot(&self) -> OutputSnapshot {
        OutputSnapshot(
            self.outputs
                .iter()
                .filter_map(|o| o.current.clone())
                .collect(),
        )
    }
}

/// Announced outputs at one point in time.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OutputSnapshot(pub Vec<OutputInfo>);

impl ScreenSource for OutputSnapshot {
    fn count(&self) -> usize {
        self.0.len()
    }

    fn geometry(&self, index: usize) -> Rect {
        self.0.get(index).map_or(Rect::ZERO, OutputInfo::geometry)
    }

    fn refresh_rate_mhz(&self, index: usize) -> Option<u32> {
        self.0
            .get(index)
            .and_then(|o| o.refresh_mhz)
            .filter(|&mhz| mhz > 0)
    }

    fn scale(&self, index: usize) -> f64 {
        self.0.get(index).map_or(1.0, |o| f64::from(o.scale.max(1)))
    }

    fn name(&self, index: usize) -> Option<String> {
        self.0.get(index).and_then(|o| o.name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::{OutputInfo, OutputList, OutputSnapshot};
    use kurbo::{Point, Rect};
    use moorage_core::screen::{DEFAULT_REFRESH_RATE_MHZ, Screen, ScreenSource};

    fn hidpi() -> OutputInfo {
        OutputInfo {
            position: Point::new(1920.0, 0.0),
            mode: (3840, 2160),
            refresh_mhz: Some(144_000),
            scale: 2,
            name: Some("DP-2".to_owned()),
        }
    }

    #[test]
    fn geometry_is_logical() {
        assert_eq!(hidpi().geometry(), Rect::new(1920.0, 0.0, 3840.0, 1080.0));
    }

    #[test]
    fn zero_scale_is_treated_as_one() {
        let output = OutputInfo {
            mode: (800, 600),
            scale: 0,
            ..OutputInfo::default()
        };
        assert_eq!(output.geometry(), Rect::new(0.0, 0.0, 800.0, 600.0));
    }

    #[test]
    fn snapshot_reports_screen_properties() {
        let snapshot = OutputSnapshot(vec![OutputInfo::default(), hidpi()]);

        assert_eq!(snapshot.count(), 2);
        assert_eq!(snapshot.refresh_rate_mhz(0), None);
        assert_eq!(snapshot.refresh_rate_mhz(1), Some(144_000));
        assert_eq!(
            Screen::from_source(&snapshot, 0).refresh_rate_mhz(),
            DEFAULT_REFRESH_RATE_MHZ
        );
        assert_eq!(snapshot.scale(1), 2.0);
        assert_eq!(snapshot.name(1).as_deref(), Some("DP-2"));
        assert_eq!(snapshot.name(0), None);
    }

    fn list_with(names: &[u32]) -> OutputList {
        let mut list = OutputList::default();
        for &name in names {
            list.insert(name);
        }
        list
    }

    #[test]
    fn outputs_stay_hidden_until_done() {
        let mut list = list_with(&[3, 4]);
        *list.pending_mut(3).unwrap() = hidpi();

        assert_eq!(list.len(), 2);
        assert_eq!(list.snapshot(), OutputSnapshot::default());

        assert!(list.commit(3));
        assert_eq!(list.snapshot(), OutputSnapshot(vec![hidpi()]));
    }

    #[test]
    fn commit_reports_only_real_changes() {
        let mut list = list_with(&[3]);
        assert!(list.commit(3), "first done always announces");
        assert!(!list.commit(3));

        list.pending_mut(3).unwrap().scale = 2;
        assert!(list.commit(3));
        assert!(!list.commit(3));
        assert!(!list.commit(99));
    }

    #[test]
    fn pending_edits_do_not_leak_before_done() {
        let mut list = list_with(&[3]);
        list.commit(3);
        list.pending_mut(3).unwrap().name = Some("HDMI-A-1".to_owned());

        assert_eq!(list.snapshot().name(0), None);
        list.commit(3);
        assert_eq!(list.snapshot().name(0).as_deref(), Some("HDMI-A-1"));
    }

    #[test]
    fn remove_reports_whether_output_was_announced() {
        let mut list = list_with(&[3, 4]);
        list.commit(4);

        assert!(!list.remove(3), "never announced");
        assert!(list.remove(4));
        assert!(!list.remove(4), "already gone");
        assert!(list.is_empty());
        assert!(list.pending_mut(4).is_none());
    }
}

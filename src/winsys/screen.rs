use crate::geometry::Pos;
use crate::geometry::Region;

use std::env;

/// Presence of this variable replaces real monitor geometry with a fake dual-head layout.
pub const FAKE_LAYOUT_VAR: &str = "FAKE_XINERAMA_MDM";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Monitor {
    pub name: String,
    pub region: Region,
    pub primary: bool,
}

impl Monitor {
    pub fn new(
        name: impl Into<String>,
        region: Region,
        primary: bool,
    ) -> Self {
        Self {
            name: name.into(),
            region,
            primary,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Screen {
    full_region: Region,
    monitors: Vec<Monitor>,
    selected: usize,
}

impl Screen {
    /// Builds the layout from discovered outputs and selects one by name or index.
    pub fn new(
        full_region: Region,
        monitors: Vec<Monitor>,
        selector: Option<&str>,
    ) -> Self {
        let monitors = if monitors.is_empty() {
            vec![Monitor::new("default", full_region, true)]
        } else {
            monitors
        };

        let selected = Self::select(&monitors, selector);

        Self {
            full_region,
            monitors,
            selected,
        }
    }

    /// Two synthetic monitors on one screen, for headless testing.
    pub fn fake(full_region: Region) -> Self {
        let (w, h) = full_region.dim.values();

        Self {
            full_region,
            monitors: vec![
                Monitor::new("fake-0", Region::new(100, 100, w / 2 - 100, h / 2 - 100), true),
                Monitor::new("fake-1", Region::new(w / 2, h / 2, w / 2, h / 2), false),
            ],
            selected: 0,
        }
    }

    #[inline]
    pub fn fake_layout_requested() -> bool {
        env::var_os(FAKE_LAYOUT_VAR).is_some()
    }

    fn select(
        monitors: &[Monitor],
        selector: Option<&str>,
    ) -> usize {
        let fallback = monitors
            .iter()
            .position(|monitor| monitor.primary)
            .unwrap_or(0);

        selector.map_or(fallback, |selector| {
            monitors
                .iter()
                .enumerate()
                .filter(|(i, monitor)| monitor.name == selector || i.to_string() == selector)
                .map(|(i, _)| i)
                .last()
                .unwrap_or(fallback)
        })
    }

    #[inline]
    pub fn full_region(&self) -> Region {
        self.full_region
    }

    #[inline]
    pub fn monitors(&self) -> &[Monitor] {
        &self.monitors
    }

    #[inline]
    pub fn selected(&self) -> &Monitor {
        &self.monitors[self.selected]
    }

    #[inline]
    pub fn selected_region(&self) -> Region {
        self.selected().region
    }

    /// Where the pointer is parked: the middle of the monitor, slightly low.
    pub fn pointer_home(&self) -> Pos {
        let region = self.selected_region();

        Pos {
            x: region.pos.x + region.dim.w / 2,
            y: region.pos.y + region.dim.h / 2 + 20,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outputs() -> Vec<Monitor> {
        vec![
            Monitor::new("DP-1", Region::new(0, 0, 1920, 1080), false),
            Monitor::new("HDMI-1", Region::new(1920, 0, 1280, 1024), true),
        ]
    }

    #[test]
    fn selects_by_name_or_index() {
        let full = Region::new(0, 0, 3200, 1080);

        assert_eq!(Screen::new(full, outputs(), Some("DP-1")).selected().name, "DP-1");
        assert_eq!(Screen::new(full, outputs(), Some("1")).selected().name, "HDMI-1");
    }

    #[test]
    fn unmatched_selector_falls_back_to_primary() {
        let full = Region::new(0, 0, 3200, 1080);

        assert_eq!(Screen::new(full, outputs(), Some("VGA-9")).selected().name, "HDMI-1");
        assert_eq!(Screen::new(full, outputs(), None).selected().name, "HDMI-1");
    }

    #[test]
    fn no_outputs_means_whole_screen() {
        let full = Region::new(0, 0, 1000, 800);
        let screen = Screen::new(full, Vec::new(), None);

        assert_eq!(screen.selected_region(), full);
        assert_eq!(screen.pointer_home(), Pos { x: 500, y: 420 });
    }

    #[test]
    fn fake_layout_splits_screen() {
        let screen = Screen::fake(Region::new(0, 0, 1000, 800));

        assert_eq!(screen.monitors().len(), 2);
        assert_eq!(screen.selected_region(), Region::new(100, 100, 400, 300));
        assert_eq!(screen.monitors()[1].region, Region::new(500, 400, 500, 400));
    }
}

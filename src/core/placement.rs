use crate::client::Client;

use winsys::connection::Connection;
use winsys::geometry::Region;
use winsys::trap::ErrorTrap;
use winsys::window::Window;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PlacementRights {
    pub resize: bool,
    pub reposition: bool,
}

impl PlacementRights {
    pub fn of(
        conn: &dyn Connection,
        client: &Client,
        hints_window: Window,
    ) -> Self {
        if client.ignores_size_hints() {
            return Self {
                resize: true,
                reposition: true,
            };
        }

        let hints = conn
            .get_icccm_window_size_hints(hints_window)
            .unwrap_or_default();

        Self {
            resize: hints.allows_resize(),
            reposition: hints.allows_reposition() && client.must_center(),
        }
    }

    #[inline]
    pub fn any(&self) -> bool {
        self.resize || self.reposition
    }
}

pub struct Placement {}

impl Placement {
    pub fn centered_region(
        geometry: Region,
        area: Region,
        rights: PlacementRights,
    ) -> Region {
        let mut region = geometry;

        if rights.resize {
            region = region.fitted_into(area);
        }

        if rights.reposition {
            region = region.centered_in(area);
        }

        region
    }

    #[inline]
    pub fn constrained_region(
        geometry: Region,
        area: Region,
    ) -> Region {
        geometry.fitted_into(area).clamped_into(area)
    }

    /// Centers and shrinks `target` within `area`, as far as the size hints of
    /// `hints_window` and the flags of the client permit.
    pub fn recenter(
        conn: &dyn Connection,
        client: &Client,
        area: Region,
        target: Window,
        hints_window: Window,
    ) {
        let trap = ErrorTrap::new(conn);
        let rights = PlacementRights::of(conn, client, hints_window);

        if !rights.any() {
            trap.release();
            return;
        }

        if let Ok(geometry) = conn.get_window_geometry(target) {
            let region = Self::centered_region(geometry, area, rights);

            if region != geometry {
                conn.place_window(target, &region);
            }
        }

        if client.must_center() && !client.must_recenter() {
            client.set_center(false);
        }

        trap.release();
    }

    /// Pulls the border of a client back into `area` after the usable screen shrank.
    pub fn constrain(
        conn: &dyn Connection,
        client: &Client,
        area: Region,
    ) {
        let decoration = match client.decoration() {
            Some(decoration) => decoration,
            None => return,
        };

        let trap = ErrorTrap::new(conn);

        if let Ok(geometry) = conn.get_window_geometry(decoration) {
            let region = Self::constrained_region(geometry, area);

            if region != geometry {
                conn.place_window(decoration, &region);
            }
        }

        trap.release();
    }
}

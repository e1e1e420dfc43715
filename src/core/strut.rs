use winsys::geometry::Dim;
use winsys::geometry::Edge;
use winsys::geometry::Padding;
use winsys::geometry::Region;
use winsys::window::Window;

use strum::IntoEnumIterator;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Reservation {
    pub owner: Option<Window>,
    pub width: u32,
}

impl Default for Reservation {
    fn default() -> Self {
        Self {
            owner: None,
            width: 0,
        }
    }
}

/// Edge reservations published by panels through `_NET_WM_STRUT`, one owner per edge.
pub struct StrutTracker {
    bounds: Dim,
    reservations: [Reservation; 4],
}

impl StrutTracker {
    pub fn new(bounds: Dim) -> Self {
        Self {
            bounds,
            reservations: [Reservation::default(); 4],
        }
    }

    fn limit(
        &self,
        edge: Edge,
    ) -> u32 {
        let limit = match edge {
            Edge::Left | Edge::Right => self.bounds.w,
            Edge::Top | Edge::Bottom => self.bounds.h,
        };

        limit.max(0) as u32
    }

    #[inline]
    pub fn reservation(
        &self,
        edge: Edge,
    ) -> Reservation {
        self.reservations[edge.index()]
    }

    /// Takes over every edge with a non-zero width, and edges the window already owns.
    ///
    /// A zero from a window that does not own the edge is ignored, so one panel
    /// never erases the reservation of another. Widths beyond the screen
    /// discard the whole update.
    pub fn update(
        &mut self,
        owner: Window,
        widths: [u32; 4],
    ) -> bool {
        if Edge::iter().any(|edge| widths[edge.index()] > self.limit(edge)) {
            debug!("ignoring oversized strut {:?} of window {:#0x}", widths, owner);
            return false;
        }

        let mut changed = false;

        for edge in Edge::iter() {
            let width = widths[edge.index()];
            let reservation = &mut self.reservations[edge.index()];

            if width != 0 || reservation.owner == Some(owner) {
                let adopted = Reservation {
                    owner: Some(owner),
                    width,
                };

                changed |= *reservation != adopted;
                *reservation = adopted;
            }
        }

        changed
    }

    /// The full region minus every reservation not owned by `exclude`.
    pub fn effective_area(
        &self,
        full: Region,
        exclude: Option<Window>,
    ) -> Region {
        let mut padding = Padding::default();

        for edge in Edge::iter() {
            let reservation = self.reservation(edge);

            if reservation.owner.is_some() && reservation.owner != exclude {
                padding.set_edge(edge, reservation.width as i32);
            }
        }

        full - padding
    }
}

use std::ops::Sub;

use strum::EnumIter;

/// Screen edges, in the order `_NET_WM_STRUT` lists them.
#[derive(Debug, PartialOrd, Ord, PartialEq, Eq, Clone, Copy, Hash, EnumIter)]
pub enum Edge {
    Left,
    Right,
    Top,
    Bottom,
}

impl Edge {
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Edge::Left => 0,
            Edge::Right => 1,
            Edge::Top => 2,
            Edge::Bottom => 3,
        }
    }
}

#[derive(Debug, Copy, Clone, Hash, PartialOrd, Ord, PartialEq, Eq)]
pub struct Pos {
    pub x: i32,
    pub y: i32,
}

impl Default for Pos {
    fn default() -> Self {
        Self {
            x: 0,
            y: 0,
        }
    }
}

#[derive(Debug, Copy, Clone, Hash, PartialOrd, Ord, PartialEq, Eq)]
pub struct Dim {
    pub w: i32,
    pub h: i32,
}

impl Default for Dim {
    fn default() -> Self {
        Self {
            w: 0,
            h: 0,
        }
    }
}

impl Dim {
    pub fn values(&self) -> (i32, i32) {
        (self.w, self.h)
    }
}

#[derive(Debug, Copy, Clone, Hash, PartialOrd, Ord, PartialEq, Eq)]
pub struct Region {
    pub pos: Pos,
    pub dim: Dim,
}

impl Default for Region {
    fn default() -> Self {
        Self {
            pos: Default::default(),
            dim: Default::default(),
        }
    }
}

impl Region {
    pub fn new(
        x: i32,
        y: i32,
        w: i32,
        h: i32,
    ) -> Self {
        Self {
            pos: Pos {
                x,
                y,
            },
            dim: Dim {
                w,
                h,
            },
        }
    }

    /// Overlap of two regions; empty (zero-sized) when they are disjoint.
    pub fn intersect(
        &self,
        other: Region,
    ) -> Self {
        let left = self.pos.x.max(other.pos.x);
        let top = self.pos.y.max(other.pos.y);
        let right = (self.pos.x + self.dim.w).min(other.pos.x + other.dim.w);
        let bottom = (self.pos.y + self.dim.h).min(other.pos.y + other.dim.h);

        Region::new(left, top, (right - left).max(0), (bottom - top).max(0))
    }

    pub fn with_pos(
        self,
        pos: Pos,
    ) -> Self {
        Self {
            pos,
            dim: self.dim,
        }
    }

    pub fn with_dim(
        self,
        dim: Dim,
    ) -> Self {
        Self {
            pos: self.pos,
            dim,
        }
    }

    pub fn offset(
        self,
        by: i32,
    ) -> Self {
        self.with_pos(Pos {
            x: self.pos.x + by,
            y: self.pos.y + by,
        })
    }

    /// Shrinks the dimensions to fit inside `area`, keeping the position.
    pub fn fitted_into(
        self,
        area: Region,
    ) -> Self {
        self.with_dim(Dim {
            w: self.dim.w.min(area.dim.w),
            h: self.dim.h.min(area.dim.h),
        })
    }

    /// Centers the region in `area`, never starting above or left of its origin.
    pub fn centered_in(
        self,
        area: Region,
    ) -> Self {
        self.with_pos(Pos {
            x: (area.pos.x + (area.dim.w - self.dim.w) / 2).max(area.pos.x),
            y: (area.pos.y + (area.dim.h - self.dim.h) / 2).max(area.pos.y),
        })
    }

    /// Moves the region so that it starts and ends inside `area` where it fits.
    pub fn clamped_into(
        self,
        area: Region,
    ) -> Self {
        let mut pos = self.pos;

        pos.x = pos.x.max(area.pos.x);
        pos.y = pos.y.max(area.pos.y);

        if pos.x + self.dim.w > area.pos.x + area.dim.w {
            pos.x = area.pos.x + area.dim.w - self.dim.w;
        }

        if pos.y + self.dim.h > area.pos.y + area.dim.h {
            pos.y = area.pos.y + area.dim.h - self.dim.h;
        }

        self.with_pos(pos)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Padding {
    pub left: i32,
    pub right: i32,
    pub top: i32,
    pub bottom: i32,
}

impl Default for Padding {
    fn default() -> Self {
        Self {
            left: 0,
            right: 0,
            top: 0,
            bottom: 0,
        }
    }
}

impl Padding {
    pub fn set_edge(
        &mut self,
        edge: Edge,
        size: i32,
    ) {
        match edge {
            Edge::Left => self.left = size,
            Edge::Right => self.right = size,
            Edge::Top => self.top = size,
            Edge::Bottom => self.bottom = size,
        }
    }
}

impl Sub<Padding> for Region {
    type Output = Self;

    fn sub(
        self,
        padding: Padding,
    ) -> Self::Output {
        Self::Output {
            pos: Pos {
                x: self.pos.x + padding.left,
                y: self.pos.y + padding.top,
            },
            dim: Dim {
                w: self.dim.w - padding.left - padding.right,
                h: self.dim.h - padding.top - padding.bottom,
            },
        }
    }
}

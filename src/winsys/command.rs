use crate::geometry::Pos;
use crate::geometry::Region;
use crate::window::Window;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StackMode {
    Above,
    Below,
    TopIf,
    BottomIf,
    Opposite,
}

/// A masked window configuration; only the fields that are set get sent.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct WindowChanges {
    pub x: Option<i32>,
    pub y: Option<i32>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub border_width: Option<u32>,
    pub sibling: Option<Window>,
    pub stack_mode: Option<StackMode>,
}

impl WindowChanges {
    pub fn from_region(region: Region) -> Self {
        Self {
            x: Some(region.pos.x),
            y: Some(region.pos.y),
            width: Some(region.dim.w.max(1) as u32),
            height: Some(region.dim.h.max(1) as u32),
            ..Default::default()
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A protocol side effect decided by the window manager and applied by a connection.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Command {
    Unmap(Window),
    Raise(Window),
    Lower(Window),
    Configure(Window, WindowChanges),
    Unparent(Window, Pos),
    DeleteWmState(Window),
}

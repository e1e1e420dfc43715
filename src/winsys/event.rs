use crate::command::WindowChanges;
use crate::geometry::Pos;
use crate::window::Window;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CirculatePlace {
    OnTop,
    OnBottom,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PropertyKind {
    Strut,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    MapRequest {
        window: Window,
        parent: Window,
    },
    ConfigureRequest {
        window: Window,
        changes: WindowChanges,
    },
    CirculateRequest {
        window: Window,
        place: CirculatePlace,
    },
    Map {
        window: Window,
        override_redirect: bool,
    },
    Unmap {
        window: Window,
    },
    Destroy {
        window: Window,
    },
    Enter {
        window: Window,
        root_rpos: Pos,
        time: u32,
        inferior: bool,
    },
    Leave {
        window: Window,
        root_rpos: Pos,
        time: u32,
        inferior: bool,
    },
    Property {
        window: Window,
        kind: PropertyKind,
    },
}

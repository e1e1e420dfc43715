use winsys::geometry::Pos;
use winsys::window::Window;

use std::cell::Cell;

pub struct Client {
    window: Window,
    decoration: Cell<Option<Window>>,
    shadow: Cell<Option<Window>>,
    origin: Cell<Pos>,
    ignore_size_hints: Cell<bool>,
    center: Cell<bool>,
    recenter: Cell<bool>,
    accepts_focus: Cell<bool>,
    expected_map_count: Cell<u8>,
    expected_unmap_count: Cell<u8>,
}

impl Client {
    pub fn new(
        window: Window,
        center: bool,
    ) -> Self {
        Self {
            window,
            decoration: Cell::new(None),
            shadow: Cell::new(None),
            origin: Cell::new(Pos::default()),
            ignore_size_hints: Cell::new(false),
            center: Cell::new(center),
            recenter: Cell::new(false),
            accepts_focus: Cell::new(true),
            expected_map_count: Cell::new(0),
            expected_unmap_count: Cell::new(0),
        }
    }

    #[inline]
    pub fn window(&self) -> Window {
        self.window
    }

    #[inline]
    pub fn decoration(&self) -> Option<Window> {
        self.decoration.get()
    }

    #[inline]
    pub fn set_decoration(
        &self,
        decoration: Option<Window>,
    ) {
        self.decoration.set(decoration);
    }

    #[inline]
    pub fn shadow(&self) -> Option<Window> {
        self.shadow.get()
    }

    #[inline]
    pub fn set_shadow(
        &self,
        shadow: Option<Window>,
    ) {
        self.shadow.set(shadow);
    }

    /// The window that is a child of the root: the decoration if any, else the client.
    #[inline]
    pub fn outer(&self) -> Window {
        self.decoration.get().unwrap_or(self.window)
    }

    #[inline]
    pub fn origin(&self) -> Pos {
        self.origin.get()
    }

    #[inline]
    pub fn set_origin(
        &self,
        origin: Pos,
    ) {
        self.origin.set(origin);
    }

    #[inline]
    pub fn ignores_size_hints(&self) -> bool {
        self.ignore_size_hints.get()
    }

    #[inline]
    pub fn set_ignore_size_hints(
        &self,
        ignore_size_hints: bool,
    ) {
        self.ignore_size_hints.set(ignore_size_hints);
    }

    #[inline]
    pub fn must_center(&self) -> bool {
        self.center.get()
    }

    #[inline]
    pub fn set_center(
        &self,
        center: bool,
    ) {
        self.center.set(center);
    }

    #[inline]
    pub fn must_recenter(&self) -> bool {
        self.recenter.get()
    }

    #[inline]
    pub fn set_recenter(
        &self,
        recenter: bool,
    ) {
        self.recenter.set(recenter);
    }

    #[inline]
    pub fn accepts_focus(&self) -> bool {
        self.accepts_focus.get()
    }

    #[inline]
    pub fn set_accepts_focus(
        &self,
        accepts_focus: bool,
    ) {
        self.accepts_focus.set(accepts_focus);
    }

    #[inline]
    pub fn expect_map(&self) {
        self.expected_map_count
            .set(self.expected_map_count.get() + 1);
    }

    #[inline]
    pub fn consume_map_if_expecting(&self) -> bool {
        let expected_map_count = self.expected_map_count.get();
        let expecting = expected_map_count > 0;

        if expecting {
            self.expected_map_count.set(expected_map_count - 1);
        }

        expecting
    }

    #[inline]
    pub fn is_expecting_map(&self) -> bool {
        self.expected_map_count.get() > 0
    }

    #[inline]
    pub fn expect_unmap(&self) {
        self.expected_unmap_count
            .set(self.expected_unmap_count.get() + 1);
    }

    #[inline]
    pub fn consume_unmap_if_expecting(&self) -> bool {
        let expected_unmap_count = self.expected_unmap_count.get();
        let expecting = expected_unmap_count > 0;

        if expecting {
            self.expected_unmap_count.set(expected_unmap_count - 1);
        }

        expecting
    }

    #[inline]
    pub fn is_expecting_unmap(&self) -> bool {
        self.expected_unmap_count.get() > 0
    }
}

impl PartialEq for Client {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.window == other.window
    }
}

impl std::fmt::Debug for Client {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("window", &format_args!("{:#0x}", self.window))
            .field("decoration", &self.decoration.get().map(|w| format!("{:#0x}", w)))
            .field("shadow", &self.shadow.get().map(|w| format!("{:#0x}", w)))
            .field("origin", &self.origin.get())
            .field("ignore_size_hints", &self.ignore_size_hints.get())
            .field("center", &self.center.get())
            .field("recenter", &self.recenter.get())
            .field("accepts_focus", &self.accepts_focus.get())
            .finish()
    }
}

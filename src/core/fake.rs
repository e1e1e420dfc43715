use winsys::command::StackMode;
use winsys::command::WindowChanges;
use winsys::connection::Connection;
use winsys::event::Event;
use winsys::geometry::Pos;
use winsys::geometry::Region;
use winsys::hints::Hints;
use winsys::hints::HintSource;
use winsys::hints::MotifHints;
use winsys::hints::strut_from_raw;
use winsys::hints::SizeHints;
use winsys::hints::WmClass;
use winsys::screen::Monitor;
use winsys::trap::TrapState;
use winsys::window::Protocol;
use winsys::window::Window;
use winsys::window::WindowAttributes;
use winsys::Result;

use anyhow::anyhow;

use std::cell::Cell;
use std::cell::RefCell;
use std::collections::HashMap;
use std::collections::HashSet;
use std::collections::VecDeque;

/// A mutating request as seen by the fake server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Grab,
    Ungrab,
    InitClient(Window),
    InitBorder(Window),
    Map(Window),
    Unmap(Window),
    Reparent(Window, Window),
    Unparent(Window, Pos),
    Destroy(Window),
    Place(Window, Region),
    Configure(Window, WindowChanges),
    Raise(Window),
    Lower(Window),
    Focus(Window),
    TakeFocus(Window),
    Warp(Pos),
    SaveSetInsert(Window),
    SaveSetRemove(Window),
    ForceUserGeometry(Window),
    DeleteWmState(Window),
    SetOrder(Vec<Window>),
}

#[derive(Debug, Clone)]
struct FakeWindow {
    region: Region,
    border_width: u32,
    parent: Window,
    mapped: bool,
    override_redirect: bool,
    wm_state: bool,
    class: Option<WmClass>,
    hints: Option<Hints>,
    size_hints: Option<SizeHints>,
    motif_hints: Option<MotifHints>,
    protocols: Vec<Protocol>,
    strut: Option<Vec<u32>>,
}

impl FakeWindow {
    fn new(
        region: Region,
        parent: Window,
    ) -> Self {
        Self {
            region,
            border_width: 0,
            parent,
            mapped: false,
            override_redirect: false,
            wm_state: true,
            class: None,
            hints: None,
            size_hints: None,
            motif_hints: None,
            protocols: Vec::new(),
            strut: None,
        }
    }
}

/// An in-memory display server.
///
/// Requests on windows that do not exist are recorded as protocol errors in
/// the trap state, as the real server would report BadWindow. Children of a
/// destroyed window survive on the root, as if they were in the save set.
pub struct FakeConnection {
    root: Window,
    screen: Region,
    next_id: Cell<Window>,
    windows: RefCell<HashMap<Window, FakeWindow>>,
    stack: RefCell<Vec<Window>>,
    events: RefCell<VecDeque<Event>>,
    calls: RefCell<Vec<Call>>,
    trap: TrapState,
    focused: Cell<Option<Window>>,
    pointer: Cell<Pos>,
    order: RefCell<Option<Vec<Window>>>,
    save_set: RefCell<HashSet<Window>>,
    outputs: RefCell<Vec<Monitor>>,
    fail_reparent: Cell<bool>,
    grabs: Cell<u32>,
}

impl FakeConnection {
    pub fn new(
        w: i32,
        h: i32,
    ) -> Self {
        Self {
            root: 1,
            screen: Region::new(0, 0, w, h),
            next_id: Cell::new(0x200000),
            windows: RefCell::new(HashMap::new()),
            stack: RefCell::new(Vec::new()),
            events: RefCell::new(VecDeque::new()),
            calls: RefCell::new(Vec::new()),
            trap: TrapState::new(),
            focused: Cell::new(None),
            pointer: Cell::new(Pos::default()),
            order: RefCell::new(None),
            save_set: RefCell::new(HashSet::new()),
            outputs: RefCell::new(Vec::new()),
            fail_reparent: Cell::new(false),
            grabs: Cell::new(0),
        }
    }

    /// Creates an unmapped top-level window, as a client would.
    pub fn add_window(
        &self,
        region: Region,
    ) -> Window {
        let window = self.next_id.get();
        self.next_id.set(window + 0x100);

        self.windows
            .borrow_mut()
            .insert(window, FakeWindow::new(region, self.root));
        self.stack.borrow_mut().push(window);

        window
    }

    /// Maps a window on behalf of its owner, bypassing redirection.
    pub fn map(
        &self,
        window: Window,
    ) {
        self.with_window(window, |w| w.mapped = true);
    }

    pub fn set_override_redirect(
        &self,
        window: Window,
    ) {
        self.with_window(window, |w| w.override_redirect = true);
    }

    /// Destroys a window on behalf of its owner.
    pub fn kill(
        &self,
        window: Window,
    ) {
        self.remove(window);
    }

    pub fn push_event(
        &self,
        event: Event,
    ) {
        self.events.borrow_mut().push_back(event);
    }

    pub fn fail_reparent(
        &self,
        fail: bool,
    ) {
        self.fail_reparent.set(fail);
    }

    pub fn set_outputs(
        &self,
        outputs: Vec<Monitor>,
    ) {
        *self.outputs.borrow_mut() = outputs;
    }

    pub fn set_class(
        &self,
        window: Window,
        class: WmClass,
    ) {
        self.with_window(window, |w| w.class = Some(class));
    }

    pub fn set_hints(
        &self,
        window: Window,
        hints: Hints,
    ) {
        self.with_window(window, |w| w.hints = Some(hints));
    }

    pub fn set_size_hints(
        &self,
        window: Window,
        size_hints: SizeHints,
    ) {
        self.with_window(window, |w| w.size_hints = Some(size_hints));
    }

    pub fn set_motif_hints(
        &self,
        window: Window,
        motif_hints: MotifHints,
    ) {
        self.with_window(window, |w| w.motif_hints = Some(motif_hints));
    }

    pub fn set_protocols(
        &self,
        window: Window,
        protocols: Vec<Protocol>,
    ) {
        self.with_window(window, |w| w.protocols = protocols);
    }

    pub fn set_strut(
        &self,
        window: Window,
        strut: [u32; 4],
    ) {
        self.set_raw_strut(window, strut.to_vec());
    }

    pub fn set_raw_strut(
        &self,
        window: Window,
        raw: Vec<u32>,
    ) {
        self.with_window(window, |w| w.strut = Some(raw));
    }

    pub fn exists(
        &self,
        window: Window,
    ) -> bool {
        self.windows.borrow().contains_key(&window)
    }

    pub fn parent_of(
        &self,
        window: Window,
    ) -> Option<Window> {
        self.windows.borrow().get(&window).map(|w| w.parent)
    }

    pub fn geometry_of(
        &self,
        window: Window,
    ) -> Option<Region> {
        self.windows.borrow().get(&window).map(|w| w.region)
    }

    pub fn is_mapped(
        &self,
        window: Window,
    ) -> bool {
        self.windows
            .borrow()
            .get(&window)
            .map_or(false, |w| w.mapped)
    }

    pub fn has_wm_state(
        &self,
        window: Window,
    ) -> bool {
        self.windows
            .borrow()
            .get(&window)
            .map_or(false, |w| w.wm_state)
    }

    pub fn size_hints_of(
        &self,
        window: Window,
    ) -> Option<SizeHints> {
        self.windows.borrow().get(&window).and_then(|w| w.size_hints)
    }

    pub fn in_save_set(
        &self,
        window: Window,
    ) -> bool {
        self.save_set.borrow().contains(&window)
    }

    pub fn is_grabbed(&self) -> bool {
        self.grabs.get() > 0
    }

    /// Root children, bottom to top.
    pub fn stacking(&self) -> Vec<Window> {
        self.stack.borrow().clone()
    }

    pub fn focused(&self) -> Option<Window> {
        self.focused.get()
    }

    pub fn pointer(&self) -> Pos {
        self.pointer.get()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    fn record(
        &self,
        call: Call,
    ) {
        self.calls.borrow_mut().push(call);
    }

    fn bad_window(&self) {
        self.trap.record_error();
    }

    /// Runs `f` on an existing window, or reports BadWindow.
    fn with_window<T>(
        &self,
        window: Window,
        f: impl FnOnce(&mut FakeWindow) -> T,
    ) -> Option<T> {
        let result = self.windows.borrow_mut().get_mut(&window).map(f);

        if result.is_none() {
            self.bad_window();
        }

        result
    }

    fn remove(
        &self,
        window: Window,
    ) {
        if self.windows.borrow_mut().remove(&window).is_none() {
            self.bad_window();
            return;
        }

        self.stack.borrow_mut().retain(|&w| w != window);
        self.save_set.borrow_mut().remove(&window);

        if self.focused.get() == Some(window) {
            self.focused.set(None);
        }

        let orphans: Vec<Window> = self
            .windows
            .borrow()
            .iter()
            .filter(|(_, w)| w.parent == window)
            .map(|(&id, _)| id)
            .collect();

        for orphan in orphans {
            self.with_window(orphan, |w| w.parent = self.root);
            self.stack.borrow_mut().push(orphan);
        }
    }

    fn restack(
        &self,
        window: Window,
        top: bool,
    ) {
        if !self.exists(window) {
            self.bad_window();
            return;
        }

        let mut stack = self.stack.borrow_mut();

        if let Some(index) = stack.iter().position(|&w| w == window) {
            stack.remove(index);

            if top {
                stack.push(window);
            } else {
                stack.insert(0, window);
            }
        }
    }

    fn set_parent(
        &self,
        window: Window,
        parent: Window,
        pos: Pos,
    ) {
        if self.with_window(window, |w| {
            w.parent = parent;
            w.region.pos = pos;
        })
        .is_none()
        {
            return;
        }

        let mut stack = self.stack.borrow_mut();
        stack.retain(|&w| w != window);

        if parent == self.root {
            stack.push(window);
        }
    }
}

impl Connection for FakeConnection {
    fn root(&self) -> Window {
        self.root
    }

    fn flush(&self) -> bool {
        true
    }

    fn sync(&self) -> bool {
        true
    }

    fn poll_event(&self) -> Option<Event> {
        self.events.borrow_mut().pop_front()
    }

    fn screen_region(&self) -> Region {
        self.screen
    }

    fn connected_outputs(&self) -> Vec<Monitor> {
        self.outputs.borrow().clone()
    }

    fn top_level_windows(&self) -> Vec<Window> {
        self.stacking()
    }

    fn trap_enter(&self) {
        self.trap.enter();
    }

    fn trap_leave(&self) -> bool {
        self.trap.leave()
    }

    fn grab_server(&self) {
        self.grabs.set(self.grabs.get() + 1);
        self.record(Call::Grab);
    }

    fn ungrab_server(&self) {
        self.grabs.set(self.grabs.get().saturating_sub(1));
        self.record(Call::Ungrab);
    }

    fn create_border(
        &self,
        region: Region,
    ) -> Result<Window> {
        Ok(self.add_window(region))
    }

    fn init_client(
        &self,
        window: Window,
    ) {
        self.record(Call::InitClient(window));

        if !self.exists(window) {
            self.bad_window();
        }
    }

    fn init_border(
        &self,
        window: Window,
    ) {
        self.record(Call::InitBorder(window));

        if !self.exists(window) {
            self.bad_window();
        }
    }

    fn map_window(
        &self,
        window: Window,
    ) {
        self.record(Call::Map(window));
        self.with_window(window, |w| w.mapped = true);
    }

    fn unmap_window(
        &self,
        window: Window,
    ) {
        self.record(Call::Unmap(window));
        self.with_window(window, |w| w.mapped = false);
    }

    fn reparent_window(
        &self,
        window: Window,
        parent: Window,
        pos: Pos,
    ) {
        self.record(Call::Reparent(window, parent));

        if self.fail_reparent.get() || !self.exists(parent) {
            self.bad_window();
            return;
        }

        self.set_parent(window, parent, pos);
    }

    fn unparent_window(
        &self,
        window: Window,
        pos: Pos,
    ) {
        self.record(Call::Unparent(window, pos));
        self.set_parent(window, self.root, pos);
    }

    fn destroy_window(
        &self,
        window: Window,
    ) {
        self.record(Call::Destroy(window));
        self.remove(window);
    }

    fn place_window(
        &self,
        window: Window,
        region: &Region,
    ) {
        self.record(Call::Place(window, *region));
        self.with_window(window, |w| w.region = *region);
    }

    fn move_window(
        &self,
        window: Window,
        pos: Pos,
    ) {
        self.with_window(window, |w| w.region.pos = pos);
    }

    fn configure_window(
        &self,
        window: Window,
        changes: &WindowChanges,
    ) {
        self.record(Call::Configure(window, *changes));

        if self
            .with_window(window, |w| {
                w.region.pos.x = changes.x.unwrap_or(w.region.pos.x);
                w.region.pos.y = changes.y.unwrap_or(w.region.pos.y);
                w.region.dim.w = changes.width.map_or(w.region.dim.w, |width| width as i32);
                w.region.dim.h = changes.height.map_or(w.region.dim.h, |height| height as i32);
                w.border_width = changes.border_width.unwrap_or(w.border_width);
            })
            .is_none()
        {
            return;
        }

        match changes.stack_mode {
            Some(StackMode::Above) | Some(StackMode::TopIf) => self.restack(window, true),
            Some(StackMode::Below) | Some(StackMode::BottomIf) => self.restack(window, false),
            _ => {},
        }
    }

    fn raise_window(
        &self,
        window: Window,
    ) {
        self.record(Call::Raise(window));
        self.restack(window, true);
    }

    fn lower_window(
        &self,
        window: Window,
    ) {
        self.record(Call::Lower(window));
        self.restack(window, false);
    }

    fn focus_window(
        &self,
        window: Window,
    ) {
        self.record(Call::Focus(window));

        if self.exists(window) {
            self.focused.set(Some(window));
        } else {
            self.bad_window();
        }
    }

    fn warp_pointer(
        &self,
        pos: Pos,
    ) {
        self.record(Call::Warp(pos));
        self.pointer.set(pos);
    }

    fn insert_window_in_save_set(
        &self,
        window: Window,
    ) {
        self.record(Call::SaveSetInsert(window));

        if self.exists(window) {
            self.save_set.borrow_mut().insert(window);
        } else {
            self.bad_window();
        }
    }

    fn remove_window_from_save_set(
        &self,
        window: Window,
    ) {
        self.record(Call::SaveSetRemove(window));

        if !self.save_set.borrow_mut().remove(&window) && !self.exists(window) {
            self.bad_window();
        }
    }

    fn get_window_attributes(
        &self,
        window: Window,
    ) -> Option<WindowAttributes> {
        self.with_window(window, |w| WindowAttributes {
            mapped: w.mapped,
            override_redirect: w.override_redirect,
        })
    }

    fn get_window_geometry(
        &self,
        window: Window,
    ) -> Result<Region> {
        self.with_window(window, |w| w.region)
            .ok_or_else(|| anyhow!("BadWindow {:#0x}", window))
    }

    fn get_window_border_width(
        &self,
        window: Window,
    ) -> u32 {
        self.with_window(window, |w| w.border_width).unwrap_or(0)
    }

    fn window_has_protocol(
        &self,
        window: Window,
        protocol: Protocol,
    ) -> bool {
        self.with_window(window, |w| w.protocols.contains(&protocol))
            .unwrap_or(false)
    }

    fn send_take_focus(
        &self,
        window: Window,
    ) {
        self.record(Call::TakeFocus(window));

        if !self.exists(window) {
            self.bad_window();
        }
    }

    fn get_icccm_window_class(
        &self,
        window: Window,
    ) -> Option<WmClass> {
        self.with_window(window, |w| w.class.clone()).flatten()
    }

    fn get_icccm_window_hints(
        &self,
        window: Window,
    ) -> Option<Hints> {
        self.with_window(window, |w| w.hints).flatten()
    }

    fn get_icccm_window_size_hints(
        &self,
        window: Window,
    ) -> Option<SizeHints> {
        self.with_window(window, |w| w.size_hints).flatten()
    }

    fn force_user_specified_geometry(
        &self,
        window: Window,
    ) {
        self.record(Call::ForceUserGeometry(window));
        self.with_window(window, |w| {
            w.size_hints = Some(SizeHints::new(Some(HintSource::User), Some(HintSource::User)));
        });
    }

    fn delete_icccm_window_state(
        &self,
        window: Window,
    ) {
        self.record(Call::DeleteWmState(window));
        self.with_window(window, |w| w.wm_state = false);
    }

    fn get_motif_hints(
        &self,
        window: Window,
    ) -> Option<MotifHints> {
        self.with_window(window, |w| w.motif_hints).flatten()
    }

    fn get_window_strut(
        &self,
        window: Window,
    ) -> Option<[u32; 4]> {
        self.with_window(window, |w| w.strut.clone())
            .flatten()
            .and_then(|raw| strut_from_raw(&raw))
    }

    fn get_window_order(&self) -> Option<Vec<Window>> {
        self.order.borrow().clone()
    }

    fn set_window_order(
        &self,
        order: &[Window],
    ) {
        self.record(Call::SetOrder(order.to_vec()));
        *self.order.borrow_mut() = Some(order.to_vec());
    }
}

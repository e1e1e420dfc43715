use crate::client::Client;
use crate::decoration::Decoration;
use crate::focus::FocusController;
use crate::gesture::Direction;
use crate::gesture::GestureListener;
use crate::order::WindowOrder;
use crate::placement::Placement;
use crate::registry::Registry;
use crate::rule::find_rules;
use crate::stack::StackPlanner;
use crate::strut::StrutTracker;

use winsys::command::WindowChanges;
use winsys::connection::Connection;
use winsys::event::CirculatePlace;
use winsys::event::Event;
use winsys::event::PropertyKind;
use winsys::geometry::Pos;
use winsys::geometry::Region;
use winsys::screen::Screen;
use winsys::trap::ErrorTrap;
use winsys::window::Window;

use std::collections::VecDeque;

/// Work deferred to the next idle turn of the event loop.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum IdleTask {
    Focus(Window),
}

pub struct Model<'a> {
    conn: &'a dyn Connection,
    root: Window,
    login: Option<Window>,
    registry: Registry,
    struts: StrutTracker,
    focus: FocusController,
    screen: Screen,
    gestures: Option<GestureListener>,
    idle: VecDeque<IdleTask>,
}

impl<'a> Model<'a> {
    pub fn new(
        conn: &'a dyn Connection,
        screen: Screen,
        login: Option<Window>,
        focus_new_windows: bool,
        gestures: Option<GestureListener>,
    ) -> Self {
        Self::init(Self {
            conn,
            root: conn.root(),
            login,
            registry: Registry::new(),
            struts: StrutTracker::new(screen.full_region().dim),
            focus: FocusController::new(focus_new_windows),
            screen,
            gestures,
            idle: VecDeque::new(),
        })
    }

    fn init(mut model: Self) -> Self {
        info!(
            "initializing window manager on monitor {} ({:?})",
            model.screen.selected().name,
            model.screen.selected_region()
        );

        model.manage_existing_windows();
        model
    }

    /// Brings every mapped top-level that existed before startup under management, uncentered.
    fn manage_existing_windows(&mut self) {
        self.conn.sync();

        let trap = ErrorTrap::new(self.conn);
        self.conn.grab_server();

        for window in self.conn.top_level_windows() {
            let attributes = match self.conn.get_window_attributes(window) {
                Some(attributes) => attributes,
                None => continue,
            };

            if !attributes.override_redirect && attributes.mapped {
                self.add_window(window, false, true);
            }
        }

        self.conn.ungrab_server();
        trap.release();
    }

    #[inline]
    pub fn login_window(&self) -> Option<Window> {
        self.login
    }

    pub fn set_login_window(
        &mut self,
        login: Option<Window>,
    ) {
        self.login = login;
    }

    #[inline]
    pub fn client(
        &self,
        window: Window,
    ) -> Option<&Client> {
        self.registry.get(window)
    }

    #[inline]
    pub fn focused(&self) -> Option<Window> {
        self.focus.focused()
    }

    #[inline]
    pub fn set_focus_new_windows(
        &mut self,
        focus_new_windows: bool,
    ) {
        self.focus.set_focus_new_windows(focus_new_windows);
    }

    /// The selected monitor minus the edges reserved by windows other than `exclude`.
    fn usable_area(
        &self,
        exclude: Option<Window>,
    ) -> Region {
        self.screen.selected_region().intersect(
            self.struts
                .effective_area(self.screen.full_region(), exclude),
        )
    }

    /// Puts a top-level window under management; managing a known window does nothing.
    pub fn add_window(
        &mut self,
        window: Window,
        center: bool,
        mapped: bool,
    ) {
        if self.registry.contains(window) {
            return;
        }

        info!("managing window {:#0x}", window);

        let trap = ErrorTrap::new(self.conn);
        let client = Client::new(window, center);

        if self
            .conn
            .get_icccm_window_hints(window)
            .map_or(false, |hints| hints.refuses_input())
        {
            client.set_accepts_focus(false);
        }

        if self.login == Some(window) {
            self.conn.force_user_specified_geometry(window);
            client.set_center(false);
            client.set_recenter(false);
        } else if let Some(class) = self.conn.get_icccm_window_class(window) {
            if let Some(rules) = find_rules(&class) {
                debug!(
                    "applying rules for class {}/{} to window {:#0x}",
                    class.instance, class.class, window
                );
                rules.propagate(&client);
            }
        }

        if let Some(widths) = self.conn.get_window_strut(window) {
            if self.struts.update(window, widths) {
                self.constrain_all();
            }
        }

        let area = self.usable_area(Some(window));
        let client = self.registry.insert(client);
        Placement::recenter(self.conn, client, area, window, window);

        if let Ok(region) = self.conn.get_window_geometry(window) {
            client.set_origin(region.pos);
        }

        let with_shadow = self.login != Some(window);
        Decoration::decorate(self.conn, &mut self.registry, window, with_shadow, mapped);

        self.conn.insert_window_in_save_set(window);
        trap.release();
    }

    /// Drops a client, tearing down its border and shadow but leaving the window itself alone.
    pub fn remove_window(
        &mut self,
        window: Window,
    ) {
        self.focus.forget(window);

        if let Some(client) = self.registry.remove(window) {
            info!("unmanaging window {:#0x}", window);

            let trap = ErrorTrap::new(self.conn);
            self.conn.remove_window_from_save_set(window);
            Decoration::undecorate(self.conn, &client);
            trap.release();
        }
    }

    /// Drains every queued event.
    pub fn process_events(&mut self) {
        while let Some(event) = self.conn.poll_event() {
            self.dispatch(event);
        }

        self.conn.flush();
    }

    fn dispatch(
        &mut self,
        event: Event,
    ) {
        let trap = ErrorTrap::new(self.conn);

        match event {
            Event::MapRequest {
                window,
                parent,
            } => self.handle_map_request(window, parent),
            Event::ConfigureRequest {
                window,
                changes,
            } => self.handle_configure_request(window, changes),
            Event::CirculateRequest {
                window,
                place,
            } => self.handle_circulate_request(window, place),
            Event::Map {
                window,
                override_redirect,
            } => self.handle_map(window, override_redirect),
            Event::Unmap {
                window,
            } => self.handle_unmap(window),
            Event::Destroy {
                window,
            } => self.handle_destroy(window),
            Event::Enter {
                window,
                root_rpos,
                time,
                inferior,
            } => self.handle_enter(window, root_rpos, time, inferior),
            Event::Leave {
                window,
                root_rpos,
                time,
                inferior,
            } => self.handle_leave(window, root_rpos, time, inferior),
            Event::Property {
                window,
                kind,
            } => self.handle_property(window, kind),
        }

        if trap.release() {
            debug!("event handler ran into a vanished window");
        }
    }

    fn handle_map_request(
        &mut self,
        window: Window,
        parent: Window,
    ) {
        debug!("MAP_REQUEST for window {:#0x}", window);

        if !self.registry.contains(window) && parent == self.root {
            self.conn.grab_server();
            self.add_window(window, true, false);
            self.conn.ungrab_server();
        }

        self.conn.map_window(window);
    }

    fn handle_configure_request(
        &mut self,
        window: Window,
        changes: WindowChanges,
    ) {
        debug!("CONFIGURE_REQUEST for window {:#0x}: {:?}", window, changes);

        self.conn.grab_server();

        for command in StackPlanner::configure(self.registry.get(window), window, changes) {
            self.conn.apply(&command);
        }

        let area = self.usable_area(Some(window));

        if let Some(client) = self.registry.get(window) {
            let origin = client.origin();

            client.set_origin(Pos {
                x: changes.x.unwrap_or(origin.x),
                y: changes.y.unwrap_or(origin.y),
            });

            Placement::recenter(self.conn, client, area, client.outer(), window);
            Decoration::follow_shadow(self.conn, client);
        }

        self.conn.ungrab_server();
    }

    fn handle_circulate_request(
        &mut self,
        window: Window,
        place: CirculatePlace,
    ) {
        debug!("CIRCULATE_REQUEST for window {:#0x}: {:?}", window, place);

        for command in StackPlanner::circulate(self.registry.get(window), window, place) {
            self.conn.apply(&command);
        }
    }

    fn handle_map(
        &mut self,
        window: Window,
        override_redirect: bool,
    ) {
        debug!("MAP for window {:#0x}", window);

        match self.registry.get(window) {
            Some(client) if client.consume_map_if_expecting() => {
                debug!("ignoring map caused by reparenting window {:#0x}", window);
            },
            Some(_) if !override_redirect && self.focus.focuses_new_windows() => {
                self.focus
                    .request_focus(self.conn, &self.registry, self.login, window);
            },
            _ => {},
        }
    }

    fn handle_unmap(
        &mut self,
        window: Window,
    ) {
        debug!("UNMAP for window {:#0x}", window);

        let commands = match self.registry.get(window) {
            Some(client) if client.consume_unmap_if_expecting() => {
                debug!("ignoring unmap caused by reparenting window {:#0x}", window);
                return;
            },
            Some(client) => StackPlanner::withdraw(client),
            None => return,
        };

        self.conn.grab_server();

        for command in commands {
            self.conn.apply(&command);
        }

        self.conn.sync();
        self.remove_window(window);

        if self.login != Some(window) {
            self.focus
                .revert_to_login(self.conn, &self.registry, self.login);
        }

        self.conn.ungrab_server();
    }

    fn handle_destroy(
        &mut self,
        window: Window,
    ) {
        debug!("DESTROY for window {:#0x}", window);

        if !self.registry.contains(window) {
            return;
        }

        self.conn.grab_server();
        self.remove_window(window);

        if self.login != Some(window) {
            self.focus
                .revert_to_login(self.conn, &self.registry, self.login);
        }

        self.conn.ungrab_server();
    }

    fn handle_enter(
        &mut self,
        window: Window,
        root_rpos: Pos,
        time: u32,
        inferior: bool,
    ) {
        debug!("ENTER for window {:#0x}", window);

        self.track_crossing(window, root_rpos, time, inferior, Direction::In);

        if let Some(client) = self.registry.lookup_any(window) {
            let window = client.window();

            self.focus
                .request_focus(self.conn, &self.registry, self.login, window);
        }
    }

    fn handle_leave(
        &mut self,
        window: Window,
        root_rpos: Pos,
        time: u32,
        inferior: bool,
    ) {
        debug!("LEAVE for window {:#0x}", window);

        self.track_crossing(window, root_rpos, time, inferior, Direction::Out);
    }

    /// Feeds a pointer crossing over a border into the dwell gesture listener.
    fn track_crossing(
        &mut self,
        window: Window,
        root_rpos: Pos,
        time: u32,
        inferior: bool,
        direction: Direction,
    ) {
        if inferior {
            return;
        }

        let gestures = match self.gestures.as_mut() {
            Some(gestures) => gestures,
            None => return,
        };

        let is_border = self
            .registry
            .lookup_any(window)
            .map_or(false, |client| client.decoration() == Some(window));

        if !is_border {
            return;
        }

        if let Ok(frame) = self.conn.get_window_geometry(window) {
            let edge = GestureListener::classify(frame, root_rpos);
            let actions = gestures.on_crossing(edge, direction, time);

            GestureListener::run_actions(&actions);
        }
    }

    fn handle_property(
        &mut self,
        window: Window,
        kind: PropertyKind,
    ) {
        debug!("PROPERTY {:?} for window {:#0x}", kind, window);

        match kind {
            PropertyKind::Strut => {
                if let Some(widths) = self.conn.get_window_strut(window) {
                    self.struts.update(window, widths);
                }

                self.constrain_all();
            },
        }
    }

    /// Pulls every border back inside the screen after the reserved edges changed.
    pub fn constrain_all(&self) {
        let full = self.screen.full_region();

        for client in self.registry.clients() {
            let area = self.struts.effective_area(full, Some(client.window()));

            Placement::constrain(self.conn, client, area);
            Decoration::follow_shadow(self.conn, client);
        }
    }

    /// The window that carries `window` on screen, and how far inside it the client sits.
    fn frame_of(
        &self,
        window: Window,
    ) -> (Window, i32) {
        match self.registry.lookup_any(window) {
            Some(client) if client.decoration().is_some() => (client.outer(), Decoration::INSET),
            Some(client) => (client.outer(), 0),
            None => (window, 0),
        }
    }

    /// Where a window is on screen, in root coordinates of the client itself.
    pub fn window_position(
        &self,
        window: Window,
    ) -> Option<Pos> {
        let (frame, inset) = self.frame_of(window);

        let trap = ErrorTrap::new(self.conn);
        let pos = self
            .conn
            .get_window_geometry(frame)
            .ok()
            .map(|region| Pos {
                x: region.pos.x + inset,
                y: region.pos.y + inset,
            });

        if trap.release() {
            None
        } else {
            pos
        }
    }

    /// Moves a window so that the client lands at `pos`; a border and shadow follow along.
    pub fn move_window(
        &self,
        window: Window,
        pos: Pos,
    ) {
        let (_, inset) = self.frame_of(window);

        self.move_frame(window, Pos {
            x: pos.x - inset,
            y: pos.y - inset,
        });
    }

    fn move_frame(
        &self,
        window: Window,
        pos: Pos,
    ) {
        let trap = ErrorTrap::new(self.conn);

        match self.registry.lookup_any(window) {
            Some(client) => {
                self.conn.move_window(client.outer(), pos);
                Decoration::follow_shadow(self.conn, client);
            },
            None => self.conn.move_window(window, pos),
        }

        self.conn.sync();
        trap.release();
    }

    /// Centers any window, managed or not, on the selected monitor.
    pub fn center_window(
        &self,
        window: Window,
    ) {
        let (frame, _) = self.frame_of(window);

        let trap = ErrorTrap::new(self.conn);
        let geometry = self.conn.get_window_geometry(frame);
        trap.release();

        if let Ok(geometry) = geometry {
            let region = geometry.centered_in(self.screen.selected_region());
            self.move_frame(window, region.pos);
        }
    }

    pub fn center_pointer(&self) {
        self.conn.warp_pointer(self.screen.pointer_home());
    }

    pub fn push_suppress_login(&mut self) {
        self.focus.push_suppress_login();
    }

    pub fn pop_suppress_login(&mut self) {
        self.focus
            .pop_suppress_login(self.conn, &self.registry, self.login);
    }

    /// Records the stacking order of managed windows on the root window.
    pub fn save_order(&self) {
        self.conn.sync();

        let trap = ErrorTrap::new(self.conn);
        self.conn.grab_server();

        let order = WindowOrder::capture(
            &self.conn.top_level_windows(),
            &self.registry,
            self.login,
        );

        info!("saving order of {} windows", order.len());
        self.conn.set_window_order(&order);

        self.conn.ungrab_server();
        trap.release();
    }

    /// Restacks managed windows from a saved order; the topmost one is focused on the next idle turn.
    pub fn restore_order(&mut self) {
        self.conn.sync();
        self.process_events();

        let trap = ErrorTrap::new(self.conn);
        self.conn.grab_server();

        let mut focus = None;

        if let Some(order) = self.conn.get_window_order() {
            let clients = WindowOrder::resolve(&order, &self.registry, self.login);
            info!("restoring order of {} windows", clients.len());

            for command in WindowOrder::plan_restore(&clients) {
                self.conn.apply(&command);
            }

            focus = clients.last().map(|client| client.window());
        }

        self.conn.ungrab_server();
        trap.release();

        self.process_events();

        if let Some(window) = focus {
            self.idle.push_back(IdleTask::Focus(window));
        }
    }

    #[inline]
    pub fn has_idle_work(&self) -> bool {
        !self.idle.is_empty()
    }

    /// Runs the tasks queued before this turn; tasks they queue wait for the next one.
    pub fn run_idle(&mut self) {
        for _ in 0..self.idle.len() {
            match self.idle.pop_front() {
                Some(IdleTask::Focus(window)) => {
                    self.focus.set_focus_new_windows(true);
                    self.focus
                        .request_focus(self.conn, &self.registry, self.login, window);
                },
                None => break,
            }
        }
    }

    /// Hands every client back to the root at its origin.
    pub fn release_all(&mut self) {
        info!("releasing {} windows", self.registry.len());

        let trap = ErrorTrap::new(self.conn);
        self.conn.grab_server();

        for window in self.registry.windows() {
            if let Some(client) = self.registry.remove(window) {
                if client.decoration().is_some() {
                    self.conn.unparent_window(window, client.origin());
                }

                self.conn.remove_window_from_save_set(window);
                Decoration::undecorate(self.conn, &client);
            }
        }

        self.conn.ungrab_server();
        self.conn.sync();
        trap.release();
    }
}

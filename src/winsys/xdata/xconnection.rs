use crate::command::StackMode;
use crate::command::WindowChanges;
use crate::connection::Connection;
use crate::event::CirculatePlace;
use crate::event::Event;
use crate::event::PropertyKind;
use crate::geometry::Pos;
use crate::geometry::Region;
use crate::hints::Hints;
use crate::hints::MotifHints;
use crate::hints::strut_from_raw;
use crate::hints::SizeHints;
use crate::hints::WmClass;
use crate::screen::Monitor;
use crate::trap::TrapState;
use crate::window::Protocol;
use crate::window::Window;
use crate::window::WindowAttributes;
use crate::xdata::property;
use crate::xdata::property::PropertyError;
use crate::Result;

use std::cell::RefCell;
use std::collections::VecDeque;

use x11rb::connection;
use x11rb::errors::ReplyError;
use x11rb::protocol::randr;
use x11rb::protocol::xproto;
use x11rb::protocol::xproto::ConnectionExt;
use x11rb::protocol::xproto::EventMask;
use x11rb::protocol::ErrorKind;
use x11rb::protocol::Event as XEvent;
use x11rb::wrapper::ConnectionExt as _;
use x11rb::x11_utils::X11Error;

use anyhow::anyhow;
use log::debug;
use log::warn;

type Atom = u32;

x11rb::atom_manager! {
    pub Atoms: AtomsCookie {
        ATOM,
        CARDINAL,
        STRING,
        COMPOUND_TEXT,

        // ICCCM client properties
        WM_CLASS,
        WM_HINTS,
        WM_NORMAL_HINTS,
        WM_SIZE_HINTS,
        WM_PROTOCOLS,
        WM_TAKE_FOCUS,

        // ICCCM window manager properties
        WM_STATE,

        // EWMH and Motif application properties
        _NET_WM_STRUT,
        _MOTIF_WM_HINTS,

        // stacking order hand-off
        MDMWM_WINDOW_ORDER,
    }
}

pub struct XConnection<'conn, Conn: connection::Connection> {
    conn: &'conn Conn,
    atoms: Atoms,
    screen: xproto::Screen,
    trap: TrapState,
    pending: RefCell<VecDeque<XEvent>>,
    border_event_mask: EventMask,
}

impl<'conn, Conn: connection::Connection> XConnection<'conn, Conn> {
    pub fn new(
        conn: &'conn Conn,
        screen_num: usize,
    ) -> Result<Self> {
        let screen = conn
            .setup()
            .roots
            .get(screen_num)
            .cloned()
            .ok_or_else(|| anyhow!("screen {} does not exist", screen_num))?;

        let aux = xproto::ChangeWindowAttributesAux::default()
            .event_mask(EventMask::SUBSTRUCTURE_REDIRECT | EventMask::SUBSTRUCTURE_NOTIFY);

        let res = conn.change_window_attributes(screen.root, &aux)?.check();
        if let Err(ReplyError::X11Error(err)) = res {
            if err.error_kind == ErrorKind::Access {
                return Err(anyhow!("another window manager is already running"));
            } else {
                return Err(anyhow!("unable to select events on the root window"));
            }
        }

        let atoms = Atoms::new(conn)?.reply()?;

        Ok(Self {
            conn,
            atoms,
            screen,
            trap: TrapState::new(),
            pending: RefCell::new(VecDeque::new()),
            border_event_mask: EventMask::ENTER_WINDOW
                | EventMask::LEAVE_WINDOW
                | EventMask::PROPERTY_CHANGE
                | EventMask::SUBSTRUCTURE_NOTIFY
                | EventMask::SUBSTRUCTURE_REDIRECT,
        })
    }

    #[inline]
    fn on_error(
        &self,
        error: &X11Error,
    ) {
        if self.trap.record_error() {
            debug!(
                "trapped {:?} error on resource {:#0x} (request {})",
                error.error_kind, error.bad_value, error.major_opcode
            );
        } else {
            warn!(
                "untrapped {:?} error on resource {:#0x} (request {})",
                error.error_kind, error.bad_value, error.major_opcode
            );
        }
    }

    #[inline]
    fn reply<R>(
        &self,
        request: impl FnOnce() -> std::result::Result<R, ReplyError>,
    ) -> Option<R> {
        match request() {
            Ok(reply) => Some(reply),
            Err(ReplyError::X11Error(err)) => {
                self.on_error(&err);
                None
            },
            Err(ReplyError::ConnectionError(err)) => {
                warn!("lost request to the display: {}", err);
                None
            },
        }
    }

    /// Moves everything the server has sent into the pending queue, absorbing errors.
    fn drain(&self) {
        while let Ok(Some(event)) = self.conn.poll_for_event() {
            match event {
                XEvent::Error(err) => self.on_error(&err),
                event => self.pending.borrow_mut().push_back(event),
            }
        }
    }

    fn read_property(
        &self,
        window: Window,
        property: Atom,
        type_: Atom,
        format: u8,
    ) -> Option<xproto::GetPropertyReply> {
        let reply = self.reply(|| {
            Ok(self
                .conn
                .get_property(
                    false,
                    window,
                    property,
                    type_,
                    0,
                    property::MAX_PROPERTY_BYTES / 4,
                )?
                .reply()?)
        })?;

        match property::validate(type_, format, reply.type_, reply.format, reply.bytes_after) {
            Ok(()) => Some(reply),
            Err(PropertyError::Missing) => None,
            Err(err) => {
                debug!(
                    "discarding property {} of window {:#0x}: {}",
                    property, window, err
                );
                None
            },
        }
    }

    #[inline]
    fn read_property32(
        &self,
        window: Window,
        property: Atom,
        type_: Atom,
    ) -> Option<Vec<u32>> {
        self.read_property(window, property, type_, 32)
            .and_then(|reply| reply.value32().map(|values| values.collect()))
    }

    #[inline]
    fn read_property8(
        &self,
        window: Window,
        property: Atom,
        type_: Atom,
    ) -> Option<Vec<u8>> {
        self.read_property(window, property, type_, 8)
            .map(|reply| reply.value)
    }

    #[inline]
    fn get_atom_from_protocol(
        &self,
        protocol: Protocol,
    ) -> Atom {
        match protocol {
            Protocol::TakeFocus => self.atoms.WM_TAKE_FOCUS,
        }
    }

    #[inline]
    fn xstack_mode(mode: StackMode) -> xproto::StackMode {
        match mode {
            StackMode::Above => xproto::StackMode::ABOVE,
            StackMode::Below => xproto::StackMode::BELOW,
            StackMode::TopIf => xproto::StackMode::TOP_IF,
            StackMode::BottomIf => xproto::StackMode::BOTTOM_IF,
            StackMode::Opposite => xproto::StackMode::OPPOSITE,
        }
    }

    #[inline]
    fn stack_mode(mode: xproto::StackMode) -> StackMode {
        match mode {
            xproto::StackMode::BELOW => StackMode::Below,
            xproto::StackMode::TOP_IF => StackMode::TopIf,
            xproto::StackMode::BOTTOM_IF => StackMode::BottomIf,
            xproto::StackMode::OPPOSITE => StackMode::Opposite,
            _ => StackMode::Above,
        }
    }

    #[inline]
    fn on_map_request(
        &self,
        event: &xproto::MapRequestEvent,
    ) -> Option<Event> {
        Some(Event::MapRequest {
            window: event.window,
            parent: event.parent,
        })
    }

    #[inline]
    fn on_configure_request(
        &self,
        event: &xproto::ConfigureRequestEvent,
    ) -> Option<Event> {
        let mask = u16::from(event.value_mask);
        let has = |flag: xproto::ConfigWindow| mask & u16::from(flag) != 0;

        let changes = WindowChanges {
            x: Some(event.x as i32).filter(|_| has(xproto::ConfigWindow::X)),
            y: Some(event.y as i32).filter(|_| has(xproto::ConfigWindow::Y)),
            width: Some(event.width as u32).filter(|_| has(xproto::ConfigWindow::WIDTH)),
            height: Some(event.height as u32).filter(|_| has(xproto::ConfigWindow::HEIGHT)),
            border_width: Some(event.border_width as u32)
                .filter(|_| has(xproto::ConfigWindow::BORDER_WIDTH)),
            sibling: Some(event.sibling).filter(|_| has(xproto::ConfigWindow::SIBLING)),
            stack_mode: Some(Self::stack_mode(event.stack_mode))
                .filter(|_| has(xproto::ConfigWindow::STACK_MODE)),
        };

        Some(Event::ConfigureRequest {
            window: event.window,
            changes,
        })
    }

    #[inline]
    fn on_circulate_request(
        &self,
        event: &xproto::CirculateRequestEvent,
    ) -> Option<Event> {
        Some(Event::CirculateRequest {
            window: event.window,
            place: if event.place == xproto::Place::ON_TOP {
                CirculatePlace::OnTop
            } else {
                CirculatePlace::OnBottom
            },
        })
    }

    #[inline]
    fn on_map_notify(
        &self,
        event: &xproto::MapNotifyEvent,
    ) -> Option<Event> {
        Some(Event::Map {
            window: event.window,
            override_redirect: event.override_redirect,
        })
    }

    #[inline]
    fn on_unmap_notify(
        &self,
        event: &xproto::UnmapNotifyEvent,
    ) -> Option<Event> {
        Some(Event::Unmap {
            window: event.window,
        })
    }

    #[inline]
    fn on_destroy_notify(
        &self,
        event: &xproto::DestroyNotifyEvent,
    ) -> Option<Event> {
        Some(Event::Destroy {
            window: event.window,
        })
    }

    #[inline]
    fn on_enter_notify(
        &self,
        event: &xproto::EnterNotifyEvent,
    ) -> Option<Event> {
        Some(Event::Enter {
            window: event.event,
            root_rpos: Pos {
                x: event.root_x as i32,
                y: event.root_y as i32,
            },
            time: event.time,
            inferior: event.detail == xproto::NotifyDetail::INFERIOR,
        })
    }

    #[inline]
    fn on_leave_notify(
        &self,
        event: &xproto::LeaveNotifyEvent,
    ) -> Option<Event> {
        Some(Event::Leave {
            window: event.event,
            root_rpos: Pos {
                x: event.root_x as i32,
                y: event.root_y as i32,
            },
            time: event.time,
            inferior: event.detail == xproto::NotifyDetail::INFERIOR,
        })
    }

    #[inline]
    fn on_property_notify(
        &self,
        event: &xproto::PropertyNotifyEvent,
    ) -> Option<Event> {
        if event.atom == self.atoms._NET_WM_STRUT {
            return Some(Event::Property {
                window: event.window,
                kind: PropertyKind::Strut,
            });
        }

        None
    }
}

impl<'conn, Conn: connection::Connection> Connection for XConnection<'conn, Conn> {
    #[inline]
    fn root(&self) -> Window {
        self.screen.root
    }

    #[inline]
    fn flush(&self) -> bool {
        self.conn.flush().is_ok()
    }

    #[inline]
    fn sync(&self) -> bool {
        let synced = self.conn.sync().is_ok();
        self.drain();
        synced
    }

    fn poll_event(&self) -> Option<Event> {
        loop {
            let queued = self.pending.borrow_mut().pop_front();
            let event = match queued {
                Some(event) => event,
                None => match self.conn.poll_for_event() {
                    Ok(Some(event)) => event,
                    _ => return None,
                },
            };

            let event = match event {
                XEvent::Error(err) => {
                    self.on_error(&err);
                    None
                },
                XEvent::MapRequest(e) => self.on_map_request(&e),
                XEvent::ConfigureRequest(e) => self.on_configure_request(&e),
                XEvent::CirculateRequest(e) => self.on_circulate_request(&e),
                XEvent::MapNotify(e) => self.on_map_notify(&e),
                XEvent::UnmapNotify(e) => self.on_unmap_notify(&e),
                XEvent::DestroyNotify(e) => self.on_destroy_notify(&e),
                XEvent::EnterNotify(e) => self.on_enter_notify(&e),
                XEvent::LeaveNotify(e) => self.on_leave_notify(&e),
                XEvent::PropertyNotify(e) => self.on_property_notify(&e),
                _ => None,
            };

            if event.is_some() {
                return event;
            }
        }
    }

    #[inline]
    fn screen_region(&self) -> Region {
        Region::new(
            0,
            0,
            self.screen.width_in_pixels as i32,
            self.screen.height_in_pixels as i32,
        )
    }

    fn connected_outputs(&self) -> Vec<Monitor> {
        let root = self.screen.root;

        let primary = randr::get_output_primary(self.conn, root)
            .ok()
            .and_then(|cookie| cookie.reply().ok())
            .map(|reply| reply.output);

        let resources = match randr::get_screen_resources_current(self.conn, root)
            .ok()
            .and_then(|cookie| cookie.reply().ok())
        {
            Some(resources) => resources,
            None => return Vec::with_capacity(0),
        };

        let timestamp = resources.config_timestamp;

        resources
            .outputs
            .iter()
            .filter_map(|&output| {
                let info = randr::get_output_info(self.conn, output, timestamp)
                    .ok()?
                    .reply()
                    .ok()?;

                if info.connection != randr::Connection::CONNECTED || info.crtc == x11rb::NONE {
                    return None;
                }

                let crtc = randr::get_crtc_info(self.conn, info.crtc, timestamp)
                    .ok()?
                    .reply()
                    .ok()?;

                Some(Monitor::new(
                    String::from_utf8_lossy(&info.name),
                    Region::new(
                        crtc.x as i32,
                        crtc.y as i32,
                        crtc.width as i32,
                        crtc.height as i32,
                    ),
                    primary == Some(output),
                ))
            })
            .filter(|monitor| monitor.region.dim.w > 0 && monitor.region.dim.h > 0)
            .collect()
    }

    fn top_level_windows(&self) -> Vec<Window> {
        self.reply(|| Ok(self.conn.query_tree(self.screen.root)?.reply()?))
            .map_or(Vec::with_capacity(0), |reply| reply.children)
    }

    #[inline]
    fn trap_enter(&self) {
        self.trap.enter();
    }

    #[inline]
    fn trap_leave(&self) -> bool {
        if self.trap.depth() == 1 {
            self.sync();
        }

        self.trap.leave()
    }

    #[inline]
    fn grab_server(&self) {
        drop(self.conn.grab_server());
    }

    #[inline]
    fn ungrab_server(&self) {
        drop(self.conn.ungrab_server());
    }

    fn create_border(
        &self,
        region: Region,
    ) -> Result<Window> {
        let window = self.conn.generate_id()?;

        self.conn.create_window(
            x11rb::COPY_DEPTH_FROM_PARENT,
            window,
            self.screen.root,
            region.pos.x as i16,
            region.pos.y as i16,
            region.dim.w.max(1) as u16,
            region.dim.h.max(1) as u16,
            0,
            xproto::WindowClass::INPUT_OUTPUT,
            x11rb::COPY_FROM_PARENT,
            &xproto::CreateWindowAux::default()
                .background_pixel(self.screen.black_pixel)
                .border_pixel(self.screen.black_pixel),
        )?;

        Ok(window)
    }

    #[inline]
    fn init_client(
        &self,
        window: Window,
    ) {
        let current = self
            .reply(|| Ok(self.conn.get_window_attributes(window)?.reply()?))
            .map_or(EventMask::NO_EVENT, |reply| reply.your_event_mask);

        drop(self.conn.change_window_attributes(
            window,
            &xproto::ChangeWindowAttributesAux::default()
                .event_mask(current | EventMask::PROPERTY_CHANGE),
        ));
    }

    #[inline]
    fn init_border(
        &self,
        window: Window,
    ) {
        drop(self.conn.change_window_attributes(
            window,
            &xproto::ChangeWindowAttributesAux::default().event_mask(self.border_event_mask),
        ));
    }

    #[inline]
    fn map_window(
        &self,
        window: Window,
    ) {
        drop(self.conn.map_window(window));
    }

    #[inline]
    fn unmap_window(
        &self,
        window: Window,
    ) {
        drop(self.conn.unmap_window(window));
    }

    #[inline]
    fn reparent_window(
        &self,
        window: Window,
        parent: Window,
        pos: Pos,
    ) {
        drop(
            self.conn
                .reparent_window(window, parent, pos.x as i16, pos.y as i16),
        );
    }

    #[inline]
    fn unparent_window(
        &self,
        window: Window,
        pos: Pos,
    ) {
        self.reparent_window(window, self.screen.root, pos);
    }

    #[inline]
    fn destroy_window(
        &self,
        window: Window,
    ) {
        drop(self.conn.destroy_window(window));
    }

    #[inline]
    fn place_window(
        &self,
        window: Window,
        region: &Region,
    ) {
        self.configure_window(window, &WindowChanges::from_region(*region));
    }

    #[inline]
    fn move_window(
        &self,
        window: Window,
        pos: Pos,
    ) {
        drop(self.conn.configure_window(
            window,
            &xproto::ConfigureWindowAux::default().x(pos.x).y(pos.y),
        ));
    }

    #[inline]
    fn configure_window(
        &self,
        window: Window,
        changes: &WindowChanges,
    ) {
        drop(
            self.conn.configure_window(
                window,
                &xproto::ConfigureWindowAux::default()
                    .x(changes.x)
                    .y(changes.y)
                    .width(changes.width)
                    .height(changes.height)
                    .border_width(changes.border_width)
                    .sibling(changes.sibling)
                    .stack_mode(changes.stack_mode.map(Self::xstack_mode)),
            ),
        );
    }

    #[inline]
    fn raise_window(
        &self,
        window: Window,
    ) {
        drop(self.conn.configure_window(
            window,
            &xproto::ConfigureWindowAux::default().stack_mode(xproto::StackMode::ABOVE),
        ));
    }

    #[inline]
    fn lower_window(
        &self,
        window: Window,
    ) {
        drop(self.conn.configure_window(
            window,
            &xproto::ConfigureWindowAux::default().stack_mode(xproto::StackMode::BELOW),
        ));
    }

    #[inline]
    fn focus_window(
        &self,
        window: Window,
    ) {
        drop(self.conn.set_input_focus(
            xproto::InputFocus::POINTER_ROOT,
            window,
            x11rb::CURRENT_TIME,
        ));
    }

    #[inline]
    fn warp_pointer(
        &self,
        pos: Pos,
    ) {
        drop(self.conn.warp_pointer(
            x11rb::NONE,
            self.screen.root,
            0,
            0,
            0,
            0,
            pos.x as i16,
            pos.y as i16,
        ));
    }

    #[inline]
    fn insert_window_in_save_set(
        &self,
        window: Window,
    ) {
        drop(self.conn.change_save_set(xproto::SetMode::INSERT, window));
    }

    #[inline]
    fn remove_window_from_save_set(
        &self,
        window: Window,
    ) {
        drop(self.conn.change_save_set(xproto::SetMode::DELETE, window));
    }

    #[inline]
    fn get_window_attributes(
        &self,
        window: Window,
    ) -> Option<WindowAttributes> {
        self.reply(|| Ok(self.conn.get_window_attributes(window)?.reply()?))
            .map(|reply| WindowAttributes {
                mapped: reply.map_state != xproto::MapState::UNMAPPED,
                override_redirect: reply.override_redirect,
            })
    }

    #[inline]
    fn get_window_geometry(
        &self,
        window: Window,
    ) -> Result<Region> {
        self.reply(|| Ok(self.conn.get_geometry(window)?.reply()?))
            .map(|reply| {
                Region::new(
                    reply.x as i32,
                    reply.y as i32,
                    reply.width as i32,
                    reply.height as i32,
                )
            })
            .ok_or_else(|| anyhow!("could not obtain geometry of window {:#0x}", window))
    }

    #[inline]
    fn get_window_border_width(
        &self,
        window: Window,
    ) -> u32 {
        self.reply(|| Ok(self.conn.get_geometry(window)?.reply()?))
            .map_or(0, |reply| reply.border_width as u32)
    }

    fn window_has_protocol(
        &self,
        window: Window,
        protocol: Protocol,
    ) -> bool {
        let atom = self.get_atom_from_protocol(protocol);

        // some clients write WM_PROTOCOLS with itself as the type
        self.read_property32(window, self.atoms.WM_PROTOCOLS, self.atoms.ATOM)
            .or_else(|| {
                self.read_property32(window, self.atoms.WM_PROTOCOLS, self.atoms.WM_PROTOCOLS)
            })
            .map_or(false, |protocols| protocols.contains(&atom))
    }

    #[inline]
    fn send_take_focus(
        &self,
        window: Window,
    ) {
        let event = xproto::ClientMessageEvent::new(32, window, self.atoms.WM_PROTOCOLS, [
            self.atoms.WM_TAKE_FOCUS,
            x11rb::CURRENT_TIME,
            0,
            0,
            0,
        ]);

        drop(
            self.conn
                .send_event(false, window, EventMask::NO_EVENT, event),
        );
    }

    #[inline]
    fn get_icccm_window_class(
        &self,
        window: Window,
    ) -> Option<WmClass> {
        self.read_property8(window, self.atoms.WM_CLASS, self.atoms.STRING)
            .and_then(|raw| WmClass::from_raw(&raw))
    }

    #[inline]
    fn get_icccm_window_hints(
        &self,
        window: Window,
    ) -> Option<Hints> {
        self.read_property32(window, self.atoms.WM_HINTS, self.atoms.WM_HINTS)
            .and_then(|raw| Hints::from_raw(&raw))
    }

    #[inline]
    fn get_icccm_window_size_hints(
        &self,
        window: Window,
    ) -> Option<SizeHints> {
        self.read_property32(window, self.atoms.WM_NORMAL_HINTS, self.atoms.WM_SIZE_HINTS)
            .and_then(|raw| SizeHints::from_raw(&raw))
    }

    fn force_user_specified_geometry(
        &self,
        window: Window,
    ) {
        let raw = SizeHints::force_user_specified(self.read_property32(
            window,
            self.atoms.WM_NORMAL_HINTS,
            self.atoms.WM_SIZE_HINTS,
        ));

        drop(self.conn.change_property32(
            xproto::PropMode::REPLACE,
            window,
            self.atoms.WM_NORMAL_HINTS,
            self.atoms.WM_SIZE_HINTS,
            &raw,
        ));
    }

    #[inline]
    fn delete_icccm_window_state(
        &self,
        window: Window,
    ) {
        drop(self.conn.delete_property(window, self.atoms.WM_STATE));
    }

    #[inline]
    fn get_motif_hints(
        &self,
        window: Window,
    ) -> Option<MotifHints> {
        self.read_property32(
            window,
            self.atoms._MOTIF_WM_HINTS,
            property::ANY_PROPERTY_TYPE,
        )
        .and_then(|raw| MotifHints::from_raw(&raw))
    }

    fn get_window_strut(
        &self,
        window: Window,
    ) -> Option<[u32; 4]> {
        let raw = self.read_property32(window, self.atoms._NET_WM_STRUT, self.atoms.CARDINAL)?;
        let widths = strut_from_raw(&raw);

        if widths.is_none() {
            debug!(
                "ignoring strut of window {:#0x} with {} values",
                window,
                raw.len()
            );
        }

        widths
    }

    #[inline]
    fn get_window_order(&self) -> Option<Vec<Window>> {
        self.read_property32(
            self.screen.root,
            self.atoms.MDMWM_WINDOW_ORDER,
            self.atoms.CARDINAL,
        )
    }

    #[inline]
    fn set_window_order(
        &self,
        order: &[Window],
    ) {
        drop(self.conn.change_property32(
            xproto::PropMode::REPLACE,
            self.screen.root,
            self.atoms.MDMWM_WINDOW_ORDER,
            self.atoms.CARDINAL,
            order,
        ));
    }
}

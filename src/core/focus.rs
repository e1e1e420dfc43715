use crate::registry::Registry;

use winsys::connection::Connection;
use winsys::trap::ErrorTrap;
use winsys::window::Protocol;
use winsys::window::Window;

/// Restrictive focus policy around a privileged login window.
pub struct FocusController {
    focused: Option<Window>,
    focus_new_windows: bool,
    suppress_login_depth: u32,
}

impl FocusController {
    pub fn new(focus_new_windows: bool) -> Self {
        Self {
            focused: None,
            focus_new_windows,
            suppress_login_depth: 0,
        }
    }

    #[inline]
    pub fn focused(&self) -> Option<Window> {
        self.focused
    }

    #[inline]
    pub fn focuses_new_windows(&self) -> bool {
        self.focus_new_windows
    }

    #[inline]
    pub fn set_focus_new_windows(
        &mut self,
        focus_new_windows: bool,
    ) {
        self.focus_new_windows = focus_new_windows;
    }

    #[inline]
    pub fn is_suppressing_login(&self) -> bool {
        self.suppress_login_depth > 0
    }

    /// Forgets the focused window if it is `window`.
    #[inline]
    pub fn forget(
        &mut self,
        window: Window,
    ) {
        if self.focused == Some(window) {
            self.focused = None;
        }
    }

    /// Gives input focus to `window` if policy permits and it is still mapped.
    pub fn request_focus(
        &mut self,
        conn: &dyn Connection,
        registry: &Registry,
        login: Option<Window>,
        window: Window,
    ) -> bool {
        if self.is_suppressing_login() && login == Some(window) {
            debug!("login window focus suppressed");
            return false;
        }

        if let Some(client) = registry.lookup_any(window) {
            if !client.accepts_focus() {
                return false;
            }
        }

        let trap = ErrorTrap::new(conn);

        if !conn
            .get_window_attributes(window)
            .map_or(false, |attributes| attributes.mapped)
        {
            trap.release();
            return false;
        }

        if conn.window_has_protocol(window, Protocol::TakeFocus) {
            conn.send_take_focus(window);
            conn.sync();
        }

        conn.focus_window(window);

        if trap.release() {
            debug!("window {:#0x} vanished while being focused", window);
            return false;
        }

        self.focused = Some(window);
        true
    }

    pub fn push_suppress_login(&mut self) {
        self.focus_new_windows = true;
        self.suppress_login_depth += 1;
    }

    pub fn pop_suppress_login(
        &mut self,
        conn: &dyn Connection,
        registry: &Registry,
        login: Option<Window>,
    ) {
        if self.suppress_login_depth == 0 {
            return;
        }

        self.suppress_login_depth -= 1;

        if self.suppress_login_depth == 0 && self.focused.is_none() {
            if let Some(login) = login {
                self.request_focus(conn, registry, Some(login), login);
            }
        }
    }

    pub fn revert_to_login(
        &mut self,
        conn: &dyn Connection,
        registry: &Registry,
        login: Option<Window>,
    ) {
        if let Some(login) = login {
            self.request_focus(conn, registry, Some(login), login);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Client;
    use crate::fake::Call;
    use crate::fake::FakeConnection;

    use winsys::geometry::Region;

    fn mapped_window(conn: &FakeConnection) -> Window {
        let window = conn.add_window(Region::new(0, 0, 100, 100));
        conn.map(window);
        window
    }

    #[test]
    fn nested_suppression_blocks_login_until_last_pop() {
        let conn = FakeConnection::new(1000, 800);
        let registry = Registry::new();
        let login = mapped_window(&conn);
        let mut focus = FocusController::new(false);

        focus.push_suppress_login();
        focus.push_suppress_login();
        assert!(focus.focuses_new_windows());

        focus.pop_suppress_login(&conn, &registry, Some(login));
        assert!(!focus.request_focus(&conn, &registry, Some(login), login));
        assert_eq!(conn.focused(), None);

        focus.pop_suppress_login(&conn, &registry, Some(login));
        assert_eq!(focus.focused(), Some(login));
        assert_eq!(conn.focused(), Some(login));
    }

    #[test]
    fn last_pop_keeps_existing_focus() {
        let conn = FakeConnection::new(1000, 800);
        let registry = Registry::new();
        let login = mapped_window(&conn);
        let dialog = mapped_window(&conn);
        let mut focus = FocusController::new(false);

        focus.push_suppress_login();
        assert!(focus.request_focus(&conn, &registry, Some(login), dialog));
        focus.pop_suppress_login(&conn, &registry, Some(login));

        assert_eq!(focus.focused(), Some(dialog));
    }

    #[test]
    fn refuses_windows_that_decline_focus() {
        let conn = FakeConnection::new(1000, 800);
        let mut registry = Registry::new();
        let window = mapped_window(&conn);
        registry.insert(Client::new(window, false)).set_accepts_focus(false);
        let mut focus = FocusController::new(false);

        assert!(!focus.request_focus(&conn, &registry, None, window));
        assert_eq!(focus.focused(), None);
    }

    #[test]
    fn unmapped_window_is_not_focused() {
        let conn = FakeConnection::new(1000, 800);
        let registry = Registry::new();
        let window = conn.add_window(Region::new(0, 0, 100, 100));
        let mut focus = FocusController::new(false);

        assert!(!focus.request_focus(&conn, &registry, None, window));
        assert!(!conn.calls().contains(&Call::Focus(window)));
    }

    #[test]
    fn take_focus_is_sent_before_focusing() {
        let conn = FakeConnection::new(1000, 800);
        let registry = Registry::new();
        let window = mapped_window(&conn);
        conn.set_protocols(window, vec![Protocol::TakeFocus]);
        let mut focus = FocusController::new(false);

        assert!(focus.request_focus(&conn, &registry, None, window));

        let calls = conn.calls();
        let take_focus = calls.iter().position(|call| *call == Call::TakeFocus(window));
        let set_focus = calls.iter().position(|call| *call == Call::Focus(window));
        assert!(take_focus.is_some());
        assert!(take_focus < set_focus);
    }

    #[test]
    fn forgetting_only_clears_matching_window() {
        let conn = FakeConnection::new(1000, 800);
        let registry = Registry::new();
        let window = mapped_window(&conn);
        let mut focus = FocusController::new(false);
        focus.request_focus(&conn, &registry, None, window);

        focus.forget(window + 1);
        assert_eq!(focus.focused(), Some(window));
        focus.forget(window);
        assert_eq!(focus.focused(), None);
    }
}

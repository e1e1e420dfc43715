use crate::client::Client;
use crate::registry::Registry;
use crate::stack::StackPlanner;

use winsys::command::Command;
use winsys::window::Window;

/// Stacking order persisted on the root window across a session hand-off.
pub struct WindowOrder {}

impl WindowOrder {
    /// Stands in for the login window, whose id does not survive a restart.
    pub const LOGIN: Window = 0;

    /// Managed root children in server order, bottom to top, without shadows.
    pub fn capture(
        children: &[Window],
        registry: &Registry,
        login: Option<Window>,
    ) -> Vec<Window> {
        children
            .iter()
            .filter(|&&child| !registry.is_shadow(child))
            .filter_map(|&child| registry.lookup_any(child))
            .map(|client| {
                if Some(client.window()) == login {
                    Self::LOGIN
                } else {
                    client.window()
                }
            })
            .collect()
    }

    /// Resolves a stored order against the live registry, skipping stale entries.
    pub fn resolve<'r>(
        order: &[Window],
        registry: &'r Registry,
        login: Option<Window>,
    ) -> Vec<&'r Client> {
        order
            .iter()
            .filter_map(|&window| {
                if window == Self::LOGIN {
                    login.and_then(|login| registry.lookup_any(login))
                } else {
                    registry.lookup_any(window)
                }
            })
            .collect()
    }

    /// Raises every resolved client in stored order, so the last one ends up on top.
    pub fn plan_restore(clients: &[&Client]) -> Vec<Command> {
        clients
            .iter()
            .flat_map(|client| StackPlanner::raise(client))
            .collect()
    }
}

use crate::client::Client;
use crate::decoration::Decoration;

use winsys::command::Command;
use winsys::command::WindowChanges;
use winsys::event::CirculatePlace;
use winsys::window::Window;

/// Plans the protocol commands that keep a client, its border, and its shadow together.
pub struct StackPlanner {}

impl StackPlanner {
    /// Shadow first, so that the border ends up directly above it.
    pub fn raise(client: &Client) -> Vec<Command> {
        client
            .shadow()
            .map(Command::Raise)
            .into_iter()
            .chain(std::iter::once(Command::Raise(client.outer())))
            .collect()
    }

    pub fn lower(client: &Client) -> Vec<Command> {
        std::iter::once(Command::Lower(client.outer()))
            .chain(client.shadow().map(Command::Lower))
            .collect()
    }

    pub fn circulate(
        client: Option<&Client>,
        window: Window,
        place: CirculatePlace,
    ) -> Vec<Command> {
        match (client, place) {
            (Some(client), CirculatePlace::OnTop) => Self::raise(client),
            (Some(client), CirculatePlace::OnBottom) => Self::lower(client),
            (None, CirculatePlace::OnTop) => vec![Command::Raise(window)],
            (None, CirculatePlace::OnBottom) => vec![Command::Lower(window)],
        }
    }

    /// Splits a configure request between a client and its border.
    ///
    /// The client keeps its fixed offset inside the border; the border takes the
    /// requested position, the stacking request, and the size grown by the frame.
    pub fn configure(
        client: Option<&Client>,
        window: Window,
        changes: WindowChanges,
    ) -> Vec<Command> {
        let decoration = match client.and_then(Client::decoration) {
            Some(decoration) => decoration,
            None => return vec![Command::Configure(window, changes)],
        };

        let extra = (2 * Decoration::INSET) as u32 + 2 * changes.border_width.unwrap_or(0);

        let inner = WindowChanges {
            x: changes.x.map(|_| Decoration::INSET),
            y: changes.y.map(|_| Decoration::INSET),
            width: changes.width,
            height: changes.height,
            border_width: changes.border_width,
            sibling: None,
            stack_mode: None,
        };

        let outer = WindowChanges {
            x: changes.x,
            y: changes.y,
            width: changes.width.map(|w| w + extra),
            height: changes.height.map(|h| h + extra),
            border_width: changes.border_width.map(|_| 0),
            sibling: changes.sibling,
            stack_mode: changes.stack_mode,
        };

        vec![Command::Configure(window, inner), Command::Configure(decoration, outer)]
            .into_iter()
            .filter(|command| match command {
                Command::Configure(_, changes) => !changes.is_empty(),
                _ => true,
            })
            .collect()
    }

    /// Takes a client that hid itself out of its border and hands it back to the root.
    pub fn withdraw(client: &Client) -> Vec<Command> {
        let mut commands = Vec::with_capacity(4);

        if let Some(decoration) = client.decoration() {
            commands.push(Command::Unmap(decoration));
        }

        if let Some(shadow) = client.shadow() {
            commands.push(Command::Unmap(shadow));
        }

        if client.decoration().is_some() {
            commands.push(Command::Unparent(client.window(), client.origin()));
        }

        commands.push(Command::DeleteWmState(client.window()));
        commands
    }
}

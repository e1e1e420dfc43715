use crate::command::Command;
use crate::command::WindowChanges;
use crate::event::Event;
use crate::geometry::Pos;
use crate::geometry::Region;
use crate::hints::Hints;
use crate::hints::MotifHints;
use crate::hints::SizeHints;
use crate::hints::WmClass;
use crate::screen::Monitor;
use crate::window::Protocol;
use crate::window::Window;
use crate::window::WindowAttributes;
use crate::Result;

pub trait Connection {
    fn root(&self) -> Window;
    fn flush(&self) -> bool;
    fn sync(&self) -> bool;
    fn poll_event(&self) -> Option<Event>;
    fn screen_region(&self) -> Region;
    fn connected_outputs(&self) -> Vec<Monitor>;
    fn top_level_windows(&self) -> Vec<Window>;

    // Error trapping
    fn trap_enter(&self);
    fn trap_leave(&self) -> bool;

    fn grab_server(&self);
    fn ungrab_server(&self);

    // Window manipulation
    fn create_border(
        &self,
        region: Region,
    ) -> Result<Window>;
    fn init_client(
        &self,
        window: Window,
    );
    fn init_border(
        &self,
        window: Window,
    );
    fn map_window(
        &self,
        window: Window,
    );
    fn unmap_window(
        &self,
        window: Window,
    );
    fn reparent_window(
        &self,
        window: Window,
        parent: Window,
        pos: Pos,
    );
    fn unparent_window(
        &self,
        window: Window,
        pos: Pos,
    );
    fn destroy_window(
        &self,
        window: Window,
    );
    fn place_window(
        &self,
        window: Window,
        region: &Region,
    );
    fn move_window(
        &self,
        window: Window,
        pos: Pos,
    );
    fn configure_window(
        &self,
        window: Window,
        changes: &WindowChanges,
    );
    fn raise_window(
        &self,
        window: Window,
    );
    fn lower_window(
        &self,
        window: Window,
    );
    fn focus_window(
        &self,
        window: Window,
    );
    fn warp_pointer(
        &self,
        pos: Pos,
    );
    fn insert_window_in_save_set(
        &self,
        window: Window,
    );
    fn remove_window_from_save_set(
        &self,
        window: Window,
    );

    // Window state
    fn get_window_attributes(
        &self,
        window: Window,
    ) -> Option<WindowAttributes>;
    fn get_window_geometry(
        &self,
        window: Window,
    ) -> Result<Region>;
    fn get_window_border_width(
        &self,
        window: Window,
    ) -> u32;
    fn window_has_protocol(
        &self,
        window: Window,
        protocol: Protocol,
    ) -> bool;
    fn send_take_focus(
        &self,
        window: Window,
    );

    // ICCCM
    fn get_icccm_window_class(
        &self,
        window: Window,
    ) -> Option<WmClass>;
    fn get_icccm_window_hints(
        &self,
        window: Window,
    ) -> Option<Hints>;
    fn get_icccm_window_size_hints(
        &self,
        window: Window,
    ) -> Option<SizeHints>;
    fn force_user_specified_geometry(
        &self,
        window: Window,
    );
    fn delete_icccm_window_state(
        &self,
        window: Window,
    );

    // Motif, EWMH and private properties
    fn get_motif_hints(
        &self,
        window: Window,
    ) -> Option<MotifHints>;
    fn get_window_strut(
        &self,
        window: Window,
    ) -> Option<[u32; 4]>;
    fn get_window_order(&self) -> Option<Vec<Window>>;
    fn set_window_order(
        &self,
        order: &[Window],
    );

    fn apply(
        &self,
        command: &Command,
    ) {
        match *command {
            Command::Unmap(window) => self.unmap_window(window),
            Command::Raise(window) => self.raise_window(window),
            Command::Lower(window) => self.lower_window(window),
            Command::Configure(window, ref changes) => self.configure_window(window, changes),
            Command::Unparent(window, pos) => self.unparent_window(window, pos),
            Command::DeleteWmState(window) => self.delete_icccm_window_state(window),
        }
    }
}

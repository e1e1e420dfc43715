use winsys::window::Window;

use std::process::Command;
use std::process::Stdio;

pub struct Util {}

impl Util {
    pub fn spawn_shell<S: Into<String>>(cmd: S) -> bool {
        let cmd = cmd.into();

        Command::new("sh")
            .arg("-c")
            .arg(cmd)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .is_ok()
    }

    /// Parses a window id given either as `0x`-prefixed hex or as decimal.
    pub fn parse_window_id(id: &str) -> Result<Window, String> {
        let id = id.trim();

        let parsed = if let Some(hex) = id.strip_prefix("0x").or_else(|| id.strip_prefix("0X")) {
            Window::from_str_radix(hex, 16)
        } else {
            id.parse::<Window>()
        };

        parsed.map_err(|err| format!("invalid window id {:?}: {}", id, err))
    }
}

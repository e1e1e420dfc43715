#![deny(clippy::all)]
#![allow(dead_code)]

#[macro_use]
extern crate log;

use simplelog::LevelFilter;
use simplelog::SimpleLogger;

use clap::Parser;

use nix::errno::Errno;
use nix::poll::poll;
use nix::poll::PollFd;
use nix::poll::PollFlags;
use nix::sys::signal::SigSet;
use nix::sys::signal::Signal;
use nix::sys::signalfd::SfdFlags;
use nix::sys::signalfd::SignalFd;

use winsys::connection::Connection;
use winsys::screen::Screen;
use winsys::window::Window;
use winsys::xdata::xconnection::XConnection;
pub use winsys::Result;

use std::os::unix::io::AsRawFd;
use std::os::unix::io::RawFd;
use std::path::Path;
use std::path::PathBuf;

#[macro_use]
mod defaults;

mod client;
mod decoration;
mod focus;
mod gesture;
mod model;
mod order;
mod placement;
mod registry;
mod rule;
mod stack;
mod strut;
mod util;

#[cfg(test)]
mod fake;

use gesture::GestureListener;
use model::Model;
use util::Util;

#[derive(Parser, Debug)]
#[command(version, about = "Embedded window manager for the login screen")]
struct Args {
    /// Privileged login window, as a hex (0x...) or decimal id
    #[arg(long, value_name = "ID", value_parser = Util::parse_window_id)]
    login_window: Option<Window>,

    /// Monitor to place windows on, by output name or index
    #[arg(long, value_name = "ID")]
    monitor: Option<String>,

    /// Restack windows from the order saved by a previous instance
    #[arg(long)]
    restore_order: bool,

    /// Save the stacking order on exit
    #[arg(long)]
    save_order: bool,

    /// Focus windows as soon as they are mapped
    #[arg(long)]
    focus_new_windows: bool,

    /// Dwell gesture bindings
    #[arg(long, value_name = "PATH")]
    gestures: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

pub fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose || cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    SimpleLogger::init(level, simplelog::Config::default())?;

    let (conn, screen_num) = match x11rb::connect(None) {
        Ok(conn) => conn,
        Err(err) => {
            error!("unable to connect to the display: {}", err);
            return Ok(());
        },
    };

    let xconn = match XConnection::new(&conn, screen_num) {
        Ok(xconn) => xconn,
        Err(err) => {
            error!("unable to manage the display: {}", err);
            return Ok(());
        },
    };

    let screen = if Screen::fake_layout_requested() {
        info!("using fake monitor layout");
        Screen::fake(xconn.screen_region())
    } else {
        Screen::new(
            xconn.screen_region(),
            xconn.connected_outputs(),
            args.monitor.as_deref(),
        )
    };

    info!("starting {}", WM_NAME!());

    let mut model = Model::new(
        &xconn,
        screen,
        args.login_window,
        args.focus_new_windows,
        load_gestures(args.gestures.as_deref()),
    );

    if args.restore_order {
        model.restore_order();
    }

    run(&mut model, conn.stream().as_raw_fd())?;

    if args.save_order {
        model.save_order();
    }

    model.release_all();
    Ok(())
}

fn load_gestures(path: Option<&Path>) -> Option<GestureListener> {
    let path = path.map_or_else(
        || PathBuf::from(GestureListener::DEFAULT_BINDINGS_FILE),
        Path::to_path_buf,
    );

    match GestureListener::load(&path) {
        Ok(gestures) if gestures.bindings().is_empty() => None,
        Ok(gestures) => {
            info!(
                "loaded {} gestures from {}",
                gestures.bindings().len(),
                path.display()
            );
            Some(gestures)
        },
        Err(err) => {
            debug!("no gestures loaded from {}: {}", path.display(), err);
            None
        },
    }
}

/// Services the display until SIGINT or SIGTERM arrives.
fn run(
    model: &mut Model,
    display_fd: RawFd,
) -> Result<()> {
    let mut mask = SigSet::empty();
    mask.add(Signal::SIGINT);
    mask.add(Signal::SIGTERM);
    mask.thread_block()?;

    let mut signals = SignalFd::with_flags(&mask, SfdFlags::SFD_NONBLOCK | SfdFlags::SFD_CLOEXEC)?;

    model.process_events();

    loop {
        let timeout = if model.has_idle_work() { 0 } else { -1 };

        let mut fds = [
            PollFd::new(display_fd, PollFlags::POLLIN),
            PollFd::new(signals.as_raw_fd(), PollFlags::POLLIN),
        ];

        match poll(&mut fds, timeout) {
            Ok(_) => {},
            Err(nix::Error::Sys(Errno::EINTR)) => continue,
            Err(err) => return Err(err.into()),
        }

        if let Some(info) = signals.read_signal()? {
            info!("received signal {}, shutting down", info.ssi_signo);
            return Ok(());
        }

        model.run_idle();
        model.process_events();
    }
}

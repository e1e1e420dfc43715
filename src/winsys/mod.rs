pub type Result<T> = anyhow::Result<T>;

pub mod command;
pub mod connection;
pub mod event;
pub mod geometry;
pub mod hints;
pub mod screen;
pub mod trap;
pub mod window;
pub mod xdata;

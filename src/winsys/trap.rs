use crate::connection::Connection;

use std::cell::RefCell;

/// Nesting state of protocol error traps.
///
/// Every open level keeps its own "error seen" flag. An error observed while
/// any level is open marks all of them, since it happened inside each one.
#[derive(Debug, Default)]
pub struct TrapState {
    levels: RefCell<Vec<bool>>,
}

impl TrapState {
    pub fn new() -> Self {
        Default::default()
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.levels.borrow().len()
    }

    #[inline]
    pub fn enter(&self) {
        self.levels.borrow_mut().push(false);
    }

    /// Pops the innermost level and reports whether it saw an error.
    #[inline]
    pub fn leave(&self) -> bool {
        self.levels.borrow_mut().pop().unwrap_or(false)
    }

    /// Returns false when no trap was open to absorb the error.
    pub fn record_error(&self) -> bool {
        let mut levels = self.levels.borrow_mut();

        levels.iter_mut().for_each(|seen| *seen = true);
        !levels.is_empty()
    }
}

/// Scoped error trap: entered on construction, left on release or drop.
#[must_use]
pub struct ErrorTrap<'a> {
    conn: &'a dyn Connection,
    released: bool,
}

impl<'a> ErrorTrap<'a> {
    pub fn new(conn: &'a dyn Connection) -> Self {
        conn.trap_enter();

        Self {
            conn,
            released: false,
        }
    }

    /// Leaves the trap, returning whether a protocol error occurred inside it.
    pub fn release(mut self) -> bool {
        self.released = true;
        self.conn.trap_leave()
    }
}

impl<'a> Drop for ErrorTrap<'a> {
    fn drop(&mut self) {
        if !self.released {
            self.conn.trap_leave();
        }
    }
}

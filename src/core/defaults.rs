use crate::decoration::Decoration;
use crate::gesture::GestureListener;

#[macro_export]
macro_rules! WM_NAME (
    () => { "mdmwm" };
);

impl Decoration {
    /// Offset of the client inside its border window.
    pub const INSET: i32 = 1;

    /// Offset of the shadow from the border window.
    pub const SHADOW_OFFSET: i32 = 5;
}

impl GestureListener {
    pub const DEFAULT_BINDINGS_FILE: &'static str = "/etc/mdm/modules/AccessDwellMouseEvents";
}

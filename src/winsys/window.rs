pub type Window = u32;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Protocol {
    TakeFocus,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct WindowAttributes {
    pub mapped: bool,
    pub override_redirect: bool,
}

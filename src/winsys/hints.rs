/// Who set a position or size in WM_NORMAL_HINTS.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum HintSource {
    User,
    Program,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SizeHints {
    pub pos: Option<HintSource>,
    pub size: Option<HintSource>,
}

impl Default for SizeHints {
    fn default() -> Self {
        Self {
            pos: None,
            size: None,
        }
    }
}

impl SizeHints {
    const US_POSITION: u32 = 1 << 0;
    const US_SIZE: u32 = 1 << 1;
    const P_POSITION: u32 = 1 << 2;
    const P_SIZE: u32 = 1 << 3;

    /// Length of a current WM_SIZE_HINTS structure, in CARD32s.
    pub const LEN: usize = 18;

    /// Parses WM_NORMAL_HINTS; pre-ICCCM clients write only 15 fields.
    pub fn from_raw(raw: &[u32]) -> Option<Self> {
        if raw.len() < 15 {
            return None;
        }

        let flags = raw[0];
        let source = |user: u32, program: u32| {
            if flags & user != 0 {
                Some(HintSource::User)
            } else if flags & program != 0 {
                Some(HintSource::Program)
            } else {
                None
            }
        };

        Some(Self {
            pos: source(Self::US_POSITION, Self::P_POSITION),
            size: source(Self::US_SIZE, Self::P_SIZE),
        })
    }

    /// Rewrites a raw WM_NORMAL_HINTS payload so that position and size read as user-specified.
    pub fn force_user_specified(raw: Option<Vec<u32>>) -> Vec<u32> {
        let mut raw = raw.unwrap_or_default();

        raw.resize(raw.len().max(Self::LEN), 0);
        raw[0] |= Self::US_POSITION | Self::US_SIZE;
        raw
    }

    pub fn new(
        pos: Option<HintSource>,
        size: Option<HintSource>,
    ) -> Self {
        Self {
            pos,
            size,
        }
    }

    /// A program-specified size is only a suggestion; a user-specified one is final.
    #[inline]
    pub fn allows_resize(&self) -> bool {
        self.size != Some(HintSource::User)
    }

    #[inline]
    pub fn allows_reposition(&self) -> bool {
        self.pos.is_none()
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Hints {
    pub input: Option<bool>,
}

impl Hints {
    const INPUT_HINT: u32 = 1 << 0;

    pub fn from_raw(raw: &[u32]) -> Option<Self> {
        let flags = *raw.first()?;

        Some(Self {
            input: if flags & Self::INPUT_HINT != 0 {
                raw.get(1).map(|&input| input != 0)
            } else {
                None
            },
        })
    }

    #[inline]
    pub fn refuses_input(&self) -> bool {
        self.input == Some(false)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ClassMatch {
    Exact,
    Prefix(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WmClass {
    pub instance: String,
    pub class: String,
}

impl WmClass {
    pub fn new(
        instance: impl Into<String>,
        class: impl Into<String>,
    ) -> Self {
        Self {
            instance: instance.into(),
            class: class.into(),
        }
    }

    /// Parses the raw WM_CLASS payload, two NUL-terminated strings.
    pub fn from_raw(raw: &[u8]) -> Option<Self> {
        let mut parts = raw.split(|&b| b == 0);
        let instance = parts.next()?;
        let class = parts.next().unwrap_or(&[]);

        Some(Self::new(
            String::from_utf8_lossy(instance),
            String::from_utf8_lossy(class),
        ))
    }

    pub fn matches(
        &self,
        pattern: &str,
        method: ClassMatch,
    ) -> bool {
        let matches = |name: &str| match method {
            ClassMatch::Exact => name == pattern,
            ClassMatch::Prefix(len) => {
                let len = len.min(pattern.len());
                name.as_bytes().starts_with(&pattern.as_bytes()[..len])
            },
        };

        matches(&self.instance) || matches(&self.class)
    }
}

/// The `_MOTIF_WM_HINTS` structure; only the decorations field is honored.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MotifHints {
    pub flags: u32,
    pub functions: u32,
    pub decorations: u32,
}

impl MotifHints {
    const HINTS_DECORATIONS: u32 = 1 << 1;
    const DECOR_BORDER: u32 = 1 << 1;

    pub fn from_raw(raw: &[u32]) -> Option<Self> {
        if raw.len() < 3 {
            return None;
        }

        Some(Self {
            flags: raw[0],
            functions: raw[1],
            decorations: raw[2],
        })
    }

    pub fn wants_border(&self) -> bool {
        self.flags & Self::HINTS_DECORATIONS == 0
            || self.decorations & Self::DECOR_BORDER != 0
    }
}

/// Parses `_NET_WM_STRUT` as left, right, top and bottom widths.
pub fn strut_from_raw(raw: &[u32]) -> Option<[u32; 4]> {
    match *raw {
        [left, right, top, bottom] => Some([left, right, top, bottom]),
        _ => None,
    }
}

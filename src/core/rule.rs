use crate::client::Client;

use winsys::hints::ClassMatch;
use winsys::hints::WmClass;

pub struct Rules {
    pub ignore_size_hints: Option<bool>,
    pub center: Option<bool>,
    pub recenter: Option<bool>,
    pub accepts_focus: Option<bool>,
}

impl Rules {
    pub fn propagate(
        &self,
        client: &Client,
    ) {
        if let Some(ignore_size_hints) = self.ignore_size_hints {
            client.set_ignore_size_hints(ignore_size_hints);
        }

        if let Some(center) = self.center {
            client.set_center(center);
        }

        if let Some(recenter) = self.recenter {
            client.set_recenter(recenter);
        }

        if let Some(accepts_focus) = self.accepts_focus {
            client.set_accepts_focus(accepts_focus);
        }
    }
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            ignore_size_hints: None,
            center: None,
            recenter: None,
            accepts_focus: None,
        }
    }
}

pub struct ClassRule {
    pub pattern: &'static str,
    pub method: ClassMatch,
    pub rules: Rules,
}

/// Per-application overrides, checked in order; the first match wins.
pub static CLASS_RULES: &[ClassRule] = &[
    // our own helper dialogs
    ClassRule {
        pattern: "mdm",
        method: ClassMatch::Prefix(3),
        rules: Rules {
            ignore_size_hints: Some(true),
            center: Some(true),
            recenter: Some(true),
            accepts_focus: None,
        },
    },
    // sets bogus size hints
    ClassRule {
        pattern: "gkrellm",
        method: ClassMatch::Exact,
        rules: Rules {
            ignore_size_hints: None,
            center: Some(false),
            recenter: Some(false),
            accepts_focus: None,
        },
    },
    // on-screen keyboard, must never take focus from the text it types into
    ClassRule {
        pattern: "xscribble",
        method: ClassMatch::Exact,
        rules: Rules {
            ignore_size_hints: None,
            center: None,
            recenter: None,
            accepts_focus: Some(false),
        },
    },
];

pub fn find_rules(class: &WmClass) -> Option<&'static Rules> {
    CLASS_RULES
        .iter()
        .find(|rule| class.matches(rule.pattern, rule.method))
        .map(|rule| &rule.rules)
}

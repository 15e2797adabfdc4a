//! Declarative gates evaluated against a DOM event before its binding's
//! message is queued.

use serde::{Deserialize, Serialize};

use crate::browser::{DomEvent, EventDetail};
use crate::msg::UnknownTag;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "config", rename_all = "camelCase")]
pub enum EventMatcher {
    /// The event target itself matches the selector.
    ExactSelector(SelectorMatcher),
    /// The event target or one of its ancestors matches the selector.
    ClosestSelector(SelectorMatcher),
    KeyboardKey(KeyboardKeyMatcher),
    KeyboardCombo(KeyboardComboMatcher),
    MouseButton(MouseButtonMatcher),
    #[serde(untagged)]
    Unknown(UnknownTag),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorMatcher {
    pub selector: String,
}

/// Matches a key code case-insensitively; `"any"` matches every key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyboardKeyMatcher {
    pub key: String,
    #[serde(default, alias = "require_ctrl")]
    pub require_ctrl: bool,
    #[serde(default, alias = "require_meta")]
    pub require_meta: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyboardComboMatcher {
    pub combo: KeyboardCombo,
}

/// A key plus modifier state. Ctrl and meta must match exactly; alt and
/// shift are only required when declared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct KeyboardCombo {
    pub key: String,
    pub alt_key: bool,
    pub ctrl_key: bool,
    pub meta_key: bool,
    pub shift_key: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MouseButtonMatcher {
    pub button: MouseButton,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MouseButton {
    Main,
    Auxiliary,
    Secondary,
    Fourth,
    Fifth,
}

impl MouseButton {
    /// Map a DOM `MouseEvent.button` index.
    pub fn from_index(index: i16) -> Option<Self> {
        match index {
            0 => Some(Self::Main),
            1 => Some(Self::Auxiliary),
            2 => Some(Self::Secondary),
            3 => Some(Self::Fourth),
            4 => Some(Self::Fifth),
            _ => None,
        }
    }
}

impl EventMatcher {
    pub fn exact(selector: impl Into<String>) -> Self {
        Self::ExactSelector(SelectorMatcher {
            selector: selector.into(),
        })
    }

    pub fn closest(selector: impl Into<String>) -> Self {
        Self::ClosestSelector(SelectorMatcher {
            selector: selector.into(),
        })
    }

    pub fn key(key: impl Into<String>) -> Self {
        Self::KeyboardKey(KeyboardKeyMatcher {
            key: key.into(),
            require_ctrl: false,
            require_meta: false,
        })
    }

    pub fn mouse(button: MouseButton) -> Self {
        Self::MouseButton(MouseButtonMatcher { button })
    }

    /// Evaluate the matcher. Never panics; events of the wrong kind and
    /// unknown matchers fail closed.
    pub fn matches(&self, event: &dyn DomEvent) -> bool {
        match self {
            Self::ExactSelector(config) => event.target_matches(&config.selector),
            Self::ClosestSelector(config) => event.target_closest(&config.selector),
            Self::KeyboardKey(config) => match event.detail() {
                EventDetail::Keyboard(detail) => {
                    (!config.require_ctrl || detail.ctrl)
                        && (!config.require_meta || detail.meta)
                        && key_matches(&config.key, &detail.code)
                }
                _ => false,
            },
            Self::KeyboardCombo(config) => match event.detail() {
                EventDetail::Keyboard(detail) => {
                    let combo = &config.combo;
                    detail.ctrl == combo.ctrl_key
                        && detail.meta == combo.meta_key
                        && (!combo.alt_key || detail.alt)
                        && (!combo.shift_key || detail.shift)
                        && key_matches(&combo.key, &detail.code)
                }
                _ => false,
            },
            Self::MouseButton(config) => match event.detail() {
                EventDetail::Mouse { button } => MouseButton::from_index(button) == Some(config.button),
                _ => false,
            },
            Self::Unknown(tag) => {
                tracing::warn!(kind = %tag.kind, "unknown event matcher");
                false
            }
        }
    }
}

fn key_matches(declared: &str, code: &str) -> bool {
    let declared = declared.to_lowercase();
    declared == "any" || declared == code.to_lowercase()
}

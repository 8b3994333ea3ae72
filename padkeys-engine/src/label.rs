//! Key labels and their resolution to key identities
//!
//! The engine treats [`KeyLabel`] as opaque. Only the injection boundary calls
//! [`resolve`] to turn a label into something it can emit.
//!
//! # Vocabulary
//!
//! ```text
//! a, Z, 7, /     → Char       (any single character, passed through)
//! space, pageup  → Named      (see SPECIAL_KEYS, case-insensitive)
//! num5, num_add  → Named      (numeric keypad)
//! anything else  → Literal    (kept as written, sink decides)
//! ""             → no-op key  (padding in section lists)
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// A logical key name from a profile
///
/// Multi-character names are lowercased so `"PageUp"` and `"pageup"` refer to
/// the same held key. Single characters keep their case.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct KeyLabel(String);

impl KeyLabel {
    pub fn new(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.chars().count() <= 1 {
            // keep " " as the space character rather than trimming it away
            if raw.chars().count() == 1 {
                return Self(raw.to_string());
            }
            return Self(trimmed.to_string());
        }
        Self(trimmed.to_lowercase())
    }

    /// The empty label, used to pad section key lists
    pub fn noop() -> Self {
        Self(String::new())
    }

    /// True for the empty label, which never reaches the sink
    pub fn is_noop(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for KeyLabel {
    fn from(s: String) -> Self {
        Self::new(&s)
    }
}

impl From<&str> for KeyLabel {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<KeyLabel> for String {
    fn from(label: KeyLabel) -> Self {
        label.0
    }
}

impl fmt::Display for KeyLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Special keys reachable by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedKey {
    Space,
    Delete,
    End,
    PageUp,
    PageDown,
    Tab,
    Ctrl,
    Shift,
    Alt,
    Escape,
    Enter,
    Backspace,
    Up,
    Down,
    Left,
    Right,
    Home,
    Insert,
    /// F1..=F12
    F(u8),
    /// Keypad digit 0..=9
    Numpad(u8),
    NumpadAdd,
    NumpadSubtract,
    NumpadMultiply,
    NumpadDivide,
    NumpadDecimal,
    NumpadEnter,
}

/// What a label means to the injection boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedKey {
    Char(char),
    Named(NamedKey),
    /// Unrecognized name, passed through as written
    Literal(String),
}

/// Names accepted by [`resolve`], with a short description (for `padkeys keys`)
pub const SPECIAL_KEYS: &[(&str, &str)] = &[
    ("space", "Space"),
    ("delete", "Delete"),
    ("end", "End"),
    ("pageup", "Page Up"),
    ("pagedown", "Page Down"),
    ("tab", "Tab"),
    ("ctrl", "Control"),
    ("shift", "Shift"),
    ("alt", "Alt"),
    ("esc", "Escape"),
    ("enter", "Enter"),
    ("backspace", "Backspace"),
    ("up", "Arrow up"),
    ("down", "Arrow down"),
    ("left", "Arrow left"),
    ("right", "Arrow right"),
    ("home", "Home"),
    ("insert", "Insert"),
    ("f1 .. f12", "Function keys"),
    ("num0 .. num9", "Keypad digits"),
    ("num_add", "Keypad +"),
    ("num_subtract", "Keypad -"),
    ("num_multiply", "Keypad *"),
    ("num_divide", "Keypad /"),
    ("num_decimal", "Keypad ."),
    ("num_enter", "Keypad Enter"),
];

/// Resolve a label to a key identity
///
/// Total: anything not in the table comes back as [`ResolvedKey::Literal`].
pub fn resolve(label: &KeyLabel) -> ResolvedKey {
    let s = label.as_str();
    let mut chars = s.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return ResolvedKey::Char(c);
    }
    match named_key(s) {
        Some(key) => ResolvedKey::Named(key),
        None => ResolvedKey::Literal(s.to_string()),
    }
}

fn named_key(name: &str) -> Option<NamedKey> {
    let key = match name {
        "space" => NamedKey::Space,
        "delete" | "del" => NamedKey::Delete,
        "end" => NamedKey::End,
        "pageup" | "page_up" | "pgup" => NamedKey::PageUp,
        "pagedown" | "page_down" | "pgdn" => NamedKey::PageDown,
        "tab" => NamedKey::Tab,
        "ctrl" | "control" => NamedKey::Ctrl,
        "shift" => NamedKey::Shift,
        "alt" => NamedKey::Alt,
        "esc" | "escape" => NamedKey::Escape,
        "enter" | "return" => NamedKey::Enter,
        "backspace" => NamedKey::Backspace,
        "up" => NamedKey::Up,
        "down" => NamedKey::Down,
        "left" => NamedKey::Left,
        "right" => NamedKey::Right,
        "home" => NamedKey::Home,
        "insert" | "ins" => NamedKey::Insert,
        "num_add" => NamedKey::NumpadAdd,
        "num_subtract" => NamedKey::NumpadSubtract,
        "num_multiply" => NamedKey::NumpadMultiply,
        "num_divide" => NamedKey::NumpadDivide,
        "num_decimal" => NamedKey::NumpadDecimal,
        "num_enter" => NamedKey::NumpadEnter,
        _ => return numbered_key(name),
    };
    Some(key)
}

/// `f1`..`f12` and `num0`..`num9`
fn numbered_key(name: &str) -> Option<NamedKey> {
    if let Some(n) = name.strip_prefix('f').and_then(|d| d.parse::<u8>().ok()) {
        return (1..=12).contains(&n).then_some(NamedKey::F(n));
    }
    if let Some(rest) = name.strip_prefix("num") {
        let mut digits = rest.chars();
        if let (Some(d), None) = (digits.next(), digits.next()) {
            return d.to_digit(10).map(|d| NamedKey::Numpad(d as u8));
        }
    }
    None
}

//! Virtual keyboard device using evdev/uinput
//!
//! Creates a keyboard that registers every key a profile label can resolve
//! to, and turns engine press/release calls into key events.

use evdev::{
    uinput::{VirtualDevice, VirtualDeviceBuilder},
    AttributeSet, EventType, InputEvent, Key,
};
use padkeys_engine::{resolve, KeyLabel, KeySink, NamedKey, ResolvedKey, SinkError};
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::info;

/// Name shown in `evtest` and desktop input settings
pub const DEVICE_NAME: &str = "padkeys virtual keyboard";

/// Errors from virtual keyboard setup
#[derive(Debug, Error)]
pub enum KeyboardError {
    #[error("Failed to create virtual device: {0}")]
    CreateDevice(#[source] std::io::Error),
}

/// Convert a character to an evdev key
/// Returns (key, needs_shift) or None if unsupported
pub fn char_to_key(ch: char) -> Option<(Key, bool)> {
    let shifted = ch.is_ascii_uppercase();
    let key = match ch.to_ascii_lowercase() {
        'a' => Key::KEY_A,
        'b' => Key::KEY_B,
        'c' => Key::KEY_C,
        'd' => Key::KEY_D,
        'e' => Key::KEY_E,
        'f' => Key::KEY_F,
        'g' => Key::KEY_G,
        'h' => Key::KEY_H,
        'i' => Key::KEY_I,
        'j' => Key::KEY_J,
        'k' => Key::KEY_K,
        'l' => Key::KEY_L,
        'm' => Key::KEY_M,
        'n' => Key::KEY_N,
        'o' => Key::KEY_O,
        'p' => Key::KEY_P,
        'q' => Key::KEY_Q,
        'r' => Key::KEY_R,
        's' => Key::KEY_S,
        't' => Key::KEY_T,
        'u' => Key::KEY_U,
        'v' => Key::KEY_V,
        'w' => Key::KEY_W,
        'x' => Key::KEY_X,
        'y' => Key::KEY_Y,
        'z' => Key::KEY_Z,
        _ => return symbol_to_key(ch),
    };
    Some((key, shifted))
}

fn symbol_to_key(ch: char) -> Option<(Key, bool)> {
    let mapped = match ch {
        // Numbers
        '1' => (Key::KEY_1, false),
        '2' => (Key::KEY_2, false),
        '3' => (Key::KEY_3, false),
        '4' => (Key::KEY_4, false),
        '5' => (Key::KEY_5, false),
        '6' => (Key::KEY_6, false),
        '7' => (Key::KEY_7, false),
        '8' => (Key::KEY_8, false),
        '9' => (Key::KEY_9, false),
        '0' => (Key::KEY_0, false),
        // Special characters (unshifted)
        ' ' => (Key::KEY_SPACE, false),
        '-' => (Key::KEY_MINUS, false),
        '=' => (Key::KEY_EQUAL, false),
        '[' => (Key::KEY_LEFTBRACE, false),
        ']' => (Key::KEY_RIGHTBRACE, false),
        '\\' => (Key::KEY_BACKSLASH, false),
        ';' => (Key::KEY_SEMICOLON, false),
        '\'' => (Key::KEY_APOSTROPHE, false),
        '`' => (Key::KEY_GRAVE, false),
        ',' => (Key::KEY_COMMA, false),
        '.' => (Key::KEY_DOT, false),
        '/' => (Key::KEY_SLASH, false),
        '\n' => (Key::KEY_ENTER, false),
        '\t' => (Key::KEY_TAB, false),
        // Shifted characters
        '!' => (Key::KEY_1, true),
        '@' => (Key::KEY_2, true),
        '#' => (Key::KEY_3, true),
        '$' => (Key::KEY_4, true),
        '%' => (Key::KEY_5, true),
        '^' => (Key::KEY_6, true),
        '&' => (Key::KEY_7, true),
        '*' => (Key::KEY_8, true),
        '(' => (Key::KEY_9, true),
        ')' => (Key::KEY_0, true),
        '_' => (Key::KEY_MINUS, true),
        '+' => (Key::KEY_EQUAL, true),
        '{' => (Key::KEY_LEFTBRACE, true),
        '}' => (Key::KEY_RIGHTBRACE, true),
        '|' => (Key::KEY_BACKSLASH, true),
        ':' => (Key::KEY_SEMICOLON, true),
        '"' => (Key::KEY_APOSTROPHE, true),
        '~' => (Key::KEY_GRAVE, true),
        '<' => (Key::KEY_COMMA, true),
        '>' => (Key::KEY_DOT, true),
        '?' => (Key::KEY_SLASH, true),
        _ => return None,
    };
    Some(mapped)
}

/// Convert a named key to an evdev key
pub fn named_to_key(named: NamedKey) -> Option<Key> {
    let key = match named {
        NamedKey::Space => Key::KEY_SPACE,
        NamedKey::Delete => Key::KEY_DELETE,
        NamedKey::End => Key::KEY_END,
        NamedKey::PageUp => Key::KEY_PAGEUP,
        NamedKey::PageDown => Key::KEY_PAGEDOWN,
        NamedKey::Tab => Key::KEY_TAB,
        NamedKey::Ctrl => Key::KEY_LEFTCTRL,
        NamedKey::Shift => Key::KEY_LEFTSHIFT,
        NamedKey::Alt => Key::KEY_LEFTALT,
        NamedKey::Escape => Key::KEY_ESC,
        NamedKey::Enter => Key::KEY_ENTER,
        NamedKey::Backspace => Key::KEY_BACKSPACE,
        NamedKey::Up => Key::KEY_UP,
        NamedKey::Down => Key::KEY_DOWN,
        NamedKey::Left => Key::KEY_LEFT,
        NamedKey::Right => Key::KEY_RIGHT,
        NamedKey::Home => Key::KEY_HOME,
        NamedKey::Insert => Key::KEY_INSERT,
        NamedKey::F(n) => function_key(n)?,
        NamedKey::Numpad(d) => keypad_digit(d)?,
        NamedKey::NumpadAdd => Key::KEY_KPPLUS,
        NamedKey::NumpadSubtract => Key::KEY_KPMINUS,
        NamedKey::NumpadMultiply => Key::KEY_KPASTERISK,
        NamedKey::NumpadDivide => Key::KEY_KPSLASH,
        NamedKey::NumpadDecimal => Key::KEY_KPDOT,
        NamedKey::NumpadEnter => Key::KEY_KPENTER,
    };
    Some(key)
}

fn function_key(n: u8) -> Option<Key> {
    let key = match n {
        1 => Key::KEY_F1,
        2 => Key::KEY_F2,
        3 => Key::KEY_F3,
        4 => Key::KEY_F4,
        5 => Key::KEY_F5,
        6 => Key::KEY_F6,
        7 => Key::KEY_F7,
        8 => Key::KEY_F8,
        9 => Key::KEY_F9,
        10 => Key::KEY_F10,
        11 => Key::KEY_F11,
        12 => Key::KEY_F12,
        _ => return None,
    };
    Some(key)
}

fn keypad_digit(d: u8) -> Option<Key> {
    let key = match d {
        0 => Key::KEY_KP0,
        1 => Key::KEY_KP1,
        2 => Key::KEY_KP2,
        3 => Key::KEY_KP3,
        4 => Key::KEY_KP4,
        5 => Key::KEY_KP5,
        6 => Key::KEY_KP6,
        7 => Key::KEY_KP7,
        8 => Key::KEY_KP8,
        9 => Key::KEY_KP9,
        _ => return None,
    };
    Some(key)
}

/// Resolve a profile label to the evdev key to emit
pub fn label_to_key(label: &KeyLabel) -> Result<(Key, bool), SinkError> {
    let mapped = match resolve(label) {
        ResolvedKey::Char(ch) => char_to_key(ch),
        ResolvedKey::Named(named) => named_to_key(named).map(|key| (key, false)),
        ResolvedKey::Literal(_) => None,
    };
    mapped.ok_or_else(|| SinkError::Unmapped(label.to_string()))
}

/// Every key [`label_to_key`] can produce
fn mappable_keys() -> AttributeSet<Key> {
    let mut keys = AttributeSet::<Key>::new();
    keys.insert(Key::KEY_LEFTSHIFT);
    for ch in (' '..='~').chain(['\n', '\t']) {
        if let Some((key, _)) = char_to_key(ch) {
            keys.insert(key);
        }
    }
    let named = [
        NamedKey::Space,
        NamedKey::Delete,
        NamedKey::End,
        NamedKey::PageUp,
        NamedKey::PageDown,
        NamedKey::Tab,
        NamedKey::Ctrl,
        NamedKey::Shift,
        NamedKey::Alt,
        NamedKey::Escape,
        NamedKey::Enter,
        NamedKey::Backspace,
        NamedKey::Up,
        NamedKey::Down,
        NamedKey::Left,
        NamedKey::Right,
        NamedKey::Home,
        NamedKey::Insert,
        NamedKey::NumpadAdd,
        NamedKey::NumpadSubtract,
        NamedKey::NumpadMultiply,
        NamedKey::NumpadDivide,
        NamedKey::NumpadDecimal,
        NamedKey::NumpadEnter,
    ];
    let numbered = (1..=12)
        .map(NamedKey::F)
        .chain((0..=9).map(NamedKey::Numpad));
    for key in named.into_iter().chain(numbered).filter_map(named_to_key) {
        keys.insert(key);
    }
    keys
}

fn key_event(key: Key, value: i32) -> InputEvent {
    InputEvent::new_now(EventType::KEY, key.code(), value)
}

/// Physical key state shared by all labels
///
/// Labels that resolve to the same key ("a" and "A", or Shift for every
/// shifted label) are counted, so the key goes up only when the last label
/// holding it is released.
#[derive(Debug, Default)]
pub struct KeyLatch {
    /// Label -> (key, shift) it was pressed with
    held: HashMap<KeyLabel, (Key, bool)>,
    /// Physical key -> number of labels holding it
    down: HashMap<Key, u32>,
}

impl KeyLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key events (key, value) needed to press `label`
    pub fn press(&mut self, label: &KeyLabel, key: Key, shift: bool) -> Vec<(Key, i32)> {
        let mut events = if self.held.contains_key(label) {
            self.release(label).unwrap_or_default()
        } else {
            Vec::new()
        };
        self.held.insert(label.clone(), (key, shift));
        events.extend(self.acquire(key, shift));
        events
    }

    /// Key events to release `label`, or `None` if it is not held
    pub fn release(&mut self, label: &KeyLabel) -> Option<Vec<(Key, i32)>> {
        let (key, shift) = self.held.remove(label)?;
        let mut events = Vec::with_capacity(2);
        if self.drop_key(key) {
            events.push((key, 0));
        }
        if shift && self.drop_key(Key::KEY_LEFTSHIFT) {
            events.push((Key::KEY_LEFTSHIFT, 0));
        }
        Some(events)
    }

    pub fn is_down(&self, key: Key) -> bool {
        self.down.contains_key(&key)
    }

    fn acquire(&mut self, key: Key, shift: bool) -> Vec<(Key, i32)> {
        let mut events = Vec::with_capacity(2);
        if shift && self.take_key(Key::KEY_LEFTSHIFT) {
            events.push((Key::KEY_LEFTSHIFT, 1));
        }
        if self.take_key(key) {
            events.push((key, 1));
        }
        events
    }

    /// True when the key goes down
    fn take_key(&mut self, key: Key) -> bool {
        let count = self.down.entry(key).or_insert(0);
        *count += 1;
        *count == 1
    }

    /// True when the key goes up
    fn drop_key(&mut self, key: Key) -> bool {
        match self.down.get_mut(&key) {
            Some(count) if *count > 1 => {
                *count -= 1;
                false
            }
            Some(_) => {
                self.down.remove(&key);
                true
            }
            None => false,
        }
    }
}

/// Virtual keyboard device
pub struct VirtualKeyboard {
    device: VirtualDevice,
    latch: KeyLatch,
}

impl VirtualKeyboard {
    pub fn new() -> Result<Self, KeyboardError> {
        let device = VirtualDeviceBuilder::new()
            .map_err(KeyboardError::CreateDevice)?
            .name(DEVICE_NAME)
            .with_keys(&mappable_keys())
            .map_err(KeyboardError::CreateDevice)?
            .build()
            .map_err(KeyboardError::CreateDevice)?;
        info!("Created virtual keyboard: {DEVICE_NAME}");
        Ok(Self {
            device,
            latch: KeyLatch::new(),
        })
    }

    /// Get the device path (e.g., /dev/input/eventX)
    pub fn device_path(&mut self) -> Option<std::path::PathBuf> {
        self.device
            .enumerate_dev_nodes_blocking()
            .ok()?
            .next()?
            .ok()
    }

    fn emit(&mut self, events: &[(Key, i32)]) -> Result<(), SinkError> {
        if events.is_empty() {
            return Ok(());
        }
        let events: Vec<_> = events.iter().map(|&(key, value)| key_event(key, value)).collect();
        self.device.emit(&events).map_err(SinkError::Emit)
    }
}

impl KeySink for VirtualKeyboard {
    fn press(&mut self, label: &KeyLabel) -> Result<(), SinkError> {
        let (key, shift) = label_to_key(label)?;
        let events = self.latch.press(label, key, shift);
        self.emit(&events)
    }

    fn release(&mut self, label: &KeyLabel) -> Result<(), SinkError> {
        let events = self
            .latch
            .release(label)
            .ok_or_else(|| SinkError::NotPressed(label.to_string()))?;
        self.emit(&events)
    }
}

/// Sink for `--dry-run`: logs what would be injected
#[derive(Debug, Default)]
pub struct LogSink {
    held: HashSet<KeyLabel>,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeySink for LogSink {
    fn press(&mut self, label: &KeyLabel) -> Result<(), SinkError> {
        let (key, shift) = label_to_key(label)?;
        let shift = if shift { "shift+" } else { "" };
        info!("press   {:<10} ({shift}{key:?})", label.as_str());
        self.held.insert(label.clone());
        Ok(())
    }

    fn release(&mut self, label: &KeyLabel) -> Result<(), SinkError> {
        if !self.held.remove(label) {
            return Err(SinkError::NotPressed(label.to_string()));
        }
        info!("release {label}");
        Ok(())
    }
}

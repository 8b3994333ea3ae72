//! Profile book loading and validation
//!
//! A profile book is one file holding named profiles. JSON is the primary
//! format; a `.toml` extension selects TOML with the same schema.
//!
//! ```json
//! {
//!   "train": {
//!     "joystick_id": 0,
//!     "press_hold_seconds": 0.12,
//!     "buttons": { "3": { "key": "a", "mode": "hold" } },
//!     "axes": {
//!       "1": { "type": "steps_to_buttons", "steps": 10, "key_pos": "down", "key_neg": "up" },
//!       "2": { "type": "sections_to_keys", "keys": ["z", "x", "c"] }
//!     }
//!   }
//! }
//! ```
//!
//! Raw records ([`ProfileRecord`]) mirror the file. [`Profile`] is the
//! validated form the engine runs on: durations as [`Duration`], indices as
//! `usize`, section key lists reconciled to their bucket count.

use crate::error::ProfileError;
use crate::hold::RepeatTiming;
use crate::label::KeyLabel;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

// ---------------------------------------------------------------------------
// File records
// ---------------------------------------------------------------------------

/// One profile as written in the book
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileRecord {
    #[serde(default, alias = "joystickId")]
    pub joystick_id: usize,
    #[serde(default = "default_press_hold", alias = "pressHoldSeconds")]
    pub press_hold_seconds: f64,
    #[serde(default = "default_repeat_hold", alias = "buttonHoldRepeatHold")]
    pub button_hold_repeat_hold: f64,
    #[serde(default = "default_repeat_delay", alias = "repeatDelay")]
    pub repeat_delay: f64,
    #[serde(default = "default_repeat_interval", alias = "repeatInterval")]
    pub repeat_interval: f64,
    #[serde(default)]
    pub buttons: BTreeMap<String, ButtonRecord>,
    #[serde(default)]
    pub axes: BTreeMap<String, AxisRecord>,
}

fn default_press_hold() -> f64 {
    0.12
}
fn default_repeat_hold() -> f64 {
    0.06
}
fn default_repeat_delay() -> f64 {
    0.35
}
fn default_repeat_interval() -> f64 {
    0.05
}

/// Button behavior on press
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonMode {
    /// One press held for the profile (or per-button) duration
    #[default]
    Single,
    /// Immediate press, then auto-repeat while held
    Hold,
    /// Press and release with no dwell
    Instant,
    /// Move a sections axis cursor one key back and press that key
    Prev,
    /// Move a sections axis cursor one key forward and press that key
    Next,
}

impl ButtonMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ButtonMode::Single => "single",
            ButtonMode::Hold => "hold",
            ButtonMode::Instant => "instant",
            ButtonMode::Prev => "prev",
            ButtonMode::Next => "next",
        }
    }

    /// Whether this mode steps a sections axis cursor
    pub fn is_cursor(&self) -> bool {
        matches!(self, ButtonMode::Prev | ButtonMode::Next)
    }

    /// Whether a per-button `press_seconds` affects this mode
    pub fn uses_press_override(&self) -> bool {
        !matches!(self, ButtonMode::Hold | ButtonMode::Instant)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ButtonRecord {
    /// Unused by `prev`/`next`, which press the cursor's section key
    #[serde(default = "KeyLabel::noop")]
    pub key: KeyLabel,
    #[serde(default)]
    pub mode: ButtonMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub press_seconds: Option<f64>,
    /// Sections axis stepped by `prev`/`next` buttons
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub axis: Option<usize>,
}

/// Axis mapping as written in the book
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AxisRecord {
    StepsToButtons {
        #[serde(default = "default_steps")]
        steps: i64,
        #[serde(default)]
        invert: bool,
        #[serde(default = "default_key_pos")]
        key_pos: KeyLabel,
        #[serde(default = "default_key_neg")]
        key_neg: KeyLabel,
        #[serde(default = "default_tap")]
        tap_hold: f64,
        #[serde(default = "default_tap")]
        tap_interval: f64,
    },
    SectionsToKeys {
        #[serde(default)]
        buckets: Option<i64>,
        #[serde(default)]
        keys: Vec<KeyLabel>,
        #[serde(default)]
        invert: bool,
        #[serde(default)]
        repeat: bool,
        #[serde(default = "default_section_repeat")]
        repeat_interval: f64,
    },
}

fn default_steps() -> i64 {
    10
}
fn default_key_pos() -> KeyLabel {
    KeyLabel::new("down")
}
fn default_key_neg() -> KeyLabel {
    KeyLabel::new("up")
}
fn default_tap() -> f64 {
    0.06
}
fn default_section_repeat() -> f64 {
    0.5
}

// ---------------------------------------------------------------------------
// Validated profile
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ButtonMapping {
    pub key: KeyLabel,
    pub mode: ButtonMode,
    pub press_override: Option<Duration>,
    /// Sections axis for `prev`/`next` buttons
    pub axis: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AxisMapping {
    StepsToButtons {
        steps: u32,
        invert: bool,
        key_positive: KeyLabel,
        key_negative: KeyLabel,
        tap_hold: Duration,
        tap_interval: Duration,
    },
    SectionsToKeys {
        buckets: u32,
        /// Exactly `buckets` entries; padding entries are no-op labels
        keys: Vec<KeyLabel>,
        invert: bool,
        repeat: bool,
        repeat_interval: Duration,
    },
}

impl AxisMapping {
    pub fn kind(&self) -> &'static str {
        match self {
            AxisMapping::StepsToButtons { .. } => "steps_to_buttons",
            AxisMapping::SectionsToKeys { .. } => "sections_to_keys",
        }
    }
}

/// Validated, immutable run configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub name: String,
    pub joystick_id: usize,
    /// Default hold for single-mode buttons and section keys
    pub press_hold: Duration,
    /// Hold of each hold-mode press (initial and repeats)
    pub repeat_hold: Duration,
    pub repeat: RepeatTiming,
    pub buttons: BTreeMap<usize, ButtonMapping>,
    /// Iterated in ascending axis index order
    pub axes: BTreeMap<usize, AxisMapping>,
}

impl Profile {
    /// Validate a raw record
    pub fn from_record(name: &str, record: &ProfileRecord) -> Result<Self, ProfileError> {
        let press_hold = seconds("press_hold_seconds", record.press_hold_seconds)?;
        let repeat_hold = seconds("button_hold_repeat_hold", record.button_hold_repeat_hold)?;
        let repeat = RepeatTiming {
            delay: seconds("repeat_delay", record.repeat_delay)?,
            interval: seconds("repeat_interval", record.repeat_interval)?,
        };

        let mut axes = BTreeMap::new();
        for (key, axis) in &record.axes {
            let index = parse_index("axis", key)?;
            axes.insert(index, validate_axis(key, axis)?);
        }

        let mut buttons = BTreeMap::new();
        for (key, button) in &record.buttons {
            let index = parse_index("button", key)?;
            buttons.insert(index, validate_button(key, button, &axes)?);
        }

        Ok(Self {
            name: name.to_string(),
            joystick_id: record.joystick_id,
            press_hold,
            repeat_hold,
            repeat,
            buttons,
            axes,
        })
    }

    /// Hold duration for a single-mode button
    pub fn single_hold(&self, mapping: &ButtonMapping) -> Duration {
        mapping.press_override.unwrap_or(self.press_hold)
    }
}

fn validate_button(
    key: &str,
    button: &ButtonRecord,
    axes: &BTreeMap<usize, AxisMapping>,
) -> Result<ButtonMapping, ProfileError> {
    // zero means "use the profile default"
    let press_override = button
        .press_seconds
        .filter(|s| *s != 0.0)
        .map(|s| seconds(&format!("buttons.{key}.press_seconds"), s))
        .transpose()?;
    if press_override.is_some() && !button.mode.uses_press_override() {
        warn!(
            "Button {key}: press_seconds is ignored in {} mode",
            button.mode.as_str()
        );
    }

    let axis = if button.mode.is_cursor() {
        let field = format!("buttons.{key}.axis");
        let axis = button.axis.ok_or_else(|| ProfileError::InvalidValue {
            field: field.clone(),
            reason: format!("required for {} mode", button.mode.as_str()),
        })?;
        match axes.get(&axis) {
            Some(AxisMapping::SectionsToKeys { .. }) => Some(axis),
            _ => {
                return Err(ProfileError::InvalidValue {
                    field,
                    reason: format!("axis {axis} is not a sections_to_keys axis"),
                })
            }
        }
    } else {
        if button.axis.is_some() {
            warn!("Button {key}: axis is only used by prev/next modes");
        }
        None
    };

    Ok(ButtonMapping {
        key: button.key.clone(),
        mode: button.mode,
        press_override,
        axis,
    })
}

fn validate_axis(key: &str, axis: &AxisRecord) -> Result<AxisMapping, ProfileError> {
    match axis {
        AxisRecord::StepsToButtons {
            steps,
            invert,
            key_pos,
            key_neg,
            tap_hold,
            tap_interval,
        } => Ok(AxisMapping::StepsToButtons {
            steps: positive_count(&format!("axes.{key}.steps"), *steps)?,
            invert: *invert,
            key_positive: key_pos.clone(),
            key_negative: key_neg.clone(),
            tap_hold: seconds(&format!("axes.{key}.tap_hold"), *tap_hold)?,
            tap_interval: seconds(&format!("axes.{key}.tap_interval"), *tap_interval)?,
        }),
        AxisRecord::SectionsToKeys {
            buckets,
            keys,
            invert,
            repeat,
            repeat_interval,
        } => {
            let declared = buckets.unwrap_or_else(|| keys.len().max(1) as i64);
            let buckets = positive_count(&format!("axes.{key}.buckets"), declared)?;
            let keys = reconcile_keys(key, keys, buckets);
            Ok(AxisMapping::SectionsToKeys {
                buckets,
                keys,
                invert: *invert,
                repeat: *repeat,
                repeat_interval: seconds(&format!("axes.{key}.repeat_interval"), *repeat_interval)?,
            })
        }
    }
}

/// Pad with no-op labels or truncate so there is one key per bucket
fn reconcile_keys(axis: &str, keys: &[KeyLabel], buckets: u32) -> Vec<KeyLabel> {
    let buckets = buckets as usize;
    if keys.len() != buckets {
        warn!(
            "Axis {axis}: {} keys for {buckets} buckets, {}",
            keys.len(),
            if keys.len() < buckets {
                "padding with no-op keys"
            } else {
                "dropping the extra keys"
            }
        );
    }
    let mut keys = keys.to_vec();
    keys.resize(buckets, KeyLabel::noop());
    keys
}

fn parse_index(kind: &'static str, key: &str) -> Result<usize, ProfileError> {
    key.trim()
        .parse::<usize>()
        .map_err(|_| ProfileError::InvalidIndex {
            kind,
            key: key.to_string(),
        })
}

/// Upper bound for `steps` and `buckets`
pub const MAX_COUNT: u32 = 1000;

/// Upper bound for any duration in a profile (one day)
pub const MAX_SECONDS: f64 = 86_400.0;

fn positive_count(field: &str, value: i64) -> Result<u32, ProfileError> {
    match u32::try_from(value) {
        Ok(n) if n > 0 && n <= MAX_COUNT => Ok(n),
        _ => Err(ProfileError::InvalidValue {
            field: field.to_string(),
            reason: format!("must be an integer from 1 to {MAX_COUNT}, got {value}"),
        }),
    }
}

fn seconds(field: &str, value: f64) -> Result<Duration, ProfileError> {
    if value > MAX_SECONDS {
        return Err(ProfileError::InvalidValue {
            field: field.to_string(),
            reason: format!("must be at most {MAX_SECONDS} seconds, got {value}"),
        });
    }
    Duration::try_from_secs_f64(value).map_err(|_| ProfileError::InvalidValue {
        field: field.to_string(),
        reason: format!("must be a non-negative number of seconds, got {value}"),
    })
}

// ---------------------------------------------------------------------------
// Profile book
// ---------------------------------------------------------------------------

/// All profiles in one file, keyed by name
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileBook {
    pub profiles: BTreeMap<String, ProfileRecord>,
}

impl ProfileBook {
    /// Default book location: `./profiles.json` when present, else the user
    /// config directory
    pub fn default_path() -> PathBuf {
        let local = PathBuf::from("profiles.json");
        if local.exists() {
            return local;
        }
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("padkeys")
            .join("profiles.json")
    }

    /// Load a book; the extension picks the format (`.toml` or JSON)
    pub fn load(path: &Path) -> Result<Self, ProfileError> {
        let content = std::fs::read_to_string(path).map_err(|source| ProfileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if is_toml(path) {
            Self::from_toml(&content).map_err(|source| ProfileError::Toml {
                path: path.to_path_buf(),
                source,
            })
        } else {
            Self::from_json(&content).map_err(|source| ProfileError::Json {
                path: path.to_path_buf(),
                source,
            })
        }
    }

    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    /// Look up and validate one profile
    pub fn profile(&self, name: &str) -> Result<Profile, ProfileError> {
        let record = self
            .profiles
            .get(name)
            .ok_or_else(|| ProfileError::NotFound {
                name: name.to_string(),
                available: if self.profiles.is_empty() {
                    "none".to_string()
                } else {
                    self.names().collect::<Vec<_>>().join(", ")
                },
            })?;
        Profile::from_record(name, record)
    }
}

fn is_toml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"))
}

//! Engine error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors from loading or validating a profile book
#[derive(Error, Debug)]
pub enum ProfileError {
    /// Profile file could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON profile book did not parse
    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// TOML profile book did not parse
    #[error("Invalid TOML in {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Requested profile name is not in the book
    #[error("Profile \"{name}\" not found (available: {available})")]
    NotFound { name: String, available: String },

    /// Button or axis key in the profile is not a non-negative integer
    #[error("Invalid {kind} index \"{key}\"")]
    InvalidIndex { kind: &'static str, key: String },

    /// Structurally valid but semantically unusable value
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Errors from the snapshot provider
#[derive(Error, Debug)]
pub enum InputError {
    /// Device was unplugged or its node disappeared
    #[error("Input device disconnected")]
    Disconnected,

    /// No gamepad at the requested joystick id
    #[error("No gamepad with id {0}")]
    NotFound(usize),

    /// Underlying read failed
    #[error("Failed to read input device: {0}")]
    Read(#[source] std::io::Error),
}

/// Errors from the key injection capability
#[derive(Error, Debug)]
pub enum SinkError {
    /// Label does not resolve to a key the sink can emit
    #[error("No key mapping for \"{0}\"")]
    Unmapped(String),

    /// Release of a key the sink never pressed
    #[error("Key \"{0}\" is not pressed")]
    NotPressed(String),

    /// Writing the event failed
    #[error("Failed to emit key event: {0}")]
    Emit(#[source] std::io::Error),
}

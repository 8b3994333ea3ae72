//! Gamepad-to-Keystroke Mapping Engine
//!
//! Turns per-tick controller snapshots into scheduled key presses according to
//! a [`Profile`]. Device access lives outside this crate: callers supply an
//! [`InputSource`] and a [`KeySink`].

pub mod dispatch;
pub mod driver;
pub mod edge;
pub mod engine;
pub mod error;
pub mod hold;
pub mod inspect;
pub mod label;
pub mod profile;
pub mod quantize;
pub mod scheduler;
pub mod snapshot;

pub use driver::{RunStats, TickDriver, TickTarget, DEFAULT_RATE_HZ};
pub use engine::{Engine, EngineState};
pub use error::{InputError, ProfileError, SinkError};
pub use inspect::{Inspector, INSPECT_RATE_HZ};
pub use label::{resolve, KeyLabel, NamedKey, ResolvedKey};
pub use profile::{AxisMapping, ButtonMapping, ButtonMode, Profile, ProfileBook};
pub use scheduler::{KeyScheduler, KeySink};
pub use snapshot::{InputSource, Snapshot};

//! Key press scheduling
//!
//! [`KeyScheduler`] is the only writer to the injection capability. Every
//! press goes through [`schedule`](KeyScheduler::schedule) or
//! [`instant`](KeyScheduler::instant), and deferred releases are handled by
//! [`process_releases`](KeyScheduler::process_releases) once per tick.

use crate::error::SinkError;
use crate::label::KeyLabel;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Injection capability: emits key-down / key-up for a label
pub trait KeySink {
    fn press(&mut self, key: &KeyLabel) -> Result<(), SinkError>;
    fn release(&mut self, key: &KeyLabel) -> Result<(), SinkError>;
}

impl<S: KeySink + ?Sized> KeySink for Box<S> {
    fn press(&mut self, key: &KeyLabel) -> Result<(), SinkError> {
        (**self).press(key)
    }

    fn release(&mut self, key: &KeyLabel) -> Result<(), SinkError> {
        (**self).release(key)
    }
}

/// Keys held by the engine with their release deadlines
pub struct KeyScheduler<S> {
    sink: S,
    active: BTreeMap<KeyLabel, Instant>,
}

impl<S: KeySink> KeyScheduler<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            active: BTreeMap::new(),
        }
    }

    /// Press `key` (unless already held) and release it `hold` after `now`
    ///
    /// Re-scheduling a held key moves its deadline instead of pressing again.
    pub fn schedule(&mut self, key: &KeyLabel, hold: Duration, now: Instant) {
        if key.is_noop() {
            return;
        }
        let deadline = now + hold;
        if let Some(existing) = self.active.get_mut(key) {
            *existing = deadline;
            return;
        }
        match self.sink.press(key) {
            Ok(()) => {
                debug!("press {key} (release in {:?})", hold);
                self.active.insert(key.clone(), deadline);
            }
            Err(e) => warn!("Failed to press {key}: {e}"),
        }
    }

    /// Press and release immediately, bypassing the deadline table
    pub fn instant(&mut self, key: &KeyLabel) {
        if key.is_noop() {
            return;
        }
        if let Err(e) = self.sink.press(key) {
            warn!("Failed to press {key}: {e}");
            return;
        }
        debug!("tap {key}");
        if let Err(e) = self.sink.release(key) {
            debug!("Release of {key} failed: {e}");
        }
    }

    /// Release every key whose deadline is at or before `now`
    pub fn process_releases(&mut self, now: Instant) {
        let due: Vec<KeyLabel> = self
            .active
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(key, _)| key.clone())
            .collect();
        for key in due {
            self.active.remove(&key);
            self.release_quietly(&key);
        }
    }

    /// Release everything still held (shutdown path)
    pub fn release_all(&mut self) {
        let held = std::mem::take(&mut self.active);
        for key in held.keys() {
            self.release_quietly(key);
        }
    }

    fn release_quietly(&mut self, key: &KeyLabel) {
        match self.sink.release(key) {
            Ok(()) => debug!("release {key}"),
            // already released elsewhere; nothing left to undo
            Err(e) => debug!("Release of {key} failed: {e}"),
        }
    }

    /// Pending release deadline for `key`
    pub fn deadline(&self, key: &KeyLabel) -> Option<Instant> {
        self.active.get(key).copied()
    }

    pub fn held_count(&self) -> usize {
        self.active.len()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}

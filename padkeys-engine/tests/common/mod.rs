//! Shared fixtures for engine integration tests.

#![allow(dead_code)]

use padkeys_engine::{
    Engine, InputError, InputSource, KeyLabel, KeySink, ProfileBook, SinkError, Snapshot,
};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Key event as seen by the sink: `+a` for press, `-a` for release
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<String>,
}

impl RecordingSink {
    pub fn presses_of(&self, key: &str) -> usize {
        self.events.iter().filter(|e| *e == &format!("+{key}")).count()
    }

    pub fn releases_of(&self, key: &str) -> usize {
        self.events.iter().filter(|e| *e == &format!("-{key}")).count()
    }
}

impl KeySink for RecordingSink {
    fn press(&mut self, key: &KeyLabel) -> Result<(), SinkError> {
        self.events.push(format!("+{key}"));
        Ok(())
    }

    fn release(&mut self, key: &KeyLabel) -> Result<(), SinkError> {
        self.events.push(format!("-{key}"));
        Ok(())
    }
}

pub fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

pub fn engine_for(json: &str, name: &str) -> Engine<RecordingSink> {
    let profile = ProfileBook::from_json(json)
        .expect("profile book parses")
        .profile(name)
        .expect("profile validates");
    Engine::new(profile, RecordingSink::default())
}

/// Run `ticks` ticks `step_ms` apart, returning each sink event with the
/// tick time (ms since start) it happened on
pub fn run_timeline(
    engine: &mut Engine<RecordingSink>,
    ticks: u64,
    step_ms: u64,
    frame: impl Fn(u64) -> Snapshot,
) -> Vec<(u64, String)> {
    let t0 = Instant::now();
    let mut timeline = Vec::new();
    for tick in 0..ticks {
        let t = tick * step_ms;
        let before = engine.sink().events.len();
        engine.tick(&frame(t), t0 + ms(t));
        for event in &engine.sink().events[before..] {
            timeline.push((t, event.clone()));
        }
    }
    timeline
}

pub fn buttons(states: &[bool]) -> Snapshot {
    Snapshot::new(states.to_vec(), vec![])
}

pub fn axes(values: &[f32]) -> Snapshot {
    Snapshot::new(vec![], values.iter().copied().map(Some).collect())
}

/// Plays back snapshots, repeating the last one when exhausted
pub struct ScriptedSource {
    frames: VecDeque<Result<Snapshot, ()>>,
    last: Snapshot,
}

impl ScriptedSource {
    pub fn new(frames: Vec<Result<Snapshot, ()>>) -> Self {
        Self {
            frames: frames.into(),
            last: Snapshot::default(),
        }
    }
}

impl InputSource for ScriptedSource {
    fn poll(&mut self) -> Result<Snapshot, InputError> {
        match self.frames.pop_front() {
            Some(Ok(snapshot)) => {
                self.last = snapshot.clone();
                Ok(snapshot)
            }
            Some(Err(())) => Err(InputError::Disconnected),
            None => Ok(self.last.clone()),
        }
    }
}

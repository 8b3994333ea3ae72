//! Transition detection for buttons and quantized axes

use std::collections::HashMap;

/// Button transition between two consecutive ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEdge {
    /// 0 → 1
    Rising,
    /// 1 → 0
    Falling,
    /// 1 → 1
    Held,
    /// 0 → 0
    Idle,
}

impl ButtonEdge {
    pub fn classify(previous: bool, current: bool) -> Self {
        match (previous, current) {
            (false, true) => ButtonEdge::Rising,
            (true, false) => ButtonEdge::Falling,
            (true, true) => ButtonEdge::Held,
            (false, false) => ButtonEdge::Idle,
        }
    }
}

/// Last seen state of every button, grown on demand
#[derive(Debug, Default)]
pub struct ButtonTracker {
    last: Vec<bool>,
}

impl ButtonTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `current` for `index` and return the transition from last tick
    ///
    /// An index never seen before counts as released.
    pub fn update(&mut self, index: usize, current: bool) -> ButtonEdge {
        if index >= self.last.len() {
            self.last.resize(index + 1, false);
        }
        let edge = ButtonEdge::classify(self.last[index], current);
        self.last[index] = current;
        edge
    }

    /// Number of button slots tracked so far
    pub fn len(&self) -> usize {
        self.last.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last.is_empty()
    }
}

/// Last quantized value per axis
///
/// The first sample of an axis only primes the tracker; transitions start with
/// the second sample. Drift that quantizes to the same value yields nothing.
#[derive(Debug, Default)]
pub struct AxisTracker {
    last: HashMap<usize, u32>,
}

impl AxisTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signed step change since the last sample, if any
    pub fn step_delta(&mut self, axis: usize, step: u32) -> Option<i64> {
        let previous = self.last.insert(axis, step)?;
        let delta = i64::from(step) - i64::from(previous);
        (delta != 0).then_some(delta)
    }

    /// New bucket if it differs from the last sample
    pub fn bucket_change(&mut self, axis: usize, bucket: u32) -> Option<u32> {
        let previous = self.last.insert(axis, bucket)?;
        (previous != bucket).then_some(bucket)
    }

    pub fn last(&self, axis: usize) -> Option<u32> {
        self.last.get(&axis).copied()
    }
}

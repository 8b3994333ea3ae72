//! Auto-repeat state for hold-mode buttons
//!
//! ```text
//!   Idle --Rising--> Active(next = now + delay)
//!   Active --Held, now >= next--> fire, next = now + interval
//!   Active --Falling--> Idle
//! ```

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Repeat cadence for hold-mode buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepeatTiming {
    /// Wait before the first repeat
    pub delay: Duration,
    /// Spacing of subsequent repeats
    pub interval: Duration,
}

/// Next repeat time per active hold-mode button
#[derive(Debug)]
pub struct HoldController {
    timing: RepeatTiming,
    next_fire: HashMap<usize, Instant>,
}

impl HoldController {
    pub fn new(timing: RepeatTiming) -> Self {
        Self {
            timing,
            next_fire: HashMap::new(),
        }
    }

    /// Button went down; the caller fires the immediate press
    pub fn engage(&mut self, button: usize, now: Instant) {
        self.next_fire.insert(button, now + self.timing.delay);
    }

    /// Button still down; true when a repeat is due (and rearms the timer)
    pub fn poll(&mut self, button: usize, now: Instant) -> bool {
        match self.next_fire.get_mut(&button) {
            Some(next) if now >= *next => {
                *next = now + self.timing.interval;
                true
            }
            _ => false,
        }
    }

    /// Button released; any pending repeat is dropped
    pub fn disengage(&mut self, button: usize) {
        self.next_fire.remove(&button);
    }

    pub fn is_active(&self, button: usize) -> bool {
        self.next_fire.contains_key(&button)
    }
}

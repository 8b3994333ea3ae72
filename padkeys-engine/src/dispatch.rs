//! Axis dispatch: sequenced step taps and section repeats
//!
//! A steps axis turns each quantized step change into exactly one tap. Taps
//! are queued and drained one per `tap_interval`, so a stick flicked across
//! several steps in one tick still produces every keystroke, in order.
//! The engine also holds a tap back while its key from the previous tap is
//! still down, so consecutive taps never merge into one long press.
//!
//! `prev`/`next` buttons walk a [`SectionCursor`] over a sections axis' keys.
//! The cursor follows the axis: every bucket change moves it to the new bucket.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Direction of a queued step tap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Positive,
    Negative,
}

/// Pending taps for one steps axis
#[derive(Debug, Clone)]
pub struct StepQueue {
    pending_positive: u32,
    pending_negative: u32,
    /// Direction that drains first while both counters are nonzero
    leading: Option<Direction>,
    next_dispatch: Instant,
}

impl StepQueue {
    pub fn new(now: Instant) -> Self {
        Self {
            pending_positive: 0,
            pending_negative: 0,
            leading: None,
            next_dispatch: now,
        }
    }

    /// Queue `|delta|` taps in the direction of `delta`
    pub fn push(&mut self, delta: i64) {
        let count = u32::try_from(delta.unsigned_abs()).unwrap_or(u32::MAX);
        if count == 0 {
            return;
        }
        let direction = if delta > 0 {
            Direction::Positive
        } else {
            Direction::Negative
        };
        if self.is_empty() {
            self.leading = Some(direction);
        }
        let counter = match direction {
            Direction::Positive => &mut self.pending_positive,
            Direction::Negative => &mut self.pending_negative,
        };
        *counter = counter.saturating_add(count);
    }

    /// Direction of the next tap, without taking it
    pub fn peek(&self) -> Option<Direction> {
        if self.is_empty() {
            return None;
        }
        Some(match self.leading {
            Some(Direction::Negative) if self.pending_negative > 0 => Direction::Negative,
            _ if self.pending_positive > 0 => Direction::Positive,
            _ => Direction::Negative,
        })
    }

    /// Take one tap if the dispatch window is open
    pub fn poll(&mut self, now: Instant, tap_interval: Duration) -> Option<Direction> {
        if now < self.next_dispatch {
            return None;
        }
        let direction = self.peek()?;
        match direction {
            Direction::Positive => self.pending_positive -= 1,
            Direction::Negative => self.pending_negative -= 1,
        }
        self.leading = match (self.pending_positive, self.pending_negative) {
            (0, 0) => None,
            (_, 0) => Some(Direction::Positive),
            (0, _) => Some(Direction::Negative),
            _ => Some(direction),
        };
        self.next_dispatch = now + tap_interval;
        Some(direction)
    }

    pub fn pending(&self) -> (u32, u32) {
        (self.pending_positive, self.pending_negative)
    }

    pub fn is_empty(&self) -> bool {
        self.pending_positive == 0 && self.pending_negative == 0
    }
}

/// Re-dispatch timers for sections axes with `repeat` enabled
#[derive(Debug, Default)]
pub struct SectionRepeat {
    next_repeat: HashMap<usize, Instant>,
}

impl SectionRepeat {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bucket changed: the next repeat is one interval away
    pub fn rearm(&mut self, axis: usize, now: Instant, interval: Duration) {
        self.next_repeat.insert(axis, now + interval);
    }

    /// True when the current bucket's key should fire again
    pub fn poll(&mut self, axis: usize, now: Instant, interval: Duration) -> bool {
        match self.next_repeat.get_mut(&axis) {
            Some(next) if now >= *next => {
                *next = now + interval;
                true
            }
            _ => false,
        }
    }
}

/// Per-axis section index stepped by `prev`/`next` buttons
#[derive(Debug, Default)]
pub struct SectionCursor {
    index: HashMap<usize, u32>,
}

impl SectionCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Align the cursor with the axis' current bucket
    pub fn sync(&mut self, axis: usize, bucket: u32) {
        self.index.insert(axis, bucket);
    }

    /// Move one section, clamped to `0..buckets`
    ///
    /// Returns the new index, or `None` when already at that end.
    pub fn step(&mut self, axis: usize, direction: Direction, buckets: u32) -> Option<u32> {
        let last = buckets.saturating_sub(1);
        let index = self.index.entry(axis).or_insert(0);
        let current = (*index).min(last);
        let next = match direction {
            Direction::Positive if current < last => current + 1,
            Direction::Negative if current > 0 => current - 1,
            _ => return None,
        };
        *index = next;
        Some(next)
    }

    pub fn get(&self, axis: usize) -> Option<u32> {
        self.index.get(&axis).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn drain(queue: &mut StepQueue, t0: Instant, ticks: u64) -> Vec<(u64, Direction)> {
        (0..ticks)
            .map(|tick| tick * 10)
            .filter_map(|t| queue.poll(t0 + ms(t), ms(60)).map(|d| (t, d)))
            .collect()
    }

    #[test]
    fn test_burst_is_spaced() {
        let t0 = Instant::now();
        let mut queue = StepQueue::new(t0);
        queue.push(3);
        let taps = drain(&mut queue, t0, 20);
        assert_eq!(
            taps,
            vec![
                (0, Direction::Positive),
                (60, Direction::Positive),
                (120, Direction::Positive)
            ]
        );
        assert!(queue.is_empty());
    }

    #[test]
    fn test_direction_order_preserved() {
        let t0 = Instant::now();
        let mut queue = StepQueue::new(t0);
        queue.push(-2);
        queue.push(3);
        let dirs: Vec<_> = drain(&mut queue, t0, 40).into_iter().map(|(_, d)| d).collect();
        assert_eq!(
            dirs,
            vec![
                Direction::Negative,
                Direction::Negative,
                Direction::Positive,
                Direction::Positive,
                Direction::Positive
            ]
        );
    }

    #[test]
    fn test_positive_drains_before_late_negative() {
        let t0 = Instant::now();
        let mut queue = StepQueue::new(t0);
        queue.push(2);
        assert_eq!(queue.poll(t0, ms(60)), Some(Direction::Positive));
        queue.push(-1);
        assert_eq!(queue.pending(), (1, 1));
        assert_eq!(queue.poll(t0 + ms(60), ms(60)), Some(Direction::Positive));
        assert_eq!(queue.poll(t0 + ms(120), ms(60)), Some(Direction::Negative));
        assert_eq!(queue.poll(t0 + ms(180), ms(60)), None);
    }

    #[test]
    fn test_idle_queue_fires_immediately() {
        let t0 = Instant::now();
        let mut queue = StepQueue::new(t0);
        queue.push(1);
        assert!(queue.poll(t0, ms(60)).is_some());
        // long after the window closed, a new step goes out on the same tick
        queue.push(1);
        assert!(queue.poll(t0 + ms(1000), ms(60)).is_some());
    }

    #[test]
    fn test_section_repeat() {
        let t0 = Instant::now();
        let mut repeat = SectionRepeat::new();
        assert!(!repeat.poll(2, t0 + ms(5000), ms(500)));
        repeat.rearm(2, t0, ms(500));
        assert!(!repeat.poll(2, t0 + ms(499), ms(500)));
        assert!(repeat.poll(2, t0 + ms(500), ms(500)));
        assert!(!repeat.poll(2, t0 + ms(900), ms(500)));
        assert!(repeat.poll(2, t0 + ms(1000), ms(500)));
    }

    #[test]
    fn test_cursor_clamps_at_both_ends() {
        let mut cursor = SectionCursor::new();
        assert_eq!(cursor.step(2, Direction::Negative, 3), None);
        assert_eq!(cursor.step(2, Direction::Positive, 3), Some(1));
        assert_eq!(cursor.step(2, Direction::Positive, 3), Some(2));
        assert_eq!(cursor.step(2, Direction::Positive, 3), None);
        assert_eq!(cursor.get(2), Some(2));
        assert_eq!(cursor.step(2, Direction::Negative, 3), Some(1));
    }

    #[test]
    fn test_cursor_follows_sync() {
        let mut cursor = SectionCursor::new();
        cursor.sync(0, 5);
        assert_eq!(cursor.step(0, Direction::Negative, 7), Some(4));
        cursor.sync(0, 6);
        assert_eq!(cursor.step(0, Direction::Positive, 7), None);
        assert_eq!(cursor.get(0), Some(6));
        assert_eq!(cursor.get(1), None);
    }
}

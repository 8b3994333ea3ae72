//! Inspect mode: report raw controller activity instead of injecting keys
//!
//! Prints one line per button transition and one line of raw axis values per
//! tick, which is what a profile author needs to find button and axis indices.
//!
//! ```text
//! [button 17] -> PRESS
//! A0:+0.000 | A1:-0.998 | A2:+0.412
//! [button 17] -> RELEASE
//! ```

use crate::driver::TickTarget;
use crate::edge::{ButtonEdge, ButtonTracker};
use crate::snapshot::Snapshot;
use std::io::Write;
use std::time::Instant;
use tracing::warn;

/// Default tick rate for inspect mode
pub const INSPECT_RATE_HZ: u32 = 10;

pub struct Inspector<W> {
    out: W,
    buttons: ButtonTracker,
    write_failed: bool,
}

impl<W: Write> Inspector<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            buttons: ButtonTracker::new(),
            write_failed: false,
        }
    }

    fn report(&mut self, snapshot: &Snapshot) -> std::io::Result<()> {
        let count = snapshot.button_count().max(self.buttons.len());
        for index in 0..count {
            match self.buttons.update(index, snapshot.button(index)) {
                ButtonEdge::Rising => writeln!(self.out, "[button {index}] -> PRESS")?,
                ButtonEdge::Falling => writeln!(self.out, "[button {index}] -> RELEASE")?,
                ButtonEdge::Held | ButtonEdge::Idle => {}
            }
        }

        if snapshot.axis_count() > 0 {
            let line = (0..snapshot.axis_count())
                .map(|a| format!("A{a}:{:+.3}", snapshot.axis(a)))
                .collect::<Vec<_>>()
                .join(" | ");
            writeln!(self.out, "{line}")?;
        }
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> TickTarget for Inspector<W> {
    fn tick(&mut self, snapshot: &Snapshot, _now: Instant) {
        if let Err(e) = self.report(snapshot) {
            if !self.write_failed {
                warn!("Failed to write inspect output: {e}");
                self.write_failed = true;
            }
        }
    }
}

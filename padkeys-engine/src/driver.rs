//! Fixed-rate tick loop
//!
//! The driver is the only active component: it samples the input source on a
//! fixed interval and hands each snapshot to a [`TickTarget`] (the mapping
//! engine in run mode, the inspector in inspect mode). Time is sampled once
//! per tick from the tokio clock, so tests with a paused clock are exact.

use crate::snapshot::{InputSource, Snapshot};
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

/// Default tick rate for run mode
pub const DEFAULT_RATE_HZ: u32 = 120;

/// Something the driver feeds once per tick
pub trait TickTarget {
    fn tick(&mut self, snapshot: &Snapshot, now: Instant);

    /// Tick where the input source failed
    fn idle(&mut self, _now: Instant) {}

    /// Loop is ending
    fn shutdown(&mut self) {}
}

/// Statistics from a finished run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub ticks: u64,
    pub failed_polls: u64,
}

pub struct TickDriver<I> {
    source: I,
    period: Duration,
}

impl<I: InputSource> TickDriver<I> {
    /// Driver ticking `rate_hz` times per second (at least once)
    pub fn new(source: I, rate_hz: u32) -> Self {
        Self::with_period(source, Duration::from_secs(1) / rate_hz.max(1))
    }

    pub fn with_period(source: I, period: Duration) -> Self {
        Self {
            source,
            period: period.max(Duration::from_millis(1)),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Tick until `shutdown` resolves, then let the target flush
    pub async fn run<T, F>(&mut self, target: &mut T, shutdown: F) -> RunStats
    where
        T: TickTarget,
        F: Future<Output = ()>,
    {
        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        let mut stats = RunStats::default();
        let mut degraded = false;

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                _ = interval.tick() => {
                    let now = tokio::time::Instant::now().into_std();
                    stats.ticks += 1;
                    match self.source.poll() {
                        Ok(snapshot) => {
                            if degraded {
                                info!("Input recovered");
                                degraded = false;
                            }
                            target.tick(&snapshot, now);
                        }
                        Err(e) => {
                            if !degraded {
                                warn!("Input unavailable: {e}");
                                degraded = true;
                            }
                            stats.failed_polls += 1;
                            target.idle(now);
                        }
                    }
                }
            }
        }

        target.shutdown();
        stats
    }

    pub fn source(&self) -> &I {
        &self.source
    }

    pub fn into_source(self) -> I {
        self.source
    }
}

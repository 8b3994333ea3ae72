//! Per-tick mapping from controller state to key actions
//!
//! One [`Engine::tick`] runs, in order: every button (index order), every
//! configured axis (ascending index), then due releases, so a release can
//! never overtake a press made in the same tick.

use crate::dispatch::{Direction, SectionCursor, SectionRepeat, StepQueue};
use crate::driver::TickTarget;
use crate::edge::{AxisTracker, ButtonEdge, ButtonTracker};
use crate::hold::HoldController;
use crate::profile::{AxisMapping, ButtonMapping, ButtonMode, Profile};
use crate::quantize::{to_bucket, to_step};
use crate::scheduler::{KeyScheduler, KeySink};
use crate::snapshot::Snapshot;
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, info};

/// Mutable engine state, owned by the engine for the life of a run
#[derive(Debug)]
pub struct EngineState {
    pub buttons: ButtonTracker,
    pub holds: HoldController,
    pub steps: AxisTracker,
    pub buckets: AxisTracker,
    pub step_queues: HashMap<usize, StepQueue>,
    pub section_repeat: SectionRepeat,
    pub cursors: SectionCursor,
}

impl EngineState {
    pub fn new(profile: &Profile) -> Self {
        Self {
            buttons: ButtonTracker::new(),
            holds: HoldController::new(profile.repeat),
            steps: AxisTracker::new(),
            buckets: AxisTracker::new(),
            step_queues: HashMap::new(),
            section_repeat: SectionRepeat::new(),
            cursors: SectionCursor::new(),
        }
    }
}

/// Profile-driven mapping engine
pub struct Engine<S> {
    profile: Profile,
    state: EngineState,
    scheduler: KeyScheduler<S>,
}

impl<S: KeySink> Engine<S> {
    pub fn new(profile: Profile, sink: S) -> Self {
        let state = EngineState::new(&profile);
        Self {
            profile,
            state,
            scheduler: KeyScheduler::new(sink),
        }
    }

    /// Process one snapshot taken at `now`
    pub fn tick(&mut self, snapshot: &Snapshot, now: Instant) {
        self.process_buttons(snapshot, now);
        self.process_axes(snapshot, now);
        self.scheduler.process_releases(now);
    }

    fn process_buttons(&mut self, snapshot: &Snapshot, now: Instant) {
        // also walk previously seen slots so a shrinking snapshot still
        // produces falling edges
        let count = snapshot.button_count().max(self.state.buttons.len());
        for index in 0..count {
            let edge = self.state.buttons.update(index, snapshot.button(index));
            if edge == ButtonEdge::Idle {
                continue;
            }
            if let Some(mapping) = self.profile.buttons.get(&index) {
                handle_button(
                    &self.profile,
                    &mut self.state,
                    &mut self.scheduler,
                    index,
                    mapping,
                    edge,
                    now,
                );
            }
        }
    }

    fn process_axes(&mut self, snapshot: &Snapshot, now: Instant) {
        let Self {
            profile,
            state,
            scheduler,
        } = self;

        for (&axis, mapping) in &profile.axes {
            let value = snapshot.axis(axis);
            match mapping {
                AxisMapping::StepsToButtons {
                    steps,
                    invert,
                    key_positive,
                    key_negative,
                    tap_hold,
                    tap_interval,
                } => {
                    let step = to_step(value, *steps, *invert);
                    if let Some(delta) = state.steps.step_delta(axis, step) {
                        debug!("axis {axis}: step -> {step} ({delta:+})");
                        state
                            .step_queues
                            .entry(axis)
                            .or_insert_with(|| StepQueue::new(now))
                            .push(delta);
                    }
                    let Some(queue) = state.step_queues.get_mut(&axis) else {
                        continue;
                    };
                    let key_for = |direction| match direction {
                        Direction::Positive => key_positive,
                        Direction::Negative => key_negative,
                    };
                    // wait out the previous tap's release before pressing again
                    let blocked = queue
                        .peek()
                        .is_some_and(|d| scheduler.deadline(key_for(d)).is_some());
                    if blocked {
                        continue;
                    }
                    if let Some(direction) = queue.poll(now, *tap_interval) {
                        scheduler.schedule(key_for(direction), *tap_hold, now);
                    }
                }
                AxisMapping::SectionsToKeys {
                    buckets,
                    keys,
                    invert,
                    repeat,
                    repeat_interval,
                } => {
                    let bucket = to_bucket(value, *buckets, *invert);
                    let primed = state.buckets.last(axis).is_some();
                    if !primed {
                        state.cursors.sync(axis, bucket);
                    }
                    if let Some(bucket) = state.buckets.bucket_change(axis, bucket) {
                        debug!("axis {axis}: section -> {bucket}");
                        state.cursors.sync(axis, bucket);
                        if let Some(key) = keys.get(bucket as usize) {
                            scheduler.schedule(key, profile.press_hold, now);
                        }
                        if *repeat {
                            state.section_repeat.rearm(axis, now, *repeat_interval);
                        }
                    } else if *repeat && state.section_repeat.poll(axis, now, *repeat_interval) {
                        let current = state.buckets.last(axis).and_then(|b| keys.get(b as usize));
                        if let Some(key) = current {
                            scheduler.schedule(key, profile.press_hold, now);
                        }
                    }
                }
            }
        }
    }

    /// A tick without a snapshot: only due releases run
    pub fn idle(&mut self, now: Instant) {
        self.scheduler.process_releases(now);
    }

    /// Release every key still held
    pub fn shutdown(&mut self) {
        let held = self.scheduler.held_count();
        if held > 0 {
            info!("Releasing {held} held key(s)");
        }
        self.scheduler.release_all();
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn scheduler(&self) -> &KeyScheduler<S> {
        &self.scheduler
    }

    pub fn sink(&self) -> &S {
        self.scheduler.sink()
    }

    pub fn into_sink(self) -> S {
        self.scheduler.into_sink()
    }
}

fn handle_button<S: KeySink>(
    profile: &Profile,
    state: &mut EngineState,
    scheduler: &mut KeyScheduler<S>,
    index: usize,
    mapping: &ButtonMapping,
    edge: ButtonEdge,
    now: Instant,
) {
    match (edge, mapping.mode) {
        (ButtonEdge::Rising, ButtonMode::Hold) => {
            debug!("button {index}: hold {}", mapping.key);
            scheduler.schedule(&mapping.key, profile.repeat_hold, now);
            state.holds.engage(index, now);
        }
        (ButtonEdge::Rising, ButtonMode::Instant) => {
            debug!("button {index}: instant {}", mapping.key);
            scheduler.instant(&mapping.key);
        }
        (ButtonEdge::Rising, ButtonMode::Single) => {
            debug!("button {index}: press {}", mapping.key);
            scheduler.schedule(&mapping.key, profile.single_hold(mapping), now);
        }
        (ButtonEdge::Held, ButtonMode::Hold) => {
            if state.holds.poll(index, now) {
                scheduler.schedule(&mapping.key, profile.repeat_hold, now);
            }
        }
        (ButtonEdge::Rising, ButtonMode::Prev | ButtonMode::Next) => {
            step_cursor(profile, state, scheduler, index, mapping, now);
        }
        (ButtonEdge::Falling, _) => state.holds.disengage(index),
        _ => {}
    }
}

fn step_cursor<S: KeySink>(
    profile: &Profile,
    state: &mut EngineState,
    scheduler: &mut KeyScheduler<S>,
    index: usize,
    mapping: &ButtonMapping,
    now: Instant,
) {
    let Some(axis) = mapping.axis else {
        return;
    };
    let Some(AxisMapping::SectionsToKeys { buckets, keys, .. }) = profile.axes.get(&axis) else {
        return;
    };
    let direction = match mapping.mode {
        ButtonMode::Next => Direction::Positive,
        _ => Direction::Negative,
    };
    match state.cursors.step(axis, direction, *buckets) {
        Some(section) => {
            debug!("button {index}: {} -> axis {axis} section {section}", mapping.mode.as_str());
            if let Some(key) = keys.get(section as usize) {
                scheduler.schedule(key, profile.single_hold(mapping), now);
            }
        }
        None => {
            let end = if direction == Direction::Positive { "last" } else { "first" };
            debug!("button {index}: axis {axis} already at its {end} section");
        }
    }
}

impl<S: KeySink> TickTarget for Engine<S> {
    fn tick(&mut self, snapshot: &Snapshot, now: Instant) {
        Engine::tick(self, snapshot, now);
    }

    fn idle(&mut self, now: Instant) {
        Engine::idle(self, now);
    }

    fn shutdown(&mut self) {
        Engine::shutdown(self);
    }
}

//! Playback cursor over a recorded step list.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use algoscope_core::{Step, StepList};

use crate::render::RenderState;

/// Delay between auto-mode steps, never below its floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackSpeed {
    delay_ms: u64,
    min_ms: u64,
}

impl PlaybackSpeed {
    pub const DEFAULT_MS: u64 = 500;
    pub const DEFAULT_MIN_MS: u64 = 10;

    /// Clamp `delay_ms` to at least `min_ms`.
    pub fn new(delay_ms: u64, min_ms: u64) -> Self {
        Self {
            delay_ms: delay_ms.max(min_ms),
            min_ms,
        }
    }

    /// Same floor, new delay.
    pub fn with_delay(self, delay_ms: u64) -> Self {
        Self::new(delay_ms, self.min_ms)
    }

    pub fn delay_ms(&self) -> u64 {
        self.delay_ms
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl Default for PlaybackSpeed {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MS, Self::DEFAULT_MIN_MS)
    }
}

/// Current state of playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    /// Loaded but not started, or stopped
    Idle,
    /// Advancing on its own or waiting for the next signal
    Running,
    /// Paused by the user
    Paused,
    /// Every step has been applied
    Done,
}

/// Playback controller for a step list.
///
/// Applying a step means folding it into the live [`RenderState`]. The cursor
/// is the index of the next step to apply, so it only ever grows by one.
#[derive(Debug, Clone)]
pub struct Playback {
    steps: StepList,
    cursor: usize,
    state: PlaybackState,
    step_mode: bool,
    speed: PlaybackSpeed,
    initial: RenderState,
    render: RenderState,
}

impl Default for Playback {
    fn default() -> Self {
        Self::new(StepList::default(), RenderState::default())
    }
}

impl Playback {
    /// Create a new playback controller.
    pub fn new(steps: StepList, initial: RenderState) -> Self {
        Self {
            steps,
            cursor: 0,
            state: PlaybackState::Idle,
            step_mode: false,
            speed: PlaybackSpeed::default(),
            render: initial.clone(),
            initial,
        }
    }

    pub fn with_speed(mut self, speed: PlaybackSpeed) -> Self {
        self.speed = speed;
        self
    }

    /// Swap in a new recording. Mode and speed carry over.
    pub fn load(&mut self, steps: StepList, initial: RenderState) {
        self.steps = steps;
        self.cursor = 0;
        self.state = PlaybackState::Idle;
        self.render = initial.clone();
        self.initial = initial;
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn total_steps(&self) -> usize {
        self.steps.len()
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn step_mode(&self) -> bool {
        self.step_mode
    }

    pub fn speed(&self) -> PlaybackSpeed {
        self.speed
    }

    pub fn steps(&self) -> &StepList {
        &self.steps
    }

    /// Live render state.
    pub fn render(&self) -> &RenderState {
        &self.render
    }

    /// Start or continue. A finished recording restarts from the top.
    pub fn play(&mut self) {
        if self.state == PlaybackState::Done || self.cursor >= self.steps.len() {
            self.reset();
        }
        self.state = if self.steps.is_empty() {
            PlaybackState::Done
        } else {
            PlaybackState::Running
        };
    }

    pub fn pause(&mut self) {
        if self.state == PlaybackState::Running {
            self.state = PlaybackState::Paused;
        }
    }

    /// Stop where we are. The render state stays at the last applied step.
    pub fn stop(&mut self) {
        if self.state != PlaybackState::Done {
            self.state = PlaybackState::Idle;
        }
    }

    pub fn set_step_mode(&mut self, enabled: bool) {
        self.step_mode = enabled;
    }

    /// Set the delay, clamped to the speed floor.
    pub fn set_speed_ms(&mut self, delay_ms: u64) {
        self.speed = self.speed.with_delay(delay_ms);
    }

    /// Apply exactly the next step.
    pub fn advance(&mut self) -> Option<&Step> {
        let Some(step) = self.steps.get(self.cursor) else {
            self.state = PlaybackState::Done;
            return None;
        };
        self.render.apply(step);
        self.cursor += 1;
        if self.cursor == self.steps.len() {
            self.state = PlaybackState::Done;
        }
        Some(step)
    }

    /// Back to cursor 0 and the initial render state.
    pub fn reset(&mut self) {
        self.cursor = 0;
        self.render = self.initial.clone();
        self.state = PlaybackState::Idle;
    }

    /// Jump so that exactly the first `cursor` steps are applied.
    pub fn seek(&mut self, cursor: usize) {
        let target = cursor.min(self.steps.len());
        self.render = self.initial.clone();
        for step in self.steps.iter().take(target) {
            self.render.apply(step);
        }
        self.cursor = target;
        if target == self.steps.len() && !self.steps.is_empty() {
            self.state = PlaybackState::Done;
        } else if self.state == PlaybackState::Done {
            self.state = PlaybackState::Paused;
        }
    }

    /// Calculate progress as a fraction (0.0 - 1.0).
    pub fn progress(&self) -> f64 {
        if self.steps.is_empty() {
            0.0
        } else {
            self.cursor as f64 / self.steps.len() as f64
        }
    }
}

/// Playback status for sending to the frontend.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackStatus {
    pub cursor: usize,
    pub total_steps: usize,
    pub state: PlaybackState,
    pub step_mode: bool,
    pub speed_ms: u64,
    pub progress: f64,
}

impl From<&Playback> for PlaybackStatus {
    fn from(playback: &Playback) -> Self {
        Self {
            cursor: playback.cursor,
            total_steps: playback.total_steps(),
            state: playback.state,
            step_mode: playback.step_mode,
            speed_ms: playback.speed.delay_ms(),
            progress: playback.progress(),
        }
    }
}

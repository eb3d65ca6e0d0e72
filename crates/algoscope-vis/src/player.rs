//! Async runner that applies steps on a timer or on demand.
//!
//! A [`Player`] owns the shared [`Playback`], a [`StepGate`] and at most one
//! background task. In auto mode the task applies a step, sleeps the current
//! delay and repeats. In step mode it applies a step and parks on the gate
//! until [`Player::next`] is called. Steps are applied under the playback
//! lock, so two steps never land at once. Control calls hold the task slot
//! from cancellation until they are done, so at most one task ever runs.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{broadcast, watch, Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use algoscope_core::{Step, StepList};

use crate::gate::StepGate;
use crate::playback::{Playback, PlaybackState, PlaybackStatus};
use crate::render::RenderState;

const APPLIED_CAPACITY: usize = 1024;

/// A step that was just applied, for streaming to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedStep {
    pub index: usize,
    pub step: Step,
}

struct Task {
    stop: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

pub struct Player {
    playback: Arc<Mutex<Playback>>,
    gate: Arc<StepGate>,
    task: Mutex<Option<Task>>,
    applied: broadcast::Sender<AppliedStep>,
}

impl Player {
    pub fn new(playback: Playback) -> Self {
        let (applied, _) = broadcast::channel(APPLIED_CAPACITY);
        Self {
            playback: Arc::new(Mutex::new(playback)),
            gate: Arc::new(StepGate::new()),
            task: Mutex::new(None),
            applied,
        }
    }

    /// Receive every step applied from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<AppliedStep> {
        self.applied.subscribe()
    }

    pub async fn status(&self) -> PlaybackStatus {
        PlaybackStatus::from(&*self.playback.lock().await)
    }

    pub async fn render(&self) -> RenderState {
        self.playback.lock().await.render().clone()
    }

    /// Whether a step-mode task is parked on the gate.
    pub fn is_waiting(&self) -> bool {
        self.gate.is_waiting()
    }

    /// Replace the recording. Any running task is cancelled first.
    pub async fn load(&self, steps: StepList, initial: RenderState) {
        let _task = self.cancel().await;
        let mut playback = self.playback.lock().await;
        debug!(steps = steps.len(), "loading recording");
        playback.load(steps, initial);
    }

    /// Start playback, cancelling whatever was running.
    pub async fn start(&self) -> PlaybackStatus {
        let mut task = self.cancel().await;

        let status = {
            let mut playback = self.playback.lock().await;
            playback.play();
            PlaybackStatus::from(&*playback)
        };
        if status.state != PlaybackState::Running {
            return status;
        }
        info!(
            steps = status.total_steps,
            cursor = status.cursor,
            step_mode = status.step_mode,
            "playback started"
        );

        let (stop, stopped) = watch::channel(false);
        let handle = tokio::spawn(run(
            self.playback.clone(),
            self.gate.clone(),
            self.applied.clone(),
            stopped,
        ));
        *task = Some(Task { stop, handle });
        status
    }

    pub async fn pause(&self) -> PlaybackStatus {
        let _task = self.cancel().await;
        let mut playback = self.playback.lock().await;
        playback.pause();
        PlaybackStatus::from(&*playback)
    }

    /// Continue a paused playback from its cursor.
    pub async fn resume(&self) -> PlaybackStatus {
        let state = self.playback.lock().await.state();
        match state {
            PlaybackState::Paused | PlaybackState::Idle => self.start().await,
            _ => self.status().await,
        }
    }

    /// Cancel and keep the render state where it is.
    pub async fn stop(&self) -> PlaybackStatus {
        let _task = self.cancel().await;
        let mut playback = self.playback.lock().await;
        playback.stop();
        PlaybackStatus::from(&*playback)
    }

    /// Cancel and return to the initial render state.
    pub async fn reset(&self) -> PlaybackStatus {
        let _task = self.cancel().await;
        let mut playback = self.playback.lock().await;
        playback.reset();
        PlaybackStatus::from(&*playback)
    }

    /// Advance one step.
    ///
    /// Resumes a task parked on the gate. With no task running, applies the
    /// next step directly. Returns whether a step was triggered.
    pub async fn next(&self) -> bool {
        if self.gate.signal() {
            return true;
        }
        if self.is_active().await {
            return false;
        }
        let mut playback = self.playback.lock().await;
        let index = playback.cursor();
        match playback.advance() {
            Some(step) => {
                let _ = self.applied.send(AppliedStep {
                    index,
                    step: step.clone(),
                });
                true
            }
            None => false,
        }
    }

    /// Switch between auto and step mode. Leaving step mode releases a
    /// parked task so it carries on by itself.
    pub async fn set_step_mode(&self, enabled: bool) -> PlaybackStatus {
        let status = {
            let mut playback = self.playback.lock().await;
            playback.set_step_mode(enabled);
            PlaybackStatus::from(&*playback)
        };
        if !enabled {
            self.gate.signal();
        }
        status
    }

    pub async fn set_speed(&self, delay_ms: u64) -> PlaybackStatus {
        let mut playback = self.playback.lock().await;
        playback.set_speed_ms(delay_ms);
        PlaybackStatus::from(&*playback)
    }

    /// Wait for the running task to finish on its own.
    pub async fn wait(&self) {
        let task = self.task.lock().await.take();
        if let Some(Task { stop, handle }) = task {
            join(handle).await;
            drop(stop);
        }
    }

    async fn is_active(&self) -> bool {
        self.task
            .lock()
            .await
            .as_ref()
            .is_some_and(|task| !task.handle.is_finished())
    }

    /// Stop the running task and hand back the now-empty task slot.
    async fn cancel(&self) -> MutexGuard<'_, Option<Task>> {
        let mut slot = self.task.lock().await;
        self.gate.cancel();
        if let Some(task) = slot.take() {
            let _ = task.stop.send(true);
            join(task.handle).await;
            debug!("playback task cancelled");
        }
        slot
    }
}

async fn join(handle: JoinHandle<()>) {
    if let Err(e) = handle.await {
        warn!(error = %e, "playback task failed");
    }
}

async fn run(
    playback: Arc<Mutex<Playback>>,
    gate: Arc<StepGate>,
    applied: broadcast::Sender<AppliedStep>,
    mut stopped: watch::Receiver<bool>,
) {
    loop {
        let stop_requested = *stopped.borrow();
        if stop_requested {
            return;
        }
        let (delay, step_mode) = {
            let mut playback = playback.lock().await;
            if playback.state() != PlaybackState::Running {
                return;
            }
            let index = playback.cursor();
            let Some(step) = playback.advance().cloned() else {
                return;
            };
            let _ = applied.send(AppliedStep { index, step });
            if playback.state() == PlaybackState::Done {
                info!(steps = playback.total_steps(), "playback finished");
                return;
            }
            (playback.speed().delay(), playback.step_mode())
        };

        if step_mode {
            tokio::select! {
                _ = stopped.changed() => return,
                resumed = gate.wait() => {
                    if resumed.is_err() {
                        return;
                    }
                }
            }
        } else {
            tokio::select! {
                _ = stopped.changed() => return,
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::PlaybackSpeed;
    use algoscope_core::StepKind;
    use std::time::Duration;
    use tokio::sync::broadcast::error::TryRecvError;

    fn recording(count: usize) -> StepList {
        let array = vec![1.0; count.max(1)];
        (0..count)
            .map(|i| {
                if i + 1 == count {
                    Step::done(&array)
                } else {
                    Step::on_array(StepKind::Compare, vec![i], &array)
                }
            })
            .collect()
    }

    fn player(count: usize) -> Player {
        slow_player(count, 1)
    }

    fn slow_player(count: usize, delay_ms: u64) -> Player {
        let speed = PlaybackSpeed::new(delay_ms, 1);
        Player::new(Playback::new(recording(count), RenderState::default()).with_speed(speed))
    }

    async fn until_cursor(player: &Player, cursor: usize) {
        while player.status().await.cursor < cursor {
            tokio::task::yield_now().await;
        }
    }

    async fn until_waiting(player: &Player) {
        while !player.is_waiting() {
            tokio::task::yield_now().await;
        }
    }

    fn drain(applied: &mut broadcast::Receiver<AppliedStep>) -> Vec<usize> {
        let mut seen = Vec::new();
        while let Ok(step) = applied.try_recv() {
            seen.push(step.index);
        }
        seen
    }

    #[tokio::test]
    async fn auto_mode_applies_every_step_in_order() {
        let player = player(8);
        let mut applied = player.subscribe();

        player.start().await;
        player.wait().await;

        assert_eq!(drain(&mut applied), (0..8).collect::<Vec<_>>());
        let status = player.status().await;
        assert_eq!(status.state, PlaybackState::Done);
        assert_eq!(status.cursor, 8);
        assert!(player.render().await.finished);
    }

    #[tokio::test]
    async fn step_mode_waits_for_each_signal() {
        let player = player(4);
        player.set_step_mode(true).await;
        let mut applied = player.subscribe();

        player.start().await;
        for expected in 0..3 {
            until_waiting(&player).await;
            assert_eq!(drain(&mut applied), vec![expected]);
            assert_eq!(applied.try_recv().unwrap_err(), TryRecvError::Empty);
            assert!(player.next().await);
        }
        player.wait().await;

        assert_eq!(drain(&mut applied), vec![3]);
        assert_eq!(player.status().await.state, PlaybackState::Done);
    }

    #[tokio::test]
    async fn reset_cancels_a_parked_task() {
        let player = player(5);
        player.set_step_mode(true).await;
        let mut applied = player.subscribe();

        player.start().await;
        until_waiting(&player).await;
        let status = player.reset().await;

        assert_eq!(status.cursor, 0);
        assert_eq!(status.state, PlaybackState::Idle);
        assert!(!player.is_waiting());
        assert_eq!(drain(&mut applied), vec![0]);
        assert_eq!(player.render().await, RenderState::default());
    }

    #[tokio::test]
    async fn stop_keeps_the_cursor() {
        let player = player(5);
        player.set_step_mode(true).await;

        player.start().await;
        until_waiting(&player).await;
        assert!(player.next().await);
        until_waiting(&player).await;

        let status = player.stop().await;
        assert_eq!(status.cursor, 2);
        assert_eq!(status.state, PlaybackState::Idle);
    }

    #[tokio::test]
    async fn next_without_a_task_advances_directly() {
        let player = player(3);
        let mut applied = player.subscribe();

        assert!(player.next().await);
        assert!(player.next().await);
        assert_eq!(drain(&mut applied), vec![0, 1]);
        assert_eq!(player.status().await.cursor, 2);
    }

    #[tokio::test]
    async fn leaving_step_mode_lets_the_task_finish() {
        let player = player(6);
        player.set_step_mode(true).await;

        player.start().await;
        until_waiting(&player).await;
        player.set_step_mode(false).await;
        player.wait().await;

        assert_eq!(player.status().await.cursor, 6);
    }

    #[tokio::test]
    async fn restarting_cancels_the_previous_task() {
        let player = player(4);
        player.set_step_mode(true).await;

        player.start().await;
        until_waiting(&player).await;
        player.load(recording(2), RenderState::default()).await;
        assert!(!player.is_waiting());

        player.set_step_mode(false).await;
        player.start().await;
        player.wait().await;
        assert_eq!(player.status().await.cursor, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn pause_holds_the_cursor_while_time_passes() {
        let player = slow_player(5, 60_000);
        let mut applied = player.subscribe();

        player.start().await;
        until_cursor(&player, 1).await;
        let status = player.pause().await;
        tokio::time::sleep(Duration::from_secs(600)).await;

        assert_eq!(status.state, PlaybackState::Paused);
        assert_eq!(player.status().await.cursor, 1);
        assert_eq!(drain(&mut applied), vec![0]);
    }

    #[tokio::test(start_paused = true)]
    async fn resume_continues_from_the_cursor() {
        let player = slow_player(5, 60_000);
        let mut applied = player.subscribe();

        player.start().await;
        until_cursor(&player, 1).await;
        player.pause().await;
        assert_eq!(drain(&mut applied), vec![0]);

        let status = player.set_speed(5).await;
        assert_eq!(status.speed_ms, 5);
        let status = player.resume().await;
        assert_eq!(status.state, PlaybackState::Running);
        assert_eq!(status.cursor, 1);
        player.wait().await;

        assert_eq!(drain(&mut applied), vec![1, 2, 3, 4]);
        let status = player.status().await;
        assert_eq!(status.state, PlaybackState::Done);
        assert_eq!(status.cursor, 5);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_clears_the_pending_delay() {
        let player = slow_player(5, 60_000);
        let mut applied = player.subscribe();

        player.start().await;
        until_cursor(&player, 1).await;
        let status = player.stop().await;
        tokio::time::sleep(Duration::from_secs(600)).await;

        assert_eq!(status.state, PlaybackState::Idle);
        assert_eq!(drain(&mut applied), vec![0]);
        assert_eq!(player.status().await.cursor, 1);
    }

    #[tokio::test]
    async fn resume_is_a_no_op_while_running() {
        let player = slow_player(5, 60_000);
        player.start().await;
        until_cursor(&player, 1).await;

        let status = player.resume().await;
        assert_eq!(status.state, PlaybackState::Running);
        assert_eq!(status.cursor, 1);
        player.stop().await;
    }

    #[tokio::test]
    async fn concurrent_starts_run_a_single_task() {
        let player = slow_player(5, 60_000);
        let mut applied = player.subscribe();

        let (first, second) = tokio::join!(player.start(), player.start());
        assert_eq!(first.state, PlaybackState::Running);
        assert_eq!(second.state, PlaybackState::Running);
        until_cursor(&player, 1).await;
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }

        assert_eq!(drain(&mut applied), vec![0]);
        assert_eq!(player.stop().await.cursor, 1);
    }
}

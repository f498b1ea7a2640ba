//! Countdown engine.
//!
//! Owns a [`CountdownState`] and drives it with a fast display tick, applying
//! user commands and emitting events over an unbounded channel. Transition
//! and completion moments come with a short train of notification pulses.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};

use crate::countdown::stage::Stage;
use crate::countdown::state::{CountdownState, RunPhase, SampleEvent};
use crate::countdown::view::ViewState;

/// Display refresh period.
pub const DISPLAY_TICK: Duration = Duration::from_millis(10);

/// Number of notification pulses per transition or completion.
pub const PULSE_COUNT: u8 = 3;

/// Spacing between consecutive pulses.
pub const PULSE_SPACING: Duration = Duration::from_millis(600);

// ============================================================================
// Events and commands
// ============================================================================

/// Events pushed to the presentation surface.
#[derive(Debug, Clone, PartialEq)]
pub enum CountdownEvent {
    /// A run began on the named stage.
    Started {
        /// Name of the first runnable stage.
        stage: String,
    },
    /// The run was paused with this much time left.
    Paused {
        /// Frozen remaining time.
        remaining: Duration,
    },
    /// The run resumed from pause.
    Resumed,
    /// One stage finished and the next began.
    StageTransition {
        /// Name of the completed stage.
        completed: String,
        /// Name of the now-active stage.
        next: String,
    },
    /// The final stage finished.
    Completed,
    /// One notification pulse (1-based index within the train).
    Pulse {
        /// Position within the pulse train.
        index: u8,
    },
    /// The timer was reset to idle.
    Reset,
    /// A display refresh frame.
    Tick {
        /// View to render.
        view: ViewState,
    },
    /// A command was rejected; the run is unaffected.
    Rejected {
        /// Human-readable rejection reason.
        reason: String,
    },
}

/// User commands accepted by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountdownCommand {
    /// Start when idle or completed, pause when running, resume when paused.
    Toggle,
    /// Explicit start.
    Start,
    /// Explicit pause.
    Pause,
    /// Reset to idle.
    Reset,
    /// Stop the engine loop.
    Quit,
    /// Append a stage to the configuration.
    AddStage {
        /// Stage name.
        name: String,
        /// Stage duration.
        duration: Duration,
    },
    /// Remove the stage at a zero-based index.
    RemoveStage {
        /// Zero-based stage index.
        index: usize,
    },
    /// Rename the stage at a zero-based index.
    RenameStage {
        /// Zero-based stage index.
        index: usize,
        /// New name.
        name: String,
    },
}

// ============================================================================
// CountdownEngine
// ============================================================================

/// Runs the countdown loop until quit.
pub struct CountdownEngine {
    state: CountdownState,
    event_tx: mpsc::UnboundedSender<CountdownEvent>,
    command_rx: mpsc::UnboundedReceiver<CountdownCommand>,
    /// Pulses scheduled but not yet fired, as (due instant, 1-based index).
    pending_pulses: VecDeque<(Instant, u8)>,
}

impl CountdownEngine {
    /// Creates an engine over an already-constructed state machine.
    pub fn new(
        state: CountdownState,
        event_tx: mpsc::UnboundedSender<CountdownEvent>,
        command_rx: mpsc::UnboundedReceiver<CountdownCommand>,
    ) -> Self {
        Self {
            state,
            event_tx,
            command_rx,
            pending_pulses: VecDeque::new(),
        }
    }

    /// Runs the engine loop until a quit command or closed channel.
    pub async fn run(mut self) -> Result<()> {
        let mut ticker = interval(DISPLAY_TICK);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.on_tick(Instant::now())?;
                }
                cmd = self.command_rx.recv() => match cmd {
                    Some(CountdownCommand::Quit) | None => break,
                    Some(cmd) => self.on_command(cmd, Instant::now())?,
                },
            }
        }
        Ok(())
    }

    fn on_tick(&mut self, now: Instant) -> Result<()> {
        if let Some(event) = self.state.sample(now) {
            match event {
                SampleEvent::StageTransition { completed, next } => {
                    self.send(CountdownEvent::StageTransition { completed, next })?;
                }
                SampleEvent::Completed { .. } => {
                    self.send(CountdownEvent::Completed)?;
                }
            }
            self.schedule_pulses(now);
        }

        self.flush_pulses(now)?;

        // Frames are only worth sending while something on screen changes.
        if self.state.phase() == RunPhase::Running || !self.pending_pulses.is_empty() {
            self.send(CountdownEvent::Tick {
                view: ViewState::capture(&self.state, now),
            })?;
        }
        Ok(())
    }

    fn on_command(&mut self, cmd: CountdownCommand, now: Instant) -> Result<()> {
        let outcome = match cmd {
            CountdownCommand::Toggle => match self.state.phase() {
                RunPhase::Idle | RunPhase::Completed => self.start(now),
                RunPhase::Running => self.pause(now),
                RunPhase::Paused => self.resume(now),
            },
            CountdownCommand::Start => self.start(now),
            CountdownCommand::Pause => self.pause(now),
            CountdownCommand::Reset => {
                self.state.reset();
                self.pending_pulses.clear();
                self.send(CountdownEvent::Reset)?;
                self.send(CountdownEvent::Tick {
                    view: ViewState::capture(&self.state, now),
                })?;
                Ok(())
            }
            CountdownCommand::AddStage { name, duration } => self
                .state
                .add_stage(Stage::new(name, duration))
                .map_err(|e| e.to_string()),
            CountdownCommand::RemoveStage { index } => self
                .state
                .remove_stage(index)
                .map(|_| ())
                .map_err(|e| e.to_string()),
            CountdownCommand::RenameStage { index, name } => self
                .state
                .rename_stage(index, name)
                .map_err(|e| e.to_string()),
            CountdownCommand::Quit => Ok(()),
        };

        if let Err(reason) = outcome {
            self.send(CountdownEvent::Rejected { reason })?;
        }
        Ok(())
    }

    fn start(&mut self, now: Instant) -> std::result::Result<(), String> {
        match self.state.start(now) {
            Ok(stage) => {
                let name = stage.name.clone();
                self.pending_pulses.clear();
                self.send(CountdownEvent::Started { stage: name })
                    .map_err(|e| e.to_string())?;
                Ok(())
            }
            Err(e) => Err(e.to_string()),
        }
    }

    fn pause(&mut self, now: Instant) -> std::result::Result<(), String> {
        match self.state.pause(now) {
            Ok(remaining) => {
                self.send(CountdownEvent::Paused { remaining })
                    .map_err(|e| e.to_string())?;
                Ok(())
            }
            Err(e) => Err(e.to_string()),
        }
    }

    fn resume(&mut self, now: Instant) -> std::result::Result<(), String> {
        match self.state.resume(now) {
            Ok(_) => {
                self.send(CountdownEvent::Resumed).map_err(|e| e.to_string())?;
                Ok(())
            }
            Err(e) => Err(e.to_string()),
        }
    }

    /// Schedules the pulse train: one pulse now, the rest spaced by
    /// [`PULSE_SPACING`].
    fn schedule_pulses(&mut self, now: Instant) {
        self.pending_pulses.clear();
        for i in 0..PULSE_COUNT {
            self.pending_pulses
                .push_back((now + PULSE_SPACING * u32::from(i), i + 1));
        }
    }

    fn flush_pulses(&mut self, now: Instant) -> Result<()> {
        while let Some(&(due, index)) = self.pending_pulses.front() {
            if due > now {
                break;
            }
            self.pending_pulses.pop_front();
            self.send(CountdownEvent::Pulse { index })?;
        }
        Ok(())
    }

    fn send(&self, event: CountdownEvent) -> Result<()> {
        self.event_tx
            .send(event)
            .context("failed to send countdown event")
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::countdown::stage::StagePlan;
    use tokio::time::timeout;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn engine_over(
        plan: StagePlan,
    ) -> (
        CountdownEngine,
        mpsc::UnboundedSender<CountdownCommand>,
        mpsc::UnboundedReceiver<CountdownEvent>,
    ) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        (
            CountdownEngine::new(CountdownState::new(plan), event_tx, command_rx),
            command_tx,
            event_rx,
        )
    }

    async fn next_non_tick(
        rx: &mut mpsc::UnboundedReceiver<CountdownEvent>,
    ) -> CountdownEvent {
        loop {
            let event = timeout(Duration::from_secs(5), rx.recv())
                .await
                .expect("engine stalled")
                .expect("channel closed early");
            if !matches!(event, CountdownEvent::Tick { .. }) {
                return event;
            }
        }
    }

    #[tokio::test]
    async fn test_run_to_completion_with_pulses() {
        // The second stage outlasts the pulse train (2 x 600ms after the
        // transition) so all three pulses land before completion.
        let mut plan = StagePlan::new(Stage::new("Work", ms(40)));
        plan.add(Stage::new("Rest", ms(2000)));
        let (engine, command_tx, mut event_rx) = engine_over(plan);

        let handle = tokio::spawn(engine.run());
        command_tx.send(CountdownCommand::Start).unwrap();

        assert_eq!(
            next_non_tick(&mut event_rx).await,
            CountdownEvent::Started {
                stage: "Work".to_string()
            }
        );
        assert_eq!(
            next_non_tick(&mut event_rx).await,
            CountdownEvent::StageTransition {
                completed: "Work".to_string(),
                next: "Rest".to_string()
            }
        );
        // First pulse fires in the same tick as the transition.
        assert_eq!(
            next_non_tick(&mut event_rx).await,
            CountdownEvent::Pulse { index: 1 }
        );
        assert_eq!(
            next_non_tick(&mut event_rx).await,
            CountdownEvent::Pulse { index: 2 }
        );
        assert_eq!(
            next_non_tick(&mut event_rx).await,
            CountdownEvent::Pulse { index: 3 }
        );

        assert_eq!(next_non_tick(&mut event_rx).await, CountdownEvent::Completed);
        assert_eq!(
            next_non_tick(&mut event_rx).await,
            CountdownEvent::Pulse { index: 1 }
        );

        command_tx.send(CountdownCommand::Quit).unwrap();
        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_toggle_cycles_start_pause_resume() {
        let (engine, command_tx, mut event_rx) =
            engine_over(StagePlan::new(Stage::new("Solo", Duration::from_secs(60))));

        let handle = tokio::spawn(engine.run());

        command_tx.send(CountdownCommand::Toggle).unwrap();
        assert!(matches!(
            next_non_tick(&mut event_rx).await,
            CountdownEvent::Started { .. }
        ));

        command_tx.send(CountdownCommand::Toggle).unwrap();
        assert!(matches!(
            next_non_tick(&mut event_rx).await,
            CountdownEvent::Paused { .. }
        ));

        command_tx.send(CountdownCommand::Toggle).unwrap();
        assert_eq!(next_non_tick(&mut event_rx).await, CountdownEvent::Resumed);

        command_tx.send(CountdownCommand::Quit).unwrap();
        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_edit_while_running_is_rejected() {
        let (engine, command_tx, mut event_rx) =
            engine_over(StagePlan::new(Stage::new("Solo", Duration::from_secs(60))));

        let handle = tokio::spawn(engine.run());
        command_tx.send(CountdownCommand::Start).unwrap();
        assert!(matches!(
            next_non_tick(&mut event_rx).await,
            CountdownEvent::Started { .. }
        ));

        command_tx
            .send(CountdownCommand::AddStage {
                name: "Extra".to_string(),
                duration: Duration::from_secs(5),
            })
            .unwrap();
        assert!(matches!(
            next_non_tick(&mut event_rx).await,
            CountdownEvent::Rejected { .. }
        ));

        command_tx.send(CountdownCommand::Quit).unwrap();
        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_reset_clears_pending_pulses() {
        let (engine, command_tx, mut event_rx) =
            engine_over(StagePlan::new(Stage::new("Quick", ms(30))));

        let handle = tokio::spawn(engine.run());
        command_tx.send(CountdownCommand::Start).unwrap();

        assert!(matches!(
            next_non_tick(&mut event_rx).await,
            CountdownEvent::Started { .. }
        ));
        assert_eq!(next_non_tick(&mut event_rx).await, CountdownEvent::Completed);
        assert_eq!(
            next_non_tick(&mut event_rx).await,
            CountdownEvent::Pulse { index: 1 }
        );

        // Reset before pulses 2 and 3 are due.
        command_tx.send(CountdownCommand::Reset).unwrap();
        assert_eq!(next_non_tick(&mut event_rx).await, CountdownEvent::Reset);

        command_tx.send(CountdownCommand::Quit).unwrap();
        handle.await.unwrap().unwrap();

        // Drain: no pulse may follow the reset.
        while let Some(event) = event_rx.recv().await {
            assert!(!matches!(event, CountdownEvent::Pulse { .. }));
        }
    }

    #[tokio::test]
    async fn test_start_with_all_zero_stages_rejected() {
        let (engine, command_tx, mut event_rx) =
            engine_over(StagePlan::new(Stage::new("Empty", Duration::ZERO)));

        let handle = tokio::spawn(engine.run());
        command_tx.send(CountdownCommand::Start).unwrap();
        assert!(matches!(
            next_non_tick(&mut event_rx).await,
            CountdownEvent::Rejected { .. }
        ));

        command_tx.send(CountdownCommand::Quit).unwrap();
        handle.await.unwrap().unwrap();
    }
}

//! Pure countdown state machine.
//!
//! Every method that depends on time takes `now: Instant`; the machine never
//! reads the clock itself. Remaining time is always derived from the
//! wall-clock anchor, so tick scheduling jitter and pause length cannot
//! drift it.

use std::time::{Duration, Instant};

use crate::countdown::error::CountdownError;
use crate::countdown::stage::{first_runnable, Stage, StagePlan};

/// Remaining time at or below this threshold puts the display in a warning
/// state.
pub const WARNING_THRESHOLD: Duration = Duration::from_millis(5000);

// ============================================================================
// RunPhase
// ============================================================================

/// The run phase of the countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunPhase {
    /// Not started; stage configuration is editable.
    #[default]
    Idle,
    /// Counting down.
    Running,
    /// Frozen at the last sampled remaining time.
    Paused,
    /// All stages finished; configuration is editable again.
    Completed,
}

impl RunPhase {
    /// Returns the string representation of the phase.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            RunPhase::Idle => "idle",
            RunPhase::Running => "running",
            RunPhase::Paused => "paused",
            RunPhase::Completed => "completed",
        }
    }

    /// True while a run is in progress (running or paused); stage edits are
    /// rejected in these phases.
    #[must_use]
    pub fn is_run_in_progress(&self) -> bool {
        matches!(self, RunPhase::Running | RunPhase::Paused)
    }
}

// ============================================================================
// Sample events
// ============================================================================

/// State changes produced by a sampling pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SampleEvent {
    /// The active stage finished and the chain advanced to the next stage
    /// with positive duration. Zero-duration stages in between are skipped
    /// silently.
    StageTransition {
        /// Name of the stage that just completed.
        completed: String,
        /// Name of the stage now active.
        next: String,
    },
    /// The last stage finished; the run is complete.
    Completed {
        /// Name of the final stage.
        last: String,
    },
}

// ============================================================================
// CountdownState
// ============================================================================

/// The countdown core: stage plan, run snapshot, phase and anchor.
#[derive(Debug)]
pub struct CountdownState {
    plan: StagePlan,
    /// Stages captured at start; edits to `plan` during a run do not affect
    /// the snapshot.
    snapshot: Vec<Stage>,
    current: usize,
    /// Remaining time at the moment the anchor was (re)set.
    remaining_at_anchor: Duration,
    anchor: Option<Instant>,
    phase: RunPhase,
}

impl CountdownState {
    /// Creates an idle state over `plan`.
    #[must_use]
    pub fn new(plan: StagePlan) -> Self {
        Self {
            plan,
            snapshot: Vec::new(),
            current: 0,
            remaining_at_anchor: Duration::ZERO,
            anchor: None,
            phase: RunPhase::Idle,
        }
    }

    /// Current run phase.
    #[must_use]
    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    /// The editable stage plan.
    #[must_use]
    pub fn plan(&self) -> &StagePlan {
        &self.plan
    }

    /// Index of the active stage within the run snapshot (0 when idle).
    #[must_use]
    pub fn stage_index(&self) -> usize {
        self.current
    }

    /// Number of stages in the active snapshot, falling back to the plan
    /// when no run is in progress.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        if self.snapshot.is_empty() {
            self.plan.len()
        } else {
            self.snapshot.len()
        }
    }

    /// The stage currently shown: the active snapshot stage during a run,
    /// otherwise the first configured stage.
    #[must_use]
    pub fn current_stage(&self) -> &Stage {
        self.snapshot
            .get(self.current)
            .unwrap_or_else(|| &self.plan.stages()[0])
    }

    /// Duration of the active stage (zero when idle).
    #[must_use]
    pub fn stage_duration(&self) -> Duration {
        if self.snapshot.is_empty() {
            Duration::ZERO
        } else {
            self.snapshot[self.current].duration
        }
    }

    // ------------------------------------------------------------------
    // Stage editing (rejected while a run is in progress)
    // ------------------------------------------------------------------

    /// Appends a stage to the plan.
    ///
    /// # Errors
    ///
    /// Fails with [`CountdownError::EditingLocked`] during a run.
    pub fn add_stage(&mut self, stage: Stage) -> Result<(), CountdownError> {
        self.ensure_editable()?;
        self.plan.add(stage);
        Ok(())
    }

    /// Removes the stage at `index` from the plan.
    ///
    /// # Errors
    ///
    /// Fails when editing is locked, when the index is out of range, or when
    /// the removal would leave zero stages.
    pub fn remove_stage(&mut self, index: usize) -> Result<Stage, CountdownError> {
        self.ensure_editable()?;
        self.plan.remove(index)
    }

    /// Renames the stage at `index`.
    ///
    /// # Errors
    ///
    /// Fails when editing is locked or the index is out of range.
    pub fn rename_stage(
        &mut self,
        index: usize,
        name: impl Into<String>,
    ) -> Result<(), CountdownError> {
        self.ensure_editable()?;
        self.plan.rename(index, name)
    }

    fn ensure_editable(&self) -> Result<(), CountdownError> {
        if self.phase.is_run_in_progress() {
            return Err(CountdownError::EditingLocked);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Run control
    // ------------------------------------------------------------------

    /// Starts a fresh run: snapshots the plan, selects the first stage with
    /// positive duration and anchors the clock at `now`.
    ///
    /// # Errors
    ///
    /// Fails with [`CountdownError::AlreadyRunning`] from `Running`/`Paused`
    /// (use [`CountdownState::resume`] for the latter), or
    /// [`CountdownError::NothingToRun`] when every stage has zero duration.
    pub fn start(&mut self, now: Instant) -> Result<&Stage, CountdownError> {
        if self.phase.is_run_in_progress() {
            return Err(CountdownError::AlreadyRunning);
        }

        let snapshot = self.plan.stages().to_vec();
        let first = first_runnable(&snapshot, 0).ok_or(CountdownError::NothingToRun)?;

        self.snapshot = snapshot;
        self.current = first;
        self.remaining_at_anchor = self.snapshot[first].duration;
        self.anchor = Some(now);
        self.phase = RunPhase::Running;
        Ok(&self.snapshot[first])
    }

    /// Pauses, freezing remaining time at its value as of `now`.
    ///
    /// # Errors
    ///
    /// Fails with [`CountdownError::NotRunning`] unless running.
    pub fn pause(&mut self, now: Instant) -> Result<Duration, CountdownError> {
        if self.phase != RunPhase::Running {
            return Err(CountdownError::NotRunning);
        }
        self.remaining_at_anchor = self.remaining(now);
        self.anchor = None;
        self.phase = RunPhase::Paused;
        Ok(self.remaining_at_anchor)
    }

    /// Resumes from pause, re-anchoring at `now` so the pause itself
    /// contributes no elapsed time.
    ///
    /// # Errors
    ///
    /// Fails with [`CountdownError::NotPaused`] unless paused.
    pub fn resume(&mut self, now: Instant) -> Result<Duration, CountdownError> {
        if self.phase != RunPhase::Paused {
            return Err(CountdownError::NotPaused);
        }
        self.anchor = Some(now);
        self.phase = RunPhase::Running;
        Ok(self.remaining_at_anchor)
    }

    /// Resets to idle from any state: clears the snapshot, stage index and
    /// remaining time, and unlocks configuration editing.
    pub fn reset(&mut self) {
        self.snapshot.clear();
        self.current = 0;
        self.remaining_at_anchor = Duration::ZERO;
        self.anchor = None;
        self.phase = RunPhase::Idle;
    }

    /// Remaining time of the active stage as of `now`. Never negative; never
    /// re-incremented except by reset or stage transition.
    #[must_use]
    pub fn remaining(&self, now: Instant) -> Duration {
        match self.anchor {
            Some(anchor) if self.phase == RunPhase::Running => self
                .remaining_at_anchor
                .saturating_sub(now.saturating_duration_since(anchor)),
            _ => self.remaining_at_anchor,
        }
    }

    /// True while the active stage is in its final [`WARNING_THRESHOLD`].
    /// Derived, so it clears itself on reset, transition and completion.
    #[must_use]
    pub fn warning(&self, now: Instant) -> bool {
        if !self.phase.is_run_in_progress() {
            return false;
        }
        let remaining = self.remaining(now);
        !remaining.is_zero() && remaining <= WARNING_THRESHOLD
    }

    /// Samples the machine at `now`, driving stage transitions.
    ///
    /// When the active stage's remaining time has reached zero, advances to
    /// the next stage with positive duration (skipping any number of
    /// zero-duration stages without notifications of their own) or completes
    /// the run. At most one event is produced per call.
    pub fn sample(&mut self, now: Instant) -> Option<SampleEvent> {
        if self.phase != RunPhase::Running || !self.remaining(now).is_zero() {
            return None;
        }

        let completed = self.snapshot[self.current].name.clone();
        match first_runnable(&self.snapshot, self.current + 1) {
            Some(index) => {
                self.current = index;
                self.remaining_at_anchor = self.snapshot[index].duration;
                self.anchor = Some(now);
                Some(SampleEvent::StageTransition {
                    completed,
                    next: self.snapshot[index].name.clone(),
                })
            }
            None => {
                self.remaining_at_anchor = Duration::ZERO;
                self.anchor = None;
                self.phase = RunPhase::Completed;
                Some(SampleEvent::Completed { last: completed })
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

//! Read-only view of the countdown for a presentation surface.
//!
//! The view is captured from the state machine at a given instant; it holds
//! pre-formatted text so the renderer does no time arithmetic of its own.

use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::countdown::state::{CountdownState, RunPhase};

/// Snapshot of everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    /// Run phase at capture time.
    pub phase: RunPhase,
    /// Identity of the displayed stage, when a run is in progress.
    pub stage_id: Option<Uuid>,
    /// Name of the displayed stage.
    pub stage_name: String,
    /// Zero-based index of the displayed stage.
    pub stage_index: usize,
    /// Total number of stages in the run.
    pub stage_count: usize,
    /// Whole-second part, `HH:MM:SS`.
    pub time_text: String,
    /// Sub-second part, `.mmm` with the milliseconds rounded to the nearest
    /// ten.
    pub millis_text: String,
    /// True in the final five seconds of a stage.
    pub warning: bool,
    /// Fraction of the active stage elapsed, in `0.0..=1.0`.
    pub progress: f64,
}

impl ViewState {
    /// Captures the view of `state` as of `now`.
    #[must_use]
    pub fn capture(state: &CountdownState, now: Instant) -> Self {
        let phase = state.phase();
        let remaining = state.remaining(now);
        let stage = state.current_stage();
        let total = state.stage_duration();

        let progress = if total.is_zero() {
            if phase == RunPhase::Completed { 1.0 } else { 0.0 }
        } else {
            1.0 - remaining.as_secs_f64() / total.as_secs_f64()
        };

        Self {
            phase,
            stage_id: phase.is_run_in_progress().then(|| stage.id()),
            stage_name: stage.name.clone(),
            stage_index: state.stage_index(),
            stage_count: state.stage_count(),
            time_text: format_hms(remaining),
            millis_text: format_millis(remaining, phase == RunPhase::Completed),
            warning: state.warning(now),
            progress: progress.clamp(0.0, 1.0),
        }
    }
}

/// Formats the whole-second part of `remaining` as `HH:MM:SS`.
#[must_use]
pub fn format_hms(remaining: Duration) -> String {
    let total = remaining.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// Formats the sub-second part of `remaining` as `.mmm`, with the
/// milliseconds rounded to the nearest ten so a 10ms refresh reads as a
/// steady cadence. Shows `.000` once complete or at zero.
#[must_use]
pub fn format_millis(remaining: Duration, completed: bool) -> String {
    if completed || remaining.is_zero() {
        return ".000".to_string();
    }
    // Rounding up past the displayed second would contradict time_text, so
    // clamp to 990 instead.
    let rounded = ((remaining.subsec_millis() + 5) / 10 * 10).min(990);
    format!(".{rounded:03}")
}

// ============================================================================
// Tests
// ============================================================================

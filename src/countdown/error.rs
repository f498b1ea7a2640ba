//! Countdown error types.

use thiserror::Error;

/// Errors that can occur in the countdown flow.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CountdownError {
    /// Stage configuration edits are locked while a run is in progress.
    #[error("a run is in progress; pause does not unlock editing, reset does")]
    EditingLocked,

    /// Removing the last remaining stage is forbidden.
    #[error("at least one stage must remain")]
    LastStage,

    /// A stage index was out of range.
    #[error("no stage at position {0}")]
    StageOutOfRange(usize),

    /// Every configured stage has zero duration.
    #[error("all stages have zero duration; nothing to run")]
    NothingToRun,

    /// Start was requested while already running.
    #[error("timer is already running")]
    AlreadyRunning,

    /// Pause was requested while not running.
    #[error("timer is not running")]
    NotRunning,

    /// Resume was requested while not paused.
    #[error("timer is not paused")]
    NotPaused,

    /// A stage spec string could not be parsed.
    #[error("invalid stage spec '{spec}': {reason}")]
    InvalidStageSpec {
        /// The offending input.
        spec: String,
        /// What was wrong with it.
        reason: String,
    },
}

impl CountdownError {
    /// All countdown errors are rejections of a user action; none is fatal
    /// to the engine loop.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        true
    }
}

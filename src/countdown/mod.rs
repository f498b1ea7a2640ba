//! Multi-stage countdown: stage configuration, the run state machine, the
//! display view and the event-driven engine.
//!
//! - `stage`: stages and the editable plan
//! - `state`: the pure state machine (idle / running / paused / completed)
//! - `view`: per-frame render snapshot and time formatting
//! - `engine`: fast-tick loop with notification pulses
//! - `error`: countdown error type

pub mod engine;
pub mod error;
pub mod stage;
pub mod state;
pub mod view;

pub use engine::{
    CountdownCommand, CountdownEngine, CountdownEvent, DISPLAY_TICK, PULSE_COUNT, PULSE_SPACING,
};
pub use error::CountdownError;
pub use stage::{Stage, StagePlan, DEFAULT_STAGE_DURATION, DEFAULT_STAGE_NAME};
pub use state::{CountdownState, RunPhase, SampleEvent, WARNING_THRESHOLD};
pub use view::{format_hms, format_millis, ViewState};

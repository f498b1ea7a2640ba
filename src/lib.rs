//! Atelier Library
//!
//! This library provides the core functionality for the atelier CLI.
//! It includes:
//! - Recursive image scanning with a subdirectory allow-set
//! - Shuffled slideshow sessions with count and time limits
//! - Flat JSON settings persistence with default fallback
//! - A multi-stage countdown with wall-clock drift correction
//! - CLI command parsing and display utilities

pub mod cli;
pub mod countdown;
pub mod slideshow;

// Re-export commonly used types for convenience
pub use countdown::{CountdownError, CountdownState, RunPhase, Stage, StagePlan, ViewState};
pub use slideshow::{
    CompletionReason, SessionController, SessionMode, Settings, SlideshowError,
};

//! Display utilities for the atelier CLI.
//!
//! This module provides formatted output for:
//! - Slideshow frames and session results
//! - Countdown frames, transitions and pulses
//! - Error messages

use std::io::{self, Write as _};
use std::time::Duration;

use crate::countdown::{format_hms, RunPhase, ViewState};
use crate::slideshow::{CompletionReason, SubdirEntry};

// ============================================================================
// Display
// ============================================================================

/// Display utilities for CLI output.
pub struct Display;

impl Display {
    /// Shows the image now on screen, with progress toward a count target
    /// when one exists.
    pub fn show_image(file_name: &str, shown: u32, target: Option<u32>) {
        match target {
            Some(target) => println!("Displaying: {} ({}/{})", file_name, shown, target),
            None => println!("Displaying: {} (#{})", file_name, shown),
        }
    }

    /// Shows the session completion line.
    pub fn show_session_complete(reason: CompletionReason) {
        let text = match reason {
            CompletionReason::CountReached => "image count reached",
            CompletionReason::TimeReached => "session time elapsed",
            CompletionReason::NothingDisplayable => "no displayable images remain",
        };
        println!("Session complete: {}", text);
    }

    /// Shows an image count result.
    pub fn show_count(count: usize) {
        println!("Found {} images", count);
    }

    /// Shows a subdirectory listing.
    pub fn show_subdirs(entries: &[SubdirEntry]) {
        if entries.is_empty() {
            println!("No subdirectories");
            return;
        }
        for entry in entries {
            println!("{}", entry.name);
        }
    }

    /// Renders one countdown frame as a single line.
    pub fn render_countdown(view: &ViewState) -> String {
        let marker = match view.phase {
            RunPhase::Idle => "--",
            RunPhase::Running if view.warning => "!!",
            RunPhase::Running => ">>",
            RunPhase::Paused => "||",
            RunPhase::Completed => "**",
        };
        format!(
            "{} [{}/{}] {}  {}{}",
            marker,
            view.stage_index + 1,
            view.stage_count,
            view.stage_name,
            view.time_text,
            view.millis_text,
        )
    }

    /// Redraws the countdown frame in place.
    pub fn show_countdown_frame(view: &ViewState) {
        print!("\r{}\x1b[K", Self::render_countdown(view));
        let _ = io::stdout().flush();
    }

    /// Shows a stage transition.
    pub fn show_transition(completed: &str, next: &str) {
        println!("\n{} complete! Starting {}...", completed, next);
    }

    /// Shows the all-stages-complete line.
    pub fn show_completed() {
        println!("\nAll stages complete!");
    }

    /// Shows one notification pulse.
    pub fn show_pulse(index: u8) {
        // BEL carries the notification in a plain terminal.
        print!("\x07");
        let _ = io::stdout().flush();
        tracing::debug!(index, "notification pulse");
    }

    /// Shows the paused line with the frozen remaining time.
    pub fn show_paused(remaining: Duration) {
        println!("\nPaused at {}", format_hms(remaining));
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("Error: {}", message);
    }
}

// ============================================================================
// Tests
// ============================================================================

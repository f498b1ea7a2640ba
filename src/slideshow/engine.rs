//! Slideshow engine.
//!
//! Drives a [`SessionController`] with one periodic tick whose period equals
//! the display duration, plus user commands for manual navigation. Events are
//! pushed to the presentation layer over an unbounded channel; the engine
//! itself never touches a screen.

use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};

use crate::slideshow::session::{CompletionReason, ImageCard, SessionController, Step};

/// How long the presentation stays open after the session completes.
pub const SESSION_CLOSE_DELAY: Duration = Duration::from_secs(3);

// ============================================================================
// Events and commands
// ============================================================================

/// Events pushed to the presentation surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlideshowEvent {
    /// An image should be displayed now.
    ImageReady {
        /// `file://` URI of the image.
        uri: String,
        /// File name for display.
        file_name: String,
        /// Display duration granted to this image.
        duration: Duration,
        /// Images shown so far against the session's count budget. A
        /// previous-step re-show repeats the current value.
        shown: u32,
    },
    /// The session termination condition was met.
    SessionComplete {
        /// Why the session ended.
        reason: CompletionReason,
    },
}

impl SlideshowEvent {
    fn image(card: ImageCard, shown: u32) -> Self {
        SlideshowEvent::ImageReady {
            uri: card.uri,
            file_name: card.file_name,
            duration: card.duration,
            shown,
        }
    }
}

/// User commands accepted while a session runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideshowCommand {
    /// Show the next image immediately.
    Next,
    /// Step back one image.
    Previous,
    /// End the session without a completion event.
    Quit,
}

// ============================================================================
// SlideshowEngine
// ============================================================================

/// Runs one slideshow session to completion.
pub struct SlideshowEngine {
    controller: SessionController,
    event_tx: mpsc::UnboundedSender<SlideshowEvent>,
    command_rx: mpsc::UnboundedReceiver<SlideshowCommand>,
}

impl SlideshowEngine {
    /// Creates an engine over an already-constructed controller.
    pub fn new(
        controller: SessionController,
        event_tx: mpsc::UnboundedSender<SlideshowEvent>,
        command_rx: mpsc::UnboundedReceiver<SlideshowCommand>,
    ) -> Self {
        Self {
            controller,
            event_tx,
            command_rx,
        }
    }

    /// Runs the session loop until completion or quit.
    ///
    /// The first image is shown immediately; afterwards the periodic tick
    /// advances the show. Manual navigation resets the tick so the newly
    /// shown image still receives a full display interval.
    pub async fn run(mut self) -> Result<()> {
        let mut ticker = interval(self.controller.display_duration());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if !self.step()? {
                        break;
                    }
                }
                cmd = self.command_rx.recv() => match cmd {
                    Some(SlideshowCommand::Next) => {
                        if !self.step()? {
                            break;
                        }
                        ticker.reset();
                    }
                    Some(SlideshowCommand::Previous) => {
                        self.show_previous()?;
                        ticker.reset();
                    }
                    Some(SlideshowCommand::Quit) | None => break,
                },
            }
        }
        Ok(())
    }

    /// Advances by one image. Returns false when the session is over.
    fn step(&mut self) -> Result<bool> {
        match self.controller.advance(Instant::now(), displayable) {
            Step::Image(card) => {
                let shown = self.controller.shown();
                self.event_tx
                    .send(SlideshowEvent::image(card, shown))
                    .context("failed to send image-ready event")?;
                Ok(true)
            }
            Step::Complete(reason) => {
                self.event_tx
                    .send(SlideshowEvent::SessionComplete { reason })
                    .context("failed to send session-complete event")?;
                Ok(false)
            }
        }
    }

    fn show_previous(&mut self) -> Result<()> {
        let card = self.controller.previous();
        let shown = self.controller.shown();
        self.event_tx
            .send(SlideshowEvent::image(card, shown))
            .context("failed to send image-ready event")
    }
}

/// Probe used for live sessions: a card is displayable while its file is
/// still reachable.
fn displayable(path: &Path) -> bool {
    fs::metadata(path).is_ok()
}

// ============================================================================
// Tests
// ============================================================================

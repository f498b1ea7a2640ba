//! Slideshow session controller.
//!
//! A [`SessionController`] is constructed when a session starts and discarded
//! when it ends. It owns the shuffled deck, the cursor and the session
//! counters; nothing about a session lives outside it.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::slideshow::error::SlideshowError;

// ============================================================================
// Units and session modes
// ============================================================================

/// Unit for the per-image display duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DurationUnit {
    /// Seconds
    Seconds,
    /// Minutes
    Minutes,
    /// Hours
    Hours,
}

impl DurationUnit {
    /// Converts an amount in this unit to a [`Duration`].
    #[must_use]
    pub fn to_duration(self, amount: u32) -> Duration {
        let secs = match self {
            DurationUnit::Seconds => u64::from(amount),
            DurationUnit::Minutes => u64::from(amount) * 60,
            DurationUnit::Hours => u64::from(amount) * 3600,
        };
        Duration::from_secs(secs)
    }
}

/// Unit for the overall session length in time-bounded mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SessionUnit {
    /// Minutes
    Minutes,
    /// Hours
    Hours,
}

impl SessionUnit {
    /// Converts an amount in this unit to a [`Duration`].
    #[must_use]
    pub fn to_duration(self, amount: u32) -> Duration {
        let secs = match self {
            SessionUnit::Minutes => u64::from(amount) * 60,
            SessionUnit::Hours => u64::from(amount) * 3600,
        };
        Duration::from_secs(secs)
    }
}

/// How a session decides it is finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    /// Run until the user quits.
    Infinite,
    /// Stop after showing a fixed number of images.
    Count {
        /// Number of images to show.
        target: u32,
    },
    /// Stop once a wall-clock duration has elapsed.
    Time {
        /// Session length in `unit`.
        length: u32,
        /// Unit of `length`.
        unit: SessionUnit,
    },
}

impl SessionMode {
    /// Short human-readable description, used in logs and the CLI.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            SessionMode::Infinite => "infinite".to_string(),
            SessionMode::Count { target } => format!("{target} images"),
            SessionMode::Time { length, unit } => {
                let unit = match unit {
                    SessionUnit::Minutes => "minutes",
                    SessionUnit::Hours => "hours",
                };
                format!("{length} {unit}")
            }
        }
    }
}

// ============================================================================
// Step results
// ============================================================================

/// Why a session terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionReason {
    /// The configured image count was reached.
    CountReached,
    /// The configured end time was reached.
    TimeReached,
    /// A full pass over the deck produced nothing displayable.
    NothingDisplayable,
}

impl CompletionReason {
    /// Returns the string representation of the reason.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            CompletionReason::CountReached => "maximum image count reached",
            CompletionReason::TimeReached => "time limit reached",
            CompletionReason::NothingDisplayable => "no displayable images remain",
        }
    }
}

/// One image ready to be presented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageCard {
    /// Absolute path of the image file.
    pub path: PathBuf,
    /// `file://` URI for presentation surfaces that want one.
    pub uri: String,
    /// File name for display.
    pub file_name: String,
    /// How long the image should stay on screen.
    pub duration: Duration,
}

/// Result of asking the controller for the next step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Show this image.
    Image(ImageCard),
    /// The session is over.
    Complete(CompletionReason),
}

// ============================================================================
// SessionController
// ============================================================================

/// Owns one slideshow session: shuffled deck, cursor, counters and limits.
#[derive(Debug)]
pub struct SessionController {
    deck: Vec<PathBuf>,
    cursor: usize,
    shown: u32,
    mode: SessionMode,
    display_duration: Duration,
    end_at: Option<Instant>,
    rng: StdRng,
}

impl SessionController {
    /// Creates a controller over `files`, shuffling them immediately.
    ///
    /// `now` anchors the end time for time-bounded sessions.
    ///
    /// # Errors
    ///
    /// Returns [`SlideshowError::EmptyImageSet`] when `files` is empty; the
    /// caller is expected to have surfaced "no images found" before this.
    pub fn new(
        files: Vec<PathBuf>,
        mode: SessionMode,
        display_duration: Duration,
        now: Instant,
    ) -> Result<Self, SlideshowError> {
        Self::with_rng(files, mode, display_duration, now, StdRng::from_entropy())
    }

    /// Like [`SessionController::new`] but with an injected RNG so tests can
    /// seed the shuffle.
    pub fn with_rng(
        files: Vec<PathBuf>,
        mode: SessionMode,
        display_duration: Duration,
        now: Instant,
        rng: StdRng,
    ) -> Result<Self, SlideshowError> {
        if files.is_empty() {
            return Err(SlideshowError::EmptyImageSet);
        }
        let end_at = match mode {
            SessionMode::Time { length, unit } => Some(now + unit.to_duration(length)),
            _ => None,
        };
        let mut controller = Self {
            deck: files,
            cursor: 0,
            shown: 0,
            mode,
            display_duration,
            end_at,
            rng,
        };
        controller.reshuffle();
        Ok(controller)
    }

    /// Advances the session by one image.
    ///
    /// Order of operations:
    /// 1. terminate if the count target or the end time has been reached;
    /// 2. reshuffle in place and reset the cursor when the deck is exhausted;
    /// 3. emit the card at the cursor, advancing cursor and shown-count.
    ///
    /// `probe` decides whether a candidate can still be displayed; candidates
    /// that fail it are skipped with a warning and consume no session-count
    /// unit. If a full pass yields nothing, the session completes.
    pub fn advance(&mut self, now: Instant, mut probe: impl FnMut(&Path) -> bool) -> Step {
        if let SessionMode::Count { target } = self.mode {
            if self.shown >= target {
                return Step::Complete(CompletionReason::CountReached);
            }
        }
        if let Some(end_at) = self.end_at {
            if now >= end_at {
                return Step::Complete(CompletionReason::TimeReached);
            }
        }

        let mut attempts = self.deck.len();
        while attempts > 0 {
            if self.cursor >= self.deck.len() {
                self.reshuffle();
            }
            let path = self.deck[self.cursor].clone();
            self.cursor += 1;

            if probe(&path) {
                self.shown += 1;
                return Step::Image(self.card_for(path));
            }
            warn!(path = %path.display(), "failed to display image; trying the next one");
            attempts -= 1;
        }

        Step::Complete(CompletionReason::NothingDisplayable)
    }

    /// Steps back one image, wrapping to the last index.
    ///
    /// Consumes no session-count unit and performs no limit check; the caller
    /// restarts the auto-advance timer so the image gets a full display
    /// window.
    pub fn previous(&mut self) -> ImageCard {
        let len = self.deck.len();
        self.cursor = (self.cursor + len - 1) % len;
        self.card_for(self.deck[self.cursor].clone())
    }

    /// Number of images shown so far in this session.
    #[must_use]
    pub fn shown(&self) -> u32 {
        self.shown
    }

    /// The configured per-image display duration.
    #[must_use]
    pub fn display_duration(&self) -> Duration {
        self.display_duration
    }

    /// The session mode this controller was started with.
    #[must_use]
    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    /// Full re-randomization of the deck (uniform permutation), cursor back
    /// to zero.
    fn reshuffle(&mut self) {
        self.deck.shuffle(&mut self.rng);
        self.cursor = 0;
    }

    fn card_for(&self, path: PathBuf) -> ImageCard {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        ImageCard {
            uri: file_uri(&path),
            file_name,
            duration: self.display_duration,
            path,
        }
    }
}

/// Builds a `file://` URI from a path, escaping the few characters that would
/// break one.
#[must_use]
pub fn file_uri(path: &Path) -> String {
    let raw = path.to_string_lossy();
    let mut encoded = String::with_capacity(raw.len() + 8);
    for ch in raw.chars() {
        match ch {
            ' ' => encoded.push_str("%20"),
            '%' => encoded.push_str("%25"),
            '#' => encoded.push_str("%23"),
            '?' => encoded.push_str("%3F"),
            _ => encoded.push(ch),
        }
    }
    format!("file://{encoded}")
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(PathBuf::from).collect()
    }

    fn controller(names: &[&str], mode: SessionMode) -> SessionController {
        SessionController::with_rng(
            paths(names),
            mode,
            Duration::from_secs(60),
            Instant::now(),
            StdRng::seed_from_u64(7),
        )
        .unwrap()
    }

    mod unit_tests {
        use super::*;

        #[test]
        fn test_duration_unit_conversion() {
            assert_eq!(DurationUnit::Seconds.to_duration(30), Duration::from_secs(30));
            assert_eq!(DurationUnit::Minutes.to_duration(2), Duration::from_secs(120));
            assert_eq!(DurationUnit::Hours.to_duration(1), Duration::from_secs(3600));
        }

        #[test]
        fn test_session_unit_conversion() {
            assert_eq!(SessionUnit::Minutes.to_duration(30), Duration::from_secs(1800));
            assert_eq!(SessionUnit::Hours.to_duration(2), Duration::from_secs(7200));
        }

        #[test]
        fn test_mode_describe() {
            assert_eq!(SessionMode::Infinite.describe(), "infinite");
            assert_eq!(SessionMode::Count { target: 5 }.describe(), "5 images");
            assert_eq!(
                SessionMode::Time { length: 30, unit: SessionUnit::Minutes }.describe(),
                "30 minutes"
            );
        }
    }

    mod controller_tests {
        use super::*;

        #[test]
        fn test_empty_deck_rejected() {
            let result = SessionController::new(
                Vec::new(),
                SessionMode::Infinite,
                Duration::from_secs(1),
                Instant::now(),
            );
            assert!(matches!(result, Err(SlideshowError::EmptyImageSet)));
        }

        #[test]
        fn test_advance_emits_cards() {
            let mut c = controller(&["/a.jpg", "/b.jpg"], SessionMode::Infinite);
            let now = Instant::now();

            match c.advance(now, |_| true) {
                Step::Image(card) => {
                    assert!(card.file_name.ends_with(".jpg"));
                    assert_eq!(card.duration, Duration::from_secs(60));
                }
                other => panic!("expected an image, got {other:?}"),
            }
            assert_eq!(c.shown(), 1);
        }

        #[test]
        fn test_count_mode_terminates_after_target() {
            let mut c = controller(&["/a.jpg", "/b.jpg", "/c.jpg", "/d.jpg", "/e.jpg"],
                SessionMode::Count { target: 2 });
            let now = Instant::now();

            assert!(matches!(c.advance(now, |_| true), Step::Image(_)));
            assert!(matches!(c.advance(now, |_| true), Step::Image(_)));
            assert!(matches!(
                c.advance(now, |_| true),
                Step::Complete(CompletionReason::CountReached)
            ));
            assert_eq!(c.shown(), 2);
        }

        #[test]
        fn test_count_mode_target_larger_than_deck_reshuffles() {
            let mut c = controller(&["/a.jpg", "/b.jpg"], SessionMode::Count { target: 5 });
            let now = Instant::now();

            for _ in 0..5 {
                assert!(matches!(c.advance(now, |_| true), Step::Image(_)));
            }
            assert!(matches!(
                c.advance(now, |_| true),
                Step::Complete(CompletionReason::CountReached)
            ));
        }

        #[test]
        fn test_time_mode_terminates_at_end() {
            let start = Instant::now();
            let mut c = SessionController::with_rng(
                paths(&["/a.jpg"]),
                SessionMode::Time { length: 30, unit: SessionUnit::Minutes },
                Duration::from_secs(60),
                start,
                StdRng::seed_from_u64(1),
            )
            .unwrap();

            assert!(matches!(c.advance(start, |_| true), Step::Image(_)));
            let just_before = start + Duration::from_secs(30 * 60 - 1);
            assert!(matches!(c.advance(just_before, |_| true), Step::Image(_)));
            let at_end = start + Duration::from_secs(30 * 60);
            assert!(matches!(
                c.advance(at_end, |_| true),
                Step::Complete(CompletionReason::TimeReached)
            ));
        }

        #[test]
        fn test_reshuffle_keeps_multiset() {
            let names = ["/a.jpg", "/b.jpg", "/c.jpg"];
            let mut c = controller(&names, SessionMode::Infinite);
            let now = Instant::now();

            // Two full passes: every path must appear exactly twice.
            let mut seen: Vec<PathBuf> = Vec::new();
            for _ in 0..6 {
                match c.advance(now, |_| true) {
                    Step::Image(card) => seen.push(card.path),
                    other => panic!("unexpected {other:?}"),
                }
            }
            for name in names {
                assert_eq!(seen.iter().filter(|p| **p == PathBuf::from(name)).count(), 2);
            }
        }

        #[test]
        fn test_failed_probe_skips_without_consuming_count() {
            let mut c = controller(&["/bad.jpg", "/good.jpg"], SessionMode::Count { target: 1 });
            let now = Instant::now();

            match c.advance(now, |p| p.ends_with("good.jpg")) {
                Step::Image(card) => assert_eq!(card.file_name, "good.jpg"),
                other => panic!("unexpected {other:?}"),
            }
            assert_eq!(c.shown(), 1);
        }

        #[test]
        fn test_all_probes_failing_completes() {
            let mut c = controller(&["/a.jpg", "/b.jpg"], SessionMode::Infinite);
            let now = Instant::now();

            assert!(matches!(
                c.advance(now, |_| false),
                Step::Complete(CompletionReason::NothingDisplayable)
            ));
        }

        #[test]
        fn test_previous_wraps_and_does_not_count() {
            let mut c = controller(&["/a.jpg", "/b.jpg", "/c.jpg"], SessionMode::Count { target: 2 });
            let now = Instant::now();

            let first = match c.advance(now, |_| true) {
                Step::Image(card) => card,
                other => panic!("unexpected {other:?}"),
            };
            assert_eq!(c.shown(), 1);

            // Stepping back re-shows the current card and consumes nothing.
            let back = c.previous();
            assert_eq!(back.path, first.path);
            assert_eq!(c.shown(), 1);

            // Stepping back again wraps to the end of the deck.
            let wrapped = c.previous();
            assert_ne!(wrapped.path, first.path);
            assert_eq!(c.shown(), 1);
        }

        #[test]
        fn test_previous_from_start_wraps_to_last() {
            let mut c = controller(&["/a.jpg", "/b.jpg", "/c.jpg"], SessionMode::Infinite);
            // Cursor is 0 before any advance; previous must wrap, not panic.
            let card = c.previous();
            assert!(!card.file_name.is_empty());
        }
    }

    mod uri_tests {
        use super::*;

        #[test]
        fn test_plain_path() {
            assert_eq!(file_uri(Path::new("/tmp/a.jpg")), "file:///tmp/a.jpg");
        }

        #[test]
        fn test_escapes_spaces_and_specials() {
            assert_eq!(
                file_uri(Path::new("/tmp/my pics/100%.jpg")),
                "file:///tmp/my%20pics/100%25.jpg"
            );
            assert_eq!(file_uri(Path::new("/t#1?.png")), "file:///t%231%3F.png");
        }
    }
}

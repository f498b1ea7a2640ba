//! Integration tests for the slideshow session controller.
//!
//! These tests drive full sessions with a seeded RNG and an always-true
//! probe, checking the properties the session promises:
//! - count sessions show exactly the configured number of images
//! - every deck image appears once per pass (shuffle is a permutation)
//! - time sessions stop at the end time
//! - previous steps back cyclically

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;

use atelier::slideshow::{
    CompletionReason, SessionController, SessionMode, SessionUnit, Step,
};

// ============================================================================
// Test Helpers
// ============================================================================

fn deck(count: usize) -> Vec<PathBuf> {
    (0..count)
        .map(|i| PathBuf::from(format!("/images/img{i:03}.jpg")))
        .collect()
}

fn controller(files: Vec<PathBuf>, mode: SessionMode, seed: u64) -> SessionController {
    SessionController::with_rng(
        files,
        mode,
        Duration::from_secs(1),
        Instant::now(),
        StdRng::seed_from_u64(seed),
    )
    .unwrap()
}

fn always(_: &Path) -> bool {
    true
}

// ============================================================================
// Count Mode Tests
// ============================================================================

#[test]
fn test_count_session_shows_exactly_target_images() {
    for seed in 0..5 {
        let mut ctl = controller(deck(7), SessionMode::Count { target: 10 }, seed);
        let now = Instant::now();

        let mut shown = 0;
        loop {
            match ctl.advance(now, always) {
                Step::Image(_) => shown += 1,
                Step::Complete(reason) => {
                    assert_eq!(reason, CompletionReason::CountReached);
                    break;
                }
            }
            assert!(shown <= 10, "session overran its target");
        }
        assert_eq!(shown, 10);
    }
}

#[test]
fn test_count_larger_than_deck_repeats_with_reshuffle() {
    let mut ctl = controller(deck(3), SessionMode::Count { target: 9 }, 42);
    let now = Instant::now();

    let mut passes: Vec<Vec<PathBuf>> = Vec::new();
    let mut current: Vec<PathBuf> = Vec::new();
    loop {
        match ctl.advance(now, always) {
            Step::Image(card) => {
                current.push(card.path);
                if current.len() == 3 {
                    passes.push(std::mem::take(&mut current));
                }
            }
            Step::Complete(_) => break,
        }
    }

    assert_eq!(passes.len(), 3);
    // Each pass is a permutation of the full deck.
    let full: HashSet<PathBuf> = deck(3).into_iter().collect();
    for pass in &passes {
        let seen: HashSet<PathBuf> = pass.iter().cloned().collect();
        assert_eq!(seen, full);
    }
}

// ============================================================================
// Time Mode Tests
// ============================================================================

#[test]
fn test_time_session_stops_at_end_time() {
    let start = Instant::now();
    let mut ctl = SessionController::with_rng(
        deck(4),
        SessionMode::Time {
            length: 30,
            unit: SessionUnit::Minutes,
        },
        Duration::from_secs(1),
        start,
        StdRng::seed_from_u64(1),
    )
    .unwrap();

    // Just before the limit images still flow.
    let before = start + Duration::from_secs(30 * 60 - 1);
    assert!(matches!(ctl.advance(before, always), Step::Image(_)));

    // At the limit the session completes, regardless of how many images ran.
    let at = start + Duration::from_secs(30 * 60);
    assert_eq!(
        ctl.advance(at, always),
        Step::Complete(CompletionReason::TimeReached)
    );
}

// ============================================================================
// Infinite Mode and Navigation Tests
// ============================================================================

#[test]
fn test_infinite_session_never_self_terminates() {
    let mut ctl = controller(deck(2), SessionMode::Infinite, 3);
    let now = Instant::now();
    for _ in 0..50 {
        assert!(matches!(ctl.advance(now, always), Step::Image(_)));
    }
}

#[test]
fn test_previous_steps_back_cyclically() {
    let mut ctl = controller(deck(4), SessionMode::Infinite, 9);
    let now = Instant::now();

    let first = match ctl.advance(now, always) {
        Step::Image(card) => card,
        other => panic!("unexpected {other:?}"),
    };
    let second = match ctl.advance(now, always) {
        Step::Image(card) => card,
        other => panic!("unexpected {other:?}"),
    };
    assert_ne!(first.path, second.path);

    // One step back re-shows the image before the upcoming one, which is
    // the one currently on screen.
    let back = ctl.previous();
    assert_eq!(back.path, second.path);

    // Stepping back past the first image wraps to the end of the deck.
    let back = ctl.previous();
    assert_eq!(back.path, first.path);
    ctl.previous();
    ctl.previous();
    let wrapped = ctl.previous();
    assert_eq!(wrapped.path, second.path);
}

#[test]
fn test_previous_does_not_consume_count_budget() {
    let mut ctl = controller(deck(5), SessionMode::Count { target: 2 }, 7);
    let now = Instant::now();

    assert!(matches!(ctl.advance(now, always), Step::Image(_)));
    ctl.previous();
    ctl.previous();
    assert!(matches!(ctl.advance(now, always), Step::Image(_)));
    assert_eq!(
        ctl.advance(now, always),
        Step::Complete(CompletionReason::CountReached)
    );
}

// ============================================================================
// Probe Tests
// ============================================================================

#[test]
fn test_failed_probes_are_skipped_without_consuming_count() {
    let files = deck(4);
    let missing = files[0].clone();
    let mut ctl = controller(files, SessionMode::Count { target: 3 }, 5);
    let now = Instant::now();

    let mut shown = Vec::new();
    loop {
        match ctl.advance(now, |p| p != missing) {
            Step::Image(card) => shown.push(card.path),
            Step::Complete(reason) => {
                assert_eq!(reason, CompletionReason::CountReached);
                break;
            }
        }
    }
    assert_eq!(shown.len(), 3);
    assert!(!shown.contains(&missing));
}

#[test]
fn test_all_probes_failing_completes_the_session() {
    let mut ctl = controller(deck(3), SessionMode::Infinite, 2);
    assert_eq!(
        ctl.advance(Instant::now(), |_| false),
        Step::Complete(CompletionReason::NothingDisplayable)
    );
}

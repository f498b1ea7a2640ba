//! Application wiring for the CLI.
//!
//! Builds engines from parsed arguments and persisted settings, spawns them,
//! feeds them stdin lines and renders their events.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::cli::commands::{
    parse_countdown_line, parse_slideshow_line, CountdownLine, CountdownRunArgs, ScanArgs,
    SlideshowRunArgs,
};
use crate::cli::display::Display;
use crate::countdown::{
    CountdownCommand, CountdownEngine, CountdownEvent, CountdownState, Stage, StagePlan,
};
use crate::slideshow::{
    find_image_files, list_subdirectories, ImageCountCache, SessionController, SessionMode,
    Settings, SlideshowCommand, SlideshowEngine, SlideshowEvent, SlideshowError,
    SESSION_CLOSE_DELAY,
};

// ============================================================================
// Slideshow
// ============================================================================

/// Runs a full slideshow session: settings merge, scan, engine, stdin loop.
pub async fn run_slideshow(args: SlideshowRunArgs) -> Result<()> {
    let settings_path = Settings::default_path();
    let mut settings = match &settings_path {
        Some(path) => Settings::load(path),
        None => Settings::default(),
    };
    apply_overrides(&mut settings, &args);

    if settings.directory.is_empty() {
        bail!(SlideshowError::NoDirectory);
    }
    let root = PathBuf::from(&settings.directory);
    let mode = settings.session_mode();
    let display_duration = settings.unit.to_duration(settings.duration);

    let allowed = allow_set(&root, &args.subdirs);
    let files = find_image_files(&root, allowed.as_ref());
    if files.is_empty() {
        bail!(SlideshowError::NoImagesFound(
            root.display().to_string()
        ));
    }

    // The session scan doubles as the count for this selection; later count
    // queries over the same key reuse it instead of rescanning.
    let mut count_cache = ImageCountCache::new();
    let selection = subdir_paths(&root, &args.subdirs);
    count_cache.record(&root, &selection, files.len());
    info!(
        images = count_cache.count_images(&root, &selection),
        mode = %mode.describe(),
        "starting slideshow"
    );

    // Persist the effective settings so the next run starts from them; a
    // write failure must not stop the session.
    if !args.no_save {
        if let Some(path) = &settings_path {
            if let Err(e) = settings.save(path) {
                warn!(error = %e, "failed to persist settings");
            }
        }
    }

    let controller = SessionController::new(files, mode, display_duration, Instant::now())?;
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let engine = SlideshowEngine::new(controller, event_tx, command_rx);
    let engine_handle = tokio::spawn(engine.run());

    let stdin_handle = tokio::spawn(forward_slideshow_input(command_tx));

    let target = match mode {
        SessionMode::Count { target } => Some(target),
        _ => None,
    };
    while let Some(event) = event_rx.recv().await {
        match event {
            SlideshowEvent::ImageReady {
                file_name, shown, ..
            } => {
                Display::show_image(&file_name, shown, target);
            }
            SlideshowEvent::SessionComplete { reason } => {
                Display::show_session_complete(reason);
                tokio::time::sleep(SESSION_CLOSE_DELAY).await;
            }
        }
    }

    stdin_handle.abort();
    engine_handle
        .await
        .context("slideshow engine panicked")??;
    Ok(())
}

/// Counts the displayable images under a directory, through the count cache
/// so repeated queries for the same selection scan once.
pub fn count_images(args: &ScanArgs) -> Result<()> {
    let mut cache = ImageCountCache::new();
    let count = cached_count(&mut cache, &args.dir, &args.subdirs);
    Display::show_count(count);
    Ok(())
}

fn cached_count(cache: &mut ImageCountCache, dir: &Path, subdirs: &[String]) -> usize {
    cache.count_images(dir, &subdir_paths(dir, subdirs))
}

/// Lists the immediate subdirectories of a directory.
pub fn list_subdirs(dir: &Path) -> Result<()> {
    let entries = list_subdirectories(dir);
    Display::show_subdirs(&entries);
    Ok(())
}

/// Applies CLI overrides on top of the persisted settings.
fn apply_overrides(settings: &mut Settings, args: &SlideshowRunArgs) {
    if let Some(dir) = &args.dir {
        settings.directory = dir.display().to_string();
    }
    if let Some(duration) = args.duration {
        settings.duration = duration;
    }
    if let Some(unit) = args.unit {
        settings.unit = unit;
    }
    if let Some(mode) = args.mode {
        settings.session_mode = mode;
    }
    if let Some(count) = args.count {
        settings.image_count = count;
    }
    if let Some(length) = args.length {
        settings.session_length = length;
    }
    if let Some(unit) = args.length_unit {
        settings.session_unit = unit;
    }
}

/// Resolves subdirectory names against the scan root.
fn subdir_paths(root: &Path, subdirs: &[String]) -> Vec<PathBuf> {
    subdirs.iter().map(|name| root.join(name)).collect()
}

/// Builds the scan allow-set. No --subdir flags means the whole tree; with
/// flags the scan covers the root's own files plus the named subdirectories.
fn allow_set(root: &Path, subdirs: &[String]) -> Option<HashSet<PathBuf>> {
    if subdirs.is_empty() {
        return None;
    }
    let mut allowed: HashSet<PathBuf> = subdir_paths(root, subdirs).into_iter().collect();
    allowed.insert(root.to_path_buf());
    Some(allowed)
}

async fn forward_slideshow_input(command_tx: mpsc::UnboundedSender<SlideshowCommand>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let command = parse_slideshow_line(&line);
        let quit = command == SlideshowCommand::Quit;
        if command_tx.send(command).is_err() || quit {
            break;
        }
    }
}

// ============================================================================
// Countdown
// ============================================================================

/// Runs an interactive countdown over the stages given on the command line
/// (or one default stage).
pub async fn run_countdown(args: CountdownRunArgs) -> Result<()> {
    let plan = if args.stages.is_empty() {
        StagePlan::default()
    } else {
        let stages: Vec<Stage> = args
            .stages
            .iter()
            .enumerate()
            .map(|(i, spec)| {
                let name = spec
                    .name
                    .clone()
                    .unwrap_or_else(|| format!("Timer {}", i + 1));
                Stage::new(name, spec.duration)
            })
            .collect();
        StagePlan::from_stages(stages)?
    };
    info!(stages = plan.len(), "starting countdown");

    let state = CountdownState::new(plan);
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let engine = CountdownEngine::new(state, event_tx, command_rx);
    let engine_handle = tokio::spawn(engine.run());

    let stdin_handle = tokio::spawn(forward_countdown_input(command_tx));

    while let Some(event) = event_rx.recv().await {
        match event {
            CountdownEvent::Tick { view } => Display::show_countdown_frame(&view),
            CountdownEvent::Started { stage } => {
                debug!(stage, "run started");
            }
            CountdownEvent::Paused { remaining } => Display::show_paused(remaining),
            CountdownEvent::Resumed => debug!("run resumed"),
            CountdownEvent::StageTransition { completed, next } => {
                Display::show_transition(&completed, &next);
            }
            CountdownEvent::Completed => Display::show_completed(),
            CountdownEvent::Pulse { index } => Display::show_pulse(index),
            CountdownEvent::Reset => println!("\nReset"),
            CountdownEvent::Rejected { reason } => Display::show_error(&reason),
        }
    }

    stdin_handle.abort();
    engine_handle
        .await
        .context("countdown engine panicked")??;
    Ok(())
}

async fn forward_countdown_input(command_tx: mpsc::UnboundedSender<CountdownCommand>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let command = match parse_countdown_line(&line) {
            Ok(CountdownLine::Toggle) => CountdownCommand::Toggle,
            Ok(CountdownLine::Start) => CountdownCommand::Start,
            Ok(CountdownLine::Pause) => CountdownCommand::Pause,
            Ok(CountdownLine::Reset) => CountdownCommand::Reset,
            Ok(CountdownLine::Quit) => CountdownCommand::Quit,
            Ok(CountdownLine::Add(spec)) => CountdownCommand::AddStage {
                name: spec.name.unwrap_or_else(|| "Timer".to_string()),
                duration: spec.duration,
            },
            Ok(CountdownLine::Remove(index)) => CountdownCommand::RemoveStage { index },
            Ok(CountdownLine::Rename(index, name)) => {
                CountdownCommand::RenameStage { index, name }
            }
            Err(e) => {
                Display::show_error(&e.to_string());
                continue;
            }
        };
        let quit = command == CountdownCommand::Quit;
        if command_tx.send(command).is_err() || quit {
            break;
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

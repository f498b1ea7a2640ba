//! Command definitions for the atelier CLI.
//!
//! Uses clap derive macro for argument parsing, plus line parsers for the
//! interactive prompts of the slideshow and countdown loops.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::countdown::CountdownError;
use crate::slideshow::settings::SessionModeKind;
use crate::slideshow::{DurationUnit, SessionUnit, SlideshowCommand};

// ============================================================================
// CLI Structure
// ============================================================================

/// Atelier - slideshow viewer and multi-stage countdown for the terminal
#[derive(Parser, Debug)]
#[command(
    name = "atelier",
    version,
    about = "Shuffled image slideshows and multi-stage countdowns",
    long_about = "Two small studio tools: a slideshow runner that shuffles the\n\
                  images of a directory tree with session limits, and a\n\
                  multi-stage countdown with drift-free timing.",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Slideshow operations
    #[command(subcommand)]
    Slideshow(SlideshowCommands),

    /// Multi-stage countdown operations
    #[command(subcommand)]
    Countdown(CountdownCommands),

    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Slideshow subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum SlideshowCommands {
    /// Run a slideshow session
    Run(SlideshowRunArgs),

    /// Count the displayable images under a directory
    Count(ScanArgs),

    /// List the immediate subdirectories of a directory
    Subdirs {
        /// Directory to inspect
        dir: PathBuf,
    },
}

/// Countdown subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum CountdownCommands {
    /// Run an interactive countdown
    Run(CountdownRunArgs),
}

// ============================================================================
// Slideshow Arguments
// ============================================================================

/// Arguments for `slideshow run`. Unset options fall back to the persisted
/// settings.
#[derive(Args, Debug, Clone, Default)]
pub struct SlideshowRunArgs {
    /// Directory to scan for images
    #[arg(short, long)]
    pub dir: Option<PathBuf>,

    /// Restrict the scan to these immediate subdirectories (repeatable);
    /// the root directory's own files are always included
    #[arg(long = "subdir")]
    pub subdirs: Vec<String>,

    /// Display duration per image (1-3600)
    #[arg(
        long,
        value_parser = clap::value_parser!(u32).range(1..=3600)
    )]
    pub duration: Option<u32>,

    /// Unit for --duration
    #[arg(long, value_enum)]
    pub unit: Option<DurationUnit>,

    /// Session mode
    #[arg(short, long, value_enum)]
    pub mode: Option<SessionModeKind>,

    /// Number of images to show in count mode (1-10000)
    #[arg(
        long,
        value_parser = clap::value_parser!(u32).range(1..=10_000)
    )]
    pub count: Option<u32>,

    /// Session length in time mode (1-1440)
    #[arg(
        long,
        value_parser = clap::value_parser!(u32).range(1..=1440)
    )]
    pub length: Option<u32>,

    /// Unit for --length
    #[arg(long, value_enum)]
    pub length_unit: Option<SessionUnit>,

    /// Do not persist the effective settings for next time
    #[arg(long)]
    pub no_save: bool,
}

/// Arguments for scan-only operations
#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
    /// Directory to scan for images
    pub dir: PathBuf,

    /// Restrict the scan to these immediate subdirectories (repeatable)
    #[arg(long = "subdir")]
    pub subdirs: Vec<String>,
}

// ============================================================================
// Countdown Arguments
// ============================================================================

/// Arguments for `countdown run`
#[derive(Args, Debug, Clone, Default)]
pub struct CountdownRunArgs {
    /// Stage spec, repeatable: "[NAME:][HH:][MM:]SS" (e.g. "Work:25:00")
    #[arg(short, long = "stage", value_parser = parse_stage_spec)]
    pub stages: Vec<StageSpec>,
}

/// One parsed --stage value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageSpec {
    /// Stage name, when the spec carried one.
    pub name: Option<String>,
    /// Stage duration. Zero is allowed; such stages are skipped at run time.
    pub duration: Duration,
}

/// Parses a stage spec of the form `[NAME:][HH:][MM:]SS`.
///
/// A non-numeric first segment is taken as the name; the remaining segments
/// are the time, seconds-first from the right.
pub fn parse_stage_spec(s: &str) -> Result<StageSpec, CountdownError> {
    let invalid = |reason: &str| CountdownError::InvalidStageSpec {
        spec: s.to_string(),
        reason: reason.to_string(),
    };

    let mut parts: Vec<&str> = s.split(':').collect();
    let name = if parts
        .first()
        .is_some_and(|p| !p.is_empty() && p.parse::<u64>().is_err())
    {
        Some(parts.remove(0).to_string())
    } else {
        None
    };

    if parts.is_empty() || parts.iter().any(|p| p.is_empty()) {
        return Err(invalid("missing duration"));
    }
    if parts.len() > 3 {
        return Err(invalid("too many time segments (max HH:MM:SS)"));
    }

    let mut seconds: u64 = 0;
    for part in &parts {
        let value: u64 = part
            .parse()
            .map_err(|_| invalid("time segments must be numbers"))?;
        seconds = seconds
            .checked_mul(60)
            .and_then(|s| s.checked_add(value))
            .ok_or_else(|| invalid("duration overflows"))?;
    }

    Ok(StageSpec {
        name,
        duration: Duration::from_secs(seconds),
    })
}

// ============================================================================
// Interactive Line Parsing
// ============================================================================

/// Actions available at the countdown prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountdownLine {
    /// Empty line: start / pause / resume.
    Toggle,
    /// Explicit start.
    Start,
    /// Explicit pause.
    Pause,
    /// Reset to idle.
    Reset,
    /// Quit the loop.
    Quit,
    /// Append a stage.
    Add(StageSpec),
    /// Remove the stage at a zero-based index.
    Remove(usize),
    /// Rename the stage at a zero-based index.
    Rename(usize, String),
}

/// Parses one line of countdown prompt input. Indices at the prompt are
/// 1-based.
pub fn parse_countdown_line(line: &str) -> Result<CountdownLine, CountdownError> {
    let invalid = |reason: &str| CountdownError::InvalidStageSpec {
        spec: line.to_string(),
        reason: reason.to_string(),
    };

    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(CountdownLine::Toggle);
    }

    let (verb, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (trimmed, ""),
    };

    match verb {
        "s" | "start" => Ok(CountdownLine::Start),
        "p" | "pause" => Ok(CountdownLine::Pause),
        "r" | "reset" => Ok(CountdownLine::Reset),
        "q" | "quit" => Ok(CountdownLine::Quit),
        "add" => {
            if rest.is_empty() {
                return Err(invalid("usage: add [NAME:][HH:][MM:]SS"));
            }
            Ok(CountdownLine::Add(parse_stage_spec(rest)?))
        }
        "rm" => {
            let position: usize = rest
                .parse()
                .map_err(|_| invalid("usage: rm POSITION"))?;
            if position == 0 {
                return Err(invalid("positions start at 1"));
            }
            Ok(CountdownLine::Remove(position - 1))
        }
        "name" => {
            let (position, new_name) = rest
                .split_once(char::is_whitespace)
                .ok_or_else(|| invalid("usage: name POSITION NEW_NAME"))?;
            let position: usize = position
                .parse()
                .map_err(|_| invalid("usage: name POSITION NEW_NAME"))?;
            if position == 0 {
                return Err(invalid("positions start at 1"));
            }
            Ok(CountdownLine::Rename(position - 1, new_name.trim().to_string()))
        }
        _ => Err(invalid("unknown action")),
    }
}

/// Parses one line of slideshow prompt input. Unknown input advances, same
/// as an empty line.
pub fn parse_slideshow_line(line: &str) -> SlideshowCommand {
    match line.trim() {
        "q" | "quit" => SlideshowCommand::Quit,
        "p" | "prev" => SlideshowCommand::Previous,
        _ => SlideshowCommand::Next,
    }
}

// ============================================================================
// Tests
// ============================================================================

//! CLI module for atelier.
//!
//! This module provides the command-line interface:
//! - `commands`: Command definitions using clap derive, plus prompt parsers
//! - `app`: Engine wiring for the slideshow and countdown loops
//! - `display`: Output formatting and display logic

pub mod app;
pub mod commands;
pub mod display;

pub use commands::{
    parse_countdown_line, parse_slideshow_line, parse_stage_spec, Cli, Commands, CountdownCommands,
    CountdownLine, CountdownRunArgs, ScanArgs, SlideshowCommands, SlideshowRunArgs, StageSpec,
};
pub use display::Display;

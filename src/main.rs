//! Atelier - slideshow viewer and multi-stage countdown for the terminal
//!
//! Two tools in one binary:
//! - `slideshow`: shuffles the images of a directory tree and shows them on
//!   a timer, with infinite, count-bounded and time-bounded sessions
//! - `countdown`: chained named timers with drift-free remaining time

use anyhow::Result;
use clap::{CommandFactory, Parser};

use atelier::cli::{app, Cli, Commands, CountdownCommands, Display, SlideshowCommands};

/// Main entry point
#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize logging
    init_tracing();

    // Parse command line arguments
    let cli = Cli::parse();

    // Execute command
    if let Err(e) = execute(cli).await {
        Display::show_error(&e.to_string());
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber for logging.
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}

/// Executes the CLI command.
async fn execute(cli: Cli) -> Result<()> {
    if cli.verbose {
        tracing::info!("Verbose mode enabled");
    }

    match cli.command {
        Some(Commands::Slideshow(SlideshowCommands::Run(args))) => {
            app::run_slideshow(args).await?;
        }
        Some(Commands::Slideshow(SlideshowCommands::Count(args))) => {
            app::count_images(&args)?;
        }
        Some(Commands::Slideshow(SlideshowCommands::Subdirs { dir })) => {
            app::list_subdirs(&dir)?;
        }
        Some(Commands::Countdown(CountdownCommands::Run(args))) => {
            app::run_countdown(args).await?;
        }
        Some(Commands::Completions { shell }) => {
            generate_completions(shell);
        }
        None => {
            // No command provided, show help
            Cli::command().print_help()?;
        }
    }

    Ok(())
}

/// Generates shell completion scripts.
fn generate_completions(shell: clap_complete::Shell) {
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}

// ============================================================================
// Tests
// ============================================================================

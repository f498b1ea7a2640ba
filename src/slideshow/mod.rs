//! Slideshow flow: directory scanning, shuffled sequencing, session limits
//! and settings persistence.
//!
//! - `scanner`: recursive image discovery with an optional subdirectory
//!   allow-set and a process-lifetime count cache
//! - `session`: the session controller (deck, cursor, limits)
//! - `settings`: flat JSON settings with default fallback
//! - `engine`: periodic tick loop emitting presentation events
//! - `error`: slideshow error type

pub mod engine;
pub mod error;
pub mod scanner;
pub mod session;
pub mod settings;

pub use engine::{SlideshowCommand, SlideshowEngine, SlideshowEvent, SESSION_CLOSE_DELAY};
pub use error::SlideshowError;
pub use scanner::{
    find_image_files, is_supported_image, list_subdirectories, ImageCountCache, SubdirEntry,
    SUPPORTED_IMAGE_EXTENSIONS,
};
pub use session::{
    file_uri, CompletionReason, DurationUnit, ImageCard, SessionController, SessionMode,
    SessionUnit, Step,
};
pub use settings::{SessionModeKind, Settings};

//! Slideshow error types.
//!
//! Scanner and settings failures are recovered locally wherever possible;
//! the variants here are the ones that reach a caller.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur in the slideshow flow.
#[derive(Debug, Error)]
pub enum SlideshowError {
    /// The scan produced no image files for the requested directory.
    #[error("no image files found in {0}")]
    NoImagesFound(String),

    /// A session controller was constructed with an empty image set.
    #[error("image set is empty")]
    EmptyImageSet,

    /// No directory is configured and none was supplied on the command line.
    #[error("no image directory configured; pass --dir or run with saved settings")]
    NoDirectory,

    /// The settings record could not be serialized.
    #[error("failed to serialize settings")]
    SettingsSerialize(#[from] serde_json::Error),

    /// The settings file could not be written.
    #[error("failed to write settings to {path}")]
    SettingsWrite {
        /// Destination path of the settings file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl SlideshowError {
    /// Returns true if the error only affects persistence, not the running
    /// session. Such errors are logged and otherwise ignored.
    #[must_use]
    pub fn is_persistence_error(&self) -> bool {
        matches!(
            self,
            Self::SettingsSerialize(_) | Self::SettingsWrite { .. }
        )
    }
}

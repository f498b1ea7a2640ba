//! Flat settings file for the slideshow.
//!
//! The record is a single JSON object with camelCase keys, kept compatible
//! with the historical settings file layout. A missing or malformed file
//! silently falls back to defaults; write failures are reported to the caller
//! who logs and continues.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::slideshow::error::SlideshowError;
use crate::slideshow::session::{DurationUnit, SessionMode, SessionUnit};

/// Discriminant of [`SessionMode`] as persisted in the settings file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SessionModeKind {
    /// Run until quit.
    Infinite,
    /// Fixed image count.
    Count,
    /// Fixed wall-clock length.
    Time,
}

/// Persisted slideshow configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Image directory of the last session ("" when never set).
    pub directory: String,
    /// Display duration amount, in `unit`.
    pub duration: u32,
    /// Unit of `duration`.
    pub unit: DurationUnit,
    /// Session mode of the last session.
    pub session_mode: SessionModeKind,
    /// Image target for count mode.
    pub image_count: u32,
    /// Session length for time mode, in `session_unit`.
    pub session_length: u32,
    /// Unit of `session_length`.
    pub session_unit: SessionUnit,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            directory: String::new(),
            duration: 1,
            unit: DurationUnit::Minutes,
            session_mode: SessionModeKind::Infinite,
            image_count: 10,
            session_length: 30,
            session_unit: SessionUnit::Minutes,
        }
    }
}

impl Settings {
    /// Default location of the settings file, under the per-user config
    /// directory. `None` when the platform exposes no config directory.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("atelier").join("settings.json"))
    }

    /// Loads settings from `path`, falling back to defaults when the file is
    /// missing or malformed.
    #[must_use]
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(settings) => settings,
                Err(e) => {
                    debug!(path = %path.display(), error = %e, "malformed settings file; using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                debug!(path = %path.display(), error = %e, "settings file not readable; using defaults");
                Self::default()
            }
        }
    }

    /// Writes the settings to `path` as pretty JSON, creating parent
    /// directories as needed.
    ///
    /// # Errors
    ///
    /// Returns a persistence error; callers log it and continue, a failed
    /// save never aborts a session.
    pub fn save(&self, path: &Path) -> Result<(), SlideshowError> {
        let json = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| SlideshowError::SettingsWrite {
                path: path.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, json).map_err(|source| SlideshowError::SettingsWrite {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reconstructs the structured [`SessionMode`] from the flat record.
    #[must_use]
    pub fn session_mode(&self) -> SessionMode {
        match self.session_mode {
            SessionModeKind::Infinite => SessionMode::Infinite,
            SessionModeKind::Count => SessionMode::Count {
                target: self.image_count,
            },
            SessionModeKind::Time => SessionMode::Time {
                length: self.session_length,
                unit: self.session_unit,
            },
        }
    }

    /// Flattens a structured [`SessionMode`] back into the record. Fields of
    /// the other modes keep their previous values, as the original settings
    /// file did.
    pub fn set_session_mode(&mut self, mode: SessionMode) {
        match mode {
            SessionMode::Infinite => self.session_mode = SessionModeKind::Infinite,
            SessionMode::Count { target } => {
                self.session_mode = SessionModeKind::Count;
                self.image_count = target;
            }
            SessionMode::Time { length, unit } => {
                self.session_mode = SessionModeKind::Time;
                self.session_length = length;
                self.session_unit = unit;
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

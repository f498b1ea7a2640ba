//! Directory scanning for image files.
//!
//! The scanner is best-effort by design: a directory that cannot be read
//! contributes zero files and a warning, never an error. Callers that need
//! "no images at all" as a failure check the result themselves.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

/// File extensions recognized as images, compared case-insensitively.
pub const SUPPORTED_IMAGE_EXTENSIONS: &[&str] =
    &["jpg", "jpeg", "png", "gif", "bmp", "tiff", "webp"];

/// Returns true if the path has a supported image extension.
#[must_use]
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SUPPORTED_IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Recursively collects image files under `root`.
///
/// When `allowed` is `Some`, a directory is entered only if the set contains
/// its full path; the check applies at every depth. Callers that want the
/// root itself scanned must insert it into the set; with `None` every
/// directory is entered.
///
/// Unreadable directories are skipped with a warning. No ordering is
/// guaranteed.
#[must_use]
pub fn find_image_files(root: &Path, allowed: Option<&HashSet<PathBuf>>) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let enter_root = allowed.map_or(true, |set| set.contains(root));
    if enter_root {
        collect_images(root, allowed, &mut files);
    }
    files
}

fn collect_images(dir: &Path, allowed: Option<&HashSet<PathBuf>>, out: &mut Vec<PathBuf>) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "failed to read directory; skipping subtree");
            return;
        }
    };

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "failed to read directory entry");
                continue;
            }
        };
        let path = entry.path();
        let file_type = match entry.file_type() {
            Ok(ft) => ft,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to stat entry");
                continue;
            }
        };

        if file_type.is_dir() {
            let enter = allowed.map_or(true, |set| set.contains(&path));
            if enter {
                collect_images(&path, allowed, out);
            }
        } else if file_type.is_file() && is_supported_image(&path) {
            out.push(path);
        }
    }
}

// ============================================================================
// Subdirectory listing
// ============================================================================

/// One immediate subdirectory of a scanned root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubdirEntry {
    /// Directory name (last path component).
    pub name: String,
    /// Full path of the directory.
    pub path: PathBuf,
}

/// Lists the immediate subdirectories of `dir`, sorted by name.
///
/// Returns an empty list on read error (logged).
#[must_use]
pub fn list_subdirectories(dir: &Path) -> Vec<SubdirEntry> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "failed to list subdirectories");
            return Vec::new();
        }
    };

    let mut subdirs: Vec<SubdirEntry> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false))
        .map(|entry| SubdirEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            path: entry.path(),
        })
        .collect();

    subdirs.sort_by(|a, b| a.name.cmp(&b.name));
    subdirs
}

// ============================================================================
// ImageCountCache
// ============================================================================

/// Process-lifetime cache of image counts, keyed by the composite of root
/// directory and selected subdirectory set. Never invalidated; it only exists
/// to avoid repeating identical recursive scans.
#[derive(Debug, Default)]
pub struct ImageCountCache {
    counts: HashMap<String, usize>,
}

impl ImageCountCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the image count for `dir` restricted to `include_subdirs`,
    /// scanning only on a cache miss. An empty selection means the whole
    /// tree; a non-empty one always admits the root itself as well.
    pub fn count_images(&mut self, dir: &Path, include_subdirs: &[PathBuf]) -> usize {
        let allowed = selection_allow_set(dir, include_subdirs);
        let key = cache_key(dir, allowed.as_ref());
        if let Some(&count) = self.counts.get(&key) {
            return count;
        }

        let count = find_image_files(dir, allowed.as_ref()).len();
        self.counts.insert(key, count);
        count
    }

    /// Records a count obtained from a scan performed elsewhere (a session
    /// start scans anyway, so its result is reused).
    pub fn record(&mut self, dir: &Path, include_subdirs: &[PathBuf], count: usize) {
        let allowed = selection_allow_set(dir, include_subdirs);
        self.counts.insert(cache_key(dir, allowed.as_ref()), count);
    }

    /// Number of cached query shapes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Returns true if nothing has been cached yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Builds the allow-set for a subdirectory selection: `None` (whole tree)
/// when the selection is empty, otherwise the selection plus the root.
fn selection_allow_set(dir: &Path, include_subdirs: &[PathBuf]) -> Option<HashSet<PathBuf>> {
    if include_subdirs.is_empty() {
        return None;
    }
    let mut allowed: HashSet<PathBuf> = include_subdirs.iter().cloned().collect();
    allowed.insert(dir.to_path_buf());
    Some(allowed)
}

/// Builds the composite cache key for a directory plus allow-set.
///
/// The set is sorted so that the same selection always produces the same key
/// regardless of insertion order; an unrestricted scan keys on the directory
/// alone.
fn cache_key(dir: &Path, allowed: Option<&HashSet<PathBuf>>) -> String {
    match allowed {
        None => dir.display().to_string(),
        Some(set) => {
            let mut sorted: Vec<String> = set.iter().map(|p| p.display().to_string()).collect();
            sorted.sort();
            format!("{}|{}", dir.display(), sorted.join(";"))
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

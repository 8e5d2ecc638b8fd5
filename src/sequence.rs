//! Source file discovery
//!
//! Lists `dir/*.<ext>` for every configured extension (non-recursive,
//! case-insensitive) and orders the result by file name. The position in
//! that list is the frame index.

use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::error::ViewerError;

/// Collect frame paths in playback order.
///
/// # Errors
///
/// - `ViewerError::MissingDirectory`: `dir` does not exist or is not a directory
/// - `ViewerError::EmptyDirectory`: no file matched any extension
/// - `ViewerError::Glob`: unreadable entry
pub fn list_frames(dir: &Path, extensions: &[String]) -> Result<Vec<PathBuf>, ViewerError> {
    if !dir.is_dir() {
        return Err(ViewerError::MissingDirectory(dir.to_path_buf()));
    }

    let mut paths = Vec::new();
    for ext in extensions {
        paths.extend(glob_paths(dir, ext)?);
    }

    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    paths.dedup();

    if paths.is_empty() {
        return Err(ViewerError::EmptyDirectory(dir.to_path_buf()));
    }

    info!("Found {} frames in {}", paths.len(), dir.display());
    Ok(paths)
}

fn glob_paths(dir: &Path, ext: &str) -> Result<Vec<PathBuf>, ViewerError> {
    // Normalize path separators for cross-platform glob compatibility
    let base = glob::Pattern::escape(&dir.to_string_lossy()).replace('\\', "/");
    let pattern = format!("{}/*.{}", base.trim_end_matches('/'), glob::Pattern::escape(ext));
    debug!("glob_paths: pattern = {}", pattern);

    let options = glob::MatchOptions {
        case_sensitive: false,
        ..Default::default()
    };

    let mut paths = Vec::new();
    for entry in glob::glob_with(&pattern, options)
        .map_err(|e| ViewerError::Glob(format!("Glob error for pattern {}: {}", pattern, e)))?
    {
        let path = entry.map_err(|e| ViewerError::Glob(format!("Glob entry error: {}", e)))?;
        if path.is_file() {
            paths.push(path);
        }
    }
    Ok(paths)
}

//! Error type shared by discovery, decoding and rendering.
//!
//! None of these escalate past a log line except the startup variants
//! (`MissingDirectory`, `EmptyDirectory`), which abort before the window opens.

use std::path::PathBuf;

/// Viewer errors
#[derive(Debug)]
pub enum ViewerError {
    /// Source directory does not exist
    MissingDirectory(PathBuf),
    /// Source directory has no files with a known extension
    EmptyDirectory(PathBuf),
    /// Bad glob pattern or unreadable directory entry
    Glob(String),
    /// Decoder failure (corrupt file, unsupported format, io)
    Image(String),
    /// Decoded colour layout is not gray, RGB or RGBA
    UnsupportedLayout(String),
    /// Frame bytes cannot be turned into a displayable image
    Render(String),
}

impl std::fmt::Display for ViewerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViewerError::MissingDirectory(p) => write!(f, "Directory not found: {}", p.display()),
            ViewerError::EmptyDirectory(p) => write!(f, "No images in directory: {}", p.display()),
            ViewerError::Glob(e) => write!(f, "Glob error: {}", e),
            ViewerError::Image(e) => write!(f, "Image error: {}", e),
            ViewerError::UnsupportedLayout(e) => write!(f, "Unsupported layout: {}", e),
            ViewerError::Render(e) => write!(f, "Render error: {}", e),
        }
    }
}

impl std::error::Error for ViewerError {}

impl From<image::ImageError> for ViewerError {
    fn from(e: image::ImageError) -> Self {
        ViewerError::Image(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_path() {
        let e = ViewerError::EmptyDirectory(PathBuf::from("converted"));
        assert_eq!(e.to_string(), "No images in directory: converted");
    }
}

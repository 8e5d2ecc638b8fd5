//! Runtime configuration and pipeline constants.

use std::path::PathBuf;
use std::time::Duration;

use crate::cli::Args;

/// Capacity of the bounded task channel (feeder backpressure)
pub const TASK_QUEUE_SIZE: usize = 20;

/// Maximum thumbnail box, aspect ratio preserved
pub const THUMBNAIL_SIZE: (u32, u32) = (640, 480);

/// Poll period while waiting for frame 0
pub const LOADING_DELAY: Duration = Duration::from_millis(200);

/// Poll period of the result collector
pub const RESULTS_CHECK_DELAY: Duration = Duration::from_millis(10);

/// Playback period used when fps <= 0
pub const DEFAULT_PERIOD: Duration = Duration::from_millis(66);

/// Bounded wait of a worker fetching a task
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(1);

/// Bounded wait of the feeder pushing a task or sentinel
pub const SEND_TIMEOUT: Duration = Duration::from_secs(1);

/// Default source directory
pub const DEFAULT_DIR: &str = "converted";

/// Default frames per second
pub const DEFAULT_FPS: i32 = 15;

/// Extensions picked up when `--ext` is not given
pub const DEFAULT_EXTENSIONS: &[&str] = &["jp2", "png", "jpg", "jpeg", "tif", "tiff", "tga", "exr", "hdr", "bmp"];

/// Default worker count: all cores but one for the UI thread.
pub fn default_workers() -> usize {
    num_cpus::get().saturating_sub(1).max(1)
}

/// Playback period for a frame rate (integer milliseconds, like a UI timer).
pub fn frame_period(fps: i32) -> Duration {
    if fps > 0 {
        Duration::from_millis((1000 / fps) as u64)
    } else {
        DEFAULT_PERIOD
    }
}

/// Resolved viewer settings
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub directory: PathBuf,
    pub fps: i32,
    pub num_workers: usize,
    pub extensions: Vec<String>,
    pub thumbnail_box: (u32, u32),
}

impl ViewerConfig {
    pub fn from_args(args: &Args) -> Self {
        let extensions = if args.extensions.is_empty() {
            DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect()
        } else {
            args.extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_lowercase())
                .collect()
        };

        Self {
            directory: args.directory.clone(),
            fps: args.fps,
            num_workers: args.workers.map(|n| n.max(1)).unwrap_or_else(default_workers),
            extensions,
            thumbnail_box: args.thumb.unwrap_or(THUMBNAIL_SIZE),
        }
    }

    pub fn period(&self) -> Duration {
        frame_period(self.fps)
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(DEFAULT_DIR),
            fps: DEFAULT_FPS,
            num_workers: default_workers(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            thumbnail_box: THUMBNAIL_SIZE,
        }
    }
}

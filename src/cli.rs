use clap::Parser;
use std::path::PathBuf;

use crate::config::{DEFAULT_DIR, DEFAULT_FPS};

/// Image sequence flipbook: loops a directory of stills at a fixed frame rate
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Directory with the numbered images (non-recursive, sorted by name)
    #[arg(value_name = "DIR", default_value = DEFAULT_DIR)]
    pub directory: PathBuf,

    /// Playback frame rate; 0 or negative falls back to the default period
    #[arg(long = "fps", value_name = "FPS", default_value_t = DEFAULT_FPS, allow_negative_numbers = true)]
    pub fps: i32,

    /// Decode worker threads (default: CPU count minus one)
    #[arg(short = 'w', long = "workers", value_name = "N")]
    pub workers: Option<usize>,

    /// File extension to load (can be specified multiple times)
    #[arg(short = 'e', long = "ext", value_name = "EXT")]
    pub extensions: Vec<String>,

    /// Thumbnail box, e.g. 640x480
    #[arg(long = "thumb", value_name = "WxH", value_parser = parse_box)]
    pub thumb: Option<(u32, u32)>,

    /// Enable debug logging to file (default: flipbook.log)
    #[arg(short = 'l', long = "log", value_name = "LOG_FILE")]
    pub log_file: Option<Option<PathBuf>>,

    /// Increase logging verbosity (default: warn, -v: info, -vv: debug, -vvv+: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

fn parse_box(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WxH, got '{}'", s))?;
    let w: u32 = w.trim().parse().map_err(|e| format!("bad width '{}': {}", w, e))?;
    let h: u32 = h.trim().parse().map_err(|e| format!("bad height '{}': {}", h, e))?;
    if w == 0 || h == 0 {
        return Err("thumbnail box must be non-zero".into());
    }
    Ok((w, h))
}

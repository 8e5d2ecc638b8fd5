//! FLIPBOOK - image sequence flipbook library
//!
//! Re-exports all modules for use by the binary target.

// Decode pipeline (worker threads)
pub mod decode;
pub mod feeder;
pub mod frame;
pub mod pipeline;
pub mod shutdown;
pub mod workers;

// UI-thread side
pub mod collector;
pub mod display;
pub mod player;
pub mod scheduler;
pub mod viewer;

// App modules
pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod sequence;

pub use config::ViewerConfig;
pub use error::ViewerError;
pub use frame::{DecodedFrame, FrameBuffer, FrameTask};
pub use pipeline::Pipeline;
pub use player::Player;
pub use shutdown::ShutdownFlag;
pub use viewer::Viewer;

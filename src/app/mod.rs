//! Application module - FlipbookApp and its eframe glue.
//!
//! - `run` - eframe::App implementation (per-frame timers, panels, close handling)

mod run;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use eframe::egui;
use log::info;

use crate::config::ViewerConfig;
use crate::decode::FrameDecoder;
use crate::display::TextureSurface;
use crate::viewer::Viewer;

/// Background behind the frame area
pub const BACKDROP: egui::Color32 = egui::Color32::from_rgb(255, 192, 203);

/// Main application state: the viewer plus window-level bits.
pub struct FlipbookApp {
    pub viewer: Viewer<TextureSurface>,
}

impl FlipbookApp {
    /// Start the decode pipeline and the UI timers.
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        paths: Vec<PathBuf>,
        config: &ViewerConfig,
        decoder: Arc<dyn FrameDecoder>,
    ) -> io::Result<Self> {
        let surface = TextureSurface::new(cc.egui_ctx.clone());
        let viewer = Viewer::launch(surface, paths, config, decoder, Instant::now())?;
        info!("Viewer started: {} frames at {:?} per frame", viewer.total(), config.period());
        Ok(Self { viewer })
    }

    /// Join every decode thread, then ask the window to close.
    pub fn exit(&mut self, ctx: &egui::Context) {
        self.shutdown();
        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
    }

    /// Stop the pipeline if still running (no-op on repeat calls).
    fn shutdown(&mut self) {
        if let Some(report) = self.viewer.shutdown() {
            info!(
                "Pipeline stopped: {} workers joined, {}/{} frames loaded",
                report.workers.len(),
                self.viewer.buffer().loaded(),
                self.viewer.total()
            );
        }
    }
}

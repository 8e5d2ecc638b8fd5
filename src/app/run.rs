//! Main application loop - eframe::App implementation.
//!
//! Each frame:
//! 1. Handle window close (join decode threads before the window goes away)
//! 2. Run due timers (collect results, wait for frame 0, advance playback)
//! 3. Render status bar and frame
//! 4. Schedule the next repaint (result polling stops waking the UI once decoding is done)

use std::time::Instant;

use eframe::{egui, glow};
use log::{info, trace};

use crate::app::{BACKDROP, FlipbookApp};

impl eframe::App for FlipbookApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if ctx.input(|i| i.viewport().close_requested()) {
            info!("Window close requested");
            self.shutdown();
            return;
        }

        let ran = self.viewer.run_due(Instant::now());
        if ran > 0 {
            trace!("Ran {} timer ticks", ran);
        }

        let mut exit_clicked = false;
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.monospace(self.viewer.status());
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    exit_clicked = ui.button("Exit").clicked();
                });
            });
        });

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE.fill(BACKDROP))
            .show(ctx, |ui| {
                self.viewer.surface().show(ui);
            });

        if exit_clicked {
            info!("Exit requested");
            self.exit(ctx);
            return;
        }

        if let Some(deadline) = self.viewer.repaint_deadline() {
            ctx.request_repaint_after(deadline.saturating_duration_since(Instant::now()));
        }
    }

    /// Cleanup on application exit (window torn down without a close request).
    fn on_exit(&mut self, _gl: Option<&glow::Context>) {
        self.shutdown();
        trace!("Decode threads stopped on exit");
    }
}

//! Frame display surface
//!
//! Converts `DecodedFrame` bytes into an egui texture. One texture handle is
//! kept for the lifetime of the surface and overwritten in place on every
//! frame; dropping the handle would free the GPU texture while egui still
//! draws it.

use eframe::egui;
use log::trace;

use crate::error::ViewerError;
use crate::frame::DecodedFrame;

/// Anything that can put a decoded frame on screen.
pub trait Surface {
    fn render(&mut self, frame: &DecodedFrame) -> Result<(), ViewerError>;
}

/// Rebuild a displayable image from packed RGB8 bytes.
///
/// Rejects zero-sized frames and byte counts that disagree with the dimensions
/// (`ColorImage::from_rgb` would panic on those).
pub fn to_color_image(frame: &DecodedFrame) -> Result<egui::ColorImage, ViewerError> {
    if frame.width == 0 || frame.height == 0 {
        return Err(ViewerError::Render(format!("frame {} has zero size", frame.index)));
    }
    if frame.pixels.len() != frame.expected_len() {
        return Err(ViewerError::Render(format!(
            "frame {}: {} bytes for {}x{} RGB",
            frame.index,
            frame.pixels.len(),
            frame.width,
            frame.height
        )));
    }

    Ok(egui::ColorImage::from_rgb(
        [frame.width as usize, frame.height as usize],
        &frame.pixels,
    ))
}

/// egui-backed surface: one retained texture drawn in the central panel.
pub struct TextureSurface {
    ctx: egui::Context,
    texture: Option<egui::TextureHandle>,
    shown: Option<usize>,
}

impl TextureSurface {
    pub fn new(ctx: egui::Context) -> Self {
        Self {
            ctx,
            texture: None,
            shown: None,
        }
    }

    /// Index of the frame currently uploaded
    pub fn shown(&self) -> Option<usize> {
        self.shown
    }

    pub fn texture(&self) -> Option<&egui::TextureHandle> {
        self.texture.as_ref()
    }

    /// Draw the current texture, centered, at native size.
    pub fn show(&self, ui: &mut egui::Ui) {
        if let Some(texture) = &self.texture {
            ui.centered_and_justified(|ui| {
                ui.image(egui::load::SizedTexture::from_handle(texture));
            });
        }
    }
}

impl Surface for TextureSurface {
    fn render(&mut self, frame: &DecodedFrame) -> Result<(), ViewerError> {
        let image = to_color_image(frame)?;

        match &mut self.texture {
            Some(texture) => texture.set(image, egui::TextureOptions::LINEAR),
            None => {
                self.texture = Some(self.ctx.load_texture("flipbook-frame", image, egui::TextureOptions::LINEAR));
            }
        }

        trace!("Rendered frame {} ({}x{})", frame.index, frame.width, frame.height);
        self.shown = Some(frame.index);
        self.ctx.request_repaint();
        Ok(())
    }
}

//! Live preview rendering
//!
//! The preview goes through the same capture routine as the export, just at
//! screen resolution, so what you see is what the PNG will contain.

use super::App;
use crate::card::{self, CaptureMode, CaptureOptions};
use crate::constants::PREVIEW_PX;
use eframe::egui;
use tracing::warn;

impl App {
    /// Re-render the preview texture if any card field changed since the
    /// last frame. Pure function of state; cheap at preview resolution.
    pub fn refresh_preview(&mut self, ctx: &egui::Context) {
        let (snapshot, revision) = {
            let card = self.card.lock().unwrap();
            if self.preview_revision == Some(card.revision) && self.preview_texture.is_some() {
                return;
            }
            (card.clone(), card.revision)
        };

        let opts = CaptureOptions {
            mode: CaptureMode::Exact,
            target: PREVIEW_PX,
            scale: 1.0,
            transparent_background: false,
        };

        match card::capture(&snapshot, &opts, &self.fontdb) {
            Ok(img) => {
                let size = [img.width() as usize, img.height() as usize];
                let texture = ctx.load_texture(
                    "card_preview",
                    egui::ColorImage::from_rgba_unmultiplied(size, img.as_raw()),
                    egui::TextureOptions::LINEAR,
                );
                self.preview_texture = Some(texture);
            }
            Err(e) => warn!(error = %e, "Preview render failed"),
        }
        self.preview_revision = Some(revision);
    }
}

//! Image intake: file picker plus async read-and-decode into a card slot

use super::App;
use crate::card::UploadedImage;
use crate::constants::IMAGE_EXTENSIONS;
use crate::types::ImageSlot;
use eframe::egui;
use std::path::PathBuf;
use tracing::{debug, warn};

impl App {
    /// Open the native picker for a card image slot. The read and decode run
    /// on the runtime so a large file never stalls a frame.
    pub fn pick_image(&mut self, ctx: &egui::Context, slot: ImageSlot) {
        let dialog = rfd::FileDialog::new().add_filter("Images", IMAGE_EXTENSIONS);
        if let Some(path) = dialog.pick_file() {
            self.load_image(ctx, slot, path);
        }
    }

    pub fn load_image(&mut self, ctx: &egui::Context, slot: ImageSlot, path: PathBuf) {
        let card = self.card.clone();
        let ctx = ctx.clone();

        let handle = self.runtime.spawn(async move {
            match tokio::fs::read(&path).await {
                Ok(bytes) => match UploadedImage::from_encoded(bytes) {
                    Ok(img) => {
                        debug!(
                            path = %path.display(),
                            width = img.width,
                            height = img.height,
                            slot = slot.label(),
                            "Upload decoded"
                        );
                        let mut card = card.lock().unwrap();
                        match slot {
                            ImageSlot::Profile => card.profile_image = Some(img),
                            ImageSlot::Background => card.background_image = Some(img),
                        }
                        card.touch();
                    }
                    // Unreadable uploads are dropped silently; the slot
                    // simply never updates
                    Err(e) => {
                        warn!(error = %e, path = %path.display(), "Ignoring upload that failed to decode")
                    }
                },
                Err(e) => warn!(error = %e, path = %path.display(), "Failed to read upload"),
            }
            ctx.request_repaint();
        });

        self.pending_decodes.lock().unwrap().push(handle);
    }

    pub fn clear_image(&mut self, slot: ImageSlot) {
        let mut card = self.card.lock().unwrap();
        match slot {
            ImageSlot::Profile => card.profile_image = None,
            ImageSlot::Background => card.background_image = None,
        }
        card.touch();
    }
}

//! Utility functions

use crate::constants::APP_NAME;
use std::path::PathBuf;

// App icon: card silhouette with avatar dot and text bars (square, for
// window/taskbar icons)
pub const ICON_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 64 64"><rect width="64" height="64" rx="12" fill="#15202b"/><circle cx="17" cy="19" r="7" fill="#1d9bf0"/><rect x="28" y="13" width="22" height="4" rx="2" fill="#ffffff"/><rect x="28" y="21" width="14" height="4" rx="2" fill="#8b98a5"/><rect x="10" y="36" width="44" height="4" rx="2" fill="#ffffff"/><rect x="10" y="44" width="36" height="4" rx="2" fill="#ffffff"/></svg>"##;

/// Rasterize the icon SVG to a square image (for window/taskbar icons).
pub fn rasterize_icon(size: u32) -> (Vec<u8>, u32, u32) {
    let tree = resvg::usvg::Tree::from_str(ICON_SVG, &resvg::usvg::Options::default()).unwrap();
    let scale = size as f32 / tree.size().width();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size, size).unwrap();
    resvg::render(
        &tree,
        resvg::usvg::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );
    (premul_to_straight(&pixmap), size, size)
}

/// tiny-skia pixmaps are premultiplied; egui and the PNG encoder want
/// straight alpha.
pub fn premul_to_straight(pixmap: &resvg::tiny_skia::Pixmap) -> Vec<u8> {
    pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let a = p.alpha();
            if a == 0 {
                [0, 0, 0, 0]
            } else {
                let r = (p.red() as u16 * 255 / a as u16) as u8;
                let g = (p.green() as u16 * 255 / a as u16) as u8;
                let b = (p.blue() as u16 * 255 / a as u16) as u8;
                [r, g, b, a]
            }
        })
        .collect()
}

/// Get the app data directory path
pub fn get_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Timestamped export filename, so repeated exports never collide.
pub fn export_filename() -> String {
    format!(
        "twitter-quote-{}.png",
        chrono::Local::now().format("%Y%m%d-%H%M%S")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn icon_rasterizes_at_requested_size() {
        let (pixels, w, h) = rasterize_icon(48);
        assert_eq!((w, h), (48, 48));
        assert_eq!(pixels.len(), 48 * 48 * 4);
    }

    #[test]
    fn export_filename_is_timestamped_png() {
        let name = export_filename();
        assert!(name.starts_with("twitter-quote-"));
        assert!(name.ends_with(".png"));
        assert!(name.len() > "twitter-quote-.png".len());
    }
}

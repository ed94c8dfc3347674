//! Card state and the snapshot-to-PNG capture pipeline
//!
//! The card is laid out as an SVG document in a fixed 600x600 design space
//! and rasterized with resvg at whatever resolution the capture options
//! dictate. The preview and the export both go through [`capture`], so the
//! preview is faithful to the exported file by construction.

use base64::prelude::*;
use image::{GenericImageView, RgbaImage};
use serde::{Deserialize, Serialize};
use simple_xml_builder::XMLElement;
use std::sync::Arc;

/// Edge length of the SVG design space. Raster output is scaled from this.
pub const CARD_BASE: f32 = 600.0;

// Layout constants, all in design-space units
const PAD_X: f32 = 64.0;
const AVATAR_DIAMETER: f32 = 96.0;
const AVATAR_TEXT_GAP: f32 = 20.0;
const NAME_SIZE: f32 = 28.0;
const HANDLE_SIZE: f32 = 22.0;
const QUOTE_SIZE: f32 = 30.0;
const QUOTE_LINE_HEIGHT: f32 = 42.0;
const QUOTE_GAP: f32 = 36.0;
const GLYPH_SIZE: f32 = 44.0;

// Card palette (mirrors the preview theme)
const CARD_BG: &str = "#15202b";
const TEXT_PRIMARY: &str = "#ffffff";
const TEXT_MUTED: &str = "#8b98a5";
const AVATAR_BG: &str = "#ffffff";
const GLYPH_COLOR: &str = "#15202b";

/// An uploaded raster image, kept as its original encoded bytes so it can be
/// embedded into the card SVG as a data URL.
#[derive(Clone)]
pub struct UploadedImage {
    pub bytes: Arc<Vec<u8>>,
    pub width: u32,
    pub height: u32,
    pub mime: &'static str,
}

impl UploadedImage {
    /// Decode and wrap an encoded image file. Fails on anything the `image`
    /// crate cannot parse.
    pub fn from_encoded(bytes: Vec<u8>) -> Result<Self, String> {
        let format = image::guess_format(&bytes).map_err(|e| e.to_string())?;
        let img = image::load_from_memory_with_format(&bytes, format).map_err(|e| e.to_string())?;
        let (width, height) = img.dimensions();
        Ok(Self {
            width,
            height,
            mime: format.to_mime_type(),
            bytes: Arc::new(bytes),
        })
    }

    /// Embeddable `data:` URL for SVG `<image>` elements.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, BASE64_STANDARD.encode(self.bytes.as_slice()))
    }
}

/// Everything the card renders from. One instance per app, never persisted.
#[derive(Clone)]
pub struct CardState {
    pub name: String,
    pub handle: String,
    pub quote: String,
    pub profile_image: Option<UploadedImage>,
    pub background_image: Option<UploadedImage>,
    /// Bumped on every edit; the preview re-renders when it moves.
    pub revision: u64,
}

impl Default for CardState {
    fn default() -> Self {
        Self {
            name: "Andrew".to_string(),
            handle: "andrewImXXXI".to_string(),
            quote: "yung back hug na pinapangarap ko,\nback pain na ngayon".to_string(),
            profile_image: None,
            background_image: None,
            revision: 0,
        }
    }
}

impl CardState {
    pub fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    /// Fallback avatar glyph: first character of the display name.
    pub fn fallback_glyph(&self) -> Option<char> {
        self.name.chars().next()
    }
}

/// How the output resolution is pinned.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum CaptureMode {
    /// Rasterize at `target * scale`, then resize down onto an exact
    /// `target`-sized output. Default.
    OversampleRedraw,
    /// Rasterize directly at the target resolution.
    Exact,
    /// Rasterize at `CARD_BASE * scale`; output size follows the scale.
    ScaleOnly,
}

/// Knobs for the capture routine. Persisted with the app settings.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureOptions {
    pub mode: CaptureMode,
    /// Edge length of the square output, for the target-pinned modes.
    pub target: u32,
    /// Oversampling factor (OversampleRedraw) or output multiplier (ScaleOnly).
    pub scale: f32,
    pub transparent_background: bool,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            mode: CaptureMode::OversampleRedraw,
            target: 1500,
            scale: 2.0,
            transparent_background: false,
        }
    }
}

impl CaptureOptions {
    /// Resolution the SVG is rasterized at before any redraw step.
    pub fn raster_px(&self) -> u32 {
        match self.mode {
            CaptureMode::OversampleRedraw => (self.target as f32 * self.scale).round() as u32,
            CaptureMode::Exact => self.target,
            CaptureMode::ScaleOnly => (CARD_BASE * self.scale).round() as u32,
        }
    }

    /// Edge length of the final output image.
    pub fn output_px(&self) -> u32 {
        match self.mode {
            CaptureMode::OversampleRedraw | CaptureMode::Exact => self.target,
            CaptureMode::ScaleOnly => self.raster_px(),
        }
    }
}

/// Build the card SVG from a state snapshot.
pub fn card_svg(card: &CardState, transparent_background: bool) -> XMLElement {
    let mut root = XMLElement::new("svg");
    root.add_attribute("xmlns", "http://www.w3.org/2000/svg");
    root.add_attribute("width", CARD_BASE);
    root.add_attribute("height", CARD_BASE);
    root.add_attribute("viewBox", format!("0 0 {} {}", CARD_BASE, CARD_BASE));

    let avatar_r = AVATAR_DIAMETER / 2.0;
    let mut defs = XMLElement::new("defs");
    let mut clip = XMLElement::new("clipPath");
    clip.add_attribute("id", "avatar-clip");
    let lines: Vec<&str> = card.quote.split('\n').collect();

    // Vertically center the avatar row plus the quote block
    let content_h = AVATAR_DIAMETER + QUOTE_GAP + lines.len() as f32 * QUOTE_LINE_HEIGHT;
    let top = (CARD_BASE - content_h) / 2.0;
    let avatar_cx = PAD_X + avatar_r;
    let avatar_cy = top + avatar_r;

    let mut clip_circle = XMLElement::new("circle");
    clip_circle.add_attribute("cx", avatar_cx);
    clip_circle.add_attribute("cy", avatar_cy);
    clip_circle.add_attribute("r", avatar_r);
    clip.add_child(clip_circle);
    defs.add_child(clip);
    root.add_child(defs);

    if !transparent_background {
        let mut bg = XMLElement::new("rect");
        bg.add_attribute("width", CARD_BASE);
        bg.add_attribute("height", CARD_BASE);
        bg.add_attribute("fill", CARD_BG);
        root.add_child(bg);
    }

    // Background image, cover-fit over the whole card
    if let Some(img) = &card.background_image {
        let mut image = XMLElement::new("image");
        image.add_attribute("x", 0);
        image.add_attribute("y", 0);
        image.add_attribute("width", CARD_BASE);
        image.add_attribute("height", CARD_BASE);
        image.add_attribute("preserveAspectRatio", "xMidYMid slice");
        image.add_attribute("href", img.data_url());
        root.add_child(image);
    }

    // Avatar: uploaded image clipped to a circle, or a flat circle with the
    // first character of the display name
    match &card.profile_image {
        Some(img) => {
            let mut image = XMLElement::new("image");
            image.add_attribute("x", avatar_cx - avatar_r);
            image.add_attribute("y", avatar_cy - avatar_r);
            image.add_attribute("width", AVATAR_DIAMETER);
            image.add_attribute("height", AVATAR_DIAMETER);
            image.add_attribute("preserveAspectRatio", "xMidYMid slice");
            image.add_attribute("clip-path", "url(#avatar-clip)");
            image.add_attribute("href", img.data_url());
            root.add_child(image);
        }
        None => {
            let mut circle = XMLElement::new("circle");
            circle.add_attribute("cx", avatar_cx);
            circle.add_attribute("cy", avatar_cy);
            circle.add_attribute("r", avatar_r);
            circle.add_attribute("fill", AVATAR_BG);
            root.add_child(circle);

            if let Some(glyph) = card.fallback_glyph() {
                let mut text = XMLElement::new("text");
                text.add_attribute("x", avatar_cx);
                // Baseline nudge to optically center the glyph in the circle
                text.add_attribute("y", avatar_cy + GLYPH_SIZE * 0.35);
                text.add_attribute("text-anchor", "middle");
                text.add_attribute("font-family", "sans-serif");
                text.add_attribute("font-size", GLYPH_SIZE);
                text.add_attribute("fill", GLYPH_COLOR);
                text.add_text(glyph);
                root.add_child(text);
            }
        }
    }

    let name_x = avatar_cx + avatar_r + AVATAR_TEXT_GAP;
    let mut name = XMLElement::new("text");
    name.add_attribute("x", name_x);
    name.add_attribute("y", avatar_cy - 6.0);
    name.add_attribute("font-family", "sans-serif");
    name.add_attribute("font-size", NAME_SIZE);
    name.add_attribute("font-weight", "bold");
    name.add_attribute("fill", TEXT_PRIMARY);
    name.add_text(&card.name);
    root.add_child(name);

    let mut handle = XMLElement::new("text");
    handle.add_attribute("x", name_x);
    handle.add_attribute("y", avatar_cy + HANDLE_SIZE + 2.0);
    handle.add_attribute("font-family", "sans-serif");
    handle.add_attribute("font-size", HANDLE_SIZE);
    handle.add_attribute("fill", TEXT_MUTED);
    handle.add_text(format!("@{}", card.handle));
    root.add_child(handle);

    let mut dots = XMLElement::new("text");
    dots.add_attribute("x", CARD_BASE - PAD_X);
    dots.add_attribute("y", avatar_cy);
    dots.add_attribute("text-anchor", "end");
    dots.add_attribute("font-family", "sans-serif");
    dots.add_attribute("font-size", HANDLE_SIZE);
    dots.add_attribute("fill", TEXT_MUTED);
    dots.add_text("\u{2022}\u{2022}\u{2022}");
    root.add_child(dots);

    // Quote body, one <text> per input line so line breaks survive
    let quote_top = top + AVATAR_DIAMETER + QUOTE_GAP;
    for (i, line) in lines.iter().enumerate() {
        let mut text = XMLElement::new("text");
        text.add_attribute("x", PAD_X);
        text.add_attribute("y", quote_top + (i as f32 + 0.75) * QUOTE_LINE_HEIGHT);
        text.add_attribute("font-family", "sans-serif");
        text.add_attribute("font-size", QUOTE_SIZE);
        text.add_attribute("fill", TEXT_PRIMARY);
        if !line.is_empty() {
            text.add_text(line);
        }
        root.add_child(text);
    }

    root
}

/// Rasterize a card snapshot into a square RGBA bitmap per the capture
/// options. This is the single capture routine behind both the preview and
/// the export.
pub fn capture(
    card: &CardState,
    opts: &CaptureOptions,
    fontdb: &Arc<resvg::usvg::fontdb::Database>,
) -> Result<RgbaImage, String> {
    let raster_px = opts.raster_px();
    if raster_px == 0 || opts.output_px() == 0 {
        return Err("capture resolution is zero".to_string());
    }

    let svg = card_svg(card, opts.transparent_background).to_string();

    let mut usvg_opts = resvg::usvg::Options::default();
    usvg_opts.fontdb = fontdb.clone();
    let tree = resvg::usvg::Tree::from_str(&svg, &usvg_opts)
        .map_err(|e| format!("card SVG rejected: {e}"))?;

    let mut pixmap = resvg::tiny_skia::Pixmap::new(raster_px, raster_px)
        .ok_or_else(|| "could not allocate capture pixmap".to_string())?;
    let scale = raster_px as f32 / CARD_BASE;
    resvg::render(
        &tree,
        resvg::usvg::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );

    let rgba = crate::utils::premul_to_straight(&pixmap);
    let img = RgbaImage::from_raw(raster_px, raster_px, rgba)
        .ok_or_else(|| "capture buffer size mismatch".to_string())?;

    // The oversampled variant redraws onto an exact target-sized output
    if opts.mode == CaptureMode::OversampleRedraw && raster_px != opts.target {
        return Ok(image::imageops::resize(
            &img,
            opts.target,
            opts.target,
            image::imageops::FilterType::Lanczos3,
        ));
    }
    Ok(img)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_fontdb() -> Arc<resvg::usvg::fontdb::Database> {
        let mut db = resvg::usvg::fontdb::Database::new();
        db.load_system_fonts();
        Arc::new(db)
    }

    fn tiny_png() -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(4, 4, image::Rgba([255, 0, 0, 255]));
        let mut bytes = Vec::new();
        img.write_to(
            &mut std::io::Cursor::new(&mut bytes),
            image::ImageFormat::Png,
        )
        .unwrap();
        bytes
    }

    #[test]
    fn fallback_glyph_is_first_char_of_name() {
        let mut card = CardState::default();
        card.name = "Jane".to_string();
        let svg = card_svg(&card, false).to_string();
        assert!(svg.contains(">J</text>"));

        card.name = "Xavier".to_string();
        let svg = card_svg(&card, false).to_string();
        assert!(svg.contains(">X</text>"));
        assert!(!svg.contains(">J</text>"));
    }

    #[test]
    fn no_glyph_for_empty_name() {
        let mut card = CardState::default();
        card.name = String::new();
        assert_eq!(card.fallback_glyph(), None);
        // The white avatar circle is still drawn
        let svg = card_svg(&card, false).to_string();
        assert!(svg.contains("fill=\"#ffffff\""));
    }

    #[test]
    fn uploaded_profile_image_replaces_glyph() {
        let mut card = CardState::default();
        card.profile_image = Some(UploadedImage::from_encoded(tiny_png()).unwrap());
        let svg = card_svg(&card, false).to_string();
        assert!(svg.contains("data:image/png;base64,"));
        assert!(svg.contains("clip-path=\"url(#avatar-clip)\""));
        assert!(!svg.contains(">A</text>"));
    }

    #[test]
    fn quote_line_breaks_become_separate_text_elements() {
        let mut card = CardState::default();
        card.quote = "line one\nline two".to_string();
        let svg = card_svg(&card, false).to_string();
        assert!(svg.contains(">line one</text>"));
        assert!(svg.contains(">line two</text>"));

        card.quote = "just one".to_string();
        let single = card_svg(&card, false).to_string();
        card.quote = "just one\nand two".to_string();
        let double = card_svg(&card, false).to_string();
        assert!(double.matches("<text").count() > single.matches("<text").count());
    }

    #[test]
    fn transparent_background_omits_card_rect() {
        let card = CardState::default();
        let opaque = card_svg(&card, false).to_string();
        let transparent = card_svg(&card, true).to_string();
        assert!(opaque.contains(CARD_BG));
        assert!(!transparent.contains("<rect"));
    }

    #[test]
    fn malformed_upload_is_rejected() {
        assert!(UploadedImage::from_encoded(vec![0, 1, 2, 3]).is_err());
        assert!(UploadedImage::from_encoded(Vec::new()).is_err());
    }

    #[test]
    fn uploaded_image_reports_pixel_size() {
        let img = UploadedImage::from_encoded(tiny_png()).unwrap();
        assert_eq!((img.width, img.height), (4, 4));
        assert_eq!(img.mime, "image/png");
        assert!(img.data_url().starts_with("data:image/png;base64,"));
    }

    #[test]
    fn oversample_redraw_pins_exact_output_size() {
        let card = CardState::default();
        let opts = CaptureOptions {
            mode: CaptureMode::OversampleRedraw,
            target: 1500,
            scale: 2.0,
            transparent_background: false,
        };
        assert_eq!(opts.raster_px(), 3000);
        let img = capture(&card, &opts, &test_fontdb()).unwrap();
        assert_eq!((img.width(), img.height()), (1500, 1500));
    }

    #[test]
    fn exact_mode_rasters_at_target() {
        let card = CardState::default();
        let opts = CaptureOptions {
            mode: CaptureMode::Exact,
            target: 512,
            scale: 1.0,
            transparent_background: false,
        };
        let img = capture(&card, &opts, &test_fontdb()).unwrap();
        assert_eq!((img.width(), img.height()), (512, 512));
        // Opaque card background
        assert_eq!(img.get_pixel(0, 0).0[3], 255);
    }

    #[test]
    fn scale_only_mode_derives_size_and_keeps_transparency() {
        let card = CardState::default();
        let opts = CaptureOptions {
            mode: CaptureMode::ScaleOnly,
            target: 1500,
            scale: 1.5,
            transparent_background: true,
        };
        let img = capture(&card, &opts, &test_fontdb()).unwrap();
        assert_eq!((img.width(), img.height()), (900, 900));
        // Corner is outside every card element, so it stays transparent
        assert_eq!(img.get_pixel(0, 0).0[3], 0);
    }

    #[test]
    fn zero_sized_capture_is_an_error() {
        let card = CardState::default();
        let opts = CaptureOptions {
            mode: CaptureMode::Exact,
            target: 0,
            scale: 1.0,
            transparent_background: false,
        };
        assert!(capture(&card, &opts, &test_fontdb()).is_err());
    }

    #[test]
    fn background_image_covers_card() {
        let mut card = CardState::default();
        card.background_image = Some(UploadedImage::from_encoded(tiny_png()).unwrap());
        let opts = CaptureOptions {
            mode: CaptureMode::Exact,
            target: 64,
            scale: 1.0,
            transparent_background: false,
        };
        let img = capture(&card, &opts, &test_fontdb()).unwrap();
        // Red 4x4 upload stretched over the whole card
        let px = img.get_pixel(1, 1).0;
        assert_eq!((px[0], px[3]), (255, 255));
    }

    #[test]
    fn end_to_end_defaults_scenario() {
        let mut card = CardState::default();
        card.name = "Jane".to_string();
        card.handle = "jane123".to_string();
        card.quote = "Hello\nWorld".to_string();
        card.profile_image = None;
        card.background_image = None;

        let svg = card_svg(&card, false).to_string();
        assert!(svg.contains(">Jane</text>"));
        assert!(svg.contains(">@jane123</text>"));
        assert!(svg.contains(">Hello</text>"));
        assert!(svg.contains(">World</text>"));
        assert!(svg.contains(">J</text>"));

        let img = capture(&card, &CaptureOptions::default(), &test_fontdb()).unwrap();
        assert_eq!((img.width(), img.height()), (1500, 1500));
    }
}

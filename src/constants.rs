//! Application constants and configuration

pub const APP_NAME: &str = "Quote Card Studio";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Resolution the preview texture is rendered at. The widget scales it to
/// fit, so this only bounds sharpness, not layout.
pub const PREVIEW_PX: u32 = 600;

/// How long an export waits for in-flight image decodes before capturing
/// without them.
pub const DECODE_JOIN_TIMEOUT_SECS: u64 = 5;

pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp"];

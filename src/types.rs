//! Common types and data structures

use std::path::PathBuf;

/// Lifecycle of the one-shot export operation. There is no cancellation
/// path; a capture runs to success or failure and returns to idle.
#[derive(Clone, PartialEq)]
pub enum ExportStatus {
    Idle,
    Capturing,
    Succeeded(PathBuf),
    Failed(String),
}

/// Which upload slot a picked file lands in
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum ImageSlot {
    Profile,
    Background,
}

impl ImageSlot {
    pub fn label(&self) -> &'static str {
        match self {
            ImageSlot::Profile => "profile image",
            ImageSlot::Background => "background image",
        }
    }
}

//! User settings stored as settings.json in the app data directory

use crate::card::CaptureOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Window geometry
    pub window_x: Option<f32>,
    pub window_y: Option<f32>,
    pub window_w: Option<f32>,
    pub window_h: Option<f32>,

    // Export
    pub export_path: Option<String>,
    pub capture: CaptureOptions,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            window_x: None,
            window_y: None,
            window_w: None,
            window_h: None,
            export_path: None,
            capture: CaptureOptions::default(),
        }
    }
}

impl Settings {
    pub fn load(data_dir: &Path) -> Self {
        let path = data_dir.join("settings.json");
        match std::fs::read_to_string(&path) {
            Ok(s) => match serde_json::from_str(&s) {
                Ok(settings) => {
                    debug!(path = %path.display(), "Settings loaded");
                    settings
                }
                Err(e) => {
                    warn!(error = %e, "Failed to parse settings, using defaults");
                    Self::default()
                }
            },
            Err(_) => {
                debug!("No settings file found, using defaults");
                Self::default()
            }
        }
    }

    pub fn save(&self, data_dir: &Path) {
        let path = data_dir.join("settings.json");
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&path, json) {
                    warn!(error = %e, "Failed to save settings");
                }
            }
            Err(e) => warn!(error = %e, "Failed to serialize settings"),
        }
    }

    pub fn export_path_or_default(&self) -> PathBuf {
        self.export_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                dirs::picture_dir()
                    .or_else(dirs::download_dir)
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join("Quote Card Studio")
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::CaptureMode;

    #[test]
    fn settings_round_trip() {
        let mut settings = Settings::default();
        settings.window_w = Some(900.0);
        settings.export_path = Some("/tmp/cards".to_string());
        settings.capture.mode = CaptureMode::ScaleOnly;
        settings.capture.scale = 1.5;
        settings.capture.transparent_background = true;

        let dir = std::env::temp_dir().join("quote-card-studio-settings-test");
        std::fs::create_dir_all(&dir).unwrap();
        settings.save(&dir);
        let loaded = Settings::load(&dir);

        assert_eq!(loaded.window_w, Some(900.0));
        assert_eq!(loaded.export_path.as_deref(), Some("/tmp/cards"));
        assert_eq!(loaded.capture.mode, CaptureMode::ScaleOnly);
        assert!(loaded.capture.transparent_background);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn garbage_settings_fall_back_to_defaults() {
        let dir = std::env::temp_dir().join("quote-card-studio-settings-bad");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("settings.json"), "{not json").unwrap();
        let loaded = Settings::load(&dir);
        assert_eq!(loaded.capture.target, 1500);
        std::fs::remove_dir_all(&dir).ok();
    }
}

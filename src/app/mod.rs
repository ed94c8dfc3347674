//! App module - contains the main application state and logic

mod export;
mod images;
mod modals;
mod preview;

use crate::card::{CaptureOptions, CardState};
use crate::settings::Settings;
use crate::theme;
use crate::types::ExportStatus;
use eframe::egui;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

// ============================================================================
// APP STATE
// ============================================================================

pub struct App {
    /// Card fields, shared with decode and export tasks
    pub(crate) card: Arc<Mutex<CardState>>,
    pub(crate) export_status: Arc<Mutex<ExportStatus>>,
    /// In-flight upload decodes; exports join on these before capturing
    pub(crate) pending_decodes: Arc<Mutex<Vec<tokio::task::JoinHandle<()>>>>,
    pub(crate) runtime: tokio::runtime::Runtime,
    /// System font database, loaded once and shared with every capture
    pub(crate) fontdb: Arc<resvg::usvg::fontdb::Database>,
    // Export configuration
    pub(crate) capture_options: CaptureOptions,
    pub(crate) export_path: PathBuf,
    pub(crate) export_path_str: String,
    // Preview
    pub(crate) preview_texture: Option<egui::TextureHandle>,
    pub(crate) preview_revision: Option<u64>,
    // Modals & notifications
    pub(crate) export_error: Option<String>,
    pub(crate) show_capture_options: bool,
    pub(crate) toast_message: Option<String>,
    pub(crate) toast_start: Option<std::time::Instant>,
    pub(crate) central_panel_rect: Option<egui::Rect>,
    pub(crate) last_export: Option<PathBuf>,
    // Window bookkeeping
    pub(crate) window_pos: Option<egui::Pos2>,
    pub(crate) window_size: Option<egui::Vec2>,
    pub(crate) needs_center: bool,
    pub(crate) data_dir: PathBuf,
}

// ============================================================================
// APP INITIALIZATION & HELPERS
// ============================================================================

impl App {
    pub fn new(cc: &eframe::CreationContext<'_>, settings: Settings, data_dir: PathBuf) -> Self {
        cc.egui_ctx.set_theme(egui::Theme::Dark);

        // Add Phosphor icons font
        let mut fonts = egui::FontDefinitions::default();
        egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
        cc.egui_ctx.set_fonts(fonts);

        theme::apply_visuals(&cc.egui_ctx);

        let export_path = settings.export_path_or_default();

        let mut fontdb = resvg::usvg::fontdb::Database::new();
        fontdb.load_system_fonts();

        Self {
            card: Arc::new(Mutex::new(CardState::default())),
            export_status: Arc::new(Mutex::new(ExportStatus::Idle)),
            pending_decodes: Arc::new(Mutex::new(Vec::new())),
            runtime: tokio::runtime::Runtime::new().unwrap(),
            fontdb: Arc::new(fontdb),
            capture_options: settings.capture,
            export_path: export_path.clone(),
            export_path_str: export_path.to_string_lossy().to_string(),
            preview_texture: None,
            preview_revision: None,
            export_error: None,
            show_capture_options: false,
            toast_message: None,
            toast_start: None,
            central_panel_rect: None,
            last_export: None,
            window_pos: None,
            window_size: None,
            needs_center: false,
            data_dir,
        }
    }

    pub fn save_settings(&self) {
        let settings = Settings {
            window_x: self.window_pos.map(|p| p.x),
            window_y: self.window_pos.map(|p| p.y),
            window_w: self.window_size.map(|s| s.x),
            window_h: self.window_size.map(|s| s.y),
            export_path: Some(self.export_path_str.clone()),
            capture: self.capture_options,
        };
        settings.save(&self.data_dir);
    }
}

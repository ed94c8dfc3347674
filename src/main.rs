#![windows_subsystem = "windows"]
//! Quote Card Studio - Main entry point

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

mod app;
mod card;
mod constants;
mod settings;
mod theme;
mod types;
mod ui;
mod utils;

use app::App;
use constants::*;
use eframe::egui;
use tracing::info;
use types::ImageSlot;
use ui::components;
use utils::get_data_dir;

/// Initialize file logging. Returns a guard that must be held for the app lifetime.
fn init_logging(data_dir: &std::path::Path) -> tracing_appender::non_blocking::WorkerGuard {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let logs_dir = data_dir.join("logs");
    std::fs::create_dir_all(&logs_dir).ok();

    let file_appender = tracing_appender::rolling::daily(&logs_dir, "quote-card-studio.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,quote_card_studio=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    guard
}

fn main() -> eframe::Result<()> {
    let data_dir = get_data_dir();
    std::fs::create_dir_all(&data_dir).ok();

    // Initialize logging - guard must live for entire app lifetime
    let _log_guard = init_logging(&data_dir);

    info!(version = APP_VERSION, "Quote Card Studio starting");

    let settings = settings::Settings::load(&data_dir);
    let win_pos = match (settings.window_x, settings.window_y) {
        (Some(x), Some(y)) => Some(egui::pos2(x, y)),
        _ => None,
    };
    let win_size = match (settings.window_w, settings.window_h) {
        (Some(w), Some(h)) => Some(egui::vec2(w, h)),
        _ => None,
    };

    let mut viewport = egui::ViewportBuilder::default()
        .with_inner_size(win_size.unwrap_or(egui::vec2(1050.0, 720.0)))
        .with_min_inner_size([860.0, 600.0])
        .with_title(APP_NAME);

    // Window/taskbar icon, rasterized from the built-in SVG
    {
        let (rgba, w, h) = utils::rasterize_icon(64);
        let icon = egui::IconData { rgba, width: w, height: h };
        viewport = viewport.with_icon(std::sync::Arc::new(icon));
    }

    let needs_center = win_pos.is_none();

    if let Some(pos) = win_pos {
        viewport = viewport.with_position(pos);
    }

    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native(
        APP_NAME,
        options,
        Box::new(move |cc| {
            let mut app = App::new(cc, settings, data_dir);
            app.needs_center = needs_center;
            Ok(Box::new(app))
        }),
    )
}

// ============================================================================
// MAIN UPDATE LOOP & UI RENDERING
// ============================================================================

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Track window position/size for saving on exit
        ctx.input(|i| {
            if let Some(rect) = i.viewport().outer_rect {
                self.window_pos = Some(rect.min);
            }
            if let Some(rect) = i.viewport().inner_rect {
                self.window_size = Some(rect.size());
            }
        });

        // Center window on first launch
        if self.needs_center {
            self.needs_center = false;
            if let Some(cmd) = egui::ViewportCommand::center_on_screen(ctx) {
                ctx.send_viewport_cmd(cmd);
            }
        }

        // Pick up finished exports from the runtime
        self.poll_export();

        // Preview tracks every field edit
        self.refresh_preview(ctx);

        self.render_error_modal(ctx);
        self.render_capture_options_modal(ctx);

        // Left sidebar - the card form (must be added BEFORE CentralPanel)
        egui::SidePanel::left("form_panel")
            .exact_width(theme::SIDEBAR_WIDTH)
            .resizable(false)
            .show_separator_line(false)
            .frame(
                egui::Frame::new()
                    .fill(theme::BG_BASE)
                    .inner_margin(egui::Margin::same(16)),
            )
            .show(ctx, |ui| {
                self.render_form(ctx, ui);
            });

        // Central panel - the preview
        egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(theme::BG_BASE))
            .show(ctx, |ui| {
                self.central_panel_rect = Some(ui.max_rect());
                self.render_preview_panel(ui);
            });

        self.render_toast(ctx);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        info!("Shutting down, saving settings");
        self.save_settings();
    }
}

// ============================================================================
// PANELS
// ============================================================================

impl App {
    fn render_form(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        ui.add_space(4.0);
        ui.label(
            egui::RichText::new(APP_NAME)
                .size(theme::FONT_TITLE)
                .strong(),
        );
        ui.label(
            egui::RichText::new(format!("v{}", APP_VERSION))
                .size(theme::FONT_SMALL)
                .color(theme::TEXT_DIM),
        );
        ui.add_space(theme::SPACING_XL);

        // Text fields share one lock scope; touch() marks the preview dirty
        {
            let card = self.card.clone();
            let mut card = card.lock().unwrap();

            components::section_label(ui, "NAME");
            if components::text_field(ui, &mut card.name).changed() {
                card.touch();
            }
            ui.add_space(theme::SPACING_MD);

            components::section_label(ui, "USERNAME");
            if components::prefixed_field(ui, "@", &mut card.handle).changed() {
                card.touch();
            }
            ui.add_space(theme::SPACING_MD);

            components::section_label(ui, "QUOTE TEXT");
            if components::multiline_field(ui, &mut card.quote, 4).changed() {
                card.touch();
            }
        }
        ui.add_space(theme::SPACING_LG);

        let (profile_info, background_info) = {
            let card = self.card.lock().unwrap();
            (
                card.profile_image
                    .as_ref()
                    .map(|i| format!("{}\u{00d7}{}", i.width, i.height)),
                card.background_image
                    .as_ref()
                    .map(|i| format!("{}\u{00d7}{}", i.width, i.height)),
            )
        };

        self.render_upload_row(
            ctx,
            ui,
            ImageSlot::Profile,
            egui_phosphor::regular::CAMERA,
            "Upload Profile",
            profile_info,
        );
        ui.add_space(theme::SPACING_SM);
        self.render_upload_row(
            ctx,
            ui,
            ImageSlot::Background,
            egui_phosphor::regular::IMAGE,
            "Upload Background",
            background_info,
        );

        ui.add_space(theme::SPACING_XL);
        ui.separator();
        ui.add_space(theme::SPACING_LG);

        components::section_label(ui, "EXPORT FOLDER");
        let path_changed = ui
            .horizontal(|ui| {
                let text_width = ui.available_width() - 36.0;
                let te = egui::Frame::new()
                    .fill(theme::BG_INPUT)
                    .stroke(egui::Stroke::new(
                        theme::STROKE_DEFAULT,
                        theme::BORDER_SUBTLE,
                    ))
                    .corner_radius(theme::RADIUS_DEFAULT)
                    .inner_margin(egui::Margin::symmetric(6, 4))
                    .show(ui, |ui| {
                        ui.add(
                            egui::TextEdit::singleline(&mut self.export_path_str)
                                .frame(false)
                                .desired_width(text_width)
                                .font(egui::FontId::proportional(theme::FONT_LABEL)),
                        )
                    })
                    .inner;
                let browse = components::icon_button(ui, egui_phosphor::regular::FOLDER_OPEN);
                if browse.clicked() || te.double_clicked() {
                    std::fs::create_dir_all(&self.export_path).ok();
                    if let Some(path) = rfd::FileDialog::new()
                        .set_directory(&self.export_path)
                        .pick_folder()
                    {
                        self.export_path = path;
                        self.export_path_str = self.export_path.to_string_lossy().to_string();
                        self.save_settings();
                    }
                }
                te.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter))
            })
            .inner;
        if path_changed {
            self.export_path = std::path::PathBuf::from(&self.export_path_str);
            self.save_settings();
        }

        ui.add_space(theme::SPACING_LG);

        let capturing = self.is_capturing();
        ui.horizontal(|ui| {
            let label = format!("{}  Export PNG", egui_phosphor::regular::DOWNLOAD_SIMPLE);
            let export_btn = ui.add_enabled(
                !capturing,
                theme::button_accent(label).min_size(egui::vec2(140.0, theme::BUTTON_HEIGHT)),
            );
            if export_btn.clicked() {
                self.start_export(ctx);
            }
            if capturing {
                ui.spinner();
                ui.label(egui::RichText::new("Generating...").color(theme::TEXT_MUTED));
            } else {
                if components::icon_button(ui, egui_phosphor::regular::GEAR).clicked() {
                    self.show_capture_options = true;
                }
                if self.last_export.is_some()
                    && components::icon_button(ui, egui_phosphor::regular::FOLDER).clicked()
                {
                    open::that(&self.export_path).ok();
                }
            }
        });
    }

    fn render_upload_row(
        &mut self,
        ctx: &egui::Context,
        ui: &mut egui::Ui,
        slot: ImageSlot,
        icon: &str,
        label: &str,
        info: Option<String>,
    ) {
        ui.horizontal(|ui| {
            let btn = ui.add(
                theme::button(format!("{}  {}", icon, label))
                    .min_size(egui::vec2(170.0, theme::BUTTON_HEIGHT)),
            );
            if btn.clicked() {
                self.pick_image(ctx, slot);
            }
            if let Some(info) = info {
                ui.label(
                    egui::RichText::new(info)
                        .size(theme::FONT_SMALL)
                        .color(theme::TEXT_MUTED),
                );
                if components::icon_button(ui, egui_phosphor::regular::X).clicked() {
                    self.clear_image(slot);
                }
            }
        });
    }

    fn render_preview_panel(&mut self, ui: &mut egui::Ui) {
        let avail = ui.available_size();
        let side = (avail.x.min(avail.y) - 2.0 * theme::SPACING_XL).max(100.0);
        let offset = egui::vec2((avail.x - side) / 2.0, (avail.y - side) / 2.0);
        let rect = egui::Rect::from_min_size(ui.min_rect().min + offset, egui::vec2(side, side));

        if let Some(texture) = &self.preview_texture {
            ui.painter().image(
                texture.id(),
                rect,
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                egui::Color32::WHITE,
            );
            ui.painter().rect_stroke(
                rect,
                0.0,
                egui::Stroke::new(theme::STROKE_DEFAULT, theme::BORDER_SUBTLE),
                egui::StrokeKind::Outside,
            );
        } else {
            ui.painter().rect_filled(rect, 0.0, theme::BG_ELEVATED);
        }
    }
}

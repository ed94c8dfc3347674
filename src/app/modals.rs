//! Modal dialogs and the export toast

use super::App;
use crate::card::CaptureMode;
use crate::theme;
use eframe::egui;

impl App {
    /// Blocking error dialog for a failed export. One alert per failure.
    pub fn render_error_modal(&mut self, ctx: &egui::Context) {
        let Some(message) = self.export_error.clone() else {
            return;
        };

        let modal = egui::Modal::new(egui::Id::new("export_error_modal"))
            .backdrop_color(egui::Color32::from_black_alpha(180))
            .frame(theme::modal_frame());
        let modal_response = modal.show(ctx, |ui| {
            ui.set_min_width(340.0);
            ui.set_max_width(340.0);
            ui.vertical_centered(|ui| {
                ui.add_space(8.0);
                ui.label(
                    egui::RichText::new(egui_phosphor::regular::WARNING)
                        .size(36.0)
                        .color(theme::STATUS_ERROR),
                );
                ui.add_space(8.0);
                ui.label(
                    egui::RichText::new("Failed to generate image")
                        .size(16.0)
                        .strong(),
                );
                ui.add_space(4.0);
                ui.label(egui::RichText::new(&message).color(theme::TEXT_MUTED));
                ui.add_space(16.0);
                let ok_btn = ui.add(theme::button_accent(format!(
                    "{}  OK",
                    egui_phosphor::regular::CHECK
                )));
                if ok_btn.clicked() {
                    self.export_error = None;
                }
            });
        });
        if modal_response.should_close() {
            self.export_error = None;
        }
    }

    /// Capture options: resolution mode, scale, target size, transparency.
    pub fn render_capture_options_modal(&mut self, ctx: &egui::Context) {
        if !self.show_capture_options {
            return;
        }

        let mut changed = false;
        let modal = egui::Modal::new(egui::Id::new("capture_options_modal"))
            .backdrop_color(egui::Color32::from_black_alpha(180))
            .frame(theme::modal_frame());
        let modal_response = modal.show(ctx, |ui| {
            ui.set_min_width(320.0);
            ui.set_max_width(320.0);

            ui.label(egui::RichText::new("Capture Options").size(theme::FONT_TITLE).strong());
            ui.add_space(theme::SPACING_LG);

            ui.label(
                egui::RichText::new("RESOLUTION MODE")
                    .size(theme::FONT_SMALL)
                    .color(theme::TEXT_DIM),
            );
            ui.add_space(theme::SPACING_SM);
            let opts = &mut self.capture_options;
            changed |= ui
                .radio_value(
                    &mut opts.mode,
                    CaptureMode::OversampleRedraw,
                    "Oversample, redraw to exact size",
                )
                .changed();
            changed |= ui
                .radio_value(&mut opts.mode, CaptureMode::Exact, "Capture at exact size")
                .changed();
            changed |= ui
                .radio_value(
                    &mut opts.mode,
                    CaptureMode::ScaleOnly,
                    "Scale multiplier only",
                )
                .changed();

            ui.add_space(theme::SPACING_LG);
            ui.horizontal(|ui| {
                ui.label("Output size");
                let drag = egui::DragValue::new(&mut opts.target)
                    .range(256..=4096)
                    .suffix(" px");
                changed |= ui
                    .add_enabled(opts.mode != CaptureMode::ScaleOnly, drag)
                    .changed();
            });
            ui.horizontal(|ui| {
                ui.label("Scale factor");
                let drag = egui::DragValue::new(&mut opts.scale)
                    .range(1.0..=4.0)
                    .speed(0.1);
                changed |= ui
                    .add_enabled(opts.mode != CaptureMode::Exact, drag)
                    .changed();
            });
            changed |= ui
                .checkbox(&mut opts.transparent_background, "Transparent background")
                .changed();

            ui.add_space(theme::SPACING_XL);
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui
                    .add(theme::button(format!("{}  Close", egui_phosphor::regular::X)))
                    .clicked()
                {
                    self.show_capture_options = false;
                }
            });
        });
        if modal_response.should_close() {
            self.show_capture_options = false;
        }
        if changed {
            self.save_settings();
        }
    }

    /// Bottom-right toast after a successful export (3s visible then fade,
    /// pause on hover).
    pub fn render_toast(&mut self, ctx: &egui::Context) {
        let (Some(msg), Some(panel_rect)) = (self.toast_message.clone(), self.central_panel_rect)
        else {
            return;
        };

        let visible_duration = 3.0;
        let fade_duration = 0.5;
        let total_duration = visible_duration + fade_duration;
        let margin = 12.0;

        let toast_pos = egui::pos2(panel_rect.right() - margin, panel_rect.bottom() - margin);

        let response = egui::Area::new(egui::Id::new("export_toast"))
            .fixed_pos(toast_pos)
            .pivot(egui::Align2::RIGHT_BOTTOM)
            .show(ctx, |ui| {
                let elapsed = self
                    .toast_start
                    .map(|t| t.elapsed().as_secs_f32())
                    .unwrap_or(0.0);
                let alpha = if elapsed > visible_duration {
                    (total_duration - elapsed) / fade_duration
                } else {
                    1.0
                };

                egui::Frame::new()
                    .fill(egui::Color32::from_rgba_unmultiplied(
                        0x15,
                        0x1d,
                        0x26,
                        (230.0 * alpha) as u8,
                    ))
                    .stroke(egui::Stroke::new(
                        1.0,
                        egui::Color32::from_rgba_unmultiplied(
                            theme::STATUS_SUCCESS.r(),
                            theme::STATUS_SUCCESS.g(),
                            theme::STATUS_SUCCESS.b(),
                            (100.0 * alpha) as u8,
                        ),
                    ))
                    .corner_radius(6.0)
                    .inner_margin(egui::Margin::symmetric(16, 10))
                    .show(ui, |ui| {
                        let text = format!("{}  {}", egui_phosphor::regular::CHECK_CIRCLE, msg);
                        ui.label(egui::RichText::new(text).color(
                            egui::Color32::from_rgba_unmultiplied(
                                255,
                                255,
                                255,
                                (255.0 * alpha) as u8,
                            ),
                        ));
                    });
            });

        if response.response.hovered() {
            self.toast_start = Some(std::time::Instant::now());
        }

        let elapsed = self
            .toast_start
            .map(|t| t.elapsed().as_secs_f32())
            .unwrap_or(0.0);
        if elapsed >= total_duration {
            self.toast_message = None;
            self.toast_start = None;
        } else {
            ctx.request_repaint();
        }
    }
}

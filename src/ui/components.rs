//! Reusable UI components

use crate::theme;
use eframe::egui;

/// Small uppercase section label
pub fn section_label(ui: &mut egui::Ui, text: &str) {
    ui.label(
        egui::RichText::new(text)
            .size(theme::FONT_SMALL)
            .color(theme::TEXT_DIM),
    );
}

/// Framed single-line text input, full available width
pub fn text_field(ui: &mut egui::Ui, value: &mut String) -> egui::Response {
    framed_input(ui, |ui| {
        ui.add(
            egui::TextEdit::singleline(value)
                .frame(false)
                .desired_width(ui.available_width())
                .font(egui::FontId::proportional(theme::FONT_LABEL)),
        )
    })
}

/// Framed single-line input with a fixed prefix (the "@" of the handle)
pub fn prefixed_field(ui: &mut egui::Ui, prefix: &str, value: &mut String) -> egui::Response {
    framed_input(ui, |ui| {
        ui.label(
            egui::RichText::new(prefix)
                .size(theme::FONT_LABEL)
                .color(theme::TEXT_MUTED),
        );
        ui.add(
            egui::TextEdit::singleline(value)
                .frame(false)
                .desired_width(ui.available_width())
                .font(egui::FontId::proportional(theme::FONT_LABEL)),
        )
    })
}

/// Framed multi-line editor for the quote body
pub fn multiline_field(ui: &mut egui::Ui, value: &mut String, rows: usize) -> egui::Response {
    framed_input(ui, |ui| {
        ui.add(
            egui::TextEdit::multiline(value)
                .frame(false)
                .desired_width(ui.available_width())
                .desired_rows(rows)
                .font(egui::FontId::proportional(theme::FONT_LABEL)),
        )
    })
}

fn framed_input(
    ui: &mut egui::Ui,
    add_contents: impl FnOnce(&mut egui::Ui) -> egui::Response,
) -> egui::Response {
    egui::Frame::new()
        .fill(theme::BG_INPUT)
        .stroke(egui::Stroke::new(theme::STROKE_DEFAULT, theme::BORDER_SUBTLE))
        .corner_radius(theme::RADIUS_DEFAULT)
        .inner_margin(egui::Margin::symmetric(8, 6))
        .show(ui, |ui| {
            ui.horizontal(|ui| add_contents(ui)).inner
        })
        .inner
}

/// Icon button sized like an input row (browse, clear, gear)
pub fn icon_button(ui: &mut egui::Ui, icon: &str) -> egui::Response {
    let (rect, response) =
        ui.allocate_exact_size(egui::vec2(28.0, 28.0), egui::Sense::click());
    if response.hovered() {
        ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
        ui.painter()
            .rect_filled(rect, theme::RADIUS_DEFAULT, theme::BG_SURFACE);
    }
    ui.painter().text(
        rect.center(),
        egui::Align2::CENTER_CENTER,
        icon,
        egui::FontId::proportional(16.0),
        theme::TEXT_SECONDARY,
    );
    response
}

//! UI helper components

use eframe::egui;
use omnia_wallet_core::Notice;

use crate::state::ConnectionStatus;

const ACCENT: egui::Color32 = egui::Color32::from_rgb(0, 180, 150);
const DANGER: egui::Color32 = egui::Color32::from_rgb(220, 80, 80);

/// Styled heading with accent color
pub fn styled_heading(ui: &mut egui::Ui, text: &str) {
    ui.heading(egui::RichText::new(text).color(egui::Color32::from_rgb(0, 212, 170)));
}

/// Section header with separator
pub fn section_header(ui: &mut egui::Ui, text: &str) {
    ui.add_space(10.0);
    ui.horizontal(|ui| {
        ui.label(egui::RichText::new(text).strong().size(14.0));
    });
    ui.separator();
}

/// Coloured dot plus label for the connection state
pub fn status_badge(ui: &mut egui::Ui, status: &ConnectionStatus) {
    let color = match status {
        ConnectionStatus::Connected => egui::Color32::from_rgb(80, 200, 120),
        ConnectionStatus::Disconnected => egui::Color32::GRAY,
        _ => egui::Color32::from_rgb(220, 180, 50),
    };
    ui.horizontal(|ui| {
        ui.label(egui::RichText::new("●").color(color));
        ui.label(status.label());
        if status.is_busy() {
            ui.spinner();
        }
    });
}

/// Labeled field with copy button
pub fn labeled_field_with_copy(ui: &mut egui::Ui, label: &str, shown: &str, full: &str) {
    ui.horizontal(|ui| {
        ui.label(egui::RichText::new(format!("{}:", label)).strong());
        ui.label(egui::RichText::new(shown).monospace()).on_hover_text(full);
        if ui
            .small_button("📋")
            .on_hover_text("Copy to clipboard")
            .clicked()
        {
            copy_to_clipboard(full);
        }
    });
}

pub fn labeled_field(ui: &mut egui::Ui, label: &str, value: &str) {
    ui.horizontal(|ui| {
        ui.label(egui::RichText::new(format!("{}:", label)).strong());
        ui.label(egui::RichText::new(value).monospace());
    });
}

/// Copy to clipboard (platform-specific)
#[cfg(not(target_arch = "wasm32"))]
pub fn copy_to_clipboard(text: &str) {
    match arboard::Clipboard::new() {
        Ok(mut clipboard) => {
            if let Err(e) = clipboard.set_text(text) {
                tracing::warn!(error = %e, "clipboard write failed");
            }
        }
        Err(e) => tracing::warn!(error = %e, "clipboard unavailable"),
    }
}

#[cfg(target_arch = "wasm32")]
pub fn copy_to_clipboard(text: &str) {
    if let Some(window) = web_sys::window() {
        let navigator = window.navigator();
        let clipboard = navigator.clipboard();
        let _ = clipboard.write_text(text);
    }
}

pub fn error_message(ui: &mut egui::Ui, message: &str) {
    ui.horizontal(|ui| {
        ui.label(egui::RichText::new("❌").size(16.0));
        ui.label(egui::RichText::new(message).color(DANGER));
    });
}

pub fn success_message(ui: &mut egui::Ui, message: &str) {
    ui.horizontal(|ui| {
        ui.label(egui::RichText::new("✅").size(16.0));
        ui.label(egui::RichText::new(message).color(egui::Color32::from_rgb(80, 200, 120)));
    });
}

// =============================================================================
// STYLED BUTTONS
// =============================================================================

/// Primary button with enabled state
pub fn primary_button_enabled(ui: &mut egui::Ui, text: &str, enabled: bool) -> egui::Response {
    let btn = egui::Button::new(egui::RichText::new(text).size(14.0).color(egui::Color32::WHITE))
        .min_size(egui::vec2(150.0, 34.0))
        .fill(ACCENT);
    ui.add_enabled(enabled, btn)
}

/// Secondary action button - subdued, outline style
pub fn secondary_button(ui: &mut egui::Ui, text: &str) -> egui::Response {
    let btn = egui::Button::new(egui::RichText::new(text).size(14.0))
        .min_size(egui::vec2(90.0, 34.0));
    ui.add(btn)
}

// =============================================================================
// VISUAL GROUPING
// =============================================================================

/// Render content in a subtle card/frame
pub fn card(ui: &mut egui::Ui, add_contents: impl FnOnce(&mut egui::Ui)) {
    egui::Frame::none()
        .fill(ui.visuals().faint_bg_color)
        .rounding(6.0)
        .inner_margin(12.0)
        .show(ui, add_contents);
}

/// One toast; destructive notices get a red border.
pub fn notice_card(ui: &mut egui::Ui, notice: &Notice) {
    let stroke = if notice.is_destructive() {
        egui::Stroke::new(1.0, DANGER)
    } else {
        egui::Stroke::new(1.0, ACCENT)
    };
    egui::Frame::none()
        .fill(ui.visuals().extreme_bg_color)
        .stroke(stroke)
        .rounding(6.0)
        .inner_margin(10.0)
        .show(ui, |ui| {
            ui.set_max_width(300.0);
            ui.label(egui::RichText::new(&notice.title).strong());
            ui.label(&notice.description);
        });
}

//! egui panels. Panels read the observable store and emit `UserIntent`s;
//! none of them touch pipeline resources directly.

mod controls;
mod hud;
mod inspector;
mod search;

use bevy::diagnostic::FrameTimeDiagnosticsPlugin;
use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts, EguiPlugin};

use crate::interaction::{click_pick_system, hover_pick_system, keyboard_intents, UiCapture};
use crate::scene::ExplorerSet;

pub use controls::{controls_plugin, SPEED_PRESETS};
pub use hud::{format_sim_time, format_speed, hud_plugin};
pub use inspector::inspector_plugin;
pub use search::{search_plugin, SearchState};

pub(crate) const ACCENT: egui::Color32 = egui::Color32::from_rgb(100, 220, 180);
pub(crate) const MUTED: egui::Color32 = egui::Color32::from_rgb(120, 120, 140);

/// Egui itself plus the capture flags the 3D input systems consult.
pub fn ui_plugin(app: &mut App) {
    app.add_plugins(EguiPlugin)
        .add_plugins(FrameTimeDiagnosticsPlugin)
        .add_systems(
            Update,
            update_ui_capture
                .in_set(ExplorerSet::Input)
                .before(keyboard_intents)
                .before(click_pick_system)
                .before(hover_pick_system),
        );
}

fn update_ui_capture(mut contexts: EguiContexts, mut capture: ResMut<UiCapture>) {
    let Some(ctx) = contexts.try_ctx_mut() else {
        return;
    };
    let next = UiCapture {
        pointer: ctx.is_pointer_over_area() || ctx.wants_pointer_input(),
        keyboard: ctx.wants_keyboard_input(),
    };
    if *capture != next {
        *capture = next;
    }
}

pub(crate) fn panel_frame() -> egui::Frame {
    egui::Frame::default()
        .fill(egui::Color32::from_rgba_premultiplied(15, 15, 25, 215))
        .inner_margin(egui::Margin::same(12))
        .corner_radius(egui::CornerRadius::same(6))
}

pub(crate) fn apply_panel_style(ui: &mut egui::Ui) {
    ui.style_mut().override_text_style = Some(egui::TextStyle::Monospace);
    ui.visuals_mut().override_text_color = Some(egui::Color32::from_rgb(200, 220, 240));
}

pub(crate) fn hint(ui: &mut egui::Ui, text: &str) {
    ui.label(egui::RichText::new(text).size(11.0).color(MUTED));
}

//! Time controls: bottom bar with play/pause, reset and speed presets.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::interaction::UserIntent;
use crate::pipeline::ObservableStore;
use crate::scene::ExplorerSet;
use crate::ui::{apply_panel_style, format_speed, hint, ACCENT};

pub const SPEED_PRESETS: [f64; 7] = [-60.0, -1.0, 1.0, 10.0, 60.0, 300.0, 1000.0];

pub fn controls_plugin(app: &mut App) {
    app.add_systems(Update, controls_ui_system.after(ExplorerSet::Sync));
}

fn controls_ui_system(
    mut contexts: EguiContexts,
    store: Res<ObservableStore>,
    mut intents: EventWriter<UserIntent>,
) {
    let state = store.state();

    egui::TopBottomPanel::bottom("time_controls")
        .frame(
            egui::Frame::default()
                .fill(egui::Color32::from_rgba_premultiplied(15, 15, 25, 210))
                .inner_margin(egui::Margin::same(8)),
        )
        .show(contexts.ctx_mut(), |ui| {
            apply_panel_style(ui);

            ui.horizontal(|ui| {
                let label = if state.paused { "Play" } else { "Pause" };
                if ui.button(label).clicked() {
                    intents.send(UserIntent::TogglePause);
                }
                if ui.button("Reset").clicked() {
                    intents.send(UserIntent::Reset);
                }

                ui.separator();

                let mut speed = state.time_speed;
                egui::ComboBox::from_id_salt("speed")
                    .selected_text(format_speed(speed))
                    .width(70.0)
                    .show_ui(ui, |ui| {
                        for preset in SPEED_PRESETS {
                            ui.selectable_value(&mut speed, preset, format_speed(preset));
                        }
                    });
                if speed != state.time_speed {
                    intents.send(UserIntent::SetTimeSpeed(speed));
                }

                ui.separator();
                if ui.button("Reload catalog").clicked() {
                    intents.send(UserIntent::ReloadCatalog);
                }

                ui.separator();
                ui.label(
                    egui::RichText::new(format!("{} objects", state.catalog_size)).color(ACCENT),
                );
                hint(
                    ui,
                    "Space pause  Esc clear  C compare  V visit  E earth  F follow  O overview",
                );
            });
        });
}

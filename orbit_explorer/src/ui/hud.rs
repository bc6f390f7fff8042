//! HUD overlay: simulated time, speed, catalog size, FPS.

use bevy::diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};
use chrono::{DateTime, Utc};

use crate::pipeline::ObservableStore;
use crate::scene::ExplorerSet;
use crate::ui::{apply_panel_style, panel_frame, ACCENT};

pub fn hud_plugin(app: &mut App) {
    app.add_systems(Update, hud_overlay_system.after(ExplorerSet::Sync));
}

fn hud_overlay_system(
    mut contexts: EguiContexts,
    store: Res<ObservableStore>,
    diagnostics: Res<DiagnosticsStore>,
) {
    let fps = diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FPS)
        .and_then(|d| d.smoothed())
        .unwrap_or(0.0);
    let state = store.state();

    egui::Window::new("Orbit Explorer")
        .anchor(egui::Align2::LEFT_TOP, [10.0, 10.0])
        .resizable(false)
        .collapsible(false)
        .title_bar(false)
        .frame(panel_frame())
        .show(contexts.ctx_mut(), |ui| {
            apply_panel_style(ui);

            ui.label(
                egui::RichText::new(format_sim_time(state.sim_time))
                    .size(16.0)
                    .color(ACCENT),
            );
            let speed = format_speed(state.time_speed);
            if state.paused {
                ui.label(format!("Speed {speed} (paused)"));
            } else {
                ui.label(format!("Speed {speed}"));
            }
            ui.add_space(4.0);

            ui.separator();
            ui.label(format!("Objects  {}", state.catalog_size));
            if state.failed_objects > 0 {
                ui.label(
                    egui::RichText::new(format!("Skipped  {}", state.failed_objects))
                        .color(egui::Color32::from_rgb(200, 180, 100)),
                );
            }
            ui.label(format!("FPS  {fps:.0}"));
        });
}

pub fn format_sim_time(time: Option<DateTime<Utc>>) -> String {
    match time {
        Some(time) => time.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => "--".to_string(),
    }
}

/// `1x`, `60x`, `-0.5x`.
pub fn format_speed(speed: f64) -> String {
    if speed.fract() == 0.0 {
        format!("{speed:.0}x")
    } else {
        format!("{speed:.1}x")
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn sim_time_formatting() {
        let t = Utc.with_ymd_and_hms(2024, 3, 1, 12, 5, 9).unwrap();
        assert_eq!(format_sim_time(Some(t)), "2024-03-01 12:05:09 UTC");
        assert_eq!(format_sim_time(None), "--");
    }

    #[test]
    fn speed_formatting() {
        assert_eq!(format_speed(1.0), "1x");
        assert_eq!(format_speed(600.0), "600x");
        assert_eq!(format_speed(-0.5), "-0.5x");
    }
}

//! Object inspector: details of the selected object, its closest neighbour
//! and the compare toggle. Everything shown comes from the observable store,
//! so positions lag the scene by at most one sync interval.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::data::{ObjectId, TrackedObject};
use crate::interaction::{UserIntent, VisitTarget};
use crate::pipeline::{Catalog, ObservableStore, ObservedState};
use crate::scene::ExplorerSet;
use crate::ui::{apply_panel_style, hint, ACCENT};

pub fn inspector_plugin(app: &mut App) {
    app.add_systems(Update, inspector_panel_system.after(ExplorerSet::Sync));
}

/// Intent for the compare toggle given the published state.
pub(crate) fn compare_toggle(state: &ObservedState) -> Option<UserIntent> {
    if state.selection.comparison_mode {
        return Some(UserIntent::DisableCompare);
    }
    let selected = state.selection.selected?;
    state
        .closest
        .filter(|c| c.id != selected)
        .map(|_| UserIntent::EnableCompare)
}

fn inspector_panel_system(
    mut contexts: EguiContexts,
    store: Res<ObservableStore>,
    catalog: Res<Catalog>,
    mut intents: EventWriter<UserIntent>,
) {
    let state = store.state();
    let Some(selected) = state.selection.selected else {
        return;
    };
    let Some(object) = catalog.get(selected) else {
        return;
    };

    egui::SidePanel::right("inspector")
        .default_width(280.0)
        .frame(
            egui::Frame::default()
                .fill(egui::Color32::from_rgba_premultiplied(15, 15, 25, 220))
                .inner_margin(egui::Margin::same(14)),
        )
        .show(contexts.ctx_mut(), |ui| {
            apply_panel_style(ui);
            show_details(ui, object, state);
            ui.add_space(8.0);
            ui.separator();
            show_neighbour(ui, state, &catalog);
            ui.add_space(8.0);

            ui.horizontal(|ui| {
                if ui.button("Visit").clicked() {
                    intents.send(UserIntent::Visit(Some(VisitTarget::Object(selected))));
                }
                let following = state.selection.followed == Some(selected);
                if ui.button(if following { "Unfollow" } else { "Follow" }).clicked() {
                    intents.send(UserIntent::Follow((!following).then_some(selected)));
                }
                if let Some(toggle) = compare_toggle(state) {
                    let label = if toggle == UserIntent::DisableCompare {
                        "Stop comparing"
                    } else {
                        "Compare"
                    };
                    if ui.button(label).clicked() {
                        intents.send(toggle);
                    }
                }
            });
            ui.add_space(12.0);
            hint(ui, "Esc to dismiss");
        });
}

fn show_details(ui: &mut egui::Ui, object: &TrackedObject, state: &ObservedState) {
    ui.label(egui::RichText::new(&object.name).size(18.0).color(ACCENT));
    ui.label(
        egui::RichText::new(format!("NORAD {}", object.id))
            .size(12.0)
            .color(egui::Color32::from_rgb(140, 160, 180)),
    );
    ui.add_space(8.0);

    ui.label(format!("Type      {}", object.object_type().label()));
    if let Some(class) = &object.classification {
        if let Some(country) = &class.country {
            ui.label(format!("Country   {country}"));
        }
        if let Some(launch) = &class.launch_date {
            ui.label(format!("Launched  {launch}"));
        }
    }
    ui.add_space(4.0);

    match state.positions.get(&object.id) {
        Some(sample) => {
            ui.label(format!("Lat       {:.3}°", sample.geodetic.latitude_deg));
            ui.label(format!("Lon       {:.3}°", sample.geodetic.longitude_deg));
            ui.label(format!("Alt       {:.1} km", sample.geodetic.altitude_km));
            ui.label(format!("Speed     {:.2} km/s", sample.speed_km_s));
        }
        None => hint(ui, "position pending"),
    }
}

fn show_neighbour(ui: &mut egui::Ui, state: &ObservedState, catalog: &Catalog) {
    let name = |id: ObjectId| {
        catalog
            .get(id)
            .map_or_else(|| id.to_string(), |o| o.name.clone())
    };

    if let (Some(peer), Some(km)) = (
        state.selection.comparison_peer.filter(|_| state.selection.comparison_mode),
        state.selection.comparison_distance_km,
    ) {
        ui.label(egui::RichText::new("Comparing").color(ACCENT));
        ui.label(format!("{}  {km:.1} km", name(peer)));
        return;
    }

    match state.closest {
        Some(closest) => {
            ui.label("Closest object");
            ui.label(format!("{}  {:.1} km", name(closest.id), closest.distance_km));
        }
        None => hint(ui, "closest object pending"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::SelectionState;
    use crate::pipeline::Closest;

    fn state(selected: Option<u64>, closest: Option<u64>, comparing: bool) -> ObservedState {
        ObservedState {
            selection: SelectionState {
                selected: selected.map(ObjectId),
                comparison_mode: comparing,
                ..Default::default()
            },
            closest: closest.map(|id| Closest {
                id: ObjectId(id),
                distance: 1.0,
                distance_km: 637.1,
            }),
            ..Default::default()
        }
    }

    #[test]
    fn compare_toggle_needs_a_distinct_neighbour() {
        assert_eq!(compare_toggle(&state(None, Some(2), false)), None);
        assert_eq!(compare_toggle(&state(Some(1), None, false)), None);
        assert_eq!(compare_toggle(&state(Some(1), Some(1), false)), None);
        assert_eq!(
            compare_toggle(&state(Some(1), Some(2), false)),
            Some(UserIntent::EnableCompare)
        );
        assert_eq!(
            compare_toggle(&state(Some(1), Some(2), true)),
            Some(UserIntent::DisableCompare)
        );
    }
}

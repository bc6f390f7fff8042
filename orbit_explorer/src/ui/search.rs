//! Search panel: text and facet filter over the catalog with per-row actions.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::data::{CatalogFilter, ObjectId, ObjectType};
use crate::interaction::{SelectionState, UserIntent, VisitTarget};
use crate::pipeline::Catalog;
use crate::scene::ExplorerSet;
use crate::ui::{apply_panel_style, hint, panel_frame, ACCENT};

const MAX_RESULTS: usize = 50;
const OBJECT_TYPES: [ObjectType; 4] = [
    ObjectType::Payload,
    ObjectType::RocketBody,
    ObjectType::Debris,
    ObjectType::Unknown,
];

/// Country facet as typed; empty means no facet.
#[derive(Resource, Clone, Debug, Default)]
pub struct SearchState {
    pub country: String,
}

pub fn search_plugin(app: &mut App) {
    app.init_resource::<CatalogFilter>()
        .init_resource::<SearchState>()
        .add_systems(Update, search_panel_system.after(ExplorerSet::Sync));
}

/// Intents for one result row's buttons. Visit and follow also select.
pub fn row_intents(id: ObjectId, action: RowAction) -> Vec<UserIntent> {
    match action {
        RowAction::Select => vec![UserIntent::Select(Some(id))],
        RowAction::Visit => vec![
            UserIntent::Select(Some(id)),
            UserIntent::Visit(Some(VisitTarget::Object(id))),
        ],
        RowAction::Follow => vec![UserIntent::Select(Some(id)), UserIntent::Follow(Some(id))],
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RowAction {
    Select,
    Visit,
    Follow,
}

fn search_panel_system(
    mut contexts: EguiContexts,
    catalog: Res<Catalog>,
    selection: Res<SelectionState>,
    mut filter: ResMut<CatalogFilter>,
    mut search: ResMut<SearchState>,
    mut intents: EventWriter<UserIntent>,
) {
    let mut edited = filter.clone();
    let mut actions: Vec<(ObjectId, RowAction)> = Vec::new();

    egui::Window::new("Search")
        .anchor(egui::Align2::LEFT_TOP, [10.0, 150.0])
        .default_width(300.0)
        .resizable(false)
        .frame(panel_frame())
        .show(contexts.ctx_mut(), |ui| {
            apply_panel_style(ui);

            ui.add(egui::TextEdit::singleline(&mut edited.text).hint_text("name or NORAD id"));
            ui.horizontal(|ui| {
                egui::ComboBox::from_id_salt("object_type")
                    .selected_text(edited.object_type.map_or("Any type", |t| t.label()))
                    .show_ui(ui, |ui| {
                        ui.selectable_value(&mut edited.object_type, None, "Any type");
                        for kind in OBJECT_TYPES {
                            ui.selectable_value(&mut edited.object_type, Some(kind), kind.label());
                        }
                    });
                ui.add(
                    egui::TextEdit::singleline(&mut search.country)
                        .hint_text("country")
                        .desired_width(70.0),
                );
            });
            let country = search.country.trim();
            edited.country = (!country.is_empty()).then(|| country.to_string());
            ui.add_space(6.0);

            if edited.is_empty() {
                hint(ui, "type to search");
                return;
            }

            let results = edited.apply(catalog.objects(), MAX_RESULTS);
            if results.is_empty() {
                hint(ui, "no matches");
                return;
            }
            egui::ScrollArea::vertical().max_height(320.0).show(ui, |ui| {
                for object in results {
                    ui.horizontal(|ui| {
                        let mut label = egui::RichText::new(format!("{} {}", object.id, object.name));
                        if selection.selected == Some(object.id) {
                            label = label.color(ACCENT);
                        }
                        ui.label(label);
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.small_button("follow").clicked() {
                                actions.push((object.id, RowAction::Follow));
                            }
                            if ui.small_button("visit").clicked() {
                                actions.push((object.id, RowAction::Visit));
                            }
                            if ui.small_button("select").clicked() {
                                actions.push((object.id, RowAction::Select));
                            }
                        });
                    });
                }
            });
        });

    if *filter != edited {
        *filter = edited;
    }
    for (id, action) in actions {
        intents.send_batch(row_intents(id, action));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visit_and_follow_select_first() {
        let id = ObjectId(25544);
        assert_eq!(row_intents(id, RowAction::Select), vec![UserIntent::Select(Some(id))]);
        assert_eq!(
            row_intents(id, RowAction::Visit)[1],
            UserIntent::Visit(Some(VisitTarget::Object(id)))
        );
        let follow = row_intents(id, RowAction::Follow);
        assert_eq!(follow[0], UserIntent::Select(Some(id)));
        assert_eq!(follow[1], UserIntent::Follow(Some(id)));
    }

    #[test]
    fn intents_apply_in_order() {
        let id = ObjectId(7);
        let mut selection = SelectionState::default();
        for intent in row_intents(id, RowAction::Visit) {
            selection.apply(&intent, None);
        }
        assert_eq!(selection.selected, Some(id));
        assert_eq!(selection.visited, Some(VisitTarget::Object(id)));
    }
}

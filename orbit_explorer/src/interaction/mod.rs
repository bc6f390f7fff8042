//! User intents and the selection state they mutate.
//!
//! Only the handlers here ([`apply_intents`], [`apply_closest_answers`])
//! write [`SelectionState`]; the camera machine, detector and panels read it.

mod input;
mod picking;

use bevy::log::debug;
use bevy::prelude::*;

use crate::data::{init_catalog_channel, FetcherConfig, ObjectId};
use crate::orbit::{SceneFrame, SimClock};
use crate::pipeline::{Closest, ClosestResult, ClosestTracker};

pub use input::{intent_for_key, keyboard_intents};
pub use picking::{click_pick_system, hover_pick_system, pick_nearest, PickRadius};

/// What a visit points the camera at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VisitTarget {
    PrimaryBody,
    Object(ObjectId),
}

#[derive(Resource, Clone, Debug, Default, PartialEq)]
pub struct SelectionState {
    pub selected: Option<ObjectId>,
    pub hovered: Option<ObjectId>,
    pub followed: Option<ObjectId>,
    pub visited: Option<VisitTarget>,
    pub comparison_mode: bool,
    pub comparison_peer: Option<ObjectId>,
    pub comparison_distance_km: Option<f64>,
}

/// Discrete user actions. Anything that does not make sense in the current
/// state is ignored.
#[derive(Event, Clone, Copy, Debug, PartialEq)]
pub enum UserIntent {
    Select(Option<ObjectId>),
    Hover(Option<ObjectId>),
    Follow(Option<ObjectId>),
    Visit(Option<VisitTarget>),
    EnableCompare,
    DisableCompare,
    SetTimeSpeed(f64),
    Pause,
    Resume,
    TogglePause,
    Reset,
    ReloadCatalog,
}

/// A detector answer accepted for the object selected when it was requested.
#[derive(Event, Clone, Copy, Debug, PartialEq)]
pub struct ClosestAnswer(pub ClosestResult);

impl SelectionState {
    /// Apply a selection intent. `closest` is the detector's current answer
    /// for the selected object. Returns whether anything changed.
    pub fn apply(&mut self, intent: &UserIntent, closest: Option<&Closest>) -> bool {
        let before = self.clone();
        match *intent {
            UserIntent::Select(id) => {
                if id != self.selected {
                    self.selected = id;
                    self.clear_comparison();
                }
            }
            UserIntent::Hover(id) => self.hovered = id,
            UserIntent::Follow(id) => self.followed = id,
            UserIntent::Visit(target) => {
                self.visited = target;
                self.clear_comparison();
            }
            UserIntent::EnableCompare => {
                if let (Some(selected), Some(closest)) = (self.selected, closest) {
                    if closest.id != selected {
                        self.comparison_mode = true;
                        self.comparison_peer = Some(closest.id);
                        self.comparison_distance_km = Some(closest.distance_km);
                    }
                }
            }
            UserIntent::DisableCompare => self.clear_comparison(),
            _ => {}
        }
        *self != before
    }

    /// Track a fresh detector answer while comparing. Answers for another
    /// selection are ignored.
    pub fn refresh_comparison(&mut self, result: &ClosestResult) -> bool {
        if !self.comparison_mode || self.selected != Some(result.selected) {
            return false;
        }
        let before = (self.comparison_peer, self.comparison_distance_km);
        if let Some(closest) = result.closest.filter(|c| Some(c.id) != self.selected) {
            self.comparison_peer = Some(closest.id);
            self.comparison_distance_km = Some(closest.distance_km);
        }
        (self.comparison_peer, self.comparison_distance_km) != before
    }

    /// The pair being compared, if comparison is active and resolved.
    pub fn compared_pair(&self) -> Option<(ObjectId, ObjectId)> {
        if !self.comparison_mode {
            return None;
        }
        self.selected.zip(self.comparison_peer)
    }

    /// Drop every reference to objects; used when the catalog is replaced.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    fn clear_comparison(&mut self) {
        self.comparison_mode = false;
        self.comparison_peer = None;
        self.comparison_distance_km = None;
    }
}

/// Whether the UI layer currently owns the pointer or keyboard. Written by
/// the panels each frame; scene input is ignored while set.
#[derive(Resource, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UiCapture {
    pub pointer: bool,
    pub keyboard: bool,
}

/// Resource carrying the fetcher configuration so reloads can re-spawn it.
#[derive(Resource, Clone, Debug)]
pub struct CatalogRequest(pub FetcherConfig);

/// Drain `UserIntent` events into the selection and the clock.
pub fn apply_intents(
    mut intents: EventReader<UserIntent>,
    mut selection: ResMut<SelectionState>,
    mut clock: ResMut<SimClock>,
    tracker: Res<ClosestTracker>,
    request: Option<Res<CatalogRequest>>,
    mut commands: Commands,
) {
    for intent in intents.read() {
        match *intent {
            UserIntent::SetTimeSpeed(speed) => clock.set_speed(speed),
            UserIntent::Pause => clock.pause(),
            UserIntent::Resume => clock.resume(),
            UserIntent::TogglePause => clock.toggle_pause(),
            UserIntent::Reset => clock.reset(),
            UserIntent::ReloadCatalog => match &request {
                Some(request) => commands.insert_resource(init_catalog_channel(request.0.clone())),
                None => debug!("interaction: reload requested without a catalog source"),
            },
            _ => {
                // Compare needs the answer for the current selection, not a
                // stale one left over from a previous pick.
                let closest = tracker
                    .current()
                    .filter(|_| tracker.target() == selection.selected);
                if selection.bypass_change_detection().apply(intent, closest) {
                    selection.set_changed();
                }
            }
        }
    }
}

/// Move the comparison peer along with the detector while comparing.
pub fn apply_closest_answers(
    mut answers: EventReader<ClosestAnswer>,
    mut selection: ResMut<SelectionState>,
) {
    for ClosestAnswer(result) in answers.read() {
        if selection.bypass_change_detection().refresh_comparison(result) {
            selection.set_changed();
        }
    }
}

pub fn interaction_plugin(app: &mut App) {
    app.init_resource::<SelectionState>()
        .init_resource::<PickRadius>()
        .init_resource::<UiCapture>()
        .init_resource::<SceneFrame>()
        .add_event::<UserIntent>()
        .add_event::<ClosestAnswer>()
        .add_systems(
            Update,
            apply_closest_answers
                .in_set(crate::scene::ExplorerSet::Detect)
                .after(crate::scene::detect_system),
        )
        .add_systems(
            Update,
            (
                (keyboard_intents, click_pick_system, hover_pick_system),
                apply_intents,
            )
                .chain()
                .in_set(crate::scene::ExplorerSet::Input),
        );
}

pub(crate) mod ingest;
pub(crate) mod setup;
pub(crate) mod systems;

use bevy::prelude::*;

use crate::camera::CameraStateMachine;
use crate::interaction::ClosestAnswer;
use crate::orbit::{SceneFrame, SimClock};
use crate::pipeline::lod::{LodTracker, TrailCache};
use crate::pipeline::{
    Catalog, ClosestTracker, ObservableStore, PositionBuffer, PropagationDriver, SyncThrottle,
};
use crate::render::{apply_render_frame, build_render_frame_system, draw_overlays_system, RenderFrame};

pub use ingest::{ingest_catalog, SessionState};
pub use setup::{setup_scene, PrimaryBody};
pub use systems::{clock_system, detect_system, propagate_system, sync_system, trail_system};

/// Per-frame stages, run in declaration order inside `Update`.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExplorerSet {
    Input,
    Clock,
    Propagate,
    Detect,
    Camera,
    Sync,
    Render,
}

/// Simulation core: clock, propagation, closest detection and the store.
/// Resources already inserted by the caller are left untouched.
pub fn pipeline_plugin(app: &mut App) {
    app.configure_sets(
        Update,
        (
            ExplorerSet::Input,
            ExplorerSet::Clock,
            ExplorerSet::Propagate,
            ExplorerSet::Detect,
            ExplorerSet::Camera,
            ExplorerSet::Sync,
            ExplorerSet::Render,
        )
            .chain(),
    )
    .init_resource::<SceneFrame>()
    .init_resource::<SimClock>()
    .init_resource::<Catalog>()
    .init_resource::<PositionBuffer>()
    .init_resource::<PropagationDriver>()
    .init_resource::<ClosestTracker>()
    .init_resource::<ObservableStore>()
    .init_resource::<SyncThrottle>()
    .init_resource::<LodTracker>()
    .init_resource::<TrailCache>()
    .init_resource::<CameraStateMachine>()
    .add_event::<ClosestAnswer>()
    .add_systems(Update, ingest_catalog.in_set(ExplorerSet::Input))
    .add_systems(Update, clock_system.in_set(ExplorerSet::Clock))
    .add_systems(Update, propagate_system.in_set(ExplorerSet::Propagate))
    .add_systems(Update, detect_system.in_set(ExplorerSet::Detect))
    .add_systems(Update, sync_system.in_set(ExplorerSet::Sync));
}

/// Trail and render frame, then whatever the renderer draws from it.
pub fn render_plugin(app: &mut App) {
    app.init_resource::<RenderFrame>()
        .add_systems(Startup, setup_scene)
        .add_systems(
            Update,
            (
                trail_system,
                build_render_frame_system,
                (apply_render_frame, draw_overlays_system),
            )
                .chain()
                .in_set(ExplorerSet::Render),
        );
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use bevy::input::InputPlugin;
    use bevy::math::DVec3;
    use bevy::time::TimeUpdateStrategy;
    use chrono::{DateTime, TimeZone, Utc};

    use super::*;
    use crate::data::{CatalogChannel, ObjectId, OrbitalElements, TrackedObject};
    use crate::error::PropagationError;
    use crate::interaction::{interaction_plugin, SelectionState, UserIntent};
    use crate::pipeline::Closest;
    use crate::orbit::{Propagator, PropagatorResource, StateVector};

    /// Objects sit on the x axis at `id * 1000` km, drifting along y with time.
    struct Line;

    impl Propagator for Line {
        fn propagate(
            &self,
            id: ObjectId,
            _elements: &OrbitalElements,
            at: DateTime<Utc>,
        ) -> Result<StateVector, PropagationError> {
            if id.0 == 99 {
                return Err(PropagationError::Diverged("decayed".into()));
            }
            Ok(StateVector {
                position_km: DVec3::new(
                    7000.0 + id.0 as f64 * 1000.0,
                    at.timestamp() as f64 % 100.0,
                    0.0,
                ),
                velocity_km_s: DVec3::new(0.0, 7.5, 0.0),
            })
        }
    }

    fn object(id: u64) -> TrackedObject {
        TrackedObject {
            id: ObjectId(id),
            name: format!("obj-{id}"),
            elements: OrbitalElements::new("1", "2"),
            classification: None,
        }
    }

    fn app_with(objects: Vec<TrackedObject>) -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, InputPlugin))
            .add_event::<CursorMoved>()
            .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(100)))
            .insert_resource(SimClock::new(Utc.timestamp_opt(1_700_000_000, 0).unwrap()))
            .insert_resource(PropagatorResource::new(Line))
            .add_plugins((pipeline_plugin, interaction_plugin));

        let (tx, rx) = crossbeam_channel::bounded(1);
        tx.send(Ok(objects)).unwrap();
        app.insert_resource(CatalogChannel(rx));
        app
    }

    #[test]
    fn catalog_is_ingested_and_propagated() {
        let mut app = app_with(vec![object(1), object(2), object(99)]);
        app.update();
        app.update();

        let world = app.world();
        assert_eq!(world.resource::<Catalog>().len(), 3);
        assert!(world.get_resource::<CatalogChannel>().is_none());
        let buffer = world.resource::<PositionBuffer>();
        assert!(buffer.get(ObjectId(1)).is_some());
        assert!(buffer.get(ObjectId(99)).is_none());

        let store = world.resource::<ObservableStore>();
        assert_eq!(store.state().catalog_size, 3);
        assert_eq!(store.state().failed_objects, 1);
        assert!(store.state().sim_time.is_some());
    }

    #[test]
    fn paused_clock_freezes_positions() {
        let mut app = app_with(vec![object(1)]);
        app.update();
        app.update();
        app.world_mut().send_event(UserIntent::Pause);
        app.update();

        let frozen = *app.world().resource::<PositionBuffer>().get(ObjectId(1)).unwrap();
        let time = app.world().resource::<SimClock>().time();
        for _ in 0..5 {
            app.update();
        }
        let world = app.world();
        assert_eq!(world.resource::<SimClock>().time(), time);
        assert_eq!(*world.resource::<PositionBuffer>().get(ObjectId(1)).unwrap(), frozen);
    }

    #[test]
    fn selecting_resolves_the_closest_object() {
        let mut app = app_with(vec![object(1), object(2), object(5)]);
        app.update();
        app.update();
        app.world_mut().send_event(UserIntent::Select(Some(ObjectId(1))));
        app.update();

        let world = app.world();
        assert_eq!(world.resource::<SelectionState>().selected, Some(ObjectId(1)));
        let closest = world.resource::<ClosestTracker>().current().copied().unwrap();
        assert_eq!(closest.id, ObjectId(2));
        assert!((closest.distance_km - 1000.0).abs() < 1.0);
        assert_eq!(
            world.resource::<ObservableStore>().state().closest.map(|c| c.id),
            Some(ObjectId(2))
        );
    }

    #[test]
    fn compare_mode_tracks_the_closest_peer() {
        let mut app = app_with(vec![object(1), object(2), object(5)]);
        app.update();
        app.update();
        app.world_mut().send_event(UserIntent::Select(Some(ObjectId(5))));
        app.update();
        app.world_mut().send_event(UserIntent::EnableCompare);
        app.update();

        let selection = app.world().resource::<SelectionState>();
        assert!(selection.comparison_mode);
        assert_eq!(selection.comparison_peer, Some(ObjectId(2)));
        assert_eq!(selection.compared_pair(), Some((ObjectId(5), ObjectId(2))));
    }

    #[test]
    fn detector_answers_move_the_compared_peer() {
        let mut app = app_with(vec![object(1), object(2), object(5)]);
        app.update();
        app.update();
        app.world_mut().send_event(UserIntent::Select(Some(ObjectId(5))));
        app.update();

        let answers: Vec<ClosestAnswer> = app
            .world_mut()
            .resource_mut::<Events<ClosestAnswer>>()
            .drain()
            .collect();
        assert_eq!(answers.len(), 1);
        assert_eq!(answers[0].0.selected, ObjectId(5));

        app.world_mut().send_event(UserIntent::EnableCompare);
        app.update();
        assert_eq!(
            app.world().resource::<SelectionState>().comparison_peer,
            Some(ObjectId(2))
        );

        let mut later = answers[0].0;
        later.closest = Some(Closest {
            id: ObjectId(1),
            distance: 0.5,
            distance_km: 4000.0,
        });
        app.world_mut().send_event(ClosestAnswer(later));
        app.update();

        let selection = app.world().resource::<SelectionState>();
        assert_eq!(selection.compared_pair(), Some((ObjectId(5), ObjectId(1))));
        assert_eq!(selection.comparison_distance_km, Some(4000.0));
    }

    #[test]
    fn reload_resets_selection_and_positions() {
        let mut app = app_with(vec![object(1), object(2)]);
        app.update();
        app.update();
        app.world_mut().send_event(UserIntent::Select(Some(ObjectId(1))));
        app.update();

        let (tx, rx) = crossbeam_channel::bounded(1);
        tx.send(Ok(vec![object(3)])).unwrap();
        app.insert_resource(CatalogChannel(rx));
        app.update();

        let world = app.world();
        assert_eq!(world.resource::<SelectionState>().selected, None);
        assert!(world.resource::<Catalog>().contains(ObjectId(3)));
        assert!(!world.resource::<Catalog>().contains(ObjectId(1)));
        assert!(world.resource::<PositionBuffer>().get(ObjectId(1)).is_none());
    }

    #[test]
    fn failed_reload_keeps_the_previous_catalog() {
        let mut app = app_with(vec![object(1), object(2)]);
        app.update();

        let (tx, rx) = crossbeam_channel::bounded(1);
        tx.send(Err(crate::error::CatalogError::Empty)).unwrap();
        app.insert_resource(CatalogChannel(rx));
        app.update();

        assert_eq!(app.world().resource::<Catalog>().len(), 2);
        assert!(app.world().get_resource::<CatalogChannel>().is_none());
    }
}

//! Per-frame pipeline systems, one per `ExplorerSet` stage.

use bevy::prelude::*;

use crate::camera::CameraStateMachine;
use crate::data::ObjectId;
use crate::interaction::{ClosestAnswer, SelectionState};
use crate::orbit::{PropagatorResource, SimClock};
use crate::pipeline::lod::{LodTracker, TrailCache};
use crate::pipeline::{
    Catalog, ClosestTracker, ObservableStore, PositionBuffer, PropagationDriver, SyncThrottle,
};

pub fn clock_system(time: Res<Time<Real>>, mut clock: ResMut<SimClock>) {
    clock.advance(time.delta_secs_f64());
}

pub fn propagate_system(
    catalog: Res<Catalog>,
    clock: Res<SimClock>,
    propagator: Res<PropagatorResource>,
    mut driver: ResMut<PropagationDriver>,
    mut buffer: ResMut<PositionBuffer>,
) {
    driver.advance(catalog.objects(), clock.time(), propagator.0.as_ref(), &mut buffer);
}

/// Closest-object scan on its wall-clock cadence; answers are only kept
/// when they still match the current selection and catalog.
pub fn detect_system(
    time: Res<Time<Real>>,
    catalog: Res<Catalog>,
    buffer: Res<PositionBuffer>,
    driver: Res<PropagationDriver>,
    selection: Res<SelectionState>,
    mut tracker: ResMut<ClosestTracker>,
    mut answers: EventWriter<ClosestAnswer>,
) {
    tracker.follow_catalog(catalog.generation());
    tracker.track(selection.selected);
    let Some(result) = tracker.poll(time.delta(), catalog.objects(), &*buffer, driver.frame()) else {
        return;
    };
    if tracker.accept(result) {
        answers.send(ClosestAnswer(result));
    }
}

/// Trail sample count from the camera distance, then the trail itself.
#[allow(clippy::too_many_arguments)]
pub fn trail_system(
    catalog: Res<Catalog>,
    clock: Res<SimClock>,
    buffer: Res<PositionBuffer>,
    selection: Res<SelectionState>,
    camera: Res<CameraStateMachine>,
    propagator: Res<PropagatorResource>,
    driver: Res<PropagationDriver>,
    mut lod: ResMut<LodTracker>,
    mut trails: ResMut<TrailCache>,
    mut last_selected: Local<Option<ObjectId>>,
) {
    if *last_selected != selection.selected {
        *last_selected = selection.selected;
        lod.reset();
    }
    let selected = selection
        .selected
        .and_then(|id| Some((catalog.get(id)?, buffer.get(id)?)));
    let Some((object, sample)) = selected else {
        trails.clear();
        return;
    };

    lod.update(camera.pose().position.distance(sample.scene));
    trails.refresh(
        Some(object),
        clock.time(),
        lod.samples(),
        propagator.0.as_ref(),
        driver.frame(),
    );
}

/// Refresh the non-position fields every frame, copy positions on the
/// throttle's cadence, then publish.
#[allow(clippy::too_many_arguments)]
pub fn sync_system(
    catalog: Res<Catalog>,
    clock: Res<SimClock>,
    buffer: Res<PositionBuffer>,
    selection: Res<SelectionState>,
    tracker: Res<ClosestTracker>,
    driver: Res<PropagationDriver>,
    mut throttle: ResMut<SyncThrottle>,
    mut store: ResMut<ObservableStore>,
) {
    let closest = tracker.current().copied();
    let failed = driver.last_report().failed.len();
    store.update(|state| {
        if state.selection != *selection {
            state.selection = selection.clone();
        }
        state.closest = closest;
        state.sim_time = Some(clock.time());
        state.time_speed = clock.speed();
        state.paused = clock.is_paused();
        state.catalog_size = catalog.len();
        state.failed_objects = failed;
    });
    throttle.sync(&buffer, &mut store);
    store.flush();
}

//! Drains the catalog channel and resets per-session pipeline state.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use crossbeam_channel::TryRecvError;

use crate::camera::CameraStateMachine;
use crate::data::{CatalogChannel, TrackedObject};
use crate::interaction::SelectionState;
use crate::orbit::PropagatorResource;
use crate::pipeline::lod::{LodTracker, TrailCache};
use crate::pipeline::{Catalog, ClosestTracker, PositionBuffer, PropagationDriver};
use crate::render::{ObjectMarker, RendererResource};

/// Everything that refers to objects of the previous catalog.
#[derive(SystemParam)]
pub struct SessionState<'w> {
    catalog: ResMut<'w, Catalog>,
    buffer: ResMut<'w, PositionBuffer>,
    driver: ResMut<'w, PropagationDriver>,
    tracker: ResMut<'w, ClosestTracker>,
    selection: ResMut<'w, SelectionState>,
    trails: ResMut<'w, TrailCache>,
    lod: ResMut<'w, LodTracker>,
    camera: ResMut<'w, CameraStateMachine>,
    propagator: Res<'w, PropagatorResource>,
}

impl SessionState<'_> {
    fn replace_catalog(&mut self, objects: Vec<TrackedObject>) {
        self.catalog.replace(objects);
        self.buffer.clear();
        self.driver.reset();
        self.tracker.track(None);
        self.selection.clear();
        self.trails.clear();
        self.lod.reset();
        self.camera.reset();
        self.propagator.0.forget();
    }
}

pub fn ingest_catalog(
    mut commands: Commands,
    channel: Option<Res<CatalogChannel>>,
    renderer: Option<Res<RendererResource>>,
    meshes: Option<ResMut<Assets<Mesh>>>,
    materials: Option<ResMut<Assets<StandardMaterial>>>,
    markers: Query<Entity, With<ObjectMarker>>,
    mut session: SessionState,
) {
    let Some(channel) = channel else {
        return;
    };
    let payload = match channel.0.try_recv() {
        Ok(payload) => payload,
        Err(TryRecvError::Empty) => return,
        Err(TryRecvError::Disconnected) => {
            commands.remove_resource::<CatalogChannel>();
            return;
        }
    };
    commands.remove_resource::<CatalogChannel>();

    // A failed reload keeps the catalog already on screen.
    let Ok(objects) = payload else {
        return;
    };

    for entity in &markers {
        commands.entity(entity).despawn();
    }
    session.replace_catalog(objects);

    if let (Some(renderer), Some(mut meshes), Some(mut materials)) = (renderer, meshes, materials) {
        renderer.0.spawn_markers(
            &mut commands,
            &mut meshes,
            &mut materials,
            session.catalog.objects(),
        );
    }
    info!("catalog: {} objects in scene", session.catalog.len());
}

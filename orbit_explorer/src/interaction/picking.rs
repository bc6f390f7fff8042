//! Cursor picking against object markers.
//!
//! Manual ray-sphere tests against the position buffer rather than mesh
//! picking, so egui keeps the pointer when it is over a panel.

use bevy::prelude::*;

use crate::data::ObjectId;
use crate::interaction::{SelectionState, UiCapture, UserIntent};
use crate::orbit::SceneFrame;
use crate::pipeline::PositionBuffer;

/// Radius, in scene units, of the pick sphere around each marker.
#[derive(Resource, Clone, Copy, Debug)]
pub struct PickRadius(pub f32);

impl Default for PickRadius {
    fn default() -> Self {
        Self(0.12)
    }
}

/// The candidate whose pick sphere the ray enters first. Markers behind the
/// planet (a sphere of `planet_radius` at the origin) cannot be hit; a
/// non-positive radius disables occlusion.
pub fn pick_nearest(
    origin: Vec3,
    dir: Vec3,
    candidates: impl IntoIterator<Item = (ObjectId, Vec3)>,
    radius: f32,
    planet_radius: f32,
) -> Option<ObjectId> {
    let horizon = (planet_radius > 0.0)
        .then(|| ray_sphere_intersect(origin, dir, Vec3::ZERO, planet_radius))
        .flatten()
        .unwrap_or(f32::INFINITY);
    let mut best: Option<(ObjectId, f32)> = None;
    for (id, center) in candidates {
        if let Some(t) = ray_sphere_intersect(origin, dir, center, radius) {
            if t < horizon && best.is_none_or(|(_, d)| t < d) {
                best = Some((id, t));
            }
        }
    }
    best.map(|(id, _)| id)
}

fn ray_sphere_intersect(origin: Vec3, dir: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let to_center = center - origin;
    let along = to_center.dot(dir);
    let closest_sq = to_center.length_squared() - along * along;
    let r_sq = radius * radius;
    if closest_sq > r_sq {
        return None;
    }
    let half_chord = (r_sq - closest_sq).sqrt();
    let t_exit = along + half_chord;
    if t_exit <= 0.0 {
        return None;
    }
    Some((along - half_chord).max(0.0))
}

/// Ray under the cursor, or `None` when the cursor is outside the window or
/// over a panel.
fn cursor_ray(
    windows: &Query<&Window>,
    cameras: &Query<(&Camera, &GlobalTransform)>,
    capture: &UiCapture,
) -> Option<Ray3d> {
    if capture.pointer {
        return None;
    }
    let window = windows.get_single().ok()?;
    let cursor = window.cursor_position()?;
    let (camera, transform) = cameras.get_single().ok()?;
    camera.viewport_to_world(transform, cursor).ok()
}

fn pick_under_cursor(
    windows: &Query<&Window>,
    cameras: &Query<(&Camera, &GlobalTransform)>,
    capture: &UiCapture,
    buffer: &PositionBuffer,
    radius: f32,
    frame: &SceneFrame,
) -> Option<ObjectId> {
    let ray = cursor_ray(windows, cameras, capture)?;
    pick_nearest(
        ray.origin,
        *ray.direction,
        buffer.iter().map(|(id, sample)| (*id, sample.scene)),
        radius,
        frame.radius,
    )
}

/// Left click selects the marker under the cursor. Clicking empty space
/// keeps the current selection.
#[allow(clippy::too_many_arguments)]
pub fn click_pick_system(
    mouse: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window>,
    cameras: Query<(&Camera, &GlobalTransform)>,
    capture: Res<UiCapture>,
    buffer: Res<PositionBuffer>,
    radius: Res<PickRadius>,
    frame: Res<SceneFrame>,
    mut intents: EventWriter<UserIntent>,
) {
    if !mouse.just_pressed(MouseButton::Left) {
        return;
    }
    if let Some(hit) = pick_under_cursor(&windows, &cameras, &capture, &buffer, radius.0, &frame) {
        intents.send(UserIntent::Select(Some(hit)));
    }
}

#[allow(clippy::too_many_arguments)]
pub fn hover_pick_system(
    mut moved: EventReader<CursorMoved>,
    windows: Query<&Window>,
    cameras: Query<(&Camera, &GlobalTransform)>,
    capture: Res<UiCapture>,
    buffer: Res<PositionBuffer>,
    radius: Res<PickRadius>,
    frame: Res<SceneFrame>,
    selection: Res<SelectionState>,
    mut intents: EventWriter<UserIntent>,
) {
    if moved.read().last().is_none() {
        return;
    }
    let hit = pick_under_cursor(&windows, &cameras, &capture, &buffer, radius.0, &frame);
    if hit != selection.hovered {
        intents.send(UserIntent::Hover(hit));
    }
}

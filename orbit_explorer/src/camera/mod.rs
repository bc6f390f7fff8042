//! Orbit camera driven by [`CameraStateMachine`]: mouse drag orbits, wheel
//! zooms, selection changes animate between presets.

mod machine;

use bevy::input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel};
use bevy::prelude::*;

use crate::interaction::{SelectionState, UiCapture};
use crate::pipeline::PositionBuffer;
use crate::scene::ExplorerSet;

pub use machine::{
    ease_out_expo, CameraIntent, CameraMode, CameraPose, CameraSettings, CameraStateMachine,
    ZoomLimits,
};

const ORBIT_SENSITIVITY: f32 = 0.005;
const ZOOM_PER_LINE: f32 = 0.1;
const ZOOM_PER_PIXEL: f32 = 0.002;

/// Marker for the camera entity the machine drives.
#[derive(Component)]
pub struct ExplorerCamera;

pub fn orbit_camera_plugin(app: &mut App) {
    app.add_systems(Update, camera_input_system.in_set(ExplorerSet::Input))
        .add_systems(Update, camera_update_system.in_set(ExplorerSet::Camera))
        .add_systems(Update, apply_camera_pose.in_set(ExplorerSet::Render));
}

fn camera_input_system(
    mouse: Res<ButtonInput<MouseButton>>,
    mut motion: EventReader<MouseMotion>,
    mut wheel: EventReader<MouseWheel>,
    capture: Res<UiCapture>,
    mut machine: ResMut<CameraStateMachine>,
) {
    let dragged: Vec2 = motion.read().map(|m| m.delta).sum();
    let scrolled: f32 = wheel
        .read()
        .map(|w| match w.unit {
            MouseScrollUnit::Line => w.y * ZOOM_PER_LINE,
            MouseScrollUnit::Pixel => w.y * ZOOM_PER_PIXEL,
        })
        .sum();

    if capture.pointer {
        return;
    }
    let dragging = mouse.pressed(MouseButton::Left) || mouse.pressed(MouseButton::Right);
    if dragging && dragged != Vec2::ZERO {
        machine.orbit(-dragged.x * ORBIT_SENSITIVITY, dragged.y * ORBIT_SENSITIVITY);
    }
    if scrolled != 0.0 {
        machine.zoom((1.0 - scrolled).clamp(0.5, 1.5));
    }
}

fn camera_update_system(
    time: Res<Time>,
    selection: Res<SelectionState>,
    buffer: Res<PositionBuffer>,
    mut machine: ResMut<CameraStateMachine>,
) {
    machine.apply(&selection, &*buffer);
    machine.tick(time.delta_secs(), &selection, &*buffer);
}

fn apply_camera_pose(
    machine: Res<CameraStateMachine>,
    mut cameras: Query<&mut Transform, With<ExplorerCamera>>,
) {
    let pose = machine.pose();
    for mut transform in &mut cameras {
        *transform = Transform::from_translation(pose.position).looking_at(pose.look_at, Vec3::Y);
    }
}

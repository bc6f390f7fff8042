//! Static scene: planet, lights and the explorer camera.

use bevy::prelude::*;

use crate::camera::{CameraStateMachine, ExplorerCamera};
use crate::orbit::SceneFrame;

/// Marker for the planet body.
#[derive(Component)]
pub struct PrimaryBody;

const EARTH_COLOR: Color = Color::srgb(0.08, 0.22, 0.45);

pub fn setup_scene(
    mut commands: Commands,
    frame: Res<SceneFrame>,
    machine: Res<CameraStateMachine>,
    meshes: Option<ResMut<Assets<Mesh>>>,
    materials: Option<ResMut<Assets<StandardMaterial>>>,
) {
    let pose = machine.pose();
    commands.spawn((
        Camera3d::default(),
        ExplorerCamera,
        Transform::from_translation(pose.position).looking_at(pose.look_at, Vec3::Y),
    ));
    commands.spawn((
        DirectionalLight {
            illuminance: 8_000.0,
            ..default()
        },
        Transform::from_xyz(40., 20., 30.).looking_at(Vec3::ZERO, Vec3::Y),
    ));
    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: 200.0,
    });

    // Headless apps have no asset storage; the body is purely visual.
    if let (Some(mut meshes), Some(mut materials)) = (meshes, materials) {
        let Ok(mesh) = Sphere::new(frame.radius).mesh().ico(5) else {
            return;
        };
        commands.spawn((
            PrimaryBody,
            Mesh3d(meshes.add(mesh)),
            MeshMaterial3d(materials.add(StandardMaterial {
                base_color: EARTH_COLOR,
                perceptual_roughness: 0.9,
                ..default()
            })),
            Transform::default(),
        ));
    }
}

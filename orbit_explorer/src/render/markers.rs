use std::collections::HashMap;

use bevy::prelude::*;

use crate::data::TrackedObject;
use crate::pipeline::lod::DetailTier;
use crate::render::{ObjectMarker, ObjectRenderer, RenderOverlays, Tint};

#[derive(Clone, Debug)]
pub struct MarkerSettings {
    /// Base marker radius in scene units, before the tint scale.
    pub radius: f32,
    pub ico_subdivisions: u32,
    pub trail_color: Color,
    pub compare_color: Color,
    pub midpoint_radius: f32,
}

impl Default for MarkerSettings {
    fn default() -> Self {
        Self {
            radius: 0.04,
            ico_subdivisions: 1,
            trail_color: Color::srgb(1.0, 0.9, 0.2),
            compare_color: Color::srgb(0.2, 0.75, 1.0),
            midpoint_radius: 0.05,
        }
    }
}

/// One shared material per tint, so markers batch.
#[derive(Resource, Default)]
pub struct MarkerPalette {
    materials: HashMap<Tint, Handle<StandardMaterial>>,
}

impl MarkerPalette {
    pub fn get(&self, tint: Tint) -> Option<&Handle<StandardMaterial>> {
        self.materials.get(&tint)
    }
}

/// Spheres per object, gizmo lines for the trail and the compare segment.
#[derive(Default)]
pub struct MarkerRenderer {
    pub settings: MarkerSettings,
}

impl ObjectRenderer for MarkerRenderer {
    fn spawn_markers(
        &self,
        commands: &mut Commands,
        meshes: &mut Assets<Mesh>,
        materials: &mut Assets<StandardMaterial>,
        objects: &[TrackedObject],
    ) {
        let mesh = match Sphere::new(self.settings.radius)
            .mesh()
            .ico(self.settings.ico_subdivisions)
        {
            Ok(mesh) => meshes.add(mesh),
            Err(err) => {
                warn!("render: marker mesh failed: {err}");
                return;
            }
        };

        let palette = MarkerPalette {
            materials: Tint::ALL
                .iter()
                .map(|&tint| {
                    let color = tint.color();
                    let handle = materials.add(StandardMaterial {
                        base_color: color,
                        emissive: color.to_linear() * 0.6,
                        unlit: true,
                        ..default()
                    });
                    (tint, handle)
                })
                .collect(),
        };

        for (slot, object) in objects.iter().enumerate() {
            let tint = Tint::Base(object.object_type());
            let Some(material) = palette.get(tint) else {
                continue;
            };
            commands.spawn((
                Mesh3d(mesh.clone()),
                MeshMaterial3d(material.clone()),
                Transform::default(),
                Visibility::Hidden,
                ObjectMarker { slot, id: object.id },
                Name::new(object.name.clone()),
            ));
        }

        commands.insert_resource(palette);
    }

    fn draw_overlays(&self, gizmos: &mut Gizmos, overlays: &RenderOverlays) {
        let trail_color = match overlays.detail {
            Some(DetailTier::Hidden) | None => None,
            Some(DetailTier::Low) => Some(self.settings.trail_color.with_alpha(0.35)),
            Some(DetailTier::Medium) | Some(DetailTier::High) => Some(self.settings.trail_color),
        };
        if let Some(color) = trail_color {
            if overlays.trail.len() >= 2 {
                gizmos.linestrip(overlays.trail.iter().copied(), color);
            }
        }

        if let Some(segment) = overlays.compare {
            gizmos.line(segment.a, segment.b, self.settings.compare_color);
            gizmos.sphere(
                Isometry3d::from_translation(segment.midpoint),
                self.settings.midpoint_radius,
                self.settings.compare_color,
            );
        }
    }
}

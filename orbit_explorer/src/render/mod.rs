//! Renderer traits, the per-tick render frame and default implementations.

mod markers;

use bevy::prelude::*;

use crate::data::{ObjectId, ObjectType, TrackedObject};
use crate::interaction::SelectionState;
use crate::pipeline::lod::{DetailTier, LodTracker, TrailCache};
use crate::pipeline::{Catalog, PositionBuffer};

pub use markers::{MarkerPalette, MarkerRenderer, MarkerSettings};

/// How an instance is tinted. Highlights win over the catalog palette in
/// the order selected, compared, followed, hovered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tint {
    Base(ObjectType),
    Hovered,
    Followed,
    Compared,
    Selected,
}

impl Tint {
    pub const ALL: [Tint; 8] = [
        Tint::Base(ObjectType::Payload),
        Tint::Base(ObjectType::RocketBody),
        Tint::Base(ObjectType::Debris),
        Tint::Base(ObjectType::Unknown),
        Tint::Hovered,
        Tint::Followed,
        Tint::Compared,
        Tint::Selected,
    ];

    pub fn color(self) -> Color {
        match self {
            Tint::Base(ObjectType::Payload) => Color::srgb(0.3, 0.85, 0.7),
            Tint::Base(ObjectType::RocketBody) => Color::srgb(0.95, 0.55, 0.2),
            Tint::Base(ObjectType::Debris) => Color::srgb(0.55, 0.55, 0.6),
            Tint::Base(ObjectType::Unknown) => Color::srgb(0.8, 0.8, 0.85),
            Tint::Hovered => Color::srgb(1.0, 1.0, 1.0),
            Tint::Followed => Color::srgb(0.85, 0.35, 0.95),
            Tint::Compared => Color::srgb(0.2, 0.75, 1.0),
            Tint::Selected => Color::srgb(1.0, 0.9, 0.2),
        }
    }

    /// Marker scale relative to the base marker size.
    pub fn scale(self) -> f32 {
        match self {
            Tint::Base(_) => 1.0,
            Tint::Hovered => 1.8,
            Tint::Followed => 2.0,
            Tint::Compared => 2.2,
            Tint::Selected => 2.5,
        }
    }

    fn for_object(object: &TrackedObject, selection: &SelectionState) -> Self {
        let id = Some(object.id);
        if selection.selected == id {
            Tint::Selected
        } else if selection.comparison_mode && selection.comparison_peer == id {
            Tint::Compared
        } else if selection.followed == id {
            Tint::Followed
        } else if selection.hovered == id {
            Tint::Hovered
        } else {
            Tint::Base(object.object_type())
        }
    }
}

/// One object's transform and tint for this tick, indexed by catalog slot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderInstance {
    pub slot: usize,
    pub id: ObjectId,
    pub position: Vec3,
    /// Zero hides the instance.
    pub scale: f32,
    pub tint: Tint,
}

impl RenderInstance {
    pub fn color(&self) -> Color {
        self.tint.color()
    }

    pub fn is_visible(&self) -> bool {
        self.scale > 0.0
    }
}

/// Endpoints and midpoint of the compare line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CompareSegment {
    pub a: Vec3,
    pub b: Vec3,
    pub midpoint: Vec3,
}

/// Point lists handed to the renderer alongside the instances.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderOverlays {
    pub trail: Vec<Vec3>,
    pub compare: Option<CompareSegment>,
    pub detail: Option<DetailTier>,
}

/// Everything the renderer draws this tick.
#[derive(Resource, Clone, Debug, Default)]
pub struct RenderFrame {
    pub instances: Vec<RenderInstance>,
    pub overlays: RenderOverlays,
}

/// One instance per catalog slot. Objects with no buffered sample yet are
/// hidden rather than omitted so slots stay aligned.
pub fn build_render_frame(
    objects: &[TrackedObject],
    buffer: &PositionBuffer,
    selection: &SelectionState,
) -> Vec<RenderInstance> {
    objects
        .iter()
        .enumerate()
        .map(|(slot, object)| {
            let tint = Tint::for_object(object, selection);
            match buffer.get(object.id) {
                Some(sample) => RenderInstance {
                    slot,
                    id: object.id,
                    position: sample.scene,
                    scale: tint.scale(),
                    tint,
                },
                None => RenderInstance {
                    slot,
                    id: object.id,
                    position: Vec3::ZERO,
                    scale: 0.0,
                    tint,
                },
            }
        })
        .collect()
}

/// The compare line, when comparing and both ends have positions.
pub fn compare_segment(selection: &SelectionState, buffer: &PositionBuffer) -> Option<CompareSegment> {
    let (a, b) = selection.compared_pair()?;
    let a = buffer.get(a)?.scene;
    let b = buffer.get(b)?.scene;
    Some(CompareSegment {
        a,
        b,
        midpoint: (a + b) * 0.5,
    })
}

/// Marker component linking an entity to its catalog slot.
#[derive(Component, Clone, Copy, Debug)]
pub struct ObjectMarker {
    pub slot: usize,
    pub id: ObjectId,
}

pub trait ObjectRenderer: Send + Sync + 'static {
    fn setup(&self, _app: &mut App) {}

    /// Spawn one entity carrying [`ObjectMarker`] per object. Called after
    /// every catalog load; previous markers are already despawned.
    fn spawn_markers(
        &self,
        commands: &mut Commands,
        meshes: &mut Assets<Mesh>,
        materials: &mut Assets<StandardMaterial>,
        objects: &[TrackedObject],
    );

    fn draw_overlays(&self, gizmos: &mut Gizmos, overlays: &RenderOverlays);
}

#[derive(Resource)]
pub struct RendererResource(pub Box<dyn ObjectRenderer>);

impl RendererResource {
    pub fn new(renderer: impl ObjectRenderer) -> Self {
        Self(Box::new(renderer))
    }
}

/// Rebuild the render frame from the zero-lag buffer.
pub fn build_render_frame_system(
    catalog: Res<Catalog>,
    buffer: Res<PositionBuffer>,
    selection: Res<SelectionState>,
    trails: Res<TrailCache>,
    lod: Res<LodTracker>,
    mut frame: ResMut<RenderFrame>,
) {
    frame.instances = build_render_frame(catalog.objects(), &buffer, &selection);
    frame.overlays = RenderOverlays {
        trail: trails
            .trail()
            .filter(|t| Some(t.object) == selection.selected)
            .map(|t| t.points.clone())
            .unwrap_or_default(),
        compare: compare_segment(&selection, &buffer),
        detail: selection.selected.map(|_| lod.tier()),
    };
}

/// Push instance transforms and tints onto marker entities.
pub fn apply_render_frame(
    frame: Res<RenderFrame>,
    palette: Option<Res<MarkerPalette>>,
    mut markers: Query<(
        &ObjectMarker,
        &mut Transform,
        &mut Visibility,
        &mut MeshMaterial3d<StandardMaterial>,
    )>,
) {
    for (marker, mut transform, mut visibility, mut material) in &mut markers {
        let Some(instance) = frame.instances.get(marker.slot).filter(|i| i.id == marker.id) else {
            *visibility = Visibility::Hidden;
            continue;
        };
        if !instance.is_visible() {
            *visibility = Visibility::Hidden;
            continue;
        }
        *visibility = Visibility::Visible;
        transform.translation = instance.position;
        transform.scale = Vec3::splat(instance.scale);
        if let Some(handle) = palette.as_ref().and_then(|p| p.get(instance.tint)) {
            if material.0 != *handle {
                material.0 = handle.clone();
            }
        }
    }
}

pub fn draw_overlays_system(
    frame: Res<RenderFrame>,
    renderer: Res<RendererResource>,
    mut gizmos: Gizmos,
) {
    renderer.0.draw_overlays(&mut gizmos, &frame.overlays);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Classification, OrbitalElements};
    use crate::orbit::frame::Geodetic;
    use crate::pipeline::PositionSample;

    fn object(id: u64, object_type: Option<ObjectType>) -> TrackedObject {
        TrackedObject {
            id: ObjectId(id),
            name: format!("obj-{id}"),
            elements: OrbitalElements::new("1", "2"),
            classification: object_type.map(|t| Classification {
                object_type: Some(t),
                ..Default::default()
            }),
        }
    }

    fn sample(p: Vec3) -> PositionSample {
        PositionSample {
            scene: p,
            geodetic: Geodetic {
                latitude_deg: 0.0,
                longitude_deg: 0.0,
                altitude_km: 0.0,
            },
            speed_km_s: 0.0,
        }
    }

    #[test]
    fn frame_is_slot_aligned_and_hides_unready_objects() {
        let objects = vec![object(10, None), object(20, Some(ObjectType::Debris)), object(30, None)];
        let mut buffer = PositionBuffer::default();
        buffer.write(ObjectId(10), sample(Vec3::X));
        buffer.write(ObjectId(20), sample(Vec3::Y));

        let frame = build_render_frame(&objects, &buffer, &SelectionState::default());
        assert_eq!(frame.len(), 3);
        assert_eq!(frame[1].slot, 1);
        assert_eq!(frame[1].position, Vec3::Y);
        assert_eq!(frame[1].tint, Tint::Base(ObjectType::Debris));
        assert!(!frame[2].is_visible());
    }

    #[test]
    fn highlights_follow_precedence() {
        let objects: Vec<_> = (1..=5).map(|i| object(i, None)).collect();
        let mut buffer = PositionBuffer::default();
        for o in &objects {
            buffer.write(o.id, sample(Vec3::ONE));
        }
        let selection = SelectionState {
            selected: Some(ObjectId(1)),
            hovered: Some(ObjectId(1)),
            followed: Some(ObjectId(3)),
            comparison_mode: true,
            comparison_peer: Some(ObjectId(2)),
            ..Default::default()
        };
        let frame = build_render_frame(&objects, &buffer, &selection);
        let tints: Vec<Tint> = frame.iter().map(|i| i.tint).collect();
        assert_eq!(
            tints,
            vec![
                Tint::Selected,
                Tint::Compared,
                Tint::Followed,
                Tint::Base(ObjectType::Unknown),
                Tint::Base(ObjectType::Unknown),
            ]
        );
        assert!(frame[0].scale > frame[4].scale);
    }

    #[test]
    fn compare_segment_needs_both_positions() {
        let mut buffer = PositionBuffer::default();
        buffer.write(ObjectId(1), sample(Vec3::ZERO));
        let selection = SelectionState {
            selected: Some(ObjectId(1)),
            comparison_mode: true,
            comparison_peer: Some(ObjectId(2)),
            ..Default::default()
        };
        assert!(compare_segment(&selection, &buffer).is_none());

        buffer.write(ObjectId(2), sample(Vec3::new(3.0, 4.0, 0.0)));
        let segment = compare_segment(&selection, &buffer).unwrap();
        assert_eq!(segment.midpoint, Vec3::new(1.5, 2.0, 0.0));
    }
}

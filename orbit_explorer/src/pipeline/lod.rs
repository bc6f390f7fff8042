//! Level of detail from camera distance, and the selected object's trail.
//!
//! The trail is re-propagated at fixed offsets around the current time, so
//! it is a pure function of (object, time, sample count) and is replaced,
//! never accumulated.

use bevy::prelude::*;
use chrono::{DateTime, Utc};

use crate::data::{ObjectId, TrackedObject};
use crate::orbit::frame::SceneFrame;
use crate::orbit::propagator::Propagator;
use crate::pipeline::driver::propagate_object;

pub const DEFAULT_TRAIL_STEP_SECONDS: f64 = 60.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DetailTier {
    Hidden,
    Low,
    Medium,
    High,
}

/// Distance thresholds in scene units.
#[derive(Clone, Debug, PartialEq)]
pub struct LodPolicy {
    pub near: f32,
    pub far: f32,
    pub max_visible: f32,
    pub max_samples: usize,
    pub min_samples: usize,
    /// Minimum distance change before the tracker recomputes.
    pub hysteresis: f32,
}

impl LodPolicy {
    /// Thresholds scaled to a planet of radius `radius`.
    pub fn for_radius(radius: f32) -> Self {
        Self {
            near: radius * 0.5,
            far: radius * 3.0,
            max_visible: radius * 8.0,
            max_samples: 120,
            min_samples: 24,
            hysteresis: radius * 0.05,
        }
    }

    pub fn sample_count(&self, distance: f32) -> usize {
        if !distance.is_finite() || distance > self.max_visible {
            return 0;
        }
        if distance < self.near {
            return self.max_samples;
        }
        let max = self.max_samples as f32;
        let min = self.min_samples.min(self.max_samples) as f32;
        let count = if distance < self.far {
            let t = (distance - self.near) / (self.far - self.near);
            max + (min - max) * t
        } else {
            let span = self.max_visible - self.far;
            let t = if span > 0.0 { (distance - self.far) / span } else { 1.0 };
            min * (1.0 - t)
        };
        count.round().max(0.0) as usize
    }

    pub fn tier(&self, distance: f32) -> DetailTier {
        if !distance.is_finite() || distance > self.max_visible {
            DetailTier::Hidden
        } else if distance < self.near {
            DetailTier::High
        } else if distance < self.far {
            DetailTier::Medium
        } else {
            DetailTier::Low
        }
    }
}

impl Default for LodPolicy {
    fn default() -> Self {
        Self::for_radius(SceneFrame::default().radius)
    }
}

/// Holds the last LOD decision and only revises it once the distance has
/// moved by more than the policy's hysteresis.
#[derive(Resource, Clone, Debug)]
pub struct LodTracker {
    policy: LodPolicy,
    last_distance: Option<f32>,
    samples: usize,
    tier: DetailTier,
}

impl LodTracker {
    pub fn new(policy: LodPolicy) -> Self {
        Self {
            policy,
            last_distance: None,
            samples: 0,
            tier: DetailTier::Hidden,
        }
    }

    pub fn policy(&self) -> &LodPolicy {
        &self.policy
    }

    pub fn samples(&self) -> usize {
        self.samples
    }

    pub fn tier(&self) -> DetailTier {
        self.tier
    }

    /// Returns whether the decision was recomputed.
    pub fn update(&mut self, distance: f32) -> bool {
        if let Some(last) = self.last_distance {
            if (distance - last).abs() <= self.policy.hysteresis {
                return false;
            }
        }
        self.last_distance = Some(distance);
        self.samples = self.policy.sample_count(distance);
        self.tier = self.policy.tier(distance);
        true
    }

    /// Forget the last distance, e.g. when the selection changes.
    pub fn reset(&mut self) {
        self.last_distance = None;
        self.samples = 0;
        self.tier = DetailTier::Hidden;
    }
}

impl Default for LodTracker {
    fn default() -> Self {
        Self::new(LodPolicy::default())
    }
}

/// Trail points for one object around one instant.
#[derive(Clone, Debug, PartialEq)]
pub struct Trail {
    pub object: ObjectId,
    pub center: DateTime<Utc>,
    pub sample_count: usize,
    pub points: Vec<Vec3>,
}

#[derive(Clone, Debug)]
pub struct TrailBuilder {
    pub step_seconds: f64,
}

impl Default for TrailBuilder {
    fn default() -> Self {
        Self {
            step_seconds: DEFAULT_TRAIL_STEP_SECONDS,
        }
    }
}

impl TrailBuilder {
    /// Time offsets, in seconds, of `count` samples centred on zero.
    pub fn offsets(&self, count: usize) -> impl Iterator<Item = f64> + '_ {
        let centre = (count as f64 - 1.0) / 2.0;
        (0..count).map(move |i| (i as f64 - centre) * self.step_seconds)
    }

    /// Propagate `object` at every offset. Instants the propagator cannot
    /// resolve are left out of the trail.
    pub fn build(
        &self,
        object: &TrackedObject,
        at: DateTime<Utc>,
        count: usize,
        propagator: &dyn Propagator,
        frame: &SceneFrame,
    ) -> Trail {
        let points = self
            .offsets(count)
            .filter_map(|offset| {
                let micros = (offset * 1_000_000.0).round() as i64;
                let instant = at + chrono::Duration::microseconds(micros);
                propagate_object(propagator, frame, object, instant).ok()
            })
            .map(|sample| sample.scene)
            .collect();
        Trail {
            object: object.id,
            center: at,
            sample_count: count,
            points,
        }
    }
}

/// The selected object's current trail.
#[derive(Resource, Clone, Debug, Default)]
pub struct TrailCache {
    builder: TrailBuilder,
    trail: Option<Trail>,
    rebuilds: u64,
}

impl TrailCache {
    pub fn new(builder: TrailBuilder) -> Self {
        Self {
            builder,
            trail: None,
            rebuilds: 0,
        }
    }

    pub fn trail(&self) -> Option<&Trail> {
        self.trail.as_ref()
    }

    pub fn rebuilds(&self) -> u64 {
        self.rebuilds
    }

    pub fn clear(&mut self) {
        self.trail = None;
    }

    /// Rebuild when the object, time or sample count differ from the cached
    /// trail. Returns whether the trail was replaced.
    pub fn refresh(
        &mut self,
        object: Option<&TrackedObject>,
        at: DateTime<Utc>,
        count: usize,
        propagator: &dyn Propagator,
        frame: &SceneFrame,
    ) -> bool {
        let Some(object) = object.filter(|_| count > 0) else {
            return self.trail.take().is_some();
        };
        let current = self
            .trail
            .as_ref()
            .is_some_and(|t| t.object == object.id && t.center == at && t.sample_count == count);
        if current {
            return false;
        }
        self.trail = Some(self.builder.build(object, at, count, propagator, frame));
        self.rebuilds += 1;
        true
    }
}

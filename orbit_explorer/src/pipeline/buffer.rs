//! Per-tick position buffer. Not observable: written every tick, read
//! directly by consumers that need zero-lag data.

use std::collections::HashMap;

use bevy::prelude::*;

use crate::data::ObjectId;
use crate::orbit::frame::Geodetic;

/// One object's computed state for one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PositionSample {
    pub scene: Vec3,
    pub geodetic: Geodetic,
    pub speed_km_s: f64,
}

/// Anything that can answer "where is object `id` right now".
pub trait PositionLookup {
    fn position(&self, id: ObjectId) -> Option<Vec3>;
}

#[derive(Resource, Clone, Debug, Default)]
pub struct PositionBuffer {
    samples: HashMap<ObjectId, PositionSample>,
    writes: u64,
}

impl PositionBuffer {
    /// Replace (never merge) the sample for `id`.
    pub fn write(&mut self, id: ObjectId, sample: PositionSample) {
        self.samples.insert(id, sample);
        self.writes += 1;
    }

    pub fn get(&self, id: ObjectId) -> Option<&PositionSample> {
        self.samples.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ObjectId, &PositionSample)> {
        self.samples.iter()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Total number of sample writes since creation.
    pub fn writes(&self) -> u64 {
        self.writes
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

impl PositionLookup for PositionBuffer {
    fn position(&self, id: ObjectId) -> Option<Vec3> {
        self.samples.get(&id).map(|s| s.scene)
    }
}

impl PositionLookup for HashMap<ObjectId, Vec3> {
    fn position(&self, id: ObjectId) -> Option<Vec3> {
        self.get(&id).copied()
    }
}

//! Closest-object detector: linear nearest-neighbour scan over the live
//! buffer, re-run on a wall-clock cadence and guarded against stale results.

use std::time::Duration;

use bevy::prelude::*;

use crate::data::{ObjectId, TrackedObject};
use crate::error::NotReady;
use crate::orbit::frame::SceneFrame;
use crate::pipeline::buffer::PositionLookup;

pub const DEFAULT_CLOSEST_CADENCE: Duration = Duration::from_secs(2);

/// Nearest other object to a selection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Closest {
    pub id: ObjectId,
    /// Scene units.
    pub distance: f32,
    pub distance_km: f64,
}

/// Scan `objects` in catalog order for the object nearest to `selected`.
/// Ties keep the first candidate encountered. Objects without a buffered
/// position are skipped; a missing position for `selected` is `NotReady`.
pub fn find_closest(
    objects: &[TrackedObject],
    positions: &impl PositionLookup,
    selected: ObjectId,
    frame: &SceneFrame,
) -> Result<Option<Closest>, NotReady> {
    let origin = positions.position(selected).ok_or(NotReady(selected))?;

    let mut best: Option<(ObjectId, f32)> = None;
    for object in objects {
        if object.id == selected {
            continue;
        }
        let Some(pos) = positions.position(object.id) else {
            continue;
        };
        let d_sq = origin.distance_squared(pos);
        if best.is_none_or(|(_, best_sq)| d_sq < best_sq) {
            best = Some((object.id, d_sq));
        }
    }

    Ok(best.map(|(id, d_sq)| {
        let distance = d_sq.sqrt();
        Closest {
            id,
            distance,
            distance_km: frame.scene_to_km(distance),
        }
    }))
}

/// Elapsed-time gate evaluated inside the synchronous tick.
#[derive(Clone, Debug)]
pub struct CadenceGate {
    interval: Duration,
    elapsed: Duration,
}

impl CadenceGate {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            elapsed: Duration::ZERO,
        }
    }

    /// A gate whose first `tick` fires immediately.
    pub fn primed(interval: Duration) -> Self {
        Self {
            interval,
            elapsed: interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Accumulate `delta`; true (and restart) once the interval has passed.
    pub fn tick(&mut self, delta: Duration) -> bool {
        self.elapsed += delta;
        if self.elapsed >= self.interval {
            self.elapsed = Duration::ZERO;
            true
        } else {
            false
        }
    }

    pub fn restart(&mut self) {
        self.elapsed = Duration::ZERO;
    }
}

/// A detector answer tagged with the context that requested it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClosestResult {
    pub selected: ObjectId,
    pub generation: u64,
    pub closest: Option<Closest>,
}

/// Owns the recompute cadence and the last accepted answer for the current
/// selection.
#[derive(Resource, Debug)]
pub struct ClosestTracker {
    cadence: CadenceGate,
    target: Option<ObjectId>,
    generation: u64,
    /// `Catalog::generation` the current answer was computed against.
    catalog_generation: u64,
    due: bool,
    current: Option<ClosestResult>,
}

impl ClosestTracker {
    pub fn new(interval: Duration) -> Self {
        Self {
            cadence: CadenceGate::new(interval),
            target: None,
            generation: 0,
            catalog_generation: 0,
            due: false,
            current: None,
        }
    }

    pub fn target(&self) -> Option<ObjectId> {
        self.target
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Follow the current selection. A change invalidates the previous
    /// answer and schedules a scan on the next poll.
    pub fn track(&mut self, selected: Option<ObjectId>) {
        if selected == self.target {
            return;
        }
        self.target = selected;
        self.generation += 1;
        self.current = None;
        self.due = selected.is_some();
        self.cadence.restart();
    }

    /// Invalidate the answer when the catalog was replaced since the last
    /// call. In-flight results of the old catalog are then stale.
    pub fn follow_catalog(&mut self, catalog_generation: u64) {
        if catalog_generation != self.catalog_generation {
            self.catalog_generation = catalog_generation;
            self.invalidate();
        }
    }

    /// Force a rescan on the next poll.
    pub fn invalidate(&mut self) {
        self.generation += 1;
        self.current = None;
        self.due = self.target.is_some();
    }

    /// Run the scan when it is due (new selection, retry, or cadence).
    /// `NotReady` keeps the scan due so it is retried on the next tick.
    pub fn poll(
        &mut self,
        real_delta: Duration,
        objects: &[TrackedObject],
        positions: &impl PositionLookup,
        frame: &SceneFrame,
    ) -> Option<ClosestResult> {
        let cadence_fired = self.cadence.tick(real_delta);
        let selected = self.target?;
        if !self.due && !cadence_fired {
            return None;
        }

        match find_closest(objects, positions, selected, frame) {
            Ok(closest) => {
                self.due = false;
                Some(ClosestResult {
                    selected,
                    generation: self.generation,
                    closest,
                })
            }
            Err(NotReady(_)) => {
                self.due = true;
                None
            }
        }
    }

    /// Store `result` if it still belongs to the current selection.
    /// Stale answers are dropped and `false` is returned.
    pub fn accept(&mut self, result: ClosestResult) -> bool {
        if self.target != Some(result.selected) || self.generation != result.generation {
            return false;
        }
        self.current = Some(result);
        true
    }

    /// The accepted answer for the current selection, if any.
    pub fn current(&self) -> Option<&Closest> {
        self.current
            .as_ref()
            .filter(|r| Some(r.selected) == self.target)
            .and_then(|r| r.closest.as_ref())
    }

    pub fn is_resolved(&self) -> bool {
        self.current.is_some()
    }
}

impl Default for ClosestTracker {
    fn default() -> Self {
        Self::new(DEFAULT_CLOSEST_CADENCE)
    }
}

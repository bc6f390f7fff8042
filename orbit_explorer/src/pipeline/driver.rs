//! Propagation driver: every object, every tick, into the position buffer.

use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};

use bevy::log::debug;
use bevy::prelude::*;
use chrono::{DateTime, Utc};

use crate::data::{ObjectId, TrackedObject};
use crate::error::PropagationError;
use crate::orbit::frame::SceneFrame;
use crate::orbit::propagator::Propagator;
use crate::pipeline::buffer::{PositionBuffer, PositionSample};

/// Outcome of one propagation tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickReport {
    pub updated: usize,
    pub failed: Vec<(ObjectId, PropagationError)>,
    /// The tick reused the previous positions because time did not move.
    pub skipped: bool,
}

/// Propagate one object and map it into the scene.
/// A panic inside the propagator is contained and reported as a failure.
pub fn propagate_object(
    propagator: &dyn Propagator,
    frame: &SceneFrame,
    object: &TrackedObject,
    at: DateTime<Utc>,
) -> Result<PositionSample, PropagationError> {
    panic::catch_unwind(AssertUnwindSafe(|| {
        let state = propagator.propagate(object.id, &object.elements, at)?;
        let geodetic = propagator.geodetic_from_inertial(state.position_km, at);
        Ok(PositionSample {
            scene: frame.to_scene(&geodetic),
            geodetic,
            speed_km_s: state.velocity_km_s.length(),
        })
    }))
    .unwrap_or(Err(PropagationError::Panicked))
}

#[derive(Resource, Debug)]
pub struct PropagationDriver {
    frame: SceneFrame,
    last_time: Option<DateTime<Utc>>,
    reported: HashSet<ObjectId>,
    last_report: TickReport,
}

impl PropagationDriver {
    pub fn new(frame: SceneFrame) -> Self {
        Self {
            frame,
            last_time: None,
            reported: HashSet::new(),
            last_report: TickReport::default(),
        }
    }

    pub fn frame(&self) -> &SceneFrame {
        &self.frame
    }

    pub fn last_report(&self) -> &TickReport {
        &self.last_report
    }

    /// Forget the last propagated instant; the next tick always runs.
    pub fn reset(&mut self) {
        self.last_time = None;
        self.reported.clear();
        self.last_report = TickReport::default();
    }

    /// Overwrite buffer entries for every object whose propagation succeeds.
    /// Failed objects keep their previous (stale) sample.
    pub fn advance(
        &mut self,
        objects: &[TrackedObject],
        at: DateTime<Utc>,
        propagator: &dyn Propagator,
        buffer: &mut PositionBuffer,
    ) -> &TickReport {
        if self.last_time == Some(at) {
            self.last_report.skipped = true;
            return &self.last_report;
        }

        let mut report = TickReport::default();
        for object in objects {
            match propagate_object(propagator, &self.frame, object, at) {
                Ok(sample) => {
                    buffer.write(object.id, sample);
                    report.updated += 1;
                }
                Err(err) => {
                    if self.reported.insert(object.id) {
                        debug!("propagation: skipping {} ({}): {err}", object.name, object.id);
                    }
                    report.failed.push((object.id, err));
                }
            }
        }

        self.last_time = Some(at);
        self.last_report = report;
        &self.last_report
    }
}

impl Default for PropagationDriver {
    fn default() -> Self {
        Self::new(SceneFrame::default())
    }
}

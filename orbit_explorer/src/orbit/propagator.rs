//! Orbital propagation seam. The SGP4 implementation caches initialised
//! element sets per catalog id so each tick only pays for the propagation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use bevy::math::DVec3;
use bevy::prelude::Resource;
use chrono::{DateTime, Utc};
use sgp4::{Constants, Elements, MinutesSinceEpoch};

use crate::data::{ObjectId, OrbitalElements};
use crate::error::PropagationError;
use crate::orbit::frame::{ecef_to_geodetic, greenwich_mean_sidereal_time, inertial_to_ecef, Geodetic};

/// Inertial position (km) and velocity (km/s).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StateVector {
    pub position_km: DVec3,
    pub velocity_km_s: DVec3,
}

/// Pure function of (elements, time) from the caller's point of view.
pub trait Propagator: Send + Sync + 'static {
    fn propagate(
        &self,
        id: ObjectId,
        elements: &OrbitalElements,
        at: DateTime<Utc>,
    ) -> Result<StateVector, PropagationError>;

    fn geodetic_from_inertial(&self, position_km: DVec3, at: DateTime<Utc>) -> Geodetic {
        ecef_to_geodetic(inertial_to_ecef(
            position_km,
            greenwich_mean_sidereal_time(at),
        ))
    }

    /// Drop any per-object state, e.g. after a catalog reload.
    fn forget(&self) {}
}

#[derive(Resource)]
pub struct PropagatorResource(pub Box<dyn Propagator>);

impl PropagatorResource {
    pub fn new(propagator: impl Propagator) -> Self {
        Self(Box::new(propagator))
    }
}

struct Sgp4Orbit {
    constants: Constants,
    epoch: DateTime<Utc>,
}

type CachedOrbit = Arc<Result<Sgp4Orbit, PropagationError>>;

/// SGP4/SDP4 propagator backed by the `sgp4` crate.
#[derive(Default)]
pub struct Sgp4Propagator {
    orbits: RwLock<HashMap<ObjectId, CachedOrbit>>,
}

impl Sgp4Propagator {
    pub fn new() -> Self {
        Self::default()
    }

    fn orbit(&self, id: ObjectId, elements: &OrbitalElements) -> CachedOrbit {
        if let Ok(orbits) = self.orbits.read() {
            if let Some(orbit) = orbits.get(&id) {
                return Arc::clone(orbit);
            }
        }
        let orbit = Arc::new(init_orbit(elements));
        if let Ok(mut orbits) = self.orbits.write() {
            orbits.insert(id, Arc::clone(&orbit));
        }
        orbit
    }
}

fn init_orbit(elements: &OrbitalElements) -> Result<Sgp4Orbit, PropagationError> {
    let parsed = Elements::from_tle(
        None,
        elements.line1.as_bytes(),
        elements.line2.as_bytes(),
    )
    .map_err(|e| PropagationError::InvalidElements(e.to_string()))?;
    let constants = Constants::from_elements(&parsed)
        .map_err(|e| PropagationError::InvalidElements(e.to_string()))?;
    Ok(Sgp4Orbit {
        constants,
        epoch: parsed.datetime.and_utc(),
    })
}

impl Propagator for Sgp4Propagator {
    fn propagate(
        &self,
        id: ObjectId,
        elements: &OrbitalElements,
        at: DateTime<Utc>,
    ) -> Result<StateVector, PropagationError> {
        let orbit = self.orbit(id, elements);
        let orbit = orbit.as_ref().as_ref().map_err(Clone::clone)?;

        let minutes = (at - orbit.epoch).num_milliseconds() as f64 / 60_000.0;
        let prediction = orbit
            .constants
            .propagate(MinutesSinceEpoch(minutes))
            .map_err(|e| PropagationError::Diverged(e.to_string()))?;

        let position_km = DVec3::from_array(prediction.position);
        let velocity_km_s = DVec3::from_array(prediction.velocity);
        if !position_km.is_finite() || !velocity_km_s.is_finite() {
            return Err(PropagationError::Diverged("non-finite state".into()));
        }
        Ok(StateVector {
            position_km,
            velocity_km_s,
        })
    }

    fn forget(&self) {
        if let Ok(mut orbits) = self.orbits.write() {
            orbits.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const ISS_L1: &str = "1 25544U 98067A   08264.51782528 -.00002182  00000-0 -11606-4 0  2927";
    const ISS_L2: &str = "2 25544  51.6416 247.4627 0006703 130.5360 325.0288 15.72125391563537";

    fn iss() -> OrbitalElements {
        OrbitalElements::new(ISS_L1, ISS_L2)
    }

    fn tle_epoch() -> DateTime<Utc> {
        // Day 264.51782528 of 2008.
        Utc.with_ymd_and_hms(2008, 9, 20, 12, 25, 40).unwrap()
    }

    #[test]
    fn iss_altitude_and_speed_are_plausible() {
        let propagator = Sgp4Propagator::new();
        let state = propagator
            .propagate(ObjectId(25544), &iss(), tle_epoch())
            .unwrap();

        let radius = state.position_km.length();
        assert!((6600.0..7000.0).contains(&radius), "radius {radius}");
        let speed = state.velocity_km_s.length();
        assert!((7.0..8.0).contains(&speed), "speed {speed}");

        let geo = propagator.geodetic_from_inertial(state.position_km, tle_epoch());
        assert!((300.0..500.0).contains(&geo.altitude_km), "alt {}", geo.altitude_km);
        assert!(geo.latitude_deg.abs() <= 51.7);
    }

    #[test]
    fn propagation_is_deterministic() {
        let propagator = Sgp4Propagator::new();
        let t = tle_epoch() + chrono::Duration::minutes(42);
        let a = propagator.propagate(ObjectId(25544), &iss(), t).unwrap();
        let b = propagator.propagate(ObjectId(25544), &iss(), t).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn malformed_elements_fail_without_panicking() {
        let propagator = Sgp4Propagator::new();
        let bad = OrbitalElements::new("1 garbage", "2 garbage");
        let err = propagator
            .propagate(ObjectId(1), &bad, tle_epoch())
            .unwrap_err();
        assert!(matches!(err, PropagationError::InvalidElements(_)));
        // Cached failure is reported again, not re-parsed into a panic.
        assert!(propagator.propagate(ObjectId(1), &bad, tle_epoch()).is_err());
    }

    #[test]
    fn forget_drops_cached_orbits() {
        let propagator = Sgp4Propagator::new();
        let bad = OrbitalElements::new("1 garbage", "2 garbage");
        assert!(propagator.propagate(ObjectId(25544), &bad, tle_epoch()).is_err());
        propagator.forget();
        assert!(propagator
            .propagate(ObjectId(25544), &iss(), tle_epoch())
            .is_ok());
    }
}

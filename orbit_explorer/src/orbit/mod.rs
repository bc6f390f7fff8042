//! Time and orbital mechanics: the simulated clock, frame conversions and
//! the propagator seam.

pub mod clock;
pub mod frame;
pub mod propagator;

pub use clock::SimClock;
pub use frame::{Geodetic, SceneFrame};
pub use propagator::{Propagator, PropagatorResource, Sgp4Propagator, StateVector};

//! Minimal prelude for SDK consumers.

pub use crate::config::ExplorerConfig;
pub use crate::data::{CatalogSource, FetcherConfig, ObjectId, TrackedObject};
pub use crate::interaction::{SelectionState, UserIntent, VisitTarget};
pub use crate::orbit::{Propagator, Sgp4Propagator};
pub use crate::render::{MarkerRenderer, ObjectRenderer};
pub use crate::sdk::OrbitExplorerBuilder;

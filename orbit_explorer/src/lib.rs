//! Orbit explorer: a real-time 3D view of tracked objects around the Earth.
//!
//! Library root: catalog data, orbit math, the position pipeline, camera and
//! interaction state, plus the SDK builder that wires them into a Bevy app.

pub mod camera;
pub mod config;
pub mod data;
pub mod error;
pub mod interaction;
pub mod orbit;
pub mod pipeline;
pub mod pointing;
pub mod render;
pub mod scene;
pub mod ui;

pub mod prelude;
pub mod sdk;

pub use data::celestrak::HttpCatalogFetcher;
pub use data::{CatalogFetcher, CatalogPayload, CatalogSource, FetcherConfig, TrackedObject};

//! Error types shared across the pipeline, catalog and configuration layers.

use thiserror::Error;

use crate::data::ObjectId;

/// Failure to resolve one object at one instant. Never fatal: the driver
/// skips the object for the tick and keeps its previous sample.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PropagationError {
    #[error("invalid orbital elements: {0}")]
    InvalidElements(String),
    #[error("propagation diverged: {0}")]
    Diverged(String),
    #[error("propagator panicked")]
    Panicked,
}

/// Catalog fetch or decode failure. The session keeps an empty catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("failed to decode catalog records: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("no usable records in catalog response")]
    Empty,
}

/// An environment value that could not be parsed.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid value for {key}: {value:?}")]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
}

/// A position lookup found no buffered sample yet. Callers retry on a
/// later tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("position of object {0} not ready")]
pub struct NotReady(pub ObjectId);

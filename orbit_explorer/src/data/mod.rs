pub mod celestrak;
mod channel;
mod model;
mod search;

use std::path::PathBuf;

use crossbeam_channel::Receiver;
use url::Url;

use crate::error::CatalogError;

pub use channel::{init_catalog_channel, init_fixture_channel, CatalogChannel};
pub use model::{Classification, ObjectId, ObjectType, OrbitalElements, TrackedObject};
pub use search::CatalogFilter;

/// What a fetcher delivers: the whole catalog snapshot, or why there is none.
pub type CatalogPayload = Result<Vec<TrackedObject>, CatalogError>;

/// Where the catalog snapshot comes from.
#[derive(Clone, Debug, PartialEq)]
pub enum CatalogSource {
    Http(Url),
    Fixture(PathBuf),
}

/// Configuration for spawning a catalog fetcher.
#[derive(Clone, Debug, PartialEq)]
pub struct FetcherConfig {
    pub source: CatalogSource,
    pub max_objects: usize,
}

/// Interface for catalog fetchers. A fetcher answers exactly once.
pub trait CatalogFetcher: Send + 'static {
    fn spawn(config: FetcherConfig) -> Receiver<CatalogPayload>;
}

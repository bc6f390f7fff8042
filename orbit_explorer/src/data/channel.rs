use std::path::Path;

use crossbeam_channel::Receiver;

use crate::data::celestrak::HttpCatalogFetcher;
use crate::data::{CatalogFetcher, CatalogPayload, CatalogSource, FetcherConfig};

/// Bevy resource holding the channel from the catalog fetcher thread.
/// Drained by `ingest_catalog`; replaced when a reload is requested.
#[derive(bevy::prelude::Resource)]
pub struct CatalogChannel(pub Receiver<CatalogPayload>);

/// Create a catalog channel and spawn the fetcher on a dedicated thread.
pub fn init_catalog_channel(config: FetcherConfig) -> CatalogChannel {
    CatalogChannel(HttpCatalogFetcher::spawn(config))
}

/// Create a catalog channel that replays a recorded catalog file
/// (JSON records or TLE text).
pub fn init_fixture_channel(path: &Path, max_objects: usize) -> CatalogChannel {
    init_catalog_channel(FetcherConfig {
        source: CatalogSource::Fixture(path.to_path_buf()),
        max_objects,
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::error::CatalogError;

    #[test]
    fn missing_fixture_reports_io_error() {
        let channel = init_fixture_channel(Path::new("/nonexistent/catalog.json"), 10);
        let payload = channel
            .0
            .recv_timeout(Duration::from_secs(5))
            .expect("fetcher should always answer once");
        assert!(matches!(payload, Err(CatalogError::Io { .. })));
    }

    #[test]
    fn fixture_file_is_parsed() {
        let dir = std::env::temp_dir().join("orbit_explorer_channel_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("catalog.tle");
        std::fs::write(
            &path,
            "ISS (ZARYA)\n\
             1 25544U 98067A   08264.51782528 -.00002182  00000-0 -11606-4 0  2927\n\
             2 25544  51.6416 247.4627 0006703 130.5360 325.0288 15.72125391563537\n",
        )
        .unwrap();

        let channel = init_fixture_channel(&path, 10);
        let objects = channel
            .0
            .recv_timeout(Duration::from_secs(5))
            .unwrap()
            .unwrap();
        assert_eq!(objects.len(), 1);
    }
}

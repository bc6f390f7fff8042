//! Env parsing and defaults.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use bevy::log::warn;
use serde::Deserialize;
use url::Url;

use crate::data::{CatalogSource, FetcherConfig};
use crate::error::ConfigError;
use crate::orbit::Geodetic;
use crate::pipeline::closest::DEFAULT_CLOSEST_CADENCE;
use crate::pipeline::store::DEFAULT_SYNC_INTERVAL;

pub const DEFAULT_CATALOG_URL: &str =
    "https://celestrak.org/NORAD/elements/gp.php?GROUP=active&FORMAT=tle";
pub const DEFAULT_MAX_OBJECTS: usize = 5000;

/// Fixed ground location used for pointing output.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct ObserverConfig {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    #[serde(default)]
    pub altitude_km: f64,
}

impl ObserverConfig {
    pub fn geodetic(&self) -> Geodetic {
        Geodetic {
            latitude_deg: self.latitude_deg,
            longitude_deg: self.longitude_deg,
            altitude_km: self.altitude_km,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
    pub catalog_url: Url,
    /// Replaces the HTTP source when set.
    pub catalog_fixture: Option<PathBuf>,
    pub max_objects: usize,
    pub sync_interval_frames: u32,
    pub closest_cadence_secs: f64,
    pub observer: Option<ObserverConfig>,
    pub pointer_addr: Option<SocketAddr>,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            catalog_url: default_catalog_url(),
            catalog_fixture: None,
            max_objects: DEFAULT_MAX_OBJECTS,
            sync_interval_frames: DEFAULT_SYNC_INTERVAL,
            closest_cadence_secs: DEFAULT_CLOSEST_CADENCE.as_secs_f64(),
            observer: None,
            pointer_addr: None,
        }
    }
}

fn default_catalog_url() -> Url {
    match Url::parse(DEFAULT_CATALOG_URL) {
        Ok(url) => url,
        Err(err) => unreachable!("default catalog URL is valid: {err}"),
    }
}

impl ExplorerConfig {
    /// Read every setting from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unset keys keep their default;
    /// unparsable ones log a warning and keep their default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let get = |key: &'static str| lookup(key).filter(|v| !v.trim().is_empty());

        let observer = match (get("OBSERVER_LAT"), get("OBSERVER_LON")) {
            (Some(lat), Some(lon)) => {
                let latitude_deg = parse_or_warn("OBSERVER_LAT", &lat, None);
                let longitude_deg = parse_or_warn("OBSERVER_LON", &lon, None);
                latitude_deg.zip(longitude_deg).map(|(latitude_deg, longitude_deg)| ObserverConfig {
                    latitude_deg,
                    longitude_deg,
                    altitude_km: get("OBSERVER_ALT_KM")
                        .and_then(|raw| parse_or_warn("OBSERVER_ALT_KM", &raw, Some(0.0)))
                        .unwrap_or(0.0),
                })
            }
            (None, None) => None,
            _ => {
                warn!("config: OBSERVER_LAT and OBSERVER_LON must be set together");
                None
            }
        };

        Self {
            catalog_url: get("CATALOG_URL")
                .and_then(|raw| parse_or_warn("CATALOG_URL", &raw, Some(defaults.catalog_url.clone())))
                .unwrap_or(defaults.catalog_url),
            catalog_fixture: get("CATALOG_FIXTURE").map(PathBuf::from),
            max_objects: get("MAX_OBJECTS")
                .and_then(|raw| parse_or_warn("MAX_OBJECTS", &raw, Some(defaults.max_objects)))
                .filter(|&n| n > 0)
                .unwrap_or(defaults.max_objects),
            sync_interval_frames: get("SYNC_INTERVAL_FRAMES")
                .and_then(|raw| {
                    parse_or_warn("SYNC_INTERVAL_FRAMES", &raw, Some(defaults.sync_interval_frames))
                })
                .filter(|&n| n > 0)
                .unwrap_or(defaults.sync_interval_frames),
            closest_cadence_secs: get("CLOSEST_CADENCE_SECS")
                .and_then(|raw| {
                    parse_or_warn("CLOSEST_CADENCE_SECS", &raw, Some(defaults.closest_cadence_secs))
                })
                .unwrap_or(defaults.closest_cadence_secs),
            observer,
            pointer_addr: get("POINTER_ADDR").and_then(|raw| parse_or_warn("POINTER_ADDR", &raw, None)),
        }
    }

    /// Fixture replay wins over the HTTP source.
    pub fn fetcher_config(&self) -> FetcherConfig {
        let source = match &self.catalog_fixture {
            Some(path) => CatalogSource::Fixture(path.clone()),
            None => CatalogSource::Http(self.catalog_url.clone()),
        };
        FetcherConfig {
            source,
            max_objects: self.max_objects,
        }
    }

    /// Non-positive or non-finite values fall back to the default cadence.
    pub fn closest_cadence(&self) -> Duration {
        Duration::try_from_secs_f64(self.closest_cadence_secs)
            .ok()
            .filter(|d| !d.is_zero())
            .unwrap_or(DEFAULT_CLOSEST_CADENCE)
    }

    pub fn observer(&self) -> Option<Geodetic> {
        self.observer.map(|o| o.geodetic())
    }
}

pub fn parse_var<T: FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError {
        key,
        value: raw.to_string(),
    })
}

fn parse_or_warn<T: FromStr>(key: &'static str, raw: &str, fallback: Option<T>) -> Option<T> {
    match parse_var(key, raw) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!("config: {err}; using default");
            fallback
        }
    }
}

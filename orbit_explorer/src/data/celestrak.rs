//! Catalog fetcher: dedicated thread + ureq → Vec<TrackedObject>.

use std::collections::HashSet;
use std::thread;
use std::time::Duration;

use bevy::log::{info, warn};
use crossbeam_channel::{Receiver, Sender};
use serde::Deserialize;
use url::Url;

use crate::data::model::{Classification, ObjectId, ObjectType, OrbitalElements, TrackedObject};
use crate::data::{CatalogFetcher, CatalogPayload, CatalogSource, FetcherConfig};
use crate::error::CatalogError;

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// One-shot HTTP catalog fetcher (CelesTrak GP JSON or 3-line TLE text).
pub struct HttpCatalogFetcher;

impl CatalogFetcher for HttpCatalogFetcher {
    fn spawn(config: FetcherConfig) -> Receiver<CatalogPayload> {
        let (tx, rx) = crossbeam_channel::bounded(1);
        thread::spawn(move || {
            let result = match &config.source {
                CatalogSource::Http(url) => fetch_catalog(url, config.max_objects),
                CatalogSource::Fixture(path) => std::fs::read_to_string(path)
                    .map_err(|source| CatalogError::Io {
                        path: path.display().to_string(),
                        source,
                    })
                    .and_then(|body| parse_catalog(&body, config.max_objects)),
            };
            send_result(result, &tx);
        });
        rx
    }
}

fn send_result(result: CatalogPayload, tx: &Sender<CatalogPayload>) {
    match &result {
        Ok(objects) => info!("catalog: loaded {} objects", objects.len()),
        Err(err) => warn!("catalog: fetch failed: {err}"),
    }
    // Receiver gone means the app shut down before the fetch finished.
    let _ = tx.send(result);
}

fn fetch_catalog(url: &Url, max_objects: usize) -> CatalogPayload {
    info!("catalog: fetching {url}");
    let agent = ureq::AgentBuilder::new().timeout(HTTP_TIMEOUT).build();
    let response = agent
        .get(url.as_str())
        .call()
        .map_err(|e| CatalogError::Http(e.to_string()))?;
    let body = response
        .into_string()
        .map_err(|e| CatalogError::Http(format!("read error: {e}")))?;
    parse_catalog(&body, max_objects)
}

/// A catalog record as served by GP-style JSON endpoints.
#[derive(Debug, Deserialize)]
struct CatalogRecord {
    #[serde(alias = "OBJECT_NAME", alias = "displayName")]
    name: String,
    #[serde(alias = "NORAD_CAT_ID", alias = "catalogId")]
    catalog_id: u64,
    #[serde(alias = "TLE_LINE1", alias = "orbitalElementLine1")]
    line1: String,
    #[serde(alias = "TLE_LINE2", alias = "orbitalElementLine2")]
    line2: String,
    #[serde(default, alias = "OBJECT_TYPE", alias = "objectType")]
    object_type: Option<String>,
    #[serde(default, alias = "COUNTRY_CODE", alias = "COUNTRY")]
    country: Option<String>,
    #[serde(default, alias = "LAUNCH_DATE", alias = "launchDate")]
    launch_date: Option<String>,
    #[serde(default)]
    group: Option<String>,
}

impl CatalogRecord {
    fn into_object(self) -> TrackedObject {
        let classification = Classification {
            object_type: self.object_type.as_deref().map(ObjectType::parse),
            country: self.country,
            launch_date: self.launch_date,
            group: self.group,
        };
        let classification = (classification != Classification::default()).then_some(classification);
        TrackedObject {
            id: ObjectId(self.catalog_id),
            name: self.name.trim().to_string(),
            elements: OrbitalElements::new(self.line1.trim(), self.line2.trim()),
            classification,
        }
    }
}

/// Decode a catalog body. JSON arrays and 3-line TLE text are both accepted.
/// Duplicate ids keep their first record; the result is capped at `max_objects`.
pub fn parse_catalog(body: &str, max_objects: usize) -> CatalogPayload {
    let candidates = if body.trim_start().starts_with('[') {
        let records: Vec<CatalogRecord> = serde_json::from_str(body)?;
        records.into_iter().map(CatalogRecord::into_object).collect()
    } else {
        parse_tle_text(body)
    };

    let mut seen = HashSet::new();
    let objects: Vec<TrackedObject> = candidates
        .into_iter()
        .filter(|o| o.elements.looks_valid())
        .filter(|o| seen.insert(o.id))
        .take(max_objects)
        .collect();

    if objects.is_empty() {
        Err(CatalogError::Empty)
    } else {
        Ok(objects)
    }
}

fn parse_tle_text(data: &str) -> Vec<TrackedObject> {
    let lines: Vec<&str> = data.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    let mut objects = Vec::new();

    let mut i = 0;
    while i + 1 < lines.len() {
        let (name, line1, line2, consumed) = if lines[i].starts_with('1')
            && lines.get(i + 1).is_some_and(|l| l.starts_with('2'))
        {
            (None, lines[i], lines[i + 1], 2)
        } else if i + 2 < lines.len()
            && lines[i + 1].starts_with('1')
            && lines[i + 2].starts_with('2')
        {
            (Some(lines[i]), lines[i + 1], lines[i + 2], 3)
        } else {
            i += 1;
            continue;
        };

        if let Some(id) = catalog_number(line1) {
            let name = name
                .map(|n| n.trim_start_matches("0 ").to_string())
                .unwrap_or_else(|| format!("NORAD {id}"));
            objects.push(TrackedObject {
                id: ObjectId(id),
                name,
                elements: OrbitalElements::new(line1, line2),
                classification: None,
            });
        }
        i += consumed;
    }
    objects
}

/// Columns 3 to 7 of line 1 hold the catalog number.
fn catalog_number(line1: &str) -> Option<u64> {
    line1.get(2..7)?.trim().parse().ok()
}

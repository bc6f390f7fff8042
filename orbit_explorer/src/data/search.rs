//! Search and filter predicates over catalog metadata.

use bevy::prelude::*;

use crate::data::{ObjectType, TrackedObject};

/// Current search box contents and facet filters.
#[derive(Resource, Clone, Debug, Default, PartialEq)]
pub struct CatalogFilter {
    pub text: String,
    pub object_type: Option<ObjectType>,
    pub country: Option<String>,
}

impl CatalogFilter {
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty() && self.object_type.is_none() && self.country.is_none()
    }

    /// Case-insensitive match on name or catalog number, then facets.
    pub fn matches(&self, object: &TrackedObject) -> bool {
        let needle = self.text.trim().to_lowercase();
        if !needle.is_empty() {
            let by_name = object.name.to_lowercase().contains(&needle);
            let by_id = object.id.0.to_string().starts_with(&needle);
            if !by_name && !by_id {
                return false;
            }
        }

        if let Some(wanted) = self.object_type {
            if object.object_type() != wanted {
                return false;
            }
        }

        if let Some(ref wanted) = self.country {
            let country = object
                .classification
                .as_ref()
                .and_then(|c| c.country.as_deref());
            if !country.is_some_and(|c| c.eq_ignore_ascii_case(wanted)) {
                return false;
            }
        }

        true
    }

    /// Matching objects in catalog order, at most `limit`.
    pub fn apply<'a>(&self, objects: &'a [TrackedObject], limit: usize) -> Vec<&'a TrackedObject> {
        objects
            .iter()
            .filter(|o| self.matches(o))
            .take(limit)
            .collect()
    }
}

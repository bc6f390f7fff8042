// Catalog-agnostic object model.
// Wire formats stay in celestrak.rs; conversion happens there.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique catalog key (NORAD catalog number).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub u64);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The two lines of a two-line element set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrbitalElements {
    pub line1: String,
    pub line2: String,
}

impl OrbitalElements {
    pub fn new(line1: impl Into<String>, line2: impl Into<String>) -> Self {
        Self {
            line1: line1.into(),
            line2: line2.into(),
        }
    }

    /// Cheap shape check; full validation is left to the propagator.
    pub fn looks_valid(&self) -> bool {
        self.line1.starts_with('1') && self.line2.starts_with('2')
    }
}

/// Optional metadata used for search, filtering and marker colour.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub object_type: Option<ObjectType>,
    pub country: Option<String>,
    pub launch_date: Option<String>,
    pub group: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectType {
    Payload,
    RocketBody,
    Debris,
    Unknown,
}

impl ObjectType {
    /// Parses SATCAT-style codes and long names alike.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "PAY" | "PAYLOAD" => Self::Payload,
            "R/B" | "ROCKET BODY" | "ROCKET_BODY" => Self::RocketBody,
            "DEB" | "DEBRIS" => Self::Debris,
            _ => Self::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Payload => "Payload",
            Self::RocketBody => "Rocket body",
            Self::Debris => "Debris",
            Self::Unknown => "Unknown",
        }
    }
}

/// A trackable object. Immutable for the lifetime of a catalog snapshot.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackedObject {
    pub id: ObjectId,
    pub name: String,
    pub elements: OrbitalElements,
    pub classification: Option<Classification>,
}

impl TrackedObject {
    pub fn object_type(&self) -> ObjectType {
        self.classification
            .as_ref()
            .and_then(|c| c.object_type)
            .unwrap_or(ObjectType::Unknown)
    }
}

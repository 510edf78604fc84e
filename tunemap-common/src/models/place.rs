//! Place model
//!
//! A place is a named location reduced to a single representative point.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::Tune;

/// Kind of settlement a place represents (OSM `place` tag)
///
/// The four queried kinds get their own variants. Any other tag value the
/// source returns (`townland`, `city_block`, ...) is carried through as is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PlaceCategory {
    City,
    Town,
    Village,
    Island,
    Other(String),
}

impl PlaceCategory {
    /// Tag value as stored in OpenStreetMap
    pub fn as_str(&self) -> &str {
        match self {
            PlaceCategory::City => "city",
            PlaceCategory::Town => "town",
            PlaceCategory::Village => "village",
            PlaceCategory::Island => "island",
            PlaceCategory::Other(tag) => tag,
        }
    }
}

impl fmt::Display for PlaceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for PlaceCategory {
    fn from(tag: &str) -> Self {
        match tag {
            "city" => PlaceCategory::City,
            "town" => PlaceCategory::Town,
            "village" => PlaceCategory::Village,
            "island" => PlaceCategory::Island,
            other => PlaceCategory::Other(other.to_string()),
        }
    }
}

impl From<String> for PlaceCategory {
    fn from(tag: String) -> Self {
        PlaceCategory::from(tag.as_str())
    }
}

impl From<PlaceCategory> for String {
    fn from(category: PlaceCategory) -> Self {
        match category {
            PlaceCategory::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

/// Normalized place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    /// Primary name (may hold two forms separated by `/`, e.g. "Londonderry/Derry")
    pub name: String,
    /// Irish-language name, when tagged
    #[serde(rename = "name:ga", default, skip_serializing_if = "Option::is_none")]
    pub local_name: Option<String>,
    /// Settlement kind; absent when the feature had no `place` tag
    #[serde(rename = "place", default, skip_serializing_if = "Option::is_none")]
    pub category: Option<PlaceCategory>,
    /// `[longitude, latitude]`
    pub coordinates: [f64; 2],
}

impl Place {
    pub fn new(name: impl Into<String>, category: PlaceCategory, coordinates: [f64; 2]) -> Self {
        Self {
            name: name.into(),
            local_name: None,
            category: Some(category),
            coordinates,
        }
    }

    pub fn with_local_name(mut self, local_name: impl Into<String>) -> Self {
        self.local_name = Some(local_name.into());
        self
    }

    pub fn longitude(&self) -> f64 {
        self.coordinates[0]
    }

    pub fn latitude(&self) -> f64 {
        self.coordinates[1]
    }
}

/// Place with the tunes whose names reference it
///
/// Only places with at least one tune are ever built by the merge step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedPlace {
    #[serde(flatten)]
    pub place: Place,
    pub tunes: Vec<Tune>,
}

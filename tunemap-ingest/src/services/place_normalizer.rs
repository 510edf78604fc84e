//! Place Normalizer
//!
//! Reduces raw geographic features to [`Place`]s: one point per feature and the
//! three recognized tags (`name`, `name:ga`, `place`). Features that cannot be
//! reduced are dropped; normalizing a collection never fails.

use thiserror::Error;
use tunemap_common::geojson::RawFeature;
use tunemap_common::{Place, PlaceCategory};

/// Why a raw feature was left out
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("feature has no name")]
    MissingName,

    #[error("feature geometry is missing or unsupported")]
    UnusableGeometry,
}

/// Normalize a single feature
///
/// **Algorithm:**
/// 1. Require a non-empty `name` tag
/// 2. Reduce the geometry to its center point (points pass through)
/// 3. Keep `place` as given and `name:ga` only when non-empty
pub fn normalize_feature(feature: &RawFeature) -> Result<Place, Rejection> {
    let name = match feature.tag("name") {
        Some(name) if !name.is_empty() => name,
        _ => return Err(Rejection::MissingName),
    };

    let coordinates = feature
        .parsed_geometry()
        .and_then(|geometry| geometry.center())
        .ok_or(Rejection::UnusableGeometry)?;

    let local_name = feature
        .tag("name:ga")
        .filter(|local| !local.is_empty())
        .map(str::to_string);
    let category = feature
        .tag("place")
        .filter(|tag| !tag.is_empty())
        .map(PlaceCategory::from);

    Ok(Place {
        name: name.to_string(),
        local_name,
        category,
        coordinates,
    })
}

/// Normalize a feature collection, preserving order and silently dropping
/// features that cannot be reduced
pub fn normalize_places(features: &[RawFeature]) -> Vec<Place> {
    let mut places = Vec::with_capacity(features.len());
    let mut rejected = 0usize;

    for (index, feature) in features.iter().enumerate() {
        match normalize_feature(feature) {
            Ok(place) => places.push(place),
            Err(reason) => {
                rejected += 1;
                tracing::trace!(index, reason = %reason, "Dropping raw feature");
            }
        }
    }

    tracing::info!(
        kept = places.len(),
        rejected,
        "Normalized place features"
    );

    places
}

//! Minimal GeoJSON types
//!
//! Covers what the pipeline reads and writes: feature collections of points for
//! normalized places, and loosely-typed raw features coming from the geographic source.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{EnrichedPlace, Place, PlaceCategory, Tune};
use crate::{Error, Result};

/// GeoJSON position: `[longitude, latitude, ...]`
pub type Position = Vec<f64>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FeatureTag {
    #[default]
    Feature,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FeatureCollectionTag {
    #[default]
    FeatureCollection,
}

/// Supported geometry kinds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point { coordinates: Position },
    LineString { coordinates: Vec<Position> },
    Polygon { coordinates: Vec<Vec<Position>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Position>>> },
}

impl Geometry {
    pub fn point(longitude: f64, latitude: f64) -> Self {
        Geometry::Point {
            coordinates: vec![longitude, latitude],
        }
    }

    fn positions(&self) -> Box<dyn Iterator<Item = &Position> + '_> {
        match self {
            Geometry::Point { coordinates } => Box::new(std::iter::once(coordinates)),
            Geometry::LineString { coordinates } => Box::new(coordinates.iter()),
            Geometry::Polygon { coordinates } => Box::new(coordinates.iter().flatten()),
            Geometry::MultiPolygon { coordinates } => {
                Box::new(coordinates.iter().flatten().flatten())
            }
        }
    }

    /// Representative point as `[lon, lat]`
    ///
    /// Points are returned as-is; other shapes collapse to the center of the
    /// bounding box of all their positions. `None` when no usable position exists.
    pub fn center(&self) -> Option<[f64; 2]> {
        if let Geometry::Point { coordinates } = self {
            return match coordinates.as_slice() {
                [lon, lat, ..] if lon.is_finite() && lat.is_finite() => Some([*lon, *lat]),
                _ => None,
            };
        }

        let mut bbox: Option<[f64; 4]> = None;
        for position in self.positions() {
            let (lon, lat) = match position.as_slice() {
                [lon, lat, ..] if lon.is_finite() && lat.is_finite() => (*lon, *lat),
                _ => continue,
            };
            bbox = Some(match bbox {
                None => [lon, lat, lon, lat],
                Some([min_lon, min_lat, max_lon, max_lat]) => [
                    min_lon.min(lon),
                    min_lat.min(lat),
                    max_lon.max(lon),
                    max_lat.max(lat),
                ],
            });
        }

        bbox.map(|[min_lon, min_lat, max_lon, max_lat]| {
            [(min_lon + max_lon) / 2.0, (min_lat + max_lat) / 2.0]
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature<P> {
    #[serde(rename = "type", default)]
    pub tag: FeatureTag,
    pub geometry: Geometry,
    pub properties: P,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection<P> {
    #[serde(rename = "type", default)]
    pub tag: FeatureCollectionTag,
    pub features: Vec<Feature<P>>,
}

impl<P> FeatureCollection<P> {
    pub fn new(features: Vec<Feature<P>>) -> Self {
        Self {
            tag: FeatureCollectionTag::FeatureCollection,
            features,
        }
    }
}

/// Feature as produced by the geographic source
///
/// Nothing is assumed about its content: geometry and properties are checked
/// when the feature is normalized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawFeature {
    #[serde(default)]
    pub geometry: Value,
    #[serde(default)]
    pub properties: Value,
}

impl RawFeature {
    /// Geometry, if it parses as one of the supported kinds
    pub fn parsed_geometry(&self) -> Option<Geometry> {
        serde_json::from_value(self.geometry.clone()).ok()
    }

    /// OSM tags: `properties.tags` when present (Overpass-derived features),
    /// otherwise the properties object itself
    pub fn tags(&self) -> Option<&serde_json::Map<String, Value>> {
        let properties = self.properties.as_object()?;
        match properties.get("tags") {
            Some(Value::Object(tags)) => Some(tags),
            _ => Some(properties),
        }
    }

    /// String tag lookup; non-string values count as absent
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags()?.get(key)?.as_str()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawFeatureCollection {
    #[serde(default)]
    pub features: Vec<RawFeature>,
}

/// Properties of a place feature on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceProperties {
    pub name: String,
    #[serde(rename = "name:ga", default, skip_serializing_if = "Option::is_none")]
    pub local_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place: Option<PlaceCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tunes: Option<Vec<Tune>>,
}

pub type PlaceFeature = Feature<PlaceProperties>;
pub type PlaceFeatureCollection = FeatureCollection<PlaceProperties>;

impl From<&Place> for PlaceFeature {
    fn from(place: &Place) -> Self {
        Feature {
            tag: FeatureTag::Feature,
            geometry: Geometry::point(place.longitude(), place.latitude()),
            properties: PlaceProperties {
                name: place.name.clone(),
                local_name: place.local_name.clone(),
                place: place.category.clone(),
                tunes: None,
            },
        }
    }
}

impl From<&EnrichedPlace> for PlaceFeature {
    fn from(enriched: &EnrichedPlace) -> Self {
        let mut feature = PlaceFeature::from(&enriched.place);
        feature.properties.tunes = Some(enriched.tunes.clone());
        feature
    }
}

impl TryFrom<PlaceFeature> for Place {
    type Error = Error;

    fn try_from(feature: PlaceFeature) -> Result<Self> {
        let coordinates = match &feature.geometry {
            Geometry::Point { .. } => feature.geometry.center(),
            _ => None,
        }
        .ok_or_else(|| {
            Error::InvalidInput(format!(
                "place '{}' is not a point feature",
                feature.properties.name
            ))
        })?;

        Ok(Place {
            name: feature.properties.name,
            local_name: feature.properties.local_name,
            category: feature.properties.place,
            coordinates,
        })
    }
}

impl TryFrom<PlaceFeature> for EnrichedPlace {
    type Error = Error;

    fn try_from(mut feature: PlaceFeature) -> Result<Self> {
        let tunes = feature.properties.tunes.take().unwrap_or_default();
        Ok(EnrichedPlace {
            place: Place::try_from(feature)?,
            tunes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_point_center_is_itself() {
        let geometry = Geometry::point(-6.26, 53.35);
        assert_eq!(geometry.center(), Some([-6.26, 53.35]));
    }

    #[test]
    fn test_polygon_center_is_bbox_center() {
        let geometry: Geometry = serde_json::from_value(json!({
            "type": "Polygon",
            "coordinates": [[[0.0, 0.0], [4.0, 0.0], [4.0, 2.0], [1.0, 2.0], [0.0, 0.0]]]
        }))
        .unwrap();

        assert_eq!(geometry.center(), Some([2.0, 1.0]));
    }

    #[test]
    fn test_empty_polygon_has_no_center() {
        let geometry = Geometry::Polygon {
            coordinates: vec![vec![]],
        };
        assert_eq!(geometry.center(), None);
    }

    #[test]
    fn test_raw_feature_reads_nested_tags() {
        let feature: RawFeature = serde_json::from_value(json!({
            "type": "Feature",
            "geometry": { "type": "Point", "coordinates": [-8.47, 51.9] },
            "properties": { "id": 1, "tags": { "name": "Cork", "place": "city" } }
        }))
        .unwrap();

        assert_eq!(feature.tag("name"), Some("Cork"));
        assert_eq!(feature.tag("id"), None);
        assert!(feature.parsed_geometry().is_some());
    }

    #[test]
    fn test_raw_feature_reads_flat_properties() {
        let feature: RawFeature = serde_json::from_value(json!({
            "geometry": null,
            "properties": { "name": "Sligo", "place": "town" }
        }))
        .unwrap();

        assert_eq!(feature.tag("place"), Some("town"));
        assert!(feature.parsed_geometry().is_none());
    }

    #[test]
    fn test_enriched_place_feature_carries_tunes() {
        let enriched = EnrichedPlace {
            place: Place::new("Derry", PlaceCategory::City, [-7.3, 55.0]),
            tunes: vec![Tune::new(1, "reel", "Derry Hornpipe")],
        };

        let feature = PlaceFeature::from(&enriched);
        let json = serde_json::to_value(&feature).unwrap();
        assert_eq!(json["type"], "Feature");
        assert_eq!(json["geometry"]["type"], "Point");
        assert_eq!(json["properties"]["tunes"][0]["id"], 1);

        let back = EnrichedPlace::try_from(feature).unwrap();
        assert_eq!(back, enriched);
    }
}

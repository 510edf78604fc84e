//! Overpass API client
//!
//! Fetches the named settlements of Ireland from OpenStreetMap and converts the
//! returned elements to raw GeoJSON features for the place normalizer.

use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::time::Duration;
use thiserror::Error;
use tunemap_common::config::SourcesConfig;
use tunemap_common::geojson::{Geometry, Position, RawFeature};

use crate::utils::http_retry::{retry_with_backoff, RetryPolicy, Transient};

const USER_AGENT: &str = concat!("tunemap/", env!("CARGO_PKG_VERSION"));

/// Settlement kinds requested from OSM
pub const PLACE_CATEGORIES: &str = "city|town|village|island";

/// Polygon around the island of Ireland (lat lon pairs, Overpass `poly` syntax)
pub const IRELAND_POLYGON: &str = "54.38 -4.95 55.53 -6.15 55.37 -10.23 51.04 -11.25 51.56 -6.32";

/// Overpass client errors
#[derive(Debug, Error)]
pub enum OverpassError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

impl Transient for OverpassError {
    fn is_transient(&self) -> bool {
        match self {
            OverpassError::NetworkError(_) => true,
            // 429 and 504 are how Overpass reports load
            OverpassError::ApiError(status, _) => *status == 429 || *status >= 500,
            OverpassError::ParseError(_) => false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OverpassResponse {
    #[serde(default)]
    pub elements: Vec<OverpassElement>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

/// Element of an `out geom` response
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OverpassElement {
    Node {
        id: i64,
        lat: Option<f64>,
        lon: Option<f64>,
        #[serde(default)]
        tags: Map<String, Value>,
    },
    Way {
        id: i64,
        #[serde(default)]
        geometry: Vec<Option<LatLon>>,
        #[serde(default)]
        tags: Map<String, Value>,
    },
    #[serde(other)]
    Other,
}

/// Overpass QL query selecting named settlements inside `polygon`
///
/// Historic places are excluded, and ways carrying an `admin_level` (boundaries)
/// are left out since the matching settlement node is returned anyway.
pub fn build_places_query(polygon: &str, timeout_secs: u64) -> String {
    format!(
        r#"[out:json][timeout:{timeout}];
(
    node
        [!"historic"]
        ["name"]
        ["place"~"{categories}"]
        (poly:"{polygon}");
    way
        [!"admin_level"]
        [!"historic"]
        ["name"]
        ["place"~"{categories}"]
        (poly:"{polygon}");
);
out geom;
"#,
        timeout = timeout_secs,
        categories = PLACE_CATEGORIES,
        polygon = polygon,
    )
}

fn position(point: &LatLon) -> Position {
    vec![point.lon, point.lat]
}

/// Convert one element to a raw feature
///
/// Nodes become points, closed ways polygons and open ways line strings.
/// Elements without coordinates, and anything that is not a node or way,
/// yield `None`.
pub fn element_to_feature(element: &OverpassElement) -> Option<RawFeature> {
    let (osm_id, geometry, tags) = match element {
        OverpassElement::Node { id, lat, lon, tags } => {
            let (lat, lon) = (lat.as_ref()?, lon.as_ref()?);
            (format!("node/{}", id), Geometry::point(*lon, *lat), tags)
        }
        OverpassElement::Way { id, geometry, tags } => {
            let ring: Vec<Position> = geometry.iter().flatten().map(position).collect();
            if ring.is_empty() {
                return None;
            }
            let closed = ring.len() >= 4 && ring.first() == ring.last();
            let geometry = if closed {
                Geometry::Polygon {
                    coordinates: vec![ring],
                }
            } else {
                Geometry::LineString { coordinates: ring }
            };
            (format!("way/{}", id), geometry, tags)
        }
        OverpassElement::Other => return None,
    };

    Some(RawFeature {
        geometry: serde_json::to_value(&geometry).ok()?,
        properties: json!({ "id": osm_id, "tags": tags }),
    })
}

pub fn elements_to_features(response: &OverpassResponse) -> Vec<RawFeature> {
    response.elements.iter().filter_map(element_to_feature).collect()
}

/// Overpass API client
pub struct OverpassClient {
    http_client: reqwest::Client,
    endpoint: String,
    timeout_secs: u64,
    retry: RetryPolicy,
}

impl OverpassClient {
    pub fn new(sources: &SourcesConfig) -> Result<Self, OverpassError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(sources.timeout_secs))
            .build()
            .map_err(|e| OverpassError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint: sources.overpass_url.clone(),
            timeout_secs: sources.timeout_secs,
            retry: RetryPolicy::with_max_attempts(sources.max_attempts),
        })
    }

    async fn run_query(&self, query: &str) -> Result<OverpassResponse, OverpassError> {
        tracing::debug!(endpoint = %self.endpoint, "Querying Overpass API");

        let response = self
            .http_client
            .post(&self.endpoint)
            .form(&[("data", query)])
            .send()
            .await
            .map_err(|e| OverpassError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(OverpassError::ApiError(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| OverpassError::ParseError(e.to_string()))
    }

    /// Fetch settlements of Ireland as raw features
    pub async fn fetch_places(&self) -> Result<Vec<RawFeature>, OverpassError> {
        let query = build_places_query(IRELAND_POLYGON, self.timeout_secs);
        let response =
            retry_with_backoff("overpass places query", self.retry, || self.run_query(&query))
                .await?;

        let features = elements_to_features(&response);
        tracing::info!(
            elements = response.elements.len(),
            features = features.len(),
            "Retrieved places from Overpass"
        );
        Ok(features)
    }
}

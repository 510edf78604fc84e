//! Data folder storage
//!
//! Reads and writes the pipeline's three files. Writes go to a temporary file
//! first and are renamed into place, so a failed run never leaves a truncated file.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tunemap_common::geojson::{PlaceFeature, PlaceFeatureCollection, RawFeatureCollection};
use tunemap_common::{EnrichedPlace, Error, Place, Result, Tune};

pub const PLACES_FILE: &str = "places.geojson";
pub const TUNES_FILE: &str = "tunes.json";
pub const OUTPUT_FILE: &str = "tunesByPlaces.geojson";

/// Serialize `value` as pretty JSON and atomically replace `path`
pub fn write_json_atomic<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let bytes = serde_json::to_vec_pretty(value)?;
    let temp_path = path.with_extension("tmp");
    std::fs::write(&temp_path, bytes)?;
    std::fs::rename(&temp_path, path)?;

    tracing::debug!(path = %path.display(), "Wrote JSON file");
    Ok(())
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Error::NotFound(path.display().to_string()),
        _ => Error::Io(e),
    })?;
    Ok(serde_json::from_slice(&content)?)
}

/// The pipeline's data folder
#[derive(Debug, Clone)]
pub struct DataStore {
    dir: PathBuf,
}

impl DataStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn places_path(&self) -> PathBuf {
        self.dir.join(PLACES_FILE)
    }

    pub fn tunes_path(&self) -> PathBuf {
        self.dir.join(TUNES_FILE)
    }

    pub fn output_path(&self) -> PathBuf {
        self.dir.join(OUTPUT_FILE)
    }

    pub fn save_places(&self, places: &[Place]) -> Result<()> {
        let collection =
            PlaceFeatureCollection::new(places.iter().map(PlaceFeature::from).collect());
        write_json_atomic(&collection, &self.places_path())
    }

    /// Load normalized places
    ///
    /// Non-point features are skipped with a warning.
    pub fn load_places(&self) -> Result<Vec<Place>> {
        let collection: PlaceFeatureCollection = read_json(&self.places_path())?;
        let mut places = Vec::with_capacity(collection.features.len());
        for feature in collection.features {
            match Place::try_from(feature) {
                Ok(place) => places.push(place),
                Err(e) => tracing::warn!(error = %e, "Skipping stored place"),
            }
        }
        Ok(places)
    }

    /// Load an unnormalized GeoJSON export (e.g. saved from another Overpass tool)
    pub fn load_raw_places(path: &Path) -> Result<RawFeatureCollection> {
        read_json(path)
    }

    pub fn save_tunes(&self, tunes: &[Tune]) -> Result<()> {
        write_json_atomic(tunes, &self.tunes_path())
    }

    /// Load consolidated tunes
    ///
    /// Records without any name are skipped with a warning.
    pub fn load_tunes(&self) -> Result<Vec<Tune>> {
        let tunes: Vec<Tune> = read_json(&self.tunes_path())?;
        let total = tunes.len();
        let tunes: Vec<Tune> = tunes.into_iter().filter(|t| !t.names.is_empty()).collect();
        if tunes.len() < total {
            tracing::warn!(skipped = total - tunes.len(), "Skipping stored tunes without names");
        }
        Ok(tunes)
    }

    pub fn save_enriched(&self, places: &[EnrichedPlace]) -> Result<()> {
        let collection =
            PlaceFeatureCollection::new(places.iter().map(PlaceFeature::from).collect());
        write_json_atomic(&collection, &self.output_path())
    }

    pub fn load_enriched(&self) -> Result<Vec<EnrichedPlace>> {
        let collection: PlaceFeatureCollection = read_json(&self.output_path())?;
        collection
            .features
            .into_iter()
            .map(EnrichedPlace::try_from)
            .collect()
    }
}

//! Pipeline Orchestrator
//!
//! Runs the three stages against the data folder:
//! - **places**: Overpass → normalize → `places.geojson`
//! - **tunes**: TheSession tables → consolidate → `tunes.json`
//! - **merge**: both files → match → `tunesByPlaces.geojson`
//!
//! Acquisition failures abort the stage before anything is written; the merge
//! itself cannot fail once its inputs are loaded.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;
use tunemap_common::config::TomlConfig;
use tunemap_common::{EnrichedPlace, Place, Tune};

use crate::services::{
    consolidate, normalize_places, MergeStats, OverpassClient, PlaceTuneMerger, SessionClient,
};
use crate::storage::DataStore;

pub struct Pipeline {
    config: TomlConfig,
    store: DataStore,
}

impl Pipeline {
    pub fn new(config: TomlConfig, store: DataStore) -> Self {
        Self { config, store }
    }

    pub fn store(&self) -> &DataStore {
        &self.store
    }

    /// Fetch places from Overpass, normalize and save them
    pub async fn acquire_places(&self) -> Result<Vec<Place>> {
        let client = OverpassClient::new(&self.config.sources)
            .context("Failed to create Overpass client")?;
        let features = client
            .fetch_places()
            .await
            .context("Failed to fetch places from Overpass")?;

        let places = normalize_places(&features);
        self.store
            .save_places(&places)
            .context("Failed to write places file")?;
        info!(
            places = places.len(),
            path = %self.store.places_path().display(),
            "Places saved"
        );
        Ok(places)
    }

    /// Normalize an already downloaded GeoJSON export and save it
    pub fn import_places(&self, raw_path: &Path) -> Result<Vec<Place>> {
        let raw = DataStore::load_raw_places(raw_path)
            .with_context(|| format!("Failed to read raw places from {}", raw_path.display()))?;

        let places = normalize_places(&raw.features);
        self.store
            .save_places(&places)
            .context("Failed to write places file")?;
        info!(places = places.len(), "Imported places");
        Ok(places)
    }

    /// Fetch the TheSession tables, consolidate and save the tunes
    pub async fn acquire_tunes(&self) -> Result<Vec<Tune>> {
        let client = SessionClient::new(&self.config.sources)
            .context("Failed to create TheSession client")?;
        let tables = client
            .fetch_tables()
            .await
            .context("Failed to fetch TheSession data")?;

        let tunes = consolidate(&tables.tunes, &tables.aliases);
        self.store
            .save_tunes(&tunes)
            .context("Failed to write tunes file")?;
        info!(
            tunes = tunes.len(),
            path = %self.store.tunes_path().display(),
            "Tunes saved"
        );
        Ok(tunes)
    }

    /// Merge in-memory collections and save the result
    pub fn merge(
        &self,
        places: &[Place],
        tunes: &[Tune],
    ) -> Result<(Vec<EnrichedPlace>, MergeStats)> {
        let merger = PlaceTuneMerger::new(&self.config.matching);
        let (enriched, stats) = merger.merge_with_stats(places, tunes);

        self.store
            .save_enriched(&enriched)
            .context("Failed to write merged output")?;
        info!(
            places = enriched.len(),
            path = %self.store.output_path().display(),
            "Merged output saved"
        );
        Ok((enriched, stats))
    }

    /// Merge the stored places and tunes
    pub fn merge_stored(&self) -> Result<(Vec<EnrichedPlace>, MergeStats)> {
        let places = self
            .store
            .load_places()
            .with_context(|| format!("Failed to read {}", self.store.places_path().display()))?;
        let tunes = self
            .store
            .load_tunes()
            .with_context(|| format!("Failed to read {}", self.store.tunes_path().display()))?;

        self.merge(&places, &tunes)
    }

    /// All three stages
    pub async fn run(&self) -> Result<MergeStats> {
        let places = self.acquire_places().await?;
        let tunes = self.acquire_tunes().await?;
        let (_, stats) = self.merge(&places, &tunes)?;
        Ok(stats)
    }

    /// Look up a place of the merged output by name (primary or Irish)
    pub fn find_place(&self, name: &str) -> Result<Option<EnrichedPlace>> {
        let places = self
            .store
            .load_enriched()
            .with_context(|| format!("Failed to read {}", self.store.output_path().display()))?;

        Ok(places.into_iter().find(|p| {
            p.place.name == name
                || p.place.name.split('/').any(|part| part == name)
                || p.place.local_name.as_deref() == Some(name)
        }))
    }
}

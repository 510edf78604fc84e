//! Pipeline integration tests
//!
//! Runs the offline stages (import, merge, show) against a temporary data folder.

use serde_json::json;
use std::fs;
use tempfile::TempDir;
use tunemap_common::config::TomlConfig;
use tunemap_common::{PlaceCategory, Tune};
use tunemap_ingest::services::tune_listing::render_listing;
use tunemap_ingest::services::{consolidate, RawAliasRow, RawTuneRow};
use tunemap_ingest::{DataStore, Pipeline};

/// Helper: raw Overpass-style export with a node, a polygon way and junk
fn write_raw_places(dir: &TempDir) -> std::path::PathBuf {
    let raw = json!({
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": [-7.31, 54.99] },
                "properties": { "id": "node/1", "tags": {
                    "name": "Londonderry/Derry", "name:ga": "Doire", "place": "city"
                } }
            },
            {
                "type": "Feature",
                "geometry": { "type": "Polygon", "coordinates": [[
                    [-9.75, 53.0], [-9.25, 53.0], [-9.25, 53.5], [-9.75, 53.5], [-9.75, 53.0]
                ]] },
                "properties": { "id": "way/2", "tags": { "name": "Inis Oírr", "place": "island" } }
            },
            {
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": [-6.5, 53.3] },
                "properties": { "id": "node/3", "tags": { "name": "Park", "place": "village" } }
            },
            {
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": [-8.0, 52.0] },
                "properties": { "id": "node/4", "tags": { "place": "village" } }
            },
            {
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": [-8.9, 52.8] },
                "properties": { "id": "node/5", "tags": { "name": "Ennis", "place": "town" } }
            },
            {
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": [-9.2, 53.1] },
                "properties": { "id": "node/6", "tags": {
                    "name": "Ballyvaughan", "place": "townland"
                } }
            }
        ]
    });

    let path = dir.path().join("raw_places.geojson");
    fs::write(&path, serde_json::to_vec(&raw).unwrap()).unwrap();
    path
}

fn sample_tunes() -> Vec<Tune> {
    let tune_rows: Vec<RawTuneRow> = serde_json::from_value(json!([
        { "tune_id": "1", "type": "hornpipe", "name": "Derry Hornpipe, The" },
        { "tune_id": "2", "type": "reel", "name": "Park Reel" },
        { "tune_id": "007", "type": "reel", "name": "Ennis Reel" },
        { "tune_id": "3", "type": "jig", "name": "Humours of Ennis, The" },
        { "tune_id": "4", "type": "reel", "name": "Doire Reel" }
    ]))
    .unwrap();
    let alias_rows: Vec<RawAliasRow> = serde_json::from_value(json!([
        { "tune_id": "3", "alias": "Ennis Jig" },
        { "tune_id": "99", "alias": "Derry Air" }
    ]))
    .unwrap();

    consolidate(&tune_rows, &alias_rows)
}

fn pipeline_in(dir: &TempDir) -> Pipeline {
    Pipeline::new(TomlConfig::default(), DataStore::new(dir.path().join("data")))
}

#[test]
fn test_import_normalizes_raw_export() {
    let temp_dir = TempDir::new().unwrap();
    let raw_path = write_raw_places(&temp_dir);
    let pipeline = pipeline_in(&temp_dir);

    let places = pipeline.import_places(&raw_path).unwrap();

    let names: Vec<&str> = places.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["Londonderry/Derry", "Inis Oírr", "Park", "Ennis", "Ballyvaughan"]
    );
    assert_eq!(places[1].coordinates, [-9.5, 53.25]);
    assert_eq!(
        places[4].category,
        Some(PlaceCategory::Other("townland".to_string()))
    );

    let stored = pipeline.store().load_places().unwrap();
    assert_eq!(stored, places);
    assert!(pipeline.store().places_path().exists());
}

#[test]
fn test_merge_stored_writes_enriched_geojson() {
    let temp_dir = TempDir::new().unwrap();
    let raw_path = write_raw_places(&temp_dir);
    let pipeline = pipeline_in(&temp_dir);

    pipeline.import_places(&raw_path).unwrap();
    pipeline.store().save_tunes(&sample_tunes()).unwrap();

    let (enriched, stats) = pipeline.merge_stored().unwrap();

    let names: Vec<&str> = enriched.iter().map(|p| p.place.name.as_str()).collect();
    assert_eq!(names, vec!["Londonderry/Derry", "Ennis"]);
    assert_eq!(stats.ignored, 1);
    assert_eq!(stats.unmatched, 2);

    let derry_ids: Vec<u64> = enriched[0].tunes.iter().map(|t| t.id).collect();
    assert_eq!(derry_ids, vec![1, 4]);
    assert_eq!(enriched[1].tunes[0].names, vec!["Humours of Ennis, The", "Ennis Jig"]);

    let output: serde_json::Value =
        serde_json::from_slice(&fs::read(pipeline.store().output_path()).unwrap()).unwrap();
    assert_eq!(output["type"], "FeatureCollection");
    assert_eq!(output["features"].as_array().unwrap().len(), 2);
    let first = &output["features"][0];
    assert_eq!(first["geometry"]["type"], "Point");
    assert_eq!(first["properties"]["name:ga"], "Doire");
    assert_eq!(first["properties"]["tunes"][0]["type"], "hornpipe");
    assert!(first["properties"]["tunes"][0].get("matching_title").is_none());
}

#[test]
fn test_merge_output_is_byte_identical_across_runs() {
    let temp_dir = TempDir::new().unwrap();
    let raw_path = write_raw_places(&temp_dir);
    let pipeline = pipeline_in(&temp_dir);

    pipeline.import_places(&raw_path).unwrap();
    pipeline.store().save_tunes(&sample_tunes()).unwrap();

    pipeline.merge_stored().unwrap();
    let first = fs::read(pipeline.store().output_path()).unwrap();
    pipeline.merge_stored().unwrap();
    let second = fs::read(pipeline.store().output_path()).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_merge_without_inputs_fails_and_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let pipeline = pipeline_in(&temp_dir);

    assert!(pipeline.merge_stored().is_err());
    assert!(!pipeline.store().output_path().exists());
}

#[test]
fn test_show_finds_place_by_any_name() {
    let temp_dir = TempDir::new().unwrap();
    let raw_path = write_raw_places(&temp_dir);
    let pipeline = pipeline_in(&temp_dir);

    pipeline.import_places(&raw_path).unwrap();
    pipeline.store().save_tunes(&sample_tunes()).unwrap();
    pipeline.merge_stored().unwrap();

    for name in ["Londonderry/Derry", "Derry", "Doire"] {
        let place = pipeline.find_place(name).unwrap();
        assert_eq!(place.map(|p| p.place.name), Some("Londonderry/Derry".to_string()));
    }
    assert!(pipeline.find_place("Park").unwrap().is_none());

    let ennis = pipeline.find_place("Ennis").unwrap().unwrap();
    let listing = render_listing(&ennis);
    assert_eq!(
        listing,
        "Ennis (1 tune)\n\njig\n  The Humours of Ennis  https://thesession.org/tunes/3\n"
    );
}

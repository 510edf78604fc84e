//! # tunemap Common Library
//!
//! Shared code for the tunemap crates including:
//! - Place and tune models
//! - GeoJSON feature types
//! - Configuration loading
//! - Error types

pub mod config;
pub mod error;
pub mod geojson;
pub mod models;

pub use error::{Error, Result};
pub use models::{EnrichedPlace, Place, PlaceCategory, Tune};

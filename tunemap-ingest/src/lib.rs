//! tunemap-ingest library interface
//!
//! Exposes the pipeline stages for the binary and for integration testing.

pub mod services;
pub mod storage;
pub mod utils;
pub mod workflow;

pub use crate::storage::DataStore;
pub use crate::workflow::Pipeline;

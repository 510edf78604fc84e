//! Pipeline services: acquisition clients, the three transform stages and the
//! tune listing

pub mod name_matcher;
pub mod overpass_client;
pub mod place_normalizer;
pub mod place_tune_merger;
pub mod session_client;
pub mod tune_consolidator;
pub mod tune_listing;

pub use name_matcher::{MatchingRecord, NameMatcher, PreparedTune};
pub use overpass_client::{OverpassClient, OverpassError};
pub use place_normalizer::{normalize_places, Rejection};
pub use place_tune_merger::{MergeStats, PlaceTuneMerger};
pub use session_client::{RawTuneTables, SessionClient, SessionError};
pub use tune_consolidator::{
    consolidate, consolidate_with_stats, ConsolidationStats, RawAliasRow, RawTuneRow,
};

//! Domain models shared by the pipeline stages

pub mod place;
pub mod tune;

pub use place::{EnrichedPlace, Place, PlaceCategory};
pub use tune::Tune;

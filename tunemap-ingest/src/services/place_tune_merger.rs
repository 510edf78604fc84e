//! Place-Tune Merger
//!
//! Runs the [`NameMatcher`] over every place and every tune and keeps the places
//! that matched at least one tune, each with its tunes attached.
//!
//! Places are matched in parallel on the rayon pool. Each place only reads the
//! prepared tunes, and results are collected in input order, so the output is
//! the same as a sequential run.

use rayon::prelude::*;
use std::collections::HashSet;
use tunemap_common::config::MatchingConfig;
use tunemap_common::{EnrichedPlace, Place, Tune};

use super::name_matcher::{NameMatcher, PreparedTune};

/// Counters reported after a merge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub places_in: usize,
    pub ignored: usize,
    pub unmatched: usize,
    pub places_out: usize,
    pub tune_links: usize,
}

pub struct PlaceTuneMerger {
    matcher: NameMatcher,
    ignore_list: HashSet<String>,
}

impl Default for PlaceTuneMerger {
    fn default() -> Self {
        Self::new(&MatchingConfig::default())
    }
}

impl PlaceTuneMerger {
    pub fn new(config: &MatchingConfig) -> Self {
        Self {
            matcher: NameMatcher::new(config),
            ignore_list: config.ignore_list.iter().cloned().collect(),
        }
    }

    /// Whether a place is skipped outright because its name is too generic
    pub fn is_ignored(&self, place: &Place) -> bool {
        place.name.is_empty() || self.ignore_list.contains(&place.name)
    }

    /// Tunes referencing one place, cloned out of the tune collection
    fn tunes_for(&self, place: &Place, tunes: &[PreparedTune<'_>]) -> Vec<Tune> {
        self.matcher
            .match_place(place, tunes)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Merge places with tunes
    ///
    /// Neither input is modified. Ignored places and places without any match
    /// are absent from the result; the others keep their relative order.
    pub fn merge(&self, places: &[Place], tunes: &[Tune]) -> Vec<EnrichedPlace> {
        self.merge_with_stats(places, tunes).0
    }

    pub fn merge_with_stats(
        &self,
        places: &[Place],
        tunes: &[Tune],
    ) -> (Vec<EnrichedPlace>, MergeStats) {
        let prepared = self.matcher.prepare_all(tunes);

        let outcomes: Vec<Option<EnrichedPlace>> = places
            .par_iter()
            .enumerate()
            .map(|(index, place)| {
                if self.is_ignored(place) {
                    return None;
                }
                let matched = self.tunes_for(place, &prepared);
                tracing::debug!(
                    index,
                    place = %place.name,
                    tunes = matched.len(),
                    "Matched place"
                );
                if matched.is_empty() {
                    None
                } else {
                    Some(EnrichedPlace {
                        place: place.clone(),
                        tunes: matched,
                    })
                }
            })
            .collect();

        let ignored = places.iter().filter(|p| self.is_ignored(p)).count();
        let enriched: Vec<EnrichedPlace> = outcomes.into_iter().flatten().collect();

        let stats = MergeStats {
            places_in: places.len(),
            ignored,
            unmatched: places.len() - ignored - enriched.len(),
            places_out: enriched.len(),
            tune_links: enriched.iter().map(|p| p.tunes.len()).sum(),
        };

        tracing::info!(
            places_in = stats.places_in,
            ignored = stats.ignored,
            unmatched = stats.unmatched,
            places_out = stats.places_out,
            tune_links = stats.tune_links,
            "Merged tunes into places"
        );

        (enriched, stats)
    }
}

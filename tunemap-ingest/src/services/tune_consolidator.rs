//! Tune Consolidator
//!
//! Merges the tune table and the alias table of the tune dataset into one
//! [`Tune`] per id. Ids are defined by the tune table: aliases pointing at an id
//! the tune table does not hold are dropped. Malformed rows are skipped.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use tunemap_common::Tune;

/// Row of the tune table
///
/// The dataset has shipped ids both as strings and as numbers, under
/// `tune_id` or `tune`, so the id is kept as raw JSON until validated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTuneRow {
    #[serde(rename = "tune_id", alias = "tune", default)]
    pub id: Value,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Row of the alias table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawAliasRow {
    #[serde(rename = "tune_id", alias = "tune", default)]
    pub tune_id: Value,
    #[serde(default)]
    pub alias: Option<String>,
}

/// Parse a tune id, accepting only canonical non-negative integers
///
/// The id's text must be reproduced exactly by formatting the parsed integer:
/// "42" and 42 are accepted, "007", "+7", "7.0", "-1" and "abc" are not.
pub fn canonical_id(raw: &Value) -> Option<u64> {
    let text = match raw {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    let id: u64 = text.parse().ok()?;
    (id.to_string() == text).then_some(id)
}

/// Counters reported after consolidation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsolidationStats {
    pub tunes: usize,
    pub malformed_tunes: usize,
    pub duplicate_tunes: usize,
    pub malformed_aliases: usize,
    pub orphan_ids: usize,
}

/// Consolidate tune and alias rows
///
/// **Algorithm:**
/// 1. Keep tune rows with a canonical id and a name
/// 2. Deduplicate by id, first occurrence wins
/// 3. Group aliases by id, keeping source order
/// 4. Each tune's names = canonical name followed by its aliases
///
/// Output is ordered by id.
pub fn consolidate(tune_rows: &[RawTuneRow], alias_rows: &[RawAliasRow]) -> Vec<Tune> {
    consolidate_with_stats(tune_rows, alias_rows).0
}

pub fn consolidate_with_stats(
    tune_rows: &[RawTuneRow],
    alias_rows: &[RawAliasRow],
) -> (Vec<Tune>, ConsolidationStats) {
    let mut tunes: BTreeMap<u64, Tune> = BTreeMap::new();
    let mut malformed_tunes = 0usize;
    let mut duplicate_tunes = 0usize;

    for row in tune_rows {
        let (Some(id), Some(name)) = (canonical_id(&row.id), row.name.as_ref()) else {
            malformed_tunes += 1;
            tracing::trace!(id = %row.id, "Skipping malformed tune row");
            continue;
        };

        if tunes.contains_key(&id) {
            duplicate_tunes += 1;
            continue;
        }
        let kind = row.kind.clone().unwrap_or_default();
        tunes.insert(id, Tune::new(id, kind, name.clone()));
    }

    let mut aliases: HashMap<u64, Vec<String>> = HashMap::new();
    let mut malformed_aliases = 0usize;
    for row in alias_rows {
        match (canonical_id(&row.tune_id), row.alias.as_ref()) {
            (Some(id), Some(alias)) => aliases.entry(id).or_default().push(alias.clone()),
            _ => {
                malformed_aliases += 1;
                tracing::trace!(id = %row.tune_id, "Skipping malformed alias row");
            }
        }
    }

    for (id, tune) in tunes.iter_mut() {
        if let Some(names) = aliases.remove(id) {
            tune.names.extend(names);
        }
    }

    let stats = ConsolidationStats {
        tunes: tunes.len(),
        malformed_tunes,
        duplicate_tunes,
        malformed_aliases,
        // Whatever is left belongs to ids the tune table does not define
        orphan_ids: aliases.len(),
    };

    tracing::info!(
        tunes = stats.tunes,
        malformed_tunes = stats.malformed_tunes,
        duplicate_tunes = stats.duplicate_tunes,
        malformed_aliases = stats.malformed_aliases,
        orphan_ids = stats.orphan_ids,
        "Consolidated tunes"
    );

    (tunes.into_values().collect(), stats)
}

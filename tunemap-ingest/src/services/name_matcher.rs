//! Name Matcher
//!
//! Decides whether a tune is "about" a place by looking for the place's names
//! inside the tune's names.
//!
//! **Rule:** a place name matches a tune name when it occurs in it and the
//! occurrence is immediately followed by end-of-string or one of the boundary
//! characters (space and comma by default). Only the right side is checked:
//! "Derry" matches "OldDerry" but not "Derrylough". Matching is literal and
//! case-sensitive.

use tunemap_common::config::MatchingConfig;
use tunemap_common::{Place, Tune};

/// Tune prepared for matching
///
/// Holds the tune's names joined into a single string, which is used to reject
/// non-matching tunes with one substring search.
#[derive(Debug, Clone)]
pub struct PreparedTune<'t> {
    pub tune: &'t Tune,
    joined: String,
}

/// A matched tune together with the name variant to show for one place
///
/// Lives only as long as it is displayed; the title is never written back to the tune.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchingRecord<'t> {
    pub tune: &'t Tune,
    pub matching_title: &'t str,
}

impl<'t> MatchingRecord<'t> {
    pub fn new(candidates: &[&str], tune: &'t Tune) -> Self {
        Self {
            tune,
            matching_title: matching_title(candidates, tune),
        }
    }
}

/// Names a place may appear under in tune titles
///
/// The primary name is split on `/` ("Londonderry/Derry" gives two candidates),
/// then the Irish name is appended when present. Empty pieces are skipped.
pub fn place_candidates(place: &Place) -> Vec<&str> {
    let mut candidates: Vec<&str> = place.name.split('/').filter(|n| !n.is_empty()).collect();
    if let Some(local_name) = place.local_name.as_deref() {
        if !local_name.is_empty() {
            candidates.push(local_name);
        }
    }
    candidates
}

/// Whether `candidate` occurs in `text` followed by end-of-string or a boundary character
///
/// All occurrences are considered, including overlapping ones.
pub fn name_matches(candidate: &str, text: &str, boundary_chars: &[char]) -> bool {
    if candidate.is_empty() {
        return false;
    }

    let mut from = 0;
    while let Some(offset) = text[from..].find(candidate) {
        let start = from + offset;
        let end = start + candidate.len();
        match text[end..].chars().next() {
            None => return true,
            Some(next) if boundary_chars.contains(&next) => return true,
            Some(_) => {}
        }
        // Resume one character after this occurrence's start
        from = start + text[start..].chars().next().map_or(1, char::len_utf8);
    }
    false
}

/// Name variant to display for a tune matched against a place
///
/// First variant containing any of the place's names (plain containment, no
/// boundary check), otherwise the tune's first variant.
pub fn matching_title<'t>(candidates: &[&str], tune: &'t Tune) -> &'t str {
    tune.names
        .iter()
        .find(|name| candidates.iter().any(|c| name.contains(c)))
        .map(String::as_str)
        .unwrap_or_else(|| tune.canonical_name())
}

/// Matches places against tunes
#[derive(Debug, Clone)]
pub struct NameMatcher {
    separator: String,
    boundary_chars: Vec<char>,
}

impl Default for NameMatcher {
    fn default() -> Self {
        Self::new(&MatchingConfig::default())
    }
}

impl NameMatcher {
    pub fn new(config: &MatchingConfig) -> Self {
        Self {
            separator: config.separator.clone(),
            boundary_chars: config.boundary_chars.clone(),
        }
    }

    pub fn prepare<'t>(&self, tune: &'t Tune) -> PreparedTune<'t> {
        PreparedTune {
            tune,
            joined: tune.names.join(&self.separator),
        }
    }

    pub fn prepare_all<'t>(&self, tunes: &'t [Tune]) -> Vec<PreparedTune<'t>> {
        tunes.iter().map(|tune| self.prepare(tune)).collect()
    }

    /// Whether any candidate name matches any of the tune's name variants
    ///
    /// The joined string only filters out tunes that cannot match: the rule is
    /// applied to each variant on its own, so a separator never acts as a boundary.
    pub fn candidates_match(&self, candidates: &[&str], tune: &PreparedTune<'_>) -> bool {
        candidates.iter().any(|candidate| {
            !candidate.is_empty()
                && tune.joined.contains(candidate)
                && tune
                    .tune
                    .names
                    .iter()
                    .any(|name| name_matches(candidate, name, &self.boundary_chars))
        })
    }

    pub fn matches(&self, place: &Place, tune: &PreparedTune<'_>) -> bool {
        self.candidates_match(&place_candidates(place), tune)
    }

    /// All tunes matching a place, in tune order, each at most once
    pub fn match_place<'t>(&self, place: &Place, tunes: &[PreparedTune<'t>]) -> Vec<&'t Tune> {
        let candidates = place_candidates(place);
        if candidates.is_empty() {
            return Vec::new();
        }

        tunes
            .iter()
            .filter(|prepared| self.candidates_match(&candidates, prepared))
            .map(|prepared| prepared.tune)
            .collect()
    }
}

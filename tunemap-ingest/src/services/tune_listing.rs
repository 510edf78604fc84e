//! Tune listing for one place
//!
//! Groups a place's tunes by type and sorts each group by display title, the
//! way the map's side panel shows them.

use std::fmt::Write as _;
use tunemap_common::EnrichedPlace;

use super::name_matcher::{place_candidates, MatchingRecord};

pub const TUNE_URL_BASE: &str = "https://thesession.org/tunes/";

/// Turn "Silver Spear, The" into "The Silver Spear"
pub fn display_title(name: &str) -> String {
    match name.strip_suffix(", The") {
        Some(stem) => format!("The {}", stem),
        None => name.to_string(),
    }
}

pub fn tune_url(id: u64) -> String {
    format!("{}{}", TUNE_URL_BASE, id)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedTune {
    pub id: u64,
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TuneGroup {
    pub kind: String,
    pub tunes: Vec<ListedTune>,
}

/// Group a place's tunes by type
///
/// Groups are ordered by type, tunes by title (case-insensitive, then id).
/// Each title is the tune's matching title for this place.
pub fn group_tunes(place: &EnrichedPlace) -> Vec<TuneGroup> {
    let candidates = place_candidates(&place.place);
    let mut groups: Vec<TuneGroup> = Vec::new();

    for tune in &place.tunes {
        let record = MatchingRecord::new(&candidates, tune);
        let listed = ListedTune {
            id: record.tune.id,
            title: display_title(record.matching_title),
            url: tune_url(record.tune.id),
        };
        match groups.iter_mut().find(|g| g.kind == tune.kind) {
            Some(group) => group.tunes.push(listed),
            None => groups.push(TuneGroup {
                kind: tune.kind.clone(),
                tunes: vec![listed],
            }),
        }
    }

    groups.sort_by(|a, b| a.kind.cmp(&b.kind));
    for group in &mut groups {
        group.tunes.sort_by(|a, b| {
            a.title
                .to_lowercase()
                .cmp(&b.title.to_lowercase())
                .then(a.id.cmp(&b.id))
        });
    }
    groups
}

/// Plain-text listing of a place and its tunes
pub fn render_listing(place: &EnrichedPlace) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} ({} tune{})",
        place.place.name,
        place.tunes.len(),
        if place.tunes.len() == 1 { "" } else { "s" }
    );

    for group in group_tunes(place) {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", group.kind);
        for tune in group.tunes {
            let _ = writeln!(out, "  {}  {}", tune.title, tune.url);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tunemap_common::{Place, PlaceCategory, Tune};

    fn galway() -> EnrichedPlace {
        EnrichedPlace {
            place: Place::new("Galway", PlaceCategory::City, [-9.05, 53.27]),
            tunes: vec![
                Tune::new(3, "reel", "Galway Rambler, The"),
                Tune::new(1, "hornpipe", "Galway Hornpipe, The"),
                Tune::new(2, "reel", "Boys of Galway")
                    .with_aliases(["Other Name"]),
                Tune::new(4, "reel", "Untitled").with_aliases(["Galway Reel"]),
            ],
        }
    }

    #[test]
    fn test_display_title_moves_article() {
        assert_eq!(display_title("Silver Spear, The"), "The Silver Spear");
        assert_eq!(display_title("Drowsy Maggie"), "Drowsy Maggie");
        assert_eq!(display_title("Theme, Then"), "Theme, Then");
    }

    #[test]
    fn test_groups_sorted_by_type_then_title() {
        let groups = group_tunes(&galway());

        let kinds: Vec<&str> = groups.iter().map(|g| g.kind.as_str()).collect();
        assert_eq!(kinds, vec!["hornpipe", "reel"]);

        let reel_titles: Vec<&str> = groups[1].tunes.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(
            reel_titles,
            vec!["Boys of Galway", "Galway Reel", "The Galway Rambler"]
        );
        assert_eq!(groups[0].tunes[0].url, "https://thesession.org/tunes/1");
    }

    #[test]
    fn test_render_listing() {
        let text = render_listing(&galway());
        assert!(text.starts_with("Galway (4 tunes)\n"));
        assert!(text.contains("hornpipe\n  The Galway Hornpipe  https://thesession.org/tunes/1\n"));
    }
}

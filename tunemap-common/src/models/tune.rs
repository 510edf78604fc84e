//! Tune model

use serde::{Deserialize, Serialize};

/// Consolidated tune record
///
/// `names` holds the canonical name first, then aliases in source order.
/// Duplicates are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tune {
    pub id: u64,
    /// Tune type label (reel, jig, slide, ...)
    #[serde(rename = "type")]
    pub kind: String,
    pub names: Vec<String>,
}

impl Tune {
    pub fn new(id: u64, kind: impl Into<String>, canonical_name: impl Into<String>) -> Self {
        Self {
            id,
            kind: kind.into(),
            names: vec![canonical_name.into()],
        }
    }

    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names.extend(aliases.into_iter().map(Into::into));
        self
    }

    /// First name variant, or "" for a record that breaks the non-empty invariant
    pub fn canonical_name(&self) -> &str {
        self.names.first().map(String::as_str).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tune_json_shape() {
        let tune = Tune::new(42, "reel", "Silver Spear, The").with_aliases(["The Silver Spear"]);
        let json = serde_json::to_value(&tune).unwrap();

        assert_eq!(json["id"], 42);
        assert_eq!(json["type"], "reel");
        assert_eq!(json["names"][0], "Silver Spear, The");
        assert_eq!(json["names"][1], "The Silver Spear");
        assert_eq!(tune.canonical_name(), "Silver Spear, The");
    }
}

//! Ground-truth label remapping.
//!
//! Datasets label PII with their own vocabulary (`NAME_STUDENT`,
//! `PHONE_NUM`, ...). A [`LabelMap`] renames ground-truth labels into the
//! detector vocabulary before matching. Predictions are never remapped, and a
//! label missing from the table maps to itself.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Raw label to canonical label table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelMap(BTreeMap<String, String>);

impl LabelMap {
    /// Empty table: every label maps to itself.
    #[must_use]
    pub fn identity() -> Self {
        Self::default()
    }

    /// Mapping for the Kaggle PII detection corpus labels.
    #[must_use]
    pub fn kaggle_default() -> Self {
        Self::from_pairs([
            ("USERNAME", "USERNAME"),
            ("ID_NUM", "ID_NUM"),
            ("EMAIL", "EMAIL"),
            ("URL_PERSONAL", "URL"),
            ("PHONE_NUM", "PHONE"),
            ("STREET_ADDRESS", "ADDRESS"),
            ("NAME_STUDENT", "PERSON"),
            ("NAME_TEACHER", "PERSON"),
            ("LOCATION", "LOC"),
            ("DATE_OB", "DATE"),
        ])
    }

    /// Build from `(raw, canonical)` pairs. Later pairs win.
    #[must_use]
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Add or replace one entry.
    pub fn insert(&mut self, raw: impl Into<String>, canonical: impl Into<String>) {
        self.0.insert(raw.into(), canonical.into());
    }

    /// Canonical label for `raw`; `raw` itself if unmapped.
    #[must_use]
    pub fn map<'a>(&'a self, raw: &'a str) -> &'a str {
        self.0.get(raw).map_or(raw, String::as_str)
    }

    /// Number of explicit entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_passthrough() {
        let map = LabelMap::identity();
        assert_eq!(map.map("ANYTHING"), "ANYTHING");
        assert!(map.is_empty());
    }

    #[test]
    fn test_kaggle_default() {
        let map = LabelMap::kaggle_default();
        assert_eq!(map.map("NAME_STUDENT"), "PERSON");
        assert_eq!(map.map("NAME_TEACHER"), "PERSON");
        assert_eq!(map.map("PHONE_NUM"), "PHONE");
        assert_eq!(map.map("URL_PERSONAL"), "URL");
        assert_eq!(map.map("STREET_ADDRESS"), "ADDRESS");
        assert_eq!(map.map("EMAIL"), "EMAIL");
        // Absent labels fall through unchanged.
        assert_eq!(map.map("B-WHATEVER"), "B-WHATEVER");
        assert_eq!(map.len(), 10);
    }

    #[test]
    fn test_toml_table_roundtrip() {
        let map: LabelMap = toml::from_str("NAME = \"PERSON\"\nPHONE_NUM = \"PHONE\"").unwrap();
        assert_eq!(map.map("NAME"), "PERSON");
        let mut map = map;
        map.insert("NAME", "ORG");
        assert_eq!(map.map("NAME"), "ORG");
    }
}

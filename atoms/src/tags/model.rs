use crate::posts::model::RawId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Tag → item identifiers, as loaded from one index object (monolithic or one shard)
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(from = "HashMap<String, Vec<RawId>>")]
pub struct TagIndex {
    entries: BTreeMap<String, Vec<String>>,
}

impl From<HashMap<String, Vec<RawId>>> for TagIndex {
    fn from(raw: HashMap<String, Vec<RawId>>) -> Self {
        let entries = raw
            .into_iter()
            .map(|(tag, ids)| {
                (
                    tag.to_lowercase(),
                    ids.into_iter().map(String::from).collect(),
                )
            })
            .collect();
        Self { entries }
    }
}

impl TagIndex {
    pub fn get(&self, tag: &str) -> Option<&[String]> {
        self.entries.get(tag).map(|ids| ids.as_slice())
    }

    /// Tags in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(tag, ids)| (tag.as_str(), ids.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Autocomplete suggestion
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TagSuggestion {
    pub name: String,
    pub post_count: usize,
    pub category: u8,
}

use serde::{Deserialize, Deserializer, Serialize};

/// Identifier as it appears in index files: either a string or a bare JSON number.
#[derive(Debug, Deserialize, Clone)]
#[serde(untagged)]
pub enum RawId {
    Text(String),
    Signed(i64),
    Unsigned(u64),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(s) => s,
            RawId::Signed(n) => n.to_string(),
            RawId::Unsigned(n) => n.to_string(),
        }
    }
}

pub(crate) fn de_item_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    RawId::deserialize(deserializer).map(String::from)
}

fn default_rating() -> String {
    "safe".to_string()
}

/// Item record as stored in the batch files
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ItemRecord {
    #[serde(deserialize_with = "de_item_id")]
    pub id: String,
    #[serde(default, alias = "fileUrl")]
    pub file_url: String,
    #[serde(default, alias = "thumbnailUrl")]
    pub thumbnail_url: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default = "default_rating")]
    pub rating: String,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub created_at: String,
}

/// One numbered batch file: `items/batch-NNN.json`
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ItemBatch {
    #[serde(default)]
    pub total_items: Option<usize>,
    #[serde(default, alias = "images")]
    pub items: Vec<ItemRecord>,
}

impl ItemBatch {
    pub fn total(&self) -> usize {
        self.total_items.unwrap_or(self.items.len())
    }
}

/// Post shape returned to the gallery front end (both sources)
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Post {
    pub id: String,
    pub file_url: String,
    pub preview_url: String,
    pub large_file_url: String,
    #[serde(rename = "thumbnailUrl")]
    pub thumbnail_url: String,
    pub tag_string: String,
    pub tag_string_artist: String,
    pub rating: String,
    pub score: i64,
    pub created_at: String,
    pub file_ext: String,
    pub source: String,
}

/// Post as returned by the external catalog (Danbooru schema)
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ExternalPost {
    #[serde(default, deserialize_with = "de_opt_item_id")]
    pub id: Option<String>,
    pub file_url: Option<String>,
    pub large_file_url: Option<String>,
    pub preview_file_url: Option<String>,
    pub tag_string: Option<String>,
    pub tag_string_artist: Option<String>,
    pub rating: Option<String>,
    pub score: Option<i64>,
    pub created_at: Option<String>,
    pub file_ext: Option<String>,
}

fn de_opt_item_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<RawId>::deserialize(deserializer).map(|raw| raw.map(String::from))
}

use gallery_atoms::posts::Post;
use serde::{Deserialize, Serialize};

pub const SOURCE_HISTORICAL: &str = "historical";
pub const SOURCE_EXTERNAL: &str = "external";
pub const SOURCE_UNIFIED: &str = "unified";

/// Ranked, paged records from one source
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    pub posts: Vec<Post>,
    /// All matches before pagination
    pub total: usize,
}

/// Per-source totals, reported in unified mode
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct SourceCounts {
    pub local: usize,
    pub external: usize,
}

/// Body of a search response
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SearchResponse {
    pub posts: Vec<Post>,
    pub total: usize,
    pub page: u32,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<SourceCounts>,
}

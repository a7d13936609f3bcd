use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 42;
pub const MAX_LIMIT: u32 = 200;
pub const DEFAULT_AUTOCOMPLETE_LIMIT: usize = 20;
pub const MAX_AUTOCOMPLETE_LIMIT: usize = 100;

/// Which backing source(s) a search consults
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    #[default]
    Unified,
    Historical,
    External,
}

impl SearchMode {
    /// Lenient parse: legacy aliases are accepted, anything unknown is `Unified`
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "historical" | "local" => SearchMode::Historical,
            "external" | "danbooru" => SearchMode::External,
            _ => SearchMode::Unified,
        }
    }
}

/// Raw query-string parameters, exactly as received
#[derive(Debug, Deserialize, Clone, Default)]
pub struct SearchParams {
    pub tags: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
    pub mode: Option<String>,
    pub autocomplete: Option<String>,
}

/// Validated search query
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub tags: String,
    pub page: u32,
    pub limit: u32,
    pub mode: SearchMode,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            tags: String::new(),
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            mode: SearchMode::Unified,
        }
    }
}

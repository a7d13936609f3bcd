use std::env;
use std::str::FromStr;
use std::time::Duration;

use search_block::engine::{DEFAULT_BATCH_COUNT, DEFAULT_BATCH_FANOUT};
use search_block::external::DEFAULT_USER_AGENT;
use search_block::{EngineSettings, TagIndexLayout};

pub const DEFAULT_STORAGE_BASE_URL: &str = "https://pub-4362d916855b41209502ea1705f6d048.r2.dev";
pub const DEFAULT_EXTERNAL_API_URL: &str = "https://danbooru.donmai.us";

/// Where the tag index and item batches are read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexSource {
    /// Public base URL (`STORAGE_BASE_URL`)
    Http,
    /// Private bucket (`S3_INDEX_BUCKET`) through the AWS SDK
    S3,
}

/// Lambda configuration, read once per cold start
#[derive(Debug, Clone)]
pub struct Config {
    pub index_source: IndexSource,
    pub storage_base_url: String,
    pub index_prefix: String,
    pub s3_index_bucket: String,
    pub tag_layout: TagIndexLayout,
    pub batch_count: usize,
    pub batch_fanout: usize,
    pub fetch_timeout: Duration,
    pub cache_ttl: Option<Duration>,
    pub external_api_url: String,
    pub external_user_agent: String,
    /// Private bucket holding `search-index.json` for /api/serve-index
    pub serve_index_bucket: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from any variable source; missing or unparsable values use defaults
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |name: &str, default: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        let number = |name: &str, default: u64| parse_or(lookup(name), default);

        let serve_index_bucket = text("S3_BUCKET_NAME", "dirty4-historical");
        let index_source = match text("INDEX_SOURCE", "http").to_ascii_lowercase().as_str() {
            "s3" => IndexSource::S3,
            _ => IndexSource::Http,
        };

        Self {
            index_source,
            storage_base_url: text("STORAGE_BASE_URL", DEFAULT_STORAGE_BASE_URL),
            index_prefix: text("INDEX_PREFIX", "indices"),
            s3_index_bucket: text("S3_INDEX_BUCKET", &serve_index_bucket),
            tag_layout: TagIndexLayout::parse(&text("TAG_INDEX_LAYOUT", "sharded")),
            batch_count: number("BATCH_COUNT", DEFAULT_BATCH_COUNT as u64).max(1) as usize,
            batch_fanout: number("BATCH_FANOUT", DEFAULT_BATCH_FANOUT as u64).max(1) as usize,
            fetch_timeout: Duration::from_secs(number("FETCH_TIMEOUT_SECS", 10).max(1)),
            cache_ttl: lookup("CACHE_TTL_SECS")
                .and_then(|v| v.trim().parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
            external_api_url: text("EXTERNAL_API_URL", DEFAULT_EXTERNAL_API_URL),
            external_user_agent: text("EXTERNAL_USER_AGENT", DEFAULT_USER_AGENT),
            serve_index_bucket,
        }
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            storage_base_url: self.storage_base_url.clone(),
            layout: self.tag_layout,
            batch_count: self.batch_count,
            batch_fanout: self.batch_fanout,
        }
    }
}

fn parse_or<T: FromStr>(raw: Option<String>, default: T) -> T {
    raw.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

//! Everything the API lambda holds across invocations: configuration, the
//! search engine and the outbound clients, plus the proxy handlers.

pub mod config;
pub mod index_proxy;
pub mod page_proxy;
mod response;
pub mod video_proxy;

use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;
use search_block::{
    DanbooruClient, HttpIndexStore, IndexStore, S3IndexStore, SearchCaches, SearchEngine,
    ShardCache,
};

use crate::config::{Config, IndexSource};
use crate::index_proxy::INDEX_CACHE_TTL;

/// Built once per cold start and shared by every request
pub struct AppState {
    pub config: Config,
    pub http_client: reqwest::Client,
    pub engine: SearchEngine,
    /// Private bucket behind /api/serve-index
    pub index_files: S3IndexStore,
    pub index_cache: ShardCache<serde_json::Value>,
}

impl AppState {
    pub fn new(config: Config, s3_client: S3Client) -> Result<Self, reqwest::Error> {
        let http_client = reqwest::Client::builder().build()?;

        let store: Arc<dyn IndexStore> = match config.index_source {
            IndexSource::Http => Arc::new(HttpIndexStore::new(
                http_client.clone(),
                &config.storage_base_url,
                &config.index_prefix,
                config.fetch_timeout,
            )),
            IndexSource::S3 => Arc::new(S3IndexStore::new(
                s3_client.clone(),
                &config.s3_index_bucket,
                &config.index_prefix,
                config.fetch_timeout,
            )),
        };

        let external = Arc::new(DanbooruClient::new(
            http_client.clone(),
            &config.external_api_url,
            &config.external_user_agent,
            config.fetch_timeout,
        ));

        let engine = SearchEngine::new(
            store,
            external,
            Arc::new(SearchCaches::new(config.cache_ttl)),
            config.engine_settings(),
        );

        let index_files = S3IndexStore::new(
            s3_client,
            &config.serve_index_bucket,
            "",
            config.fetch_timeout,
        );

        Ok(Self {
            config,
            http_client,
            engine,
            index_files,
            index_cache: ShardCache::new(Some(INDEX_CACHE_TTL)),
        })
    }
}

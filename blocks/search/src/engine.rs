//! Search engine: local tag search over the hosted index, external backfill,
//! and autocomplete. All state lives in the injected store, catalog and caches.

use std::sync::Arc;

use gallery_atoms::posts::local_post;
use gallery_atoms::query::{SearchMode, SearchQuery};
use gallery_atoms::tags::TagSuggestion;

use crate::autocomplete::autocomplete;
use crate::cache::SearchCaches;
use crate::external::ExternalCatalog;
use crate::items::{paginate, rank, ItemResolver};
use crate::store::IndexStore;
use crate::tags::{Resolution, TagIndexLayout, TagResolver};
use crate::types::{
    ResultSet, SearchResponse, SourceCounts, SOURCE_EXTERNAL, SOURCE_HISTORICAL, SOURCE_UNIFIED,
};

pub const DEFAULT_BATCH_COUNT: usize = 50;
pub const DEFAULT_BATCH_FANOUT: usize = 5;

#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Base URL that relative `file_url` / `thumbnail_url` paths resolve against
    pub storage_base_url: String,
    pub layout: TagIndexLayout,
    pub batch_count: usize,
    pub batch_fanout: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            storage_base_url: String::new(),
            layout: TagIndexLayout::Sharded,
            batch_count: DEFAULT_BATCH_COUNT,
            batch_fanout: DEFAULT_BATCH_FANOUT,
        }
    }
}

pub struct SearchEngine {
    store: Arc<dyn IndexStore>,
    external: Arc<dyn ExternalCatalog>,
    caches: Arc<SearchCaches>,
    settings: EngineSettings,
}

impl SearchEngine {
    pub fn new(
        store: Arc<dyn IndexStore>,
        external: Arc<dyn ExternalCatalog>,
        caches: Arc<SearchCaches>,
        settings: EngineSettings,
    ) -> Self {
        tracing::info!(
            "Search engine over {} ({:?} tags, {} batches, fan-out {})",
            store.describe(),
            settings.layout,
            settings.batch_count,
            settings.batch_fanout
        );
        Self {
            store,
            external,
            caches,
            settings,
        }
    }

    pub fn caches(&self) -> &SearchCaches {
        &self.caches
    }

    fn tag_resolver(&self) -> TagResolver<'_> {
        TagResolver::new(
            self.store.as_ref(),
            &self.caches.tag_shards,
            self.settings.layout,
        )
    }

    fn item_resolver(&self) -> ItemResolver<'_> {
        ItemResolver::new(
            self.store.as_ref(),
            &self.caches.batches,
            self.settings.batch_count,
            self.settings.batch_fanout,
        )
    }

    /// Dispatch on the query's mode
    pub async fn search(&self, query: &SearchQuery) -> SearchResponse {
        match query.mode {
            SearchMode::Unified => self.search_unified(query).await,
            SearchMode::Historical => {
                let local = self.search_local(query).await;
                SearchResponse {
                    posts: local.posts,
                    total: local.total,
                    page: query.page,
                    source: SOURCE_HISTORICAL.to_string(),
                    sources: None,
                }
            }
            SearchMode::External => {
                let external = self
                    .search_external(&query.tags, query.page, query.limit)
                    .await;
                SearchResponse {
                    posts: external.posts,
                    total: external.total,
                    page: query.page,
                    source: SOURCE_EXTERNAL.to_string(),
                    sources: None,
                }
            }
        }
    }

    /// Tag search over the hosted index only
    pub async fn search_local(&self, query: &SearchQuery) -> ResultSet {
        let offset = query.offset();
        let limit = query.limit as usize;
        let items = self.item_resolver();

        let (records, total) = match self.tag_resolver().resolve(&query.tags).await {
            Resolution::Unfiltered => items.default_listing(offset, limit).await,
            Resolution::Candidates { ids, kind } => {
                tracing::info!(
                    "🏷️ \"{}\" resolved to {} candidates ({:?})",
                    query.tags,
                    ids.len(),
                    kind
                );
                let mut located = items.locate(&ids).await;
                rank(&mut located);
                (paginate(&located, offset, limit), located.len())
            }
        };

        ResultSet {
            posts: records
                .iter()
                .map(|item| local_post(item, &self.settings.storage_base_url))
                .collect(),
            total,
        }
    }

    /// External catalog only; any failure is an empty result
    pub async fn search_external(&self, tags: &str, page: u32, limit: u32) -> ResultSet {
        match self.external.search(tags, page, limit).await {
            Ok(mut result) => {
                result.posts.truncate(limit as usize);
                ResultSet {
                    posts: result.posts,
                    total: result.total,
                }
            }
            Err(e) => {
                tracing::warn!("External catalog unavailable, continuing without it: {}", e);
                ResultSet::default()
            }
        }
    }

    /// Local first; the external catalog only fills a short page
    pub async fn search_unified(&self, query: &SearchQuery) -> SearchResponse {
        let limit = query.limit as usize;
        let local = self.search_local(query).await;

        if local.posts.len() >= limit {
            return SearchResponse {
                posts: local.posts,
                total: local.total,
                page: query.page,
                source: SOURCE_HISTORICAL.to_string(),
                sources: Some(SourceCounts {
                    local: local.total,
                    external: 0,
                }),
            };
        }

        let remaining = (limit - local.posts.len()) as u32;
        let external = self
            .search_external(&query.tags, query.page, remaining)
            .await;

        let source = if external.posts.is_empty() {
            SOURCE_HISTORICAL
        } else {
            SOURCE_UNIFIED
        };

        let mut posts = local.posts;
        posts.extend(external.posts);
        posts.truncate(limit);

        SearchResponse {
            posts,
            total: local.total + external.total,
            page: query.page,
            source: source.to_string(),
            sources: Some(SourceCounts {
                local: local.total,
                external: external.total,
            }),
        }
    }

    pub async fn autocomplete(&self, raw: &str, limit: usize) -> Vec<TagSuggestion> {
        autocomplete(&self.tag_resolver(), raw, limit).await
    }
}

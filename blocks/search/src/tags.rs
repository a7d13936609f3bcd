//! Tag resolution: free-text query → candidate item identifiers.

use std::collections::HashSet;
use std::sync::Arc;

use gallery_atoms::tags::{normalize_query, shard_key, tokenize, TagIndex};

use crate::cache::ShardCache;
use crate::error::FetchError;
use crate::gather::{gather_settled, partition_settled};
use crate::store::{fetch_json, IndexStore};

/// At most this many tags feed a substring expansion
pub const PARTIAL_MATCH_LIMIT: usize = 10;

const MONOLITHIC_KEY: &str = "tag-index.json";

/// How the tag index is laid out in storage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TagIndexLayout {
    /// One `tag-index.json` object
    Monolithic,
    /// One `tags/{first char}.json` object per shard
    #[default]
    Sharded,
}

impl TagIndexLayout {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "monolithic" | "single" => TagIndexLayout::Monolithic,
            _ => TagIndexLayout::Sharded,
        }
    }

    /// Storage key of the object holding `tag`
    pub fn key_for(&self, tag: &str) -> String {
        match self {
            TagIndexLayout::Monolithic => MONOLITHIC_KEY.to_string(),
            TagIndexLayout::Sharded => format!("tags/{}.json", shard_key(tag)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// The whole query is a tag
    Exact,
    /// Every token is a tag; ids carry all of them
    Intersection,
    /// Best-effort: tags containing the query
    Partial,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Empty query: no tag filter
    Unfiltered,
    Candidates { ids: HashSet<String>, kind: MatchKind },
}

impl Resolution {
    fn candidates(ids: HashSet<String>, kind: MatchKind) -> Self {
        Resolution::Candidates { ids, kind }
    }
}

pub struct TagResolver<'a> {
    store: &'a dyn IndexStore,
    cache: &'a ShardCache<TagIndex>,
    layout: TagIndexLayout,
}

impl<'a> TagResolver<'a> {
    pub fn new(
        store: &'a dyn IndexStore,
        cache: &'a ShardCache<TagIndex>,
        layout: TagIndexLayout,
    ) -> Self {
        Self {
            store,
            cache,
            layout,
        }
    }

    /// Index object holding `tag`, read through the cache
    pub async fn load_for(&self, tag: &str) -> Result<Arc<TagIndex>, FetchError> {
        let key = self.layout.key_for(tag);
        self.cache
            .get_or_try_load(&key, || async {
                let index: TagIndex = fetch_json(self.store, &key).await?;
                tracing::info!("📚 Loaded tag index {} ({} tags)", key, index.len());
                Ok::<_, FetchError>(index)
            })
            .await
    }

    pub async fn resolve(&self, raw_query: &str) -> Resolution {
        let query = normalize_query(raw_query);
        if query.is_empty() {
            return Resolution::Unfiltered;
        }

        let tokens = tokenize(&query);
        let phrase = tokens.join(" ");

        let phrase_index = match self.load_for(&phrase).await {
            Ok(index) => Some(index),
            Err(e) => {
                tracing::warn!("Tag index unavailable for \"{}\": {}", phrase, e);
                None
            }
        };

        if let Some(ids) = phrase_index.as_ref().and_then(|index| index.get(&phrase)) {
            if !ids.is_empty() {
                return Resolution::candidates(ids.iter().cloned().collect(), MatchKind::Exact);
            }
        }

        if tokens.len() > 1 {
            let ids = self.intersect(&tokens).await;
            return Resolution::candidates(ids, MatchKind::Intersection);
        }

        let ids = phrase_index
            .map(|index| expand_partial(&index, &phrase))
            .unwrap_or_default();
        Resolution::candidates(ids, MatchKind::Partial)
    }

    /// AND over all tokens. Tokens whose shard failed to load are skipped;
    /// a token that loaded but has no entry empties the result.
    async fn intersect(&self, tokens: &[&str]) -> HashSet<String> {
        let mut unique: Vec<&str> = Vec::with_capacity(tokens.len());
        for &token in tokens {
            if !unique.contains(&token) {
                unique.push(token);
            }
        }

        let lookups = unique.iter().map(|token| async move {
            let index = self.load_for(token).await?;
            let ids: HashSet<String> = index
                .get(token)
                .map(|ids| ids.iter().cloned().collect())
                .unwrap_or_default();
            Ok::<_, FetchError>(ids)
        });

        let (sets, failures) = partition_settled(gather_settled(lookups).await);
        for e in &failures {
            tracing::warn!("Skipping tag token, shard unavailable: {}", e);
        }

        let mut sets = sets.into_iter();
        let Some(first) = sets.next() else {
            return HashSet::new();
        };
        sets.fold(first, |acc, set| acc.intersection(&set).cloned().collect())
    }
}

/// Ids of the first [`PARTIAL_MATCH_LIMIT`] tags (key order) containing `query`
pub fn expand_partial(index: &TagIndex, query: &str) -> HashSet<String> {
    index
        .iter()
        .filter(|(tag, _)| tag.contains(query))
        .take(PARTIAL_MATCH_LIMIT)
        .flat_map(|(_, ids)| ids.iter().cloned())
        .collect()
}

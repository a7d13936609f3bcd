use gallery_atoms::tags::{normalize_query, TagIndex, TagSuggestion};

use crate::tags::TagResolver;

/// Suggestions for the last token of `raw`, read from the tag index
pub async fn autocomplete(
    resolver: &TagResolver<'_>,
    raw: &str,
    limit: usize,
) -> Vec<TagSuggestion> {
    let query = normalize_query(raw);
    let Some(target) = query.split_whitespace().last() else {
        return Vec::new();
    };

    match resolver.load_for(target).await {
        Ok(index) => suggest(&index, target, limit),
        Err(e) => {
            tracing::warn!("Autocomplete index unavailable for \"{}\": {}", target, e);
            Vec::new()
        }
    }
}

/// Tags containing `target`: prefix matches first, then larger tags, then by name
pub fn suggest(index: &TagIndex, target: &str, limit: usize) -> Vec<TagSuggestion> {
    let mut matches: Vec<(bool, &str, usize)> = index
        .iter()
        .filter(|(tag, _)| tag.contains(target))
        .map(|(tag, ids)| (tag.starts_with(target), tag, ids.len()))
        .collect();

    matches.sort_by(|a, b| {
        b.0.cmp(&a.0)
            .then_with(|| b.2.cmp(&a.2))
            .then_with(|| a.1.cmp(b.1))
    });

    matches
        .into_iter()
        .take(limit)
        .map(|(_, name, post_count)| TagSuggestion {
            name: name.to_string(),
            post_count,
            category: 0,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ShardCache;
    use crate::store::MemoryIndexStore;
    use crate::tags::TagIndexLayout;
    use serde_json::json;

    fn store() -> MemoryIndexStore {
        MemoryIndexStore::new()
            .with_json(
                "tags/g.json",
                json!({
                    "genshin_impact": ["1", "2", "3"],
                    "genshin_impact_(cosplay)": ["4"],
                    "gensokyo": ["5", "6"],
                }),
            )
            .with_json(
                "tags/i.json",
                json!({ "impa": ["1"], "imp": ["2", "3"] }),
            )
    }

    #[tokio::test]
    async fn test_case_insensitive() {
        let store = store();
        let cache = ShardCache::unbounded();
        let resolver = TagResolver::new(&store, &cache, TagIndexLayout::Sharded);

        let suggestions = autocomplete(&resolver, "GENSH", 10).await;
        assert_eq!(suggestions[0].name, "genshin_impact");
        assert_eq!(suggestions[0].post_count, 3);
        assert_eq!(suggestions.len(), 2);
    }

    #[tokio::test]
    async fn test_completes_last_token_only() {
        let store = store();
        let cache = ShardCache::unbounded();
        let resolver = TagResolver::new(&store, &cache, TagIndexLayout::Sharded);

        let names: Vec<String> = autocomplete(&resolver, "genshin imp", 10)
            .await
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["imp", "impa"]);
    }

    #[tokio::test]
    async fn test_empty_and_limit() {
        let store = store();
        let cache = ShardCache::unbounded();
        let resolver = TagResolver::new(&store, &cache, TagIndexLayout::Sharded);

        assert!(autocomplete(&resolver, "   ", 10).await.is_empty());
        assert_eq!(store.total_fetches(), 0);
        assert_eq!(autocomplete(&resolver, "g", 1).await.len(), 1);
        assert!(autocomplete(&resolver, "nonexistent", 10).await.is_empty());
    }

    #[test]
    fn test_prefix_matches_rank_first() {
        let index: TagIndex = serde_json::from_value(json!({
            "ahoge": ["1", "2", "3", "4"],
            "hoge": ["1"],
        }))
        .unwrap();
        let names: Vec<String> = suggest(&index, "hoge", 5).into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["hoge", "ahoge"]);
    }
}

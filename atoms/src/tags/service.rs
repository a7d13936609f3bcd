/// Trim + lowercase; the only normalization applied to tag queries
pub fn normalize_query(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Whitespace-delimited tokens of an already normalized query
pub fn tokenize(query: &str) -> Vec<&str> {
    query.split_whitespace().collect()
}

/// Shard key of a tag in the sharded layout: its first character when
/// ASCII alphanumeric, `_` otherwise.
pub fn shard_key(tag: &str) -> String {
    match tag.chars().next() {
        Some(c) if c.is_ascii_alphanumeric() => c.to_ascii_lowercase().to_string(),
        _ => "_".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags::model::TagIndex;

    #[test]
    fn test_normalize_and_tokenize() {
        let q = normalize_query("  Lumine   PAIMON ");
        assert_eq!(q, "lumine   paimon");
        assert_eq!(tokenize(&q), vec!["lumine", "paimon"]);
    }

    #[test]
    fn test_shard_key() {
        assert_eq!(shard_key("genshin_impact"), "g");
        assert_eq!(shard_key("9s"), "9");
        assert_eq!(shard_key(":d"), "_");
        assert_eq!(shard_key("ß"), "_");
        assert_eq!(shard_key(""), "_");
    }

    #[test]
    fn test_tag_index_accepts_numeric_ids() {
        let index: TagIndex =
            serde_json::from_str(r#"{ "a": [1, 2], "B": ["2", "x3"] }"#).unwrap();
        assert_eq!(index.get("a").unwrap(), &["1".to_string(), "2".to_string()]);
        assert_eq!(index.get("b").unwrap().len(), 2);
        assert_eq!(index.iter().map(|(t, _)| t).collect::<Vec<_>>(), vec!["a", "b"]);
    }
}

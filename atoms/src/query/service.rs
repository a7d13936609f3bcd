use super::model::{
    SearchMode, SearchParams, SearchQuery, DEFAULT_AUTOCOMPLETE_LIMIT, DEFAULT_LIMIT,
    DEFAULT_PAGE, MAX_AUTOCOMPLETE_LIMIT, MAX_LIMIT,
};

/// Positive integer or `None`; never panics on garbage input
fn parse_positive(raw: Option<&str>) -> Option<u32> {
    raw?.trim().parse::<u32>().ok().filter(|n| *n >= 1)
}

impl SearchQuery {
    pub fn from_params(params: &SearchParams) -> Self {
        Self {
            tags: params.tags.clone().unwrap_or_default(),
            page: parse_positive(params.page.as_deref()).unwrap_or(DEFAULT_PAGE),
            limit: parse_positive(params.limit.as_deref())
                .unwrap_or(DEFAULT_LIMIT)
                .min(MAX_LIMIT),
            mode: params
                .mode
                .as_deref()
                .map(SearchMode::parse)
                .unwrap_or_default(),
        }
    }

    /// Number of records to skip for the current page
    pub fn offset(&self) -> usize {
        (self.page as usize - 1) * self.limit as usize
    }
}

/// Autocomplete uses its own default; the search default of 42 does not apply
pub fn autocomplete_limit(params: &SearchParams) -> usize {
    parse_positive(params.limit.as_deref())
        .map(|n| n as usize)
        .unwrap_or(DEFAULT_AUTOCOMPLETE_LIMIT)
        .min(MAX_AUTOCOMPLETE_LIMIT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(page: &str, limit: &str, mode: &str) -> SearchParams {
        SearchParams {
            tags: Some("lumine".to_string()),
            page: Some(page.to_string()),
            limit: Some(limit.to_string()),
            mode: Some(mode.to_string()),
            autocomplete: None,
        }
    }

    #[test]
    fn test_defaults_when_missing() {
        let q = SearchQuery::from_params(&SearchParams::default());
        assert_eq!(q, SearchQuery::default());
        assert_eq!(q.offset(), 0);
    }

    #[test]
    fn test_malformed_numbers_fall_back() {
        let q = SearchQuery::from_params(&params("abc", "not-a-number", "historical"));
        assert_eq!(q.page, 1);
        assert_eq!(q.limit, 42);
        assert_eq!(q.mode, SearchMode::Historical);

        let q = SearchQuery::from_params(&params("0", "-5", "unified"));
        assert_eq!(q.page, 1);
        assert_eq!(q.limit, 42);
    }

    #[test]
    fn test_limit_is_clamped_and_offset() {
        let q = SearchQuery::from_params(&params("3", "5000", "external"));
        assert_eq!(q.limit, MAX_LIMIT);
        assert_eq!(q.offset(), 2 * MAX_LIMIT as usize);
        assert_eq!(q.mode, SearchMode::External);
    }

    #[test]
    fn test_mode_aliases() {
        assert_eq!(SearchMode::parse("danbooru"), SearchMode::External);
        assert_eq!(SearchMode::parse("all"), SearchMode::Unified);
        assert_eq!(SearchMode::parse(" Historical "), SearchMode::Historical);
        assert_eq!(SearchMode::parse("debug"), SearchMode::Unified);
    }

    #[test]
    fn test_autocomplete_limit() {
        assert_eq!(autocomplete_limit(&SearchParams::default()), 20);
        assert_eq!(autocomplete_limit(&params("1", "1", "")), 1);
        assert_eq!(autocomplete_limit(&params("1", "999", "")), 100);
    }
}

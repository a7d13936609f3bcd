use gallery_atoms::query::{autocomplete_limit, SearchParams, SearchQuery};
use lambda_http::{http::StatusCode, Body, Error, Response};

use crate::engine::SearchEngine;

/// HTTP Handler: GET /api/search
///
/// `autocomplete` switches the route to tag suggestions; everything else is a search.
pub async fn search_handler(
    engine: &SearchEngine,
    params: &SearchParams,
) -> Result<Response<Body>, Error> {
    if let Some(partial) = params.autocomplete.as_deref() {
        let limit = autocomplete_limit(params);
        let suggestions = engine.autocomplete(partial, limit).await;
        tracing::info!(
            "💡 Autocomplete \"{}\" -> {} suggestions",
            partial,
            suggestions.len()
        );

        return Ok(Response::builder()
            .status(StatusCode::OK)
            .header("Content-Type", "application/json")
            .body(serde_json::to_string(&suggestions)?.into())
            .map_err(Box::new)?);
    }

    let query = SearchQuery::from_params(params);
    tracing::info!(
        "🔍 Search request: tags=\"{}\" page={} limit={} mode={:?}",
        query.tags,
        query.page,
        query.limit,
        query.mode
    );

    let response = engine.search(&query).await;
    tracing::info!(
        "✅ Search \"{}\" -> {} posts of {} ({})",
        query.tags,
        response.posts.len(),
        response.total,
        response.source
    );

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "application/json")
        .body(serde_json::to_string(&response)?.into())
        .map_err(Box::new)?)
}

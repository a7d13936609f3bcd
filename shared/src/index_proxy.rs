use std::time::Duration;

use lambda_http::{http::StatusCode, Body, Error, Response};
use search_block::store::fetch_json;
use search_block::{IndexStore, ShardCache};
use serde_json::{json, Value};

use crate::response::json_response;

/// Served index files are refreshed at most this often
pub const INDEX_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    Search,
    Autocomplete,
}

impl IndexKind {
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        match raw? {
            "search" => Some(Self::Search),
            "autocomplete" => Some(Self::Autocomplete),
            _ => None,
        }
    }

    pub fn object_key(self) -> &'static str {
        match self {
            Self::Search => "search-index.json",
            Self::Autocomplete => "search-index-autocomplete.json",
        }
    }

    fn entry_count(self, index: &Value) -> usize {
        match self {
            Self::Search => index
                .get("total_items")
                .and_then(Value::as_u64)
                .unwrap_or(0) as usize,
            Self::Autocomplete => index
                .get("tags")
                .and_then(Value::as_object)
                .map(|tags| tags.len())
                .unwrap_or(0),
        }
    }
}

/// HTTP Handler: GET /api/serve-index?type=search|autocomplete
///
/// Fresh cache hits are served directly. When the bucket read fails, the last
/// copy we loaded is served regardless of age.
pub async fn serve_index(
    store: &dyn IndexStore,
    cache: &ShardCache<Value>,
    kind: Option<&str>,
) -> Result<Response<Body>, Error> {
    let Some(kind) = IndexKind::parse(kind) else {
        return json_response(
            StatusCode::BAD_REQUEST,
            &json!({ "error": "Invalid type parameter" }),
        );
    };
    let key = kind.object_key();

    if let Some(index) = cache.get(key).await {
        return json_response(StatusCode::OK, index.as_ref());
    }

    tracing::info!("📥 Fetching {:?} index from {}", kind, store.describe());
    match fetch_json::<Value>(store, key).await {
        Ok(index) => {
            tracing::info!(
                "✅ Loaded {:?} index: {} entries",
                kind,
                kind.entry_count(&index)
            );
            let index = cache.insert(key, index).await;
            json_response(StatusCode::OK, index.as_ref())
        }
        Err(e) => {
            tracing::error!("Failed to fetch {:?} index: {}", kind, e);
            match cache.get_stale(key).await {
                Some(index) => json_response(StatusCode::OK, index.as_ref()),
                None => json_response(
                    StatusCode::NOT_FOUND,
                    &json!({ "error": "Index not found" }),
                ),
            }
        }
    }
}

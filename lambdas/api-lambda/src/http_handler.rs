use gallery_atoms::query::SearchParams;
use gallery_shared::index_proxy::serve_index;
use gallery_shared::page_proxy::{proxy_page, PAGE_PROXY_TIMEOUT};
use gallery_shared::video_proxy::{proxy_video, VIDEO_PROXY_TIMEOUT};
use gallery_shared::AppState;
use lambda_http::http::header::HeaderValue;
use lambda_http::{http::StatusCode, Body, Error, Request, RequestExt, Response};
use search_block::http::search_handler;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Search,
    PageProxy,
    VideoProxy,
    ServeIndex,
}

impl Route {
    /// `/api/search` and `/search` are the same route
    fn from_path(path: &str) -> Option<Self> {
        let path = path.trim_end_matches('/');
        let path = path.strip_prefix("/api").unwrap_or(path);
        match path {
            "/search" => Some(Self::Search),
            "/proxy" => Some(Self::PageProxy),
            "/video-proxy" => Some(Self::VideoProxy),
            "/serve-index" => Some(Self::ServeIndex),
            _ => None,
        }
    }

    fn allowed_methods(route: Option<Self>) -> &'static str {
        match route {
            Some(Self::PageProxy) => "GET, POST, PUT, DELETE, OPTIONS",
            _ => "GET, OPTIONS",
        }
    }

    fn allowed_headers(route: Option<Self>) -> &'static str {
        match route {
            Some(Self::VideoProxy) => "Range, Content-Type",
            _ => "Content-Type",
        }
    }
}

fn with_cors_headers(mut resp: Response<Body>, route: Option<Route>) -> Response<Body> {
    let headers = resp.headers_mut();
    headers.insert("Access-Control-Allow-Origin", HeaderValue::from_static("*"));
    headers.insert(
        "Access-Control-Allow-Methods",
        HeaderValue::from_static(Route::allowed_methods(route)),
    );
    headers.insert(
        "Access-Control-Allow-Headers",
        HeaderValue::from_static(Route::allowed_headers(route)),
    );
    resp
}

/// Handler errors become a 500 here so no request can take the function down
fn finalize_response(
    resp: Result<Response<Body>, Error>,
    route: Option<Route>,
) -> Result<Response<Body>, Error> {
    let resp = match resp {
        Ok(resp) => resp,
        Err(e) => {
            tracing::error!("❌ Handler failed: {}", e);
            Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .header("Content-Type", "application/json")
                .body(
                    serde_json::json!({"error": "Internal server error", "message": e.to_string()})
                        .to_string()
                        .into(),
                )
                .map_err(Box::new)?
        }
    };
    Ok(with_cors_headers(resp, route))
}

/// Main Lambda handler - routes search, proxy and index requests
pub(crate) async fn function_handler(
    event: Request,
    state: Arc<AppState>,
) -> Result<Response<Body>, Error> {
    let method = event.method();
    let path = event.uri().path();
    let route = Route::from_path(path);
    tracing::info!("🚀 Gallery API invoked - Method: {} Path: {}", method, path);

    // Handle CORS preflight
    if method == "OPTIONS" {
        let resp = Response::builder()
            .status(StatusCode::OK)
            .body(Body::Empty)
            .map_err(Box::new)?;
        return Ok(with_cors_headers(resp, route));
    }

    let params = event.query_string_parameters_ref();
    let param = |name: &str| params.and_then(|p| p.first(name));

    let resp = match route {
        Some(Route::Search) => {
            let search_params = SearchParams {
                tags: param("tags").map(str::to_string),
                page: param("page").map(str::to_string),
                limit: param("limit").map(str::to_string),
                mode: param("mode").map(str::to_string),
                autocomplete: param("autocomplete").map(str::to_string),
            };
            search_handler(&state.engine, &search_params).await
        }
        Some(Route::PageProxy) => {
            proxy_page(&state.http_client, param("url"), PAGE_PROXY_TIMEOUT).await
        }
        Some(Route::VideoProxy) => {
            let range = event
                .headers()
                .get("Range")
                .and_then(|v| v.to_str().ok());
            proxy_video(&state.http_client, param("url"), range, VIDEO_PROXY_TIMEOUT).await
        }
        Some(Route::ServeIndex) => {
            serve_index(&state.index_files, &state.index_cache, param("type")).await
        }
        None => {
            tracing::warn!("⚠️ No route matched - Method: {} Path: {}", method, path);
            not_found()
        }
    };

    finalize_response(resp, route)
}

fn not_found() -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header("Content-Type", "application/json")
        .body(serde_json::json!({"error": "Not found"}).to_string().into())
        .map_err(Box::new)?)
}

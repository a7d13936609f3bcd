use std::time::Duration;

use lambda_http::{http::StatusCode, Body, Error, Response};
use serde::Serialize;
use serde_json::json;

use crate::response::json_response;

pub const PAGE_PROXY_TIMEOUT: Duration = Duration::from_secs(30);

const BLOCKED_MESSAGE: &str = "Request blocked by anti-bot protection";

/// Browser-like request headers. Accept-Encoding is left to reqwest so the
/// gzip / deflate / brotli bodies are decoded for us.
const BROWSER_HEADERS: &[(&str, &str)] = &[
    (
        "User-Agent",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    ),
    (
        "Accept",
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8",
    ),
    ("Accept-Language", "en-US,en;q=0.9"),
    ("DNT", "1"),
    ("Upgrade-Insecure-Requests", "1"),
    ("Sec-Fetch-Dest", "document"),
    ("Sec-Fetch-Mode", "navigate"),
    ("Sec-Fetch-Site", "none"),
    (
        "Sec-Ch-Ua",
        "\"Not_A Brand\";v=\"8\", \"Chromium\";v=\"120\", \"Google Chrome\";v=\"120\"",
    ),
    ("Sec-Ch-Ua-Mobile", "?0"),
    ("Sec-Ch-Ua-Platform", "\"Windows\""),
    ("Cache-Control", "no-cache"),
    ("Pragma", "no-cache"),
    ("Referer", "https://www.google.com/"),
];

#[derive(Debug, Serialize)]
pub struct ProxyStatus {
    pub http_code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProxiedPage {
    pub contents: String,
    pub status: ProxyStatus,
}

/// Anti-bot interstitials: Cloudflare challenges, captchas, or a plain 403
pub fn is_blocked(contents: &str, http_code: u16) -> bool {
    (contents.contains("Cloudflare") && contents.contains("challenge"))
        || contents.contains("captcha")
        || contents.contains("CAPTCHA")
        || http_code == 403
}

/// HTTP Handler: GET /api/proxy?url=
pub async fn proxy_page(
    client: &reqwest::Client,
    target: Option<&str>,
    timeout: Duration,
) -> Result<Response<Body>, Error> {
    let Some(target) = target.filter(|t| !t.is_empty()) else {
        return json_response(
            StatusCode::BAD_REQUEST,
            &json!({ "error": "Missing url parameter" }),
        );
    };

    tracing::info!("🌐 Proxying request to: {}", target);

    match fetch_page(client, target, timeout).await {
        Ok(page) => {
            if page.status.blocked.is_some() {
                tracing::warn!("🚫 Detected CAPTCHA/block page from {}", target);
            }
            json_response(StatusCode::OK, &page)
        }
        Err(e) if e.is_timeout() => {
            tracing::error!("Proxy request timeout: {}", target);
            json_response(
                StatusCode::REQUEST_TIMEOUT,
                &json!({ "error": "Request timeout", "status": { "http_code": 408 } }),
            )
        }
        Err(e) => {
            tracing::error!("Proxy request error: {}", e);
            json_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &json!({ "error": e.to_string(), "status": { "http_code": 500 } }),
            )
        }
    }
}

async fn fetch_page(
    client: &reqwest::Client,
    target: &str,
    timeout: Duration,
) -> Result<ProxiedPage, reqwest::Error> {
    let mut request = client.get(target).timeout(timeout);
    for (name, value) in BROWSER_HEADERS {
        request = request.header(*name, *value);
    }

    let response = request.send().await?;
    let http_code = response.status().as_u16();
    tracing::info!("Response status: {}", http_code);

    let contents = response.text().await?;

    let status = if is_blocked(&contents, http_code) {
        ProxyStatus {
            http_code,
            blocked: Some(true),
            message: Some(BLOCKED_MESSAGE.to_string()),
        }
    } else {
        ProxyStatus {
            http_code,
            blocked: None,
            message: None,
        }
    };

    Ok(ProxiedPage { contents, status })
}

use std::time::Duration;

use lambda_http::{http::StatusCode, Body, Error, Response};

pub const VIDEO_PROXY_TIMEOUT: Duration = Duration::from_secs(60);

const VIDEO_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// HTTP Handler: GET /api/video-proxy?url=
///
/// Forwards the caller's `Range` so seeking works, and passes the upstream
/// status (200 or 206) and byte-range headers straight through. The upstream
/// body is returned unmodified.
pub async fn proxy_video(
    client: &reqwest::Client,
    target: Option<&str>,
    range: Option<&str>,
    timeout: Duration,
) -> Result<Response<Body>, Error> {
    let Some(target) = target.filter(|t| !t.is_empty()) else {
        return text_response(StatusCode::BAD_REQUEST, "Missing url parameter");
    };

    tracing::info!("🎬 Video proxy request to: {}", target);

    let mut request = client
        .get(target)
        .timeout(timeout)
        .header("User-Agent", VIDEO_USER_AGENT)
        .header("Accept", "*/*")
        .header("Accept-Language", "en-US,en;q=0.5")
        // explicit encoding keeps reqwest from decompressing the bytes
        .header("Accept-Encoding", "identity");

    if let Some(range) = range {
        tracing::info!("Forwarding Range header: {}", range);
        request = request.header("Range", range);
    }

    let video = match fetch_video(request).await {
        Ok(video) => video,
        Err(e) if e.is_timeout() => {
            tracing::error!("Video request timeout: {}", target);
            return text_response(StatusCode::REQUEST_TIMEOUT, "Video request timeout");
        }
        Err(e) => {
            tracing::error!("Video proxy error: {}", e);
            return text_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &format!("Video proxy error: {}", e),
            );
        }
    };

    let mut builder = Response::builder()
        .status(video.status)
        .header("Content-Type", video.content_type)
        .header("Accept-Ranges", video.accept_ranges);
    if let Some(length) = video.content_length {
        builder = builder.header("Content-Length", length);
    }
    if let Some(range) = video.content_range {
        builder = builder.header("Content-Range", range);
    }

    Ok(builder
        .body(Body::Binary(video.bytes))
        .map_err(Box::new)?)
}

struct UpstreamVideo {
    status: StatusCode,
    content_type: String,
    content_length: Option<String>,
    accept_ranges: String,
    content_range: Option<String>,
    bytes: Vec<u8>,
}

async fn fetch_video(request: reqwest::RequestBuilder) -> Result<UpstreamVideo, reqwest::Error> {
    let upstream = request.send().await?;
    let status =
        StatusCode::from_u16(upstream.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    tracing::info!("Video response status: {}", status);

    let header = |name: &str| {
        upstream
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let content_type = header("content-type").unwrap_or_else(|| "video/mp4".to_string());
    let content_length = header("content-length");
    let accept_ranges = header("accept-ranges").unwrap_or_else(|| "bytes".to_string());
    let content_range = header("content-range");

    let bytes = upstream.bytes().await?;
    tracing::info!("Video proxy completed: {} bytes", bytes.len());

    Ok(UpstreamVideo {
        status,
        content_type,
        content_length,
        accept_ranges,
        content_range,
        bytes: bytes.to_vec(),
    })
}

fn text_response(status: StatusCode, message: &str) -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "text/plain")
        .body(message.to_string().into())
        .map_err(Box::new)?)
}

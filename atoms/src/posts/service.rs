use super::model::{ExternalPost, ItemRecord, Post};

pub const LOCAL_SOURCE: &str = "historical";
pub const EXTERNAL_SOURCE: &str = "external";

/// Resolve a stored path against the storage base URL.
/// Absolute URLs are returned untouched.
pub fn resolve_url(base_url: &str, path: &str) -> String {
    if path.is_empty() || path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Extension of the last path segment, lowercased, without query string
pub fn file_ext(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or("");
    let segment = path.rsplit('/').next().unwrap_or("");
    match segment.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => ext.to_ascii_lowercase(),
        _ => String::new(),
    }
}

/// Normalize a locally indexed record into the response shape
pub fn local_post(item: &ItemRecord, base_url: &str) -> Post {
    let file_url = resolve_url(base_url, &item.file_url);
    let thumbnail_url = resolve_url(base_url, &item.thumbnail_url);

    Post {
        id: item.id.clone(),
        file_ext: file_ext(&item.file_url),
        preview_url: thumbnail_url.clone(),
        large_file_url: file_url.clone(),
        file_url,
        thumbnail_url,
        tag_string: item.tags.join(" "),
        tag_string_artist: item.artist.clone().unwrap_or_default(),
        rating: item.rating.clone(),
        score: item.score,
        created_at: item.created_at.clone(),
        source: LOCAL_SOURCE.to_string(),
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Normalize an external catalog post. Posts without any usable URL are dropped.
pub fn external_post(post: &ExternalPost) -> Option<Post> {
    let file = non_empty(&post.file_url);
    let large = non_empty(&post.large_file_url);
    let preview = non_empty(&post.preview_file_url);

    let file_url = file.or(large).or(preview)?.to_string();
    let preview_url = preview.or(large).or(file)?.to_string();
    let large_file_url = large.or(file).or(preview)?.to_string();

    Some(Post {
        id: post.id.clone().unwrap_or_default(),
        file_ext: post
            .file_ext
            .clone()
            .unwrap_or_else(|| file_ext(&file_url)),
        thumbnail_url: preview_url.clone(),
        file_url,
        preview_url,
        large_file_url,
        tag_string: post.tag_string.clone().unwrap_or_default(),
        tag_string_artist: post.tag_string_artist.clone().unwrap_or_default(),
        rating: post.rating.clone().unwrap_or_else(|| "q".to_string()),
        score: post.score.unwrap_or(0),
        created_at: post.created_at.clone().unwrap_or_default(),
        source: EXTERNAL_SOURCE.to_string(),
    })
}

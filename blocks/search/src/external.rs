//! External catalog used for backfill (a Danbooru-compatible `posts.json` API).

use async_trait::async_trait;
use std::time::Duration;

use gallery_atoms::posts::{external_post, ExternalPost, Post};

use crate::error::FetchError;

pub const DEFAULT_USER_AGENT: &str = "Dirty4/1.0 (anime art gallery)";

/// One page of normalized external results
#[derive(Debug, Clone, Default)]
pub struct ExternalPage {
    pub posts: Vec<Post>,
    /// Number of records the API returned for this page
    pub total: usize,
}

#[async_trait]
pub trait ExternalCatalog: Send + Sync {
    async fn search(&self, tags: &str, page: u32, limit: u32) -> Result<ExternalPage, FetchError>;
}

pub struct DanbooruClient {
    client: reqwest::Client,
    base_url: String,
    user_agent: String,
    timeout: Duration,
}

impl DanbooruClient {
    pub fn new(client: reqwest::Client, base_url: &str, user_agent: &str, timeout: Duration) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            user_agent: user_agent.to_string(),
            timeout,
        }
    }
}

#[async_trait]
impl ExternalCatalog for DanbooruClient {
    async fn search(&self, tags: &str, page: u32, limit: u32) -> Result<ExternalPage, FetchError> {
        let url = format!("{}/posts.json", self.base_url);
        let key = format!("{}?tags={}&page={}", url, tags, page);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("tags", tags.to_string()),
                ("page", page.to_string()),
                ("limit", limit.to_string()),
            ])
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .header(reqwest::header::ACCEPT, "application/json")
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(&key, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                key,
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::from_reqwest(&key, e))?;
        let raw: Vec<ExternalPost> =
            serde_json::from_slice(&bytes).map_err(|source| FetchError::Decode {
                key: key.clone(),
                source,
            })?;

        let total = raw.len();
        let posts: Vec<Post> = raw.iter().filter_map(external_post).collect();
        tracing::info!(
            "🌐 External catalog returned {} posts ({} usable) for \"{}\"",
            total,
            posts.len(),
            tags
        );

        Ok(ExternalPage { posts, total })
    }
}

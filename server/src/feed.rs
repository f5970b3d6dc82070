//! Reaction counts for a user's public reader feed

use std::time::Duration;

use color_eyre::eyre::{eyre, WrapErr as _};
use serde::Deserialize;
use tracing::{debug, info};

pub const DEFAULT_FEED_BASE_URL: &str = "https://substack.com";
pub const DEFAULT_PAGE_LIMIT: usize = 2;

const FEED_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.77 Safari/537.36";
const FEED_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedPage {
    #[serde(default)]
    pub items: Vec<FeedItem>,
    pub next_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FeedItem {
    #[serde(rename = "type")]
    pub kind: String,
    pub comment: Option<FeedComment>,
}

#[derive(Debug, Deserialize)]
pub struct FeedComment {
    #[serde(default)]
    pub reaction_count: u64,
}

impl FeedPage {
    /// Reaction counts of the comment items on this page, in feed order
    pub fn reaction_counts(&self) -> impl Iterator<Item = u64> + '_ {
        self.items
            .iter()
            .filter(|item| item.kind == "comment")
            .filter_map(|item| item.comment.as_ref())
            .map(|comment| comment.reaction_count)
    }
}

pub struct FeedClient {
    http: reqwest::Client,
    base_url: String,
}

impl FeedClient {
    pub fn new(base_url: &str) -> color_eyre::Result<Self> {
        let http = reqwest::ClientBuilder::new()
            .user_agent(FEED_USER_AGENT)
            .timeout(FEED_TIMEOUT)
            .use_rustls_tls()
            .build()
            .wrap_err("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    #[tracing::instrument(skip(self))]
    pub async fn page(&self, user_id: u64, cursor: Option<&str>) -> color_eyre::Result<FeedPage> {
        let url = format!("{}/api/v1/reader/feed/profile/{}", self.base_url, user_id);

        let mut request = self.http.get(&url);
        if let Some(cursor) = cursor {
            request = request.query(&[("cursor", cursor)]);
        }

        let response = request.send().await.wrap_err("Feed request failed")?;
        let status = response.status();
        if !status.is_success() {
            return Err(eyre!("Feed request to {} returned {}", url, status));
        }

        response
            .json::<FeedPage>()
            .await
            .wrap_err("Failed to parse feed page")
    }

    /// Walk up to `max_pages` pages, following `nextCursor`, and collect
    /// the reaction count of every comment seen.
    pub async fn reaction_counts(
        &self,
        user_id: u64,
        max_pages: usize,
    ) -> color_eyre::Result<Vec<u64>> {
        let mut counts = Vec::new();
        let mut cursor: Option<String> = None;

        for page_number in 0..max_pages {
            let page = self.page(user_id, cursor.as_deref()).await?;
            counts.extend(page.reaction_counts());
            debug!(page_number, next_cursor = ?page.next_cursor, "Fetched feed page");

            match page.next_cursor {
                Some(next) if !next.is_empty() => cursor = Some(next),
                _ => break,
            }
        }

        info!(user_id, comments = counts.len(), "Collected reaction counts");
        Ok(counts)
    }
}

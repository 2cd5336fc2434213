// src/trends/providers/bluesky.rs
use async_trait::async_trait;
use serde::Deserialize;

use crate::trends::error::ProviderError;
use crate::trends::providers::{parse_envelope, Source};
use crate::trends::types::{BlueskyItem, RawItem, TrendProvider, DEFAULT_PROVIDER_CAP};

pub const PUBLIC_TRENDS_URL: &str =
    "https://public.api.bsky.app/xrpc/app.bsky.unspecced.getTrends";

/// Which payload shape the configured endpoint speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlueskyFeed {
    /// Trends proxy: `{success, data:[{termo, traffic, origem, description, pubDate}]}`.
    Backend,
    /// Public AppView: `{trends:[{topic, displayName, postCount, startedAt}]}`.
    Public,
}

#[derive(Debug, Deserialize)]
struct BackendRow {
    termo: Option<String>,
    traffic: Option<String>,
    origem: Option<String>,
    description: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PublicTrends {
    #[serde(default)]
    trends: Vec<PublicTrend>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PublicTrend {
    display_name: Option<String>,
    topic: Option<String>,
    query: Option<String>,
    name: Option<String>,
    post_count: Option<u64>,
    started_at: Option<String>,
}

impl PublicTrend {
    fn term(self) -> Option<(String, Option<u64>, Option<String>)> {
        let term = [self.display_name, self.topic, self.query, self.name]
            .into_iter()
            .flatten()
            .find(|s| !s.trim().is_empty())?;
        Some((term, self.post_count, self.started_at))
    }
}

/// Bluesky trending topics.
pub struct BlueskyTrendsProvider {
    feed: BlueskyFeed,
    cap: usize,
    source: Source,
}

impl BlueskyTrendsProvider {
    /// Via the trends proxy (`GET {backend}/bluesky`).
    pub fn from_backend(backend_url: &str, client: reqwest::Client) -> Self {
        let url = format!("{}/bluesky", backend_url.trim_end_matches('/'));
        Self::with_source(BlueskyFeed::Backend, Source::http(url, client))
    }

    /// Straight from the public AppView.
    pub fn from_public(client: reqwest::Client) -> Self {
        Self::with_source(
            BlueskyFeed::Public,
            Source::http(PUBLIC_TRENDS_URL.to_string(), client),
        )
    }

    pub fn from_fixture(body: &str, feed: BlueskyFeed) -> Self {
        Self::with_source(feed, Source::Fixture(body.to_string()))
    }

    fn with_source(feed: BlueskyFeed, source: Source) -> Self {
        Self {
            feed,
            cap: DEFAULT_PROVIDER_CAP,
            source,
        }
    }

    pub fn with_cap(mut self, cap: usize) -> Self {
        self.cap = cap.max(1);
        self
    }

    fn parse_items(&self, body: &str) -> Result<Vec<RawItem>, ProviderError> {
        let items: Vec<RawItem> = match self.feed {
            BlueskyFeed::Backend => parse_envelope::<BackendRow>(body)?
                .into_iter()
                .filter_map(|r| {
                    Some(RawItem::Bluesky(BlueskyItem {
                        term: r.termo?,
                        traffic: r.traffic,
                        pub_date: r.pub_date,
                        origin: r.origem,
                        description: r.description,
                    }))
                })
                .collect(),
            BlueskyFeed::Public => serde_json::from_str::<PublicTrends>(body)?
                .trends
                .into_iter()
                .filter_map(PublicTrend::term)
                .map(|(term, posts, started_at)| {
                    RawItem::Bluesky(BlueskyItem {
                        term,
                        traffic: posts.map(|n| format!("+{n}")),
                        pub_date: started_at,
                        origin: None,
                        description: None,
                    })
                })
                .collect(),
        };
        if items.is_empty() {
            return Err(ProviderError::Empty);
        }
        Ok(items)
    }
}

#[async_trait]
impl TrendProvider for BlueskyTrendsProvider {
    async fn query(&self) -> Result<Vec<RawItem>, ProviderError> {
        let body = self.source.body("application/json").await?;
        self.parse_items(&body)
    }

    fn name(&self) -> &str {
        "Bluesky"
    }

    fn max_items(&self) -> usize {
        self.cap
    }
}

// src/trends/providers/backend.rs
use async_trait::async_trait;
use serde::Deserialize;

use crate::trends::error::ProviderError;
use crate::trends::providers::{parse_envelope, Source};
use crate::trends::types::{GoogleTrendsItem, RawItem, Region, TrendProvider, DEFAULT_PROVIDER_CAP};

#[derive(Debug, Deserialize)]
struct Row {
    termo: Option<String>,
    traffic: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
}

/// Region-scoped search trends served by the trends proxy (`GET /trends?geo=XX`).
pub struct BackendTrendsProvider {
    name: String,
    region: Region,
    cap: usize,
    source: Source,
}

impl BackendTrendsProvider {
    pub fn from_url(backend_url: &str, region: Region, client: reqwest::Client) -> Self {
        let url = format!(
            "{}/trends?geo={}",
            backend_url.trim_end_matches('/'),
            region.code
        );
        Self::with_source(region, Source::http(url, client))
    }

    pub fn from_fixture(body: &str, region: Region) -> Self {
        Self::with_source(region, Source::Fixture(body.to_string()))
    }

    fn with_source(region: Region, source: Source) -> Self {
        Self {
            name: format!("Google Trends ({})", region.code),
            region,
            cap: DEFAULT_PROVIDER_CAP,
            source,
        }
    }

    pub fn with_cap(mut self, cap: usize) -> Self {
        self.cap = cap.max(1);
        self
    }

    pub fn region(&self) -> &Region {
        &self.region
    }

    fn parse_items(&self, body: &str) -> Result<Vec<RawItem>, ProviderError> {
        let rows: Vec<Row> = parse_envelope(body)?;
        let items = rows
            .into_iter()
            .filter_map(|r| {
                let term = r.termo?;
                Some(RawItem::GoogleTrends(GoogleTrendsItem {
                    term,
                    traffic: r.traffic,
                    pub_date: r.pub_date,
                    region: self.region.clone(),
                }))
            })
            .collect::<Vec<_>>();
        if items.is_empty() {
            return Err(ProviderError::Empty);
        }
        Ok(items)
    }
}

#[async_trait]
impl TrendProvider for BackendTrendsProvider {
    async fn query(&self) -> Result<Vec<RawItem>, ProviderError> {
        let body = self.source.body("application/json").await?;
        let items = self.parse_items(&body)?;
        tracing::debug!(target: "trends", provider = %self.name, items = items.len(), "backend trends parsed");
        Ok(items)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn max_items(&self) -> usize {
        self.cap
    }
}

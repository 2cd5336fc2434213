// src/trends/providers/multi_region.rs
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;

use crate::trends::aggregator::DEFAULT_TIMEOUT;
use crate::trends::error::ProviderError;
use crate::trends::clean_term;
use crate::trends::providers::query_with_timeout;
use crate::trends::types::{RawItem, TrendProvider, DEFAULT_REGION_CAP};

const REGION_BUDGET_MARGIN: Duration = Duration::from_millis(500);

/// Composite provider: one sub-provider per region, queried concurrently.
/// A failing region contributes nothing; the others still count.
pub struct MultiRegionProvider {
    name: String,
    regions: Vec<Box<dyn TrendProvider>>,
    region_cap: usize,
    timeout: Duration,
}

impl MultiRegionProvider {
    pub fn new(name: impl Into<String>, regions: Vec<Box<dyn TrendProvider>>) -> Self {
        Self {
            name: name.into(),
            regions,
            region_cap: DEFAULT_REGION_CAP,
            timeout: region_budget(DEFAULT_TIMEOUT),
        }
    }

    pub fn with_region_cap(mut self, cap: usize) -> Self {
        self.region_cap = cap.max(1);
        self
    }

    /// Per-region call budget. Keep it below the aggregator's budget, see [`region_budget`].
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn region_names(&self) -> Vec<&str> {
        self.regions.iter().map(|r| r.name()).collect()
    }

    /// Query every region, wait for all to settle, keep up to `region_cap`
    /// usable items from each in submission order. `None` only when nothing came back.
    pub async fn fetch_multi_region(&self) -> Option<Vec<RawItem>> {
        self.merge_regions(|_| self.region_cap).await
    }

    /// Like [`Self::fetch_multi_region`], but each region keeps its own
    /// provider cap instead of the shared region cap.
    pub async fn fetch_every_region(&self) -> Option<Vec<RawItem>> {
        self.merge_regions(|region| region.max_items()).await
    }

    async fn merge_regions<C>(&self, quota: C) -> Option<Vec<RawItem>>
    where
        C: Fn(&dyn TrendProvider) -> usize,
    {
        let calls = self
            .regions
            .iter()
            .map(|p| query_with_timeout(p.query(), self.timeout));
        let results = join_all(calls).await;

        let mut merged = Vec::new();
        for (region, res) in self.regions.iter().zip(results) {
            match res {
                Ok(items) => {
                    // Blank terms are dropped before the quota so they never displace real ones.
                    let before = merged.len();
                    merged.extend(
                        items
                            .into_iter()
                            .filter(|it| !clean_term(it.raw_term()).is_empty())
                            .take(quota(region.as_ref())),
                    );
                    tracing::info!(
                        target: "trends",
                        provider = %self.name,
                        region = region.name(),
                        items = merged.len() - before,
                        "region ok"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        target: "trends",
                        provider = %self.name,
                        region = region.name(),
                        error = %e,
                        "region failed"
                    );
                }
            }
        }

        if merged.is_empty() {
            None
        } else {
            Some(merged)
        }
    }
}

/// Per-region budget inside an outer call budget of `outer`, so a hanging
/// region times out before the composite does.
pub fn region_budget(outer: Duration) -> Duration {
    outer.saturating_sub(REGION_BUDGET_MARGIN).max(outer / 2)
}

#[async_trait]
impl TrendProvider for MultiRegionProvider {
    async fn query(&self) -> Result<Vec<RawItem>, ProviderError> {
        self.fetch_multi_region().await.ok_or(ProviderError::Empty)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn max_items(&self) -> usize {
        (self.regions.len() * self.region_cap).max(1)
    }

    async fn query_exhaustive(&self) -> Result<Vec<RawItem>, ProviderError> {
        self.fetch_every_region().await.ok_or(ProviderError::Empty)
    }

    fn max_items_exhaustive(&self) -> usize {
        self.regions.iter().map(|r| r.max_items()).sum::<usize>().max(1)
    }
}

// src/trends/aggregator.rs
//! Ordered-fallback trend aggregation.
//!
//! Two entry points, both infallible and both guaranteed non-empty:
//! - [`TrendAggregator::fetch_primary`]: providers in order, first non-empty wins.
//! - [`TrendAggregator::fetch_all_sources`]: every provider concurrently, union of results.
//!
//! Provider failures of any kind are logged and counted, never returned.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use metrics::{counter, gauge, histogram};

use crate::trends::ensure_metrics_described;
use crate::trends::error::ProviderError;
use crate::trends::fallback;
use crate::trends::normalize::{normalize, NormalizeContext};
use crate::trends::providers::query_with_timeout;
use crate::trends::types::{TrendBatch, TrendProvider, TrendRecord};

/// Per-call budget for a single provider query.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(8);

/// Optional consumer hook, called with every batch the aggregator hands out.
pub type OnDataUpdated = Arc<dyn Fn(&TrendBatch) + Send + Sync>;

/// A configured provider. `weight` is informational; order decides priority.
pub struct ProviderSlot {
    pub name: String,
    pub weight: f32,
    provider: Box<dyn TrendProvider>,
}

impl ProviderSlot {
    pub fn new<P: TrendProvider + 'static>(provider: P, weight: f32) -> Self {
        Self::boxed(Box::new(provider), weight)
    }

    pub fn boxed(provider: Box<dyn TrendProvider>, weight: f32) -> Self {
        Self {
            name: provider.name().to_string(),
            weight,
            provider,
        }
    }

    /// Override the display name (defaults to the provider's own name).
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

/// How deep a round goes into composite providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Depth {
    Primary,
    Exhaustive,
}

pub struct TrendAggregator {
    providers: Vec<ProviderSlot>,
    timeout: Duration,
    fallback: Vec<TrendRecord>,
    on_data_updated: Option<OnDataUpdated>,
}

impl TrendAggregator {
    pub fn new(providers: Vec<ProviderSlot>) -> Self {
        Self {
            providers,
            timeout: DEFAULT_TIMEOUT,
            fallback: fallback::sample_records(),
            on_data_updated: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Replace the fallback set. Records with a blank term or description
    /// are dropped; if none survive the built-in set is kept.
    pub fn with_fallback(mut self, records: Vec<TrendRecord>) -> Self {
        let offered = records.len();
        let valid: Vec<TrendRecord> = records
            .into_iter()
            .filter(|r| !r.term.trim().is_empty() && !r.description.trim().is_empty())
            .collect();
        if valid.len() < offered {
            tracing::warn!(
                target: "trends",
                dropped = offered - valid.len(),
                "fallback records without term or description dropped"
            );
        }
        if valid.is_empty() {
            tracing::warn!(target: "trends", "ignoring empty fallback set");
        } else {
            self.fallback = valid;
        }
        self
    }

    pub fn with_on_data_updated<F>(mut self, hook: F) -> Self
    where
        F: Fn(&TrendBatch) + Send + Sync + 'static,
    {
        self.on_data_updated = Some(Arc::new(hook));
        self
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn fallback(&self) -> &[TrendRecord] {
        &self.fallback
    }

    /// Cheapest success: providers strictly in order, first non-empty result wins.
    pub async fn fetch_primary(&self) -> TrendBatch {
        ensure_metrics_described();
        let ctx = NormalizeContext::now();
        tracing::info!(target: "trends", providers = self.providers.len(), "fetch_primary start");

        for slot in &self.providers {
            match self.query_slot(slot, &ctx, Depth::Primary).await {
                Ok(records) => {
                    tracing::info!(
                        target: "trends",
                        provider = %slot.name,
                        records = records.len(),
                        "provider succeeded"
                    );
                    return self.finish(TrendBatch {
                        records,
                        used_fallback: false,
                        sources: vec![slot.name.clone()],
                    });
                }
                Err(e) => self.record_failure(slot, &e),
            }
        }

        tracing::warn!(target: "trends", "all providers failed; serving fallback set");
        self.finish(self.fallback_batch())
    }

    /// Maximum coverage: every provider concurrently, every non-empty result kept.
    pub async fn fetch_all_sources(&self) -> TrendBatch {
        ensure_metrics_described();
        let ctx = NormalizeContext::now();
        let ctx = &ctx;
        tracing::info!(target: "trends", providers = self.providers.len(), "fetch_all_sources start");

        let calls = self
            .providers
            .iter()
            .map(|slot| async move {
                (slot, self.query_slot(slot, ctx, Depth::Exhaustive).await)
            });
        let results = join_all(calls).await;

        let mut records = Vec::new();
        let mut sources = Vec::new();
        for (slot, res) in results {
            match res {
                Ok(mut recs) => {
                    tracing::info!(
                        target: "trends",
                        provider = %slot.name,
                        records = recs.len(),
                        "provider succeeded"
                    );
                    sources.push(slot.name.clone());
                    records.append(&mut recs);
                }
                Err(e) => self.record_failure(slot, &e),
            }
        }

        if records.is_empty() {
            tracing::warn!(target: "trends", "no source produced data; serving fallback set");
            return self.finish(self.fallback_batch());
        }

        let batch = TrendBatch {
            records,
            used_fallback: false,
            sources,
        };
        for (origin, n) in batch.origin_counts() {
            tracing::debug!(target: "trends", origin, records = n, "origin distribution");
        }
        self.finish(batch)
    }

    /// Query one slot under the time budget, normalize, cap. Empty is an error.
    async fn query_slot(
        &self,
        slot: &ProviderSlot,
        ctx: &NormalizeContext,
        depth: Depth,
    ) -> Result<Vec<TrendRecord>, ProviderError> {
        let provider = slot.provider.as_ref();
        let (call, cap) = match depth {
            Depth::Primary => (provider.query(), provider.max_items()),
            Depth::Exhaustive => (provider.query_exhaustive(), provider.max_items_exhaustive()),
        };

        let t0 = Instant::now();
        let raw = query_with_timeout(call, self.timeout).await;
        histogram!("trends_provider_fetch_ms", "provider" => slot.name.clone())
            .record(t0.elapsed().as_secs_f64() * 1_000.0);

        let records: Vec<TrendRecord> = raw?
            .iter()
            .filter_map(|item| normalize(item, ctx))
            .take(cap)
            .collect();
        if records.is_empty() {
            return Err(ProviderError::Empty);
        }
        Ok(records)
    }

    fn record_failure(&self, slot: &ProviderSlot, e: &ProviderError) {
        tracing::warn!(
            target: "trends",
            provider = %slot.name,
            error = %e,
            "provider unavailable"
        );
        counter!(
            "trends_provider_errors_total",
            "provider" => slot.name.clone(),
            "kind" => e.kind()
        )
        .increment(1);
    }

    fn fallback_batch(&self) -> TrendBatch {
        counter!("trends_fallback_total").increment(1);
        TrendBatch {
            records: self.fallback.clone(),
            used_fallback: true,
            sources: Vec::new(),
        }
    }

    fn finish(&self, batch: TrendBatch) -> TrendBatch {
        counter!("trends_records_total").increment(batch.len() as u64);
        gauge!("trends_last_fetch_ts").set(chrono::Utc::now().timestamp() as f64);
        if let Some(hook) = &self.on_data_updated {
            hook(&batch);
        }
        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trends::types::{NeologismItem, RawItem};
    use async_trait::async_trait;

    struct Words(Vec<&'static str>);

    #[async_trait]
    impl TrendProvider for Words {
        async fn query(&self) -> Result<Vec<RawItem>, ProviderError> {
            Ok(self
                .0
                .iter()
                .map(|w| {
                    RawItem::Neologism(NeologismItem {
                        term: w.to_string(),
                        definition: None,
                        context: None,
                        language: None,
                        pub_date: None,
                    })
                })
                .collect())
        }

        fn name(&self) -> &str {
            "words"
        }
    }

    #[tokio::test]
    async fn blank_only_payload_counts_as_empty() {
        let agg = TrendAggregator::new(vec![ProviderSlot::new(Words(vec!["  ", "#"]), 1.0)]);
        let batch = agg.fetch_primary().await;
        assert!(batch.used_fallback);
        assert_eq!(batch.records, agg.fallback().to_vec());
    }

    #[tokio::test]
    async fn cap_applies_after_dropping_blanks() {
        let agg = TrendAggregator::new(vec![ProviderSlot::new(
            Words(vec!["", "a1", "a2", "a3"]),
            1.0,
        )]);
        let batch = agg.fetch_primary().await;
        assert_eq!(batch.len(), 3);
        assert_eq!(batch.records[0].term, "a1");
    }

    #[test]
    fn empty_fallback_replacement_is_ignored() {
        let agg = TrendAggregator::new(vec![]).with_fallback(vec![]);
        assert!(!agg.fallback().is_empty());
    }

    #[test]
    fn fallback_records_without_term_or_description_are_dropped() {
        let mut records = fallback::sample_records();
        records.truncate(3);
        records[0].term = "   ".to_string();
        records[2].description = String::new();
        let kept = records[1].clone();

        let agg = TrendAggregator::new(vec![]).with_fallback(records);
        assert_eq!(agg.fallback(), &[kept][..]);

        let mut blank = fallback::sample_records();
        blank.truncate(1);
        blank[0].term.clear();
        let agg = TrendAggregator::new(vec![]).with_fallback(blank);
        assert_eq!(agg.fallback(), &fallback::sample_records()[..]);
    }

    #[test]
    fn slot_name_defaults_to_provider_name() {
        let slot = ProviderSlot::new(Words(vec![]), 0.5);
        assert_eq!(slot.name, "words");
        assert_eq!(slot.named("custom").name, "custom");
    }
}

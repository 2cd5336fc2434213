// src/trends/types.rs
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::trends::error::ProviderError;

/// Max normalized records a single provider may contribute to one call.
pub const DEFAULT_PROVIDER_CAP: usize = 20;
/// Max items each region contributes inside a multi-region merge.
pub const DEFAULT_REGION_CAP: usize = 8;

/// Popularity tier derived from a magnitude string like "+500K".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendTier {
    Explosive,
    High,
    Rising,
    Medium,
    Low,
    Normal,
}

impl TrendTier {
    /// Bucket an absolute magnitude (inclusive lower bounds).
    pub fn from_magnitude(n: f64) -> Self {
        if n >= 500_000.0 {
            TrendTier::Explosive
        } else if n >= 100_000.0 {
            TrendTier::High
        } else if n >= 50_000.0 {
            TrendTier::Rising
        } else if n >= 10_000.0 {
            TrendTier::Medium
        } else {
            TrendTier::Low
        }
    }

    /// Map a literal display label (as shipped in curated data) to a bucket.
    /// Unknown labels ("Estável", "Estabilizada", ...) land in `Normal`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "explosiva" | "explosive" => TrendTier::Explosive,
            "alta" | "high" => TrendTier::High,
            "crescente" | "emergente" | "rising" => TrendTier::Rising,
            "média" | "media" | "medium" => TrendTier::Medium,
            "baixa" | "low" => TrendTier::Low,
            _ => TrendTier::Normal,
        }
    }

    /// Label shown by the stream pages.
    pub fn label(self) -> &'static str {
        match self {
            TrendTier::Explosive => "Explosiva",
            TrendTier::High => "Alta",
            TrendTier::Rising => "Crescente",
            TrendTier::Medium => "Média",
            TrendTier::Low => "Baixa",
            TrendTier::Normal => "Normal",
        }
    }
}

/// Which provider class produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Trends,
    Social,
    Curated,
    Fallback,
}

/// Normalized record consumed read-only by the rendering layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendRecord {
    pub term: String,
    pub origin: String,
    pub status: String,
    pub trend: TrendTier,
    pub description: String,
    pub raw_traffic: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub source_kind: SourceKind,
}

/// Result envelope of both aggregator entry points. `records` is never empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendBatch {
    pub records: Vec<TrendRecord>,
    pub used_fallback: bool,
    /// Names of the providers that contributed records (empty on fallback).
    pub sources: Vec<String>,
}

impl TrendBatch {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record count per origin label, sorted by origin.
    pub fn origin_counts(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for r in &self.records {
            *counts.entry(r.origin.as_str()).or_insert(0) += 1;
        }
        counts
    }
}

/// A geographic region queried by region-scoped providers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub code: String,
    pub name: String,
}

impl Region {
    pub fn new(code: &str, name: &str) -> Self {
        Self {
            code: code.to_ascii_uppercase(),
            name: name.to_string(),
        }
    }

    /// Label used as record origin: PT/BR/AO have fixed labels, others use the name.
    pub fn origin_label(&self) -> String {
        match self.code.as_str() {
            "PT" => "PORTUGAL".to_string(),
            "BR" => "BRASIL".to_string(),
            "AO" => "ANGOLA".to_string(),
            _ => self.name.clone(),
        }
    }
}

/// Search-trends item (trends proxy JSON or Google Trends RSS).
#[derive(Debug, Clone, PartialEq)]
pub struct GoogleTrendsItem {
    pub term: String,
    pub traffic: Option<String>,
    pub pub_date: Option<String>,
    pub region: Region,
}

/// Bluesky trending topic (proxy envelope or public AppView).
#[derive(Debug, Clone, PartialEq)]
pub struct BlueskyItem {
    pub term: String,
    pub traffic: Option<String>,
    pub pub_date: Option<String>,
    pub origin: Option<String>,
    pub description: Option<String>,
}

/// Curated neologism entry.
#[derive(Debug, Clone, PartialEq)]
pub struct NeologismItem {
    pub term: String,
    pub definition: Option<String>,
    pub context: Option<String>,
    pub language: Option<String>,
    pub pub_date: Option<String>,
}

/// Provider payload item. Each provider emits exactly one variant.
#[derive(Debug, Clone, PartialEq)]
pub enum RawItem {
    GoogleTrends(GoogleTrendsItem),
    Bluesky(BlueskyItem),
    Neologism(NeologismItem),
}

impl RawItem {
    /// Term as the provider sent it, before cleaning.
    pub fn raw_term(&self) -> &str {
        match self {
            RawItem::GoogleTrends(it) => &it.term,
            RawItem::Bluesky(it) => &it.term,
            RawItem::Neologism(it) => &it.term,
        }
    }
}

/// A data source queried by the aggregator. Failures are soft: the aggregator
/// logs them and moves on, it never surfaces them to its caller.
#[async_trait::async_trait]
pub trait TrendProvider: Send + Sync {
    async fn query(&self) -> Result<Vec<RawItem>, ProviderError>;

    fn name(&self) -> &str;

    /// Upper bound on normalized records taken from one call.
    fn max_items(&self) -> usize {
        DEFAULT_PROVIDER_CAP
    }

    /// Query used by exhaustive aggregation. Composites widen their
    /// per-member quotas here; plain providers answer as for `query`.
    async fn query_exhaustive(&self) -> Result<Vec<RawItem>, ProviderError> {
        self.query().await
    }

    fn max_items_exhaustive(&self) -> usize {
        self.max_items()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn magnitude_bounds_are_inclusive() {
        assert_eq!(TrendTier::from_magnitude(500_000.0), TrendTier::Explosive);
        assert_eq!(TrendTier::from_magnitude(499_999.0), TrendTier::High);
        assert_eq!(TrendTier::from_magnitude(100_000.0), TrendTier::High);
        assert_eq!(TrendTier::from_magnitude(50_000.0), TrendTier::Rising);
        assert_eq!(TrendTier::from_magnitude(10_000.0), TrendTier::Medium);
        assert_eq!(TrendTier::from_magnitude(0.0), TrendTier::Low);
    }

    #[test]
    fn curated_labels_map_to_concrete_buckets() {
        assert_eq!(TrendTier::from_label("Explosiva"), TrendTier::Explosive);
        assert_eq!(TrendTier::from_label(" alta "), TrendTier::High);
        assert_eq!(TrendTier::from_label("Emergente"), TrendTier::Rising);
        assert_eq!(TrendTier::from_label("Média"), TrendTier::Medium);
        assert_eq!(TrendTier::from_label("Estabilizada"), TrendTier::Normal);
    }

    #[test]
    fn region_origin_labels() {
        assert_eq!(Region::new("pt", "Portugal").origin_label(), "PORTUGAL");
        assert_eq!(Region::new("MZ", "Moçambique").origin_label(), "Moçambique");
    }
}

// tests/common/mod.rs
//
// Scripted providers shared by the integration tests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use lingua_viva_trends::trends::types::{GoogleTrendsItem, Region};
use lingua_viva_trends::trends::{ProviderError, RawItem, TrendProvider};

/// `n` Google Trends items named `{prefix}-{i}` for the given region.
pub fn trend_items(prefix: &str, n: usize, region: &Region) -> Vec<RawItem> {
    (0..n)
        .map(|i| {
            RawItem::GoogleTrends(GoogleTrendsItem {
                term: format!("{prefix}-{i}"),
                traffic: Some("+20K".to_string()),
                pub_date: None,
                region: region.clone(),
            })
        })
        .collect()
}

enum Behavior {
    Items(Vec<RawItem>),
    Fail,
    Hang(Duration),
}

/// Provider with a fixed answer and a call counter.
pub struct Scripted {
    name: String,
    behavior: Behavior,
    calls: Arc<AtomicUsize>,
}

impl Scripted {
    pub fn items(name: &str, n: usize) -> Self {
        let region = Region::new("PT", "Portugal");
        Self::with(name, Behavior::Items(trend_items(name, n, &region)))
    }

    pub fn region(name: &str, n: usize, region: Region) -> Self {
        Self::with(name, Behavior::Items(trend_items(name, n, &region)))
    }

    pub fn raw(name: &str, items: Vec<RawItem>) -> Self {
        Self::with(name, Behavior::Items(items))
    }

    pub fn failing(name: &str) -> Self {
        Self::with(name, Behavior::Fail)
    }

    /// Sleeps for `delay` before answering with one item.
    pub fn hanging(name: &str, delay: Duration) -> Self {
        Self::with(name, Behavior::Hang(delay))
    }

    fn with(name: &str, behavior: Behavior) -> Self {
        Self {
            name: name.to_string(),
            behavior,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Handle that keeps counting after the provider is moved into a slot.
    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl TrendProvider for Scripted {
    async fn query(&self) -> Result<Vec<RawItem>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            Behavior::Items(items) => Ok(items.clone()),
            Behavior::Fail => Err(ProviderError::Status(503)),
            Behavior::Hang(delay) => {
                tokio::time::sleep(*delay).await;
                Ok(trend_items(&self.name, 1, &Region::new("PT", "Portugal")))
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

pub fn count(calls: &AtomicUsize) -> usize {
    calls.load(Ordering::SeqCst)
}

pub fn boxed(p: Scripted) -> Box<dyn TrendProvider> {
    Box::new(p)
}

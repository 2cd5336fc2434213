// tests/multi_region.rs
//
// Composite multi-region provider: partial failure, per-region cap, ordering.

mod common;

use std::time::Duration;

use common::{boxed, trend_items, Scripted};
use lingua_viva_trends::trends::providers::multi_region::{region_budget, MultiRegionProvider};
use lingua_viva_trends::trends::types::{GoogleTrendsItem, Region};
use lingua_viva_trends::trends::{
    ProviderError, ProviderSlot, RawItem, TrendAggregator, TrendProvider,
};

fn pt() -> Region {
    Region::new("PT", "Portugal")
}
fn br() -> Region {
    Region::new("BR", "Brasil")
}
fn ao() -> Region {
    Region::new("AO", "Angola")
}

#[tokio::test]
async fn one_region_up_is_enough() {
    let mr = MultiRegionProvider::new(
        "multi",
        vec![
            boxed(Scripted::failing("pt")),
            boxed(Scripted::region("br", 5, br())),
            boxed(Scripted::failing("ao")),
        ],
    );

    let items = mr.fetch_multi_region().await.expect("one region succeeded");
    assert_eq!(items.len(), 5);
}

#[tokio::test]
async fn all_regions_down_is_none_and_empty_error() {
    let mr = MultiRegionProvider::new(
        "multi",
        vec![
            boxed(Scripted::failing("pt")),
            boxed(Scripted::failing("br")),
        ],
    );

    assert!(mr.fetch_multi_region().await.is_none());
    assert!(matches!(mr.query().await, Err(ProviderError::Empty)));
}

#[tokio::test]
async fn each_region_is_capped_and_kept_in_submission_order() {
    let mr = MultiRegionProvider::new(
        "multi",
        vec![
            boxed(Scripted::region("pt", 12, pt())),
            boxed(Scripted::region("br", 3, br())),
            boxed(Scripted::region("ao", 9, ao())),
        ],
    );

    let items = mr.fetch_multi_region().await.unwrap();
    assert_eq!(items.len(), 8 + 3 + 8);
    assert_eq!(mr.max_items(), 24);
    assert_eq!(mr.region_names(), vec!["pt", "br", "ao"]);
}

#[tokio::test]
async fn custom_region_cap() {
    let mr = MultiRegionProvider::new("multi", vec![boxed(Scripted::region("pt", 12, pt()))])
        .with_region_cap(2);
    assert_eq!(mr.fetch_multi_region().await.unwrap().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn hanging_region_does_not_block_the_others() {
    let mr = MultiRegionProvider::new(
        "multi",
        vec![
            boxed(Scripted::hanging("pt", Duration::from_secs(60))),
            boxed(Scripted::region("ao", 4, ao())),
        ],
    )
    .with_timeout(Duration::from_millis(100));

    assert_eq!(mr.fetch_multi_region().await.unwrap().len(), 4);
}

#[tokio::test]
async fn composite_slot_keeps_region_origins() {
    let mr = MultiRegionProvider::new(
        "Google Trends (múltiplas regiões)",
        vec![
            boxed(Scripted::region("pt", 2, pt())),
            boxed(Scripted::region("ao", 2, ao())),
        ],
    );
    let agg = TrendAggregator::new(vec![ProviderSlot::new(mr, 1.0)]);

    let batch = agg.fetch_primary().await;
    assert!(!batch.used_fallback);
    let origins = batch.origin_counts();
    assert_eq!(origins.get("PORTUGAL"), Some(&2));
    assert_eq!(origins.get("ANGOLA"), Some(&2));
}

#[tokio::test]
async fn blank_terms_do_not_use_up_the_region_quota() {
    let pt = pt();
    let mut items: Vec<_> = (0..8)
        .map(|_| {
            RawItem::GoogleTrends(GoogleTrendsItem {
                term: "  ".to_string(),
                traffic: None,
                pub_date: None,
                region: pt.clone(),
            })
        })
        .collect();
    items.extend(trend_items("real", 5, &pt));

    let mr = MultiRegionProvider::new("multi", vec![boxed(Scripted::raw("pt", items))]);
    let agg = TrendAggregator::new(vec![ProviderSlot::new(mr, 1.0)]);

    let batch = agg.fetch_primary().await;
    assert!(!batch.used_fallback);
    let terms: Vec<&str> = batch.records.iter().map(|r| r.term.as_str()).collect();
    assert_eq!(terms, vec!["real-0", "real-1", "real-2", "real-3", "real-4"]);
}

fn three_full_regions() -> MultiRegionProvider {
    MultiRegionProvider::new(
        "multi",
        vec![
            boxed(Scripted::region("pt", 20, pt())),
            boxed(Scripted::region("br", 20, br())),
            boxed(Scripted::region("ao", 20, ao())),
        ],
    )
}

#[tokio::test]
async fn exhaustive_round_keeps_every_region_at_the_provider_cap() {
    let mr = three_full_regions();
    assert_eq!(mr.fetch_every_region().await.map(|v| v.len()), Some(60));

    let agg = TrendAggregator::new(vec![ProviderSlot::new(three_full_regions(), 1.0)]);
    let all = agg.fetch_all_sources().await;
    assert_eq!(all.len(), 60);
    assert_eq!(all.origin_counts().get("BRASIL"), Some(&20));

    let quick = agg.fetch_primary().await;
    assert_eq!(quick.len(), 24);
}

#[tokio::test(start_paused = true)]
async fn hanging_region_times_out_before_the_composite() {
    let outer = Duration::from_secs(2);
    let mr = MultiRegionProvider::new(
        "multi",
        vec![
            boxed(Scripted::hanging("pt", Duration::from_secs(3600))),
            boxed(Scripted::region("br", 3, br())),
        ],
    )
    .with_timeout(region_budget(outer));
    let agg = TrendAggregator::new(vec![ProviderSlot::new(mr, 1.0)]).with_timeout(outer);

    for batch in [agg.fetch_primary().await, agg.fetch_all_sources().await] {
        assert!(!batch.used_fallback);
        assert_eq!(batch.len(), 3);
    }
}

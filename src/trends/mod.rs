// src/trends/mod.rs
pub mod aggregator;
pub mod error;
pub mod fallback;
pub mod normalize;
pub mod providers;
pub mod types;

pub use aggregator::{ProviderSlot, TrendAggregator};
pub use error::ProviderError;
pub use normalize::{normalize, NormalizeContext};
pub use types::{RawItem, SourceKind, TrendBatch, TrendProvider, TrendRecord, TrendTier};

use metrics::{describe_counter, describe_gauge, describe_histogram};
use once_cell::sync::OnceCell;

const TERM_MAX_CHARS: usize = 120;

/// One-time metrics registration (so series show up on /metrics).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "trends_provider_errors_total",
            "Provider calls that soft-failed (network, status, parse, timeout, empty)."
        );
        describe_counter!(
            "trends_records_total",
            "Normalized records returned to callers."
        );
        describe_counter!(
            "trends_fallback_total",
            "Calls answered from the static fallback set."
        );
        describe_histogram!(
            "trends_provider_fetch_ms",
            "Provider call time in milliseconds."
        );
        describe_histogram!("trends_rss_parse_ms", "RSS parse time in milliseconds.");
        describe_gauge!("trends_last_fetch_ts", "Unix ts of the last completed fetch.");
    });
}

/// Clean a headline term: decode entities, strip tags, drop list numbering
/// ("3. Foo") and hashtag marks, collapse whitespace.
pub fn clean_term(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, "").to_string();

    // 3) Collapse whitespace
    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").trim().to_string();

    // 4) Leading "12. " numbering from ranked feeds
    static RE_RANK: OnceCell<regex::Regex> = OnceCell::new();
    let re_rank = RE_RANK.get_or_init(|| regex::Regex::new(r"^\d+\.\s*").unwrap());
    out = re_rank.replace(&out, "").to_string();

    // 5) Hashtag marks
    out = out.trim_start_matches('#').trim().to_string();

    if out.chars().count() > TERM_MAX_CHARS {
        out = out.chars().take(TERM_MAX_CHARS).collect();
    }
    out
}

/// Average serialized size per record in KiB, one decimal ("0.0" when empty).
pub fn stream_size_kb(records: &[TrendRecord]) -> String {
    if records.is_empty() {
        return "0.0".to_string();
    }
    match serde_json::to_string(records) {
        Ok(json) => format!("{:.1}", json.len() as f64 / records.len() as f64 / 1024.0),
        Err(e) => {
            tracing::warn!(target: "trends", error = %e, "stream size serialization failed");
            "0.0".to_string()
        }
    }
}

// src/trends/normalize.rs
//! Raw provider items → `TrendRecord`.
//!
//! Everything here is a pure function of its inputs and `NormalizeContext::now`,
//! so normalizing the same item twice yields identical records.

use chrono::{DateTime, NaiveDateTime, Utc};
use once_cell::sync::OnceCell;
use regex::Regex;

use crate::trends::clean_term;
use crate::trends::types::{
    BlueskyItem, GoogleTrendsItem, NeologismItem, RawItem, SourceKind, TrendRecord, TrendTier,
};

const NEOLOGISM_ORIGIN: &str = "PORTUGUÊS MODERNO";
const NEOLOGISM_STATUS: &str = "Neologismo";
const BLUESKY_ORIGIN: &str = "BLUESKY";

#[derive(Debug, Clone, Copy)]
pub struct NormalizeContext {
    pub now: DateTime<Utc>,
}

impl NormalizeContext {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    pub fn now() -> Self {
        Self { now: Utc::now() }
    }
}

/// Bucket a magnitude string such as "+500K", "1.2M" or "200,000+".
/// Missing or digit-free input ("+Unknown") yields `Normal`.
pub fn tier_from_traffic(traffic: Option<&str>) -> TrendTier {
    static RE_MAGNITUDE: OnceCell<Regex> = OnceCell::new();
    let re = RE_MAGNITUDE.get_or_init(|| Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*([KMB]?)").unwrap());

    let Some(raw) = traffic else {
        return TrendTier::Normal;
    };
    // Comma is a thousands separator in RSS counts ("200,000+").
    let raw = raw.replace(',', "");
    let Some(caps) = re.captures(&raw) else {
        return TrendTier::Normal;
    };
    let Ok(mut n) = caps[1].parse::<f64>() else {
        return TrendTier::Normal;
    };

    match caps.get(2).map(|m| m.as_str().to_ascii_uppercase()).as_deref() {
        Some("K") => n *= 1_000.0,
        Some("M") => n *= 1_000_000.0,
        Some("B") => n *= 1_000_000_000.0,
        _ => {}
    }
    TrendTier::from_magnitude(n)
}

/// Elapsed-time class of a publication timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recency {
    JustNow,
    Minutes(i64),
    Hours(i64),
    Days(i64),
    /// Timestamp present but unparsable.
    Detected,
}

impl Recency {
    pub fn between(published: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let elapsed = now - published;
        let minutes = elapsed.num_minutes();
        if minutes < 1 {
            return Recency::JustNow;
        }
        if minutes < 60 {
            return Recency::Minutes(minutes);
        }
        let hours = elapsed.num_hours();
        if hours < 24 {
            return Recency::Hours(hours);
        }
        Recency::Days(elapsed.num_days())
    }

    pub fn label(&self) -> String {
        match self {
            Recency::JustNow => "Agora mesmo".to_string(),
            Recency::Minutes(n) => format!("{n} min atrás"),
            Recency::Hours(n) => format!("{n}h atrás"),
            Recency::Days(n) => format!("{n}d atrás"),
            Recency::Detected => "Detectado".to_string(),
        }
    }
}

/// Recency of an optional raw timestamp. Absent means "now".
pub fn recency_of(pub_date: Option<&str>, now: DateTime<Utc>) -> Recency {
    match pub_date.map(str::trim).filter(|s| !s.is_empty()) {
        None => Recency::JustNow,
        Some(s) => match parse_published(s) {
            Some(ts) => Recency::between(ts, now),
            None => Recency::Detected,
        },
    }
}

/// Parse RFC 3339, RFC 2822 (RSS `pubDate`) or a naive ISO-8601 timestamp (read as UTC).
pub fn parse_published(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|n| n.and_utc())
}

/// Normalize one raw item. Returns `None` when no usable term survives cleaning.
pub fn normalize(raw: &RawItem, ctx: &NormalizeContext) -> Option<TrendRecord> {
    match raw {
        RawItem::GoogleTrends(it) => normalize_google(it, ctx),
        RawItem::Bluesky(it) => normalize_bluesky(it, ctx),
        RawItem::Neologism(it) => normalize_neologism(it, ctx),
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

fn normalize_google(it: &GoogleTrendsItem, ctx: &NormalizeContext) -> Option<TrendRecord> {
    let term = clean_term(&it.term);
    if term.is_empty() {
        return None;
    }
    let traffic = non_empty(it.traffic.as_deref());
    let pub_date = non_empty(it.pub_date.as_deref());

    Some(TrendRecord {
        term,
        origin: it.region.origin_label(),
        status: recency_of(pub_date, ctx.now).label(),
        trend: tier_from_traffic(traffic),
        description: format!(
            "(Google Trends) Termo em tendência em {}. Volume de buscas: {} buscas/dia.",
            it.region.name,
            traffic.unwrap_or("+0")
        ),
        raw_traffic: traffic.map(str::to_string),
        published_at: pub_date.and_then(parse_published),
        source_kind: SourceKind::Trends,
    })
}

fn normalize_bluesky(it: &BlueskyItem, ctx: &NormalizeContext) -> Option<TrendRecord> {
    let term = clean_term(&it.term);
    if term.is_empty() {
        return None;
    }
    let traffic = non_empty(it.traffic.as_deref());
    let pub_date = non_empty(it.pub_date.as_deref());
    let description = match non_empty(it.description.as_deref()) {
        Some(d) => format!("(Bluesky) {d}"),
        None => "(Bluesky) Tópico trending no Bluesky".to_string(),
    };

    Some(TrendRecord {
        term,
        origin: non_empty(it.origin.as_deref())
            .unwrap_or(BLUESKY_ORIGIN)
            .to_string(),
        status: recency_of(pub_date, ctx.now).label(),
        trend: tier_from_traffic(traffic),
        description,
        raw_traffic: traffic.map(str::to_string),
        published_at: pub_date.and_then(parse_published),
        source_kind: SourceKind::Social,
    })
}

fn normalize_neologism(it: &NeologismItem, _ctx: &NormalizeContext) -> Option<TrendRecord> {
    let term = clean_term(&it.term);
    if term.is_empty() {
        return None;
    }
    let gloss = non_empty(it.context.as_deref())
        .or_else(|| non_empty(it.definition.as_deref()))
        .unwrap_or("Termo novo em português");
    let pub_date = non_empty(it.pub_date.as_deref());

    Some(TrendRecord {
        term,
        origin: NEOLOGISM_ORIGIN.to_string(),
        status: NEOLOGISM_STATUS.to_string(),
        trend: TrendTier::Rising,
        description: format!("(Neologismo) {gloss}"),
        raw_traffic: None,
        published_at: pub_date.and_then(parse_published),
        source_kind: SourceKind::Curated,
    })
}

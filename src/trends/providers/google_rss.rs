// src/trends/providers/google_rss.rs
//! Google Trends daily RSS (`trendingsearches/daily/rss?geo=XX`).
//!
//! The feed mixes plain RSS fields with `ht:`-prefixed extensions and nested
//! `ht:news_item` blocks, so it is read with a streaming reader keyed on local
//! element names rather than a fixed serde shape.

use async_trait::async_trait;
use metrics::histogram;
use once_cell::sync::OnceCell;
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;

use crate::trends::error::ProviderError;
use crate::trends::providers::Source;
use crate::trends::types::{GoogleTrendsItem, RawItem, Region, TrendProvider, DEFAULT_PROVIDER_CAP};

pub const DEFAULT_RSS_BASE: &str = "https://trends.google.com/trends/trendingsearches/daily/rss";

#[derive(Default)]
struct ItemFields {
    title: String,
    pub_date: String,
    description: String,
    approx_traffic: String,
}

#[derive(Clone, Copy, PartialEq)]
enum Field {
    Title,
    PubDate,
    Description,
    ApproxTraffic,
    Other,
}

impl Field {
    fn from_local_name(name: &[u8]) -> Self {
        match name {
            b"title" => Field::Title,
            b"pubDate" => Field::PubDate,
            b"description" => Field::Description,
            b"approx_traffic" => Field::ApproxTraffic,
            _ => Field::Other,
        }
    }
}

impl ItemFields {
    fn push(&mut self, field: Field, text: &str) {
        let slot = match field {
            Field::Title => &mut self.title,
            Field::PubDate => &mut self.pub_date,
            Field::Description => &mut self.description,
            Field::ApproxTraffic => &mut self.approx_traffic,
            Field::Other => return,
        };
        slot.push_str(text);
    }
}

/// First "+123K"-style token in a free-text description.
fn traffic_from_description(desc: &str) -> Option<String> {
    static RE_TRAFFIC: OnceCell<Regex> = OnceCell::new();
    let re = RE_TRAFFIC.get_or_init(|| Regex::new(r"\+[\d.]+[KMB]?").unwrap());
    re.find(desc).map(|m| m.as_str().to_string())
}

/// Parse `<item>` elements out of an RSS document.
pub(crate) fn parse_rss_items(xml: &str, region: &Region) -> Result<Vec<RawItem>, ProviderError> {
    let t0 = std::time::Instant::now();
    let mut reader = Reader::from_str(xml);

    let mut out = Vec::new();
    let mut current: Option<ItemFields> = None;
    // Only direct children of <item> are captured; nested news blocks are skipped.
    let mut depth_in_item = 0usize;
    let mut field = Field::Other;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let local = e.local_name();
                if local.as_ref() == b"item" && current.is_none() {
                    current = Some(ItemFields::default());
                    depth_in_item = 0;
                    continue;
                }
                if current.is_some() {
                    depth_in_item += 1;
                    field = if depth_in_item == 1 {
                        Field::from_local_name(local.as_ref())
                    } else {
                        Field::Other
                    };
                }
            }
            Event::End(e) => {
                if e.local_name().as_ref() == b"item" && depth_in_item == 0 {
                    if let Some(fields) = current.take() {
                        if let Some(item) = into_raw(fields, region) {
                            out.push(item);
                        }
                    }
                } else if current.is_some() {
                    depth_in_item = depth_in_item.saturating_sub(1);
                }
                field = Field::Other;
            }
            Event::Text(t) => {
                if let Some(fields) = current.as_mut() {
                    let text = t
                        .unescape()
                        .map(|c| c.into_owned())
                        .unwrap_or_else(|_| String::from_utf8_lossy(&t).into_owned());
                    fields.push(field, &text);
                }
            }
            Event::CData(c) => {
                if let Some(fields) = current.as_mut() {
                    let text = String::from_utf8_lossy(&c.into_inner()).into_owned();
                    fields.push(field, &text);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    histogram!("trends_rss_parse_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
    Ok(out)
}

fn into_raw(fields: ItemFields, region: &Region) -> Option<RawItem> {
    let title = fields.title.trim();
    if title.is_empty() {
        return None;
    }
    let traffic = match fields.approx_traffic.trim() {
        "" => traffic_from_description(&fields.description).unwrap_or_else(|| "+0".to_string()),
        t => t.to_string(),
    };
    let pub_date = fields.pub_date.trim();
    Some(RawItem::GoogleTrends(GoogleTrendsItem {
        term: title.to_string(),
        traffic: Some(traffic),
        pub_date: (!pub_date.is_empty()).then(|| pub_date.to_string()),
        region: region.clone(),
    }))
}

/// Region-scoped Google Trends feed read directly from the RSS endpoint.
pub struct GoogleTrendsRssProvider {
    name: String,
    region: Region,
    cap: usize,
    source: Source,
}

impl GoogleTrendsRssProvider {
    pub fn from_url(base: &str, region: Region, client: reqwest::Client) -> Self {
        let url = format!("{}?geo={}", base.trim_end_matches('/'), region.code);
        Self::with_source(region, Source::http(url, client))
    }

    pub fn from_fixture(xml: &str, region: Region) -> Self {
        Self::with_source(region, Source::Fixture(xml.to_string()))
    }

    fn with_source(region: Region, source: Source) -> Self {
        Self {
            name: format!("Google Trends RSS ({})", region.code),
            region,
            cap: DEFAULT_PROVIDER_CAP,
            source,
        }
    }

    pub fn with_cap(mut self, cap: usize) -> Self {
        self.cap = cap.max(1);
        self
    }
}

#[async_trait]
impl TrendProvider for GoogleTrendsRssProvider {
    async fn query(&self) -> Result<Vec<RawItem>, ProviderError> {
        let body = self
            .source
            .body("application/rss+xml,application/xml")
            .await?;
        let items = parse_rss_items(&body, &self.region)?;
        if items.is_empty() {
            return Err(ProviderError::Empty);
        }
        tracing::debug!(target: "trends", provider = %self.name, items = items.len(), "rss parsed");
        Ok(items)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn max_items(&self) -> usize {
        self.cap
    }
}

// src/trends/providers/neologisms.rs
use async_trait::async_trait;
use serde::Deserialize;

use crate::trends::error::ProviderError;
use crate::trends::providers::{parse_envelope, Source};
use crate::trends::types::{NeologismItem, RawItem, TrendProvider, DEFAULT_PROVIDER_CAP};

#[derive(Debug, Deserialize)]
struct Row {
    termo: Option<String>,
    def: Option<String>,
    context: Option<String>,
    idioma: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
}

/// Curated Portuguese neologisms served by the trends proxy
/// (`GET {backend}/bluesky/neologismos`).
pub struct NeologismProvider {
    cap: usize,
    source: Source,
}

impl NeologismProvider {
    pub fn from_backend(backend_url: &str, client: reqwest::Client) -> Self {
        let url = format!("{}/bluesky/neologismos", backend_url.trim_end_matches('/'));
        Self {
            cap: DEFAULT_PROVIDER_CAP,
            source: Source::http(url, client),
        }
    }

    pub fn from_fixture(body: &str) -> Self {
        Self {
            cap: DEFAULT_PROVIDER_CAP,
            source: Source::Fixture(body.to_string()),
        }
    }

    pub fn with_cap(mut self, cap: usize) -> Self {
        self.cap = cap.max(1);
        self
    }
}

#[async_trait]
impl TrendProvider for NeologismProvider {
    async fn query(&self) -> Result<Vec<RawItem>, ProviderError> {
        let body = self.source.body("application/json").await?;
        let items: Vec<RawItem> = parse_envelope::<Row>(&body)?
            .into_iter()
            .filter_map(|r| {
                Some(RawItem::Neologism(NeologismItem {
                    term: r.termo?,
                    definition: r.def,
                    context: r.context,
                    language: r.idioma,
                    pub_date: r.pub_date,
                }))
            })
            .collect();
        if items.is_empty() {
            return Err(ProviderError::Empty);
        }
        Ok(items)
    }

    fn name(&self) -> &str {
        "Neologismos"
    }

    fn max_items(&self) -> usize {
        self.cap
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rows_map_to_neologism_items() {
        let body = r#"{"success": true, "data": [
            {"termo": "Cringe", "def": "Vergonha alheia", "context": "Usado nas redes", "idioma": "pt-BR"},
            {"def": "sem termo"}
        ]}"#;
        let items = NeologismProvider::from_fixture(body).query().await.unwrap();
        assert_eq!(items.len(), 1);
        match &items[0] {
            RawItem::Neologism(it) => {
                assert_eq!(it.term, "Cringe");
                assert_eq!(it.language.as_deref(), Some("pt-BR"));
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[tokio::test]
    async fn failed_envelope_is_empty() {
        let p = NeologismProvider::from_fixture(r#"{"success": false}"#).with_cap(0);
        assert!(matches!(p.query().await, Err(ProviderError::Empty)));
        assert_eq!(p.max_items(), 1);
    }
}

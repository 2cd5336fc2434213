// src/config/aggregator.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::trends::providers::backend::BackendTrendsProvider;
use crate::trends::providers::bluesky::BlueskyTrendsProvider;
use crate::trends::providers::google_rss::{GoogleTrendsRssProvider, DEFAULT_RSS_BASE};
use crate::trends::providers::http_client;
use crate::trends::providers::multi_region::{region_budget, MultiRegionProvider};
use crate::trends::providers::neologisms::NeologismProvider;
use crate::trends::types::{Region, TrendProvider, DEFAULT_PROVIDER_CAP, DEFAULT_REGION_CAP};
use crate::trends::{ProviderSlot, TrendAggregator};

pub const ENV_CONFIG_PATH: &str = "TRENDS_CONFIG_PATH";
pub const ENV_BACKEND_URL: &str = "BACKEND_URL";

const DEFAULT_TOML_PATH: &str = "config/trends.toml";
const DEFAULT_JSON_PATH: &str = "config/trends.json";

fn default_backend_url() -> String {
    "http://localhost:5000".to_string()
}
fn default_timeout_secs() -> u64 {
    8
}
fn default_regions() -> Vec<Region> {
    vec![
        Region::new("PT", "Portugal"),
        Region::new("BR", "Brasil"),
        Region::new("AO", "Angola"),
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatorConfig {
    /// Trends proxy base URL (`/trends`, `/bluesky`, `/bluesky/neologismos`).
    pub backend_url: String,
    /// Per-call provider budget.
    pub timeout_secs: u64,
    pub provider_cap: usize,
    pub region_cap: usize,
    pub regions: Vec<Region>,
    /// Also read Google Trends RSS directly (after the proxy in priority).
    pub google_rss: bool,
    pub google_rss_base: String,
    pub bluesky: bool,
    /// Read Bluesky from the public AppView instead of the proxy.
    pub bluesky_public: bool,
    pub neologisms: bool,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            timeout_secs: default_timeout_secs(),
            provider_cap: DEFAULT_PROVIDER_CAP,
            region_cap: DEFAULT_REGION_CAP,
            regions: default_regions(),
            google_rss: false,
            google_rss_base: DEFAULT_RSS_BASE.to_string(),
            bluesky: true,
            bluesky_public: false,
            neologisms: true,
        }
    }
}

impl AggregatorConfig {
    /// Load from an explicit path. Supports TOML or JSON formats.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading trends config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let cfg = parse_config(&content, ext.as_str())
            .with_context(|| format!("parsing trends config {}", path.display()))?;
        Ok(cfg.apply_env().sanitized())
    }

    /// Load using env var + fallbacks:
    /// 1) $TRENDS_CONFIG_PATH (must exist)
    /// 2) config/trends.toml
    /// 3) config/trends.json
    /// 4) built-in defaults
    ///
    /// `$BACKEND_URL` overrides `backend_url` in every case.
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            }
            return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
        }
        for p in [DEFAULT_TOML_PATH, DEFAULT_JSON_PATH] {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            }
        }
        Ok(Self::default().apply_env().sanitized())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn apply_env(mut self) -> Self {
        if let Ok(url) = std::env::var(ENV_BACKEND_URL) {
            let url = url.trim();
            if !url.is_empty() {
                self.backend_url = url.to_string();
            }
        }
        self
    }

    fn sanitized(mut self) -> Self {
        if self.timeout_secs == 0 {
            self.timeout_secs = default_timeout_secs();
        }
        self.provider_cap = self.provider_cap.max(1);
        self.region_cap = self.region_cap.max(1);
        self.regions.retain(|r| !r.code.trim().is_empty());
        for r in &mut self.regions {
            r.code = r.code.trim().to_ascii_uppercase();
        }
        if self.regions.is_empty() {
            self.regions = default_regions();
        }
        self.backend_url = self.backend_url.trim_end_matches('/').to_string();
        self
    }

    /// Build the provider chain in priority order:
    /// proxy trends (all regions) → Google RSS (optional) → Bluesky → neologisms.
    pub fn build_aggregator(&self) -> TrendAggregator {
        let timeout = self.timeout();
        let client = http_client(timeout);
        let mut slots = Vec::new();

        let proxy_regions: Vec<Box<dyn TrendProvider>> = self
            .regions
            .iter()
            .map(|r| {
                Box::new(
                    BackendTrendsProvider::from_url(&self.backend_url, r.clone(), client.clone())
                        .with_cap(self.provider_cap),
                ) as Box<dyn TrendProvider>
            })
            .collect();
        slots.push(ProviderSlot::new(
            MultiRegionProvider::new("Google Trends (múltiplas regiões)", proxy_regions)
                .with_region_cap(self.region_cap)
                .with_timeout(region_budget(timeout)),
            1.0,
        ));

        if self.google_rss {
            let rss_regions: Vec<Box<dyn TrendProvider>> = self
                .regions
                .iter()
                .map(|r| {
                    Box::new(
                        GoogleTrendsRssProvider::from_url(
                            &self.google_rss_base,
                            r.clone(),
                            client.clone(),
                        )
                        .with_cap(self.provider_cap),
                    ) as Box<dyn TrendProvider>
                })
                .collect();
            slots.push(ProviderSlot::new(
                MultiRegionProvider::new("Google Trends RSS", rss_regions)
                    .with_region_cap(self.region_cap)
                    .with_timeout(region_budget(timeout)),
                0.9,
            ));
        }

        if self.bluesky {
            let p = if self.bluesky_public {
                BlueskyTrendsProvider::from_public(client.clone())
            } else {
                BlueskyTrendsProvider::from_backend(&self.backend_url, client.clone())
            };
            slots.push(ProviderSlot::new(p.with_cap(self.provider_cap), 0.8));
        }

        if self.neologisms {
            slots.push(ProviderSlot::new(
                NeologismProvider::from_backend(&self.backend_url, client)
                    .with_cap(self.provider_cap),
                0.7,
            ));
        }

        TrendAggregator::new(slots).with_timeout(timeout)
    }
}

fn parse_config(s: &str, hint_ext: &str) -> Result<AggregatorConfig> {
    if hint_ext == "json" {
        return serde_json::from_str(s).context("invalid JSON trends config");
    }
    if hint_ext == "toml" {
        return toml::from_str(s).context("invalid TOML trends config");
    }
    // Unknown extension: sniff JSON first, then TOML.
    if let Ok(v) = serde_json::from_str(s) {
        return Ok(v);
    }
    toml::from_str(s).map_err(|e| anyhow!("unsupported trends config format: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_and_json_fill_missing_fields_with_defaults() {
        let toml = r#"
backend_url = "https://lingua-viva.onrender.com/"
regions = [{ code = "mz", name = "Moçambique" }]
"#;
        let cfg = parse_config(toml, "toml").unwrap().sanitized();
        assert_eq!(cfg.backend_url, "https://lingua-viva.onrender.com");
        assert_eq!(cfg.regions, vec![Region::new("MZ", "Moçambique")]);
        assert_eq!(cfg.timeout_secs, 8);
        assert!(cfg.bluesky);

        let json = r#"{"timeout_secs": 0, "provider_cap": 0, "regions": []}"#;
        let cfg = parse_config(json, "json").unwrap().sanitized();
        assert_eq!(cfg.timeout_secs, 8);
        assert_eq!(cfg.provider_cap, 1);
        assert_eq!(cfg.regions.len(), 3);
    }

    #[test]
    fn unknown_extension_is_sniffed() {
        assert!(parse_config(r#"{"google_rss": true}"#, "").unwrap().google_rss);
        assert!(!parse_config("neologisms = false", "").unwrap().neologisms);
        assert!(parse_config("::not config::", "").is_err());
    }

    #[test]
    fn chain_order_follows_flags() {
        let cfg = AggregatorConfig {
            google_rss: true,
            ..AggregatorConfig::default()
        };
        let agg = cfg.build_aggregator();
        assert_eq!(
            agg.provider_names(),
            vec![
                "Google Trends (múltiplas regiões)",
                "Google Trends RSS",
                "Bluesky",
                "Neologismos"
            ]
        );

        let cfg = AggregatorConfig {
            bluesky: false,
            neologisms: false,
            ..AggregatorConfig::default()
        };
        assert_eq!(cfg.build_aggregator().provider_names().len(), 1);
    }
}

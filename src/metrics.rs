// src/metrics.rs
//! Prometheus exposition for the service binary.

use anyhow::Context;
use axum::{http::header, response::IntoResponse, routing::get, Router};
use metrics::{describe_gauge, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

const CONTENT_TYPE: &str = "text/plain; version=0.0.4";

#[derive(Clone)]
pub struct Metrics {
    handle: PrometheusHandle,
}

impl Metrics {
    /// Install the global recorder and publish the provider chain.
    /// Fails if a recorder is already installed in this process.
    pub fn init(providers: &[&str]) -> anyhow::Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;

        describe_gauge!("trends_providers_configured", "Provider slots in the chain.");
        describe_gauge!(
            "trends_provider_priority",
            "Position of each provider in the chain (0 is queried first)."
        );
        gauge!("trends_providers_configured").set(providers.len() as f64);
        for (pos, name) in providers.iter().enumerate() {
            gauge!("trends_provider_priority", "provider" => name.to_string()).set(pos as f64);
        }

        Ok(Self { handle })
    }

    pub fn render(&self) -> String {
        self.handle.render()
    }

    /// `GET /metrics`.
    pub fn router(&self) -> Router {
        let metrics = self.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let body = metrics.render();
                async move { ([(header::CONTENT_TYPE, CONTENT_TYPE)], body).into_response() }
            }),
        )
    }
}

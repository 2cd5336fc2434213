use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use serde_json::json;
use tower_http::cors::CorsLayer;

use crate::trends::{stream_size_kb, TrendAggregator, TrendBatch};

#[derive(Clone)]
pub struct AppState {
    aggregator: Arc<TrendAggregator>,
}

impl AppState {
    pub fn new(aggregator: TrendAggregator) -> Self {
        Self {
            aggregator: Arc::new(aggregator),
        }
    }

    pub fn aggregator(&self) -> &TrendAggregator {
        &self.aggregator
    }
}

/// Router consumed by the stream pages. CORS is wide open: the pages are
/// served from a different origin than this API.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(service_info))
        .route("/health", get(|| async { "ok" }))
        .route("/stream", get(stream_quick))
        .route("/stream/all", get(stream_all))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StreamResp {
    #[serde(flatten)]
    batch: TrendBatch,
    count: usize,
    stream_size_kb: String,
}

impl From<TrendBatch> for StreamResp {
    fn from(batch: TrendBatch) -> Self {
        Self {
            count: batch.len(),
            stream_size_kb: stream_size_kb(&batch.records),
            batch,
        }
    }
}

async fn stream_quick(State(state): State<AppState>) -> Json<StreamResp> {
    Json(state.aggregator.fetch_primary().await.into())
}

async fn stream_all(State(state): State<AppState>) -> Json<StreamResp> {
    Json(state.aggregator.fetch_all_sources().await.into())
}

async fn service_info(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "service": "lingua-viva-trends",
        "version": env!("CARGO_PKG_VERSION"),
        "providers": state.aggregator.provider_names(),
        "endpoints": {
            "GET /stream": "first provider with data, in priority order",
            "GET /stream/all": "every provider merged",
            "GET /health": "liveness"
        }
    }))
}

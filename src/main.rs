//! Trends service binary entrypoint.
//! Boots the Axum HTTP server: aggregator from config, stream routes, `/metrics`.

use lingua_viva_trends::{api, metrics::Metrics, AggregatorConfig};
use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEV_LOG_ENV: &str = "TRENDS_DEV_LOG";
const DEFAULT_FILTER: &str = "trends=info,warn";

/// Debug builds, or a Shuttle environment named local/development/dev.
fn running_in_dev() -> bool {
    if cfg!(debug_assertions) {
        return true;
    }
    let env = std::env::var("SHUTTLE_ENV").unwrap_or_default();
    ["local", "development", "dev"]
        .iter()
        .any(|name| env.eq_ignore_ascii_case(name))
}

/// Compact provider logs, only with `TRENDS_DEV_LOG=1` in a dev environment.
/// `RUST_LOG` refines the filter when set.
fn enable_dev_tracing() {
    let requested = std::env::var(DEV_LOG_ENV).as_deref() == Ok("1");
    if !requested || !running_in_dev() {
        return;
    }

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_target(false))
        .init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // .env is optional; it usually carries BACKEND_URL for local runs.
    let _ = dotenvy::dotenv();

    enable_dev_tracing();

    let cfg = AggregatorConfig::load_default()?;
    tracing::info!(
        target: "trends",
        backend = %cfg.backend_url,
        regions = cfg.regions.len(),
        "trends config loaded"
    );

    let aggregator = cfg.build_aggregator().with_on_data_updated(|batch| {
        tracing::debug!(
            target: "trends",
            records = batch.len(),
            used_fallback = batch.used_fallback,
            "stream data updated"
        );
    });
    let metrics = Metrics::init(&aggregator.provider_names())?;

    let router = api::router(api::AppState::new(aggregator)).merge(metrics.router());

    Ok(router.into())
}

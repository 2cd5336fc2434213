// src/bin/stream_probe.rs
//
// Runs one aggregation round from the command line and prints the records.
//
// Usage:
//   cargo run --bin stream_probe            # every provider merged
//   cargo run --bin stream_probe -- quick   # first provider with data
//
// Config comes from TRENDS_CONFIG_PATH / config/trends.toml / BACKEND_URL,
// exactly as for the service.

use anyhow::bail;
use lingua_viva_trends::trends::stream_size_kb;
use lingua_viva_trends::AggregatorConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trends=info")),
        )
        .with_target(false)
        .compact()
        .init();

    let mode = std::env::args().nth(1).unwrap_or_else(|| "all".to_string());

    let cfg = AggregatorConfig::load_default()?;
    let agg = cfg.build_aggregator().with_on_data_updated(|batch| {
        tracing::info!(
            target: "trends",
            records = batch.len(),
            used_fallback = batch.used_fallback,
            "data updated"
        );
    });

    let batch = match mode.as_str() {
        "quick" => agg.fetch_primary().await,
        "all" => agg.fetch_all_sources().await,
        other => bail!("unknown mode {other:?} (expected \"quick\" or \"all\")"),
    };

    for r in &batch.records {
        println!(
            "{:<12} {:<32} {:<10} {:<14} {}",
            r.trend.label(),
            r.term,
            r.origin,
            r.status,
            r.description
        );
    }
    println!(
        "\n{} records | fallback: {} | sources: {} | ~{} KB/record",
        batch.len(),
        batch.used_fallback,
        if batch.sources.is_empty() {
            "-".to_string()
        } else {
            batch.sources.join(", ")
        },
        stream_size_kb(&batch.records)
    );
    for (origin, n) in batch.origin_counts() {
        println!("  {origin}: {n}");
    }
    Ok(())
}

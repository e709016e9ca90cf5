use anyhow::Context;
use property_board::api::HttpPropertyStore;
use property_board::config::Settings;
use property_board::controller::ListController;
use property_board::report;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("property_board=info")),
        )
        .init();

    let settings = Settings::from_env()?;
    info!("🏠 Property Board - {}", settings.client.base_url);

    let store = Arc::new(HttpPropertyStore::with_settings(settings.client.clone())?);
    let mut controller = ListController::with_config(store, settings.controller);

    controller
        .activate()
        .await
        .context("Failed to load the first page of properties")?;

    if settings.load_all {
        controller
            .load_all()
            .await
            .context("Failed to load remaining pages")?;
    }

    // Bookings arrive independently; wait for all of them before printing
    controller.settle().await;

    let state = controller.state();
    for failure in state.enrichment_failures() {
        warn!("Bookings unavailable: {}", failure.error);
    }

    info!(
        "✅ Loaded {} properties ({} pages total)",
        state.properties().len(),
        state.cursor().total_pages
    );
    for (i, property) in state.properties().iter().enumerate() {
        println!("{}", report::property_block(i + 1, property));
    }
    if state.has_more() {
        println!("More properties available, set PROPERTY_LOAD_ALL=true to fetch them.");
    }

    let json = serde_json::to_string_pretty(state.properties())?;
    tokio::fs::write(&settings.snapshot_path, json)
        .await
        .with_context(|| format!("Failed to write {}", settings.snapshot_path.display()))?;
    info!("💾 Saved snapshot to {}", settings.snapshot_path.display());

    Ok(())
}

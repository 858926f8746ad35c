//! Context bridge HTTP server binary

use context_bridge::catalog::{find_duplicates, load_catalog_or_empty, JsonFileCatalog};
use context_bridge::clock::SystemClock;
use context_bridge::config::BridgeConfig;
use context_bridge::server::run_server;
use context_bridge::{DisplayMessage, SelectionBridge, SessionStateMachine};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let config = BridgeConfig::from_env();
    info!("Context bridge v{}", env!("CARGO_PKG_VERSION"));
    info!("Catalog: {}", config.catalog_path.display());

    let catalog = JsonFileCatalog::new(&config.catalog_path);
    let preview = load_catalog_or_empty(&catalog);
    info!("Catalog currently holds {} records", preview.len());

    let report = find_duplicates(&preview);
    for (a, b) in &report.duplicate_titles {
        warn!("Catalog records {} and {} share a title", a, b);
    }
    for (a, b) in &report.duplicate_urls {
        warn!("Catalog records {} and {} share a URL", a, b);
    }
    for (a, b) in &report.similar_content {
        debug!("Catalog records {} and {} have overlapping content", a, b);
    }

    let machine = SessionStateMachine::with_parts(
        Box::new(catalog),
        Box::new(SystemClock),
        config.weights.clone(),
    );
    let (bridge, mut display_rx) = SelectionBridge::channel(machine);

    // Stand-in display surface: the real panel lives in the editor host
    tokio::spawn(async move {
        while let Some(message) = display_rx.recv().await {
            match message {
                DisplayMessage::Loading => debug!("display <- loading"),
                DisplayMessage::UpdateContext { payload } => debug!(
                    "display <- update-context session={} nuggets={}",
                    payload.session_id,
                    payload.nuggets.len()
                ),
                DisplayMessage::Clear => debug!("display <- clear"),
            }
        }
    });

    run_server(Arc::new(Mutex::new(bridge)), config.port).await?;

    Ok(())
}

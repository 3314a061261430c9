use comanda_panel::{BackgroundTasks, Config, RealtimeFeed, init_logger, spawn_panel};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_logger();

    tracing::info!("Comanda panel starting...");

    let config = Config::from_env();
    let feed = Arc::new(RealtimeFeed::new(&config));

    let mut tasks = BackgroundTasks::new();
    let handle = spawn_panel(&config, feed, &mut tasks);
    tasks.log_summary();

    if config.operator_id.is_some() {
        tracing::info!("Operator identity fixed from environment");
    } else {
        tracing::warn!("No OPERATOR_ID set; waiting for an identity on the operator channel");
    }

    // The display layer holds the handle; headless runs just keep the
    // pipeline alive until interrupted
    let _handle = handle;

    tokio::signal::ctrl_c().await?;
    tracing::info!("Interrupt received, shutting down");
    tasks.shutdown().await;

    Ok(())
}

mod app;
mod config;
mod export;
mod journal;
mod store;

use anyhow::Result;
use app::App;
use config::AppConfig;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Load config
    let config = AppConfig::load("config.toml")?;
    info!("Loaded configuration: {:?}", config);

    // Run one scan-and-rank cycle
    let mut app = App::new(config)?;
    app.run().await?;

    Ok(())
}

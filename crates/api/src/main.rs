//! Student Grade Predictor - Main Entry Point

use anyhow::Context;
use api::{init_logging, run_server, Settings};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load(None).context("failed to load settings")?;
    init_logging(&settings.logging).context("failed to initialise logging")?;

    info!("=== Student Grade Predictor v{} ===", env!("CARGO_PKG_VERSION"));
    info!(
        "Model artifact: {}, preprocessor artifact: {}",
        settings.pipeline.model_path.display(),
        settings.pipeline.preprocessor_path.display()
    );

    run_server(settings).await.context("server terminated")?;

    Ok(())
}

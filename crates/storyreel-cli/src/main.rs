//! Storyreel script runner entry point.

use std::error::Error;
use std::io;

use storyreel_cli::settings::Settings;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Render commands own stdout, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .json()
        .init();

    let settings = Settings::from_env()?;
    tracing::info!(
        viewer_id = %settings.viewer_id,
        realtime = settings.realtime,
        "Starting storyreel script runner"
    );

    let summary = storyreel_cli::app::run(&settings, io::stdout().lock()).await?;
    tracing::info!(state = ?summary.state, "Replay complete");

    Ok(())
}

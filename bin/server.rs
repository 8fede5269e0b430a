// Prize Intervals - Web Server
// Imports the CSV folder at startup, then serves the API

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use prize_intervals::api::{build_router, AppState};
use prize_intervals::{import_from_directory, init_tracing, open_repository, Settings};

#[derive(Parser)]
#[command(name = "prize-server", version, about = "Serve producer win intervals over HTTP")]
struct ServerCli {
    #[command(flatten)]
    settings: Settings,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let settings = ServerCli::parse().settings;

    info!("Starting prize-server v{}", prize_intervals::VERSION);

    let mut repo = open_repository(&settings)?;
    let config = settings.import_config()?;

    // A failed import leaves the store empty; the endpoint reports it
    match import_from_directory(&mut repo, &settings.csv_dir, &config) {
        Ok(summary) => info!(
            "{} of {} producers data imported to database in {} rows checked.",
            summary.imported_count(),
            summary.producer_row_count,
            summary.row_count
        ),
        Err(e) => error!("CSV import failed: {}", e),
    }

    let app = build_router(AppState::new(repo, settings.policy));

    let listener = tokio::net::TcpListener::bind(&settings.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", settings.bind))?;

    info!("Server running on http://{}", settings.bind);
    info!("API: http://{}/api/v1/prizes_interval", settings.bind);

    axum::serve(listener, app)
        .await
        .context("Server stopped unexpectedly")?;

    Ok(())
}

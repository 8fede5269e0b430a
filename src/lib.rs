// Prize Intervals - Core Library
// Exposes all modules for use in the CLI, the API server and tests

pub mod entities;
pub mod repository;
pub mod db;
pub mod populate;
pub mod importer;
pub mod intervals;
pub mod config;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use entities::{Entity, Movie, Prize, Producer, Studios};
pub use repository::{InMemoryPrizeRepository, MovieInput, PrizeRecord, PrizeRepository};
pub use db::{SqlitePrizeRepository, StoreCounts};
pub use populate::{
    delete_all_data, populate_prize, PopulationOutcome, PopulationStatus, WipeOutcome,
};
pub use importer::{import_from_directory, Column, ColumnMap, ImportError, ImportSummary};
pub use intervals::{
    compute_extreme_intervals, show_prize_intervals, IntervalPolicy, IntervalReport,
    PrizeIntervals, ProducerInterval, ReportStatus,
};
pub use config::{ImportConfig, Settings};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Open the configured store: a database file when a path is given,
/// otherwise a private in-memory database.
pub fn open_repository(settings: &Settings) -> anyhow::Result<SqlitePrizeRepository> {
    match &settings.db_path {
        Some(path) => SqlitePrizeRepository::open(path),
        None => SqlitePrizeRepository::open_in_memory(),
    }
}

/// Install the tracing subscriber used by both binaries (`RUST_LOG` overrides `info`)
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

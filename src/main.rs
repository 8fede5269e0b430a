use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process::ExitCode;

use prize_intervals::{
    import_from_directory, init_tracing, open_repository, show_prize_intervals, ImportSummary,
    Settings, SqlitePrizeRepository,
};

#[derive(Parser)]
#[command(name = "prize-intervals", version, about = "Producer win intervals from award CSV files")]
struct Cli {
    #[command(flatten)]
    settings: Settings,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Import every CSV file of the source folder
    Import,

    /// Print the min/max producer intervals as JSON
    Intervals {
        /// Read the existing database instead of importing first
        #[arg(long)]
        no_import: bool,
    },
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("❌ {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let mut repo = open_repository(&cli.settings)?;

    match cli.command {
        Command::Import => {
            if !run_import(&mut repo, &cli.settings)? {
                return Ok(ExitCode::FAILURE);
            }
            let counts = repo.verify_counts()?;
            println!(
                "✓ Database contains {} producers, {} studios, {} movies, {} prizes",
                counts.producers, counts.studios, counts.movies, counts.prizes
            );
        }
        Command::Intervals { no_import } => {
            if !no_import && !run_import(&mut repo, &cli.settings)? {
                return Ok(ExitCode::FAILURE);
            }

            let report = show_prize_intervals(&repo, cli.settings.policy);
            if !report.is_ok() {
                eprintln!("❌ {}", report.message);
                return Ok(ExitCode::FAILURE);
            }
            if report.intervals.is_empty() {
                eprintln!("❌ No producer has won more than once");
                return Ok(ExitCode::FAILURE);
            }

            println!("{}", serde_json::to_string_pretty(&report.intervals)?);
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Returns false when the import was rejected (message already printed)
fn run_import(repo: &mut SqlitePrizeRepository, settings: &Settings) -> Result<bool> {
    let config = settings.import_config()?;

    println!("📂 Importing CSV files from {}", settings.csv_dir.display());

    match import_from_directory(repo, &settings.csv_dir, &config) {
        Ok(summary) => {
            print_summary(&summary);
            Ok(true)
        }
        Err(e) => {
            eprintln!("❌ Import failed: {}", e);
            Ok(false)
        }
    }
}

fn print_summary(summary: &ImportSummary) {
    for file in &summary.files {
        println!("   • {}", file.display());
    }
    println!(
        "✓ {} of {} producers data imported to database in {} rows checked.",
        summary.imported_count(),
        summary.producer_row_count,
        summary.row_count
    );
}

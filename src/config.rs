// Configuration - CSV dialect and process settings
//
// Resolution order for every setting: command-line flag, then environment
// variable, then the compiled default.

use anyhow::{bail, Result};
use clap::Args;
use std::path::PathBuf;

use crate::intervals::IntervalPolicy;

pub const DEFAULT_DELIMITER: u8 = b';';
pub const DEFAULT_EXTENSION: &str = "csv";

/// CSV dialect used by the import pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportConfig {
    pub delimiter: u8,
    /// File extension without the dot
    pub extension: String,
}

impl Default for ImportConfig {
    fn default() -> Self {
        ImportConfig {
            delimiter: DEFAULT_DELIMITER,
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct Settings {
    /// Folder scanned for .csv files
    #[arg(long, env = "PRIZE_CSV_DIR", default_value = "data")]
    pub csv_dir: PathBuf,

    /// SQLite database file (in-memory when omitted)
    #[arg(long, env = "PRIZE_DB_PATH")]
    pub db_path: Option<PathBuf>,

    /// Single-character CSV delimiter
    #[arg(long, env = "PRIZE_CSV_DELIMITER", default_value_t = ';')]
    pub delimiter: char,

    /// Address the API server binds to
    #[arg(long, env = "PRIZE_BIND_ADDR", default_value = "0.0.0.0:3000")]
    pub bind: String,

    /// How win intervals are derived per producer
    #[arg(long, env = "PRIZE_INTERVAL_POLICY", value_enum, default_value_t = IntervalPolicy::RollingPair)]
    pub policy: IntervalPolicy,
}

impl Settings {
    pub fn import_config(&self) -> Result<ImportConfig> {
        if !self.delimiter.is_ascii() {
            bail!("Delimiter must be a single ASCII character, got '{}'", self.delimiter);
        }

        Ok(ImportConfig {
            delimiter: self.delimiter as u8,
            ..ImportConfig::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        settings: Settings,
    }

    #[test]
    fn test_defaults() {
        let cli = TestCli::parse_from(["prize-intervals"]);

        assert_eq!(cli.settings.csv_dir, PathBuf::from("data"));
        assert_eq!(cli.settings.db_path, None);
        assert_eq!(cli.settings.policy, IntervalPolicy::RollingPair);
        assert_eq!(cli.settings.import_config().unwrap(), ImportConfig::default());
    }

    #[test]
    fn test_flags_override_defaults() {
        let cli = TestCli::parse_from([
            "prize-intervals",
            "--csv-dir",
            "/tmp/csv",
            "--delimiter",
            ",",
            "--policy",
            "consecutive-wins",
        ]);

        assert_eq!(cli.settings.csv_dir, PathBuf::from("/tmp/csv"));
        assert_eq!(cli.settings.import_config().unwrap().delimiter, b',');
        assert_eq!(cli.settings.policy, IntervalPolicy::ConsecutiveWins);
    }

    #[test]
    fn test_non_ascii_delimiter_rejected() {
        let cli = TestCli::parse_from(["prize-intervals", "--delimiter", "§"]);

        assert!(cli.settings.import_config().is_err());
    }
}

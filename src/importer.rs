// CSV Import Pipeline
//
// Reads every `.csv` file directly under a source directory, reconciles the
// header of each file against the canonical columns, splits multi-producer
// cells and drives the populator once per producer.
//
// An import run is all-or-nothing: any row-level or header failure wipes the
// whole store before the error is returned.

use anyhow::{anyhow, Context as AnyhowContext};
use chrono::{DateTime, Utc};
use csv::{ReaderBuilder, StringRecord};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::ImportConfig;
use crate::populate::{delete_all_data, populate_prize};
use crate::repository::PrizeRepository;

// ============================================================================
// CANONICAL COLUMNS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Year,
    Title,
    Studios,
    Producers,
    Winner,
}

impl Column {
    /// Canonical physical order
    pub const ALL: [Column; 5] = [
        Column::Year,
        Column::Title,
        Column::Studios,
        Column::Producers,
        Column::Winner,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Column::Year => "year",
            Column::Title => "title",
            Column::Studios => "studios",
            Column::Producers => "producers",
            Column::Winner => "winner",
        }
    }

    pub fn from_name(name: &str) -> Option<Column> {
        Column::ALL.iter().copied().find(|c| c.name() == name)
    }

    fn slot(&self) -> usize {
        *self as usize
    }
}

// ============================================================================
// ERRORS & SUMMARY
// ============================================================================

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("no csv file uploaded. folder is empty")]
    EmptySource,

    #[error("not uploaded because '{0}' is an invalid column name. It must be 'year','title','studios','producers' or 'winner'")]
    InvalidColumn(String),

    #[error("It was not possible to read the file {}", .0.display())]
    UnreadableFile(PathBuf),

    /// The populator refused one of the row's producers
    #[error("on row {row}, {message}")]
    RowRejected { row: usize, message: String },

    /// Missing cell, bad year or anything else unexpected while reading a row
    #[error("Unexpected error on row {row}")]
    RowError {
        row: usize,
        #[source]
        source: anyhow::Error,
    },
}

impl ImportError {
    /// Whether the store has to be wiped before this error is reported.
    /// `persisted` is the number of producer rows written so far in the run.
    pub fn requires_wipe(&self, persisted: usize) -> bool {
        match self {
            ImportError::EmptySource => false,
            ImportError::UnreadableFile(_) => persisted > 0,
            ImportError::InvalidColumn(_)
            | ImportError::RowRejected { .. }
            | ImportError::RowError { .. } => true,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportSummary {
    pub failed_count: usize,
    /// Every split producer of every data row of every file
    pub producer_row_count: usize,
    /// Data rows visited (headers excluded)
    pub row_count: usize,
    pub files: Vec<PathBuf>,
    pub finished_at: DateTime<Utc>,
}

impl ImportSummary {
    pub fn imported_count(&self) -> usize {
        self.producer_row_count - self.failed_count
    }
}

/// Counters threaded through one import run
#[derive(Debug, Default)]
struct ImportRun {
    /// Physical rows touched so far across all files, headers included
    line: usize,
    rows: usize,
    producer_rows: usize,
    persisted: usize,
    failed: usize,
}

// ============================================================================
// HEADER RECONCILIATION
// ============================================================================

/// Physical position of every canonical column in one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    positions: [Option<usize>; 5],
}

impl ColumnMap {
    /// Header in canonical order, every column where it is expected
    pub fn identity() -> Self {
        ColumnMap {
            positions: [Some(0), Some(1), Some(2), Some(3), Some(4)],
        }
    }

    /// Build the map from a file's first row.
    ///
    /// Position `i` is expected to hold the canonical name `Column::ALL[i]`.
    /// Any other canonical name found there is taken as a moved column. A
    /// value that is not a canonical name fails the import; a missing cell is
    /// reported as `None`. Cells past the fifth position are ignored.
    pub fn reconcile(header: &StringRecord) -> Result<Self, ImportError> {
        let mut positions = [None; 5];

        for (position, expected) in Column::ALL.iter().enumerate() {
            let claimed = match header.get(position) {
                Some(value) if value == expected.name() => *expected,
                Some(value) => Column::from_name(value)
                    .ok_or_else(|| ImportError::InvalidColumn(value.to_string()))?,
                None => return Err(ImportError::InvalidColumn("None".to_string())),
            };
            positions[claimed.slot()] = Some(position);
        }

        Ok(ColumnMap { positions })
    }

    pub fn position(&self, column: Column) -> Option<usize> {
        self.positions[column.slot()]
    }

    pub fn get<'r>(&self, record: &'r StringRecord, column: Column) -> Option<&'r str> {
        self.position(column).and_then(|position| record.get(position))
    }
}

// ============================================================================
// ROW PARSING
// ============================================================================

/// Trimmed cells of one data row
#[derive(Debug, Clone, PartialEq)]
struct RowCells<'r> {
    year: i32,
    title: &'r str,
    studios: &'r str,
    producers: &'r str,
    winner: &'r str,
}

impl<'r> RowCells<'r> {
    fn extract(columns: &ColumnMap, record: &'r StringRecord) -> anyhow::Result<Self> {
        let cell = |column: Column| -> anyhow::Result<&'r str> {
            columns
                .get(record, column)
                .map(str::trim)
                .ok_or_else(|| anyhow!("missing '{}' cell", column.name()))
        };

        let raw_year = cell(Column::Year)?;
        let year = raw_year
            .parse::<i32>()
            .with_context(|| format!("year '{}' is not an integer", raw_year))?;

        Ok(RowCells {
            year,
            title: cell(Column::Title)?,
            studios: cell(Column::Studios)?,
            producers: cell(Column::Producers)?,
            winner: cell(Column::Winner)?,
        })
    }
}

/// Split a producers cell on `,` and ` and `, trimming every name.
/// Empty names are kept so the populator can reject them.
pub fn split_producers(cell: &str) -> Vec<String> {
    cell.trim()
        .replace(" and ", ",")
        .split(',')
        .map(|name| name.trim().to_string())
        .collect()
}

// ============================================================================
// PIPELINE
// ============================================================================

/// Files with `extension` directly under `dir`, sorted by path.
/// Directories and hidden files are skipped; an unreadable directory lists
/// as empty.
pub fn list_source_files(dir: &Path, extension: &str) -> Vec<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "cannot list source directory");
            return Vec::new();
        }
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            let hidden = path
                .file_name()
                .and_then(|n| n.to_str())
                .map_or(true, |n| n.starts_with('.'));
            !hidden && path.extension().and_then(|e| e.to_str()) == Some(extension)
        })
        .collect();

    files.sort();
    files
}

/// Import every CSV file under `source` into `repo`.
///
/// On failure the store is wiped (see `ImportError::requires_wipe`) and the
/// error carries the message to show the user.
pub fn import_from_directory<R: PrizeRepository + ?Sized>(
    repo: &mut R,
    source: &Path,
    config: &ImportConfig,
) -> Result<ImportSummary, ImportError> {
    let files = list_source_files(source, &config.extension);
    if files.is_empty() {
        return Err(ImportError::EmptySource);
    }

    info!(dir = %source.display(), files = files.len(), "importing csv files");

    let mut run = ImportRun::default();

    for path in &files {
        if let Err(error) = import_file(repo, path, config, &mut run) {
            if error.requires_wipe(run.persisted) {
                let wipe = delete_all_data(repo);
                warn!(
                    failed = run.failed,
                    wipe_status = wipe.status.as_str(),
                    "import aborted, stored data wiped"
                );
            }
            warn!(file = %path.display(), error = %error, "import failed");
            return Err(error);
        }
    }

    let summary = ImportSummary {
        failed_count: run.failed,
        producer_row_count: run.producer_rows,
        row_count: run.rows,
        files,
        finished_at: Utc::now(),
    };

    info!(
        rows = summary.row_count,
        producers = summary.producer_row_count,
        "import finished"
    );

    Ok(summary)
}

fn import_file<R: PrizeRepository + ?Sized>(
    repo: &mut R,
    path: &Path,
    config: &ImportConfig,
    run: &mut ImportRun,
) -> Result<(), ImportError> {
    let unreadable = || ImportError::UnreadableFile(path.to_path_buf());

    let mut reader = ReaderBuilder::new()
        .delimiter(config.delimiter)
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|_| unreadable())?;

    let mut columns: Option<ColumnMap> = None;

    for result in reader.records() {
        let record = result.map_err(|e| {
            debug!(file = %path.display(), error = %e, "csv read failed");
            unreadable()
        })?;
        run.line += 1;

        match &columns {
            None => columns = Some(ColumnMap::reconcile(&record)?),
            Some(map) => {
                run.rows += 1;
                import_row(repo, map, &record, run)?;
            }
        }
    }

    Ok(())
}

fn import_row<R: PrizeRepository + ?Sized>(
    repo: &mut R,
    columns: &ColumnMap,
    record: &StringRecord,
    run: &mut ImportRun,
) -> Result<(), ImportError> {
    let row = run.line;

    let cells = match RowCells::extract(columns, record) {
        Ok(cells) => cells,
        Err(source) => {
            run.failed += 1;
            return Err(ImportError::RowError { row, source });
        }
    };

    for producer in split_producers(cells.producers) {
        run.producer_rows += 1;

        let outcome = populate_prize(
            repo,
            &producer,
            cells.title,
            cells.studios,
            cells.year,
            cells.winner,
        );

        if !outcome.is_ok() {
            run.failed += 1;
            return Err(ImportError::RowRejected {
                row,
                message: outcome.message,
            });
        }

        run.persisted += 1;
        debug!(row, producer = %producer, year = cells.year, "row stored");
    }

    Ok(())
}

// SQLite Prize Repository - durable Storage Port adapter
//
// Schema:
//   producers(name UNIQUE)
//   studios(name UNIQUE)
//   movies(name, producer_id, studio_id) UNIQUE together
//   prizes(idempotency_hash UNIQUE) where hash = sha256(year, movie_id, winner)
//
// Every `create` runs in its own transaction so a failure half-way through a
// row never leaves a dangling producer or studio behind.

use anyhow::{Context, Result};
use rusqlite::{params, Connection, Transaction};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::Path;
use tracing::debug;

use crate::repository::{MovieInput, PrizeRecord, PrizeRepository};

/// Row counts per table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StoreCounts {
    pub producers: i64,
    pub studios: i64,
    pub movies: i64,
    pub prizes: i64,
}

impl StoreCounts {
    pub fn is_empty(&self) -> bool {
        self.producers == 0 && self.studios == 0 && self.movies == 0 && self.prizes == 0
    }
}

pub struct SqlitePrizeRepository {
    conn: Connection,
}

impl SqlitePrizeRepository {
    /// Open (or create) a database file and make sure the schema exists
    pub fn open(db_path: &Path) -> Result<Self> {
        let conn = Connection::open(db_path)
            .with_context(|| format!("Failed to open database: {}", db_path.display()))?;
        Self::from_connection(conn)
    }

    /// Fresh private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::from_connection(conn)
    }

    pub fn from_connection(conn: Connection) -> Result<Self> {
        setup_database(&conn)?;
        Ok(SqlitePrizeRepository { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn verify_counts(&self) -> Result<StoreCounts> {
        let count = |table: &str| -> Result<i64> {
            let sql = format!("SELECT COUNT(*) FROM {}", table);
            Ok(self.conn.query_row(&sql, [], |row| row.get(0))?)
        };

        Ok(StoreCounts {
            producers: count("producers")?,
            studios: count("studios")?,
            movies: count("movies")?,
            prizes: count("prizes")?,
        })
    }
}

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;

    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS producers (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            uuid TEXT NOT NULL,
            name TEXT UNIQUE NOT NULL
        );

        CREATE TABLE IF NOT EXISTS studios (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            uuid TEXT NOT NULL,
            name TEXT UNIQUE NOT NULL
        );

        CREATE TABLE IF NOT EXISTS movies (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            uuid TEXT NOT NULL,
            name TEXT NOT NULL,
            producer_id INTEGER NOT NULL REFERENCES producers(id) ON DELETE CASCADE,
            studio_id INTEGER NOT NULL REFERENCES studios(id) ON DELETE CASCADE,
            UNIQUE (name, producer_id, studio_id)
        );

        CREATE TABLE IF NOT EXISTS prizes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            idempotency_hash TEXT UNIQUE NOT NULL,
            year INTEGER NOT NULL,
            movie_id INTEGER NOT NULL REFERENCES movies(id) ON DELETE CASCADE,
            winner INTEGER NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );

        CREATE INDEX IF NOT EXISTS idx_prizes_winner ON prizes(winner);",
    )
    .context("Failed to create schema")?;

    Ok(())
}

/// Deduplication key for a prize row. Not an identity.
pub fn compute_idempotency_hash(year: i32, movie_id: i64, winner: bool) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{}|{}|{}", year, movie_id, winner));
    format!("{:x}", hasher.finalize())
}

fn get_or_create_named(tx: &Transaction, table: &str, name: &str) -> Result<i64> {
    tx.execute(
        &format!("INSERT OR IGNORE INTO {} (uuid, name) VALUES (?1, ?2)", table),
        params![uuid::Uuid::new_v4().to_string(), name],
    )?;

    let id = tx.query_row(
        &format!("SELECT id FROM {} WHERE name = ?1", table),
        params![name],
        |row| row.get(0),
    )?;

    Ok(id)
}

impl PrizeRepository for SqlitePrizeRepository {
    fn create(&mut self, year: i32, movie: &MovieInput, winner: bool) -> Result<()> {
        let tx = self.conn.transaction()?;

        let producer_id = get_or_create_named(&tx, "producers", &movie.producer_name)
            .with_context(|| format!("Failed to store producer '{}'", movie.producer_name))?;
        let studio_id = get_or_create_named(&tx, "studios", &movie.studio_name)
            .with_context(|| format!("Failed to store studio '{}'", movie.studio_name))?;

        tx.execute(
            "INSERT OR IGNORE INTO movies (uuid, name, producer_id, studio_id)
             VALUES (?1, ?2, ?3, ?4)",
            params![movie.id, movie.name, producer_id, studio_id],
        )?;
        let movie_id: i64 = tx
            .query_row(
                "SELECT id FROM movies WHERE name = ?1 AND producer_id = ?2 AND studio_id = ?3",
                params![movie.name, producer_id, studio_id],
                |row| row.get(0),
            )
            .with_context(|| format!("Failed to store movie '{}'", movie.name))?;

        let hash = compute_idempotency_hash(year, movie_id, winner);
        let inserted = tx.execute(
            "INSERT OR IGNORE INTO prizes (idempotency_hash, year, movie_id, winner)
             VALUES (?1, ?2, ?3, ?4)",
            params![hash, year, movie_id, winner],
        )?;

        tx.commit()?;

        if inserted == 0 {
            debug!(year, movie = %movie.name, "prize already stored");
        }

        Ok(())
    }

    fn all_winners(&self) -> Result<Vec<PrizeRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT p.id, p.year, m.name, pr.name, s.name, p.winner
             FROM prizes p
             JOIN movies m ON m.id = p.movie_id
             JOIN producers pr ON pr.id = m.producer_id
             JOIN studios s ON s.id = m.studio_id
             WHERE p.winner = 1
             ORDER BY p.id",
        )?;

        let winners = stmt
            .query_map([], |row| {
                Ok(PrizeRecord {
                    id: row.get(0)?,
                    year: row.get(1)?,
                    movie_name: row.get(2)?,
                    producer_name: row.get(3)?,
                    studio_name: row.get(4)?,
                    winner: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(winners)
    }

    fn delete_all(&mut self) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute_batch(
            "DELETE FROM prizes;
             DELETE FROM movies;
             DELETE FROM studios;
             DELETE FROM producers;",
        )?;
        tx.commit()?;
        Ok(())
    }
}

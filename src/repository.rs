// Prize Repository - Storage Port
//
// The import pipeline, the populator and the interval aggregator only ever
// talk to `PrizeRepository`. Two adapters exist:
// - `InMemoryPrizeRepository` (this module) for tests and throwaway runs
// - `SqlitePrizeRepository` (db.rs) for the durable store

use anyhow::Result;
use serde::{Deserialize, Serialize};

// ============================================================================
// DTOs
// ============================================================================

/// Movie handed to the repository, decoupled from the entity types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieInput {
    pub id: String,
    pub name: String,
    pub producer_name: String,
    pub studio_name: String,
}

/// Prize row read back from the repository
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrizeRecord {
    pub id: i64,
    pub year: i32,
    pub movie_name: String,
    pub producer_name: String,
    pub studio_name: String,
    pub winner: bool,
}

// ============================================================================
// STORAGE PORT
// ============================================================================

pub trait PrizeRepository {
    /// Get-or-create the producer (by name), the studio (by name), the movie
    /// (by name + producer + studio) and the prize (by year + movie + winner).
    /// Repeating an identical call never creates duplicates.
    fn create(&mut self, year: i32, movie: &MovieInput, winner: bool) -> Result<()>;

    /// Every prize with `winner == true`, in insertion order
    fn all_winners(&self) -> Result<Vec<PrizeRecord>>;

    /// Remove every persisted record of every entity kind
    fn delete_all(&mut self) -> Result<()>;
}

// ============================================================================
// IN-MEMORY ADAPTER
// ============================================================================

#[derive(Debug, Clone)]
struct StoredMovie {
    uuid: String,
    name: String,
    producer: usize,
    studio: usize,
}

#[derive(Debug, Clone)]
struct StoredPrize {
    year: i32,
    movie: usize,
    winner: bool,
}

/// Vec-backed repository; row ids are positions + 1
#[derive(Debug, Default, Clone)]
pub struct InMemoryPrizeRepository {
    producers: Vec<String>,
    studios: Vec<String>,
    movies: Vec<StoredMovie>,
    prizes: Vec<StoredPrize>,
}

impl InMemoryPrizeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn producer_count(&self) -> usize {
        self.producers.len()
    }

    pub fn studio_count(&self) -> usize {
        self.studios.len()
    }

    pub fn movie_count(&self) -> usize {
        self.movies.len()
    }

    pub fn prize_count(&self) -> usize {
        self.prizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.producers.is_empty()
            && self.studios.is_empty()
            && self.movies.is_empty()
            && self.prizes.is_empty()
    }

    /// UUID the movie was first stored with (None if unknown)
    pub fn movie_uuid(&self, name: &str) -> Option<&str> {
        self.movies
            .iter()
            .find(|m| m.name == name)
            .map(|m| m.uuid.as_str())
    }

    fn get_or_create_name(names: &mut Vec<String>, name: &str) -> usize {
        match names.iter().position(|n| n == name) {
            Some(index) => index,
            None => {
                names.push(name.to_string());
                names.len() - 1
            }
        }
    }
}

impl PrizeRepository for InMemoryPrizeRepository {
    fn create(&mut self, year: i32, movie: &MovieInput, winner: bool) -> Result<()> {
        let producer = Self::get_or_create_name(&mut self.producers, &movie.producer_name);
        let studio = Self::get_or_create_name(&mut self.studios, &movie.studio_name);

        let movie_index = match self
            .movies
            .iter()
            .position(|m| m.name == movie.name && m.producer == producer && m.studio == studio)
        {
            Some(index) => index,
            None => {
                self.movies.push(StoredMovie {
                    uuid: movie.id.clone(),
                    name: movie.name.clone(),
                    producer,
                    studio,
                });
                self.movies.len() - 1
            }
        };

        let exists = self
            .prizes
            .iter()
            .any(|p| p.year == year && p.movie == movie_index && p.winner == winner);

        if !exists {
            self.prizes.push(StoredPrize {
                year,
                movie: movie_index,
                winner,
            });
        }

        Ok(())
    }

    fn all_winners(&self) -> Result<Vec<PrizeRecord>> {
        let winners = self
            .prizes
            .iter()
            .enumerate()
            .filter(|(_, prize)| prize.winner)
            .map(|(index, prize)| {
                let movie = &self.movies[prize.movie];
                PrizeRecord {
                    id: index as i64 + 1,
                    year: prize.year,
                    movie_name: movie.name.clone(),
                    producer_name: self.producers[movie.producer].clone(),
                    studio_name: self.studios[movie.studio].clone(),
                    winner: prize.winner,
                }
            })
            .collect();

        Ok(winners)
    }

    fn delete_all(&mut self) -> Result<()> {
        self.producers.clear();
        self.studios.clear();
        self.movies.clear();
        self.prizes.clear();
        Ok(())
    }
}

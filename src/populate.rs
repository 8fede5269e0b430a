// Record Populator - validate and persist one (producer, movie, studio, prize)
//
// Never returns Err: every outcome, including storage faults, is reported as
// a `PopulationOutcome` the import pipeline can escalate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::entities::{invalid_kinds, Entity, Movie, Prize, Producer, Studios};
use crate::repository::{MovieInput, PrizeRepository};

pub const WINNER_TOKEN: &str = "yes";
pub const INVALID_WINNER_MESSAGE: &str =
    "Object not Created winner field is invalid. Must be 'yes' or ''";

// ============================================================================
// OUTCOMES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PopulationStatus {
    Ok,
    Failed,
    Error,
}

impl PopulationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PopulationStatus::Ok => "OK",
            PopulationStatus::Failed => "FAILED",
            PopulationStatus::Error => "ERROR",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationOutcome {
    pub status: PopulationStatus,
    pub message: String,
    /// Extra details; currently the invalid entity kinds on FAILED
    pub data: serde_json::Value,
}

impl PopulationOutcome {
    pub fn ok() -> Self {
        PopulationOutcome {
            status: PopulationStatus::Ok,
            message: "Object created".to_string(),
            data: serde_json::json!({}),
        }
    }

    pub fn failed(message: String, data: serde_json::Value) -> Self {
        PopulationOutcome {
            status: PopulationStatus::Failed,
            message,
            data,
        }
    }

    pub fn error(cause: &anyhow::Error) -> Self {
        PopulationOutcome {
            status: PopulationStatus::Error,
            message: format!("Unexpected error while populating prize data - {:#}", cause),
            data: serde_json::json!({}),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == PopulationStatus::Ok
    }
}

// ============================================================================
// POPULATE
// ============================================================================

/// Validate and persist one producer's prize.
///
/// `winner` must be exactly `"yes"` or `""`; anything else is rejected before
/// any entity is built. Invalid entities are reported by kind, in the order
/// Producer, Studios, Movie, Prize.
pub fn populate_prize<R: PrizeRepository + ?Sized>(
    repo: &mut R,
    producer_name: &str,
    movie_name: &str,
    studio_name: &str,
    year: i32,
    winner: &str,
) -> PopulationOutcome {
    let winner = match winner {
        WINNER_TOKEN => true,
        "" => false,
        other => {
            debug!(token = other, "rejected winner token");
            return PopulationOutcome::failed(
                INVALID_WINNER_MESSAGE.to_string(),
                serde_json::json!({ "winner": other }),
            );
        }
    };

    let producer = Producer::new(producer_name);
    let studios = Studios::new(studio_name);
    let movie = Movie::new(movie_name, &producer, &studios);
    let prize = Prize::new(year, winner, &producer);

    let entities: [&dyn Entity; 4] = [&producer, &studios, &movie, &prize];
    let invalid = invalid_kinds(&entities);
    if !invalid.is_empty() {
        return PopulationOutcome::failed(
            format!("Object not Created the fields {} are invalid", invalid.join(",")),
            serde_json::json!({ "invalid": invalid }),
        );
    }

    let input = MovieInput {
        id: movie.id.clone(),
        name: movie.name.clone(),
        producer_name: movie.producer.name.clone(),
        studio_name: movie.studios.name.clone(),
    };

    match repo.create(prize.year, &input, prize.winner) {
        Ok(()) => PopulationOutcome::ok(),
        Err(e) => {
            warn!(error = %e, movie = movie_name, "repository rejected prize");
            PopulationOutcome::error(&e)
        }
    }
}

// ============================================================================
// WIPE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WipeOutcome {
    pub status: PopulationStatus,
    pub message: String,
    pub ts: DateTime<Utc>,
}

/// Remove every stored record. Reports instead of failing.
pub fn delete_all_data<R: PrizeRepository + ?Sized>(repo: &mut R) -> WipeOutcome {
    let (status, message) = match repo.delete_all() {
        Ok(()) => (PopulationStatus::Ok, "Everything was deleted".to_string()),
        Err(e) => {
            warn!(error = %e, "failed to delete stored data");
            (
                PopulationStatus::Error,
                "Unexpected error has occurred when requested to delete all data.".to_string(),
            )
        }
    };

    WipeOutcome {
        status,
        message,
        ts: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{InMemoryPrizeRepository, PrizeRecord};
    use anyhow::{anyhow, Result};

    /// Repository whose writes always fail
    struct BrokenRepository;

    impl PrizeRepository for BrokenRepository {
        fn create(&mut self, _year: i32, _movie: &MovieInput, _winner: bool) -> Result<()> {
            Err(anyhow!("disk full"))
        }

        fn all_winners(&self) -> Result<Vec<PrizeRecord>> {
            Err(anyhow!("disk full"))
        }

        fn delete_all(&mut self) -> Result<()> {
            Err(anyhow!("disk full"))
        }
    }

    #[test]
    fn test_valid_winner_is_stored() {
        let mut repo = InMemoryPrizeRepository::new();

        let outcome = populate_prize(&mut repo, "Bo Derek", "Bolero", "Cannon Films", 1984, "yes");

        assert!(outcome.is_ok());
        assert_eq!(outcome.message, "Object created");
        assert_eq!(repo.all_winners().unwrap().len(), 1);
    }

    #[test]
    fn test_empty_token_stores_non_winner() {
        let mut repo = InMemoryPrizeRepository::new();

        let outcome = populate_prize(&mut repo, "Allan Carr", "Grease 2", "Paramount", 1982, "");

        assert!(outcome.is_ok());
        assert_eq!(repo.prize_count(), 1);
        assert!(repo.all_winners().unwrap().is_empty());
    }

    #[test]
    fn test_invalid_winner_token_builds_nothing() {
        let mut repo = InMemoryPrizeRepository::new();

        let outcome = populate_prize(&mut repo, "Bo Derek", "Bolero", "Cannon Films", 1984, "maybe");

        assert_eq!(outcome.status, PopulationStatus::Failed);
        assert_eq!(outcome.message, INVALID_WINNER_MESSAGE);
        assert!(repo.is_empty());
    }

    #[test]
    fn test_winner_token_is_case_sensitive() {
        let mut repo = InMemoryPrizeRepository::new();

        let outcome = populate_prize(&mut repo, "Bo Derek", "Bolero", "Cannon Films", 1984, "Yes");

        assert_eq!(outcome.status, PopulationStatus::Failed);
    }

    #[test]
    fn test_invalid_entities_are_listed_in_order() {
        let mut repo = InMemoryPrizeRepository::new();

        let outcome = populate_prize(&mut repo, "", "Bolero", "", 1850, "yes");

        assert_eq!(outcome.status, PopulationStatus::Failed);
        assert_eq!(
            outcome.message,
            "Object not Created the fields Producer,Studios,Prize are invalid"
        );
        assert!(repo.is_empty());
    }

    #[test]
    fn test_only_studio_invalid() {
        let mut repo = InMemoryPrizeRepository::new();

        let outcome = populate_prize(&mut repo, "Bo Derek", "Bolero", "", 1984, "yes");

        assert_eq!(
            outcome.message,
            "Object not Created the fields Studios are invalid"
        );
    }

    #[test]
    fn test_storage_fault_becomes_error_outcome() {
        let mut repo = BrokenRepository;

        let outcome = populate_prize(&mut repo, "Bo Derek", "Bolero", "Cannon Films", 1984, "yes");

        assert_eq!(outcome.status, PopulationStatus::Error);
        assert!(outcome.message.contains("disk full"));
    }

    #[test]
    fn test_delete_all_data_reports_status() {
        let mut repo = InMemoryPrizeRepository::new();
        populate_prize(&mut repo, "Bo Derek", "Bolero", "Cannon Films", 1984, "yes");

        let outcome = delete_all_data(&mut repo);
        assert_eq!(outcome.status, PopulationStatus::Ok);
        assert!(repo.is_empty());

        let outcome = delete_all_data(&mut BrokenRepository);
        assert_eq!(outcome.status, PopulationStatus::Error);
    }
}

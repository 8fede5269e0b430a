// Prize Entity - a (year, movie, producer, winner) fact

use serde::{Deserialize, Serialize};

use super::{new_id, Entity, Producer};

/// Years outside (FIRST_YEAR, LAST_YEAR) are rejected
pub const FIRST_YEAR: i32 = 1900;
pub const LAST_YEAR: i32 = 2099;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prize {
    pub id: String,
    pub year: i32,
    pub winner: bool,
    pub producer: Producer,
}

impl Prize {
    pub fn new(year: i32, winner: bool, producer: &Producer) -> Self {
        Prize {
            id: new_id(),
            year,
            winner,
            producer: producer.clone(),
        }
    }
}

impl Entity for Prize {
    fn kind(&self) -> &'static str {
        "Prize"
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn is_valid(&self) -> bool {
        !self.id.is_empty() && self.year > FIRST_YEAR && self.year < LAST_YEAR
    }
}

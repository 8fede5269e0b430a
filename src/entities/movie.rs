// Movie Entity - references exactly one Producer and one Studios

use serde::{Deserialize, Serialize};

use super::{new_id, Entity, Producer, Studios};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: String,
    pub name: String,
    pub producer: Producer,
    pub studios: Studios,
}

impl Movie {
    pub fn new(name: &str, producer: &Producer, studios: &Studios) -> Self {
        Movie {
            id: new_id(),
            name: name.to_string(),
            producer: producer.clone(),
            studios: studios.clone(),
        }
    }
}

impl Entity for Movie {
    fn kind(&self) -> &'static str {
        "Movie"
    }

    fn id(&self) -> &str {
        &self.id
    }

    /// Only the movie's own fields are checked here. Producer and Studios
    /// report their own invalidity.
    fn is_valid(&self) -> bool {
        !self.id.is_empty() && !self.name.is_empty()
    }
}

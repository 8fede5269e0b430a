// Producer Entity - primary aggregation key for prize intervals

use serde::{Deserialize, Serialize};

use super::{new_id, Entity};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Producer {
    /// Stable identity (UUID)
    pub id: String,

    /// Producer name as written in the CSV (exact match, no normalization)
    pub name: String,
}

impl Producer {
    pub fn new(name: &str) -> Self {
        Producer {
            id: new_id(),
            name: name.to_string(),
        }
    }
}

impl Entity for Producer {
    fn kind(&self) -> &'static str {
        "Producer"
    }

    fn id(&self) -> &str {
        &self.id
    }

    /// A producer must have a non-empty name
    fn is_valid(&self) -> bool {
        !self.id.is_empty() && !self.name.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_producer_gets_identity() {
        let a = Producer::new("Bo Derek");
        let b = Producer::new("Bo Derek");

        assert!(a.is_valid());
        assert_ne!(a.id, b.id, "Each construction assigns its own identity");
    }

    #[test]
    fn test_empty_name_is_invalid() {
        assert!(!Producer::new("").is_valid());
    }
}

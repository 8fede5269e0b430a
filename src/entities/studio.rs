// Studios Entity

use serde::{Deserialize, Serialize};

use super::{new_id, Entity};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Studios {
    pub id: String,
    pub name: String,
}

impl Studios {
    pub fn new(name: &str) -> Self {
        Studios {
            id: new_id(),
            name: name.to_string(),
        }
    }
}

impl Entity for Studios {
    fn kind(&self) -> &'static str {
        "Studios"
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn is_valid(&self) -> bool {
        !self.id.is_empty() && !self.name.is_empty()
    }
}

// Entity Models - Producer, Studios, Movie, Prize
//
// Each entity has:
// - Stable identity (UUID) assigned at construction
// - A validity predicate checked before anything reaches the repository
//
// Entities are transient: they are built per ingested row, validated and then
// handed to the repository as DTOs. The repository owns durable identity.

pub mod producer;
pub mod studio;
pub mod movie;
pub mod prize;

pub use producer::Producer;
pub use studio::Studios;
pub use movie::Movie;
pub use prize::Prize;

/// Common behavior of every domain entity
pub trait Entity {
    /// Kind name reported when the entity fails validation
    fn kind(&self) -> &'static str;

    /// Stable identity (UUID string)
    fn id(&self) -> &str;

    fn is_valid(&self) -> bool;
}

/// Fresh identity for a newly constructed entity
pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Kinds of the entities in `entities` that fail validation, in the given order.
/// Each kind appears at most once.
pub fn invalid_kinds(entities: &[&dyn Entity]) -> Vec<&'static str> {
    let mut kinds: Vec<&'static str> = Vec::new();

    for entity in entities {
        if !entity.is_valid() && !kinds.contains(&entity.kind()) {
            kinds.push(entity.kind());
        }
    }

    kinds
}

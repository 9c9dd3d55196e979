//! Entity objects - identity, object grammar, mechanisms and properties

mod entity;
mod entity_type;
mod error;
mod mechanism;
pub mod properties;
mod remembered;

pub use entity::{
    get_entity_for_id, matches, value_of, DespawnedEntity, EntityState, EntityTag, TagValue,
    PROPERTY_ESCAPE, SCRIPT_ID_KEY,
};
pub use entity_type::{
    parse_health_data, seed_early_mechanisms, Constructor, EntityType, EntityTypeRegistry,
    SpawnContext, EARLY_VALID_MECHANISMS, RANDOM_EXCLUDED,
};
pub use error::EntityError;
pub use mechanism::Mechanism;
pub use properties::{EntityProperty, PropertyRegistry};
pub use remembered::RememberedEntities;

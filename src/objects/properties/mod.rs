//! Property extension registry
//!
//! A property is a named attribute with a read path and a write path that
//! applies to some entities and not others. Reads and writes pick the first
//! registered property whose id matches and whose predicate accepts the
//! entity. Ids are unique, which is checked when a property is registered.

mod age;
mod custom_name;
mod health;
mod potion_type;
mod variant;

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{info, warn};

use super::{EntityError, EntityTag, Mechanism};
use crate::host::NativeEntity;
use crate::Denizen;

pub use age::EntityAge;
pub use custom_name::EntityCustomName;
pub use health::{EntityHealth, EntityHealthData, EntityMaxHealth};
pub use potion_type::EntityPotionType;
pub use variant::EntityVariant;

/// A named attribute of an entity
pub trait EntityProperty: Send + Sync {
    /// Attribute and mechanism name
    fn id(&self) -> &'static str;

    /// Whether the property applies to this entity
    fn describes(&self, entity: &EntityTag, denizen: &Denizen) -> bool;

    /// Current value, `None` when the entity has no value for it
    fn get(&self, entity: &EntityTag, denizen: &Denizen) -> Option<String>;

    /// Apply a mechanism. Only called after `describes` accepted the entity.
    fn set(&self, entity: &EntityTag, denizen: &Denizen, mechanism: &Mechanism) -> Result<(), EntityError>;

    /// Whether the mechanism may be given without a value to clear the property
    fn nullable(&self) -> bool {
        false
    }
}

/// Registered properties in registration order
#[derive(Default)]
pub struct PropertyRegistry {
    properties: RwLock<Vec<Arc<dyn EntityProperty>>>,
}

impl std::fmt::Debug for PropertyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyRegistry")
            .field("ids", &self.ids())
            .finish()
    }
}

impl PropertyRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every shipped property
    pub fn with_defaults() -> Self {
        let registry = Self::new();
        let defaults: Vec<Arc<dyn EntityProperty>> = vec![
            Arc::new(EntityCustomName),
            Arc::new(EntityHealth),
            Arc::new(EntityMaxHealth),
            Arc::new(EntityHealthData),
            Arc::new(EntityAge),
            Arc::new(EntityVariant),
            Arc::new(EntityPotionType),
        ];
        for property in defaults {
            if let Err(e) = registry.register(property) {
                warn!("{}", e);
            }
        }
        registry
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::with_defaults())
    }

    pub fn register(&self, property: Arc<dyn EntityProperty>) -> Result<(), EntityError> {
        let mut properties = self.properties.write();
        if properties.iter().any(|p| p.id() == property.id()) {
            return Err(EntityError::InvalidOperation(format!(
                "property '{}' is already registered",
                property.id()
            )));
        }
        info!("Registered entity property {}", property.id());
        properties.push(property);
        Ok(())
    }

    pub fn ids(&self) -> Vec<&'static str> {
        self.properties.read().iter().map(|p| p.id()).collect()
    }

    /// Whether any property uses this id
    pub fn has(&self, id: &str) -> bool {
        self.properties.read().iter().any(|p| p.id().eq_ignore_ascii_case(id))
    }

    /// First property with this id that applies to the entity
    pub fn find(&self, id: &str, entity: &EntityTag, denizen: &Denizen) -> Option<Arc<dyn EntityProperty>> {
        let candidates: Vec<Arc<dyn EntityProperty>> = self
            .properties
            .read()
            .iter()
            .filter(|p| p.id().eq_ignore_ascii_case(id))
            .cloned()
            .collect();
        candidates.into_iter().find(|p| p.describes(entity, denizen))
    }

    /// Every property that applies to the entity, in registration order
    pub fn applicable(&self, entity: &EntityTag, denizen: &Denizen) -> Vec<Arc<dyn EntityProperty>> {
        let all: Vec<Arc<dyn EntityProperty>> = self.properties.read().clone();
        all.into_iter().filter(|p| p.describes(entity, denizen)).collect()
    }
}

/// Run a read against the live native instance
pub(crate) fn read_native<T>(entity: &EntityTag, f: impl FnOnce(&NativeEntity) -> Option<T>) -> Option<T> {
    let handle = entity.entity()?;
    let guard = handle.read();
    f(&guard)
}

/// Run a write against the live native instance
pub(crate) fn write_native<T>(
    entity: &EntityTag,
    mechanism: &Mechanism,
    f: impl FnOnce(&mut NativeEntity) -> Result<T, EntityError>,
) -> Result<T, EntityError> {
    let handle = entity
        .entity()
        .ok_or_else(|| EntityError::invalid_mechanism(&mechanism.name, "entity is not spawned"))?;
    let mut guard = handle.write();
    f(&mut guard)
}

/// Render a number without a trailing `.0` for whole values
pub(crate) fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Strip a `minecraft:` namespace and lowercase
pub(crate) fn enum_key(value: &str) -> String {
    let value = value.trim().to_lowercase();
    match value.strip_prefix("minecraft:") {
        Some(rest) => rest.to_string(),
        None => value,
    }
}

//! Entity scripts - named templates for generic entities
//!
//! A script names an entity type and an ordered list of mechanisms. Parsing
//! `e@<script name>` produces a generic entity of that type with the
//! mechanisms queued; spawning it binds the script name to the native entity.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info};

use crate::objects::{EntityTag, EntityTypeRegistry, Mechanism};
use crate::Denizen;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("entity script '{0}' is already registered")]
    Duplicate(String),

    #[error("entity script '{script}' has unknown entity type '{entity_type}'")]
    UnknownType { script: String, entity_type: String },

    #[error("invalid entity script name '{0}'")]
    InvalidName(String),
}

/// An entity script definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityScriptContainer {
    pub name: String,
    /// `<type>[,data1[,data2]]`, optionally prefixed `e@`
    #[serde(rename = "type")]
    pub entity_type: String,
    /// Ordered `name=value` mechanism strings
    #[serde(default)]
    pub mechanisms: Vec<String>,
}

impl EntityScriptContainer {
    pub fn new(name: &str, entity_type: &str) -> Self {
        Self {
            name: name.to_string(),
            entity_type: entity_type.to_string(),
            mechanisms: Vec::new(),
        }
    }

    pub fn with_mechanism(mut self, mechanism: &str) -> Self {
        self.mechanisms.push(mechanism.to_string());
        self
    }

    /// Type name and constructor data
    fn type_parts(&self) -> (String, Option<&str>, Option<&str>) {
        let raw = self.entity_type.trim();
        let raw = match raw.get(..2) {
            Some(prefix) if prefix.eq_ignore_ascii_case("e@") => &raw[2..],
            _ => raw,
        };
        let mut parts = raw.splitn(3, ',').map(str::trim);
        let name = parts.next().unwrap_or_default().to_lowercase();
        (name, parts.next(), parts.next())
    }
}

/// Registered entity scripts, keyed by lowercase name
#[derive(Debug, Default)]
pub struct ScriptRegistry {
    scripts: RwLock<BTreeMap<String, EntityScriptContainer>>,
}

impl ScriptRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Build a registry from script definitions, checking every type exists
    pub fn from_containers(
        containers: &[EntityScriptContainer],
        types: &EntityTypeRegistry,
    ) -> Result<Self, ScriptError> {
        let registry = Self::new();
        for container in containers {
            let (type_name, _, _) = container.type_parts();
            if !types.is_registered(&type_name) {
                return Err(ScriptError::UnknownType {
                    script: container.name.clone(),
                    entity_type: container.entity_type.clone(),
                });
            }
            registry.register(container.clone())?;
        }
        Ok(registry)
    }

    pub fn register(&self, container: EntityScriptContainer) -> Result<(), ScriptError> {
        let key = container.name.trim().to_lowercase();
        if key.is_empty() || key.contains(['[', ']', ',', '@']) {
            return Err(ScriptError::InvalidName(container.name));
        }
        let mut scripts = self.scripts.write();
        if scripts.contains_key(&key) {
            return Err(ScriptError::Duplicate(container.name));
        }
        info!("Loaded entity script {}", container.name);
        scripts.insert(key, container);
        Ok(())
    }

    pub fn unregister(&self, name: &str) -> Option<EntityScriptContainer> {
        self.scripts.write().remove(&name.to_lowercase())
    }

    pub fn get(&self, name: &str) -> Option<EntityScriptContainer> {
        self.scripts.read().get(&name.to_lowercase()).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.scripts.read().contains_key(&name.to_lowercase())
    }

    pub fn names(&self) -> Vec<String> {
        self.scripts.read().values().map(|s| s.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.scripts.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.read().is_empty()
    }

    /// A generic entity built from the named script, mechanisms queued in order
    pub fn entity_from(&self, name: &str, denizen: &Denizen) -> Option<EntityTag> {
        let container = self.get(name)?;
        let (type_name, data1, data2) = container.type_parts();
        let Some(entity_type) = denizen.types.get(&type_name) else {
            error!(
                "Entity script '{}' has unknown entity type '{}'",
                container.name, container.entity_type
            );
            return None;
        };
        let mechanisms = container
            .mechanisms
            .iter()
            .map(|m| Mechanism::parse(m))
            .collect();
        Some(
            EntityTag::with_data(entity_type, data1, data2)
                .with_script(&container.name)
                .with_mechanisms(mechanisms),
        )
    }
}

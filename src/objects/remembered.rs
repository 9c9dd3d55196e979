//! Live object registry
//!
//! Keeps live handles resolvable by uuid while the host itself would not
//! expose them yet (an entity mid-spawn-event, for example). Entries never
//! expire: whoever remembers an entity is responsible for forgetting it.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::host::EntityHandle;

/// Uuid -> live handle
#[derive(Debug, Default)]
pub struct RememberedEntities {
    entities: RwLock<HashMap<Uuid, EntityHandle>>,
}

impl RememberedEntities {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    pub fn remember(&self, id: Uuid, handle: EntityHandle) {
        debug!("remembering entity {}", id);
        self.entities.write().insert(id, handle);
    }

    /// Remember a handle under its own uuid
    pub fn remember_entity(&self, handle: &EntityHandle) -> Uuid {
        let id = handle.read().uuid;
        self.remember(id, handle.clone());
        id
    }

    pub fn forget(&self, id: Uuid) -> Option<EntityHandle> {
        let removed = self.entities.write().remove(&id);
        if removed.is_some() {
            debug!("forgot entity {}", id);
        }
        removed
    }

    pub fn get(&self, id: Uuid) -> Option<EntityHandle> {
        self.entities.read().get(&id).cloned()
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.entities.read().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entities.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.read().is_empty()
    }
}

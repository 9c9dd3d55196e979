//! Worlds - entity and block tables for one dimension

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

use parking_lot::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::entity::{EntityHandle, EntityKind, NativeEntity};
use super::location::{BlockPos, Location};

/// A loaded (or unloaded) world
#[derive(Debug)]
pub struct World {
    name: String,
    folder: PathBuf,
    loaded: AtomicBool,
    next_entity_id: AtomicI32,
    entities: RwLock<HashMap<Uuid, EntityHandle>>,
    /// Non-air blocks: position -> material
    blocks: RwLock<HashMap<BlockPos, String>>,
}

impl World {
    pub fn new(name: &str, folder: impl Into<PathBuf>) -> Self {
        Self {
            name: name.to_string(),
            folder: folder.into(),
            loaded: AtomicBool::new(true),
            next_entity_id: AtomicI32::new(1),
            entities: RwLock::new(HashMap::new()),
            blocks: RwLock::new(HashMap::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::Relaxed)
    }

    pub fn set_loaded(&self, loaded: bool) {
        self.loaded.store(loaded, Ordering::Relaxed);
    }

    /// Spawn a new entity of the given kind.
    /// In an unloaded world the entity is created but never becomes valid.
    pub fn spawn(&self, kind: EntityKind, location: &Location) -> EntityHandle {
        self.spawn_with(NativeEntity::new(kind, location.clone()))
    }

    /// Add a pre-built entity to the world
    pub fn spawn_with(&self, mut entity: NativeEntity) -> EntityHandle {
        entity.location.world = self.name.clone();
        if !self.is_loaded() {
            debug!("world {} is not loaded, {} stays detached", self.name, entity.uuid);
            return entity.into_handle();
        }
        entity.entity_id = self.next_entity_id.fetch_add(1, Ordering::Relaxed);
        entity.set_valid(true);
        let uuid = entity.uuid;
        let handle = entity.into_handle();
        self.entities.write().insert(uuid, handle.clone());
        handle
    }

    /// Adopt an already-live handle (used when entities change worlds)
    pub fn adopt(&self, handle: &EntityHandle) {
        let uuid = {
            let mut entity = handle.write();
            entity.location.world = self.name.clone();
            entity.set_valid(self.is_loaded());
            entity.uuid
        };
        if self.is_loaded() {
            self.entities.write().insert(uuid, handle.clone());
        }
    }

    /// Detach an entity without invalidating it (world change)
    pub fn release(&self, id: Uuid) -> Option<EntityHandle> {
        self.entities.write().remove(&id)
    }

    /// Remove and invalidate an entity. Returns false if the entity refused removal.
    pub fn remove(&self, id: Uuid) -> bool {
        let handle = match self.entities.read().get(&id).cloned() {
            Some(h) => h,
            None => return false,
        };
        {
            let mut entity = handle.write();
            if entity.keep_while_ridden && !entity.passengers.is_empty() {
                debug!("{} kept alive while ridden", id);
                return false;
            }
            entity.set_valid(false);
        }
        self.entities.write().remove(&id);
        true
    }

    pub fn get_entity(&self, id: Uuid) -> Option<EntityHandle> {
        self.entities.read().get(&id).cloned()
    }

    pub fn entities(&self) -> Vec<EntityHandle> {
        self.entities.read().values().cloned().collect()
    }

    pub fn entity_count(&self) -> usize {
        self.entities.read().len()
    }

    pub fn set_block(&self, pos: BlockPos, material: &str) {
        let material = material.to_lowercase();
        let mut blocks = self.blocks.write();
        if material == "air" {
            blocks.remove(&pos);
        } else {
            blocks.insert(pos, material);
        }
    }

    /// Material at a position ("air" when empty)
    pub fn get_block(&self, pos: BlockPos) -> String {
        self.blocks
            .read()
            .get(&pos)
            .cloned()
            .unwrap_or_else(|| "air".to_string())
    }

    pub fn is_solid(&self, pos: BlockPos) -> bool {
        self.blocks.read().contains_key(&pos)
    }
}

//! External NPC system
//!
//! NPCs own their identity independently of any native entity: an NPC keeps
//! its id while despawned and gets a fresh body each time it spawns.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;

use super::entity::{Category, EntityHandle, EntityKind, NativeEntity};
use super::location::Location;
use super::server::Server;

/// Shared handle to an NPC record
pub type NpcHandle = Arc<RwLock<Npc>>;

/// An NPC record
#[derive(Debug)]
pub struct Npc {
    pub id: u32,
    pub name: String,
    pub kind: EntityKind,
    entity: Option<EntityHandle>,
    stored_location: Option<Location>,
}

impl Npc {
    pub fn entity(&self) -> Option<EntityHandle> {
        self.entity.clone()
    }

    pub fn is_spawned(&self) -> bool {
        self.entity.as_ref().is_some_and(|e| e.read().is_valid())
    }

    /// Current location when spawned, otherwise the last stored one
    pub fn location(&self) -> Option<Location> {
        match &self.entity {
            Some(e) if e.read().is_valid() => Some(e.read().location.clone()),
            _ => self.stored_location.clone(),
        }
    }
}

/// Registry of every NPC
#[derive(Debug, Default)]
pub struct NpcRegistry {
    npcs: RwLock<BTreeMap<u32, NpcHandle>>,
    next_id: AtomicU32,
}

impl NpcRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Create a new, unspawned NPC
    pub fn create(&self, name: &str, kind: EntityKind) -> NpcHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let npc = Arc::new(RwLock::new(Npc {
            id,
            name: name.to_string(),
            kind,
            entity: None,
            stored_location: None,
        }));
        self.npcs.write().insert(id, npc.clone());
        info!("Created NPC {} '{}'", id, name);
        npc
    }

    /// Create a player-shaped NPC
    pub fn create_player(&self, name: &str) -> NpcHandle {
        self.create(name, EntityKind::new("player", Category::Player, true))
    }

    pub fn get(&self, id: u32) -> Option<NpcHandle> {
        self.npcs.read().get(&id).cloned()
    }

    pub fn ids(&self) -> Vec<u32> {
        self.npcs.read().keys().copied().collect()
    }

    /// Give the NPC a body at the location. Returns the new body, if the world exists.
    pub fn spawn(&self, npc: &NpcHandle, location: &Location, server: &Server) -> Option<EntityHandle> {
        let world = server.get_world(&location.world)?;
        let mut guard = npc.write();
        let mut body = NativeEntity::new(guard.kind.clone(), location.clone());
        body.npc_id = Some(guard.id);
        if guard.kind.category == Category::Player {
            body.player_name = Some(guard.name.clone());
        }
        body.custom_name = Some(guard.name.clone());
        let handle = world.spawn_with(body);
        guard.entity = Some(handle.clone());
        guard.stored_location = Some(location.clone());
        Some(handle)
    }

    /// Remove the NPC's body, keeping the record
    pub fn despawn(&self, npc: &NpcHandle, server: &Server) -> bool {
        let mut guard = npc.write();
        let Some(body) = guard.entity.take() else {
            return false;
        };
        guard.stored_location = Some(body.read().location.clone());
        server.remove_entity(&body)
    }

    /// Teleport a spawned NPC or move the stored location of an unspawned one.
    /// False when the target world does not exist; nothing moves then.
    pub fn teleport(&self, npc: &NpcHandle, location: &Location, server: &Server) -> bool {
        let mut guard = npc.write();
        if server.get_world(&location.world).is_none() {
            return false;
        }
        if let Some(body) = guard.entity.clone() {
            if body.read().is_valid() && server.teleport(&body, location).is_none() {
                return false;
            }
        }
        guard.stored_location = Some(location.clone());
        true
    }

    /// Delete the NPC entirely
    pub fn destroy(&self, id: u32, server: &Server) -> bool {
        let npc = match self.npcs.write().remove(&id) {
            Some(n) => n,
            None => return false,
        };
        self.despawn(&npc, server);
        true
    }
}

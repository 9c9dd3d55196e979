//! The host server - world list, online players and cross-world moves

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use super::entity::{Category, EntityHandle, EntityKind, NativeEntity};
use super::location::Location;
use super::world::World;

/// In-memory host server
#[derive(Debug)]
pub struct Server {
    version: String,
    worlds: RwLock<Vec<Arc<World>>>,
}

impl Server {
    /// Create a server reporting the given version string (e.g. "1.21.4-R0.1-SNAPSHOT")
    pub fn new(version: &str) -> Self {
        Self {
            version: version.to_string(),
            worlds: RwLock::new(Vec::new()),
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn add_world(&self, world: World) -> Arc<World> {
        let world = Arc::new(world);
        info!("Loaded world {}", world.name());
        self.worlds.write().push(world.clone());
        world
    }

    pub fn get_world(&self, name: &str) -> Option<Arc<World>> {
        self.worlds
            .read()
            .iter()
            .find(|w| w.name().eq_ignore_ascii_case(name))
            .cloned()
    }

    pub fn worlds(&self) -> Vec<Arc<World>> {
        self.worlds.read().clone()
    }

    /// Find a live entity by scanning every world
    pub fn find_entity(&self, id: Uuid) -> Option<EntityHandle> {
        self.worlds.read().iter().find_map(|w| w.get_entity(id))
    }

    /// Bring a player online at the given location
    pub fn join_player(&self, name: &str, id: Uuid, location: &Location) -> Option<EntityHandle> {
        let world = self.get_world(&location.world)?;
        let mut entity = NativeEntity::new(
            EntityKind::new("player", Category::Player, true),
            location.clone(),
        );
        entity.uuid = id;
        entity.player_name = Some(name.to_string());
        info!("Player {} ({}) joined in {}", name, id, world.name());
        Some(world.spawn_with(entity))
    }

    /// Take a player offline
    pub fn quit_player(&self, id: Uuid) -> bool {
        self.worlds.read().iter().any(|w| w.remove(id))
    }

    /// Look up an online player by name (case-insensitive) or uuid
    pub fn get_online_player(&self, name_or_id: &str) -> Option<EntityHandle> {
        let by_id = Uuid::parse_str(name_or_id).ok();
        for world in self.worlds.read().iter() {
            for handle in world.entities() {
                let entity = handle.read();
                if !entity.is_player() {
                    continue;
                }
                let name_matches = entity
                    .player_name
                    .as_deref()
                    .is_some_and(|n| n.eq_ignore_ascii_case(name_or_id));
                if name_matches || by_id == Some(entity.uuid) {
                    drop(entity);
                    return Some(handle);
                }
            }
        }
        None
    }

    /// Remove an entity from whichever world holds it
    pub fn remove_entity(&self, handle: &EntityHandle) -> bool {
        let (id, world_name) = {
            let entity = handle.read();
            (entity.uuid, entity.location.world.clone())
        };
        match self.get_world(&world_name) {
            Some(world) => world.remove(id),
            None => false,
        }
    }

    /// Move an entity, switching worlds when needed. Returns whether the world
    /// changed, or `None` (and nothing moves) when the target world does not exist.
    pub fn teleport(&self, handle: &EntityHandle, location: &Location) -> Option<bool> {
        let (id, from) = {
            let entity = handle.read();
            (entity.uuid, entity.location.world.clone())
        };
        let Some(target) = self.get_world(&location.world) else {
            debug!("teleport target world {} does not exist", location.world);
            return None;
        };
        let cross_world = !from.eq_ignore_ascii_case(&location.world);
        if cross_world {
            if let Some(old) = self.get_world(&from) {
                old.release(id);
            }
            target.adopt(handle);
        }
        handle.write().location = location.clone();
        Some(cross_world)
    }
}

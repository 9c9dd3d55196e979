//! EntityTag - a live entity or a description of one
//!
//! An `EntityTag` is in one of these states:
//!
//! - **Generic**: a type, optional constructor data and a queue of pending
//!   mechanisms. No identity.
//! - **Spawned**: holds a live native handle and its uuid.
//! - **Despawned**: was spawned; a snapshot waits for `respawn`.
//! - **NpcProxy**: identity and location belong to an NPC record.
//! - **Removed**: terminal, after `remove`.
//!
//! Mechanisms applied while generic are queued and drained exactly once, in
//! order, when the entity spawns.

mod attributes;
mod parse;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};
use uuid::Uuid;

use super::entity_type::SpawnContext;
use super::{EntityError, EntityType, Mechanism};
use crate::host::{ArmorContents, EntityHandle, EntityKind, ItemStack, Location, NativeEntity, NpcHandle};
use crate::Denizen;

pub use attributes::TagValue;
pub use parse::{get_entity_for_id, matches, value_of};

/// Persistent data key binding a native entity to its entity script
pub const SCRIPT_ID_KEY: &str = "denizen-script-id";

/// Stands in for `;` inside described property values
pub const PROPERTY_ESCAPE: char = '\u{2011}';

/// Lifecycle state of an [`EntityTag`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityState {
    Generic,
    Spawned,
    Despawned,
    NpcProxy,
    Removed,
}

/// State saved by `despawn` and consumed by `respawn`
#[derive(Debug, Clone, PartialEq)]
pub struct DespawnedEntity {
    pub health: Option<f64>,
    pub max_health: Option<f64>,
    pub location: Location,
    pub armor: ArmorContents,
    pub main_hand: Option<ItemStack>,
    pub off_hand: Option<ItemStack>,
    pub script: Option<String>,
    pub captured_at: DateTime<Utc>,
}

/// An entity object
#[derive(Debug, Clone)]
pub struct EntityTag {
    entity: Option<EntityHandle>,
    entity_type: Arc<EntityType>,
    data1: Option<String>,
    data2: Option<String>,
    uuid: Option<Uuid>,
    entity_script: Option<String>,
    npc: Option<NpcHandle>,
    mechanisms: Vec<Mechanism>,
    despawned: Option<DespawnedEntity>,
    removed: bool,
}

impl EntityTag {
    /// A generic entity of the given type
    pub fn from_type(entity_type: Arc<EntityType>) -> Self {
        Self {
            entity: None,
            entity_type,
            data1: None,
            data2: None,
            uuid: None,
            entity_script: None,
            npc: None,
            mechanisms: Vec::new(),
            despawned: None,
            removed: false,
        }
    }

    /// A generic entity with constructor data
    pub fn with_data(entity_type: Arc<EntityType>, data1: Option<&str>, data2: Option<&str>) -> Self {
        Self {
            data1: data1.map(str::to_string),
            data2: data2.map(str::to_string),
            ..Self::from_type(entity_type)
        }
    }

    /// Wrap a live native entity
    pub fn from_entity(denizen: &Denizen, handle: EntityHandle) -> Self {
        let (kind, uuid, npc_id, script) = {
            let native = handle.read();
            (
                native.kind.clone(),
                native.uuid,
                native.npc_id,
                native.persistent.get(SCRIPT_ID_KEY).cloned(),
            )
        };
        let mut tag = Self::from_type(denizen.types.for_kind(&kind));
        tag.entity = Some(handle);
        tag.uuid = Some(uuid);
        tag.entity_script = script;
        tag.npc = npc_id.and_then(|id| denizen.npcs.get(id));
        tag
    }

    /// Proxy for an NPC, spawned or not
    pub fn from_npc(denizen: &Denizen, npc: NpcHandle) -> Self {
        let (kind, body) = {
            let guard = npc.read();
            (guard.kind.clone(), guard.entity())
        };
        let mut tag = Self::from_type(denizen.types.for_kind(&kind));
        tag.uuid = body.as_ref().map(|b| b.read().uuid);
        tag.entity = body;
        tag.npc = Some(npc);
        tag
    }

    /// Attach the entity script this object was built from
    pub fn with_script(mut self, script: &str) -> Self {
        self.entity_script = Some(script.to_string());
        self
    }

    /// Queue mechanisms (only meaningful while generic)
    pub fn with_mechanisms(mut self, mechanisms: Vec<Mechanism>) -> Self {
        self.mechanisms.extend(mechanisms);
        self
    }

    pub fn state(&self) -> EntityState {
        if self.removed {
            EntityState::Removed
        } else if self.npc.is_some() {
            EntityState::NpcProxy
        } else if self.despawned.is_some() {
            EntityState::Despawned
        } else if self.entity.is_some() {
            EntityState::Spawned
        } else {
            EntityState::Generic
        }
    }

    /// The live native handle (an NPC's current body for NPC proxies)
    pub fn entity(&self) -> Option<EntityHandle> {
        match &self.npc {
            Some(npc) => npc.read().entity(),
            None => self.entity.clone(),
        }
    }

    /// Run a read against the live native instance
    fn read_live<T>(&self, f: impl FnOnce(&NativeEntity) -> T) -> Option<T> {
        let handle = self.entity()?;
        let native = handle.read();
        Some(f(&native))
    }

    pub fn npc(&self) -> Option<&NpcHandle> {
        self.npc.as_ref()
    }

    pub fn entity_type(&self) -> &Arc<EntityType> {
        &self.entity_type
    }

    /// Native kind of the live instance, or of the type while not spawned
    pub fn kind(&self) -> EntityKind {
        match self.entity() {
            Some(handle) => handle.read().kind.clone(),
            None => self.entity_type.kind().clone(),
        }
    }

    pub fn data(&self) -> (Option<&str>, Option<&str>) {
        (self.data1.as_deref(), self.data2.as_deref())
    }

    pub fn entity_script(&self) -> Option<&str> {
        self.entity_script.as_deref()
    }

    pub fn waiting_mechanisms(&self) -> &[Mechanism] {
        &self.mechanisms
    }

    pub fn despawned_snapshot(&self) -> Option<&DespawnedEntity> {
        self.despawned.as_ref()
    }

    pub fn uuid(&self) -> Option<Uuid> {
        self.uuid.or_else(|| self.read_live(|native| native.uuid))
    }

    pub fn is_spawned(&self) -> bool {
        self.read_live(|native| native.is_valid()).unwrap_or(false)
    }

    pub fn is_player(&self) -> bool {
        self.read_live(|native| native.is_player()).unwrap_or(false)
    }

    pub fn is_npc(&self) -> bool {
        self.npc.is_some()
    }

    pub fn is_living(&self) -> bool {
        self.kind().living
    }

    pub fn is_removed(&self) -> bool {
        self.removed
    }

    /// Player, NPC, live instance, or remembered uuid
    pub fn is_unique(&self, denizen: &Denizen) -> bool {
        if self.removed {
            return false;
        }
        if self.is_player() || self.is_npc() || self.is_spawned() {
            return true;
        }
        self.read_live(|native| denizen.remembered.contains(native.uuid))
            .unwrap_or(false)
    }

    pub fn is_generic(&self, denizen: &Denizen) -> bool {
        !self.is_unique(denizen)
    }

    pub fn location(&self) -> Option<Location> {
        if let Some(npc) = &self.npc {
            return npc.read().location();
        }
        if let Some(handle) = &self.entity {
            return Some(handle.read().location.clone());
        }
        self.despawned.as_ref().map(|d| d.location.clone())
    }

    /// Display name: NPC name, player name, custom name, then type name
    pub fn name(&self) -> String {
        if let Some(npc) = &self.npc {
            return npc.read().name.clone();
        }
        if let Some(handle) = self.entity() {
            let native = handle.read();
            if let Some(name) = native.player_name.as_ref().or(native.custom_name.as_ref()) {
                return name.clone();
            }
        }
        self.entity_type.name().to_string()
    }

    /// Canonical string form.
    ///
    /// Precedence: `n@<npc id>`, `p@<uuid>`, `e@<uuid>` (spawned or
    /// remembered), `e@<script>`, then `e@<type>[,data1[,data2]][props]`.
    pub fn identify(&self, denizen: &Denizen) -> String {
        if let Some(npc) = &self.npc {
            return format!("n@{}", npc.read().id);
        }
        if let Some(handle) = &self.entity {
            let native = handle.read();
            if native.is_player() {
                return format!("p@{}", native.uuid);
            }
            if native.is_valid() || denizen.remembered.contains(native.uuid) {
                return format!("e@{}", native.uuid);
            }
        }
        if let Some(script) = &self.entity_script {
            return format!("e@{}", script);
        }
        format!(
            "e@{}{}",
            self.type_with_data(),
            property_string(self.mechanisms.iter().map(|m| (m.name.as_str(), m.value_str())))
        )
    }

    /// Short form for display: NPC id, player name, script or type
    pub fn identify_simple(&self) -> String {
        if let Some(npc) = &self.npc {
            return format!("n@{}", npc.read().id);
        }
        if let Some(handle) = self.entity() {
            let native = handle.read();
            if native.is_player() {
                if let Some(name) = &native.player_name {
                    return format!("p@{}", name);
                }
            }
        }
        match &self.entity_script {
            Some(script) => format!("e@{}", script),
            None => format!("e@{}", self.entity_type.name()),
        }
    }

    /// Type plus every applicable property value, e.g. `e@wolf[custom_name=Rex;variant=ashen]`
    pub fn describe(&self, denizen: &Denizen) -> String {
        if self.entity().is_none() {
            return format!(
                "e@{}{}",
                self.type_with_data(),
                property_string(self.mechanisms.iter().map(|m| (m.name.as_str(), m.value_str())))
            );
        }
        let values: Vec<(&'static str, String)> = denizen
            .properties
            .applicable(self, denizen)
            .iter()
            .filter_map(|p| p.get(self, denizen).map(|v| (p.id(), v)))
            .collect();
        format!(
            "e@{}{}",
            self.entity_type.name(),
            property_string(values.iter().map(|(k, v)| (*k, v.as_str())))
        )
    }

    fn type_with_data(&self) -> String {
        let mut base = self.entity_type.name().to_string();
        if let Some(d1) = &self.data1 {
            base.push(',');
            base.push_str(d1);
            if let Some(d2) = &self.data2 {
                base.push(',');
                base.push_str(d2);
            }
        }
        base
    }

    /// Kind-of matching against another entity. Not symmetric:
    /// a non-unique `other` matches anything sharing its type.
    pub fn compares_to(&self, other: &EntityTag, denizen: &Denizen) -> bool {
        let other_unique = other.is_unique(denizen);
        if other_unique && other.identify(denizen) == self.identify(denizen) {
            return true;
        }
        if !other_unique {
            if !self.is_unique(denizen) && other.identify(denizen) == self.identify(denizen) {
                return true;
            }
            if *self.entity_type == *other.entity_type {
                return true;
            }
        }
        false
    }

    /// Event matcher: `entity`, `player`, `npc`, `vehicle`, `projectile`,
    /// `hanging`, `living`, the name, the type name, the script name or the uuid
    pub fn matches(&self, pattern: &str) -> bool {
        let pattern = pattern.trim().to_lowercase();
        let kind = self.kind();
        match pattern.as_str() {
            "entity" => return true,
            "player" => return self.is_player(),
            "npc" => return self.is_npc(),
            "vehicle" => return kind.category == crate::host::Category::Vehicle,
            "projectile" => return kind.category == crate::host::Category::Projectile,
            "hanging" => return kind.category == crate::host::Category::Hanging,
            "living" => return kind.living,
            _ => {}
        }
        if pattern == self.name().to_lowercase() || pattern == self.entity_type.name() {
            return true;
        }
        if let Some(script) = &self.entity_script {
            if pattern == script.to_lowercase() {
                return true;
            }
        }
        self.uuid().is_some_and(|id| id.to_string() == pattern)
    }

    fn ensure_not_removed(&self, action: &str) -> Result<(), EntityError> {
        if self.removed {
            let err = EntityError::InvalidOperation(format!("cannot {} a removed entity", action));
            error!("{}", err);
            return Err(err);
        }
        Ok(())
    }

    /// Spawn at a location, or teleport when already unique.
    ///
    /// On failure the object stays generic with its pending mechanisms intact.
    pub fn spawn_at(&mut self, denizen: &Denizen, location: &Location) -> Result<(), EntityError> {
        self.ensure_not_removed("spawn")?;

        if let Some(npc) = self.npc.clone() {
            if npc.read().is_spawned() {
                return self.teleport(denizen, location);
            } else {
                let body = denizen.npcs.spawn(&npc, location, &denizen.server).ok_or_else(|| {
                    let err = EntityError::Spawn(format!("world '{}' does not exist", location.world));
                    error!("{}", err);
                    err
                })?;
                self.uuid = Some(body.read().uuid);
                self.entity = Some(body);
            }
            return Ok(());
        }

        if self.entity.is_some() && self.is_unique(denizen) {
            return self.teleport(denizen, location);
        }

        let kind = self.entity_type.kind().clone();
        let ctx = SpawnContext {
            denizen,
            kind: &kind,
            location,
            mechanisms: &self.mechanisms,
            script: self.entity_script.as_deref(),
            data1: self.data1.as_deref(),
            data2: self.data2.as_deref(),
        };
        let candidate = self.entity_type.spawn(&ctx);

        let handle = match candidate {
            Some(handle) => handle,
            None => {
                let err = EntityError::Spawn(format!(
                    "failed to spawn entity of type {}",
                    self.entity_type.name()
                ));
                error!("{}", err);
                return Err(err);
            }
        };

        let (valid, uuid, npc_id) = {
            let native = handle.read();
            (native.is_valid(), native.uuid, native.npc_id)
        };
        if !valid && !denizen.remembered.contains(uuid) {
            denizen.server.remove_entity(&handle);
            let err = EntityError::Spawn(
                "bad entity type, blocked by another plugin, or tried to spawn in an unloaded chunk?"
                    .to_string(),
            );
            error!("{}", err);
            return Err(err);
        }

        if let Some(script) = &self.entity_script {
            handle
                .write()
                .persistent
                .insert(SCRIPT_ID_KEY.to_string(), script.clone());
        }
        self.entity = Some(handle);
        self.uuid = Some(uuid);
        self.npc = npc_id.and_then(|id| denizen.npcs.get(id));
        self.despawned = None;

        let pending = std::mem::take(&mut self.mechanisms);
        for mechanism in pending {
            if let Err(e) = self.adjust(denizen, mechanism) {
                warn!("mechanism on spawn of {} failed: {}", uuid, e);
            }
        }
        Ok(())
    }

    /// Capture a snapshot and remove the native instance. Living entities only.
    pub fn despawn(&mut self, denizen: &Denizen) -> Result<(), EntityError> {
        self.ensure_not_removed("despawn")?;

        if let Some(npc) = self.npc.clone() {
            if !denizen.npcs.despawn(&npc, &denizen.server) {
                let err = EntityError::InvalidOperation("NPC is not spawned".to_string());
                error!("{}", err);
                return Err(err);
            }
            self.entity = None;
            return Ok(());
        }

        let handle = match &self.entity {
            Some(h) if h.read().is_valid() => h.clone(),
            _ => {
                let err = EntityError::InvalidOperation("cannot despawn an entity that is not spawned".to_string());
                error!("{}", err);
                return Err(err);
            }
        };

        let snapshot = {
            let native = handle.read();
            let Some(living) = native.living() else {
                let err = EntityError::InvalidOperation(format!(
                    "cannot despawn non-living entity {}",
                    native.uuid
                ));
                error!("{}", err);
                return Err(err);
            };
            DespawnedEntity {
                health: Some(living.health),
                max_health: Some(living.max_health),
                location: native.location.clone(),
                armor: living.armor.clone(),
                main_hand: living.main_hand.clone(),
                off_hand: living.off_hand.clone(),
                script: native.persistent.get(SCRIPT_ID_KEY).cloned(),
                captured_at: Utc::now(),
            }
        };

        denizen.server.remove_entity(&handle);
        self.entity = None;
        self.uuid = None;
        self.despawned = Some(snapshot);
        Ok(())
    }

    /// Spawn again from the despawn snapshot, restoring equipment and health.
    ///
    /// A snapshot bound to a still-registered entity script is rebuilt from
    /// that script; otherwise the remembered type is used.
    pub fn respawn(&mut self, denizen: &Denizen) -> Result<(), EntityError> {
        self.ensure_not_removed("respawn")?;

        if let Some(npc) = self.npc.clone() {
            let location = npc.read().location().ok_or_else(|| {
                let err = EntityError::InvalidOperation("NPC has no stored location".to_string());
                error!("{}", err);
                err
            })?;
            return self.spawn_at(denizen, &location);
        }

        let Some(snapshot) = self.despawned.take() else {
            let err = EntityError::InvalidOperation("cannot respawn an entity that was never despawned".to_string());
            error!("{}", err);
            return Err(err);
        };

        if let Some(script) = &snapshot.script {
            match denizen.scripts.entity_from(script, denizen) {
                Some(template) => {
                    info!("Rebuilding {} from entity script {}", self.entity_type.name(), script);
                    self.entity_type = template.entity_type;
                    self.data1 = template.data1;
                    self.data2 = template.data2;
                    self.entity_script = template.entity_script;
                    let queued = std::mem::take(&mut self.mechanisms);
                    self.mechanisms = template.mechanisms;
                    self.mechanisms.extend(queued);
                }
                None => warn!(
                    "entity script '{}' is no longer registered, respawning as {}",
                    script,
                    self.entity_type.name()
                ),
            }
        }

        if let Err(e) = self.spawn_at(denizen, &snapshot.location) {
            self.despawned = Some(snapshot);
            return Err(e);
        }

        if let Some(handle) = &self.entity {
            let mut native = handle.write();
            if let Some(living) = native.living_mut() {
                if let Some(max) = snapshot.max_health {
                    living.max_health = max;
                }
                living.armor = snapshot.armor;
                living.main_hand = snapshot.main_hand;
                living.off_hand = snapshot.off_hand;
                if let Some(health) = snapshot.health {
                    living.health = health.min(living.max_health);
                }
            }
        }
        Ok(())
    }

    /// Move a spawned entity (or an NPC) to a location
    pub fn teleport(&mut self, denizen: &Denizen, location: &Location) -> Result<(), EntityError> {
        self.ensure_not_removed("teleport")?;

        let missing_world = || {
            let err = EntityError::InvalidOperation(format!(
                "cannot teleport to world '{}': it does not exist",
                location.world
            ));
            error!("{}", err);
            err
        };
        if let Some(npc) = &self.npc {
            if !denizen.npcs.teleport(npc, location, &denizen.server) {
                return Err(missing_world());
            }
            return Ok(());
        }
        let Some(handle) = self.entity.clone() else {
            let err = EntityError::InvalidOperation("cannot teleport an entity that is not spawned".to_string());
            error!("{}", err);
            return Err(err);
        };
        match denizen.server.teleport(&handle, location) {
            None => return Err(missing_world()),
            Some(true) => denizen
                .nms
                .entity_helper()
                .force_position_sync(&denizen.server, &handle),
            Some(false) => {}
        }
        Ok(())
    }

    /// Unlink the script binding, forget the uuid and remove the native instance.
    /// No further lifecycle operation is legal afterwards.
    pub fn remove(&mut self, denizen: &Denizen) -> Result<(), EntityError> {
        self.ensure_not_removed("remove")?;

        if let Some(npc) = self.npc.clone() {
            let id = npc.read().id;
            denizen.npcs.destroy(id, &denizen.server);
            self.removed = true;
            return Ok(());
        }

        let Some(handle) = self.entity.clone() else {
            let err = EntityError::InvalidOperation("cannot remove an entity that is not spawned".to_string());
            error!("{}", err);
            return Err(err);
        };
        let uuid = handle.read().uuid;
        let removed = denizen.server.remove_entity(&handle);
        if !removed && handle.read().is_valid() {
            let err = EntityError::InvalidOperation(format!("entity {} refused removal", uuid));
            error!("{}", err);
            return Err(err);
        }
        handle.write().persistent.remove(SCRIPT_ID_KEY);
        denizen.remembered.forget(uuid);
        self.removed = true;
        Ok(())
    }

    /// Apply a mechanism, or queue it while generic
    pub fn adjust(&mut self, denizen: &Denizen, mechanism: Mechanism) -> Result<(), EntityError> {
        self.ensure_not_removed("adjust")?;

        if self.is_generic(denizen) {
            self.mechanisms.push(mechanism);
            return Ok(());
        }
        let result = self.apply_mechanism(denizen, &mechanism);
        if let Err(e) = &result {
            error!("{} on {}: {}", mechanism.name, self.identify(denizen), e);
        }
        result
    }
}

/// `[k=v;k2=v2]` with `;` in values escaped, or empty
fn property_string<'a>(pairs: impl Iterator<Item = (&'a str, &'a str)>) -> String {
    let parts: Vec<String> = pairs
        .map(|(k, v)| format!("{}={}", k, v.replace(';', &PROPERTY_ESCAPE.to_string())))
        .collect();
    if parts.is_empty() {
        String::new()
    } else {
        format!("[{}]", parts.join(";"))
    }
}

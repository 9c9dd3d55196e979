//! Capability tables every version provider implements
//!
//! A provider covers one contiguous version range and implements all four
//! tables in full. Operations that only exist on some versions are gated by
//! the caller with [`NmsVersion::is_at_least`], not inside the provider.

use uuid::Uuid;

use super::version::NmsVersion;
use super::NmsError;
use crate::host::{
    Category, Compound, EntityHandle, EntityKind, ItemStack, Location, NativeEntity, Server, Vector,
    World,
};

/// Uuid of the shared fake player (`00000000-0000-0000-0000-000000abc123`)
pub const FAKE_PLAYER_UUID: Uuid = Uuid::from_u128(0xABC123);

pub const FAKE_PLAYER_NAME: &str = "fakeplayer";

/// Native kind name of fake arrows
pub const FAKE_ARROW_KIND: &str = "fake_arrow";

/// Eye height used for raycasts from living entities
const LIVING_EYE_HEIGHT: f64 = 1.62;

/// A version provider: one implementation of every capability table
pub trait NmsProvider: Send + Sync {
    /// Short provider name (e.g. "v1_21")
    fn name(&self) -> &'static str;

    /// Whether this provider covers the version
    fn supports(&self, version: NmsVersion) -> bool;

    fn entity_helper(&self) -> &dyn EntityHelper;

    fn item_helper(&self) -> &dyn ItemHelper;

    fn player_data_helper(&self) -> &dyn PlayerDataHelper;

    fn fake_entity_helper(&self) -> &dyn FakeEntityHelper;
}

/// Live entity access
pub trait EntityHelper: Send + Sync {
    /// Obtain a live instance given a world and stable id
    fn get_entity(&self, world: &World, id: Uuid) -> Option<EntityHandle>;

    fn get_item_in_hand(&self, entity: &NativeEntity) -> Option<ItemStack>;

    /// Returns false when the entity cannot hold items
    fn set_item_in_hand(&self, entity: &mut NativeEntity, item: Option<ItemStack>) -> bool;

    fn get_item_in_offhand(&self, entity: &NativeEntity) -> Option<ItemStack>;

    fn set_item_in_offhand(&self, entity: &mut NativeEntity, item: Option<ItemStack>) -> bool;

    /// First solid block along the entity's line of sight, within range
    fn get_target_block(&self, world: &World, entity: &NativeEntity, range: f64) -> Option<Location>;

    fn has_line_of_sight(&self, world: &World, from: &NativeEntity, to: &NativeEntity) -> bool;

    fn get_custom_name(&self, entity: &NativeEntity) -> Option<String>;

    fn set_custom_name(&self, entity: &mut NativeEntity, name: Option<&str>);

    /// Move every rider onto the vehicle's current position
    fn force_position_sync(&self, server: &Server, vehicle: &EntityHandle);
}

/// Item compound import/export
pub trait ItemHelper: Send + Sync {
    fn to_compound(&self, item: &ItemStack) -> Compound;

    fn from_compound(&self, compound: &Compound) -> Result<ItemStack, NmsError>;
}

/// Attribute table layout of persisted player data
pub trait PlayerDataHelper: Send + Sync {
    /// Namespaced id of the max health attribute
    fn max_health_id(&self) -> &'static str;

    /// Base max health from an `Attributes` list, if present
    fn read_max_health(&self, attributes: &[serde_json::Value]) -> Option<f64>;

    /// Replace or add the base max health entry
    fn write_max_health(&self, attributes: &mut Vec<serde_json::Value>, value: f64);
}

/// Entities that exist outside normal gameplay
pub trait FakeEntityHelper: Send + Sync {
    /// The shared fake player, built on first use
    fn fake_player(&self, server: &Server) -> EntityHandle;

    /// Spawn an arrow that refuses removal while ridden
    fn spawn_fake_arrow(&self, world: &World, location: &Location) -> EntityHandle;
}

/// Build the detached fake player used for default attribute values
pub fn build_fake_player(server: &Server) -> NativeEntity {
    let world = server
        .worlds()
        .first()
        .map(|w| w.name().to_string())
        .unwrap_or_default();
    let mut player = NativeEntity::new(
        EntityKind::new("player", Category::Player, true),
        Location::new(&world, 0.0, 0.0, 0.0),
    );
    player.uuid = FAKE_PLAYER_UUID;
    player.player_name = Some(FAKE_PLAYER_NAME.to_string());
    player
}

/// Spawn a fake arrow into a world
pub fn spawn_fake_arrow_in(world: &World, location: &Location) -> EntityHandle {
    let mut arrow = NativeEntity::new(
        EntityKind::new(FAKE_ARROW_KIND, Category::Projectile, false),
        location.clone(),
    );
    arrow.keep_while_ridden = true;
    world.spawn_with(arrow)
}

/// Location raycasts start from
pub fn eye_location(entity: &NativeEntity) -> Location {
    let mut eye = entity.location.clone();
    if entity.is_living() {
        eye.y += LIVING_EYE_HEIGHT;
    }
    eye
}

/// March along a direction and return the first solid block within range
pub fn raycast_block(world: &World, origin: &Location, direction: Vector, range: f64, step: f64) -> Option<Location> {
    let dir = direction.normalize();
    if dir.length() == 0.0 || !range.is_finite() || range <= 0.0 || step <= 0.0 {
        return None;
    }
    let start = origin.to_vector();
    let mut travelled = 0.0;
    while travelled <= range {
        let point = origin.with_position(Vector::new(
            start.x + dir.x * travelled,
            start.y + dir.y * travelled,
            start.z + dir.z * travelled,
        ));
        let pos = point.block();
        if world.is_solid(pos) {
            return Some(Location::new(
                world.name(),
                pos.0 as f64,
                pos.1 as f64,
                pos.2 as f64,
            ));
        }
        travelled += step;
    }
    None
}

/// Whether no solid block lies between two points
pub fn clear_path(world: &World, from: &Location, to: &Location, step: f64) -> bool {
    if !from.world.eq_ignore_ascii_case(&to.world) {
        return false;
    }
    let a = from.to_vector();
    let b = to.to_vector();
    let delta = Vector::new(b.x - a.x, b.y - a.y, b.z - a.z);
    let distance = delta.length();
    if distance == 0.0 {
        return true;
    }
    let target = to.block();
    match raycast_block(world, from, delta, distance, step) {
        Some(hit) => hit.block() == target,
        None => true,
    }
}

/// Encode a display name as a JSON text component
pub fn text_component(text: &str) -> String {
    serde_json::json!({ "text": text }).to_string()
}

/// Decode a JSON text component; plain strings pass through
pub fn parse_text_component(raw: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(serde_json::Value::Object(obj)) => obj
            .get("text")
            .and_then(|t| t.as_str())
            .unwrap_or_default()
            .to_string(),
        Ok(serde_json::Value::String(s)) => s,
        _ => raw.to_string(),
    }
}

/// Material name from a namespaced item id
pub fn strip_namespace(id: &str) -> Result<String, NmsError> {
    let material = id.strip_prefix("minecraft:").unwrap_or(id);
    if material.is_empty() {
        return Err(NmsError::InvalidCompound(format!("empty item id '{}'", id)));
    }
    Ok(material.to_lowercase())
}

/// Shared rider sync: riders are moved to the vehicle, across worlds if needed
pub fn sync_riders(server: &Server, vehicle: &EntityHandle) {
    let (location, passengers) = {
        let v = vehicle.read();
        (v.location.clone(), v.passengers.clone())
    };
    for id in passengers {
        if let Some(rider) = server.find_entity(id) {
            server.teleport(&rider, &location);
        }
    }
}

//! Native entities - the live instances simulated by the host

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::item::{ArmorContents, ItemStack};
use super::location::{Location, Vector};

/// Shared owning reference to a live native entity
pub type EntityHandle = Arc<RwLock<NativeEntity>>;

/// Broad native category of an entity kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Creature,
    Projectile,
    Vehicle,
    Hanging,
    Player,
    Other,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Category::Creature => "creature",
            Category::Projectile => "projectile",
            Category::Vehicle => "vehicle",
            Category::Hanging => "hanging",
            Category::Player => "player",
            Category::Other => "other",
        };
        write!(f, "{}", s)
    }
}

/// Server-native type information for an entity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityKind {
    /// Lowercase kind name (e.g. "zombie")
    pub name: String,
    pub category: Category,
    /// Whether instances carry health and equipment
    pub living: bool,
}

impl EntityKind {
    pub fn new(name: &str, category: Category, living: bool) -> Self {
        Self {
            name: name.to_lowercase(),
            category,
            living,
        }
    }
}

/// Every vanilla kind the host knows: (name, category, living)
pub const VANILLA_KINDS: &[(&str, Category, bool)] = &[
    ("allay", Category::Creature, true),
    ("area_effect_cloud", Category::Other, false),
    ("armor_stand", Category::Other, true),
    ("arrow", Category::Projectile, false),
    ("bat", Category::Creature, true),
    ("bee", Category::Creature, true),
    ("blaze", Category::Creature, true),
    ("boat", Category::Vehicle, false),
    ("cat", Category::Creature, true),
    ("chicken", Category::Creature, true),
    ("cow", Category::Creature, true),
    ("creeper", Category::Creature, true),
    ("donkey", Category::Creature, true),
    ("egg", Category::Projectile, false),
    ("end_crystal", Category::Other, false),
    ("ender_dragon", Category::Creature, true),
    ("ender_pearl", Category::Projectile, false),
    ("enderman", Category::Creature, true),
    ("experience_orb", Category::Other, false),
    ("fishing_bobber", Category::Projectile, false),
    ("fox", Category::Creature, true),
    ("ghast", Category::Creature, true),
    ("goat", Category::Creature, true),
    ("horse", Category::Creature, true),
    ("iron_golem", Category::Creature, true),
    ("item", Category::Other, false),
    ("item_frame", Category::Hanging, false),
    ("leash_knot", Category::Hanging, false),
    ("lightning_bolt", Category::Other, false),
    ("llama", Category::Creature, true),
    ("marker", Category::Other, false),
    ("minecart", Category::Vehicle, false),
    ("painting", Category::Hanging, false),
    ("parrot", Category::Creature, true),
    ("pig", Category::Creature, true),
    ("player", Category::Player, true),
    ("rabbit", Category::Creature, true),
    ("sheep", Category::Creature, true),
    ("skeleton", Category::Creature, true),
    ("slime", Category::Creature, true),
    ("snowball", Category::Projectile, false),
    ("spider", Category::Creature, true),
    ("tnt", Category::Other, false),
    ("trident", Category::Projectile, false),
    ("villager", Category::Creature, true),
    ("witch", Category::Creature, true),
    ("wither", Category::Creature, true),
    ("wither_skull", Category::Projectile, false),
    ("wolf", Category::Creature, true),
    ("zombie", Category::Creature, true),
];

/// Health and equipment of a living entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LivingState {
    pub health: f64,
    pub max_health: f64,
    pub armor: ArmorContents,
    pub main_hand: Option<ItemStack>,
    pub off_hand: Option<ItemStack>,
    pub swimming: bool,
}

impl LivingState {
    pub fn new(max_health: f64) -> Self {
        Self {
            health: max_health,
            max_health,
            armor: Default::default(),
            main_hand: None,
            off_hand: None,
            swimming: false,
        }
    }
}

impl Default for LivingState {
    fn default() -> Self {
        Self::new(20.0)
    }
}

/// A live native entity
#[derive(Debug, Clone)]
pub struct NativeEntity {
    pub uuid: Uuid,
    /// Transient server-assigned id, only meaningful while spawned
    pub entity_id: i32,
    pub kind: EntityKind,
    pub location: Location,
    pub velocity: Vector,
    pub custom_name: Option<String>,
    pub living: Option<LivingState>,
    /// Set for player entities (including fake players)
    pub player_name: Option<String>,
    /// Set when the entity is the body of an NPC
    pub npc_id: Option<u32>,
    /// Kind-specific native fields (variant, age, potion type, falling block material...)
    pub data: BTreeMap<String, String>,
    /// Custom persistent data that survives chunk saves
    pub persistent: BTreeMap<String, String>,
    pub passengers: Vec<Uuid>,
    pub vehicle: Option<Uuid>,
    pub glowing: bool,
    /// Refuse removal while any passenger is riding
    pub keep_while_ridden: bool,
    valid: bool,
}

impl NativeEntity {
    /// Create a detached entity (not yet part of any world, therefore not valid)
    pub fn new(kind: EntityKind, location: Location) -> Self {
        let living = kind.living.then(LivingState::default);
        Self {
            uuid: Uuid::new_v4(),
            entity_id: 0,
            kind,
            location,
            velocity: Vector::default(),
            custom_name: None,
            living,
            player_name: None,
            npc_id: None,
            data: BTreeMap::new(),
            persistent: BTreeMap::new(),
            passengers: Vec::new(),
            vehicle: None,
            glowing: false,
            keep_while_ridden: false,
            valid: false,
        }
    }

    /// Wrap in a shared handle
    pub fn into_handle(self) -> EntityHandle {
        Arc::new(RwLock::new(self))
    }

    /// Whether the entity is currently simulated by a world
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub(crate) fn set_valid(&mut self, valid: bool) {
        self.valid = valid;
    }

    pub fn is_living(&self) -> bool {
        self.living.is_some()
    }

    pub fn is_player(&self) -> bool {
        self.player_name.is_some() && self.npc_id.is_none()
    }

    pub fn is_npc(&self) -> bool {
        self.npc_id.is_some()
    }

    pub fn living(&self) -> Option<&LivingState> {
        self.living.as_ref()
    }

    pub fn living_mut(&mut self) -> Option<&mut LivingState> {
        self.living.as_mut()
    }

    /// Get a kind-specific native field
    pub fn get_data(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(|v| v.as_str())
    }

    pub fn set_data(&mut self, key: &str, value: Option<&str>) {
        match value {
            Some(v) => {
                self.data.insert(key.to_string(), v.to_string());
            }
            None => {
                self.data.remove(key);
            }
        }
    }
}

//! Entity types
//!
//! Every registered type maps a lowercase name to a native kind and knows
//! how to construct a live instance. Most types use the plain world spawn;
//! a few (`falling_block`, `player`, `fake_arrow`) bring their own
//! constructor.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use rand::Rng;
use tracing::{error, info};

use super::{EntityError, Mechanism};
use crate::host::{Category, EntityHandle, EntityKind, Location, NativeEntity, VANILLA_KINDS};
use crate::nms::interfaces::FAKE_ARROW_KIND;
use crate::Denizen;

/// Mechanisms that may be applied to the native instance before it enters the world
pub const EARLY_VALID_MECHANISMS: &[&str] = &["max_health", "health_data", "health"];

/// Types never chosen by the `random` grammar
pub const RANDOM_EXCLUDED: &[&str] = &[
    "area_effect_cloud",
    "end_crystal",
    "ender_dragon",
    "fake_arrow",
    "falling_block",
    "fishing_bobber",
    "item",
    "item_frame",
    "leash_knot",
    "lightning_bolt",
    "marker",
    "painting",
    "player",
    "unknown",
    "wither",
    "wither_skull",
];

/// Materials a falling block may carry: (name, is a placeable solid block)
const FALLING_BLOCK_MATERIALS: &[(&str, bool)] = &[
    ("air", false),
    ("anvil", true),
    ("dirt", true),
    ("end_portal", false),
    ("glass", true),
    ("gravel", true),
    ("nether_portal", false),
    ("obsidian", true),
    ("red_sand", true),
    ("sand", true),
    ("stone", true),
    ("torch", false),
    ("water", false),
];

const DEFAULT_FALLING_MATERIAL: &str = "sand";

const DEFAULT_NPC_NAME: &str = "Player";

/// Everything a constructor needs to build a live instance
pub struct SpawnContext<'a> {
    pub denizen: &'a Denizen,
    pub kind: &'a EntityKind,
    pub location: &'a Location,
    pub mechanisms: &'a [Mechanism],
    pub script: Option<&'a str>,
    pub data1: Option<&'a str>,
    pub data2: Option<&'a str>,
}

/// Custom constructor. `None` means construction failed.
pub type Constructor = Arc<dyn Fn(&SpawnContext<'_>) -> Option<EntityHandle> + Send + Sync>;

/// A named entity type
#[derive(Clone)]
pub struct EntityType {
    name: String,
    kind: EntityKind,
    constructor: Option<Constructor>,
    registered: bool,
}

impl fmt::Debug for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityType")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("custom", &self.constructor.is_some())
            .field("registered", &self.registered)
            .finish()
    }
}

impl PartialEq for EntityType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.kind == other.kind
    }
}

impl EntityType {
    /// A type spawned with the plain world spawn
    pub fn vanilla(kind: EntityKind) -> Self {
        Self {
            name: kind.name.clone(),
            kind,
            constructor: None,
            registered: true,
        }
    }

    /// A type with its own constructor
    pub fn custom(name: &str, kind: EntityKind, constructor: Constructor) -> Self {
        Self {
            name: name.to_lowercase(),
            kind,
            constructor: Some(constructor),
            registered: true,
        }
    }

    /// Wrap a native kind that has no registered type
    pub fn unregistered(kind: EntityKind) -> Self {
        Self {
            name: kind.name.clone(),
            kind,
            constructor: None,
            registered: false,
        }
    }

    /// Lowercase name
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &EntityKind {
        &self.kind
    }

    pub fn is_custom(&self) -> bool {
        self.constructor.is_some()
    }

    pub fn is_registered(&self) -> bool {
        self.registered
    }

    pub fn is_living(&self) -> bool {
        self.kind.living
    }

    /// Build a live instance. The result may still be invalid (unloaded world).
    pub fn spawn(&self, ctx: &SpawnContext<'_>) -> Option<EntityHandle> {
        match &self.constructor {
            Some(constructor) => constructor(ctx),
            None => spawn_plain(ctx),
        }
    }
}

/// Spawn a native instance of the context's kind, seeding early-valid state first
fn spawn_plain(ctx: &SpawnContext<'_>) -> Option<EntityHandle> {
    let world = ctx.denizen.server.get_world(&ctx.location.world)?;
    let mut native = NativeEntity::new(ctx.kind.clone(), ctx.location.clone());
    seed_early_mechanisms(&mut native, ctx.mechanisms);
    Some(world.spawn_with(native))
}

/// Apply the early-valid mechanisms to a not-yet-spawned native instance.
/// Bad values are skipped here; they are reported when the queue drains.
pub fn seed_early_mechanisms(native: &mut NativeEntity, mechanisms: &[Mechanism]) {
    let Some(living) = native.living_mut() else {
        return;
    };
    let early = mechanisms
        .iter()
        .filter(|m| EARLY_VALID_MECHANISMS.iter().any(|name| m.matches(name)));
    for mechanism in early {
        match mechanism.name.as_str() {
            "max_health" => {
                if let Ok(max) = mechanism.require_f64() {
                    if max > 0.0 {
                        living.max_health = max;
                        living.health = living.health.min(max);
                    }
                }
            }
            "health_data" => {
                if let Some((current, max)) = parse_health_data(mechanism.value_str()) {
                    living.max_health = max;
                    living.health = current.min(max);
                }
            }
            "health" => {
                if let Ok(health) = mechanism.require_f64() {
                    living.health = health.clamp(0.0, living.max_health);
                }
            }
            _ => {}
        }
    }
}

/// `current/max`
pub fn parse_health_data(value: &str) -> Option<(f64, f64)> {
    let (current, max) = value.split_once('/')?;
    let current: f64 = current.trim().parse().ok()?;
    let max: f64 = max.trim().parse().ok()?;
    (max > 0.0 && current >= 0.0).then_some((current, max))
}

fn falling_block_constructor() -> Constructor {
    Arc::new(|ctx: &SpawnContext<'_>| {
        let world = ctx.denizen.server.get_world(&ctx.location.world)?;
        let material = falling_block_material(ctx.data1);
        let block_data = ctx
            .data2
            .and_then(|d| d.trim().parse::<i8>().ok())
            .unwrap_or(0);
        let mut native = NativeEntity::new(ctx.kind.clone(), ctx.location.clone());
        native.set_data("material", Some(&material));
        native.set_data("block_data", Some(&block_data.to_string()));
        Some(world.spawn_with(native))
    })
}

/// Resolve the falling block material from constructor data
fn falling_block_material(data: Option<&str>) -> String {
    let Some(requested) = data.map(|d| d.trim().to_lowercase()) else {
        return DEFAULT_FALLING_MATERIAL.to_string();
    };
    if requested == "random" {
        let mut rng = rand::rng();
        loop {
            let (name, solid) = FALLING_BLOCK_MATERIALS[rng.random_range(0..FALLING_BLOCK_MATERIALS.len())];
            if solid {
                return name.to_string();
            }
        }
    }
    match FALLING_BLOCK_MATERIALS.iter().find(|(name, _)| *name == requested) {
        Some((name, true)) => name.to_string(),
        _ => DEFAULT_FALLING_MATERIAL.to_string(),
    }
}

fn player_constructor() -> Constructor {
    Arc::new(|ctx: &SpawnContext<'_>| {
        let name = ctx.data1.unwrap_or(DEFAULT_NPC_NAME);
        let npcs = &ctx.denizen.npcs;
        match ctx.denizen.server.get_world(&ctx.location.world) {
            Some(world) if world.is_loaded() => {}
            _ => {
                error!("Cannot spawn NPC '{}': world {} is not loaded", name, ctx.location.world);
                return None;
            }
        }
        let npc = npcs.create_player(name);
        let body = npcs.spawn(&npc, ctx.location, &ctx.denizen.server);
        if body.is_none() {
            let id = npc.read().id;
            npcs.destroy(id, &ctx.denizen.server);
            error!("Cannot spawn NPC '{}' in {}", name, ctx.location.world);
        }
        body
    })
}

fn fake_arrow_constructor() -> Constructor {
    Arc::new(|ctx: &SpawnContext<'_>| {
        let world = ctx.denizen.server.get_world(&ctx.location.world)?;
        Some(
            ctx.denizen
                .nms
                .fake_entity_helper()
                .spawn_fake_arrow(&world, ctx.location),
        )
    })
}

/// Registry of every entity type, keyed by lowercase name
#[derive(Debug)]
pub struct EntityTypeRegistry {
    types: RwLock<BTreeMap<String, Arc<EntityType>>>,
}

impl Default for EntityTypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityTypeRegistry {
    /// Create a registry holding the vanilla kinds and the custom types
    pub fn new() -> Self {
        let registry = Self {
            types: RwLock::new(BTreeMap::new()),
        };
        registry.register_builtin_types();
        registry
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    fn register_builtin_types(&self) {
        let mut types = self.types.write();
        for (name, category, living) in VANILLA_KINDS {
            if *name == "player" {
                continue;
            }
            let ty = EntityType::vanilla(EntityKind::new(name, *category, *living));
            types.insert(ty.name.clone(), Arc::new(ty));
        }

        let custom = [
            EntityType::custom(
                "falling_block",
                EntityKind::new("falling_block", Category::Other, false),
                falling_block_constructor(),
            ),
            EntityType::custom(
                "player",
                EntityKind::new("player", Category::Player, true),
                player_constructor(),
            ),
            EntityType::custom(
                FAKE_ARROW_KIND,
                EntityKind::new(FAKE_ARROW_KIND, Category::Projectile, false),
                fake_arrow_constructor(),
            ),
        ];
        for ty in custom {
            types.insert(ty.name.clone(), Arc::new(ty));
        }
    }

    /// Register an additional type. Names must be unique.
    pub fn register(&self, ty: EntityType) -> Result<Arc<EntityType>, EntityError> {
        let mut types = self.types.write();
        if types.contains_key(&ty.name) {
            return Err(EntityError::InvalidOperation(format!(
                "entity type '{}' is already registered",
                ty.name
            )));
        }
        info!("Registered entity type {}", ty.name);
        let ty = Arc::new(EntityType {
            registered: true,
            ..ty
        });
        types.insert(ty.name.clone(), ty.clone());
        Ok(ty)
    }

    /// Case-insensitive lookup
    pub fn get(&self, name: &str) -> Option<Arc<EntityType>> {
        self.types.read().get(&name.to_lowercase()).cloned()
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.types.read().contains_key(&name.to_lowercase())
    }

    /// The type for a native kind, wrapping unregistered kinds
    pub fn for_kind(&self, kind: &EntityKind) -> Arc<EntityType> {
        match self.get(&kind.name) {
            Some(ty) if ty.kind == *kind => ty,
            _ => Arc::new(EntityType::unregistered(kind.clone())),
        }
    }

    /// Sorted type names
    pub fn names(&self) -> Vec<String> {
        self.types.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.types.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.read().is_empty()
    }

    /// Uniformly random type outside the exclusion list
    pub fn random(&self) -> Option<Arc<EntityType>> {
        let types: Vec<Arc<EntityType>> = self.types.read().values().cloned().collect();
        if !types.iter().any(|t| !RANDOM_EXCLUDED.contains(&t.name())) {
            return None;
        }
        let mut rng = rand::rng();
        loop {
            let candidate = &types[rng.random_range(0..types.len())];
            if !RANDOM_EXCLUDED.contains(&candidate.name()) {
                return Some(candidate.clone());
            }
        }
    }
}

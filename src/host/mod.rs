//! In-memory host platform
//!
//! Worlds, native entities, items, the NPC system and persisted player data.
//! Everything above this layer talks to it through the version capability
//! tables in [`crate::nms`] or through plain lookups.

pub mod entity;
pub mod item;
pub mod location;
pub mod npc;
pub mod playerdata;
pub mod server;
pub mod world;

pub use entity::{Category, EntityHandle, EntityKind, LivingState, NativeEntity, VANILLA_KINDS};
pub use item::{ArmorContents, ItemParseError, ItemStack};
pub use location::{BlockPos, Location, LocationParseError, Vector};
pub use npc::{Npc, NpcHandle, NpcRegistry};
pub use playerdata::{Compound, FilePlayerData, PlayerDataStore};
pub use server::Server;
pub use world::World;

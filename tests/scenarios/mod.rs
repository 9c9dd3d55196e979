//! Scenario tests
//!
//! - Lifecycle: spawn, despawn/respawn, teleport, remove
//! - Parsing: every grammar form and the identify round trip
//! - Properties: shipped properties, gating, custom registration
//! - Registry: remembered entities and the type registry
//! - Events: adapters firing through the event bus
//! - Offline player: persisted data through both providers
//! - Versions: provider resolution

pub mod lifecycle;
pub mod parsing;
pub mod properties;
pub mod registry;

//! TestHost - a runtime with temp-dir worlds and helpers for common setups

#![allow(dead_code)]

use std::path::PathBuf;

use denizen::host::{EntityHandle, Location, World};
use denizen::objects::EntityTag;
use denizen::scripts::EntityScriptContainer;
use denizen::{Config, Denizen, DebugConfig, WorldConfig};
use tempfile::TempDir;
use uuid::Uuid;

pub const DEFAULT_VERSION: &str = "1.21.4-R0.1-SNAPSHOT";

/// Builder for [`TestHost`]
pub struct TestHostBuilder {
    version: String,
    worlds: Vec<(String, bool)>,
    scripts: Vec<EntityScriptContainer>,
}

impl TestHostBuilder {
    /// Server version string (`1.20.4`, `1.21.4-R0.1-SNAPSHOT`, ...)
    pub fn version(mut self, version: &str) -> Self {
        self.version = version.to_string();
        self
    }

    /// Add a loaded world
    pub fn world(mut self, name: &str) -> Self {
        self.worlds.push((name.to_string(), true));
        self
    }

    /// Add a world that is not loaded: spawns there never become valid
    pub fn unloaded_world(mut self, name: &str) -> Self {
        self.worlds.push((name.to_string(), false));
        self
    }

    pub fn script(mut self, script: EntityScriptContainer) -> Self {
        self.scripts.push(script);
        self
    }

    pub fn build(self) -> TestHost {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let worlds = self
            .worlds
            .iter()
            .map(|(name, loaded)| {
                let folder = dir.path().join(name);
                std::fs::create_dir_all(folder.join("playerdata"))
                    .expect("Failed to create world folder");
                WorldConfig {
                    name: name.clone(),
                    folder,
                    loaded: *loaded,
                }
            })
            .collect();
        let config = Config {
            version: self.version,
            worlds,
            debug: DebugConfig::default(),
            scripts: self.scripts,
        };
        let denizen = Denizen::new(config).expect("Failed to build runtime");
        TestHost { denizen, dir }
    }
}

/// A runtime over temp-dir worlds
pub struct TestHost {
    pub denizen: Denizen,
    dir: TempDir,
}

impl TestHost {
    /// Builder starting with one loaded world named `world`
    pub fn builder() -> TestHostBuilder {
        TestHostBuilder {
            version: DEFAULT_VERSION.to_string(),
            worlds: vec![("world".to_string(), true)],
            scripts: Vec::new(),
        }
    }

    /// Default host: latest provider, one world
    pub fn start() -> Self {
        Self::builder().build()
    }

    pub fn world(&self, name: &str) -> std::sync::Arc<World> {
        self.denizen
            .server
            .get_world(name)
            .unwrap_or_else(|| panic!("no world {}", name))
    }

    pub fn world_folder(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// A location in the default world
    pub fn at(&self, x: f64, y: f64, z: f64) -> Location {
        Location::new("world", x, y, z)
    }

    pub fn spawn_point(&self) -> Location {
        self.at(0.0, 64.0, 0.0)
    }

    /// Parse, panicking on failure
    pub fn parse(&self, input: &str) -> EntityTag {
        EntityTag::value_of(input, &self.denizen).unwrap_or_else(|| panic!("'{}' did not parse", input))
    }

    /// Parse and spawn at the spawn point
    pub fn spawn(&self, input: &str) -> EntityTag {
        let mut entity = self.parse(input);
        entity
            .spawn_at(&self.denizen, &self.spawn_point())
            .unwrap_or_else(|e| panic!("'{}' did not spawn: {}", input, e));
        entity
    }

    /// Bring a player online at the spawn point
    pub fn join(&self, name: &str) -> EntityHandle {
        self.denizen
            .server
            .join_player(name, Uuid::new_v4(), &self.spawn_point())
            .expect("Failed to join player")
    }

    /// Write a raw player data file into a world folder
    pub fn write_player_data(&self, world: &str, id: Uuid, data: &serde_json::Value) {
        let path = self
            .world_folder(world)
            .join("playerdata")
            .join(format!("{}.json", id));
        std::fs::write(path, serde_json::to_string_pretty(data).unwrap())
            .expect("Failed to write player data");
    }

    pub fn read_player_data(&self, world: &str, id: Uuid) -> serde_json::Value {
        let path = self
            .world_folder(world)
            .join("playerdata")
            .join(format!("{}.json", id));
        let raw = std::fs::read_to_string(path).expect("Failed to read player data");
        serde_json::from_str(&raw).expect("Invalid player data")
    }
}

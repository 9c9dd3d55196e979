//! denizen - entity object core
//!
//! Version-dispatched capability providers, a live object registry, the
//! `EntityTag` object with its grammar and lifecycle, and the property
//! extension registry, running against an in-memory host.

pub mod events;
pub mod host;
pub mod nms;
pub mod objects;
pub mod scripts;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use events::EventBus;
use host::{FilePlayerData, NpcRegistry, Server, World};
use nms::{ImprovedOfflinePlayer, NmsError, NmsHandler};
use objects::{EntityTypeRegistry, PropertyRegistry, RememberedEntities};
use scripts::{EntityScriptContainer, ScriptError, ScriptRegistry};

/// Default config file, read from the working directory when present
pub const CONFIG_FILE: &str = "denizen.toml";

/// Prefix of environment overrides (`DENIZEN_DEBUG__VERBOSE=true`)
pub const ENV_PREFIX: &str = "DENIZEN_";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file {0} does not exist")]
    MissingFile(PathBuf),

    #[error("invalid configuration: {0}")]
    Invalid(#[from] Box<figment::Error>),
}

/// Failures building the runtime
#[derive(Debug, Error)]
pub enum DenizenError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Nms(#[from] NmsError),

    #[error(transparent)]
    Script(#[from] ScriptError),
}

/// One world of the in-memory host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldConfig {
    pub name: String,
    /// Folder holding `playerdata/`
    pub folder: PathBuf,
    #[serde(default = "default_true")]
    pub loaded: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Log at debug level unless `RUST_LOG` says otherwise
    pub verbose: bool,
}

/// Runtime configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server version string the provider is picked for
    pub version: String,
    pub worlds: Vec<WorldConfig>,
    pub debug: DebugConfig,
    pub scripts: Vec<EntityScriptContainer>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.21.4-R0.1-SNAPSHOT".to_string(),
            worlds: vec![WorldConfig {
                name: "world".to_string(),
                folder: PathBuf::from("world"),
                loaded: true,
            }],
            debug: DebugConfig::default(),
            scripts: Vec::new(),
        }
    }
}

impl Config {
    /// Defaults, then the TOML file (explicit path, or `denizen.toml` if
    /// present), then `DENIZEN_` environment variables
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::MissingFile(path.to_path_buf()));
                }
                figment = figment.merge(Toml::file(path));
            }
            None => figment = figment.merge(Toml::file(CONFIG_FILE)),
        }
        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(|e| ConfigError::Invalid(Box::new(e)))
    }
}

/// The runtime: host, version handler and every registry
#[derive(Debug)]
pub struct Denizen {
    pub config: Config,
    pub server: Arc<Server>,
    pub nms: Arc<NmsHandler>,
    pub npcs: Arc<NpcRegistry>,
    pub types: Arc<EntityTypeRegistry>,
    pub scripts: Arc<ScriptRegistry>,
    pub remembered: Arc<RememberedEntities>,
    pub properties: Arc<PropertyRegistry>,
    pub events: Arc<EventBus>,
}

impl Denizen {
    /// Build the host worlds from the config, then the runtime
    pub fn new(config: Config) -> Result<Self, DenizenError> {
        let server = Server::new(&config.version);
        for world in &config.worlds {
            let w = World::new(&world.name, &world.folder);
            w.set_loaded(world.loaded);
            server.add_world(w);
        }
        Self::with_server(config, Arc::new(server))
    }

    /// Build the runtime around an existing host.
    /// Fails when no provider supports the server version.
    pub fn with_server(config: Config, server: Arc<Server>) -> Result<Self, DenizenError> {
        let nms = Arc::new(NmsHandler::detect(server.version())?);
        info!(
            "Loaded version provider {} for server {}",
            nms.provider_name(),
            nms.version()
        );

        let types = EntityTypeRegistry::shared();
        let scripts = Arc::new(ScriptRegistry::from_containers(&config.scripts, &types)?);
        info!(
            "{} entity types, {} entity scripts",
            types.len(),
            scripts.len()
        );

        Ok(Self {
            config,
            server,
            nms,
            npcs: NpcRegistry::shared(),
            types,
            scripts,
            remembered: RememberedEntities::shared(),
            properties: PropertyRegistry::shared(),
            events: EventBus::shared(),
        })
    }

    /// Persisted data of a player who is not online, searched across world folders
    pub fn offline_player(&self, id: Uuid) -> Result<Option<ImprovedOfflinePlayer>, NmsError> {
        for world in self.server.worlds() {
            let store = Arc::new(FilePlayerData::for_world(world.folder()));
            if let Some(player) = ImprovedOfflinePlayer::load(id, store, self.nms.clone())? {
                return Ok(Some(player));
            }
        }
        Ok(None)
    }
}

//! Persisted player data
//!
//! Offline players live on disk as one compound per uuid. The store is
//! synchronous: callers block on file I/O on the calling thread.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;
use uuid::Uuid;

/// An opaque persisted structure (JSON object map)
pub type Compound = serde_json::Map<String, serde_json::Value>;

/// Load/save boundary for persisted player data
pub trait PlayerDataStore: Send + Sync {
    /// Load the compound for a uuid; `Ok(None)` when nothing is stored
    fn load(&self, id: Uuid) -> io::Result<Option<Compound>>;

    fn save(&self, id: Uuid, data: &Compound) -> io::Result<()>;
}

/// Player data files under `<world folder>/playerdata/<uuid>.json`
#[derive(Debug, Clone)]
pub struct FilePlayerData {
    dir: PathBuf,
}

impl FilePlayerData {
    /// Store rooted at a world folder
    pub fn for_world(world_folder: &Path) -> Self {
        Self {
            dir: world_folder.join("playerdata"),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, id: Uuid) -> PathBuf {
        self.dir.join(format!("{}.json", id))
    }

    /// Every uuid with a stored file
    pub fn stored_ids(&self) -> io::Result<Vec<Uuid>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(e) => e,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };
        let mut ids = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(id) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| Uuid::parse_str(s).ok())
            {
                ids.push(id);
            }
        }
        ids.sort();
        Ok(ids)
    }
}

impl PlayerDataStore for FilePlayerData {
    fn load(&self, id: Uuid) -> io::Result<Option<Compound>> {
        let path = self.path_for(id);
        let text = match fs::read_to_string(&path) {
            Ok(t) => t,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("no player data at {}", path.display());
                return Ok(None);
            }
            Err(e) => return Err(e),
        };
        let value: serde_json::Value = serde_json::from_str(&text)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        match value {
            serde_json::Value::Object(map) => Ok(Some(map)),
            _ => Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("{} is not a compound", path.display()),
            )),
        }
    }

    fn save(&self, id: Uuid, data: &Compound) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let text = serde_json::to_string_pretty(data)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(self.path_for(id), text)
    }
}

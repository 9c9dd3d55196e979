//! Offline player data access
//!
//! Reads and edits the persisted compound of a player who is not online.
//! Only the well-known keys are interpreted; the rest of the compound is
//! carried through untouched.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use tracing::{error, warn};
use uuid::Uuid;

use super::{NmsError, NmsHandler};
use crate::host::{Compound, ItemStack, PlayerDataStore, Server};

pub const INVENTORY_KEY: &str = "Inventory";
pub const ENDER_CHEST_KEY: &str = "EnderItems";
pub const ATTRIBUTES_KEY: &str = "Attributes";
const SLOT_KEY: &str = "Slot";

/// Slot number -> item
pub type SlotContents = BTreeMap<i32, ItemStack>;

/// A persisted player compound opened for editing
pub struct ImprovedOfflinePlayer {
    id: Uuid,
    compound: Compound,
    store: Arc<dyn PlayerDataStore>,
    handler: Arc<NmsHandler>,
    modified_at: Option<DateTime<Utc>>,
}

impl ImprovedOfflinePlayer {
    /// Load a player's data. `Ok(None)` when nothing is stored for the uuid.
    pub fn load(
        id: Uuid,
        store: Arc<dyn PlayerDataStore>,
        handler: Arc<NmsHandler>,
    ) -> Result<Option<Self>, NmsError> {
        let compound = match store.load(id) {
            Ok(Some(c)) => c,
            Ok(None) => return Ok(None),
            Err(e) => {
                error!("Failed to load player data for {}: {}", id, e);
                return Err(NmsError::Persistence { id, source: e });
            }
        };
        Ok(Some(Self {
            id,
            compound,
            store,
            handler,
            modified_at: None,
        }))
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn compound(&self) -> &Compound {
        &self.compound
    }

    pub fn is_modified(&self) -> bool {
        self.modified_at.is_some()
    }

    /// Time of the first unsaved change
    pub fn modified_at(&self) -> Option<DateTime<Utc>> {
        self.modified_at
    }

    fn mark_modified(&mut self) {
        if self.modified_at.is_none() {
            self.modified_at = Some(Utc::now());
        }
    }

    pub fn inventory(&self) -> SlotContents {
        self.read_slots(INVENTORY_KEY)
    }

    pub fn set_inventory(&mut self, contents: &SlotContents) {
        self.write_slots(INVENTORY_KEY, contents);
    }

    pub fn ender_chest(&self) -> SlotContents {
        self.read_slots(ENDER_CHEST_KEY)
    }

    pub fn set_ender_chest(&mut self, contents: &SlotContents) {
        self.write_slots(ENDER_CHEST_KEY, contents);
    }

    /// Stored max health, or the fake player's default when absent
    pub fn max_health(&self, server: &Server) -> f64 {
        let stored = self
            .compound
            .get(ATTRIBUTES_KEY)
            .and_then(Value::as_array)
            .and_then(|attrs| self.handler.player_data_helper().read_max_health(attrs));
        match stored {
            Some(v) => v,
            None => {
                let fake = self.handler.fake_entity_helper().fake_player(server);
                let guard = fake.read();
                guard.living().map(|l| l.max_health).unwrap_or(20.0)
            }
        }
    }

    pub fn set_max_health(&mut self, value: f64) {
        let mut attributes = self
            .compound
            .get(ATTRIBUTES_KEY)
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        self.handler
            .player_data_helper()
            .write_max_health(&mut attributes, value);
        self.compound
            .insert(ATTRIBUTES_KEY.to_string(), Value::Array(attributes));
        self.mark_modified();
    }

    /// Write back if anything changed. Returns whether a write happened.
    pub fn save(&mut self) -> Result<bool, NmsError> {
        if !self.is_modified() {
            return Ok(false);
        }
        if let Err(e) = self.store.save(self.id, &self.compound) {
            error!("Failed to save player data for {}: {}", self.id, e);
            return Err(NmsError::Persistence {
                id: self.id,
                source: e,
            });
        }
        self.modified_at = None;
        Ok(true)
    }

    fn read_slots(&self, key: &str) -> SlotContents {
        let mut contents = SlotContents::new();
        let Some(entries) = self.compound.get(key).and_then(Value::as_array) else {
            return contents;
        };
        let items = self.handler.item_helper();
        for entry in entries {
            let Some(obj) = entry.as_object() else {
                warn!("Skipping non-compound entry in {} of {}", key, self.id);
                continue;
            };
            let Some(slot) = obj
                .get(SLOT_KEY)
                .and_then(Value::as_i64)
                .and_then(|s| i32::try_from(s).ok())
            else {
                warn!("Skipping item without a valid slot in {} of {}", key, self.id);
                continue;
            };
            match items.from_compound(obj) {
                Ok(item) => {
                    contents.insert(slot, item);
                }
                Err(e) => warn!("Skipping item in {} of {}: {}", key, self.id, e),
            }
        }
        contents
    }

    fn write_slots(&mut self, key: &str, contents: &SlotContents) {
        let items = self.handler.item_helper();
        let entries: Vec<Value> = contents
            .iter()
            .filter(|(_, item)| !item.is_air())
            .map(|(slot, item)| {
                let mut compound = items.to_compound(item);
                compound.insert(SLOT_KEY.to_string(), json!(slot));
                Value::Object(compound)
            })
            .collect();
        self.compound.insert(key.to_string(), Value::Array(entries));
        self.mark_modified();
    }
}

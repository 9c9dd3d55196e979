use parking_lot::RwLock;
use tracing::error;

use super::{run_in_check, try_item, ContextValue, EventBus, ScriptEvent, ScriptPath};
use crate::host::{ItemStack, Location};
use crate::Denizen;

/// `<block> cooks|smelts <item> (into <item>)`
///
/// Context: `location`, `source_item`, `result_item`. Determining an item
/// replaces the result right away; later handlers see the new result.
pub struct BlockCooksSmeltsItemScriptEvent {
    pub location: Location,
    pub source_item: ItemStack,
    result_item: RwLock<Option<ItemStack>>,
}

impl BlockCooksSmeltsItemScriptEvent {
    /// Fire for a finished cook. Returns the item the block should produce,
    /// `None` when a handler cancelled.
    pub fn fire(
        bus: &EventBus,
        denizen: &Denizen,
        location: Location,
        source_item: ItemStack,
        result_item: ItemStack,
    ) -> Option<ItemStack> {
        let event = Self {
            location,
            source_item,
            result_item: RwLock::new(Some(result_item)),
        };
        let outcome = bus.fire(&event, denizen);
        if outcome.cancelled {
            return None;
        }
        event.result_item.into_inner()
    }

    fn block_matches(&self, pattern: &str, denizen: &Denizen) -> bool {
        if pattern == "block" {
            return true;
        }
        let Some(world) = denizen.server.get_world(&self.location.world) else {
            return false;
        };
        let material = world.get_block(self.location.block());
        pattern.split('|').any(|p| p == material)
    }
}

impl ScriptEvent for BlockCooksSmeltsItemScriptEvent {
    fn name(&self) -> &'static str {
        "BlockCooksSmeltsItem"
    }

    fn could_match(&self, path: &ScriptPath) -> bool {
        matches!(path.arg(1), "cooks" | "smelts") && !path.arg(2).is_empty()
    }

    fn matches(&self, path: &ScriptPath, denizen: &Denizen) -> bool {
        if !self.block_matches(path.arg(0), denizen) {
            return false;
        }
        if !try_item(Some(&self.source_item), path.arg(2)) {
            return false;
        }
        if path.arg(3) == "into" && !try_item(self.result_item.read().as_ref(), path.arg(4)) {
            return false;
        }
        run_in_check(path, Some(&self.location))
    }

    fn context(&self, name: &str) -> Option<ContextValue> {
        match name {
            "location" => Some(ContextValue::Location(self.location.clone())),
            "source_item" => Some(ContextValue::Item(Some(self.source_item.clone()))),
            "result_item" => Some(ContextValue::Item(self.result_item.read().clone())),
            _ => None,
        }
    }

    fn apply_determination(&self, value: &str) {
        match ItemStack::parse_slot(value) {
            Ok(item) => *self.result_item.write() = item,
            Err(e) => error!("Invalid cook result determination: {}", e),
        }
    }
}

use std::sync::Arc;

use tracing::info;

use super::{ContextValue, EventBus, EventOutcome, ScriptEvent, ScriptPath};
use crate::host::World;
use crate::Denizen;

/// `<world> loads`, matched by `world` or the world name. Not cancellable.
pub struct WorldLoadsScriptEvent {
    pub world: Arc<World>,
}

impl WorldLoadsScriptEvent {
    /// Mark the world loaded, then fire
    pub fn fire(bus: &EventBus, denizen: &Denizen, world: Arc<World>) -> EventOutcome {
        world.set_loaded(true);
        info!("World {} loaded", world.name());
        bus.fire(&Self { world }, denizen)
    }
}

impl ScriptEvent for WorldLoadsScriptEvent {
    fn name(&self) -> &'static str {
        "WorldLoads"
    }

    fn could_match(&self, path: &ScriptPath) -> bool {
        path.arg(1) == "loads"
    }

    fn matches(&self, path: &ScriptPath, _denizen: &Denizen) -> bool {
        let target = path.arg(0);
        let target = target.strip_prefix("w@").unwrap_or(target);
        target == "world" || target.eq_ignore_ascii_case(self.world.name())
    }

    fn context(&self, name: &str) -> Option<ContextValue> {
        match name {
            "world" => Some(ContextValue::World(self.world.name().to_string())),
            _ => None,
        }
    }

    fn cancellable(&self) -> bool {
        false
    }
}

use super::{run_in_check, try_entity, ContextValue, EventBus, EventOutcome, ScriptEvent, ScriptPath};
use crate::host::EntityHandle;
use crate::objects::EntityTag;
use crate::Denizen;

/// `<vehicle> destroyed` or `<entity> destroys <vehicle>`
///
/// Context: `vehicle`, and `entity` when something attacked it.
pub struct VehicleDestroyedScriptEvent {
    pub vehicle: EntityTag,
    pub entity: Option<EntityTag>,
}

impl VehicleDestroyedScriptEvent {
    /// Fire for a vehicle about to be destroyed. The vehicle is only removed
    /// when no handler cancelled.
    pub fn fire(
        bus: &EventBus,
        denizen: &Denizen,
        vehicle: EntityHandle,
        attacker: Option<EntityHandle>,
    ) -> EventOutcome {
        let event = Self {
            vehicle: EntityTag::from_entity(denizen, vehicle.clone()),
            entity: attacker.map(|a| EntityTag::from_entity(denizen, a)),
        };
        let outcome = bus.fire(&event, denizen);
        if !outcome.cancelled {
            denizen.server.remove_entity(&vehicle);
        }
        outcome
    }
}

impl ScriptEvent for VehicleDestroyedScriptEvent {
    fn name(&self) -> &'static str {
        "VehicleDestroyed"
    }

    fn could_match(&self, path: &ScriptPath) -> bool {
        matches!(path.arg(1), "destroyed" | "destroys")
    }

    fn matches(&self, path: &ScriptPath, _denizen: &Denizen) -> bool {
        let destroys = path.arg(1) == "destroys";
        let vehicle = if destroys { path.arg(2) } else { path.arg(0) };
        if !try_entity(&self.vehicle, vehicle) {
            return false;
        }
        if destroys {
            match &self.entity {
                Some(entity) if try_entity(entity, path.arg(0)) => {}
                _ => return false,
            }
        }
        run_in_check(path, self.vehicle.location().as_ref())
    }

    fn context(&self, name: &str) -> Option<ContextValue> {
        match name {
            "vehicle" => Some(ContextValue::Entity(self.vehicle.clone())),
            "entity" => self.entity.clone().map(ContextValue::Entity),
            _ => None,
        }
    }
}

use super::{run_in_check, try_entity, ContextValue, EventBus, EventOutcome, ScriptEvent, ScriptPath};
use crate::host::EntityHandle;
use crate::objects::EntityTag;
use crate::Denizen;

/// `<vehicle> created`
///
/// Context: `vehicle`. Cancelling removes the vehicle again.
pub struct VehicleCreatedScriptEvent {
    pub vehicle: EntityTag,
}

impl VehicleCreatedScriptEvent {
    /// Fire for a vehicle the host just created.
    ///
    /// The vehicle is remembered while handlers run so `e@<uuid>` resolves
    /// even before the host lists it.
    pub fn fire(bus: &EventBus, denizen: &Denizen, vehicle: EntityHandle) -> EventOutcome {
        let id = denizen.remembered.remember_entity(&vehicle);
        let event = Self {
            vehicle: EntityTag::from_entity(denizen, vehicle.clone()),
        };
        let outcome = bus.fire(&event, denizen);
        denizen.remembered.forget(id);
        if outcome.cancelled {
            denizen.server.remove_entity(&vehicle);
        }
        outcome
    }
}

impl ScriptEvent for VehicleCreatedScriptEvent {
    fn name(&self) -> &'static str {
        "VehicleCreated"
    }

    fn could_match(&self, path: &ScriptPath) -> bool {
        path.arg(1) == "created"
    }

    fn matches(&self, path: &ScriptPath, _denizen: &Denizen) -> bool {
        try_entity(&self.vehicle, path.arg(0)) && run_in_check(path, self.vehicle.location().as_ref())
    }

    fn context(&self, name: &str) -> Option<ContextValue> {
        match name {
            "vehicle" => Some(ContextValue::Entity(self.vehicle.clone())),
            _ => None,
        }
    }
}

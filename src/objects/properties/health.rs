//! Health, max health and combined health data of living entities

use super::{format_number, read_native, write_native, EntityProperty};
use crate::objects::{parse_health_data, EntityError, EntityTag, Mechanism};
use crate::Denizen;

/// Current health, clamped to `0..=max_health` on write
pub struct EntityHealth;

impl EntityProperty for EntityHealth {
    fn id(&self) -> &'static str {
        "health"
    }

    fn describes(&self, entity: &EntityTag, _denizen: &Denizen) -> bool {
        entity.kind().living
    }

    fn get(&self, entity: &EntityTag, _denizen: &Denizen) -> Option<String> {
        read_native(entity, |native| native.living().map(|l| format_number(l.health)))
    }

    fn set(&self, entity: &EntityTag, _denizen: &Denizen, mechanism: &Mechanism) -> Result<(), EntityError> {
        let health = mechanism.require_f64()?;
        if health < 0.0 {
            return Err(EntityError::invalid_mechanism(&mechanism.name, "health cannot be negative"));
        }
        write_native(entity, mechanism, |native| {
            let living = native
                .living_mut()
                .ok_or_else(|| EntityError::invalid_mechanism(&mechanism.name, "entity is not living"))?;
            living.health = health.min(living.max_health);
            Ok(())
        })
    }
}

/// Maximum health. Lowering it below current health lowers the health too.
pub struct EntityMaxHealth;

impl EntityProperty for EntityMaxHealth {
    fn id(&self) -> &'static str {
        "max_health"
    }

    fn describes(&self, entity: &EntityTag, _denizen: &Denizen) -> bool {
        entity.kind().living
    }

    fn get(&self, entity: &EntityTag, _denizen: &Denizen) -> Option<String> {
        read_native(entity, |native| native.living().map(|l| format_number(l.max_health)))
    }

    fn set(&self, entity: &EntityTag, _denizen: &Denizen, mechanism: &Mechanism) -> Result<(), EntityError> {
        let max = mechanism.require_f64()?;
        if max <= 0.0 {
            return Err(EntityError::invalid_mechanism(&mechanism.name, "max health must be positive"));
        }
        write_native(entity, mechanism, |native| {
            let living = native
                .living_mut()
                .ok_or_else(|| EntityError::invalid_mechanism(&mechanism.name, "entity is not living"))?;
            living.max_health = max;
            living.health = living.health.min(max);
            Ok(())
        })
    }
}

/// Health and max health together, as `current/max`
pub struct EntityHealthData;

impl EntityProperty for EntityHealthData {
    fn id(&self) -> &'static str {
        "health_data"
    }

    fn describes(&self, entity: &EntityTag, _denizen: &Denizen) -> bool {
        entity.kind().living
    }

    fn get(&self, entity: &EntityTag, _denizen: &Denizen) -> Option<String> {
        read_native(entity, |native| {
            native
                .living()
                .map(|l| format!("{}/{}", format_number(l.health), format_number(l.max_health)))
        })
    }

    fn set(&self, entity: &EntityTag, _denizen: &Denizen, mechanism: &Mechanism) -> Result<(), EntityError> {
        let (current, max) = parse_health_data(mechanism.value_str()).ok_or_else(|| {
            EntityError::invalid_mechanism(
                &mechanism.name,
                format!("'{}' is not of the form current/max", mechanism.value_str()),
            )
        })?;
        write_native(entity, mechanism, |native| {
            let living = native
                .living_mut()
                .ok_or_else(|| EntityError::invalid_mechanism(&mechanism.name, "entity is not living"))?;
            living.max_health = max;
            living.health = current.min(max);
            Ok(())
        })
    }
}

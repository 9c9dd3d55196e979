use super::{enum_key, read_native, write_native, EntityProperty};
use crate::nms::version::V1_20_2;
use crate::objects::{EntityError, EntityTag, Mechanism};
use crate::Denizen;

pub const POTION_TYPES: &[&str] = &[
    "awkward",
    "fire_resistance",
    "harming",
    "healing",
    "infested",
    "invisibility",
    "leaping",
    "long_fire_resistance",
    "long_invisibility",
    "long_night_vision",
    "long_poison",
    "long_regeneration",
    "long_slowness",
    "long_strength",
    "long_swiftness",
    "long_water_breathing",
    "long_weakness",
    "luck",
    "mundane",
    "night_vision",
    "oozing",
    "poison",
    "regeneration",
    "slow_falling",
    "slowness",
    "strength",
    "strong_harming",
    "strong_healing",
    "strong_leaping",
    "strong_poison",
    "strong_regeneration",
    "strong_slowness",
    "strong_strength",
    "strong_swiftness",
    "swiftness",
    "thick",
    "turtle_master",
    "water",
    "water_breathing",
    "weakness",
    "weaving",
    "wind_charged",
];

/// An arrow's base potion type. Give no value to remove it.
pub struct EntityPotionType;

impl EntityProperty for EntityPotionType {
    fn id(&self) -> &'static str {
        "potion_type"
    }

    fn describes(&self, entity: &EntityTag, denizen: &Denizen) -> bool {
        denizen.nms.is_at_least(V1_20_2) && entity.kind().name == "arrow"
    }

    fn get(&self, entity: &EntityTag, _denizen: &Denizen) -> Option<String> {
        read_native(entity, |native| native.get_data("potion_type").map(str::to_string))
    }

    fn set(&self, entity: &EntityTag, _denizen: &Denizen, mechanism: &Mechanism) -> Result<(), EntityError> {
        let potion = match mechanism.value.as_deref().filter(|v| !v.trim().is_empty()) {
            None => None,
            Some(value) => {
                let key = enum_key(value);
                if !POTION_TYPES.contains(&key.as_str()) {
                    return Err(EntityError::invalid_mechanism(
                        &mechanism.name,
                        format!("'{}' is not a potion type", value),
                    ));
                }
                Some(key)
            }
        };
        write_native(entity, mechanism, |native| {
            native.set_data("potion_type", potion.as_deref());
            Ok(())
        })
    }

    fn nullable(&self) -> bool {
        true
    }
}

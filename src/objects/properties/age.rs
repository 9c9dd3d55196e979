use super::{read_native, write_native, EntityProperty};
use crate::objects::{EntityError, EntityTag, Mechanism};
use crate::Denizen;

/// Kinds that grow up
const AGEABLE: &[&str] = &[
    "bee", "cat", "chicken", "cow", "donkey", "fox", "goat", "horse", "llama", "parrot", "pig",
    "rabbit", "sheep", "villager", "wolf",
];

/// Age of a freshly bred baby, in ticks
pub const BABY_AGE: i32 = -24000;

/// Age in ticks. Negative is a baby; accepts `baby`, `adult` or a tick count.
pub struct EntityAge;

impl EntityProperty for EntityAge {
    fn id(&self) -> &'static str {
        "age"
    }

    fn describes(&self, entity: &EntityTag, _denizen: &Denizen) -> bool {
        AGEABLE.contains(&entity.kind().name.as_str())
    }

    fn get(&self, entity: &EntityTag, _denizen: &Denizen) -> Option<String> {
        read_native(entity, |native| {
            Some(native.get_data("age").unwrap_or("0").to_string())
        })
    }

    fn set(&self, entity: &EntityTag, _denizen: &Denizen, mechanism: &Mechanism) -> Result<(), EntityError> {
        let age = match mechanism.value_str().trim().to_lowercase().as_str() {
            "baby" => BABY_AGE,
            "adult" => 0,
            _ => mechanism.require_i32()?,
        };
        write_native(entity, mechanism, |native| {
            native.set_data("age", Some(&age.to_string()));
            Ok(())
        })
    }
}

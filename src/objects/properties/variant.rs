use super::{enum_key, read_native, write_native, EntityProperty};
use crate::nms::version::V1_20_5;
use crate::objects::{EntityError, EntityTag, Mechanism};
use crate::Denizen;

pub const WOLF_VARIANTS: &[&str] = &[
    "ashen", "black", "chestnut", "pale", "rusty", "snowy", "spotted", "striped", "woods",
];

const DEFAULT_VARIANT: &str = "pale";

/// Which variant a wolf is
pub struct EntityVariant;

impl EntityProperty for EntityVariant {
    fn id(&self) -> &'static str {
        "variant"
    }

    fn describes(&self, entity: &EntityTag, denizen: &Denizen) -> bool {
        denizen.nms.is_at_least(V1_20_5) && entity.kind().name == "wolf"
    }

    fn get(&self, entity: &EntityTag, _denizen: &Denizen) -> Option<String> {
        read_native(entity, |native| {
            Some(native.get_data("variant").unwrap_or(DEFAULT_VARIANT).to_string())
        })
    }

    fn set(&self, entity: &EntityTag, _denizen: &Denizen, mechanism: &Mechanism) -> Result<(), EntityError> {
        let variant = enum_key(mechanism.value_str());
        if !WOLF_VARIANTS.contains(&variant.as_str()) {
            return Err(EntityError::invalid_mechanism(
                &mechanism.name,
                format!("invalid wolf variant specified: {}", mechanism.value_str()),
            ));
        }
        write_native(entity, mechanism, |native| {
            native.set_data("variant", Some(&variant));
            Ok(())
        })
    }
}

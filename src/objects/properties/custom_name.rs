use super::{read_native, write_native, EntityProperty};
use crate::objects::{EntityError, EntityTag, Mechanism};
use crate::Denizen;

/// The entity's custom display name. An empty value clears it.
pub struct EntityCustomName;

impl EntityProperty for EntityCustomName {
    fn id(&self) -> &'static str {
        "custom_name"
    }

    fn describes(&self, _entity: &EntityTag, _denizen: &Denizen) -> bool {
        true
    }

    fn get(&self, entity: &EntityTag, denizen: &Denizen) -> Option<String> {
        read_native(entity, |native| denizen.nms.entity_helper().get_custom_name(native))
    }

    fn set(&self, entity: &EntityTag, denizen: &Denizen, mechanism: &Mechanism) -> Result<(), EntityError> {
        write_native(entity, mechanism, |native| {
            denizen
                .nms
                .entity_helper()
                .set_custom_name(native, Some(mechanism.value_str()));
            Ok(())
        })
    }
}

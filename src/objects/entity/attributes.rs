//! Tag attributes and built-in mechanisms of EntityTag

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, error};

use super::EntityTag;
use crate::host::{EntityHandle, ItemStack, Location};
use crate::nms::version::V1_13_2;
use crate::objects::{EntityError, Mechanism};
use crate::Denizen;

/// `name` or `name[param]`
static ATTRIBUTE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z_]+)(?:\[(.*)\])?$").unwrap());

const DEFAULT_TARGET_RANGE: f64 = 50.0;
const MAX_TARGET_RANGE: f64 = 200.0;

/// Result of reading a tag attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagValue {
    Value(String),
    /// The attribute applies but has no value right now
    Empty,
    /// Nothing handled the attribute; carries the object's identity
    Fallback(String),
}

impl TagValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TagValue::Value(v) => Some(v),
            _ => None,
        }
    }

    fn from_option(value: Option<String>) -> Self {
        value.map_or(TagValue::Empty, TagValue::Value)
    }
}

impl EntityTag {
    /// Read an attribute such as `uuid`, `target_block[20]` or `custom_name`.
    ///
    /// Built-ins come first, then the last pending mechanism of that name on
    /// a generic entity, then properties.
    pub fn get_attribute(&self, denizen: &Denizen, attribute: &str) -> TagValue {
        let Some(caps) = ATTRIBUTE_REGEX.captures(attribute.trim()) else {
            return TagValue::Fallback(self.identify(denizen));
        };
        let name = caps[1].to_lowercase();
        let param = caps.get(2).map(|m| m.as_str());

        if let Some(value) = self.builtin_attribute(denizen, &name, param) {
            return value;
        }

        if self.is_generic(denizen) {
            if let Some(pending) = self.mechanisms.iter().rev().find(|m| m.matches(&name)) {
                return TagValue::from_option(pending.value.clone());
            }
        }

        if let Some(property) = denizen.properties.find(&name, self, denizen) {
            return TagValue::from_option(property.get(self, denizen));
        }

        debug!("unhandled entity attribute '{}' on {}", name, self.identify(denizen));
        TagValue::Fallback(self.identify(denizen))
    }

    fn builtin_attribute(&self, denizen: &Denizen, name: &str, param: Option<&str>) -> Option<TagValue> {
        let value = match name {
            "type" => TagValue::Value("Entity".to_string()),
            "entity_type" => TagValue::Value(self.entity_type.name().to_string()),
            "is_spawned" => TagValue::Value(self.is_spawned().to_string()),
            "is_unique" => TagValue::Value(self.is_unique(denizen).to_string()),
            "is_living" => TagValue::Value(self.is_living().to_string()),
            "is_player" => TagValue::Value(self.is_player().to_string()),
            "is_npc" => TagValue::Value(self.is_npc().to_string()),
            "uuid" => TagValue::from_option(self.uuid().map(|id| id.to_string())),
            "eid" => TagValue::from_option(
                self.read_live(|native| native.is_valid().then(|| native.entity_id.to_string()))
                    .flatten(),
            ),
            "script" => TagValue::from_option(self.entity_script.clone()),
            "name" => TagValue::Value(self.name()),
            "location" => TagValue::from_option(self.location().map(|l| l.identify())),
            "world" => TagValue::from_option(self.location().map(|l| l.world)),
            "describe" => TagValue::Value(self.describe(denizen)),
            "item_in_hand" => TagValue::from_option(
                self.item_in_hand(denizen).map(|item| ItemStack::identify_slot(item.as_ref())),
            ),
            "item_in_offhand" => TagValue::from_option(
                self.item_in_offhand(denizen).map(|item| ItemStack::identify_slot(item.as_ref())),
            ),
            "equipment" => TagValue::from_option(
                self.read_live(|native| {
                    native.living().map(|living| {
                        living
                            .armor
                            .iter()
                            .map(|slot| ItemStack::identify_slot(slot.as_ref()))
                            .collect::<Vec<_>>()
                            .join("|")
                    })
                })
                .flatten(),
            ),
            "target_block" => {
                let range = match param.map(|p| (p, p.trim().parse::<f64>())) {
                    None => DEFAULT_TARGET_RANGE,
                    Some((_, Ok(range))) if range.is_finite() && range > 0.0 => range,
                    Some((raw, _)) => {
                        error!("Invalid target_block range '{}'", raw);
                        return Some(TagValue::Empty);
                    }
                };
                TagValue::from_option(self.target_block(denizen, range).map(|l| l.identify()))
            }
            "has_line_of_sight" => {
                match param.and_then(|p| super::value_of(p, denizen)) {
                    Some(other) if self.is_spawned() && other.is_spawned() => {
                        TagValue::Value(self.has_line_of_sight(denizen, &other).to_string())
                    }
                    _ => TagValue::Empty,
                }
            }
            _ => return None,
        };
        Some(value)
    }

    /// Main-hand item of a living entity; `Some(None)` is an empty hand
    pub fn item_in_hand(&self, denizen: &Denizen) -> Option<Option<ItemStack>> {
        let helper = denizen.nms.entity_helper();
        self.read_live(|native| native.is_living().then(|| helper.get_item_in_hand(native)))
            .flatten()
    }

    pub fn item_in_offhand(&self, denizen: &Denizen) -> Option<Option<ItemStack>> {
        let helper = denizen.nms.entity_helper();
        self.read_live(|native| native.is_living().then(|| helper.get_item_in_offhand(native)))
            .flatten()
    }

    /// Whether both entities are spawned in the same world with no solid block between them
    pub fn has_line_of_sight(&self, denizen: &Denizen, other: &EntityTag) -> bool {
        match (self.entity(), other.entity()) {
            (Some(from), Some(to)) => line_of_sight(denizen, &from, &to),
            _ => false,
        }
    }

    /// First solid block within range along the look direction.
    /// The range is capped at 200 blocks.
    pub fn target_block(&self, denizen: &Denizen, range: f64) -> Option<Location> {
        if range.is_nan() || range <= 0.0 {
            return None;
        }
        let range = range.min(MAX_TARGET_RANGE);
        let handle = self.entity()?;
        let native = handle.read();
        if !native.is_valid() {
            return None;
        }
        let world = denizen.server.get_world(&native.location.world)?;
        denizen.nms.entity_helper().get_target_block(&world, &native, range)
    }

    /// Apply a mechanism to a unique entity: built-ins, then properties
    pub(super) fn apply_mechanism(&self, denizen: &Denizen, mechanism: &Mechanism) -> Result<(), EntityError> {
        if let Some(result) = self.apply_builtin(denizen, mechanism) {
            return result;
        }
        match denizen.properties.find(&mechanism.name, self, denizen) {
            Some(property) => {
                if !mechanism.has_value() && !property.nullable() {
                    return Err(EntityError::invalid_mechanism(&mechanism.name, "a value is required"));
                }
                property.set(self, denizen, mechanism)
            }
            None if denizen.properties.has(&mechanism.name) => Err(EntityError::invalid_mechanism(
                &mechanism.name,
                format!("does not apply to {}", self.entity_type.name()),
            )),
            None => Err(EntityError::UnknownMechanism(mechanism.name.clone())),
        }
    }

    fn apply_builtin(&self, denizen: &Denizen, mechanism: &Mechanism) -> Option<Result<(), EntityError>> {
        let result = match mechanism.name.as_str() {
            "item_in_hand" | "item_in_offhand" => self.set_hand_item(denizen, mechanism),
            "equipment" => self.set_equipment(mechanism),
            "velocity" => mechanism
                .require_vector()
                .and_then(|velocity| self.with_live(mechanism, |h| h.write().velocity = velocity)),
            "glowing" => mechanism
                .require_bool()
                .and_then(|glowing| self.with_live(mechanism, |h| h.write().glowing = glowing)),
            "swimming" => self.set_swimming(denizen, mechanism),
            "passenger" => self.add_passenger(denizen, mechanism),
            "remove_passengers" => self.remove_passengers(denizen, mechanism),
            _ => return None,
        };
        Some(result)
    }

    fn with_live(&self, mechanism: &Mechanism, f: impl FnOnce(&EntityHandle)) -> Result<(), EntityError> {
        let handle = self
            .entity()
            .ok_or_else(|| EntityError::invalid_mechanism(&mechanism.name, "entity is not spawned"))?;
        f(&handle);
        Ok(())
    }

    fn set_hand_item(&self, denizen: &Denizen, mechanism: &Mechanism) -> Result<(), EntityError> {
        let item = mechanism.require_item_slot()?;
        let handle = self
            .entity()
            .ok_or_else(|| EntityError::invalid_mechanism(&mechanism.name, "entity is not spawned"))?;
        let helper = denizen.nms.entity_helper();
        let mut native = handle.write();
        let accepted = if mechanism.name == "item_in_hand" {
            helper.set_item_in_hand(&mut native, item)
        } else {
            helper.set_item_in_offhand(&mut native, item)
        };
        if !accepted {
            return Err(EntityError::invalid_mechanism(&mechanism.name, "entity cannot hold items"));
        }
        Ok(())
    }

    /// `boots|leggings|chestplate|helmet`
    fn set_equipment(&self, mechanism: &Mechanism) -> Result<(), EntityError> {
        let items = mechanism.require_item_list()?;
        let armor: [Option<ItemStack>; 4] = items.try_into().map_err(|items: Vec<_>| {
            EntityError::invalid_mechanism(
                &mechanism.name,
                format!("expected 4 armor slots, got {}", items.len()),
            )
        })?;
        let handle = self
            .entity()
            .ok_or_else(|| EntityError::invalid_mechanism(&mechanism.name, "entity is not spawned"))?;
        let mut native = handle.write();
        let living = native
            .living_mut()
            .ok_or_else(|| EntityError::invalid_mechanism(&mechanism.name, "entity is not living"))?;
        living.armor = armor;
        Ok(())
    }

    fn set_swimming(&self, denizen: &Denizen, mechanism: &Mechanism) -> Result<(), EntityError> {
        if !denizen.nms.is_at_least(V1_13_2) {
            return Err(EntityError::invalid_mechanism(
                &mechanism.name,
                format!("requires 1.13.2 or newer, server is {}", denizen.nms.version()),
            ));
        }
        let swimming = mechanism.require_bool()?;
        let handle = self
            .entity()
            .ok_or_else(|| EntityError::invalid_mechanism(&mechanism.name, "entity is not spawned"))?;
        let mut native = handle.write();
        let living = native
            .living_mut()
            .ok_or_else(|| EntityError::invalid_mechanism(&mechanism.name, "entity is not living"))?;
        living.swimming = swimming;
        Ok(())
    }

    fn add_passenger(&self, denizen: &Denizen, mechanism: &Mechanism) -> Result<(), EntityError> {
        let passenger_id = mechanism.require_uuid()?;
        let vehicle = self
            .entity()
            .ok_or_else(|| EntityError::invalid_mechanism(&mechanism.name, "entity is not spawned"))?;
        let vehicle_id = vehicle.read().uuid;
        if passenger_id == vehicle_id {
            return Err(EntityError::invalid_mechanism(&mechanism.name, "an entity cannot ride itself"));
        }
        let passenger = super::get_entity_for_id(passenger_id, denizen).ok_or_else(|| {
            EntityError::invalid_mechanism(&mechanism.name, format!("no entity with uuid {}", passenger_id))
        })?;
        let location = vehicle.read().location.clone();
        {
            let mut rider = passenger.write();
            rider.vehicle = Some(vehicle_id);
            rider.location = location;
        }
        let mut native = vehicle.write();
        if !native.passengers.contains(&passenger_id) {
            native.passengers.push(passenger_id);
        }
        Ok(())
    }

    fn remove_passengers(&self, denizen: &Denizen, mechanism: &Mechanism) -> Result<(), EntityError> {
        let vehicle = self
            .entity()
            .ok_or_else(|| EntityError::invalid_mechanism(&mechanism.name, "entity is not spawned"))?;
        let passengers = std::mem::take(&mut vehicle.write().passengers);
        for id in passengers {
            if let Some(rider) = super::get_entity_for_id(id, denizen) {
                rider.write().vehicle = None;
            }
        }
        Ok(())
    }
}

fn line_of_sight(denizen: &Denizen, from: &EntityHandle, to: &EntityHandle) -> bool {
    let from = from.read();
    let to = to.read();
    if !from.location.world.eq_ignore_ascii_case(&to.location.world) {
        return false;
    }
    match denizen.server.get_world(&from.location.world) {
        Some(world) => denizen.nms.entity_helper().has_line_of_sight(&world, &from, &to),
        None => false,
    }
}

//! Provider for 1.19 through 1.20.4
//!
//! Items use the legacy layout: a `Count` byte and the display name under
//! `tag.display.Name`. Attribute entries are `Name`/`Base` pairs with the
//! `generic.` prefixed ids.

use std::sync::OnceLock;

use serde_json::{json, Value};
use uuid::Uuid;

use super::interfaces::{
    build_fake_player, clear_path, eye_location, parse_text_component, raycast_block,
    spawn_fake_arrow_in, strip_namespace, sync_riders, text_component, EntityHelper,
    FakeEntityHelper, ItemHelper, NmsProvider, PlayerDataHelper,
};
use super::version::{NmsVersion, V1_19, V1_20_5};
use super::NmsError;
use crate::host::{Compound, EntityHandle, ItemStack, Location, NativeEntity, Server, World};

const RAYCAST_STEP: f64 = 0.1;

const MAX_HEALTH_ID: &str = "minecraft:generic.max_health";

/// Largest stack a `Count` byte can hold
const MAX_COUNT: u32 = i8::MAX as u32;

/// Legacy compound provider
#[derive(Debug, Default)]
pub struct Provider {
    fake_player: OnceLock<EntityHandle>,
}

impl Provider {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NmsProvider for Provider {
    fn name(&self) -> &'static str {
        "v1_20"
    }

    fn supports(&self, version: NmsVersion) -> bool {
        version.is_at_least(V1_19) && version < V1_20_5
    }

    fn entity_helper(&self) -> &dyn EntityHelper {
        self
    }

    fn item_helper(&self) -> &dyn ItemHelper {
        self
    }

    fn player_data_helper(&self) -> &dyn PlayerDataHelper {
        self
    }

    fn fake_entity_helper(&self) -> &dyn FakeEntityHelper {
        self
    }
}

impl EntityHelper for Provider {
    fn get_entity(&self, world: &World, id: Uuid) -> Option<EntityHandle> {
        world.get_entity(id).filter(|e| e.read().is_valid())
    }

    fn get_item_in_hand(&self, entity: &NativeEntity) -> Option<ItemStack> {
        entity.living().and_then(|l| l.main_hand.clone())
    }

    fn set_item_in_hand(&self, entity: &mut NativeEntity, item: Option<ItemStack>) -> bool {
        let Some(living) = entity.living_mut() else {
            return false;
        };
        living.main_hand = item;
        true
    }

    fn get_item_in_offhand(&self, entity: &NativeEntity) -> Option<ItemStack> {
        entity.living().and_then(|l| l.off_hand.clone())
    }

    fn set_item_in_offhand(&self, entity: &mut NativeEntity, item: Option<ItemStack>) -> bool {
        let Some(living) = entity.living_mut() else {
            return false;
        };
        living.off_hand = item;
        true
    }

    fn get_target_block(&self, world: &World, entity: &NativeEntity, range: f64) -> Option<Location> {
        let eye = eye_location(entity);
        raycast_block(world, &eye, eye.direction(), range, RAYCAST_STEP)
    }

    fn has_line_of_sight(&self, world: &World, from: &NativeEntity, to: &NativeEntity) -> bool {
        clear_path(world, &eye_location(from), &eye_location(to), RAYCAST_STEP)
    }

    fn get_custom_name(&self, entity: &NativeEntity) -> Option<String> {
        entity.custom_name.clone()
    }

    fn set_custom_name(&self, entity: &mut NativeEntity, name: Option<&str>) {
        entity.custom_name = name.filter(|n| !n.is_empty()).map(str::to_string);
    }

    fn force_position_sync(&self, server: &Server, vehicle: &EntityHandle) {
        sync_riders(server, vehicle);
    }
}

impl ItemHelper for Provider {
    fn to_compound(&self, item: &ItemStack) -> Compound {
        let mut compound = Compound::new();
        compound.insert("id".into(), json!(item.namespaced_id()));
        compound.insert("Count".into(), json!(item.quantity.min(MAX_COUNT)));
        if let Some(name) = &item.display_name {
            compound.insert(
                "tag".into(),
                json!({ "display": { "Name": text_component(name) } }),
            );
        }
        compound
    }

    fn from_compound(&self, compound: &Compound) -> Result<ItemStack, NmsError> {
        let id = compound
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| NmsError::InvalidCompound("item without id".into()))?;
        let count = match compound.get("Count") {
            Some(v) => v
                .as_i64()
                .and_then(|c| u32::try_from(c).ok())
                .filter(|c| *c <= MAX_COUNT)
                .ok_or_else(|| NmsError::InvalidCompound(format!("bad Count {}", v)))?,
            None => 1,
        };
        let mut item = ItemStack::new(&strip_namespace(id)?).with_quantity(count);
        if let Some(name) = compound
            .get("tag")
            .and_then(|t| t.get("display"))
            .and_then(|d| d.get("Name"))
            .and_then(Value::as_str)
        {
            item.display_name = Some(parse_text_component(name));
        }
        Ok(item)
    }
}

impl PlayerDataHelper for Provider {
    fn max_health_id(&self) -> &'static str {
        MAX_HEALTH_ID
    }

    fn read_max_health(&self, attributes: &[Value]) -> Option<f64> {
        attributes
            .iter()
            .find(|a| a.get("Name").and_then(Value::as_str) == Some(MAX_HEALTH_ID))
            .and_then(|a| a.get("Base"))
            .and_then(Value::as_f64)
    }

    fn write_max_health(&self, attributes: &mut Vec<Value>, value: f64) {
        attributes.retain(|a| a.get("Name").and_then(Value::as_str) != Some(MAX_HEALTH_ID));
        attributes.push(json!({ "Name": MAX_HEALTH_ID, "Base": value }));
    }
}

impl FakeEntityHelper for Provider {
    fn fake_player(&self, server: &Server) -> EntityHandle {
        self.fake_player
            .get_or_init(|| build_fake_player(server).into_handle())
            .clone()
    }

    fn spawn_fake_arrow(&self, world: &World, location: &Location) -> EntityHandle {
        spawn_fake_arrow_in(world, location)
    }
}

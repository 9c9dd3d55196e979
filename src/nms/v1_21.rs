//! Provider for 1.20.5 through 1.21.x
//!
//! Items are stored with data components (`count`, `components`), and
//! attributes use the unprefixed ids introduced with them.

use std::sync::OnceLock;

use serde_json::{json, Value};
use uuid::Uuid;

use super::interfaces::{
    build_fake_player, clear_path, eye_location, parse_text_component, raycast_block,
    spawn_fake_arrow_in, strip_namespace, sync_riders, text_component, EntityHelper,
    FakeEntityHelper, ItemHelper, NmsProvider, PlayerDataHelper,
};
use super::version::{NmsVersion, V1_20_5};
use super::NmsError;
use crate::host::{Compound, EntityHandle, ItemStack, Location, NativeEntity, Server, World};

const RAYCAST_STEP: f64 = 0.05;

const MAX_HEALTH_ID: &str = "minecraft:max_health";

const CUSTOM_NAME_COMPONENT: &str = "minecraft:custom_name";

/// Data-component era provider
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
        "v1_21"
    }

    fn supports(&self, version: NmsVersion) -> bool {
        version.is_at_least(V1_20_5) && version < NmsVersion::new(1, 22, 0)
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
        match entity.living_mut() {
            Some(living) => {
                living.main_hand = item;
                true
            }
            None => false,
        }
    }

    fn get_item_in_offhand(&self, entity: &NativeEntity) -> Option<ItemStack> {
        entity.living().and_then(|l| l.off_hand.clone())
    }

    fn set_item_in_offhand(&self, entity: &mut NativeEntity, item: Option<ItemStack>) -> bool {
        match entity.living_mut() {
            Some(living) => {
                living.off_hand = item;
                true
            }
            None => false,
        }
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
        compound.insert("count".into(), json!(item.quantity));
        if let Some(name) = &item.display_name {
            let mut components = Compound::new();
            components.insert(CUSTOM_NAME_COMPONENT.into(), json!(text_component(name)));
            compound.insert("components".into(), Value::Object(components));
        }
        compound
    }

    fn from_compound(&self, compound: &Compound) -> Result<ItemStack, NmsError> {
        let id = compound
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| NmsError::InvalidCompound("item without id".into()))?;
        let count = match compound.get("count") {
            Some(v) => v
                .as_u64()
                .and_then(|c| u32::try_from(c).ok())
                .ok_or_else(|| NmsError::InvalidCompound(format!("bad count {}", v)))?,
            None => 1,
        };
        let mut item = ItemStack::new(&strip_namespace(id)?).with_quantity(count);
        if let Some(name) = compound
            .get("components")
            .and_then(|c| c.get(CUSTOM_NAME_COMPONENT))
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
            .find(|a| a.get("id").and_then(Value::as_str) == Some(MAX_HEALTH_ID))
            .and_then(|a| a.get("base"))
            .and_then(Value::as_f64)
    }

    fn write_max_health(&self, attributes: &mut Vec<Value>, value: f64) {
        attributes.retain(|a| a.get("id").and_then(Value::as_str) != Some(MAX_HEALTH_ID));
        attributes.push(json!({ "id": MAX_HEALTH_ID, "base": value }));
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

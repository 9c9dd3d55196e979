//! Property scenario tests
//!
//! Tests reads and writes through the property registry, version gating and
//! registration of additional properties

use std::sync::Arc;

use denizen::objects::{EntityError, EntityProperty, EntityTag, Mechanism, TagValue};
use denizen::Denizen;

use crate::harness::TestHost;

fn value(s: &str) -> TagValue {
    TagValue::Value(s.to_string())
}

/// Test: custom names read back and show up in describe
#[test]
fn test_custom_name() {
    let host = TestHost::start();
    let d = &host.denizen;

    let mut cow = host.spawn("cow");
    assert_eq!(cow.get_attribute(d, "custom_name"), TagValue::Empty);

    cow.adjust(d, Mechanism::with_value("custom_name", "Bessie")).unwrap();
    assert_eq!(cow.get_attribute(d, "custom_name"), value("Bessie"));
    assert_eq!(cow.get_attribute(d, "name"), value("Bessie"));
    assert!(cow.describe(d).starts_with("e@cow[custom_name=Bessie;"));

    // an empty value clears the name
    cow.adjust(d, Mechanism::with_value("custom_name", "")).unwrap();
    assert_eq!(cow.get_attribute(d, "custom_name"), TagValue::Empty);
    assert_eq!(cow.name(), "cow");
}

/// Test: health is clamped to max health and must not be negative
#[test]
fn test_health_and_max_health() {
    let host = TestHost::start();
    let d = &host.denizen;

    let mut zombie = host.spawn("zombie");
    assert_eq!(zombie.get_attribute(d, "health"), value("20"));

    zombie.adjust(d, Mechanism::with_value("health", "100")).unwrap();
    assert_eq!(zombie.get_attribute(d, "health"), value("20"));

    zombie.adjust(d, Mechanism::with_value("health", "7.5")).unwrap();
    assert_eq!(zombie.get_attribute(d, "health"), value("7.5"));

    let err = zombie
        .adjust(d, Mechanism::with_value("health", "-1"))
        .unwrap_err();
    assert!(matches!(err, EntityError::InvalidMechanism { .. }));
    assert_eq!(zombie.get_attribute(d, "health"), value("7.5"));

    zombie.adjust(d, Mechanism::with_value("max_health", "5")).unwrap();
    assert_eq!(zombie.get_attribute(d, "max_health"), value("5"));
    assert_eq!(zombie.get_attribute(d, "health"), value("5"));

    let err = zombie
        .adjust(d, Mechanism::with_value("health", "lots"))
        .unwrap_err();
    assert!(matches!(err, EntityError::InvalidMechanism { .. }));
}

/// Test: health_data seeds before spawn, then reads and writes `current/max`
#[test]
fn test_health_data() {
    let host = TestHost::start();
    let d = &host.denizen;

    let mut zombie = host.spawn("zombie[health_data=5/10]");
    assert_eq!(zombie.get_attribute(d, "health"), value("5"));
    assert_eq!(zombie.get_attribute(d, "max_health"), value("10"));
    assert_eq!(zombie.get_attribute(d, "health_data"), value("5/10"));

    zombie.adjust(d, Mechanism::with_value("health_data", "3/8")).unwrap();
    assert_eq!(zombie.get_attribute(d, "health_data"), value("3/8"));

    zombie.adjust(d, Mechanism::with_value("health_data", "30/12.5")).unwrap();
    assert_eq!(zombie.get_attribute(d, "health_data"), value("12.5/12.5"));

    for bad in ["3", "3/0", "-1/8", "a/b"] {
        let err = zombie
            .adjust(d, Mechanism::with_value("health_data", bad))
            .unwrap_err();
        assert!(matches!(err, EntityError::InvalidMechanism { .. }), "{}", bad);
    }
    assert_eq!(zombie.get_attribute(d, "health_data"), value("12.5/12.5"));

    let mut cart = host.spawn("minecart");
    assert!(cart
        .adjust(d, Mechanism::with_value("health_data", "1/2"))
        .is_err());
}

/// Test: health does not apply to non-living entities
#[test]
fn test_health_on_minecart() {
    let host = TestHost::start();
    let d = &host.denizen;

    let mut cart = host.spawn("minecart");
    let err = cart
        .adjust(d, Mechanism::with_value("health", "5"))
        .unwrap_err();
    match err {
        EntityError::InvalidMechanism { name, reason } => {
            assert_eq!(name, "health");
            assert_eq!(reason, "does not apply to minecart");
        }
        other => panic!("unexpected error {:?}", other),
    }
}

/// Test: age keywords and numbers, only on ageable entities
#[test]
fn test_age() {
    let host = TestHost::start();
    let d = &host.denizen;

    let mut pig = host.spawn("pig");
    assert_eq!(pig.get_attribute(d, "age"), value("0"));

    pig.adjust(d, Mechanism::with_value("age", "baby")).unwrap();
    assert_eq!(pig.get_attribute(d, "age"), value("-24000"));

    pig.adjust(d, Mechanism::with_value("age", "Adult")).unwrap();
    assert_eq!(pig.get_attribute(d, "age"), value("0"));

    pig.adjust(d, Mechanism::with_value("age", "-100")).unwrap();
    assert_eq!(pig.get_attribute(d, "age"), value("-100"));

    assert!(pig.adjust(d, Mechanism::with_value("age", "old")).is_err());

    let mut zombie = host.spawn("zombie");
    assert!(matches!(
        zombie.adjust(d, Mechanism::with_value("age", "baby")),
        Err(EntityError::InvalidMechanism { .. })
    ));
}

/// Test: wolf variants exist on 1.20.5 and later only
#[test]
fn test_wolf_variant_is_version_gated() {
    let host = TestHost::start();
    let d = &host.denizen;

    let mut wolf = host.spawn("wolf");
    assert_eq!(wolf.get_attribute(d, "variant"), value("pale"));
    wolf.adjust(d, Mechanism::with_value("variant", "minecraft:ASHEN"))
        .unwrap();
    assert_eq!(wolf.get_attribute(d, "variant"), value("ashen"));
    assert!(wolf.describe(d).contains("variant=ashen"));
    assert!(wolf
        .adjust(d, Mechanism::with_value("variant", "purple"))
        .is_err());

    let old = TestHost::builder().version("1.20.4-R0.1-SNAPSHOT").build();
    let od = &old.denizen;
    let mut old_wolf = old.spawn("wolf");
    assert!(matches!(
        old_wolf.adjust(od, Mechanism::with_value("variant", "ashen")),
        Err(EntityError::InvalidMechanism { .. })
    ));
    assert_eq!(
        old_wolf.get_attribute(od, "variant"),
        TagValue::Fallback(old_wolf.identify(od))
    );
    assert!(!old_wolf.describe(od).contains("variant"));
}

/// Test: arrow potion types accept namespaced keys and clear without a value
#[test]
fn test_potion_type() {
    let host = TestHost::start();
    let d = &host.denizen;

    let mut arrow = host.spawn("arrow");
    assert_eq!(arrow.get_attribute(d, "potion_type"), TagValue::Empty);

    arrow
        .adjust(d, Mechanism::with_value("potion_type", "minecraft:strength"))
        .unwrap();
    assert_eq!(arrow.get_attribute(d, "potion_type"), value("strength"));

    assert!(arrow
        .adjust(d, Mechanism::with_value("potion_type", "lava"))
        .is_err());
    assert_eq!(arrow.get_attribute(d, "potion_type"), value("strength"));

    arrow.adjust(d, Mechanism::new("potion_type", None)).unwrap();
    assert_eq!(arrow.get_attribute(d, "potion_type"), TagValue::Empty);
}

/// Test: non-nullable properties require a value; unknown names are rejected
#[test]
fn test_mechanism_errors() {
    let host = TestHost::start();
    let d = &host.denizen;

    let mut zombie = host.spawn("zombie");
    match zombie.adjust(d, Mechanism::new("health", None)).unwrap_err() {
        EntityError::InvalidMechanism { reason, .. } => assert_eq!(reason, "a value is required"),
        other => panic!("unexpected error {:?}", other),
    }
    assert_eq!(
        zombie.adjust(d, Mechanism::with_value("flavor", "vanilla")),
        Err(EntityError::UnknownMechanism("flavor".to_string()))
    );
}

/// Test: built-in mechanisms on a live entity
#[test]
fn test_builtin_mechanisms() {
    let host = TestHost::start();
    let d = &host.denizen;

    let mut skeleton = host.spawn("skeleton");
    skeleton
        .adjust(d, Mechanism::with_value("item_in_hand", "bow"))
        .unwrap();
    assert_eq!(skeleton.get_attribute(d, "item_in_hand"), value("i@bow"));
    assert_eq!(skeleton.get_attribute(d, "item_in_offhand"), value("i@air"));

    skeleton
        .adjust(
            d,
            Mechanism::with_value("equipment", "iron_boots|air|air|iron_helmet"),
        )
        .unwrap();
    assert_eq!(
        skeleton.get_attribute(d, "equipment"),
        value("i@iron_boots|i@air|i@air|i@iron_helmet")
    );
    assert!(skeleton
        .adjust(d, Mechanism::with_value("equipment", "iron_boots|air"))
        .is_err());

    skeleton.adjust(d, Mechanism::new("glowing", None)).unwrap();
    let handle = skeleton.entity().unwrap();
    assert!(handle.read().glowing);
    skeleton
        .adjust(d, Mechanism::with_value("glowing", "false"))
        .unwrap();
    assert!(!handle.read().glowing);
}

/// Answers `tamed` for wolves from native data
struct EntityTamed;

impl EntityProperty for EntityTamed {
    fn id(&self) -> &'static str {
        "tamed"
    }

    fn describes(&self, entity: &EntityTag, _denizen: &Denizen) -> bool {
        entity.kind().name == "wolf"
    }

    fn get(&self, entity: &EntityTag, _denizen: &Denizen) -> Option<String> {
        let handle = entity.entity()?;
        let native = handle.read();
        Some(native.get_data("tamed").unwrap_or("false").to_string())
    }

    fn set(&self, entity: &EntityTag, _denizen: &Denizen, mechanism: &Mechanism) -> Result<(), EntityError> {
        let tamed = mechanism.require_bool()?;
        let handle = entity
            .entity()
            .ok_or_else(|| EntityError::invalid_mechanism("tamed", "entity is not spawned"))?;
        handle.write().set_data("tamed", Some(&tamed.to_string()));
        Ok(())
    }
}

/// Test: additional properties join reads, writes and describe
#[test]
fn test_register_custom_property() {
    let host = TestHost::start();
    let d = &host.denizen;

    d.properties.register(Arc::new(EntityTamed)).unwrap();
    assert!(d.properties.ids().contains(&"tamed"));

    let mut wolf = host.spawn("wolf");
    assert_eq!(wolf.get_attribute(d, "tamed"), value("false"));
    wolf.adjust(d, Mechanism::new("tamed", None)).unwrap();
    assert_eq!(wolf.get_attribute(d, "tamed"), value("true"));
    assert!(wolf.describe(d).ends_with("tamed=true]"));

    let mut cow = host.spawn("cow");
    assert!(matches!(
        cow.adjust(d, Mechanism::with_value("tamed", "true")),
        Err(EntityError::InvalidMechanism { .. })
    ));

    // queued on a generic wolf, applied on spawn
    let mut pup = host.parse("wolf[tamed=true;age=baby]");
    pup.spawn_at(d, &host.spawn_point()).unwrap();
    assert_eq!(pup.get_attribute(d, "tamed"), value("true"));
    assert_eq!(pup.get_attribute(d, "age"), value("-24000"));
}

/// Test: property ids are unique
#[test]
fn test_duplicate_property_rejected() {
    let host = TestHost::start();
    let d = &host.denizen;

    struct Shadow;
    impl EntityProperty for Shadow {
        fn id(&self) -> &'static str {
            "health"
        }
        fn describes(&self, _: &EntityTag, _: &Denizen) -> bool {
            true
        }
        fn get(&self, _: &EntityTag, _: &Denizen) -> Option<String> {
            None
        }
        fn set(&self, _: &EntityTag, _: &Denizen, _: &Mechanism) -> Result<(), EntityError> {
            Ok(())
        }
    }

    let before = d.properties.ids().len();
    assert!(matches!(
        d.properties.register(Arc::new(Shadow)),
        Err(EntityError::InvalidOperation(_))
    ));
    assert_eq!(d.properties.ids().len(), before);
}

/// Test: raycast and line of sight over the world block table
#[test]
fn test_target_block_and_line_of_sight() {
    let host = TestHost::start();
    let d = &host.denizen;

    let mut watcher = host.parse("zombie");
    watcher.spawn_at(d, &host.at(0.5, 64.0, 0.5)).unwrap();
    let mut target = host.parse("zombie");
    target.spawn_at(d, &host.at(0.5, 64.0, 10.5)).unwrap();

    assert!(watcher.target_block(d, 20.0).is_none());
    assert!(watcher.has_line_of_sight(d, &target));

    host.world("world").set_block((0, 65, 5), "stone");
    let hit = watcher.target_block(d, 20.0).unwrap();
    assert_eq!(hit.block(), (0, 65, 5));
    assert!(watcher.target_block(d, 3.0).is_none());
    assert!(!watcher.has_line_of_sight(d, &target));
    assert_eq!(
        watcher.get_attribute(d, &format!("has_line_of_sight[{}]", target.identify(d))),
        value("false")
    );

    let generic = host.parse("zombie");
    assert!(!watcher.has_line_of_sight(d, &generic));
    assert!(generic.target_block(d, 20.0).is_none());
}

/// Test: target_block ranges are validated and capped
#[test]
fn test_target_block_range_bounds() {
    let host = TestHost::start();
    let d = &host.denizen;
    let world = host.world("world");

    let mut watcher = host.parse("zombie");
    watcher.spawn_at(d, &host.at(0.5, 64.0, 0.5)).unwrap();

    for bad in ["inf", "-inf", "NaN", "-5", "0", "far"] {
        assert_eq!(
            watcher.get_attribute(d, &format!("target_block[{}]", bad)),
            TagValue::Empty,
            "{}",
            bad
        );
    }
    assert!(watcher.target_block(d, f64::NAN).is_none());

    world.set_block((0, 65, 150), "stone");
    assert_eq!(watcher.target_block(d, 1e9).unwrap().block(), (0, 65, 150));
    assert_eq!(watcher.target_block(d, f64::INFINITY).unwrap().block(), (0, 65, 150));

    world.set_block((0, 65, 150), "air");
    world.set_block((0, 65, 250), "stone");
    assert!(watcher.target_block(d, 1e9).is_none());
}

/// Test: hand items read directly, `None` for entities that cannot hold them
#[test]
fn test_item_in_hand_accessors() {
    let host = TestHost::start();
    let d = &host.denizen;

    let mut skeleton = host.spawn("skeleton");
    assert_eq!(skeleton.item_in_hand(d), Some(None));
    skeleton
        .adjust(d, Mechanism::with_value("item_in_hand", "bow"))
        .unwrap();
    let held = skeleton.item_in_hand(d).flatten().unwrap();
    assert_eq!(held.material, "bow");
    assert_eq!(skeleton.item_in_offhand(d), Some(None));

    let minecart = host.spawn("minecart");
    assert_eq!(minecart.item_in_hand(d), None);
}

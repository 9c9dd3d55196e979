//! Registry scenario tests
//!
//! Tests the live object registry and the entity type registry

use std::sync::Arc;

use denizen::host::{Category, EntityHandle, EntityKind, Location, NativeEntity};
use denizen::objects::{self, Constructor, EntityError, EntityTag, EntityType, SpawnContext};
use uuid::Uuid;

use crate::harness::TestHost;

/// Test: a remembered entity is unique and resolvable even when the host does not know it
#[test]
fn test_remembered_entity_resolves() {
    let host = TestHost::builder().unloaded_world("nether").build();
    let d = &host.denizen;

    let zombie = d.types.get("zombie").unwrap();
    let handle = host
        .world("nether")
        .spawn(zombie.kind().clone(), &Location::new("nether", 0.0, 64.0, 0.0));
    let uuid = handle.read().uuid;
    assert!(!handle.read().is_valid());

    let detached = EntityTag::from_entity(d, handle.clone());
    assert!(detached.is_generic(d));
    assert_eq!(detached.identify(d), "e@zombie");
    assert!(objects::get_entity_for_id(uuid, d).is_none());
    assert!(EntityTag::value_of(&uuid.to_string(), d).is_none());

    assert_eq!(d.remembered.remember_entity(&handle), uuid);
    assert!(detached.is_unique(d));
    assert_eq!(detached.identify(d), format!("e@{}", uuid));
    let found = objects::get_entity_for_id(uuid, d).unwrap();
    assert!(Arc::ptr_eq(&found, &handle));
    let parsed = host.parse(&format!("e@{}", uuid));
    assert_eq!(parsed.uuid(), Some(uuid));
    assert!(!parsed.is_spawned());

    assert!(d.remembered.forget(uuid).is_some());
    assert!(d.remembered.forget(uuid).is_none());
    assert!(detached.is_generic(d));
    assert!(objects::get_entity_for_id(uuid, d).is_none());
}

/// Test: remembering under a different id still resolves by that id
#[test]
fn test_remember_under_alias() {
    let host = TestHost::start();
    let d = &host.denizen;

    let cow = host.spawn("cow");
    let alias = Uuid::new_v4();
    d.remembered.remember(alias, cow.entity().unwrap());
    assert_eq!(d.remembered.len(), 1);

    let found = host.parse(&alias.to_string());
    assert_eq!(found.uuid(), cow.uuid());
    d.remembered.forget(alias);
    assert!(d.remembered.is_empty());
}

/// Test: the builtin registry holds vanilla and custom types
#[test]
fn test_builtin_type_registry() {
    let host = TestHost::start();
    let d = &host.denizen;

    assert!(d.types.is_registered("ZOMBIE"));
    assert!(d.types.get("falling_block").unwrap().is_custom());
    assert!(d.types.get("fake_arrow").unwrap().is_custom());
    assert!(!d.types.get("cow").unwrap().is_custom());
    let names = d.types.names();
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted);
    assert_eq!(names.len(), d.types.len());
}

/// Test: native kinds with no registered type are wrapped, not rejected
#[test]
fn test_unregistered_kind() {
    let host = TestHost::start();
    let d = &host.denizen;

    let kind = EntityKind::new("sniffer_ghost", Category::Creature, true);
    let handle = host.world("world").spawn(kind.clone(), &host.spawn_point());
    let tag = EntityTag::from_entity(d, handle);
    assert!(!tag.entity_type().is_registered());
    assert_eq!(tag.entity_type().name(), "sniffer_ghost");
    assert!(tag.is_spawned());
    assert!(tag.matches("sniffer_ghost"));
    assert!(EntityTag::value_of("sniffer_ghost", d).is_none());
}

fn ghost_constructor() -> Constructor {
    Arc::new(|ctx: &SpawnContext<'_>| {
        let world = ctx.denizen.server.get_world(&ctx.location.world)?;
        let mut native = NativeEntity::new(ctx.kind.clone(), ctx.location.clone());
        native.set_data("haunts", ctx.data1);
        Some(world.spawn_with(native))
    })
}

/// Test: additional types parse, spawn through their constructor and stay unique by name
#[test]
fn test_register_custom_type() {
    let host = TestHost::start();
    let d = &host.denizen;

    let kind = EntityKind::new("ghost", Category::Other, false);
    d.types
        .register(EntityType::custom("Ghost", kind.clone(), ghost_constructor()))
        .unwrap();
    assert!(matches!(
        d.types
            .register(EntityType::custom("ghost", kind, ghost_constructor())),
        Err(EntityError::InvalidOperation(_))
    ));
    assert!(objects::matches("e@ghost,attic", d));

    let ghost = host.spawn("ghost,attic");
    let handle = ghost.entity().unwrap();
    assert_eq!(handle.read().get_data("haunts"), Some("attic"));
    assert_eq!(ghost.entity_type().name(), "ghost");
}

/// Test: a constructor that builds nothing fails the spawn and keeps the queue
#[test]
fn test_failing_constructor() {
    let host = TestHost::start();
    let d = &host.denizen;

    let never: Constructor = Arc::new(|_: &SpawnContext<'_>| -> Option<EntityHandle> { None });
    d.types
        .register(EntityType::custom(
            "phantom_wisp",
            EntityKind::new("phantom_wisp", Category::Other, false),
            never,
        ))
        .unwrap();

    let mut wisp = host.parse("phantom_wisp[custom_name=Wisp]");
    assert!(matches!(
        wisp.spawn_at(d, &host.spawn_point()),
        Err(EntityError::Spawn(_))
    ));
    assert!(wisp.is_generic(d));
    assert_eq!(wisp.waiting_mechanisms().len(), 1);
    assert_eq!(wisp.identify(d), "e@phantom_wisp[custom_name=Wisp]");
}

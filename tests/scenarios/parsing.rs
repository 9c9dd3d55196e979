//! Parsing scenario tests
//!
//! Tests every grammar form, the identify round trip and kind-of matching

use denizen::host::{Category, EntityKind};
use denizen::objects::{self, EntityState, EntityTag, TagValue, RANDOM_EXCLUDED, SCRIPT_ID_KEY};
use denizen::scripts::EntityScriptContainer;
use uuid::Uuid;

use crate::harness::TestHost;

/// Test: type names with optional prefix and constructor data
#[test]
fn test_parse_type_forms() {
    let host = TestHost::start();
    let d = &host.denizen;

    let zombie = host.parse("e@ZOMBIE");
    assert_eq!(zombie.entity_type().name(), "zombie");
    assert!(zombie.is_generic(d));

    let block = host.parse("falling_block,stone");
    assert_eq!(block.data(), (Some("stone"), None));
    assert_eq!(block.identify(d), "e@falling_block,stone");

    assert!(EntityTag::value_of("unicorn", d).is_none());
    assert!(EntityTag::value_of("", d).is_none());
    assert!(EntityTag::value_of("zombie cow", d).is_none());
}

/// Test: falling block constructor data reaches the native entity
#[test]
fn test_falling_block_material() {
    let host = TestHost::start();
    let block = host.spawn("falling_block,stone,3");
    let handle = block.entity().unwrap();
    let native = handle.read();
    assert_eq!(native.get_data("material"), Some("stone"));
    assert_eq!(native.get_data("block_data"), Some("3"));
}

/// Test: random never picks an excluded type
#[test]
fn test_parse_random() {
    let host = TestHost::start();
    for _ in 0..1000 {
        let entity = host.parse("random");
        assert!(entity.is_generic(&host.denizen));
        assert!(!RANDOM_EXCLUDED.contains(&entity.entity_type().name()));
    }
}

/// Test: `e@<uuid>` and bare uuids resolve live entities
#[test]
fn test_parse_uuid_forms() {
    let host = TestHost::start();
    let d = &host.denizen;

    let cow = host.spawn("cow");
    let uuid = cow.uuid().unwrap();

    let by_prefix = host.parse(&format!("e@{}", uuid));
    assert!(by_prefix.is_spawned());
    assert_eq!(by_prefix.state(), EntityState::Spawned);
    assert_eq!(by_prefix.identify(d), cow.identify(d));

    let bare = host.parse(&uuid.to_string());
    assert_eq!(bare.uuid(), Some(uuid));
    assert_eq!(bare.entity_type().name(), "cow");

    assert!(EntityTag::value_of(&format!("e@{}", Uuid::new_v4()), d).is_none());
    assert!(EntityTag::value_of(&Uuid::new_v4().to_string(), d).is_none());
}

/// Test: online players by name or uuid
#[test]
fn test_parse_player() {
    let host = TestHost::start();
    let d = &host.denizen;

    let handle = host.join("Alex");
    let uuid = handle.read().uuid;

    let by_name = host.parse("p@alex");
    assert!(by_name.is_player());
    assert!(by_name.is_unique(d));
    assert_eq!(by_name.identify(d), format!("p@{}", uuid));
    assert_eq!(by_name.identify_simple(), "p@Alex");
    assert_eq!(by_name.name(), "Alex");

    let by_id = host.parse(&format!("p@{}", uuid));
    assert_eq!(by_id.identify(d), by_name.identify(d));

    // the player's own `p@` identity also parses through `e@` lookup
    let by_entity = host.parse(&format!("e@{}", uuid));
    assert!(by_entity.is_player());

    assert!(EntityTag::value_of("p@nobody", d).is_none());

    d.server.quit_player(uuid);
    assert!(EntityTag::value_of("p@alex", d).is_none());
}

/// Test: NPC ids resolve to proxies whether or not the NPC is spawned
#[test]
fn test_parse_npc() {
    let host = TestHost::start();
    let d = &host.denizen;

    let npc = d
        .npcs
        .create("Bob", EntityKind::new("villager", Category::Creature, true));
    let id = npc.read().id;

    let proxy = host.parse(&format!("n@{}", id));
    assert!(proxy.is_npc());
    assert_eq!(proxy.state(), EntityState::NpcProxy);
    assert!(!proxy.is_spawned());
    assert!(proxy.is_unique(d));
    assert_eq!(proxy.identify(d), format!("n@{}", id));
    assert_eq!(proxy.name(), "Bob");
    assert_eq!(proxy.entity_type().name(), "villager");

    d.npcs.spawn(&npc, &host.spawn_point(), &d.server).unwrap();
    let spawned = host.parse(&format!("N@{}", id));
    assert!(spawned.is_spawned());

    // the body resolves back to the NPC
    let body = host.parse(&format!("e@{}", spawned.uuid().unwrap()));
    assert!(body.is_npc());
    assert_eq!(body.identify(d), format!("n@{}", id));

    assert!(EntityTag::value_of("n@99", d).is_none());
    assert!(EntityTag::value_of("n@abc", d).is_none());
}

/// Test: described form queues every property in order
#[test]
fn test_described_form() {
    let host = TestHost::start();
    let d = &host.denizen;

    let wolf = host.parse("e@wolf[custom_name=Rex;age=baby]");
    assert!(wolf.is_generic(d));
    assert_eq!(wolf.waiting_mechanisms().len(), 2);
    assert_eq!(wolf.waiting_mechanisms()[0].name, "custom_name");
    assert_eq!(
        wolf.get_attribute(d, "custom_name"),
        TagValue::Value("Rex".to_string())
    );
    assert_eq!(wolf.identify(d), "e@wolf[custom_name=Rex;age=baby]");
}

/// Test: `;` in values survives identify and parse through the escape character
#[test]
fn test_described_escape_round_trip() {
    let host = TestHost::start();
    let d = &host.denizen;

    let cow = host.parse("e@cow[custom_name=a\u{2011}b]");
    assert_eq!(cow.waiting_mechanisms()[0].value.as_deref(), Some("a;b"));

    let identity = cow.identify(d);
    assert_eq!(identity, "e@cow[custom_name=a\u{2011}b]");
    let again = host.parse(&identity);
    assert_eq!(again.identify(d), identity);
    assert!(again.compares_to(&cow, d));

    let mut spawned = again;
    spawned.spawn_at(d, &host.spawn_point()).unwrap();
    assert_eq!(
        spawned.get_attribute(d, "custom_name"),
        TagValue::Value("a;b".to_string())
    );
}

/// Test: properties in a described form do not touch a spawned entity
#[test]
fn test_described_form_on_spawned_entity() {
    let host = TestHost::start();
    let d = &host.denizen;

    let cow = host.spawn("cow");
    let uuid = cow.uuid().unwrap();
    let parsed = host.parse(&format!("e@{}[custom_name=Ignored]", uuid));
    assert!(parsed.is_spawned());
    assert!(parsed.waiting_mechanisms().is_empty());
    assert_eq!(parsed.get_attribute(d, "custom_name"), TagValue::Empty);
}

/// Test: entity scripts build generic entities and bind on spawn
#[test]
fn test_script_form() {
    let host = TestHost::builder()
        .script(
            EntityScriptContainer::new("guard", "zombie")
                .with_mechanism("custom_name=Guard")
                .with_mechanism("max_health=40"),
        )
        .build();
    let d = &host.denizen;

    let mut guard = host.parse("e@Guard");
    assert_eq!(guard.entity_script(), Some("guard"));
    assert_eq!(guard.identify(d), "e@guard");
    assert_eq!(guard.identify_simple(), "e@guard");
    assert_eq!(guard.waiting_mechanisms().len(), 2);
    assert!(guard.matches("guard"));

    guard.spawn_at(d, &host.spawn_point()).unwrap();
    assert_eq!(guard.get_attribute(d, "custom_name"), TagValue::Value("Guard".into()));
    assert_eq!(guard.get_attribute(d, "max_health"), TagValue::Value("40".into()));
    assert_eq!(guard.get_attribute(d, "script"), TagValue::Value("guard".into()));
    let uuid = guard.uuid().unwrap();
    assert_eq!(guard.identify(d), format!("e@{}", uuid));

    let handle = guard.entity().unwrap();
    assert_eq!(
        handle.read().persistent.get(SCRIPT_ID_KEY).map(String::as_str),
        Some("guard")
    );

    let reparsed = host.parse(&uuid.to_string());
    assert_eq!(reparsed.entity_script(), Some("guard"));

    guard.remove(d).unwrap();
    assert!(handle.read().persistent.get(SCRIPT_ID_KEY).is_none());
}

/// Test: grammar matching without resolution
#[test]
fn test_matches_grammar() {
    let host = TestHost::builder()
        .script(EntityScriptContainer::new("boulder", "falling_block,stone"))
        .build();
    let d = &host.denizen;

    assert!(objects::matches("e@zombie", d));
    assert!(objects::matches("Zombie", d));
    assert!(objects::matches("random", d));
    assert!(objects::matches("n@5", d));
    assert!(objects::matches("p@someone", d));
    assert!(objects::matches("boulder", d));
    assert!(objects::matches("falling_block,sand", d));
    assert!(objects::matches("zombie[age=baby]", d));
    assert!(objects::matches(&Uuid::new_v4().to_string(), d));
    assert!(!objects::matches("unicorn", d));
    assert!(!objects::matches("unicorn[age=baby]", d));
}

/// Test: kind-of comparison is asymmetric
#[test]
fn test_compares_to() {
    let host = TestHost::start();
    let d = &host.denizen;

    let generic_zombie = host.parse("zombie");
    let other_generic = host.parse("zombie");
    let spawned_zombie = host.spawn("zombie");
    let cow = host.parse("cow");

    assert!(generic_zombie.compares_to(&other_generic, d));
    assert!(spawned_zombie.compares_to(&generic_zombie, d));
    assert!(!generic_zombie.compares_to(&spawned_zombie, d));
    assert!(spawned_zombie.compares_to(&spawned_zombie.clone(), d));
    assert!(!cow.compares_to(&generic_zombie, d));
}

/// Test: event matchers
#[test]
fn test_matches_pattern() {
    let host = TestHost::start();
    let d = &host.denizen;

    let cart = host.spawn("minecart");
    assert!(cart.matches("entity"));
    assert!(cart.matches("vehicle"));
    assert!(cart.matches("Minecart"));
    assert!(!cart.matches("living"));
    assert!(!cart.matches("player"));
    assert!(cart.matches(&cart.uuid().unwrap().to_string()));

    let mut pig = host.spawn("pig");
    pig.adjust(d, denizen::objects::Mechanism::with_value("custom_name", "Wilbur"))
        .unwrap();
    assert!(pig.matches("living"));
    assert!(pig.matches("wilbur"));
    assert!(!pig.matches("projectile"));

    let arrow = host.spawn("arrow");
    assert!(arrow.matches("projectile"));
}

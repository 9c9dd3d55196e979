//! Entity object grammar
//!
//! ```text
//! n@<npc id>                     NPC proxy
//! p@<uuid or name>               online player
//! e@<uuid> / <uuid>              live or remembered entity
//! e@<script name>                generic entity from an entity script
//! e@<type>[,data1[,data2]]       generic entity of a registered type
//! random                         generic entity of a random type
//! <any of the above>[k=v;k2=v2]  generic entity with queued mechanisms
//! ```
//!
//! The `e@` prefix is optional and every form is case-insensitive.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, error};
use uuid::Uuid;

use super::{EntityTag, PROPERTY_ESCAPE};
use crate::host::EntityHandle;
use crate::objects::Mechanism;
use crate::Denizen;

/// `base[properties]`
static DESCRIBED_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^([^\[\]]+)\[(.*)\]$").unwrap());

static ENTITY_BY_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^(n@|e@|p@)(.+)$").unwrap());

static ENTITY_WITH_DATA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\w+),?(\w+)?,?(\w+)?$").unwrap());

impl EntityTag {
    /// Parse an entity object string. See [`value_of`].
    pub fn value_of(input: &str, denizen: &Denizen) -> Option<EntityTag> {
        value_of(input, denizen)
    }
}

/// Parse an entity object string, resolving live entities.
/// Returns `None` (after logging why) when nothing matches.
pub fn value_of(input: &str, denizen: &Denizen) -> Option<EntityTag> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Some(caps) = DESCRIBED_REGEX.captures(input) {
        let mut entity = value_of(&caps[1], denizen)?;
        for part in split_properties(&caps[2]) {
            if entity.is_unique(denizen) {
                error!(
                    "Cannot apply properties to already-spawned entity {}",
                    entity.identify(denizen)
                );
                break;
            }
            let (name, value) = match part.split_once('=') {
                Some((name, value)) => (name, Some(value.replace(PROPERTY_ESCAPE, ";"))),
                None => (part.as_str(), None),
            };
            if name.trim().is_empty() {
                error!("Invalid property '{}' in '{}'", part, input);
                continue;
            }
            if let Err(e) = entity.adjust(denizen, Mechanism::new(name.trim(), value.as_deref())) {
                error!("Invalid property '{}' in '{}': {}", part, input, e);
            }
        }
        return Some(entity);
    }

    if input.eq_ignore_ascii_case("random") {
        return denizen.types.random().map(EntityTag::from_type);
    }

    if let Some(caps) = ENTITY_BY_ID.captures(input) {
        let rest = &caps[2];
        match caps[1].to_lowercase().as_str() {
            "n@" => {
                let npc = rest.parse::<u32>().ok().and_then(|id| denizen.npcs.get(id));
                return match npc {
                    Some(npc) => Some(EntityTag::from_npc(denizen, npc)),
                    None => {
                        error!("NPC '{}' does not exist!", rest);
                        None
                    }
                };
            }
            "p@" => {
                return match denizen.server.get_online_player(rest) {
                    Some(player) => Some(EntityTag::from_entity(denizen, player)),
                    None => {
                        error!(
                            "Invalid Player! '{}' could not be found. Has the player logged off?",
                            rest
                        );
                        None
                    }
                };
            }
            _ => {
                if let Ok(id) = Uuid::parse_str(rest) {
                    return match get_entity_for_id(id, denizen) {
                        Some(handle) => Some(EntityTag::from_entity(denizen, handle)),
                        None => {
                            debug!("no live entity with uuid {}", id);
                            None
                        }
                    };
                }
            }
        }
    }

    let name = strip_entity_prefix(input);

    if let Some(entity) = denizen.scripts.entity_from(name, denizen) {
        return Some(entity);
    }

    if let Some(caps) = ENTITY_WITH_DATA.captures(name) {
        if let Some(entity_type) = denizen.types.get(&caps[1]) {
            return Some(EntityTag::with_data(
                entity_type,
                caps.get(2).map(|m| m.as_str()),
                caps.get(3).map(|m| m.as_str()),
            ));
        }
    }

    if let Ok(id) = Uuid::parse_str(name) {
        if let Some(handle) = get_entity_for_id(id, denizen) {
            return Some(EntityTag::from_entity(denizen, handle));
        }
    }

    debug!("valueOf EntityTag returning null: {}", input);
    None
}

/// Whether any grammar form accepts the input. Does not resolve live
/// entities, so a match may still fail to parse.
pub fn matches(input: &str, denizen: &Denizen) -> bool {
    let input = input.trim();
    if let Some(caps) = DESCRIBED_REGEX.captures(input) {
        return matches(&caps[1], denizen);
    }
    if ENTITY_BY_ID.is_match(input) {
        return true;
    }
    let name = strip_entity_prefix(input);
    if name.eq_ignore_ascii_case("random") || Uuid::parse_str(name).is_ok() {
        return true;
    }
    if denizen.scripts.contains(name) {
        return true;
    }
    ENTITY_WITH_DATA
        .captures(name)
        .is_some_and(|caps| denizen.types.is_registered(&caps[1]))
}

/// Find a live entity by uuid: remembered entities first, then every world
pub fn get_entity_for_id(id: Uuid, denizen: &Denizen) -> Option<EntityHandle> {
    if let Some(handle) = denizen.remembered.get(id) {
        return Some(handle);
    }
    let helper = denizen.nms.entity_helper();
    denizen
        .server
        .worlds()
        .iter()
        .find_map(|world| helper.get_entity(world, id))
}

fn strip_entity_prefix(input: &str) -> &str {
    match input.get(..2) {
        Some(prefix) if prefix.eq_ignore_ascii_case("e@") => &input[2..],
        _ => input,
    }
}

/// Split on `;` outside nested brackets
fn split_properties(raw: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    for c in raw.chars() {
        match c {
            '[' => {
                depth += 1;
                current.push(c);
            }
            ']' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ';' if depth == 0 => {
                if !current.is_empty() {
                    parts.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(c),
        }
    }
    if !current.is_empty() {
        parts.push(current);
    }
    parts
}

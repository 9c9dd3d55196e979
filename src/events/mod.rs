//! Script events - the adapter boundary between host events and scripts
//!
//! Scripts subscribe with event lines such as `on minecart created in:world`.
//! An adapter wraps one host event, says which lines it could match, exposes
//! named context values and reports back whether a handler cancelled it or
//! determined a new value.

mod block_cooks;
mod vehicle_created;
mod vehicle_destroyed;
mod world_loads;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::host::{ItemStack, Location};
use crate::objects::EntityTag;
use crate::Denizen;

pub use block_cooks::BlockCooksSmeltsItemScriptEvent;
pub use vehicle_created::VehicleCreatedScriptEvent;
pub use vehicle_destroyed::VehicleDestroyedScriptEvent;
pub use world_loads::WorldLoadsScriptEvent;

/// A parsed event line: lowercase args plus `key:value` switches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptPath {
    pub event: String,
    pub args: Vec<String>,
    pub switches: BTreeMap<String, String>,
}

impl ScriptPath {
    /// Parse `on <args...> [key:value...]`. The leading `on` is optional.
    pub fn parse(line: &str) -> Self {
        let event = line.trim().to_string();
        let mut args = Vec::new();
        let mut switches = BTreeMap::new();
        let mut words = event.split_whitespace().peekable();
        if words.peek().is_some_and(|w| w.eq_ignore_ascii_case("on")) {
            words.next();
        }
        for word in words {
            match word.split_once(':') {
                Some((key, value)) if !key.is_empty() && !key.contains('@') => {
                    switches.insert(key.to_lowercase(), value.to_string());
                }
                _ => args.push(word.to_lowercase()),
            }
        }
        Self {
            event,
            args,
            switches,
        }
    }

    /// Lowercase arg at index, empty when absent
    pub fn arg(&self, index: usize) -> &str {
        self.args.get(index).map(String::as_str).unwrap_or("")
    }

    pub fn switch(&self, key: &str) -> Option<&str> {
        self.switches.get(&key.to_lowercase()).map(String::as_str)
    }
}

impl fmt::Display for ScriptPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.event)
    }
}

/// A named context value of a running event
#[derive(Debug, Clone)]
pub enum ContextValue {
    Entity(EntityTag),
    Location(Location),
    Item(Option<ItemStack>),
    World(String),
}

impl ContextValue {
    pub fn identify(&self, denizen: &Denizen) -> String {
        match self {
            ContextValue::Entity(entity) => entity.identify(denizen),
            ContextValue::Location(location) => location.identify(),
            ContextValue::Item(item) => ItemStack::identify_slot(item.as_ref()),
            ContextValue::World(name) => format!("w@{}", name),
        }
    }
}

/// A host event adapted for scripts
pub trait ScriptEvent {
    fn name(&self) -> &'static str;

    /// Cheap check on the event line alone
    fn could_match(&self, path: &ScriptPath) -> bool;

    /// Full check against the current event data
    fn matches(&self, path: &ScriptPath, denizen: &Denizen) -> bool;

    fn context(&self, name: &str) -> Option<ContextValue>;

    fn cancellable(&self) -> bool {
        true
    }

    /// Apply a determination to the event data as soon as a handler makes it,
    /// so later handlers see the new value
    fn apply_determination(&self, _value: &str) {}
}

/// What a handler sees while an event runs
pub struct EventRun<'a> {
    event: &'a dyn ScriptEvent,
    denizen: &'a Denizen,
    path: &'a ScriptPath,
    cancelled: bool,
    determinations: Vec<String>,
}

impl<'a> EventRun<'a> {
    pub fn context(&self, name: &str) -> Option<ContextValue> {
        self.event.context(name)
    }

    pub fn denizen(&self) -> &Denizen {
        self.denizen
    }

    pub fn path(&self) -> &ScriptPath {
        self.path
    }

    pub fn cancel(&mut self) {
        if !self.event.cancellable() {
            warn!("{} event cannot be cancelled", self.event.name());
            return;
        }
        self.cancelled = true;
    }

    /// Undo an earlier handler's cancellation
    pub fn uncancel(&mut self) {
        self.cancelled = false;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn determine(&mut self, value: &str) {
        self.event.apply_determination(value);
        self.determinations.push(value.to_string());
    }
}

/// Result of firing an event
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventOutcome {
    pub cancelled: bool,
    pub determinations: Vec<String>,
}

impl EventOutcome {
    pub fn last_determination(&self) -> Option<&str> {
        self.determinations.last().map(String::as_str)
    }
}

pub type EventHandler = Arc<dyn Fn(&mut EventRun<'_>) + Send + Sync>;

/// Handlers registered against event lines, fired in registration order
#[derive(Default)]
pub struct EventBus {
    handlers: RwLock<Vec<(ScriptPath, EventHandler)>>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines: Vec<String> = self.handlers.read().iter().map(|(p, _)| p.event.clone()).collect();
        f.debug_struct("EventBus").field("handlers", &lines).finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Subscribe a handler to an event line
    pub fn on(&self, line: &str, handler: impl Fn(&mut EventRun<'_>) + Send + Sync + 'static) -> ScriptPath {
        let path = ScriptPath::parse(line);
        debug!("registered event handler for '{}'", path);
        self.handlers.write().push((path.clone(), Arc::new(handler)));
        path
    }

    pub fn len(&self) -> usize {
        self.handlers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.read().is_empty()
    }

    /// Run every matching handler. Cancellation carries from one handler to the next.
    pub fn fire(&self, event: &dyn ScriptEvent, denizen: &Denizen) -> EventOutcome {
        let handlers: Vec<(ScriptPath, EventHandler)> = self.handlers.read().clone();
        let mut cancelled = false;
        let mut determinations = Vec::new();
        for (path, handler) in &handlers {
            if !event.could_match(path) || !event.matches(path, denizen) {
                continue;
            }
            debug!("firing {} for '{}'", event.name(), path);
            let mut run = EventRun {
                event,
                denizen,
                path,
                cancelled,
                determinations: std::mem::take(&mut determinations),
            };
            handler(&mut run);
            cancelled = run.cancelled;
            determinations = run.determinations;
        }
        EventOutcome {
            cancelled,
            determinations,
        }
    }
}

/// The `in:<world>` switch against the event location
pub fn run_in_check(path: &ScriptPath, location: Option<&Location>) -> bool {
    match path.switch("in") {
        None => true,
        Some(world) => location.is_some_and(|l| l.world.eq_ignore_ascii_case(world)),
    }
}

/// Match an entity against a `|`-separated list of entity matchers
pub fn try_entity(entity: &EntityTag, pattern: &str) -> bool {
    pattern.split('|').any(|p| entity.matches(p))
}

/// Match an item against `item` or a `|`-separated list of materials
pub fn try_item(item: Option<&ItemStack>, pattern: &str) -> bool {
    pattern.split('|').any(|p| {
        let p = p.trim().to_lowercase();
        let p = p.strip_prefix("i@").unwrap_or(&p);
        match item {
            Some(item) => p == "item" || p == item.material,
            None => p == "air",
        }
    })
}

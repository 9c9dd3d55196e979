//! Item stacks
//!
//! String form: `i@material` or `i@material[quantity=3;display_name=Excalibur]`.
//! `i@air` denotes an empty slot.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// A stack of items
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    /// Lowercase material name without namespace (e.g. "diamond_sword")
    pub material: String,
    pub quantity: u32,
    pub display_name: Option<String>,
}

/// Armor slots in platform order: boots, leggings, chestplate, helmet
pub type ArmorContents = [Option<ItemStack>; 4];

/// An item string that could not be read
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid item '{0}'")]
pub struct ItemParseError(pub String);

static ITEM_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?i:i@)?(?:minecraft:)?([A-Za-z0-9_]+)(?:\[(.*)\])?$").unwrap()
});

impl ItemStack {
    pub fn new(material: &str) -> Self {
        Self {
            material: material.to_lowercase(),
            quantity: 1,
            display_name: None,
        }
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn with_display_name(mut self, name: &str) -> Self {
        self.display_name = Some(name.to_string());
        self
    }

    /// Namespaced id as stored in persisted compounds
    pub fn namespaced_id(&self) -> String {
        format!("minecraft:{}", self.material)
    }

    pub fn is_air(&self) -> bool {
        self.material == "air" || self.quantity == 0
    }

    pub fn identify(&self) -> String {
        format!("i@{}", self)
    }

    /// Parse a slot value: air and empty strings become `None`
    pub fn parse_slot(s: &str) -> Result<Option<ItemStack>, ItemParseError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        let item: ItemStack = trimmed.parse()?;
        Ok(if item.is_air() { None } else { Some(item) })
    }

    /// Identity form of an optional slot (`i@air` when empty)
    pub fn identify_slot(slot: Option<&ItemStack>) -> String {
        match slot {
            Some(item) => item.identify(),
            None => "i@air".to_string(),
        }
    }
}

impl fmt::Display for ItemStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.material)?;
        let mut props = Vec::new();
        if self.quantity != 1 {
            props.push(format!("quantity={}", self.quantity));
        }
        if let Some(name) = &self.display_name {
            props.push(format!("display_name={}", name));
        }
        if !props.is_empty() {
            write!(f, "[{}]", props.join(";"))?;
        }
        Ok(())
    }
}

impl FromStr for ItemStack {
    type Err = ItemParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = ITEM_REGEX
            .captures(s.trim())
            .ok_or_else(|| ItemParseError(s.to_string()))?;
        let mut item = ItemStack::new(&caps[1]);
        if let Some(props) = caps.get(2) {
            for pair in props.as_str().split(';').filter(|p| !p.is_empty()) {
                let (key, value) = pair
                    .split_once('=')
                    .ok_or_else(|| ItemParseError(s.to_string()))?;
                match key.trim().to_lowercase().as_str() {
                    "quantity" => {
                        item.quantity = value
                            .trim()
                            .parse()
                            .map_err(|_| ItemParseError(s.to_string()))?;
                    }
                    "display_name" => item.display_name = Some(value.to_string()),
                    _ => return Err(ItemParseError(s.to_string())),
                }
            }
        }
        Ok(item)
    }
}

//! Mechanisms - named write operations on an object

use std::fmt;
use std::str::FromStr;

use uuid::Uuid;

use super::EntityError;
use crate::host::{ItemStack, Location, Vector};

/// A named write operation with an optional value
#[derive(Debug, Clone, PartialEq)]
pub struct Mechanism {
    pub name: String,
    pub value: Option<String>,
}

impl Mechanism {
    pub fn new(name: &str, value: Option<&str>) -> Self {
        Self {
            name: name.trim().to_lowercase(),
            value: value.map(str::to_string),
        }
    }

    pub fn with_value(name: &str, value: &str) -> Self {
        Self::new(name, Some(value))
    }

    /// Parse `name=value` (or a bare `name`)
    pub fn parse(s: &str) -> Self {
        match s.split_once('=') {
            Some((name, value)) => Self::new(name, Some(value)),
            None => Self::new(s, None),
        }
    }

    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }

    /// Value text, empty when absent
    pub fn value_str(&self) -> &str {
        self.value.as_deref().unwrap_or("")
    }

    pub fn matches(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    fn require_value(&self) -> Result<&str, EntityError> {
        self.value
            .as_deref()
            .ok_or_else(|| EntityError::invalid_mechanism(&self.name, "a value is required"))
    }

    fn require_parsed<T: FromStr>(&self, what: &str) -> Result<T, EntityError> {
        let value = self.require_value()?;
        value
            .trim()
            .parse()
            .map_err(|_| EntityError::invalid_mechanism(&self.name, format!("'{}' is not {}", value, what)))
    }

    pub fn require_bool(&self) -> Result<bool, EntityError> {
        match self.value.as_deref().map(|v| v.trim().to_lowercase()) {
            None => Ok(true),
            Some(v) if v == "true" => Ok(true),
            Some(v) if v == "false" => Ok(false),
            Some(v) => Err(EntityError::invalid_mechanism(
                &self.name,
                format!("'{}' is not a boolean", v),
            )),
        }
    }

    pub fn require_f64(&self) -> Result<f64, EntityError> {
        self.require_parsed("a number")
    }

    pub fn require_i32(&self) -> Result<i32, EntityError> {
        self.require_parsed("an integer")
    }

    pub fn require_vector(&self) -> Result<Vector, EntityError> {
        self.require_parsed("a vector")
    }

    pub fn require_location(&self) -> Result<Location, EntityError> {
        self.require_parsed("a location")
    }

    pub fn require_uuid(&self) -> Result<Uuid, EntityError> {
        let value = self.require_value()?;
        let raw = value
            .get(..2)
            .filter(|p| p.eq_ignore_ascii_case("e@") || p.eq_ignore_ascii_case("p@"))
            .map_or(value, |_| &value[2..]);
        Uuid::parse_str(raw.trim())
            .map_err(|_| EntityError::invalid_mechanism(&self.name, format!("'{}' is not an entity id", value)))
    }

    /// An item slot (`i@air` or no value clears it)
    pub fn require_item_slot(&self) -> Result<Option<ItemStack>, EntityError> {
        ItemStack::parse_slot(self.value_str())
            .map_err(|e| EntityError::invalid_mechanism(&self.name, e.to_string()))
    }

    /// A `|`-separated list of item slots
    pub fn require_item_list(&self) -> Result<Vec<Option<ItemStack>>, EntityError> {
        self.require_value()?
            .split('|')
            .map(|part| {
                ItemStack::parse_slot(part)
                    .map_err(|e| EntityError::invalid_mechanism(&self.name, e.to_string()))
            })
            .collect()
    }
}

impl fmt::Display for Mechanism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(v) => write!(f, "{}={}", self.name, v),
            None => write!(f, "{}", self.name),
        }
    }
}

//! Server versions and feature thresholds
//!
//! Features that differ between releases are gated on the named thresholds
//! below with `is_at_least` / `is_at_most`, never on raw version strings.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::NmsError;

/// A `major.minor.patch` server version, ordered lexicographically
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NmsVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

/// Swimming flag on living entities
pub const V1_13_2: NmsVersion = NmsVersion::new(1, 13, 2);

/// Oldest release with a provider
pub const V1_19: NmsVersion = NmsVersion::new(1, 19, 0);

/// Arrow potion types stored as a single base type
pub const V1_20_2: NmsVersion = NmsVersion::new(1, 20, 2);

/// Item data components, wolf variants
pub const V1_20_5: NmsVersion = NmsVersion::new(1, 20, 5);

pub const V1_21: NmsVersion = NmsVersion::new(1, 21, 0);

static VERSION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\.(\d+)(?:\.(\d+))?").unwrap());

impl NmsVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Extract the version from a server version string like `1.21.4-R0.1-SNAPSHOT`
    pub fn detect(server_version: &str) -> Result<Self, NmsError> {
        let caps = VERSION_REGEX
            .captures(server_version.trim())
            .ok_or_else(|| NmsError::InvalidVersion(server_version.to_string()))?;
        let part = |i: usize| -> Result<u32, NmsError> {
            match caps.get(i) {
                Some(m) => m
                    .as_str()
                    .parse()
                    .map_err(|_| NmsError::InvalidVersion(server_version.to_string())),
                None => Ok(0),
            }
        };
        Ok(Self::new(part(1)?, part(2)?, part(3)?))
    }

    pub fn is_at_least(&self, other: NmsVersion) -> bool {
        *self >= other
    }

    pub fn is_at_most(&self, other: NmsVersion) -> bool {
        *self <= other
    }
}

impl fmt::Display for NmsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for NmsVersion {
    type Err = NmsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split('.').collect();
        if !(2..=3).contains(&parts.len()) {
            return Err(NmsError::InvalidVersion(s.to_string()));
        }
        let mut nums = [0u32; 3];
        for (i, p) in parts.iter().enumerate() {
            nums[i] = p
                .parse()
                .map_err(|_| NmsError::InvalidVersion(s.to_string()))?;
        }
        Ok(Self::new(nums[0], nums[1], nums[2]))
    }
}

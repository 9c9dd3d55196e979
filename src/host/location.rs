//! Locations and vectors
//!
//! String form follows the object notation used by scripts:
//! `x,y,z,world` or `x,y,z,yaw,pitch,world`, optionally prefixed with `l@`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A direction or offset in world space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Unit vector in the same direction (zero stays zero)
    pub fn normalize(&self) -> Self {
        let len = self.length();
        if len == 0.0 {
            return *self;
        }
        Self::new(self.x / len, self.y / len, self.z / len)
    }
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.x, self.y, self.z)
    }
}

impl FromStr for Vector {
    type Err = LocationParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = strip_prefix(s);
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 3 {
            return Err(LocationParseError(s.to_string()));
        }
        let x = parse_f64(parts[0], s)?;
        let y = parse_f64(parts[1], s)?;
        let z = parse_f64(parts[2], s)?;
        Ok(Self::new(x, y, z))
    }
}

/// Integer block coordinates
pub type BlockPos = (i32, i32, i32);

/// A position in a named world
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub world: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    #[serde(default)]
    pub yaw: f32,
    #[serde(default)]
    pub pitch: f32,
}

/// A location string that does not follow `x,y,z[,yaw,pitch],world`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid location '{0}'")]
pub struct LocationParseError(pub String);

impl Location {
    pub fn new(world: &str, x: f64, y: f64, z: f64) -> Self {
        Self {
            world: world.to_string(),
            x,
            y,
            z,
            yaw: 0.0,
            pitch: 0.0,
        }
    }

    pub fn with_rotation(mut self, yaw: f32, pitch: f32) -> Self {
        self.yaw = yaw;
        self.pitch = pitch;
        self
    }

    pub fn to_vector(&self) -> Vector {
        Vector::new(self.x, self.y, self.z)
    }

    /// Same world, moved to the given coordinates
    pub fn with_position(&self, position: Vector) -> Self {
        Self {
            world: self.world.clone(),
            x: position.x,
            y: position.y,
            z: position.z,
            yaw: self.yaw,
            pitch: self.pitch,
        }
    }

    pub fn block(&self) -> BlockPos {
        (
            self.x.floor() as i32,
            self.y.floor() as i32,
            self.z.floor() as i32,
        )
    }

    /// Unit look direction from yaw/pitch (Minecraft convention: yaw 0 faces +z)
    pub fn direction(&self) -> Vector {
        let yaw = (self.yaw as f64).to_radians();
        let pitch = (self.pitch as f64).to_radians();
        let xz = pitch.cos();
        Vector::new(-xz * yaw.sin(), -pitch.sin(), xz * yaw.cos())
    }

    pub fn distance(&self, other: &Location) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Identity form with the `l@` prefix
    pub fn identify(&self) -> String {
        format!("l@{}", self)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.yaw == 0.0 && self.pitch == 0.0 {
            write!(f, "{},{},{},{}", self.x, self.y, self.z, self.world)
        } else {
            write!(
                f,
                "{},{},{},{},{},{}",
                self.x, self.y, self.z, self.yaw, self.pitch, self.world
            )
        }
    }
}

impl FromStr for Location {
    type Err = LocationParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = strip_prefix(s);
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        match parts.len() {
            4 => Ok(Location::new(
                parts[3],
                parse_f64(parts[0], s)?,
                parse_f64(parts[1], s)?,
                parse_f64(parts[2], s)?,
            )),
            6 => {
                let yaw = parse_f64(parts[3], s)? as f32;
                let pitch = parse_f64(parts[4], s)? as f32;
                Ok(Location::new(
                    parts[5],
                    parse_f64(parts[0], s)?,
                    parse_f64(parts[1], s)?,
                    parse_f64(parts[2], s)?,
                )
                .with_rotation(yaw, pitch))
            }
            _ => Err(LocationParseError(s.to_string())),
        }
    }
}

fn strip_prefix(s: &str) -> &str {
    let s = s.trim();
    match s.get(..2) {
        Some(prefix) if prefix.eq_ignore_ascii_case("l@") => &s[2..],
        _ => s,
    }
}

fn parse_f64(part: &str, whole: &str) -> Result<f64, LocationParseError> {
    part.parse::<f64>()
        .map_err(|_| LocationParseError(whole.to_string()))
}

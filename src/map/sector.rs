// src/map/sector.rs
use serde::{Deserialize, Serialize};

/// A sector: a region of the map with its own floor and ceiling.
///
/// The BSP builder treats sectors as opaque identities; leaves record the
/// index of the sector they cover.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sector {
    /// The floor height (in map units).
    pub floor_height: i32,

    /// The ceiling height (in map units).
    pub ceiling_height: i32,

    /// The name of the floor flat.
    pub floor_tex: String,

    /// The name of the ceiling flat.
    pub ceiling_tex: String,

    /// Light level (0-255).
    pub light: i32,

    /// Special type (a.k.a. "effect" or "sector type").
    pub r#type: i32,

    /// Sector tag, used to link linedefs, etc.
    pub tag: i32,
}

impl Sector {
    pub fn new(
        floor_height: i32,
        ceiling_height: i32,
        floor_tex: String,
        ceiling_tex: String,
        light: i32,
        r#type: i32,
        tag: i32,
    ) -> Self {
        Sector {
            floor_height,
            ceiling_height,
            floor_tex,
            ceiling_tex,
            light,
            r#type,
            tag,
        }
    }
}

impl Default for Sector {
    fn default() -> Self {
        Sector::new(0, 128, "FLOOR4_8".to_string(), "CEIL3_5".to_string(), 160, 0, 0)
    }
}

// src/map/sidedef.rs
use serde::{Deserialize, Serialize};

/// One side of a linedef. The BSP builder only cares about `sector`; the
/// texture fields are carried for the loader and renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SideDef {
    /// Horizontal texture offset.
    pub x_offset: i32,

    /// Vertical texture offset.
    pub y_offset: i32,

    pub upper_tex: String,
    pub lower_tex: String,
    pub mid_tex: String,

    /// Index of the sector this side faces.
    pub sector: usize,
}

impl SideDef {
    pub fn new(
        x_offset: i32,
        y_offset: i32,
        upper_tex: String,
        lower_tex: String,
        mid_tex: String,
        sector: usize,
    ) -> Self {
        SideDef {
            x_offset,
            y_offset,
            upper_tex,
            lower_tex,
            mid_tex,
            sector,
        }
    }

    /// A sidedef with no offsets and blank (`-`) textures.
    pub fn for_sector(sector: usize) -> Self {
        SideDef::new(0, 0, "-".to_string(), "-".to_string(), "-".to_string(), sector)
    }
}

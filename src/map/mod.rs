// src/map/mod.rs
pub mod linedef;
pub mod map_data;
pub mod sector;
pub mod sidedef;
pub mod vertex;

pub use linedef::{LineDef, Side};
pub use map_data::MapData;
pub use sector::Sector;
pub use sidedef::SideDef;
pub use vertex::Vertex;

// src/bsp/mod.rs
pub mod bsp_level;
pub mod bsp_util;
pub mod config;
pub mod error;
pub mod hedge;
pub mod hedge_tip;
pub mod intercept;
pub mod leaf;
pub mod line_info;
pub mod partition;
pub mod partitioner;
pub mod tree;

pub use bsp_level::BspLevel;
pub use bsp_util::{BoundingBox, Partition};
pub use config::BspConfig;
pub use error::{BspError, Result};
pub use hedge::{HEdge, HEdgeId};
pub use leaf::Leaf;
pub use line_info::LineInfo;
pub use tree::{BspChild, BspNode, BspTree, BuildStats};

// Build defaults; see `BspConfig`.
pub const DEFAULT_SPLIT_COST_FACTOR: f64 = 7.0;
pub const MAX_CANDIDATES: usize = 128;
pub const BSP_DEPTH_LIMIT: usize = 128; // Prevent runaway recursion on broken maps
pub const DIST_EPSILON: f64 = 1.0 / 128.0; // Map units

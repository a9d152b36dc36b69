// src/bsp/error.rs
use thiserror::Error;

/// Everything that can abort a BSP build. There is no partial result: any
/// of these leaves the caller without a tree.
#[derive(Debug, Error)]
pub enum BspError {
    // Malformed input, caught by the line annotator.
    #[error("linedef #{line} references missing vertex #{vertex}")]
    MissingVertex { line: usize, vertex: usize },

    #[error("linedef #{line} references missing sidedef #{sidedef}")]
    MissingSideDef { line: usize, sidedef: usize },

    #[error("sidedef #{sidedef} references missing sector #{sector}")]
    MissingSector { sidedef: usize, sector: usize },

    // Geometric inconsistency.
    #[error("map has no usable lines: every line is zero-length, overlapping, sideless or a polyobject part")]
    NoHalfEdges,

    #[error("partitioning produced an empty half-edge set at depth {depth}")]
    EmptyPartition { depth: usize },

    #[error("BSP depth limit {limit} exceeded with {hedges} half-edges left")]
    DepthExceeded { limit: usize, hedges: usize },

    #[error("splitting half-edge #{hedge} (line {line:?}) at ({x:.3}, {y:.3}) would leave a zero-length piece")]
    DegenerateSplit {
        hedge: usize,
        line: Option<usize>,
        x: f64,
        y: f64,
    },

    #[error("leaf does not close: half-edge #{hedge} ends at vertex #{vertex} with no continuation")]
    UnclosedLeaf { hedge: usize, vertex: usize },

    #[error("leaf is not convex: vertex #{vertex} lies behind half-edge #{hedge}")]
    NonConvexLeaf { hedge: usize, vertex: usize },

    // Internal invariant violations.
    #[error("half-edge #{hedge} and its twin #{twin} do not share endpoints")]
    TwinMismatch { hedge: usize, twin: usize },

    #[error("half-edge #{hedge} did not end up in any leaf")]
    LostHalfEdge { hedge: usize },

    // Configuration.
    #[error("invalid BSP configuration: {0}")]
    InvalidConfig(String),

    #[error("could not parse BSP configuration")]
    ConfigParse(#[from] serde_json::Error),
}

/// Convenience type alias for results using [`BspError`].
pub type Result<T> = std::result::Result<T, BspError>;

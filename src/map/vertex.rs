// src/map/vertex.rs
use serde::{Deserialize, Serialize};

use crate::utils::Point2D;

/// A map vertex. Original vertices come from the map loader; the BSP
/// builder appends the ones it creates when splitting half-edges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub x: f64,
    pub y: f64,
}

impl Vertex {
    pub fn new(x: f64, y: f64) -> Self {
        Vertex { x, y }
    }

    pub fn point(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }

    /// Exact coordinate match.
    pub fn matches(&self, tx: f64, ty: f64) -> bool {
        self.x == tx && self.y == ty
    }

    /// True if the vertex lies within `epsilon` of `point` on both axes.
    pub fn is_near(&self, point: &Point2D, epsilon: f64) -> bool {
        (self.x - point.x).abs() <= epsilon && (self.y - point.y).abs() <= epsilon
    }
}

impl From<Point2D> for Vertex {
    fn from(point: Point2D) -> Self {
        Vertex::new(point.x, point.y)
    }
}

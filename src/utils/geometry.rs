// src/utils/geometry.rs
use serde::{Deserialize, Serialize};

use crate::utils::util::compute_angle;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point2D) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx.hypot(dy)
    }

    /// Vector pointing from `self` to `other`.
    pub fn vector_to(&self, other: &Point2D) -> Vector2D {
        Vector2D::new(other.x - self.x, other.y - self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector2D {
    pub x: f64,
    pub y: f64,
}

impl Vector2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn dot(&self, other: &Vector2D) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// z component of the 3D cross product. Positive when `other` lies
    /// anti-clockwise of `self`.
    pub fn cross(&self, other: &Vector2D) -> f64 {
        self.x * other.y - self.y * other.x
    }

    pub fn length(&self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    /// Direction in degrees, `[0, 360)`, anti-clockwise from +x.
    pub fn angle(&self) -> f64 {
        compute_angle(self.x, self.y)
    }
}

/// Twice the signed area of a closed polygon. Negative for clockwise
/// winding (y up).
pub fn signed_area2(points: &[Point2D]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for (i, p) in points.iter().enumerate() {
        let q = &points[(i + 1) % points.len()];
        sum += p.x * q.y - q.x * p.y;
    }
    sum
}

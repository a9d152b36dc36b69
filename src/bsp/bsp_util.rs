// src/bsp/bsp_util.rs
// Geometry helpers specific to BSP: partition lines and bounding boxes.

use serde::{Deserialize, Serialize};

use crate::utils::{Point2D, Vector2D};

/// An infinite partition line through `origin` along `direction`.
/// The front of a partition is its right-hand side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Partition {
    pub origin: Point2D,
    pub direction: Vector2D,
}

impl Partition {
    pub fn new(origin: Point2D, direction: Vector2D) -> Self {
        Partition { origin, direction }
    }

    /// The partition running from `start` through `end`.
    pub fn through(start: Point2D, end: Point2D) -> Self {
        Partition::new(start, start.vector_to(&end))
    }

    /// Signed perpendicular distance of `point` from the line. Positive on
    /// the front (right) side, negative on the back.
    pub fn perp_distance(&self, point: &Point2D) -> f64 {
        let dx = self.direction.x;
        let dy = self.direction.y;
        (dy * (point.x - self.origin.x) - dx * (point.y - self.origin.y)) / self.direction.length()
    }

    /// Signed distance of the projection of `point` along the line,
    /// measured from `origin`.
    pub fn along_distance(&self, point: &Point2D) -> f64 {
        self.origin.vector_to(point).dot(&self.direction) / self.direction.length()
    }

    /// True if `point` is on or in front of the line.
    pub fn is_front(&self, point: &Point2D) -> bool {
        self.perp_distance(point) >= 0.0
    }

    /// Where segment `a`-`b` crosses the line. `da` and `db` are the
    /// perpendicular distances of the ends and must differ in sign.
    ///
    /// Axis-aligned partitions and segments keep their exact coordinate so
    /// split vertices on orthogonal walls stay on the integer grid.
    pub fn intersection(&self, a: &Point2D, b: &Point2D, da: f64, db: f64) -> Point2D {
        let t = da / (da - db);
        let mut x = a.x + t * (b.x - a.x);
        let mut y = a.y + t * (b.y - a.y);

        if self.direction.x == 0.0 {
            x = self.origin.x;
        }
        if self.direction.y == 0.0 {
            y = self.origin.y;
        }
        if a.x == b.x {
            x = a.x;
        }
        if a.y == b.y {
            y = a.y;
        }
        Point2D::new(x, y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Default for BoundingBox {
    fn default() -> Self {
        BoundingBox::new_empty()
    }
}

impl BoundingBox {
    pub fn new_empty() -> Self {
        BoundingBox {
            min_x: f64::INFINITY,
            min_y: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_y: f64::NEG_INFINITY,
        }
    }

    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        BoundingBox { min_x, min_y, max_x, max_y }
    }

    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point2D>) -> Self {
        let mut bbox = BoundingBox::new_empty();
        for p in points {
            bbox.expand_point(p.x, p.y);
        }
        bbox
    }

    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }

    pub fn expand_point(&mut self, x: f64, y: f64) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    pub fn combine(&mut self, other: &BoundingBox) {
        self.min_x = self.min_x.min(other.min_x);
        self.min_y = self.min_y.min(other.min_y);
        self.max_x = self.max_x.max(other.max_x);
        self.max_y = self.max_y.max(other.max_y);
    }

    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let mut merged = *self;
        merged.combine(other);
        merged
    }

    // Check if the bounding box contains a point
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    // Checks if two Bounding Boxes intersects
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.max_x >= other.min_x
            && self.min_x <= other.max_x
            && self.max_y >= other.min_y
            && self.min_y <= other.max_y
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_front_is_right_side() {
        // Heading north: east is the front.
        let partition = Partition::through(Point2D::new(0.0, 0.0), Point2D::new(0.0, 10.0));
        assert_approx_eq!(partition.perp_distance(&Point2D::new(4.0, 3.0)), 4.0);
        assert_approx_eq!(partition.perp_distance(&Point2D::new(-2.0, 3.0)), -2.0);
        assert!(partition.is_front(&Point2D::new(0.0, 50.0)));
        assert_approx_eq!(partition.along_distance(&Point2D::new(-2.0, 3.0)), 3.0);
    }

    #[test]
    fn test_intersection_on_diagonal() {
        let partition = Partition::through(Point2D::new(0.0, 0.0), Point2D::new(1.0, 1.0));
        let a = Point2D::new(0.0, 4.0);
        let b = Point2D::new(4.0, 0.0);
        let p = partition.intersection(&a, &b, partition.perp_distance(&a), partition.perp_distance(&b));
        assert_approx_eq!(p.x, 2.0);
        assert_approx_eq!(p.y, 2.0);
    }

    #[test]
    fn test_intersection_snaps_axis_aligned() {
        let partition = Partition::through(Point2D::new(64.0, 128.0), Point2D::new(64.0, 64.0));
        let a = Point2D::new(128.0, 0.0);
        let b = Point2D::new(0.0, 0.0);
        let p = partition.intersection(&a, &b, partition.perp_distance(&a), partition.perp_distance(&b));
        assert_eq!(p, Point2D::new(64.0, 0.0));
    }

    #[test]
    fn test_bbox_union_and_queries() {
        let a = BoundingBox::from_points(&[Point2D::new(0.0, 0.0), Point2D::new(10.0, 5.0)]);
        let b = BoundingBox::new(8.0, -2.0, 12.0, 1.0);
        let u = a.union(&b);
        assert_eq!(u, BoundingBox::new(0.0, -2.0, 12.0, 5.0));
        assert!(a.intersects(&b));
        assert!(u.contains_point(11.0, 4.0));
        assert!(!a.contains_point(11.0, 4.0));
        assert!(BoundingBox::new_empty().is_empty());
    }
}

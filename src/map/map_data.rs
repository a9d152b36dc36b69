// src/map/map_data.rs

use crate::map::{LineDef, Sector, Side, SideDef, Vertex};
use crate::utils::geometry::{signed_area2, Point2D};

/// The geometry of one level, as handed over by the map loader.
///
/// The BSP builder reads lines, sides and sectors and appends vertices; it
/// never reorders or removes anything.
#[derive(Debug, Clone, Default)]
pub struct MapData {
    pub vertices: Vec<Vertex>,
    pub linedefs: Vec<LineDef>,
    pub sidedefs: Vec<SideDef>,
    pub sectors: Vec<Sector>,
}

impl MapData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a vertex and returns its index.
    pub fn add_vertex(&mut self, x: f64, y: f64) -> usize {
        self.vertices.push(Vertex::new(x, y));
        self.vertices.len() - 1
    }

    /// Index of the first vertex at exactly `(x, y)`.
    pub fn find_vertex(&self, x: f64, y: f64) -> Option<usize> {
        self.vertices.iter().position(|v| v.matches(x, y))
    }

    fn find_or_add_vertex(&mut self, x: f64, y: f64) -> usize {
        match self.find_vertex(x, y) {
            Some(index) => index,
            None => self.add_vertex(x, y),
        }
    }

    /// Adds a sector and returns its index.
    pub fn add_sector(&mut self, sector: Sector) -> usize {
        self.sectors.push(sector);
        self.sectors.len() - 1
    }

    /// Adds a sidedef and returns its index.
    pub fn add_sidedef(&mut self, sidedef: SideDef) -> usize {
        self.sidedefs.push(sidedef);
        self.sidedefs.len() - 1
    }

    /// Adds a linedef between two vertices. `right` and `left` are sidedef
    /// indices.
    pub fn add_linedef(
        &mut self,
        start: usize,
        end: usize,
        right: Option<usize>,
        left: Option<usize>,
    ) -> usize {
        self.linedefs.push(LineDef::new(start, end, right, left));
        self.linedefs.len() - 1
    }

    /// Adds a closed outline for `sector`, wound so the sector lies on the
    /// front (right) side of every line. An existing one-sided line that runs
    /// the opposite way along an edge gains a back side instead of being
    /// duplicated, which is how neighbouring sectors get two-sided walls.
    pub fn add_polygon(&mut self, points: &[(f64, f64)], sector: usize) -> Vec<usize> {
        let mut outline: Vec<Point2D> = points.iter().map(|&(x, y)| Point2D::new(x, y)).collect();
        if signed_area2(&outline) > 0.0 {
            outline.reverse();
        }
        self.add_loop(&outline, sector)
    }

    /// Adds a hole (pillar) inside `sector`: the outline is wound the other
    /// way so the surrounding sector faces every line.
    pub fn add_hole(&mut self, points: &[(f64, f64)], sector: usize) -> Vec<usize> {
        let mut outline: Vec<Point2D> = points.iter().map(|&(x, y)| Point2D::new(x, y)).collect();
        if signed_area2(&outline) < 0.0 {
            outline.reverse();
        }
        self.add_loop(&outline, sector)
    }

    /// Creates a default sector bounded by `points` and returns its index.
    pub fn add_room(&mut self, points: &[(f64, f64)]) -> usize {
        let sector = self.add_sector(Sector::default());
        self.add_polygon(points, sector);
        sector
    }

    fn add_loop(&mut self, outline: &[Point2D], sector: usize) -> Vec<usize> {
        let mut lines = Vec::with_capacity(outline.len());
        for (i, a) in outline.iter().enumerate() {
            let b = outline[(i + 1) % outline.len()];
            let va = self.find_or_add_vertex(a.x, a.y);
            let vb = self.find_or_add_vertex(b.x, b.y);
            let side = self.add_sidedef(SideDef::for_sector(sector));

            let shared = self
                .linedefs
                .iter()
                .position(|l| l.start == vb && l.end == va && l.left.is_none());
            match shared {
                Some(index) => {
                    self.linedefs[index].left = Some(side);
                    lines.push(index);
                }
                None => lines.push(self.add_linedef(va, vb, Some(side), None)),
            }
        }
        lines
    }

    /// Sector faced by the given side of a line, if that side exists.
    pub fn line_sector(&self, line: &LineDef, side: Side) -> Option<usize> {
        line.sidedef(side)
            .and_then(|sd| self.sidedefs.get(sd))
            .map(|sd| sd.sector)
    }

    /// Computes the length of a linedef, or `None` if a vertex is missing.
    pub fn calc_length(&self, line: &LineDef) -> Option<f64> {
        let start = self.vertices.get(line.start)?;
        let end = self.vertices.get(line.end)?;
        Some((start.x - end.x).hypot(start.y - end.y))
    }

    /// Returns true if both ends of the linedef sit on the same coordinate.
    pub fn is_zero_length(&self, line: &LineDef) -> bool {
        match (self.vertices.get(line.start), self.vertices.get(line.end)) {
            (Some(start), Some(end)) => start.matches(end.x, end.y),
            _ => false,
        }
    }

    /// Returns true if both sides of the linedef face the same sector.
    pub fn is_self_ref(&self, line: &LineDef) -> bool {
        match (
            self.line_sector(line, Side::Front),
            self.line_sector(line, Side::Back),
        ) {
            (Some(front), Some(back)) => front == back,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_add_room_winds_clockwise() {
        let mut map = MapData::new();
        // Given anti-clockwise; must be stored clockwise.
        let sector = map.add_room(&[(0.0, 0.0), (64.0, 0.0), (64.0, 64.0), (0.0, 64.0)]);
        assert_eq!(sector, 0);
        assert_eq!(map.vertices.len(), 4);
        assert_eq!(map.linedefs.len(), 4);

        let first = &map.linedefs[0];
        let a = map.vertices[first.start];
        let b = map.vertices[first.end];
        // Reversed to clockwise: the first wall runs along the top, eastwards.
        assert_eq!((a.x, a.y), (0.0, 64.0));
        assert_eq!((b.x, b.y), (64.0, 64.0));
    }

    #[test]
    fn test_shared_edge_becomes_two_sided() {
        let mut map = MapData::new();
        let left = map.add_room(&[(0.0, 0.0), (0.0, 64.0), (64.0, 64.0), (64.0, 0.0)]);
        let right = map.add_room(&[(64.0, 0.0), (64.0, 64.0), (128.0, 64.0), (128.0, 0.0)]);

        assert_eq!(map.vertices.len(), 6);
        assert_eq!(map.linedefs.len(), 7);
        let shared: Vec<&LineDef> = map.linedefs.iter().filter(|l| l.is_two_sided()).collect();
        assert_eq!(shared.len(), 1);
        assert_eq!(map.line_sector(shared[0], Side::Front), Some(left));
        assert_eq!(map.line_sector(shared[0], Side::Back), Some(right));
        assert!(!map.is_self_ref(shared[0]));
    }

    #[test]
    fn test_hole_faces_surrounding_sector() {
        let mut map = MapData::new();
        let room = map.add_room(&[(0.0, 0.0), (0.0, 128.0), (128.0, 128.0), (128.0, 0.0)]);
        let lines = map.add_hole(&[(48.0, 48.0), (48.0, 80.0), (80.0, 80.0), (80.0, 48.0)], room);
        for index in lines {
            let line = &map.linedefs[index];
            let a = map.vertices[line.start];
            let b = map.vertices[line.end];
            // The room must lie on the right: for a hole that means outward.
            let mid = ((a.x + b.x) / 2.0, (a.y + b.y) / 2.0);
            let right = (mid.0 + 0.25 * (b.y - a.y), mid.1 - 0.25 * (b.x - a.x));
            let inside_hole = right.0 > 48.0 && right.0 < 80.0 && right.1 > 48.0 && right.1 < 80.0;
            assert!(!inside_hole);
        }
    }

    #[test]
    fn test_length_helpers() {
        let mut map = MapData::new();
        let a = map.add_vertex(0.0, 0.0);
        let b = map.add_vertex(3.0, 4.0);
        let c = map.add_vertex(0.0, 0.0);
        let line = map.add_linedef(a, b, None, None);
        let dot = map.add_linedef(a, c, None, None);
        assert_approx_eq!(map.calc_length(&map.linedefs[line]).unwrap(), 5.0);
        assert!(map.is_zero_length(&map.linedefs[dot]));
        assert!(!map.is_zero_length(&map.linedefs[line]));

        let broken = LineDef::new(0, 99, None, None);
        assert!(map.calc_length(&broken).is_none());
    }
}

// src/bsp/line_info.rs
//
// First pass of the build: validates line references and classifies every
// line before any half-edge exists.

use std::collections::HashMap;

use log::{debug, warn};
use serde::Serialize;

use crate::bsp::error::{BspError, Result};
use crate::map::{MapData, Side, Vertex};

/// Per-line annotations. The input lines themselves are never touched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LineInfo {
    /// Canonical start vertex (duplicates merged).
    pub start: usize,
    /// Canonical end vertex (duplicates merged).
    pub end: usize,
    pub front_sector: Option<usize>,
    pub back_sector: Option<usize>,
    pub two_sided: bool,
    pub zero_length: bool,
    /// Same sector on both sides. Informational only.
    pub self_referencing: bool,
    pub polyobj: bool,
    /// Earlier line with identical end points, if any.
    pub overlap: Option<usize>,
}

impl LineInfo {
    /// Whether the line contributes half-edges.
    pub fn is_eligible(&self) -> bool {
        !self.zero_length
            && !self.polyobj
            && self.overlap.is_none()
            && (self.front_sector.is_some() || self.back_sector.is_some())
    }

    /// Number of half-edges the factory will create for this line.
    pub fn hedge_count(&self) -> usize {
        if !self.is_eligible() {
            return 0;
        }
        usize::from(self.front_sector.is_some()) + usize::from(self.back_sector.is_some())
    }
}

#[derive(Debug, Clone, Default)]
pub struct LineAnnotations {
    pub lines: Vec<LineInfo>,
    /// For every input vertex, the lowest-indexed vertex at the same spot.
    pub vertex_equiv: Vec<usize>,
}

/// Annotates every line of `map`.
///
/// Fails on the first dangling vertex, sidedef or sector reference, before
/// anything else is computed.
pub fn annotate_lines(map: &MapData) -> Result<LineAnnotations> {
    validate_references(map)?;

    let vertex_equiv = merge_duplicate_vertices(&map.vertices);
    let mut lines = Vec::with_capacity(map.linedefs.len());
    let mut first_by_ends: HashMap<(usize, usize), usize> = HashMap::new();

    for (index, line) in map.linedefs.iter().enumerate() {
        let start = vertex_equiv[line.start];
        let end = vertex_equiv[line.end];
        let front_sector = map.line_sector(line, Side::Front);
        let back_sector = map.line_sector(line, Side::Back);

        let mut info = LineInfo {
            start,
            end,
            front_sector,
            back_sector,
            two_sided: front_sector.is_some() && back_sector.is_some(),
            zero_length: start == end,
            self_referencing: map.is_self_ref(line),
            polyobj: line.polyobj,
            overlap: None,
        };

        if front_sector.is_none() && back_sector.is_none() {
            warn!("Linedef #{} has no sides, ignoring it", index);
        }

        if !info.zero_length && !info.polyobj {
            let key = (start.min(end), start.max(end));
            match first_by_ends.get(&key) {
                Some(&first) => info.overlap = Some(first),
                None => {
                    first_by_ends.insert(key, index);
                }
            }
        }

        lines.push(info);
    }

    debug!(
        "Annotated {} lines: {} two-sided, {} zero-length, {} overlapping, {} self-referencing, {} polyobject",
        lines.len(),
        lines.iter().filter(|l| l.two_sided).count(),
        lines.iter().filter(|l| l.zero_length).count(),
        lines.iter().filter(|l| l.overlap.is_some()).count(),
        lines.iter().filter(|l| l.self_referencing).count(),
        lines.iter().filter(|l| l.polyobj).count(),
    );

    Ok(LineAnnotations { lines, vertex_equiv })
}

fn validate_references(map: &MapData) -> Result<()> {
    for (index, line) in map.linedefs.iter().enumerate() {
        for vertex in [line.start, line.end] {
            if vertex >= map.vertices.len() {
                return Err(BspError::MissingVertex { line: index, vertex });
            }
        }
        for sidedef in [line.right, line.left].into_iter().flatten() {
            let side = map
                .sidedefs
                .get(sidedef)
                .ok_or(BspError::MissingSideDef { line: index, sidedef })?;
            if side.sector >= map.sectors.len() {
                return Err(BspError::MissingSector { sidedef, sector: side.sector });
            }
        }
    }
    Ok(())
}

fn merge_duplicate_vertices(vertices: &[Vertex]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..vertices.len()).collect();
    order.sort_by(|&a, &b| {
        vertices[a]
            .x
            .total_cmp(&vertices[b].x)
            .then(vertices[a].y.total_cmp(&vertices[b].y))
            .then(a.cmp(&b))
    });

    let mut equiv: Vec<usize> = (0..vertices.len()).collect();
    for pair in order.windows(2) {
        let (prev, cur) = (pair[0], pair[1]);
        if vertices[prev].matches(vertices[cur].x, vertices[cur].y) {
            equiv[cur] = equiv[prev];
        }
    }
    equiv
}

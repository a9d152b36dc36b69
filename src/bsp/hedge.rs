// src/bsp/hedge.rs

use serde::Serialize;

use crate::bsp::hedge_tip::VertexFans;
use crate::bsp::line_info::LineInfo;
use crate::map::{Side, Vertex};
use crate::utils::util::compute_angle;

/// Index of a half-edge in its [`HEdgeStore`].
pub type HEdgeId = usize;

/// One directed side of a line (or of a partition gap). The sector it
/// bounds lies on its right.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HEdge {
    pub start: usize,
    pub end: usize,
    /// Source line; `None` for half-edges laid along a partition.
    pub line: Option<usize>,
    pub side: Side,
    pub sector: Option<usize>,
    pub twin: Option<HEdgeId>,
    /// Direction in degrees, `[0, 360)`.
    pub angle: f64,
    /// Set on both pieces once a half-edge has been split.
    pub is_split: bool,
    /// Leaf that owns this half-edge, once assigned.
    pub leaf: Option<usize>,
}

impl HEdge {
    /// True for half-edges created along a partition rather than from a line.
    pub fn is_partition(&self) -> bool {
        self.line.is_none()
    }
}

/// What a split produced: the new piece after the split vertex and, when the
/// half-edge had a twin, the twin together with its own new piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitPieces {
    pub piece: HEdgeId,
    pub twin: Option<(HEdgeId, HEdgeId)>,
}

/// Arena owning every half-edge of a build.
#[derive(Debug, Clone, Default)]
pub struct HEdgeStore {
    hedges: Vec<HEdge>,
}

impl HEdgeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.hedges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hedges.is_empty()
    }

    pub fn get(&self, id: HEdgeId) -> &HEdge {
        &self.hedges[id]
    }

    pub fn get_mut(&mut self, id: HEdgeId) -> &mut HEdge {
        &mut self.hedges[id]
    }

    pub fn push(&mut self, hedge: HEdge) -> HEdgeId {
        self.hedges.push(hedge);
        self.hedges.len() - 1
    }

    pub fn iter(&self) -> impl Iterator<Item = (HEdgeId, &HEdge)> {
        self.hedges.iter().enumerate()
    }

    pub fn into_vec(self) -> Vec<HEdge> {
        self.hedges
    }

    pub fn link_twins(&mut self, a: HEdgeId, b: HEdgeId) {
        self.hedges[a].twin = Some(b);
        self.hedges[b].twin = Some(a);
    }

    /// Splits half-edge `id` at `vertex`.
    ///
    /// `id` keeps its start and now ends at `vertex`; the new piece runs from
    /// `vertex` to the old end. A twin is split at the same vertex and the
    /// twin links are rewired so that each piece pairs with the piece that
    /// covers the same stretch of the line.
    pub fn split(&mut self, id: HEdgeId, vertex: usize) -> SplitPieces {
        let original = self.hedges[id].clone();
        let piece = self.push(HEdge {
            start: vertex,
            twin: None,
            is_split: true,
            ..original.clone()
        });
        let first = &mut self.hedges[id];
        first.end = vertex;
        first.is_split = true;

        let twin = original.twin.map(|twin_id| {
            let twin_original = self.hedges[twin_id].clone();
            let twin_piece = self.push(HEdge {
                start: vertex,
                twin: None,
                is_split: true,
                ..twin_original
            });
            let twin_first = &mut self.hedges[twin_id];
            twin_first.end = vertex;
            twin_first.is_split = true;

            self.link_twins(id, twin_piece);
            self.link_twins(piece, twin_id);
            (twin_id, twin_piece)
        });

        SplitPieces { piece, twin }
    }
}

/// Creates the half-edges of every eligible line, links twins and registers
/// them in the vertex fans. Returns the new half-edges in line order.
pub fn create_hedges(
    lines: &[LineInfo],
    vertices: &[Vertex],
    store: &mut HEdgeStore,
    fans: &mut VertexFans,
) -> Vec<HEdgeId> {
    let mut created = Vec::new();

    for (index, info) in lines.iter().enumerate() {
        if !info.is_eligible() {
            continue;
        }
        let start = vertices[info.start];
        let end = vertices[info.end];

        let front = info.front_sector.map(|sector| {
            store.push(HEdge {
                start: info.start,
                end: info.end,
                line: Some(index),
                side: Side::Front,
                sector: Some(sector),
                twin: None,
                angle: compute_angle(end.x - start.x, end.y - start.y),
                is_split: false,
                leaf: None,
            })
        });
        let back = info.back_sector.map(|sector| {
            store.push(HEdge {
                start: info.end,
                end: info.start,
                line: Some(index),
                side: Side::Back,
                sector: Some(sector),
                twin: None,
                angle: compute_angle(start.x - end.x, start.y - end.y),
                is_split: false,
                leaf: None,
            })
        });

        if let (Some(f), Some(b)) = (front, back) {
            store.link_twins(f, b);
        }
        for id in [front, back].into_iter().flatten() {
            fans.register_hedge(store, id);
            created.push(id);
        }
    }

    created
}

// src/bsp/hedge_tip.rs
//
// Per-vertex fans of wall tips, sorted anti-clockwise. Used to answer
// whether the space in a given direction from a vertex is inside a sector.

use serde::Serialize;

use crate::bsp::hedge::{HEdgeId, HEdgeStore};
use crate::utils::util::{angles_equal, normalize_angle, ANG_EPSILON};

/// One ray leaving a vertex. `right` and `left` are the half-edges whose
/// sectors lie on either side of the ray when looking out from the vertex.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HEdgeTip {
    pub angle: f64,
    pub left: Option<HEdgeId>,
    pub right: Option<HEdgeId>,
}

/// What lies in a direction away from a vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opening {
    Closed,
    Open(usize),
}

impl Opening {
    pub fn is_open(&self) -> bool {
        matches!(self, Opening::Open(_))
    }
}

#[derive(Debug, Clone, Default)]
pub struct VertexFans {
    fans: Vec<Vec<HEdgeTip>>,
}

impl VertexFans {
    pub fn with_vertex_count(count: usize) -> Self {
        VertexFans {
            fans: vec![Vec::new(); count],
        }
    }

    /// Makes room for `vertex`, which may have just been created.
    pub fn ensure(&mut self, vertex: usize) {
        if vertex >= self.fans.len() {
            self.fans.resize_with(vertex + 1, Vec::new);
        }
    }

    /// Inserts a tip keeping the fan sorted by angle. A tip with the same
    /// angle as existing ones goes after them.
    pub fn insert(&mut self, vertex: usize, tip: HEdgeTip) {
        self.ensure(vertex);
        let fan = &mut self.fans[vertex];
        let pos = fan.partition_point(|t| t.angle <= tip.angle);
        fan.insert(pos, tip);
    }

    pub fn tips(&self, vertex: usize) -> &[HEdgeTip] {
        self.fans.get(vertex).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Registers a freshly created line half-edge at its start vertex and,
    /// for a one-sided half-edge, the reversed ray at its end vertex.
    /// Two-sided lines get their end tip from the twin's own registration.
    pub fn register_hedge(&mut self, store: &HEdgeStore, id: HEdgeId) {
        let hedge = store.get(id);
        self.insert(
            hedge.start,
            HEdgeTip {
                angle: hedge.angle,
                left: hedge.twin,
                right: Some(id),
            },
        );
        if hedge.twin.is_none() {
            self.insert(
                hedge.end,
                HEdgeTip {
                    angle: normalize_angle(hedge.angle + 180.0),
                    left: Some(id),
                    right: None,
                },
            );
        }
    }

    /// Adds the two rays through a split vertex: one along `piece` and one
    /// back along `first`, the half-edge that now ends at the vertex.
    pub fn register_split(&mut self, store: &HEdgeStore, vertex: usize, first: HEdgeId, piece: HEdgeId) {
        let before = store.get(first);
        let after = store.get(piece);
        self.insert(
            vertex,
            HEdgeTip {
                angle: after.angle,
                left: after.twin,
                right: Some(piece),
            },
        );
        self.insert(
            vertex,
            HEdgeTip {
                angle: normalize_angle(before.angle + 180.0),
                left: Some(first),
                right: before.twin,
            },
        );
    }

    /// Looks out from `vertex` along `angle` and reports the sector found
    /// there, or `Closed` if the ray runs along a wall or into the void.
    pub fn open_sector(&self, vertex: usize, angle: f64, store: &HEdgeStore) -> Opening {
        let fan = self.tips(vertex);
        if fan.iter().any(|tip| angles_equal(tip.angle, angle)) {
            return Opening::Closed;
        }

        let side = match fan.iter().find(|tip| angle + ANG_EPSILON < tip.angle) {
            Some(tip) => tip.right,
            None => fan.last().and_then(|tip| tip.left),
        };

        match side.and_then(|id| store.get(id).sector) {
            Some(sector) => Opening::Open(sector),
            None => Opening::Closed,
        }
    }
}

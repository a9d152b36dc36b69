// src/bsp/tree.rs
//
// Final, numbered BSP tree: nodes and leaves in post-order, half-edges laid
// out contiguously per leaf.

use serde::Serialize;

use crate::bsp::bsp_util::{BoundingBox, Partition};
use crate::bsp::error::{BspError, Result};
use crate::bsp::hedge::{HEdge, HEdgeStore};
use crate::bsp::leaf::Leaf;
use crate::bsp::line_info::LineInfo;
use crate::bsp::partitioner::BuildTree;
use crate::map::Vertex;
use crate::utils::Point2D;

/// A child reference: either an internal node or a leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BspChild {
    Node(usize),
    Leaf(usize),
}

impl BspChild {
    pub fn is_leaf(&self) -> bool {
        matches!(self, BspChild::Leaf(_))
    }
}

/// An internal node. `front` is the right-hand side of the partition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BspNode {
    pub partition: Partition,
    pub front: BspChild,
    pub back: BspChild,
    pub front_bbox: BoundingBox,
    pub back_bbox: BoundingBox,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BuildStats {
    pub nodes: usize,
    pub leaves: usize,
    pub hedges: usize,
    /// Half-edges that come from lines.
    pub line_hedges: usize,
    /// Half-edges laid along partitions.
    pub partition_hedges: usize,
    pub vertices: usize,
    pub new_vertices: usize,
    pub max_depth: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct BspTree {
    root: BspChild,
    nodes: Vec<BspNode>,
    leaves: Vec<Leaf>,
    hedges: Vec<HEdge>,
    line_info: Vec<LineInfo>,
    stats: BuildStats,
}

impl BspTree {
    pub fn root(&self) -> BspChild {
        self.root
    }

    pub fn nodes(&self) -> &[BspNode] {
        &self.nodes
    }

    pub fn leaves(&self) -> &[Leaf] {
        &self.leaves
    }

    pub fn hedges(&self) -> &[HEdge] {
        &self.hedges
    }

    pub fn line_info(&self) -> &[LineInfo] {
        &self.line_info
    }

    pub fn stats(&self) -> &BuildStats {
        &self.stats
    }

    /// Corner points of a leaf, in loop order. Corners missing from
    /// `vertices` are skipped.
    pub fn leaf_vertices(&self, leaf: usize, vertices: &[Vertex]) -> Vec<Point2D> {
        self.leaves
            .get(leaf)
            .map(|l| {
                l.hedges
                    .iter()
                    .filter_map(|&id| self.hedges.get(id))
                    .filter_map(|hedge| vertices.get(hedge.start))
                    .map(Vertex::point)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Walks from the root to the leaf containing `point`. Points on a
    /// partition line go to the front.
    pub fn locate_point(&self, point: &Point2D) -> usize {
        let mut child = self.root;
        loop {
            match child {
                BspChild::Leaf(leaf) => return leaf,
                BspChild::Node(node) => {
                    let node = &self.nodes[node];
                    child = if node.partition.is_front(point) { node.front } else { node.back };
                }
            }
        }
    }
}

/// Numbers the recursive tree in post-order (front, back, node), computes
/// the bounding boxes and renumbers the half-edges leaf by leaf.
pub fn assemble_tree(
    tree: BuildTree,
    leaves: Vec<Leaf>,
    hedges: HEdgeStore,
    line_info: Vec<LineInfo>,
    mut stats: BuildStats,
) -> Result<BspTree> {
    let mut assembler = Assembler {
        source: leaves,
        nodes: Vec::new(),
        leaves: Vec::new(),
    };
    let (root, _) = assembler.walk(tree);

    // Old half-edge id -> new id.
    let mut remap: Vec<Option<usize>> = vec![None; hedges.len()];
    let mut next = 0;
    for leaf in &assembler.leaves {
        for &id in &leaf.hedges {
            remap[id] = Some(next);
            next += 1;
        }
    }
    if let Some(lost) = remap.iter().position(Option::is_none) {
        return Err(BspError::LostHalfEdge { hedge: lost });
    }

    let old = hedges.into_vec();
    let mut ordered = Vec::with_capacity(old.len());
    for (index, leaf) in assembler.leaves.iter_mut().enumerate() {
        for id in leaf.hedges.iter_mut() {
            let mut hedge = old[*id].clone();
            hedge.twin = match hedge.twin {
                Some(twin) => Some(remap[twin].ok_or(BspError::LostHalfEdge { hedge: twin })?),
                None => None,
            };
            hedge.leaf = Some(index);
            *id = ordered.len();
            ordered.push(hedge);
        }
    }

    stats.nodes = assembler.nodes.len();
    stats.leaves = assembler.leaves.len();
    stats.hedges = ordered.len();
    stats.line_hedges = ordered.iter().filter(|h| !h.is_partition()).count();
    stats.partition_hedges = stats.hedges - stats.line_hedges;

    Ok(BspTree {
        root,
        nodes: assembler.nodes,
        leaves: assembler.leaves,
        hedges: ordered,
        line_info,
        stats,
    })
}

struct Assembler {
    source: Vec<Leaf>,
    nodes: Vec<BspNode>,
    leaves: Vec<Leaf>,
}

impl Assembler {
    fn walk(&mut self, tree: BuildTree) -> (BspChild, BoundingBox) {
        match tree {
            BuildTree::Leaf(index) => {
                let leaf = std::mem::take(&mut self.source[index]);
                let bbox = leaf.bbox;
                self.leaves.push(leaf);
                (BspChild::Leaf(self.leaves.len() - 1), bbox)
            }
            BuildTree::Node { partition, front, back } => {
                let (front, front_bbox) = self.walk(*front);
                let (back, back_bbox) = self.walk(*back);
                self.nodes.push(BspNode {
                    partition,
                    front,
                    back,
                    front_bbox,
                    back_bbox,
                });
                (BspChild::Node(self.nodes.len() - 1), front_bbox.union(&back_bbox))
            }
        }
    }
}

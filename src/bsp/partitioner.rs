// src/bsp/partitioner.rs
//
// Recursive space partitioning: picks a partition for each half-edge set,
// splits what crosses it, closes the gaps along it and recurses on both
// halves until every set is convex.

use std::collections::{HashMap, HashSet};

use log::debug;

use crate::bsp::bsp_util::Partition;
use crate::bsp::config::BspConfig;
use crate::bsp::error::{BspError, Result};
use crate::bsp::hedge::{HEdgeId, HEdgeStore, SplitPieces};
use crate::bsp::hedge_tip::VertexFans;
use crate::bsp::intercept::{add_minisegs, CutList};
use crate::bsp::leaf::{build_leaf, Leaf};
use crate::bsp::partition::{choose_partition, classify, HEdgePosition};
use crate::map::Vertex;
use crate::utils::Point2D;

/// The tree as the recursion produces it, before numbering.
#[derive(Debug)]
pub enum BuildTree {
    Node {
        partition: Partition,
        front: Box<BuildTree>,
        back: Box<BuildTree>,
    },
    Leaf(usize),
}

/// Everything the partitioner owned, handed over once recursion is done.
#[derive(Debug)]
pub struct PartitionOutput {
    pub tree: BuildTree,
    pub hedges: HEdgeStore,
    pub vertices: Vec<Vertex>,
    pub leaves: Vec<Leaf>,
    pub max_depth: usize,
    pub new_vertices: usize,
    pub partition_hedges: usize,
}

pub struct Partitioner<'a> {
    config: &'a BspConfig,
    hedges: HEdgeStore,
    vertices: Vec<Vertex>,
    fans: VertexFans,
    /// Split vertices created on each line, reused by later splits.
    line_vertices: HashMap<usize, Vec<usize>>,
    /// Split pieces waiting to join the set that holds the keyed half-edge.
    orphans: HashMap<HEdgeId, Vec<HEdgeId>>,
    leaves: Vec<Leaf>,
    max_depth: usize,
    new_vertices: usize,
    partition_hedges: usize,
}

impl<'a> Partitioner<'a> {
    pub fn new(config: &'a BspConfig, hedges: HEdgeStore, vertices: Vec<Vertex>, fans: VertexFans) -> Self {
        Partitioner {
            config,
            hedges,
            vertices,
            fans,
            line_vertices: HashMap::new(),
            orphans: HashMap::new(),
            leaves: Vec::new(),
            max_depth: 0,
            new_vertices: 0,
            partition_hedges: 0,
        }
    }

    /// Partitions `set` down to convex leaves.
    pub fn run(mut self, set: Vec<HEdgeId>) -> Result<PartitionOutput> {
        let tree = self.build_subtree(set, 0)?;
        if let Some(&hedge) = self.orphans.values().flatten().min() {
            return Err(BspError::LostHalfEdge { hedge });
        }
        Ok(PartitionOutput {
            tree,
            hedges: self.hedges,
            vertices: self.vertices,
            leaves: self.leaves,
            max_depth: self.max_depth,
            new_vertices: self.new_vertices,
            partition_hedges: self.partition_hedges,
        })
    }

    fn build_subtree(&mut self, mut set: Vec<HEdgeId>, depth: usize) -> Result<BuildTree> {
        self.collect_orphans(&mut set);

        if set.is_empty() {
            return Err(BspError::EmptyPartition { depth });
        }
        if depth > self.config.depth_limit {
            return Err(BspError::DepthExceeded {
                limit: self.config.depth_limit,
                hedges: set.len(),
            });
        }
        self.max_depth = self.max_depth.max(depth);

        let Some(candidate) = choose_partition(&set, &self.hedges, &self.vertices, self.config) else {
            return self.make_leaf(&set);
        };

        debug!(
            "Depth {}: partition on half-edge #{} ({} half-edges, {} splits, {} front, {} back)",
            depth,
            candidate.hedge,
            set.len(),
            candidate.splits,
            candidate.front,
            candidate.back
        );

        let partition = candidate.partition;
        let (front, back) = self.divide(set, &partition)?;
        let front = self.build_subtree(front, depth + 1)?;
        let back = self.build_subtree(back, depth + 1)?;

        Ok(BuildTree::Node {
            partition,
            front: Box::new(front),
            back: Box::new(back),
        })
    }

    fn make_leaf(&mut self, set: &[HEdgeId]) -> Result<BuildTree> {
        let leaf = build_leaf(set, &self.hedges, &self.fans, &self.vertices, self.config.epsilon)?;
        let index = self.leaves.len();
        for &id in &leaf.hedges {
            self.hedges.get_mut(id).leaf = Some(index);
        }
        self.leaves.push(leaf);
        Ok(BuildTree::Leaf(index))
    }

    // Pieces queued against a member join the set; they may carry queues
    // of their own.
    fn collect_orphans(&mut self, set: &mut Vec<HEdgeId>) {
        let mut i = 0;
        while i < set.len() {
            if let Some(pieces) = self.orphans.remove(&set[i]) {
                set.extend(pieces);
            }
            i += 1;
        }
    }

    /// Distributes `set` over the two sides of `partition`, splitting every
    /// spanning half-edge and adding partition half-edges across open gaps.
    fn divide(&mut self, set: Vec<HEdgeId>, partition: &Partition) -> Result<(Vec<HEdgeId>, Vec<HEdgeId>)> {
        let epsilon = self.config.epsilon;
        let mut members: HashSet<HEdgeId> = set.iter().copied().collect();
        let mut worklist = set;
        let mut front = Vec::new();
        let mut back = Vec::new();
        let mut cuts = CutList::new();
        let mut round_vertices = Vec::new();

        let mut i = 0;
        while i < worklist.len() {
            let id = worklist[i];
            i += 1;

            let hedge = self.hedges.get(id);
            let (start, end) = (hedge.start, hedge.end);
            let a = self.vertices[start].point();
            let b = self.vertices[end].point();
            let (position, da, db) = classify(partition, &a, &b, epsilon);

            match position {
                HEdgePosition::Collinear => {
                    cuts.add(start);
                    cuts.add(end);
                    if a.vector_to(&b).dot(&partition.direction) > 0.0 {
                        front.push(id);
                    } else {
                        back.push(id);
                    }
                }
                HEdgePosition::Front | HEdgePosition::Back => {
                    if da.abs() <= epsilon {
                        cuts.add(start);
                    }
                    if db.abs() <= epsilon {
                        cuts.add(end);
                    }
                    if position == HEdgePosition::Front {
                        front.push(id);
                    } else {
                        back.push(id);
                    }
                }
                HEdgePosition::Spanning => {
                    let point = partition.intersection(&a, &b, da, db);
                    let vertex = self.split_vertex(id, &point, &mut round_vertices)?;
                    let pieces = self.split_hedge(id, vertex, &members)?;
                    cuts.add(vertex);

                    if da > 0.0 {
                        front.push(id);
                        back.push(pieces.piece);
                    } else {
                        back.push(id);
                        front.push(pieces.piece);
                    }
                    if let Some((twin, twin_piece)) = pieces.twin {
                        if members.contains(&twin) {
                            members.insert(twin_piece);
                            worklist.push(twin_piece);
                        }
                    }
                }
            }
        }

        let intercepts = cuts.resolve(partition, &self.vertices, &self.fans, &self.hedges);
        self.partition_hedges += add_minisegs(
            &intercepts,
            &self.vertices,
            &mut self.hedges,
            &mut self.fans,
            &mut front,
            &mut back,
        );

        Ok((front, back))
    }

    /// Finds or creates the vertex where half-edge `id` crosses the
    /// partition at `point`.
    fn split_vertex(&mut self, id: HEdgeId, point: &Point2D, round_vertices: &mut Vec<usize>) -> Result<usize> {
        let epsilon = self.config.epsilon;
        let hedge = self.hedges.get(id);
        let line = hedge.line;

        let from_start = self.vertices[hedge.start].point().distance_to(point);
        let from_end = self.vertices[hedge.end].point().distance_to(point);
        if from_start < epsilon || from_end < epsilon {
            return Err(BspError::DegenerateSplit {
                hedge: id,
                line,
                x: point.x,
                y: point.y,
            });
        }

        let on_line = line
            .and_then(|line| self.line_vertices.get(&line))
            .and_then(|known| known.iter().copied().find(|&v| self.vertices[v].is_near(point, epsilon)));
        let existing =
            on_line.or_else(|| round_vertices.iter().copied().find(|&v| self.vertices[v].is_near(point, epsilon)));

        let vertex = match existing {
            Some(vertex) => vertex,
            None => {
                let vertex = self.vertices.len();
                self.vertices.push(Vertex::from(*point));
                self.fans.ensure(vertex);
                self.new_vertices += 1;
                round_vertices.push(vertex);
                vertex
            }
        };

        if let Some(line) = line {
            let known = self.line_vertices.entry(line).or_default();
            if !known.contains(&vertex) {
                known.push(vertex);
            }
        }
        Ok(vertex)
    }

    /// Splits half-edge `id` and its twin at `vertex`. A twin outside
    /// `members` is split too: its piece goes straight into the twin's leaf
    /// if there is one, or waits for the twin's set otherwise.
    fn split_hedge(&mut self, id: HEdgeId, vertex: usize, members: &HashSet<HEdgeId>) -> Result<SplitPieces> {
        let hedge = self.hedges.get(id);
        if let Some(twin) = hedge.twin {
            let other = self.hedges.get(twin);
            if other.start != hedge.end || other.end != hedge.start {
                return Err(BspError::TwinMismatch { hedge: id, twin });
            }
        }

        let pieces = self.hedges.split(id, vertex);
        self.fans.register_split(&self.hedges, vertex, id, pieces.piece);

        if let Some((twin, twin_piece)) = pieces.twin {
            if !members.contains(&twin) {
                match self.hedges.get(twin).leaf {
                    Some(leaf) => {
                        let loop_hedges = &mut self.leaves[leaf].hedges;
                        let pos = loop_hedges
                            .iter()
                            .position(|&h| h == twin)
                            .ok_or(BspError::LostHalfEdge { hedge: twin })?;
                        loop_hedges.insert(pos + 1, twin_piece);
                    }
                    None => self.orphans.entry(twin).or_default().push(twin_piece),
                }
            }
        }

        Ok(pieces)
    }
}

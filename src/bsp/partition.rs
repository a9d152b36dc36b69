// src/bsp/partition.rs
//
// Partition candidate evaluation and selection.

use std::collections::HashSet;

use log::trace;

use crate::bsp::bsp_util::Partition;
use crate::bsp::config::BspConfig;
use crate::bsp::hedge::{HEdgeId, HEdgeStore};
use crate::map::{Side, Vertex};
use crate::utils::Point2D;

/// Where a half-edge lies relative to a partition line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HEdgePosition {
    Front,
    Back,
    Spanning,
    Collinear,
}

/// Classifies the segment `a`-`b` against `partition`. Also returns the
/// perpendicular distances of both ends so callers can reuse them.
///
/// An end within `epsilon` of the line counts as on it; a segment touching
/// the line with one end only belongs to the side of its other end.
pub fn classify(partition: &Partition, a: &Point2D, b: &Point2D, epsilon: f64) -> (HEdgePosition, f64, f64) {
    let da = partition.perp_distance(a);
    let db = partition.perp_distance(b);

    let position = if da.abs() <= epsilon && db.abs() <= epsilon {
        HEdgePosition::Collinear
    } else if da >= -epsilon && db >= -epsilon {
        HEdgePosition::Front
    } else if da <= epsilon && db <= epsilon {
        HEdgePosition::Back
    } else {
        HEdgePosition::Spanning
    };
    (position, da, db)
}

/// A scored partition line taken from one half-edge of a set.
#[derive(Debug, Clone, PartialEq)]
pub struct PartitionCandidate {
    pub hedge: HEdgeId,
    pub partition: Partition,
    pub splits: usize,
    /// Half-edges with some part in front, spanning ones included.
    pub front: usize,
    /// Half-edges with some part behind, spanning ones included.
    pub back: usize,
    pub collinear: usize,
    pub twin_present: bool,
    pub cost: f64,
}

/// Picks the cheapest partition for `set`, or `None` when no candidate has
/// half-edges strictly on both sides, i.e. the set is already convex.
///
/// Unsplit line half-edges are tried before split ones, each (line, side)
/// only once, until `config.max_candidates` valid candidates are scored.
/// Ties keep the first candidate found.
pub fn choose_partition(
    set: &[HEdgeId],
    store: &HEdgeStore,
    vertices: &[Vertex],
    config: &BspConfig,
) -> Option<PartitionCandidate> {
    let members: HashSet<HEdgeId> = set.iter().copied().collect();
    let ordered = set
        .iter()
        .copied()
        .filter(|&id| !store.get(id).is_split)
        .chain(set.iter().copied().filter(|&id| store.get(id).is_split));

    let mut seen: HashSet<(usize, Side)> = HashSet::new();
    let mut best: Option<PartitionCandidate> = None;
    let mut scored = 0;

    for id in ordered {
        let hedge = store.get(id);
        let Some(line) = hedge.line else {
            continue;
        };
        if !seen.insert((line, hedge.side)) {
            continue;
        }

        let partition = Partition::through(vertices[hedge.start].point(), vertices[hedge.end].point());
        let twin_present = hedge.twin.is_some_and(|twin| members.contains(&twin));
        let best_cost = best.as_ref().map(|b| b.cost);

        if let Some(candidate) = evaluate(id, partition, twin_present, set, store, vertices, config, best_cost) {
            trace!(
                "Candidate half-edge #{} (line {}): {} splits, {} front, {} back, cost {:.2}",
                id,
                line,
                candidate.splits,
                candidate.front,
                candidate.back,
                candidate.cost
            );
            scored += 1;
            if best.as_ref().map_or(true, |b| candidate.cost < b.cost) {
                best = Some(candidate);
            }
            if scored >= config.max_candidates {
                break;
            }
        }
    }

    best
}

/// Scores one candidate. Returns `None` if it does not divide the set or
/// cannot beat `best_cost`.
#[allow(clippy::too_many_arguments)]
fn evaluate(
    hedge: HEdgeId,
    partition: Partition,
    twin_present: bool,
    set: &[HEdgeId],
    store: &HEdgeStore,
    vertices: &[Vertex],
    config: &BspConfig,
    best_cost: Option<f64>,
) -> Option<PartitionCandidate> {
    let bonus = if twin_present { config.twin_bonus } else { 0.0 };
    let split_weight = config.split_weight();

    let mut splits: usize = 0;
    let mut front: usize = 0;
    let mut back: usize = 0;
    let mut collinear: usize = 0;

    for &id in set {
        let other = store.get(id);
        let a = vertices[other.start].point();
        let b = vertices[other.end].point();
        match classify(&partition, &a, &b, config.epsilon).0 {
            HEdgePosition::Front => front += 1,
            HEdgePosition::Back => back += 1,
            HEdgePosition::Collinear => collinear += 1,
            HEdgePosition::Spanning => {
                splits += 1;
                front += 1;
                back += 1;
                if let Some(best) = best_cost {
                    if split_weight * splits as f64 - bonus > best {
                        return None;
                    }
                }
            }
        }
    }

    if front == 0 || back == 0 {
        return None;
    }

    let cost = split_weight * splits as f64 + config.balance_penalty * front.abs_diff(back) as f64 - bonus;
    Some(PartitionCandidate {
        hedge,
        partition,
        splits,
        front,
        back,
        collinear,
        twin_present,
        cost,
    })
}

// src/bsp/leaf.rs
use std::collections::HashSet;

use log::warn;
use serde::Serialize;

use crate::bsp::bsp_util::{BoundingBox, Partition};
use crate::bsp::error::{BspError, Result};
use crate::bsp::hedge::{HEdgeId, HEdgeStore};
use crate::bsp::hedge_tip::VertexFans;
use crate::map::Vertex;
use crate::utils::util::{angle_delta_ccw, normalize_angle};

/// A convex region of one sector, bounded by a clockwise loop of half-edges.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Leaf {
    pub hedges: Vec<HEdgeId>,
    pub sector: Option<usize>,
    pub bbox: BoundingBox,
}

/// Stitches a convex set of half-edges into a closed loop.
///
/// The walk starts at the first line half-edge and follows end vertex to
/// start vertex. At each vertex the fan is scanned for the set's half-edges
/// leaving it; where there are several, the one turning hardest towards the
/// inside wins.
pub fn build_leaf(
    set: &[HEdgeId],
    store: &HEdgeStore,
    fans: &VertexFans,
    vertices: &[Vertex],
    epsilon: f64,
) -> Result<Leaf> {
    let first = set
        .iter()
        .copied()
        .find(|&id| !store.get(id).is_partition())
        .or_else(|| set.first().copied())
        .ok_or(BspError::EmptyPartition { depth: 0 })?;

    let mut remaining: HashSet<HEdgeId> = set.iter().copied().filter(|&id| id != first).collect();
    let mut order = vec![first];
    let origin = store.get(first).start;
    let mut visited: HashSet<usize> = HashSet::from([origin]);
    let mut current = first;

    loop {
        let hedge = store.get(current);
        let end = hedge.end;
        if end == origin {
            break;
        }
        if !visited.insert(end) {
            return Err(BspError::UnclosedLeaf { hedge: current, vertex: end });
        }

        let incoming = normalize_angle(hedge.angle + 180.0);
        let next = fans
            .tips(end)
            .iter()
            .filter_map(|tip| tip.right)
            .filter(|id| remaining.contains(id))
            .min_by(|&a, &b| {
                angle_delta_ccw(incoming, store.get(a).angle).total_cmp(&angle_delta_ccw(incoming, store.get(b).angle))
            })
            .ok_or(BspError::UnclosedLeaf { hedge: current, vertex: end })?;

        remaining.remove(&next);
        order.push(next);
        current = next;
    }

    if let Some(&stray) = set.iter().find(|id| remaining.contains(id)) {
        return Err(BspError::UnclosedLeaf {
            hedge: stray,
            vertex: store.get(stray).start,
        });
    }

    check_convex(&order, store, vertices, epsilon)?;

    let sector = store.get(first).sector;
    if order.iter().any(|&id| store.get(id).sector != sector) {
        warn!("Leaf starting at half-edge #{} spans more than one sector", first);
    }

    let points: Vec<_> = order.iter().map(|&id| vertices[store.get(id).start].point()).collect();
    Ok(Leaf {
        hedges: order,
        sector,
        bbox: BoundingBox::from_points(&points),
    })
}

// Every loop vertex must be on or to the right of every half-edge.
fn check_convex(order: &[HEdgeId], store: &HEdgeStore, vertices: &[Vertex], epsilon: f64) -> Result<()> {
    for &id in order {
        let hedge = store.get(id);
        let partition = Partition::through(vertices[hedge.start].point(), vertices[hedge.end].point());
        for &other in order {
            let vertex = store.get(other).start;
            if partition.perp_distance(&vertices[vertex].point()) < -epsilon {
                return Err(BspError::NonConvexLeaf { hedge: id, vertex });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bsp::hedge::create_hedges;
    use crate::bsp::line_info::annotate_lines;
    use crate::map::MapData;

    const EPS: f64 = 1.0 / 128.0;

    fn hedges_of(map: &MapData) -> (HEdgeStore, VertexFans, Vec<HEdgeId>) {
        let notes = annotate_lines(map).unwrap();
        let mut store = HEdgeStore::new();
        let mut fans = VertexFans::with_vertex_count(map.vertices.len());
        let set = create_hedges(&notes.lines, &map.vertices, &mut store, &mut fans);
        (store, fans, set)
    }

    #[test]
    fn test_square_closes_in_any_input_order() {
        let mut map = MapData::new();
        let sector = map.add_room(&[(0.0, 0.0), (0.0, 64.0), (64.0, 64.0), (64.0, 0.0)]);
        let (store, fans, _) = hedges_of(&map);

        let leaf = build_leaf(&[2, 0, 3, 1], &store, &fans, &map.vertices, EPS).unwrap();
        assert_eq!(leaf.hedges, vec![2, 3, 0, 1]);
        assert_eq!(leaf.sector, Some(sector));
        assert_eq!(leaf.bbox, BoundingBox::new(0.0, 0.0, 64.0, 64.0));
    }

    #[test]
    fn test_missing_wall_is_unclosed() {
        let mut map = MapData::new();
        map.add_room(&[(0.0, 0.0), (0.0, 64.0), (64.0, 64.0), (64.0, 0.0)]);
        let (store, fans, _) = hedges_of(&map);

        assert!(matches!(
            build_leaf(&[0, 1, 2], &store, &fans, &map.vertices, EPS),
            Err(BspError::UnclosedLeaf { hedge: 2, .. })
        ));
    }

    #[test]
    fn test_concave_loop_is_rejected() {
        let mut map = MapData::new();
        map.add_room(&[
            (0.0, 0.0),
            (0.0, 128.0),
            (64.0, 128.0),
            (64.0, 64.0),
            (128.0, 64.0),
            (128.0, 0.0),
        ]);
        let (store, fans, set) = hedges_of(&map);

        assert!(matches!(
            build_leaf(&set, &store, &fans, &map.vertices, EPS),
            Err(BspError::NonConvexLeaf { .. })
        ));
    }

    #[test]
    fn test_extra_half_edge_is_unclosed() {
        let mut map = MapData::new();
        map.add_room(&[(0.0, 0.0), (0.0, 64.0), (64.0, 64.0), (64.0, 0.0)]);
        map.add_room(&[(64.0, 0.0), (64.0, 64.0), (128.0, 64.0), (128.0, 0.0)]);
        let (store, fans, set) = hedges_of(&map);

        // West room plus one stray wall from the east room.
        let west: Vec<HEdgeId> = set
            .iter()
            .copied()
            .filter(|&id| store.get(id).sector == Some(0))
            .chain(std::iter::once(set[set.len() - 1]))
            .collect();
        assert!(matches!(
            build_leaf(&west, &store, &fans, &map.vertices, EPS),
            Err(BspError::UnclosedLeaf { .. })
        ));
    }

    #[test]
    fn test_walk_ignores_tips_outside_the_set() {
        let mut map = MapData::new();
        let west = map.add_room(&[(0.0, 0.0), (0.0, 64.0), (64.0, 64.0), (64.0, 0.0)]);
        map.add_room(&[(64.0, 0.0), (64.0, 64.0), (128.0, 64.0), (128.0, 0.0)]);
        let (store, fans, set) = hedges_of(&map);

        // The shared corners carry tips of east room half-edges as well.
        let corner = map.find_vertex(64.0, 0.0).unwrap();
        assert_eq!(fans.tips(corner).len(), 3);

        let west_hedges: Vec<HEdgeId> = set.iter().copied().filter(|&id| store.get(id).sector == Some(west)).collect();
        let leaf = build_leaf(&west_hedges, &store, &fans, &map.vertices, EPS).unwrap();
        assert_eq!(leaf.hedges.len(), 4);
        assert!(leaf.hedges.iter().all(|&id| store.get(id).sector == Some(west)));
    }
}

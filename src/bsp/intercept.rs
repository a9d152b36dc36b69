// src/bsp/intercept.rs
//
// Cut list of the vertices a partition passes through, and the partition
// half-edges that close the gaps between them.

use std::collections::HashMap;

use log::warn;

use crate::bsp::bsp_util::Partition;
use crate::bsp::hedge::{HEdge, HEdgeId, HEdgeStore};
use crate::bsp::hedge_tip::{Opening, VertexFans};
use crate::map::{Side, Vertex};
use crate::utils::util::normalize_angle;

/// A vertex on the partition line, with what lies just before and just
/// after it along the partition direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intercept {
    pub vertex: usize,
    pub along: f64,
    pub before: Opening,
    pub after: Opening,
}

/// Vertices touched by the partition during one division.
#[derive(Debug, Clone, Default)]
pub struct CutList {
    vertices: Vec<usize>,
}

impl CutList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, vertex: usize) {
        if !self.vertices.contains(&vertex) {
            self.vertices.push(vertex);
        }
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Orders the intercepts along the partition. Openings are looked up
    /// now, once every split of the division has registered its tips.
    ///
    /// Each opening is asked along the true direction from one intercept to
    /// its neighbour. A vertex counted as on the partition may sit up to
    /// `epsilon` away from it, and a wall joining two such vertices has to
    /// read as closed.
    pub fn resolve(
        &self,
        partition: &Partition,
        vertices: &[Vertex],
        fans: &VertexFans,
        store: &HEdgeStore,
    ) -> Vec<Intercept> {
        let mut sorted: Vec<(usize, f64)> = self
            .vertices
            .iter()
            .map(|&vertex| (vertex, partition.along_distance(&vertices[vertex].point())))
            .collect();
        sorted.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));

        let forward = partition.direction.angle();
        let backward = normalize_angle(forward + 180.0);
        let towards = |from: usize, to: usize| {
            let angle = vertices[from].point().vector_to(&vertices[to].point()).angle();
            fans.open_sector(from, angle, store)
        };

        (0..sorted.len())
            .map(|i| {
                let (vertex, along) = sorted[i];
                let before = match i.checked_sub(1) {
                    Some(prev) => towards(vertex, sorted[prev].0),
                    None => fans.open_sector(vertex, backward, store),
                };
                let after = match sorted.get(i + 1) {
                    Some(&(next, _)) => towards(vertex, next),
                    None => fans.open_sector(vertex, forward, store),
                };
                Intercept {
                    vertex,
                    along,
                    before,
                    after,
                }
            })
            .collect()
    }
}

/// Creates a twinned pair of partition half-edges across every gap between
/// consecutive intercepts that lies inside the front region. The one running
/// along the partition goes to `front`, its twin to `back`. Both are added to
/// the vertex fans. Returns the number of half-edges added.
///
/// A gap is inside the front region while the half-edges already in `front`
/// arrive at the intercepts before it more often than they leave them.
pub fn add_minisegs(
    intercepts: &[Intercept],
    vertices: &[Vertex],
    store: &mut HEdgeStore,
    fans: &mut VertexFans,
    front: &mut Vec<HEdgeId>,
    back: &mut Vec<HEdgeId>,
) -> usize {
    let mut balance: HashMap<usize, i64> = HashMap::new();
    for &id in front.iter() {
        let hedge = store.get(id);
        *balance.entry(hedge.end).or_default() += 1;
        *balance.entry(hedge.start).or_default() -= 1;
    }

    let mut flow: i64 = 0;
    let mut added = 0;

    for pair in intercepts.windows(2) {
        let (cur, next) = (pair[0], pair[1]);
        flow += balance.get(&cur.vertex).copied().unwrap_or(0);
        if flow == 0 {
            continue;
        }
        if flow.abs() > 1 {
            warn!(
                "{} regions meet the partition between vertices #{} and #{}",
                flow.abs(),
                cur.vertex,
                next.vertex
            );
        }

        let sector = match (cur.after, next.before) {
            (Opening::Open(sector), Opening::Open(other)) => {
                if sector != other {
                    warn!(
                        "Sector mismatch between vertices #{} and #{}: #{} vs #{}",
                        cur.vertex, next.vertex, sector, other
                    );
                }
                Some(sector)
            }
            (Opening::Open(sector), Opening::Closed) | (Opening::Closed, Opening::Open(sector)) => Some(sector),
            (Opening::Closed, Opening::Closed) => {
                warn!(
                    "Gap between vertices #{} and #{} lies outside every sector",
                    cur.vertex, next.vertex
                );
                None
            }
        };

        // Against the partition when near-line vertices come out of order.
        let (from, to) = if flow > 0 {
            (cur.vertex, next.vertex)
        } else {
            (next.vertex, cur.vertex)
        };
        let a = vertices[from].point();
        let b = vertices[to].point();
        let along = store.push(partition_hedge(from, to, Side::Front, sector, a.vector_to(&b).angle()));
        let against = store.push(partition_hedge(to, from, Side::Back, sector, b.vector_to(&a).angle()));
        store.link_twins(along, against);
        fans.register_hedge(store, along);
        fans.register_hedge(store, against);
        front.push(along);
        back.push(against);
        added += 2;
    }

    added
}

fn partition_hedge(start: usize, end: usize, side: Side, sector: Option<usize>, angle: f64) -> HEdge {
    HEdge {
        start,
        end,
        line: None,
        side,
        sector,
        twin: None,
        angle,
        is_split: false,
        leaf: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bsp::hedge::create_hedges;
    use crate::bsp::line_info::annotate_lines;
    use crate::map::MapData;
    use crate::utils::Point2D;

    const EPS: f64 = 1.0 / 128.0;

    fn room(points: &[(f64, f64)]) -> (MapData, HEdgeStore, VertexFans, Vec<HEdgeId>) {
        let mut map = MapData::new();
        map.add_room(points);
        let notes = annotate_lines(&map).unwrap();
        let mut store = HEdgeStore::new();
        let mut fans = VertexFans::with_vertex_count(map.vertices.len());
        let set = create_hedges(&notes.lines, &map.vertices, &mut store, &mut fans);
        (map, store, fans, set)
    }

    #[test]
    fn test_gap_inside_room_gets_minisegs() {
        // Partition heading south through the middle of a square room.
        let (map, mut store, mut fans, _) = room(&[(0.0, 0.0), (0.0, 64.0), (64.0, 64.0), (64.0, 0.0)]);

        // Split the top (line 1) and bottom (line 3) walls at x = 32.
        let mut vertices = map.vertices.clone();
        let top_mid = vertices.len();
        vertices.push(Vertex::new(32.0, 64.0));
        let bottom_mid = vertices.len();
        vertices.push(Vertex::new(32.0, 0.0));
        let top = store.split(1, top_mid);
        fans.register_split(&store, top_mid, 1, top.piece);
        let bottom = store.split(3, bottom_mid);
        fans.register_split(&store, bottom_mid, 3, bottom.piece);

        let partition = Partition::through(Point2D::new(32.0, 64.0), Point2D::new(32.0, 0.0));
        let mut cuts = CutList::new();
        cuts.add(bottom_mid);
        cuts.add(top_mid);
        cuts.add(top_mid);
        assert_eq!(cuts.len(), 2);

        let intercepts = cuts.resolve(&partition, &vertices, &fans, &store);
        assert_eq!(intercepts.len(), 2);
        assert_eq!(intercepts[0].vertex, top_mid);
        assert_eq!(intercepts[0].before, Opening::Closed);
        assert_eq!(intercepts[0].after, Opening::Open(0));
        assert_eq!(intercepts[1].before, Opening::Open(0));
        assert_eq!(intercepts[1].after, Opening::Closed);

        // Front is the west half: west wall, top-left and bottom-left pieces.
        let mut front = vec![0, 1, bottom.piece];
        let mut back = vec![2, top.piece, 3];
        let added = add_minisegs(&intercepts, &vertices, &mut store, &mut fans, &mut front, &mut back);
        assert_eq!(added, 2);
        let along_id = front[3];
        let along = store.get(along_id);
        assert_eq!((along.start, along.end), (top_mid, bottom_mid));
        assert!(along.is_partition());
        assert_eq!(along.sector, Some(0));
        assert_eq!(along.angle, 270.0);
        assert_eq!(store.get(back[3]).twin, Some(along_id));
        assert_eq!(store.get(back[3]).angle, 90.0);
        assert_eq!(fans.tips(top_mid).len(), 3);
        assert_eq!(fans.open_sector(top_mid, 270.0, &store), Opening::Closed);
    }

    #[test]
    fn test_wall_slightly_off_the_partition_stays_closed() {
        // The top wall bends up by 0.005 at (64, 64), less than epsilon.
        let (map, mut store, mut fans, set) =
            room(&[(0.0, 0.0), (0.0, 64.0), (64.0, 64.0), (128.0, 64.005), (128.0, 0.0)]);

        let partition = Partition::through(Point2D::new(0.0, 64.0), Point2D::new(64.0, 64.0));
        assert!(partition.perp_distance(&map.vertices[3].point()).abs() <= EPS);
        let mut cuts = CutList::new();
        for vertex in [1, 2, 3] {
            cuts.add(vertex);
        }

        let intercepts = cuts.resolve(&partition, &map.vertices, &fans, &store);
        assert_eq!(intercepts.len(), 3);
        assert_eq!(intercepts[1].after, Opening::Closed);
        assert_eq!(intercepts[2].before, Opening::Closed);

        // The whole room lies south of the partition.
        let mut front = set.clone();
        let mut back = Vec::new();
        let added = add_minisegs(&intercepts, &map.vertices, &mut store, &mut fans, &mut front, &mut back);
        assert_eq!(added, 0);
        assert_eq!(front, set);
    }

    #[test]
    fn test_wall_dipping_below_the_partition_adds_nothing() {
        // The bottom wall dips to y = -0.005 at (32, -0.005); the partition
        // runs east along y = 0 and the room lies to its north.
        let (map, mut store, mut fans, set) =
            room(&[(0.0, 0.0), (0.0, 64.0), (64.0, 64.0), (64.0, 0.0), (32.0, -0.005)]);
        let partition = Partition::through(Point2D::new(0.0, 0.0), Point2D::new(64.0, 0.0));

        let mut cuts = CutList::new();
        for vertex in [0, 3, 4] {
            cuts.add(vertex);
        }
        let intercepts = cuts.resolve(&partition, &map.vertices, &fans, &store);
        let order: Vec<usize> = intercepts.iter().map(|i| i.vertex).collect();
        assert_eq!(order, vec![0, 4, 3]);

        // Everything is behind an eastward partition.
        let mut front = Vec::new();
        let mut back = set.clone();
        let added = add_minisegs(&intercepts, &map.vertices, &mut store, &mut fans, &mut front, &mut back);
        assert_eq!(added, 0);
        assert_eq!(back.len(), set.len());
    }

    #[test]
    fn test_out_of_order_intercepts_get_a_reversed_pair() {
        let (map, mut store, mut fans, _) = room(&[(0.0, 0.0), (0.0, 64.0), (64.0, 64.0), (64.0, 0.0)]);
        let mut vertices = map.vertices.clone();
        vertices.push(Vertex::new(32.0, 0.0));
        vertices.push(Vertex::new(40.0, 0.0));
        fans.ensure(5);

        // A loose half-edge arrives at the later intercept and one leaves the
        // earlier one; the gap between them must run backwards.
        let leave = store.push(partition_hedge(4, 0, Side::Front, Some(0), 180.0));
        let arrive = store.push(partition_hedge(3, 5, Side::Front, Some(0), 180.0));
        let partition = Partition::through(Point2D::new(0.0, 0.0), Point2D::new(64.0, 0.0));
        let intercepts = vec![
            Intercept { vertex: 4, along: 32.0, before: Opening::Closed, after: Opening::Open(0) },
            Intercept { vertex: 5, along: 40.0, before: Opening::Open(0), after: Opening::Closed },
        ];
        assert!(partition.along_distance(&vertices[4].point()) < partition.along_distance(&vertices[5].point()));

        let mut front = vec![leave, arrive];
        let mut back = Vec::new();
        let added = add_minisegs(&intercepts, &vertices, &mut store, &mut fans, &mut front, &mut back);
        assert_eq!(added, 2);
        let reversed = store.get(front[2]);
        assert_eq!((reversed.start, reversed.end), (5, 4));
        assert_eq!(reversed.angle, 180.0);
        assert_eq!(store.get(back[0]).start, 4);
    }

    #[test]
    fn test_close_intercepts_stay_apart() {
        let (map, mut store, mut fans, set) = room(&[(0.0, 0.0), (0.0, 64.0), (64.0, 64.0), (64.0, 0.0)]);
        let mut vertices = map.vertices.clone();
        vertices.push(Vertex::new(0.001, 64.0));

        // Along the west wall, heading north.
        let partition = Partition::through(Point2D::new(0.0, 0.0), Point2D::new(0.0, 64.0));
        let mut cuts = CutList::new();
        cuts.add(0);
        cuts.add(1);
        cuts.add(4);
        let intercepts = cuts.resolve(&partition, &vertices, &fans, &store);
        let order: Vec<usize> = intercepts.iter().map(|i| i.vertex).collect();
        assert_eq!(order, vec![0, 1, 4]);

        let mut front = set.clone();
        let mut back = Vec::new();
        assert_eq!(add_minisegs(&intercepts, &vertices, &mut store, &mut fans, &mut front, &mut back), 0);
        assert!(back.is_empty());
    }
}

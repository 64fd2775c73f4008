use std::cmp::Ordering;
use std::collections::BinaryHeap;

use gridstar_graph::{GraphPack, NodeId};

/// Sequential ground truth, used by tests to check Engine-M and Engine-S
/// against an implementation with no shared queue, no atomics, and no
/// parallelism to get wrong.
#[derive(Copy, Clone, PartialEq)]
struct State {
    cost: f32,
    priority: f32,
    node: NodeId,
}

impl Eq for State {}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .partial_cmp(&self.priority)
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Shortest path from `src` to `dst` over `pack`, or `None` if unreachable.
pub fn shortest_path(pack: &GraphPack, src: NodeId, dst: NodeId) -> Option<Vec<NodeId>> {
    if src == dst {
        return Some(vec![src]);
    }

    let dst_coord = pack.coord(dst);
    let h = |id: NodeId| {
        let c = pack.coord(id);
        let dx = (dst_coord.x - c.x) as f32;
        let dy = (dst_coord.y - c.y) as f32;
        (dx * dx + dy * dy).sqrt()
    };

    let mut open = BinaryHeap::new();
    let mut best_cost = vec![f32::INFINITY; pack.node_count()];
    let mut pred = vec![0u32; pack.node_count()];
    let mut closed = vec![false; pack.node_count()];

    best_cost[src as usize] = 0.0;
    open.push(State {
        cost: 0.0,
        priority: h(src),
        node: src,
    });

    while let Some(State { cost, node, .. }) = open.pop() {
        if closed[node as usize] {
            continue;
        }
        if node == dst {
            let mut path = vec![node];
            let mut cur = node;
            while cur != src {
                cur = pred[cur as usize];
                path.push(cur);
            }
            path.reverse();
            return Some(path);
        }
        closed[node as usize] = true;
        for edge in pack.out_edges(node) {
            if closed[edge.target as usize] {
                continue;
            }
            let tentative = cost + edge.cost;
            if tentative < best_cost[edge.target as usize] {
                best_cost[edge.target as usize] = tentative;
                pred[edge.target as usize] = node;
                open.push(State {
                    cost: tentative,
                    priority: tentative + h(edge.target),
                    node: edge.target,
                });
            }
        }
    }
    None
}

/// Sum of per-step costs along `path`. Mirrors the tolerance-based
/// CPU-vs-device comparison used to validate search results.
pub fn path_cost(pack: &GraphPack, path: &[NodeId]) -> f32 {
    path.windows(2).map(|w| pack.path_cost(w[0], w[1])).sum()
}

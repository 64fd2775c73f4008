use bytemuck::{Pod, Zeroable};

use crate::error::PackError;
use crate::grid::{Grid, NodeId};

/// Coordinate pair stored per node, `repr(C)` so it can be uploaded to a
/// device buffer byte-for-byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct NodeCoord {
    pub x: i32,
    pub y: i32,
}

/// One out-edge: target node id and traversal cost.
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Edge {
    pub target: u32,
    pub cost: f32,
}

/// `edges[begin..end)` are the out-edges of the node at this index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct Adjacency {
    pub begin: u32,
    pub end: u32,
}

/// The dense, pointer-free device layout for a [`Grid`]: a node coordinate
/// table, a flat edge list, and a per-node adjacency index into it.
///
/// Built once per `Grid` (see [`GraphPack::build`]) and uploaded once; every
/// search query reuses the same arrays read-only.
#[derive(Debug, Clone)]
pub struct GraphPack {
    nodes: Vec<NodeCoord>,
    edges: Vec<Edge>,
    adjacency: Vec<Adjacency>,
}

impl GraphPack {
    /// Scans `grid` in row-major order, emitting `nodes`, `edges`, and
    /// `adjacency`. Fails if the edge count would overflow a 32-bit index.
    pub fn build(grid: &Grid) -> Result<Self, PackError> {
        let node_count = grid.size() as u64;
        if node_count > u32::MAX as u64 {
            return Err(PackError::NodeCountOverflow { count: node_count });
        }

        let mut nodes = Vec::with_capacity(grid.size());
        let mut edges = Vec::new();
        let mut adjacency = Vec::with_capacity(grid.size());

        for y in 0..grid.height() {
            for x in 0..grid.width() {
                nodes.push(NodeCoord {
                    x: x as i32,
                    y: y as i32,
                });

                let id = grid.node_id(x, y);
                let begin = edges.len() as u64;
                for (target, cost) in grid.neighbors(id) {
                    edges.push(Edge { target, cost });
                }
                let end = edges.len() as u64;

                if end > u32::MAX as u64 {
                    return Err(PackError::EdgeCountOverflow { count: end });
                }
                adjacency.push(Adjacency {
                    begin: begin as u32,
                    end: end as u32,
                });
            }
        }

        log::debug!(
            "GraphPack::build: {} nodes, {} edges",
            nodes.len(),
            edges.len()
        );

        Ok(Self {
            nodes,
            edges,
            adjacency,
        })
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn nodes(&self) -> &[NodeCoord] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn adjacency(&self) -> &[Adjacency] {
        &self.adjacency
    }

    pub fn coord(&self, id: NodeId) -> NodeCoord {
        self.nodes[id as usize]
    }

    /// Out-edges of `id`, via its adjacency window into `edges`.
    pub fn out_edges(&self, id: NodeId) -> &[Edge] {
        let a = self.adjacency[id as usize];
        &self.edges[a.begin as usize..a.end as usize]
    }

    /// Cost of the edge `u -> v`, `0` if `u == v`, `+inf` if `v` is not one of
    /// `u`'s out-edges.
    pub fn path_cost(&self, u: NodeId, v: NodeId) -> f32 {
        if u == v {
            return 0.0;
        }
        self.out_edges(u)
            .iter()
            .find(|e| e.target == v)
            .map(|e| e.cost)
            .unwrap_or(f32::INFINITY)
    }
}

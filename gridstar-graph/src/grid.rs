use crate::error::GraphError;

/// Dense node identifier: `id = y * width + x`. Device-side code refers to
/// nodes exclusively by this id, never by `(x, y)`.
pub type NodeId = u32;

/// Neighborhood choice for a [`Grid`]. Fixed per grid; the search engines are
/// written against [`Grid::neighbors`] and work identically under either.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Connectivity {
    /// N, E, S, W.
    Four,
    /// N, E, S, W plus the four diagonals.
    Eight,
}

const SQRT2: f32 = std::f32::consts::SQRT_2;

/// An immutable W×H rectangle of passable/blocked cells.
///
/// `Grid` never mutates after construction; it is the read-only collaborator
/// input described by the system's external interfaces. Obstacle placement
/// and grid generation are the caller's responsibility.
#[derive(Debug, Clone)]
pub struct Grid {
    width: u32,
    height: u32,
    /// Row-major; `blocked[y * width + x]` is `true` iff `(x, y)` cannot be entered.
    blocked: Vec<bool>,
    connectivity: Connectivity,
}

impl Grid {
    /// Builds an all-passable grid.
    pub fn empty(width: u32, height: u32, connectivity: Connectivity) -> Result<Self, GraphError> {
        Self::from_blocked(width, height, vec![false; (width as usize) * (height as usize)], connectivity)
    }

    /// Builds a grid from a row-major passability bitmap.
    pub fn from_blocked(
        width: u32,
        height: u32,
        blocked: Vec<bool>,
        connectivity: Connectivity,
    ) -> Result<Self, GraphError> {
        if width == 0 || height == 0 {
            return Err(GraphError::EmptyGrid { width, height });
        }
        let expected = width as usize * height as usize;
        if blocked.len() != expected {
            return Err(GraphError::BlockedLenMismatch {
                expected,
                actual: blocked.len(),
                width,
                height,
            });
        }
        Ok(Self {
            width,
            height,
            blocked,
            connectivity,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn connectivity(&self) -> Connectivity {
        self.connectivity
    }

    pub fn in_bounds(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as u64) < self.width as u64 && (y as u64) < self.height as u64
    }

    /// `true` if `(x, y)` cannot be entered. Coordinates are assumed in bounds
    /// (callers go through [`Grid::neighbors`] or check [`Grid::in_bounds`] first).
    pub fn blocked(&self, x: u32, y: u32) -> bool {
        self.blocked[self.node_id(x, y) as usize]
    }

    pub fn node_id(&self, x: u32, y: u32) -> NodeId {
        y * self.width + x
    }

    /// Like [`Grid::node_id`], but for caller-supplied coordinates that may
    /// fall outside the grid rather than ones already known to be in bounds.
    pub fn checked_node_id(&self, x: i64, y: i64) -> Result<NodeId, GraphError> {
        if !self.in_bounds(x, y) {
            return Err(GraphError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(self.node_id(x as u32, y as u32))
    }

    pub fn node_coord(&self, id: NodeId) -> (u32, u32) {
        (id % self.width, id / self.width)
    }

    /// Euclidean distance between cell centers of `u` and `v`, or `+inf` if
    /// either is blocked or they are not adjacent under the active
    /// connectivity. `path_cost(u, u) == 0`.
    pub fn path_cost(&self, u: NodeId, v: NodeId) -> f32 {
        if u == v {
            return 0.0;
        }
        let (ux, uy) = self.node_coord(u);
        let (vx, vy) = self.node_coord(v);
        if self.blocked(ux, uy) || self.blocked(vx, vy) {
            return f32::INFINITY;
        }
        let dx = vx as i64 - ux as i64;
        let dy = vy as i64 - uy as i64;
        if !self.is_step(dx, dy) {
            return f32::INFINITY;
        }
        step_cost(dx, dy)
    }

    /// Out-edges of `u`: `(neighbor_id, cost)` pairs filtered by bounds and
    /// passability. `u` itself must be passable and in bounds.
    pub fn neighbors(&self, u: NodeId) -> Vec<(NodeId, f32)> {
        let (x, y) = self.node_coord(u);
        if self.blocked(x, y) {
            return Vec::new();
        }
        let mut out = Vec::with_capacity(match self.connectivity {
            Connectivity::Four => 4,
            Connectivity::Eight => 8,
        });
        let steps: &[(i64, i64)] = match self.connectivity {
            // Clockwise from north, matching the reference implementation.
            Connectivity::Four => &[(0, -1), (1, 0), (0, 1), (-1, 0)],
            Connectivity::Eight => &[
                (-1, -1),
                (0, -1),
                (1, -1),
                (-1, 0),
                (1, 0),
                (-1, 1),
                (0, 1),
                (1, 1),
            ],
        };
        for &(dx, dy) in steps {
            let nx = x as i64 + dx;
            let ny = y as i64 + dy;
            if !self.in_bounds(nx, ny) {
                continue;
            }
            let (nx, ny) = (nx as u32, ny as u32);
            if self.blocked(nx, ny) {
                continue;
            }
            out.push((self.node_id(nx, ny), step_cost(dx, dy)));
        }
        out
    }

    /// Whether `(dx, dy)` is a single legal step under the active connectivity.
    fn is_step(&self, dx: i64, dy: i64) -> bool {
        match self.connectivity {
            Connectivity::Four => (dx == 0) != (dy == 0) && dx.abs() <= 1 && dy.abs() <= 1,
            Connectivity::Eight => {
                (dx != 0 || dy != 0) && dx.abs() <= 1 && dy.abs() <= 1
            }
        }
    }
}

fn step_cost(dx: i64, dy: i64) -> f32 {
    if dx != 0 && dy != 0 {
        SQRT2
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_grid() {
        assert!(matches!(
            Grid::empty(0, 5, Connectivity::Four),
            Err(GraphError::EmptyGrid { .. })
        ));
    }

    #[test]
    fn four_connected_neighbors_of_corner() {
        let grid = Grid::empty(3, 3, Connectivity::Four).unwrap();
        let id = grid.node_id(0, 0);
        let mut neighbors = grid.neighbors(id);
        neighbors.sort_by_key(|(id, _)| *id);
        assert_eq!(neighbors.len(), 2);
        for (_, cost) in &neighbors {
            assert_eq!(*cost, 1.0);
        }
    }

    #[test]
    fn eight_connected_diagonal_cost_is_sqrt2() {
        let grid = Grid::empty(3, 3, Connectivity::Eight).unwrap();
        let id = grid.node_id(0, 0);
        let diag_id = grid.node_id(1, 1);
        let cost = grid
            .neighbors(id)
            .into_iter()
            .find(|(n, _)| *n == diag_id)
            .map(|(_, c)| c)
            .unwrap();
        assert!((cost - SQRT2).abs() < 1e-6);
    }

    #[test]
    fn blocked_cell_has_no_outgoing_edges() {
        let grid = Grid::from_blocked(2, 1, vec![true, false], Connectivity::Four).unwrap();
        let id = grid.node_id(0, 0);
        assert!(grid.neighbors(id).is_empty());
    }

    #[test]
    fn path_cost_is_symmetric_and_zero_on_self() {
        let grid = Grid::empty(4, 4, Connectivity::Eight).unwrap();
        let a = grid.node_id(1, 1);
        let b = grid.node_id(2, 2);
        assert_eq!(grid.path_cost(a, a), 0.0);
        assert_eq!(grid.path_cost(a, b), grid.path_cost(b, a));
    }

    #[test]
    fn rejects_mismatched_blocked_bitmap_length() {
        assert!(matches!(
            Grid::from_blocked(3, 3, vec![false; 5], Connectivity::Four),
            Err(GraphError::BlockedLenMismatch {
                expected: 9,
                actual: 5,
                ..
            })
        ));
    }

    #[test]
    fn checked_node_id_rejects_out_of_bounds_coordinates() {
        let grid = Grid::empty(3, 3, Connectivity::Four).unwrap();
        assert_eq!(grid.checked_node_id(1, 1), Ok(grid.node_id(1, 1)));
        assert_eq!(
            grid.checked_node_id(-1, 0),
            Err(GraphError::OutOfBounds {
                x: -1,
                y: 0,
                width: 3,
                height: 3,
            })
        );
        assert!(matches!(
            grid.checked_node_id(3, 0),
            Err(GraphError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn path_cost_is_infinite_for_non_adjacent_nodes() {
        let grid = Grid::empty(5, 5, Connectivity::Four).unwrap();
        let a = grid.node_id(0, 0);
        let b = grid.node_id(4, 4);
        assert!(grid.path_cost(a, b).is_infinite());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn small_grid(width: u32, height: u32, bits: Vec<bool>, eight: bool) -> Grid {
        let connectivity = if eight {
            Connectivity::Eight
        } else {
            Connectivity::Four
        };
        let mut blocked = bits;
        blocked.resize((width * height) as usize, false);
        Grid::from_blocked(width, height, blocked, connectivity).unwrap()
    }

    proptest! {
        /// path_cost is symmetric for every ordered pair of node ids on any grid.
        #[test]
        fn path_cost_symmetric(
            width in 1u32..8,
            height in 1u32..8,
            bits in proptest::collection::vec(any::<bool>(), 0..64),
            eight in any::<bool>(),
            a in 0u32..64,
            b in 0u32..64,
        ) {
            let grid = small_grid(width, height, bits, eight);
            let n = grid.size() as u32;
            let a = a % n;
            let b = b % n;
            prop_assert_eq!(grid.path_cost(a, b), grid.path_cost(b, a));
        }

        /// Every id a node reports as a neighbor claims that node back as a neighbor.
        #[test]
        fn neighbors_are_mutual(
            width in 1u32..8,
            height in 1u32..8,
            bits in proptest::collection::vec(any::<bool>(), 0..64),
            eight in any::<bool>(),
            a in 0u32..64,
        ) {
            let grid = small_grid(width, height, bits, eight);
            let n = grid.size() as u32;
            let a = a % n;
            for (b, cost) in grid.neighbors(a) {
                let back = grid.neighbors(b);
                prop_assert!(back.iter().any(|&(id, c)| id == a && (c - cost).abs() < 1e-5));
            }
        }
    }
}

use gridstar_graph::{Connectivity, GraphPack};

/// Engine-M tuning. `max_path_len` bounds the per-agent output buffer the
/// same way it bounds the GPU kernel's fixed-size path slot: a path found
/// longer than this is reported as too long rather than truncated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    pub max_path_len: usize,
}

impl EngineConfig {
    /// `2 * (width + height)`, the documented worst-case simple-path length
    /// bound on a W×H grid.
    pub fn for_grid(width: u32, height: u32) -> Self {
        Self {
            max_path_len: 2 * (width as usize + height as usize),
        }
    }
}

/// Engine-S tuning: queue count, per-queue open-list capacity, and the
/// per-node successor scratch width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CooperativeConfig {
    pub queues: usize,
    pub queue_capacity: usize,
    pub max_successors: usize,
}

impl CooperativeConfig {
    /// A reasonable default for `pack`: one queue per available core (capped
    /// at the node count so small grids don't leave queues permanently idle),
    /// open-list capacity sized with headroom over an even split of the
    /// nodes, and successor width matched to the grid's connectivity.
    pub fn for_pack(pack: &GraphPack, connectivity: Connectivity) -> Self {
        let node_count = pack.node_count().max(1);
        let queues = rayon_like_queue_count().min(node_count).max(1);
        let queue_capacity = ((node_count + queues - 1) / queues) * 4;
        let max_successors = match connectivity {
            Connectivity::Four => 4,
            Connectivity::Eight => 8,
        };
        Self {
            queues,
            queue_capacity,
            max_successors,
        }
    }
}

fn rayon_like_queue_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridstar_graph::Grid;

    #[test]
    fn engine_config_matches_documented_bound() {
        let config = EngineConfig::for_grid(10, 20);
        assert_eq!(config.max_path_len, 60);
    }

    #[test]
    fn cooperative_config_never_zero_queues_on_tiny_grid() {
        let grid = Grid::empty(1, 1, Connectivity::Four).unwrap();
        let pack = GraphPack::build(&grid).unwrap();
        let config = CooperativeConfig::for_pack(&pack, Connectivity::Four);
        assert!(config.queues >= 1);
        assert!(config.queue_capacity >= 1);
    }
}

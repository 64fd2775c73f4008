use gridstar_device::{AgentOutcome, DeviceBackend, GraphBuffers, IterationOutcome, ReturnCode};
use gridstar_graph::NodeId;

use crate::config::CooperativeConfig;
use crate::error::SearchError;

/// Engine-S: a single source/destination pair solved cooperatively across
/// `config.queues` partitioned priority queues. Drives `backend`'s frontier
/// one best-first step at a time until it is found, proven unreachable, or a
/// queue overflows.
pub fn solve_one(
    backend: &DeviceBackend,
    graph: &GraphBuffers,
    src: NodeId,
    dst: NodeId,
    config: &CooperativeConfig,
) -> Result<AgentOutcome, SearchError> {
    if src == dst {
        return Ok(AgentOutcome {
            code: ReturnCode::Found,
            path: vec![src],
        });
    }

    let mut frontier = backend.create_frontier(
        graph,
        src,
        dst,
        config.queues,
        config.queue_capacity,
        config.max_successors,
    )?;

    loop {
        match backend.run_iteration(graph, &mut frontier)? {
            IterationOutcome::Running => continue,
            IterationOutcome::Found => {
                let path = backend.reconstruct_path(&frontier, dst);
                log::debug!("Engine-S: found path of length {}", path.len());
                return Ok(AgentOutcome {
                    code: ReturnCode::Found,
                    path,
                });
            }
            IterationOutcome::NoPath => {
                return Ok(AgentOutcome {
                    code: ReturnCode::NoPath,
                    path: Vec::new(),
                })
            }
            IterationOutcome::QueueOverflow => {
                return Ok(AgentOutcome {
                    code: ReturnCode::QueueOverflow,
                    path: Vec::new(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridstar_device::{select_backend, BackendPreference};
    use gridstar_graph::{Connectivity, GraphPack, Grid};

    use crate::oracle;

    #[test]
    fn agrees_with_oracle_on_open_grid() {
        let grid = Grid::empty(6, 6, Connectivity::Eight).unwrap();
        let pack = GraphPack::build(&grid).unwrap();
        let backend = select_backend(BackendPreference::CpuOnly);
        let buffers = backend.upload_graph(&pack).unwrap();
        let config = CooperativeConfig::for_pack(&pack, Connectivity::Eight);

        let outcome = solve_one(&backend, &buffers, 0, 35, &config).unwrap();
        assert_eq!(outcome.code, ReturnCode::Found);

        let expected = oracle::shortest_path(&pack, 0, 35).unwrap();
        assert!(
            (oracle::path_cost(&pack, &outcome.path) - oracle::path_cost(&pack, &expected)).abs()
                < 0.1
        );
    }

    #[test]
    fn trivial_when_src_equals_dst() {
        let grid = Grid::empty(3, 3, Connectivity::Four).unwrap();
        let pack = GraphPack::build(&grid).unwrap();
        let backend = select_backend(BackendPreference::CpuOnly);
        let buffers = backend.upload_graph(&pack).unwrap();
        let config = CooperativeConfig::for_pack(&pack, Connectivity::Four);

        let outcome = solve_one(&backend, &buffers, 4, 4, &config).unwrap();
        assert_eq!(outcome.path, vec![4]);
    }

    #[test]
    fn reports_no_path_when_unreachable() {
        let grid =
            Grid::from_blocked(3, 1, vec![false, true, false], Connectivity::Four).unwrap();
        let pack = GraphPack::build(&grid).unwrap();
        let backend = select_backend(BackendPreference::CpuOnly);
        let buffers = backend.upload_graph(&pack).unwrap();
        let config = CooperativeConfig::for_pack(&pack, Connectivity::Four);

        let outcome = solve_one(&backend, &buffers, 0, 2, &config).unwrap();
        assert_eq!(outcome.code, ReturnCode::NoPath);
    }

    #[test]
    fn reports_queue_overflow_when_capacity_is_too_small() {
        let grid = Grid::empty(8, 8, Connectivity::Eight).unwrap();
        let pack = GraphPack::build(&grid).unwrap();
        let backend = select_backend(BackendPreference::CpuOnly);
        let buffers = backend.upload_graph(&pack).unwrap();
        let config = CooperativeConfig {
            queues: 4,
            queue_capacity: 1,
            max_successors: 8,
        };

        let outcome = solve_one(&backend, &buffers, 0, 63, &config).unwrap();
        assert_eq!(outcome.code, ReturnCode::QueueOverflow);
    }

    #[test]
    fn scenario_3x3_corner_to_corner_cost_is_four() {
        let grid = Grid::empty(3, 3, Connectivity::Four).unwrap();
        let pack = GraphPack::build(&grid).unwrap();
        let backend = select_backend(BackendPreference::CpuOnly);
        let buffers = backend.upload_graph(&pack).unwrap();
        let config = CooperativeConfig::for_pack(&pack, Connectivity::Four);

        let src = grid.node_id(0, 0);
        let dst = grid.node_id(2, 2);
        let outcome = solve_one(&backend, &buffers, src, dst, &config).unwrap();
        assert_eq!(outcome.code, ReturnCode::Found);
        assert_eq!(outcome.path.len(), 5);
        assert!((oracle::path_cost(&pack, &outcome.path) - 4.0).abs() < 1e-5);
    }

    #[test]
    fn scenario_3x3_blocked_column_reports_no_path() {
        let mut blocked = vec![false; 9];
        for y in 0..3u32 {
            blocked[(y * 3 + 1) as usize] = true; // blocks column x=1
        }
        let grid = Grid::from_blocked(3, 3, blocked, Connectivity::Four).unwrap();
        let pack = GraphPack::build(&grid).unwrap();
        let backend = select_backend(BackendPreference::CpuOnly);
        let buffers = backend.upload_graph(&pack).unwrap();
        let config = CooperativeConfig::for_pack(&pack, Connectivity::Four);

        let src = grid.node_id(0, 0);
        let dst = grid.node_id(2, 0);
        let outcome = solve_one(&backend, &buffers, src, dst, &config).unwrap();
        assert_eq!(outcome.code, ReturnCode::NoPath);
    }

    #[test]
    fn scenario_5x5_eight_connected_diagonal_cost_is_four_sqrt2() {
        let grid = Grid::empty(5, 5, Connectivity::Eight).unwrap();
        let pack = GraphPack::build(&grid).unwrap();
        let backend = select_backend(BackendPreference::CpuOnly);
        let buffers = backend.upload_graph(&pack).unwrap();
        let config = CooperativeConfig::for_pack(&pack, Connectivity::Eight);

        let src = grid.node_id(0, 0);
        let dst = grid.node_id(4, 4);
        let outcome = solve_one(&backend, &buffers, src, dst, &config).unwrap();
        assert_eq!(outcome.code, ReturnCode::Found);
        assert_eq!(outcome.path.len(), 5);
        let expected = 4.0 * std::f32::consts::SQRT_2;
        assert!((oracle::path_cost(&pack, &outcome.path) - expected).abs() < 1e-4);
    }
}

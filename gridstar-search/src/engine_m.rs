use gridstar_device::{AgentOutcome, AgentQuery, DeviceBackend, GraphBuffers};

use crate::config::EngineConfig;
use crate::error::SearchError;

/// Engine-M: one independent A* search per query, dispatched to `backend` in
/// a single batch. A failure in one query never affects another — the
/// backend itself guarantees per-agent isolation.
pub fn solve_many(
    backend: &DeviceBackend,
    graph: &GraphBuffers,
    queries: &[AgentQuery],
    config: &EngineConfig,
) -> Result<Vec<AgentOutcome>, SearchError> {
    log::debug!("Engine-M: dispatching {} queries", queries.len());
    Ok(backend.multi_agent_astar(graph, queries, config.max_path_len)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridstar_device::{select_backend, BackendPreference};
    use gridstar_graph::{Connectivity, GraphPack, Grid};

    #[test]
    fn solves_independent_queries_in_one_batch() {
        let grid = Grid::empty(4, 4, Connectivity::Four).unwrap();
        let pack = GraphPack::build(&grid).unwrap();
        let backend = select_backend(BackendPreference::CpuOnly);
        let buffers = backend.upload_graph(&pack).unwrap();
        let config = EngineConfig::for_grid(4, 4);

        let queries = vec![
            AgentQuery { src: 0, dst: 15 },
            AgentQuery { src: 0, dst: 0 },
        ];
        let outcomes = solve_many(&backend, &buffers, &queries, &config).unwrap();
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].code, gridstar_device::ReturnCode::Found);
        assert_eq!(outcomes[1].path, vec![0]);
    }

    #[test]
    fn reports_no_path_for_unreachable_query() {
        let grid =
            Grid::from_blocked(3, 1, vec![false, true, false], Connectivity::Four).unwrap();
        let pack = GraphPack::build(&grid).unwrap();
        let backend = select_backend(BackendPreference::CpuOnly);
        let buffers = backend.upload_graph(&pack).unwrap();
        let config = EngineConfig::for_grid(3, 1);

        let queries = vec![AgentQuery { src: 0, dst: 2 }];
        let outcomes = solve_many(&backend, &buffers, &queries, &config).unwrap();
        assert_eq!(outcomes[0].code, gridstar_device::ReturnCode::NoPath);
    }

    #[test]
    fn scenario_10x10_batch_costs_match_manhattan_distance() {
        let grid = Grid::empty(10, 10, Connectivity::Four).unwrap();
        let pack = GraphPack::build(&grid).unwrap();
        let backend = select_backend(BackendPreference::CpuOnly);
        let buffers = backend.upload_graph(&pack).unwrap();
        let config = EngineConfig::for_grid(10, 10);

        let queries = vec![
            AgentQuery { src: grid.node_id(0, 0), dst: grid.node_id(9, 9) },
            AgentQuery { src: grid.node_id(9, 0), dst: grid.node_id(0, 9) },
            AgentQuery { src: grid.node_id(5, 5), dst: grid.node_id(5, 5) },
        ];
        let outcomes = solve_many(&backend, &buffers, &queries, &config).unwrap();
        assert_eq!(outcomes.len(), 3);

        let costs: Vec<f32> = outcomes
            .iter()
            .map(|o| crate::oracle::path_cost(&pack, &o.path))
            .collect();
        assert!((costs[0] - 18.0).abs() < 1e-5);
        assert!((costs[1] - 18.0).abs() < 1e-5);
        assert!((costs[2] - 0.0).abs() < 1e-5);
        assert_eq!(outcomes[2].path, vec![grid.node_id(5, 5)]);
    }
}

//! Engine-M (multi-agent parallel A*) and Engine-S (single-source
//! cooperative GA*) over a [`gridstar_graph::GraphPack`], driven through a
//! [`gridstar_device::DeviceBackend`].
//!
//! Engine-M batches independent queries and lets the backend parallelize
//! across them. Engine-S drives one backend frontier through its outer
//! best-first loop until it converges, runs out of reachable nodes, or a
//! queue overflows.

pub mod config;
pub mod engine_m;
pub mod engine_s;
pub mod error;
pub mod oracle;

pub use config::{CooperativeConfig, EngineConfig};
pub use engine_m::solve_many;
pub use engine_s::solve_one;
pub use error::SearchError;

pub use gridstar_device::{AgentOutcome, AgentQuery, ReturnCode};

use std::sync::Arc;

use gridstar_graph::{GraphPack, NodeId};

use crate::capabilities::DeviceCapabilities;
use crate::cpu::{CpuBackend, CpuFrontier};
use crate::error::DeviceError;
#[cfg(feature = "gpu")]
use crate::gpu::WgpuBackend;

/// Per-agent return code. Numeric values match the external interface so a
/// caller embedding this crate can surface them verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ReturnCode {
    Found = 0,
    Running = 1,
    NoPath = 2,
    PathTooLong = 3,
    QueueOverflow = 4,
    DeviceError = 5,
}

/// A single Engine-M query: find a path from `src` to `dst`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentQuery {
    pub src: NodeId,
    pub dst: NodeId,
}

/// Result of one agent's search: a terminal code plus the node-id path when found.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentOutcome {
    pub code: ReturnCode,
    pub path: Vec<NodeId>,
}

/// What advanced by one step of Engine-S's outer driver loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IterationOutcome {
    Running,
    Found,
    NoPath,
    QueueOverflow,
}

/// A graph uploaded to a backend. Device buffers (real or conceptual) are
/// owned here and released when this value is dropped — there is no separate
/// `free` call, matching the contract that upload/download pairs are released
/// on every exit path.
pub enum GraphBuffers {
    Cpu(Arc<GraphPack>),
    #[cfg(feature = "gpu")]
    Gpu(crate::gpu::GpuGraphBuffers),
}

/// The compute device the search engines dispatch work to.
///
/// This is a closed enum rather than a trait object: the set of kernels the
/// engines need is fixed and small, and an enum lets [`DeviceBackend::capabilities`]
/// be answered without a virtual call and lets each variant's kernel surface
/// differ (the GPU variant has no cooperative-search kernels at all) without a
/// trait method nobody can implement.
pub enum DeviceBackend {
    Cpu(CpuBackend),
    #[cfg(feature = "gpu")]
    Gpu(WgpuBackend),
}

impl DeviceBackend {
    pub fn capabilities(&self) -> &DeviceCapabilities {
        match self {
            DeviceBackend::Cpu(b) => b.capabilities(),
            #[cfg(feature = "gpu")]
            DeviceBackend::Gpu(b) => b.capabilities(),
        }
    }

    pub fn is_gpu(&self) -> bool {
        match self {
            DeviceBackend::Cpu(_) => false,
            #[cfg(feature = "gpu")]
            DeviceBackend::Gpu(_) => true,
        }
    }

    /// Uploads a graph once; every query against it reuses the result.
    pub fn upload_graph(&self, pack: &GraphPack) -> Result<GraphBuffers, DeviceError> {
        match self {
            DeviceBackend::Cpu(b) => Ok(GraphBuffers::Cpu(b.upload_graph(pack))),
            #[cfg(feature = "gpu")]
            DeviceBackend::Gpu(b) => b.upload_graph(pack).map(GraphBuffers::Gpu),
        }
    }

    /// Engine-M kernel: one independent A* search per query, run in parallel.
    pub fn multi_agent_astar(
        &self,
        graph: &GraphBuffers,
        queries: &[AgentQuery],
        max_path_len: usize,
    ) -> Result<Vec<AgentOutcome>, DeviceError> {
        match (self, graph) {
            (DeviceBackend::Cpu(b), GraphBuffers::Cpu(g)) => {
                Ok(b.multi_agent_astar(g, queries, max_path_len))
            }
            #[cfg(feature = "gpu")]
            (DeviceBackend::Gpu(b), GraphBuffers::Gpu(g)) => {
                b.multi_agent_astar(g, queries, max_path_len)
            }
            #[allow(unreachable_patterns)]
            _ => Err(DeviceError::AllocationFailed {
                bytes: 0,
                reason: "graph buffers were not produced by this backend".to_string(),
            }),
        }
    }

    /// Allocates Engine-S's cooperative search state. Fails fast with
    /// [`DeviceError::MissingCapability`] on a backend without 64-bit atomics,
    /// before any queue or info-table memory is touched.
    pub fn create_frontier(
        &self,
        graph: &GraphBuffers,
        src: NodeId,
        dst: NodeId,
        queues: usize,
        queue_capacity: usize,
        max_successors: usize,
    ) -> Result<CpuFrontier, DeviceError> {
        if !self.capabilities().has_atomic64 {
            return Err(DeviceError::MissingCapability {
                device: self.capabilities().name.clone(),
                capability: "atomic64",
            });
        }
        match (self, graph) {
            (DeviceBackend::Cpu(b), GraphBuffers::Cpu(g)) => Ok(b.create_frontier(
                g,
                src,
                dst,
                queues,
                queue_capacity,
                max_successors,
            )),
            #[allow(unreachable_patterns)]
            _ => Err(DeviceError::MissingCapability {
                device: self.capabilities().name.clone(),
                capability: "cooperative-search",
            }),
        }
    }

    /// Advances every queue of `frontier` by one best-first step: clear S,
    /// extract-and-expand, clear T, duplicate-detection, compute-and-push-back.
    pub fn run_iteration(
        &self,
        graph: &GraphBuffers,
        frontier: &mut CpuFrontier,
    ) -> Result<IterationOutcome, DeviceError> {
        match (self, graph) {
            (DeviceBackend::Cpu(b), GraphBuffers::Cpu(g)) => Ok(b.run_iteration(g, frontier)),
            #[allow(unreachable_patterns)]
            _ => Err(DeviceError::MissingCapability {
                device: self.capabilities().name.clone(),
                capability: "cooperative-search",
            }),
        }
    }

    /// Walks `frontier`'s info table from `dst` back to its source.
    pub fn reconstruct_path(&self, frontier: &CpuFrontier, dst: NodeId) -> Vec<NodeId> {
        frontier.reconstruct_path(dst)
    }
}

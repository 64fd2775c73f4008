//! Optional `wgpu` compute backend. Scoped to Engine-M only: WGSL has no
//! portable 64-bit atomic, so it cannot host Engine-S's info table and
//! reports `has_atomic64: false` — [`crate::backend::DeviceBackend::create_frontier`]
//! turns that into a `MissingCapability` error before any cooperative-search
//! memory is touched.

use wgpu::util::DeviceExt;

use gridstar_graph::GraphPack;

use crate::backend::{AgentOutcome, AgentQuery, ReturnCode};
use crate::capabilities::DeviceCapabilities;
use crate::error::DeviceError;

const SHADER_SOURCE: &str = include_str!("multi_agent_astar.wgsl");

pub struct WgpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipeline: wgpu::ComputePipeline,
    capabilities: DeviceCapabilities,
}

pub struct GpuGraphBuffers {
    nodes: wgpu::Buffer,
    edges: wgpu::Buffer,
    adjacency: wgpu::Buffer,
    node_count: u32,
}

impl WgpuBackend {
    /// Selects an adapter and opens a device, or returns `None` if no
    /// compatible hardware is present. Never panics.
    pub fn try_new() -> Option<Self> {
        pollster::block_on(Self::try_new_async())
    }

    async fn try_new_async() -> Option<Self> {
        let instance = wgpu::Instance::default();
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await?;
        let info = adapter.get_info();
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor::default(), None)
            .await
            .ok()?;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("gridstar-multi-agent-astar"),
            source: wgpu::ShaderSource::Wgsl(SHADER_SOURCE.into()),
        });
        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("gridstar-multi-agent-astar-pipeline"),
            layout: None,
            module: &shader,
            entry_point: "main",
        });

        Some(Self {
            device,
            queue,
            pipeline,
            capabilities: DeviceCapabilities {
                name: format!("wgpu:{}", info.name),
                local_memory_bytes: 16 * 1024,
                max_work_group_size: 256,
                has_atomic64: false,
            },
        })
    }

    pub fn capabilities(&self) -> &DeviceCapabilities {
        &self.capabilities
    }

    pub fn upload_graph(&self, pack: &GraphPack) -> Result<GpuGraphBuffers, DeviceError> {
        let nodes = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("gridstar-nodes"),
            contents: bytemuck::cast_slice(pack.nodes()),
            usage: wgpu::BufferUsages::STORAGE,
        });
        let edges = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("gridstar-edges"),
            contents: bytemuck::cast_slice(pack.edges()),
            usage: wgpu::BufferUsages::STORAGE,
        });
        let adjacency = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("gridstar-adjacency"),
            contents: bytemuck::cast_slice(pack.adjacency()),
            usage: wgpu::BufferUsages::STORAGE,
        });
        Ok(GpuGraphBuffers {
            nodes,
            edges,
            adjacency,
            node_count: pack.node_count() as u32,
        })
    }

    /// Dispatches one invocation per query. Each invocation runs the same
    /// flat-array-scan A* the CPU backend uses, over per-agent scratch
    /// buffers sized `queries.len() * node_count` — the GPU-appropriate
    /// encoding of "one worker per agent" for graphs small enough that this
    /// scratch fits in device memory.
    pub fn multi_agent_astar(
        &self,
        graph: &GpuGraphBuffers,
        queries: &[AgentQuery],
        max_path_len: usize,
    ) -> Result<Vec<AgentOutcome>, DeviceError> {
        if queries.is_empty() {
            return Ok(Vec::new());
        }
        let n = graph.node_count as usize;
        let agents = queries.len();

        #[repr(C)]
        #[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
        struct Query {
            src: u32,
            dst: u32,
        }
        let query_data: Vec<Query> = queries
            .iter()
            .map(|q| Query { src: q.src, dst: q.dst })
            .collect();

        let queries_buf = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("gridstar-queries"),
            contents: bytemuck::cast_slice(&query_data),
            usage: wgpu::BufferUsages::STORAGE,
        });

        let params = [n as u32, agents as u32, max_path_len as u32];
        let params_buf = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("gridstar-params"),
            contents: bytemuck::cast_slice(&params),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let scratch_floats = agents * n;
        let g_buf = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("gridstar-g-scratch"),
            size: (scratch_floats * std::mem::size_of::<f32>()) as u64,
            usage: wgpu::BufferUsages::STORAGE,
            mapped_at_creation: false,
        });
        let pred_buf = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("gridstar-pred-scratch"),
            size: (scratch_floats * std::mem::size_of::<u32>()) as u64,
            usage: wgpu::BufferUsages::STORAGE,
            mapped_at_creation: false,
        });
        let status_buf = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("gridstar-status-scratch"),
            size: (scratch_floats * std::mem::size_of::<u32>()) as u64,
            usage: wgpu::BufferUsages::STORAGE,
            mapped_at_creation: false,
        });
        let result_buf_size = (agents * (2 + max_path_len) * std::mem::size_of::<u32>()) as u64;
        let results_buf = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("gridstar-results"),
            size: result_buf_size,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });
        let readback_buf = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("gridstar-results-readback"),
            size: result_buf_size,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let layout = self.pipeline.get_bind_group_layout(0);
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("gridstar-bind-group"),
            layout: &layout,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: graph.nodes.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 1, resource: graph.edges.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 2, resource: graph.adjacency.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 3, resource: queries_buf.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 4, resource: params_buf.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 5, resource: g_buf.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 6, resource: pred_buf.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 7, resource: status_buf.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 8, resource: results_buf.as_entire_binding() },
            ],
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("gridstar-encoder") });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("gridstar-pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            let workgroups = (agents as u32 + 63) / 64;
            pass.dispatch_workgroups(workgroups.max(1), 1, 1);
        }
        encoder.copy_buffer_to_buffer(&results_buf, 0, &readback_buf, 0, result_buf_size);
        self.queue.submit(Some(encoder.finish()));

        let slice = readback_buf.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |res| {
            let _ = tx.send(res);
        });
        self.device.poll(wgpu::Maintain::Wait);
        rx.recv()
            .map_err(|e| DeviceError::KernelLaunchFailed {
                kernel: "multi_agent_astar",
                reason: e.to_string(),
            })?
            .map_err(|e| DeviceError::KernelLaunchFailed {
                kernel: "multi_agent_astar",
                reason: e.to_string(),
            })?;

        let data = slice.get_mapped_range();
        let words: &[u32] = bytemuck::cast_slice(&data);
        let stride = 2 + max_path_len;
        let mut outcomes = Vec::with_capacity(agents);
        for a in 0..agents {
            let base = a * stride;
            let code = match words[base] {
                0 => ReturnCode::Found,
                2 => ReturnCode::NoPath,
                3 => ReturnCode::PathTooLong,
                _ => ReturnCode::NoPath,
            };
            let len = words[base + 1] as usize;
            let path = if code == ReturnCode::Found {
                words[base + 2..base + 2 + len].to_vec()
            } else {
                Vec::new()
            };
            outcomes.push(AgentOutcome { code, path });
        }
        drop(data);
        readback_buf.unmap();
        Ok(outcomes)
    }
}

use crate::backend::DeviceBackend;
use crate::cpu::CpuBackend;

/// What a backend can offer the search engines. Queried once per backend and
/// consulted before dispatch, never discovered by a failed kernel launch.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceCapabilities {
    pub name: String,
    /// Bytes of fast scratch memory advertised per work-group.
    pub local_memory_bytes: usize,
    pub max_work_group_size: usize,
    /// 64-bit atomic compare-and-swap, required by Engine-S's info table.
    pub has_atomic64: bool,
}

/// Caller's backend preference. Mirrors the "prefer the accelerator, always
/// have a CPU fallback" shape used elsewhere for device selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendPreference {
    #[default]
    CpuOnly,
    #[cfg_attr(not(feature = "gpu"), allow(dead_code))]
    GpuIfAvailable,
}

/// Resolves a preference into a concrete, ready-to-use backend. Never fails:
/// an unsatisfiable GPU preference silently falls back to the CPU backend,
/// since the CPU backend satisfies every capability this crate defines.
pub fn select_backend(preference: BackendPreference) -> DeviceBackend {
    match preference {
        BackendPreference::CpuOnly => DeviceBackend::Cpu(CpuBackend::new()),
        #[cfg(feature = "gpu")]
        BackendPreference::GpuIfAvailable => match crate::gpu::WgpuBackend::try_new() {
            Some(gpu) => DeviceBackend::Gpu(gpu),
            None => DeviceBackend::Cpu(CpuBackend::new()),
        },
        #[cfg(not(feature = "gpu"))]
        BackendPreference::GpuIfAvailable => DeviceBackend::Cpu(CpuBackend::new()),
    }
}

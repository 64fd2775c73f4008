use thiserror::Error;

/// Errors a [`crate::DeviceBackend`] can raise. Per the error-handling design,
/// a missing capability is fatal and surfaced before any work is dispatched;
/// everything else is scoped to the query that triggered it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DeviceError {
    #[error("device '{device}' is missing required capability: {capability}")]
    MissingCapability {
        device: String,
        capability: &'static str,
    },
    #[error("failed to allocate device buffer of {bytes} bytes: {reason}")]
    AllocationFailed { bytes: usize, reason: String },
    #[error("kernel '{kernel}' failed to launch: {reason}")]
    KernelLaunchFailed { kernel: &'static str, reason: String },
}

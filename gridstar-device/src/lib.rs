//! Abstract compute-device contract for the grid search engines.
//!
//! [`DeviceBackend`] is the seam between the search engines and whatever
//! actually runs the work: buffer upload/release, named-kernel dispatch for
//! Engine-M, and the cooperative-search primitives Engine-S drives through
//! its own outer loop. The CPU backend (`cpu-rayon`) is always available and
//! satisfies every capability this crate defines; an optional `wgpu` backend
//! is available behind the `gpu` feature for Engine-M only.

pub mod backend;
pub mod capabilities;
pub mod cpu;
pub mod error;
#[cfg(feature = "gpu")]
pub mod gpu;

pub use backend::{AgentOutcome, AgentQuery, DeviceBackend, GraphBuffers, IterationOutcome, ReturnCode};
pub use capabilities::{select_backend, BackendPreference, DeviceCapabilities};
pub use cpu::{CpuBackend, CpuFrontier};
pub use error::DeviceError;

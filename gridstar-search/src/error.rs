use thiserror::Error;

use gridstar_device::DeviceError;

/// Errors from driving a search engine, as opposed to a bad outcome of the
/// search itself (no path, queue overflow, ... are [`gridstar_device::ReturnCode`]
/// values, not errors: they are expected outputs, not failures).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SearchError {
    #[error(transparent)]
    Device(#[from] DeviceError),
}

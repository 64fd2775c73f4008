use thiserror::Error;

/// Errors raised while constructing or querying a [`crate::Grid`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("grid dimensions must be non-zero, got {width}x{height}")]
    EmptyGrid { width: u32, height: u32 },
    #[error("coordinate ({x}, {y}) is out of bounds for a {width}x{height} grid")]
    OutOfBounds {
        x: i64,
        y: i64,
        width: u32,
        height: u32,
    },
    #[error("blocked bitmap has {actual} entries, expected {expected} ({width}x{height})")]
    BlockedLenMismatch {
        expected: usize,
        actual: usize,
        width: u32,
        height: u32,
    },
}

/// Errors raised while flattening a [`crate::Grid`] into a [`crate::GraphPack`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PackError {
    #[error("graph has {count} nodes, which overflows a 32-bit node id")]
    NodeCountOverflow { count: u64 },
    #[error("graph has {count} edges, which overflows a 32-bit edge index")]
    EdgeCountOverflow { count: u64 },
}

//! Grid graph model and device-friendly flat layout.
//!
//! [`Grid`] is the host-side, read-only obstacle map. [`GraphPack`] flattens
//! a `Grid` into the dense, pointer-free arrays (`nodes`, `edges`,
//! `adjacency`) that a compute backend uploads once and reuses across many
//! search queries.

pub mod error;
pub mod grid;
pub mod pack;

pub use error::{GraphError, PackError};
pub use grid::{Connectivity, Grid, NodeId};
pub use pack::{Adjacency, Edge, GraphPack, NodeCoord};

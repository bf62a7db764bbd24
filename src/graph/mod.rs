//! The graph container and its support services
//!
//! [`Graph`] is the single long-lived mutable structure every rewrite pass
//! operates on. The node list defines both membership and, once stabilized,
//! a topological dependency order. Lookup, construction, and re-sorting live
//! in the submodules; passes call them but never reimplement them.

use indexmap::IndexMap;

use crate::ir::{Node, ValueInfo};
use crate::tensor::Tensor;

pub mod accessors;
pub mod builder;
pub mod mutators;
pub mod sort;

pub use accessors::find_size_shape_from_value;
pub use builder::{list_to_constant, list_to_constant_f32};
pub use sort::stabilize;

/// A computation graph
#[derive(Debug, Clone, Default)]
pub struct Graph {
    /// Ordered node list; defines membership and topological order
    pub nodes: Vec<Node>,
    /// Graph input value descriptors
    pub inputs: Vec<ValueInfo>,
    /// Graph output value descriptors
    pub outputs: Vec<ValueInfo>,
    /// Named constant tensors, pre-promotion
    pub initializers: IndexMap<String, Tensor>,
    /// Shape/type metadata for intermediate values
    pub values: IndexMap<String, ValueInfo>,
}

impl Graph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

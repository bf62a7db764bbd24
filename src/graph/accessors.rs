//! Name resolution over the graph
//!
//! The lookup surface the rewrite passes are written against: resolve a name
//! to its producing node, its value metadata, or its input/output descriptor.

use smallvec::SmallVec;

use crate::ir::{Node, ValueInfo};
use crate::tensor::numel;

use super::Graph;

impl Graph {
    // ========================================================================
    // Node lookup
    // ========================================================================

    /// Find the node that produces the given value name
    pub fn find_node_by_output_name(&self, name: &str) -> Option<&Node> {
        self.nodes
            .iter()
            .find(|n| n.outputs.iter().any(|o| o == name))
    }

    /// Find a node by its own name
    pub fn find_node_by_name(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.name == name)
    }

    /// Find a node by its own name, mutably
    pub fn find_node_by_name_mut(&mut self, name: &str) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.name == name)
    }

    // ========================================================================
    // Value metadata lookup
    // ========================================================================

    /// Find intermediate value metadata by name
    pub fn find_value_by_name(&self, name: &str) -> Option<&ValueInfo> {
        self.values.get(name)
    }

    /// Find intermediate value metadata by name, mutably
    pub fn find_value_by_name_mut(&mut self, name: &str) -> Option<&mut ValueInfo> {
        self.values.get_mut(name)
    }

    /// Find a graph input descriptor by name
    pub fn find_input_by_name(&self, name: &str) -> Option<&ValueInfo> {
        self.inputs.iter().find(|vi| vi.name == name)
    }

    /// Find a graph output descriptor by name
    pub fn find_output_by_name(&self, name: &str) -> Option<&ValueInfo> {
        self.outputs.iter().find(|vi| vi.name == name)
    }

    // ========================================================================
    // Consumers
    // ========================================================================

    /// The nodes that list `name` among their inputs
    pub fn consumers(&self, name: &str) -> SmallVec<[&Node; 4]> {
        self.nodes
            .iter()
            .filter(|n| n.inputs.iter().any(|i| i == name))
            .collect()
    }

    /// How many nodes list `name` among their inputs
    ///
    /// Counts nodes, not occurrences.
    pub fn count_consumers(&self, name: &str) -> usize {
        self.nodes
            .iter()
            .filter(|n| n.inputs.iter().any(|i| i == name))
            .count()
    }

    /// Whether an input name resolves to a graph input, an initializer, or
    /// some node's output
    pub fn resolves(&self, name: &str) -> bool {
        self.find_input_by_name(name).is_some()
            || self.initializers.contains_key(name)
            || self.find_node_by_output_name(name).is_some()
    }
}

/// Element count and shape for a value descriptor
///
/// Returns `(0, [])` when any dimension is unknown; callers must treat an
/// empty shape as "not statically known".
pub fn find_size_shape_from_value(value: &ValueInfo) -> (usize, Vec<i64>) {
    match value.known_shape() {
        Some(shape) if !shape.is_empty() => (numel(&shape), shape),
        _ => (0, Vec::new()),
    }
}

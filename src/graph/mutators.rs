//! Graph mutation operations
//!
//! Passes collect the names of obsolete nodes during their scan and commit
//! the removals afterward; removal is a single retain/compaction step over
//! the node list.

use rustc_hash::FxHashSet;

use crate::ir::{Node, ValueInfo};
use crate::tensor::Tensor;

use super::Graph;

impl Graph {
    // ========================================================================
    // Node mutation
    // ========================================================================

    /// Append a node to the node list
    pub fn push_node(&mut self, node: Node) {
        self.nodes.push(node);
    }

    /// Remove every node whose name is in `names`
    ///
    /// Returns the number of nodes removed.
    pub fn remove_nodes(&mut self, names: &FxHashSet<String>) -> usize {
        if names.is_empty() {
            return 0;
        }
        let before = self.nodes.len();
        self.nodes.retain(|n| !names.contains(&n.name));
        before - self.nodes.len()
    }

    // ========================================================================
    // Input / output descriptors
    // ========================================================================

    /// Remove a graph input descriptor by name
    pub fn remove_input(&mut self, name: &str) -> Option<ValueInfo> {
        let pos = self.inputs.iter().position(|vi| vi.name == name)?;
        Some(self.inputs.remove(pos))
    }

    // ========================================================================
    // Initializers
    // ========================================================================

    /// Add or replace an initializer
    pub fn set_initializer(&mut self, tensor: Tensor) {
        self.initializers.insert(tensor.name.clone(), tensor);
    }

    /// Remove an initializer by name
    pub fn remove_initializer(&mut self, name: &str) -> Option<Tensor> {
        self.initializers.shift_remove(name)
    }

    // ========================================================================
    // Intermediate value metadata
    // ========================================================================

    /// Add or replace intermediate value metadata
    pub fn set_value(&mut self, vi: ValueInfo) {
        self.values.insert(vi.name.clone(), vi);
    }

    /// Remove intermediate value metadata by name
    pub fn remove_value(&mut self, name: &str) -> Option<ValueInfo> {
        self.values.shift_remove(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::OpKind;
    use crate::tensor::DataType;

    #[test]
    fn test_remove_nodes() {
        let mut g = Graph::new();
        g.push_node(Node::new(OpKind::Conv, &["X", "W"], &["a"], "conv_0"));
        g.push_node(Node::new(OpKind::Other("Relu".into()), &["a"], &["b"], "relu_0"));
        g.push_node(Node::new(OpKind::Other("Relu".into()), &["b"], &["Y"], "relu_1"));

        let mut names = FxHashSet::default();
        names.insert("relu_0".to_string());
        assert_eq!(g.remove_nodes(&names), 1);
        assert_eq!(g.node_count(), 2);
        assert!(g.find_node_by_name("relu_0").is_none());
    }

    #[test]
    fn test_remove_input() {
        let mut g = Graph::new();
        g.inputs.push(ValueInfo::new("X", DataType::Float, &[1]));
        g.inputs.push(ValueInfo::new("W", DataType::Float, &[1]));

        let removed = g.remove_input("W").unwrap();
        assert_eq!(removed.name, "W");
        assert_eq!(g.inputs.len(), 1);
        assert!(g.remove_input("W").is_none());
    }

    #[test]
    fn test_initializer_round_trip() {
        let mut g = Graph::new();
        g.set_initializer(Tensor::from_f32s("W", &[2, 2], vec![1.0, 2.0, 3.0, 4.0]));
        assert!(g.initializers.contains_key("W"));

        let t = g.remove_initializer("W").unwrap();
        assert_eq!(t.dims, vec![2, 2]);
        assert!(g.initializers.is_empty());
    }
}

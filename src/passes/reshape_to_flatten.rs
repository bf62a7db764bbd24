//! Reshape canonicalization
//!
//! A Reshape whose sole consumer is a Gemm and whose shape operand comes
//! from a Constant node is really a Flatten: the Gemm only accepts 2-D
//! input, so the target shape carries no extra information. The node is
//! retagged in place and the shape Constant removed once orphaned.

use rustc_hash::FxHashSet;

use crate::error::{RewriteError, RewriteResult};
use crate::graph::Graph;
use crate::ir::OpKind;

use super::{GraphRewrite, RewriteOutcome};

/// Replace Reshape-before-Gemm with Flatten
#[derive(Debug, Default)]
pub struct ReshapeToFlatten;

impl ReshapeToFlatten {
    /// Create a new ReshapeToFlatten pass
    pub fn new() -> Self {
        Self
    }
}

impl GraphRewrite for ReshapeToFlatten {
    fn name(&self) -> &'static str {
        "ReshapeToFlatten"
    }

    fn is_applicable(&self, graph: &Graph) -> bool {
        graph.nodes.iter().any(|n| n.op == OpKind::Reshape)
    }

    fn apply(&self, graph: &mut Graph) -> RewriteResult<RewriteOutcome> {
        let mut outcome = RewriteOutcome::new();
        let mut to_remove: FxHashSet<String> = FxHashSet::default();

        let reshapes: Vec<String> = graph
            .nodes
            .iter()
            .filter(|n| n.op == OpKind::Reshape)
            .map(|n| n.name.clone())
            .collect();

        for name in reshapes {
            // Applicability: sole consumer is a Gemm, shape operand comes
            // from a Constant. Anything else is left untouched.
            let shape_name = {
                let node = match graph.find_node_by_name(&name) {
                    Some(n) => n,
                    None => continue,
                };
                if node.inputs.len() != 2 {
                    continue;
                }

                let consumers = graph.consumers(&node.outputs[0]);
                if consumers.len() != 1 || consumers[0].op != OpKind::Gemm {
                    continue;
                }

                let shape_name = node.inputs[1].clone();
                match graph.find_node_by_output_name(&shape_name) {
                    Some(producer) if producer.op == OpKind::Constant => {}
                    _ => continue,
                }
                shape_name
            };

            let node = graph
                .find_node_by_name_mut(&name)
                .ok_or_else(|| RewriteError::InvalidNode(name.clone()))?;
            node.op = OpKind::Flatten;
            node.clear_attrs();
            node.inputs.pop();
            outcome.record(&name);

            // The shape Constant is removed only once nothing else reads it.
            if graph.count_consumers(&shape_name) == 0 {
                if let Some(producer) = graph.find_node_by_output_name(&shape_name) {
                    to_remove.insert(producer.name.clone());
                }
                graph.remove_value(&shape_name);
            }
        }

        let removed = graph.remove_nodes(&to_remove);
        outcome.record_removed(removed);

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::list_to_constant;
    use crate::ir::{Node, ValueInfo};
    use crate::tensor::DataType;

    fn reshape_gemm_graph() -> Graph {
        let mut g = Graph::new();
        g.inputs.push(ValueInfo::new("X", DataType::Float, &[1, 8, 2, 2]));
        g.push_node(list_to_constant("target_shape", &[2], &[1, 32]));
        g.push_node(Node::new(
            OpKind::Reshape,
            &["X", "target_shape"],
            &["flat"],
            "reshape_0",
        ));
        g.push_node(Node::new(OpKind::Gemm, &["flat", "W"], &["Y"], "gemm_0"));
        g.set_initializer(crate::tensor::Tensor::from_f32s("W", &[32, 10], vec![0.0; 320]));
        g.outputs.push(ValueInfo::new("Y", DataType::Float, &[1, 10]));
        g.values.insert(
            "target_shape".to_string(),
            ValueInfo::new("target_shape", DataType::Int64, &[2]),
        );
        g.values.insert(
            "flat".to_string(),
            ValueInfo::new("flat", DataType::Float, &[1, 32]),
        );
        g
    }

    #[test]
    fn test_reshape_becomes_flatten() {
        let mut g = reshape_gemm_graph();
        let outcome = ReshapeToFlatten::new().apply(&mut g).unwrap();

        assert_eq!(outcome.rewrites_applied, 1);
        let node = g.find_node_by_name("reshape_0").unwrap();
        assert_eq!(node.op, OpKind::Flatten);
        assert_eq!(node.inputs, vec!["X"]);
        assert_eq!(node.outputs, vec!["flat"]);
        assert!(node.attrs.is_empty());

        // The orphaned shape Constant and its metadata are gone.
        assert!(g.find_node_by_name("target_shape").is_none());
        assert!(g.find_value_by_name("target_shape").is_none());
    }

    #[test]
    fn test_skips_reshape_without_gemm_consumer() {
        let mut g = reshape_gemm_graph();
        // Retag the consumer so the pattern no longer matches.
        g.find_node_by_name_mut("gemm_0").unwrap().op = OpKind::Other("Relu".into());

        let outcome = ReshapeToFlatten::new().apply(&mut g).unwrap();
        assert!(!outcome.changed());
        assert_eq!(g.find_node_by_name("reshape_0").unwrap().op, OpKind::Reshape);
    }

    #[test]
    fn test_skips_dynamic_shape_operand() {
        let mut g = reshape_gemm_graph();
        // Make the shape operand the output of a non-Constant node.
        g.remove_nodes(&["target_shape".to_string()].into_iter().collect());
        g.push_node(Node::new(
            OpKind::Shape,
            &["X"],
            &["target_shape"],
            "shape_0",
        ));

        let outcome = ReshapeToFlatten::new().apply(&mut g).unwrap();
        assert!(!outcome.changed());
    }

    #[test]
    fn test_shared_shape_constant_retained() {
        let mut g = reshape_gemm_graph();
        // A second consumer of the shape constant keeps it alive.
        g.push_node(Node::new(
            OpKind::Reshape,
            &["X", "target_shape"],
            &["other"],
            "reshape_1",
        ));

        ReshapeToFlatten::new().apply(&mut g).unwrap();
        assert!(g.find_node_by_name("target_shape").is_some());
    }

    #[test]
    fn test_idempotent() {
        let mut g = reshape_gemm_graph();
        ReshapeToFlatten::new().apply(&mut g).unwrap();
        let outcome = ReshapeToFlatten::new().apply(&mut g).unwrap();
        assert!(!outcome.changed());
    }
}

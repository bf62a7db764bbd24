//! Squeeze/Unsqueeze canonicalization
//!
//! Both operators are pure shape manipulations; once the output shape is
//! statically known they collapse into a Reshape driven by a shape Constant.
//! Unlike the other pattern passes there is no fallback representation, so a
//! selected node whose output shape cannot be resolved is a fatal error.

use crate::error::{RewriteError, RewriteResult};
use crate::graph::{list_to_constant, stabilize, Graph};
use crate::ir::{Node, OpKind};

use super::{GraphRewrite, RewriteOutcome};

/// Replace Squeeze and Unsqueeze with Reshape
#[derive(Debug, Default)]
pub struct SqueezeToReshape;

impl SqueezeToReshape {
    /// Create a new SqueezeToReshape pass
    pub fn new() -> Self {
        Self
    }
}

fn is_target(node: &Node) -> bool {
    node.op == OpKind::Squeeze || node.op == OpKind::Unsqueeze
}

impl GraphRewrite for SqueezeToReshape {
    fn name(&self) -> &'static str {
        "SqueezeToReshape"
    }

    fn is_applicable(&self, graph: &Graph) -> bool {
        graph.nodes.iter().any(is_target)
    }

    fn apply(&self, graph: &mut Graph) -> RewriteResult<RewriteOutcome> {
        let mut outcome = RewriteOutcome::new();

        let targets: Vec<usize> = graph
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| is_target(n))
            .map(|(idx, _)| idx)
            .collect();

        if targets.is_empty() {
            return Ok(outcome);
        }

        for idx in targets {
            let (name, data_input, outputs, out_name) = {
                let node = &graph.nodes[idx];
                (
                    node.name.clone(),
                    node.inputs[0].clone(),
                    node.outputs.clone(),
                    node.outputs[0].clone(),
                )
            };

            // The output shape comes from intermediate metadata or, for a
            // terminal node, from the graph output descriptor.
            let value = graph
                .find_value_by_name(&out_name)
                .or_else(|| graph.find_output_by_name(&out_name));
            let shape = value
                .and_then(|vi| vi.known_shape())
                .ok_or_else(|| RewriteError::UnresolvableShape(out_name.clone()))?;

            let shape_name = format!("{name}_shape");
            let shape_const = list_to_constant(&shape_name, &[shape.len() as i64], &shape);

            let output_refs: Vec<&str> = outputs.iter().map(String::as_str).collect();
            let reshape = Node::new(
                OpKind::Reshape,
                &[data_input.as_str(), shape_name.as_str()],
                &output_refs,
                &name,
            );

            graph.nodes[idx] = reshape;
            graph.push_node(shape_const);
            outcome.record(&name);
        }

        stabilize(graph)?;
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Dim, ValueInfo};
    use crate::tensor::DataType;

    fn squeeze_graph() -> Graph {
        let mut g = Graph::new();
        g.inputs.push(ValueInfo::new("X", DataType::Float, &[1, 4, 1, 8]));
        g.push_node(Node::new(OpKind::Squeeze, &["X"], &["squeezed"], "squeeze_0"));
        g.push_node(Node::new(
            OpKind::Other("Relu".into()),
            &["squeezed"],
            &["Y"],
            "relu_0",
        ));
        g.values.insert(
            "squeezed".to_string(),
            ValueInfo::new("squeezed", DataType::Float, &[4, 8]),
        );
        g.outputs.push(ValueInfo::new("Y", DataType::Float, &[4, 8]));
        g
    }

    #[test]
    fn test_squeeze_replaced_with_reshape() {
        let mut g = squeeze_graph();
        let outcome = SqueezeToReshape::new().apply(&mut g).unwrap();

        assert_eq!(outcome.rewrites_applied, 1);

        let node = g.find_node_by_name("squeeze_0").unwrap();
        assert_eq!(node.op, OpKind::Reshape);
        assert_eq!(node.inputs, vec!["X", "squeeze_0_shape"]);
        assert_eq!(node.outputs, vec!["squeezed"]);

        let shape_const = g.find_node_by_name("squeeze_0_shape").unwrap();
        let t = shape_const.attr_tensor("value").unwrap();
        assert_eq!(t.to_i64_vec().unwrap(), vec![4, 8]);
    }

    #[test]
    fn test_shape_constant_sorted_before_reshape() {
        let mut g = squeeze_graph();
        SqueezeToReshape::new().apply(&mut g).unwrap();

        let const_pos = g.nodes.iter().position(|n| n.name == "squeeze_0_shape").unwrap();
        let reshape_pos = g.nodes.iter().position(|n| n.name == "squeeze_0").unwrap();
        assert!(const_pos < reshape_pos);
    }

    #[test]
    fn test_unsqueeze_via_graph_output() {
        let mut g = Graph::new();
        g.inputs.push(ValueInfo::new("X", DataType::Float, &[3, 4]));
        g.push_node(Node::new(OpKind::Unsqueeze, &["X"], &["Y"], "unsqueeze_0"));
        g.outputs.push(ValueInfo::new("Y", DataType::Float, &[1, 3, 4]));

        let outcome = SqueezeToReshape::new().apply(&mut g).unwrap();
        assert_eq!(outcome.rewrites_applied, 1);

        let node = g.find_node_by_name("unsqueeze_0").unwrap();
        assert_eq!(node.op, OpKind::Reshape);
        // Output-name stability.
        assert_eq!(node.outputs, vec!["Y"]);
    }

    #[test]
    fn test_unresolvable_shape_is_fatal() {
        let mut g = Graph::new();
        g.inputs.push(ValueInfo::new("X", DataType::Float, &[1, 4]));
        g.push_node(Node::new(OpKind::Squeeze, &["X"], &["mystery"], "squeeze_0"));

        match SqueezeToReshape::new().apply(&mut g) {
            Err(RewriteError::UnresolvableShape(v)) => assert_eq!(v, "mystery"),
            other => panic!("expected UnresolvableShape, got {other:?}"),
        }
    }

    #[test]
    fn test_partially_known_shape_is_fatal() {
        let mut g = Graph::new();
        g.inputs.push(ValueInfo::new("X", DataType::Float, &[1, 4]));
        g.push_node(Node::new(OpKind::Squeeze, &["X"], &["out"], "squeeze_0"));
        g.values.insert(
            "out".to_string(),
            ValueInfo::with_dims("out", DataType::Float, vec![Dim::Unknown, Dim::Fixed(4)]),
        );

        assert!(SqueezeToReshape::new().apply(&mut g).is_err());
    }
}

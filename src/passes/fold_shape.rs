//! Shape constant-folding
//!
//! A Shape node over a value with fully known dimensions is a constant. The
//! fold can expose further folds (a Reshape driven by the new constant, for
//! instance), so the pass reports whether anything changed and is designed
//! to be re-invoked to a fixed point.

use crate::error::RewriteResult;
use crate::graph::{list_to_constant, stabilize, Graph};
use crate::ir::OpKind;

use super::{GraphRewrite, RewriteOutcome};

/// Fold Shape nodes over statically known values into Constants
#[derive(Debug, Default)]
pub struct FoldShapeToConstant;

impl FoldShapeToConstant {
    /// Create a new FoldShapeToConstant pass
    pub fn new() -> Self {
        Self
    }
}

impl GraphRewrite for FoldShapeToConstant {
    fn name(&self) -> &'static str {
        "FoldShapeToConstant"
    }

    fn is_applicable(&self, graph: &Graph) -> bool {
        graph.nodes.iter().any(|n| n.op == OpKind::Shape)
    }

    fn apply(&self, graph: &mut Graph) -> RewriteResult<RewriteOutcome> {
        let mut outcome = RewriteOutcome::new();

        let targets: Vec<usize> = graph
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.op == OpKind::Shape)
            .map(|(idx, _)| idx)
            .collect();

        if targets.is_empty() {
            return Ok(outcome);
        }

        let mut any_folded = false;
        for idx in targets {
            let (operand, out_name) = {
                let node = &graph.nodes[idx];
                (node.inputs[0].clone(), node.outputs[0].clone())
            };

            // Every dimension must be known; an unknown marker blocks the
            // fold (it is not a zero-sized dimension).
            let from_values = graph.find_value_by_name(&operand).is_some();
            let shape = match graph
                .find_value_by_name(&operand)
                .or_else(|| graph.find_input_by_name(&operand))
                .and_then(|vi| vi.known_shape())
            {
                Some(s) if !s.is_empty() => s,
                _ => continue,
            };

            // If this Shape node is the only consumer, the operand's
            // intermediate metadata dies with it. Graph-input descriptors
            // are never touched.
            if from_values && graph.count_consumers(&operand) == 1 {
                graph.remove_value(&operand);
            }

            let constant = list_to_constant(&out_name, &[shape.len() as i64], &shape);
            graph.nodes[idx] = constant;
            outcome.record(&out_name);
            any_folded = true;
        }

        if any_folded {
            stabilize(graph)?;
        }
        Ok(outcome)
    }
}

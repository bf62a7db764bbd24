//! AveragePool specialization
//!
//! An AveragePool with zero padding whose kernel covers the input's entire
//! spatial extent is a GlobalAveragePool. The specialized form needs no
//! pooling attributes at all.

use crate::error::RewriteResult;
use crate::graph::{stabilize, Graph};
use crate::ir::{Node, OpKind};

use super::{GraphRewrite, RewriteOutcome};

/// Replace whole-extent AveragePool with GlobalAveragePool
#[derive(Debug, Default)]
pub struct AveragePoolToGlobal;

impl AveragePoolToGlobal {
    /// Create a new AveragePoolToGlobal pass
    pub fn new() -> Self {
        Self
    }
}

impl GraphRewrite for AveragePoolToGlobal {
    fn name(&self) -> &'static str {
        "AveragePoolToGlobal"
    }

    fn is_applicable(&self, graph: &Graph) -> bool {
        graph.nodes.iter().any(|n| n.op == OpKind::AveragePool)
    }

    fn apply(&self, graph: &mut Graph) -> RewriteResult<RewriteOutcome> {
        let mut outcome = RewriteOutcome::new();

        let targets: Vec<usize> = graph
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.op == OpKind::AveragePool)
            .map(|(idx, _)| idx)
            .collect();

        if targets.is_empty() {
            return Ok(outcome);
        }

        for idx in targets {
            let replacement = {
                let node = &graph.nodes[idx];

                if let Some(pads) = node.attr_ints("pads") {
                    if pads.iter().any(|&p| p != 0) {
                        continue;
                    }
                }

                let kernel_shape = match node.attr_ints("kernel_shape") {
                    Some(k) => k,
                    None => continue,
                };

                let input_shape = match graph
                    .find_value_by_name(&node.inputs[0])
                    .or_else(|| graph.find_input_by_name(&node.inputs[0]))
                    .and_then(|vi| vi.known_shape())
                {
                    Some(s) => s,
                    None => continue,
                };

                // The kernel must cover the trailing two (spatial) dims.
                if input_shape.len() < 2 || kernel_shape.len() != 2 {
                    continue;
                }
                if input_shape[input_shape.len() - 2..] != *kernel_shape {
                    continue;
                }

                let input_refs: Vec<&str> = node.inputs.iter().map(String::as_str).collect();
                let output_refs: Vec<&str> = node.outputs.iter().map(String::as_str).collect();
                Node::new(
                    OpKind::GlobalAveragePool,
                    &input_refs,
                    &output_refs,
                    &node.name,
                )
            };

            let name = replacement.name.clone();
            graph.nodes[idx] = replacement;
            outcome.record(&name);
        }

        stabilize(graph)?;
        Ok(outcome)
    }
}

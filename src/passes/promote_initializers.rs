//! Initializer promotion
//!
//! Replaces every consumed initializer with a same-named Constant node and
//! drops initializers nothing consumes, together with their graph-input
//! descriptors. The initializer map is empty when the pass returns.

use rustc_hash::FxHashSet;

use crate::error::RewriteResult;
use crate::graph::Graph;
use crate::ir::{Attribute, Node, OpKind, ValueInfo};

use super::{GraphRewrite, RewriteOutcome};

/// Promote initializers to Constant nodes
#[derive(Debug, Default)]
pub struct PromoteInitializers;

impl PromoteInitializers {
    /// Create a new PromoteInitializers pass
    pub fn new() -> Self {
        Self
    }
}

impl GraphRewrite for PromoteInitializers {
    fn name(&self) -> &'static str {
        "PromoteInitializers"
    }

    fn is_applicable(&self, graph: &Graph) -> bool {
        !graph.initializers.is_empty()
    }

    fn apply(&self, graph: &mut Graph) -> RewriteResult<RewriteOutcome> {
        let mut outcome = RewriteOutcome::new();

        let used: FxHashSet<String> = graph
            .nodes
            .iter()
            .flat_map(|n| n.inputs.iter().cloned())
            .collect();

        let initializers = std::mem::take(&mut graph.initializers);
        for (name, tensor) in initializers {
            if !used.contains(&name) {
                // Dead initializer: drop it and its input descriptor.
                graph.remove_input(&name);
                tracing::debug!(initializer = %name, "removed unused initializer");
                continue;
            }

            // The input descriptor becomes intermediate metadata. An
            // initializer without one gets a descriptor synthesized from the
            // tensor itself.
            let vi = match graph.remove_input(&name) {
                Some(vi) => vi,
                None => ValueInfo::new(&name, tensor.dtype, &tensor.dims),
            };
            graph.set_value(vi);

            let node = Node::new(OpKind::Constant, &[], &[name.as_str()], &name)
                .with_attr("value", Attribute::Tensor(tensor));
            graph.push_node(node);
            outcome.record(&name);
        }

        Ok(outcome)
    }
}

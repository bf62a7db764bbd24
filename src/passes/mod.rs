//! Graph rewrite passes
//!
//! Each pass scans the node list for a pattern, validates its applicability
//! conditions, splices in a replacement subgraph, removes the superseded
//! nodes, and re-stabilizes the node order when nodes were added or removed.
//!
//! Two disciplines hold across every pass:
//!
//! - **Output-name stability**: a replacement subgraph reuses the replaced
//!   node's exact output names, so downstream input lists never change.
//! - **Two-phase commit**: a pass first collects what to rewrite, then
//!   mutates; obsolete nodes are removed in one compaction step.
//!
//! # Example
//!
//! ```ignore
//! use onnx_rewrite::passes::{GraphRewrite, PromoteInitializers, RewritePipeline};
//!
//! let outcome = PromoteInitializers::new().apply(&mut graph)?;
//! println!("promoted {} initializers", outcome.rewrites_applied);
//!
//! // Or run the whole catalogue to a fixed point:
//! let outcome = RewritePipeline::default().run(&mut graph)?;
//! ```

pub mod average_pool_to_global;
pub mod depthwise_to_batch_norm;
pub mod expand_dilated_conv;
pub mod fold_shape;
pub mod promote_initializers;
pub mod reshape_to_flatten;
pub mod split_to_slices;
pub mod squeeze_to_reshape;

pub use average_pool_to_global::AveragePoolToGlobal;
pub use depthwise_to_batch_norm::DepthwiseConvToBatchNorm;
pub use expand_dilated_conv::ExpandDilatedConv;
pub use fold_shape::FoldShapeToConstant;
pub use promote_initializers::PromoteInitializers;
pub use reshape_to_flatten::ReshapeToFlatten;
pub use split_to_slices::SplitToSlices;
pub use squeeze_to_reshape::SqueezeToReshape;

use crate::error::RewriteResult;
use crate::graph::{stabilize, Graph};

/// Result of applying one pass (or a pipeline of passes)
#[derive(Debug, Default, Clone)]
pub struct RewriteOutcome {
    /// Number of rewrites applied
    pub rewrites_applied: usize,
    /// Number of nodes removed
    pub nodes_removed: usize,
    /// Names of rewritten nodes
    pub rewritten_nodes: Vec<String>,
    /// Non-fatal diagnostics collected during the pass
    pub warnings: Vec<String>,
}

impl RewriteOutcome {
    /// Create an empty outcome
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the pass changed the graph
    ///
    /// Orchestrators use this to iterate a pass to a fixed point.
    pub fn changed(&self) -> bool {
        self.rewrites_applied > 0 || self.nodes_removed > 0
    }

    /// Record a rewrite
    pub fn record(&mut self, node_name: &str) {
        self.rewrites_applied += 1;
        self.rewritten_nodes.push(node_name.to_string());
    }

    /// Record removed nodes
    pub fn record_removed(&mut self, count: usize) {
        self.nodes_removed += count;
    }

    /// Record a non-fatal diagnostic
    pub fn warn(&mut self, message: String) {
        tracing::warn!("{message}");
        self.warnings.push(message);
    }

    /// Merge another outcome into this one
    pub fn merge(&mut self, other: RewriteOutcome) {
        self.rewrites_applied += other.rewrites_applied;
        self.nodes_removed += other.nodes_removed;
        self.rewritten_nodes.extend(other.rewritten_nodes);
        self.warnings.extend(other.warnings);
    }
}

/// Trait for individual rewrite passes
pub trait GraphRewrite {
    /// Name of the pass
    fn name(&self) -> &'static str;

    /// Apply the pass, mutating the graph in place
    fn apply(&self, graph: &mut Graph) -> RewriteResult<RewriteOutcome>;

    /// Cheap pre-check: does the graph contain anything this pass targets?
    fn is_applicable(&self, _graph: &Graph) -> bool {
        true
    }
}

/// Runs the full rewrite catalogue in sequence
///
/// Initializer promotion runs once up front; the remaining passes iterate
/// until no pass reports a change (shape folding can expose new fold sites
/// for the next round).
#[derive(Debug, Clone)]
pub struct RewritePipeline {
    /// Promote initializers to Constant nodes first
    pub promote_initializers: bool,
    /// Fold Shape nodes and canonicalize Reshape/Squeeze/Unsqueeze
    pub canonicalize_shapes: bool,
    /// Specialize AveragePool to GlobalAveragePool
    pub specialize_pooling: bool,
    /// Expand dilated convolutions and convert depthwise 1x1 convolutions
    pub rewrite_convolutions: bool,
    /// Decompose Split into Slices
    pub decompose_splits: bool,
    /// Maximum fixed-point iterations
    pub iterations: usize,
}

impl Default for RewritePipeline {
    fn default() -> Self {
        Self {
            promote_initializers: true,
            canonicalize_shapes: true,
            specialize_pooling: true,
            rewrite_convolutions: true,
            decompose_splits: true,
            iterations: 3,
        }
    }
}

impl RewritePipeline {
    /// Create a pipeline with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the configured passes
    pub fn run(&self, graph: &mut Graph) -> RewriteResult<RewriteOutcome> {
        let mut total = RewriteOutcome::new();

        if self.promote_initializers {
            total.merge(run_pass(&PromoteInitializers::new(), graph)?);
            // Constant nodes have no inputs, but re-sort defensively before
            // the pattern passes start relying on the order.
            stabilize(graph)?;
        }

        for _ in 0..self.iterations {
            let before = total.rewrites_applied + total.nodes_removed;

            if self.canonicalize_shapes {
                total.merge(run_pass(&FoldShapeToConstant::new(), graph)?);
                total.merge(run_pass(&SqueezeToReshape::new(), graph)?);
                total.merge(run_pass(&ReshapeToFlatten::new(), graph)?);
            }
            if self.specialize_pooling {
                total.merge(run_pass(&AveragePoolToGlobal::new(), graph)?);
            }
            if self.rewrite_convolutions {
                total.merge(run_pass(&ExpandDilatedConv::new(), graph)?);
                total.merge(run_pass(&DepthwiseConvToBatchNorm::new(), graph)?);
            }
            if self.decompose_splits {
                total.merge(run_pass(&SplitToSlices::new(), graph)?);
            }

            if total.rewrites_applied + total.nodes_removed == before {
                break;
            }
        }

        Ok(total)
    }
}

fn run_pass(pass: &dyn GraphRewrite, graph: &mut Graph) -> RewriteResult<RewriteOutcome> {
    if !pass.is_applicable(graph) {
        return Ok(RewriteOutcome::new());
    }
    tracing::debug!(pass = pass.name(), "applying rewrite pass");
    pass.apply(graph)
}

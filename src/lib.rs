//! # onnx-rewrite
//!
//! Graph-rewrite optimizer for ONNX computation graphs.
//!
//! The crate holds a serialized computation graph in memory and applies a
//! fixed catalogue of semantics-preserving rewrites: promoting initializers
//! into Constant nodes, canonicalizing shape-manipulation operators,
//! specializing pooling, expanding dilated convolutions, converting
//! depthwise 1x1 convolutions to affine form, and decomposing Split into
//! Slices. Every pass preserves topological validity, keeps output names
//! stable, and leaves no dangling references.
//!
//! ## Example
//!
//! ```ignore
//! use onnx_rewrite::prelude::*;
//!
//! let mut graph = load_graph("model.onnx")?;
//! let outcome = RewritePipeline::default().run(&mut graph)?;
//! println!("applied {} rewrites", outcome.rewrites_applied);
//! ```
//!
//! Serialization to and from the ONNX wire format, the command-line entry
//! point, and logging configuration live outside this crate; the passes
//! emit diagnostics through `tracing` and collected warning lists.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod graph;
pub mod ir;
pub mod passes;
pub mod tensor;

// ============================================================================
// Prelude module for convenient imports
// ============================================================================

/// Commonly used types, importable with `use onnx_rewrite::prelude::*`
pub mod prelude {
    pub use crate::error::{RewriteError, RewriteResult};
    pub use crate::graph::{find_size_shape_from_value, list_to_constant, stabilize, Graph};
    pub use crate::ir::{Attribute, Dim, Node, OpKind, ValueInfo};
    pub use crate::passes::{
        AveragePoolToGlobal, DepthwiseConvToBatchNorm, ExpandDilatedConv, FoldShapeToConstant,
        GraphRewrite, PromoteInitializers, ReshapeToFlatten, RewriteOutcome, RewritePipeline,
        SplitToSlices, SqueezeToReshape,
    };
    pub use crate::tensor::{DataType, Tensor, TensorData};
}

// ============================================================================
// Crate-level re-exports
// ============================================================================

pub use error::{RewriteError, RewriteResult};
pub use graph::Graph;
pub use passes::{GraphRewrite, RewriteOutcome, RewritePipeline};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Node, OpKind, ValueInfo};
    use crate::tensor::{DataType, Tensor};

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    // Invariant sweep: run the whole catalogue over a graph exercising every
    // pattern and check the global structural invariants afterward.
    #[test]
    fn test_invariants_hold_after_full_pipeline() {
        let mut g = Graph::new();
        g.inputs.push(ValueInfo::new("X", DataType::Float, &[1, 4, 6, 6]));
        g.inputs.push(ValueInfo::new("W", DataType::Float, &[4, 1, 1, 1]));
        g.set_initializer(Tensor::from_f32s("W", &[4, 1, 1, 1], vec![2.0; 4]));

        let mut conv = Node::new(OpKind::Conv, &["X", "W"], &["conv_out"], "conv_0");
        conv.set_attr_int("group", 4);
        conv.set_attr_ints("kernel_shape", vec![1, 1]);
        g.push_node(conv);

        let mut pool = Node::new(OpKind::AveragePool, &["conv_out"], &["pool_out"], "pool_0");
        pool.set_attr_ints("kernel_shape", vec![6, 6]);
        pool.set_attr_ints("pads", vec![0, 0, 0, 0]);
        g.push_node(pool);

        g.push_node(Node::new(OpKind::Squeeze, &["pool_out"], &["Y"], "squeeze_0"));

        g.values.insert(
            "conv_out".to_string(),
            ValueInfo::new("conv_out", DataType::Float, &[1, 4, 6, 6]),
        );
        g.values.insert(
            "pool_out".to_string(),
            ValueInfo::new("pool_out", DataType::Float, &[1, 4, 1, 1]),
        );
        g.outputs.push(ValueInfo::new("Y", DataType::Float, &[1, 4]));

        let outcome = RewritePipeline::default().run(&mut g).unwrap();
        assert!(outcome.changed());

        // Every input resolves; all output names unique; order topological.
        let mut seen = std::collections::HashSet::new();
        let mut produced = std::collections::HashSet::new();
        for vi in &g.inputs {
            produced.insert(vi.name.clone());
        }
        for name in g.initializers.keys() {
            produced.insert(name.clone());
        }
        for node in &g.nodes {
            for input in &node.inputs {
                assert!(
                    input.is_empty() || produced.contains(input),
                    "input {input} of {} not produced earlier",
                    node.name
                );
            }
            for output in &node.outputs {
                assert!(seen.insert(output.clone()), "duplicate output {output}");
                produced.insert(output.clone());
            }
        }

        // The graph output name survived every replacement.
        assert!(g.find_node_by_output_name("Y").is_some());
    }
}

//! Dilated convolution expansion
//!
//! A convolution with dilation d over a KhxKw kernel equals a dilation-1
//! convolution over a sparsified kernel of size 1+(Kh-1)*dh x 1+(Kw-1)*dw:
//! each original tap (h, w) moves to (h*dh, w*dw) and every other position
//! is zero. The rewrite is a pure reindexing of the weight data, bit-exact
//! for float values.
//!
//! A convolution carrying both non-unit dilation and non-unit stride cannot
//! be expressed this way (enlarging the kernel changes effective stride
//! semantics); such nodes are skipped with a warning rather than rejected.

use ndarray::Array4;

use crate::error::{RewriteError, RewriteResult};
use crate::graph::{stabilize, Graph};
use crate::ir::{Attribute, Dim, Node, OpKind};
use crate::tensor::Tensor;

use super::{GraphRewrite, RewriteOutcome};

/// Expand dilated convolutions into standard convolutions
#[derive(Debug, Default)]
pub struct ExpandDilatedConv;

impl ExpandDilatedConv {
    /// Create a new ExpandDilatedConv pass
    pub fn new() -> Self {
        Self
    }
}

impl GraphRewrite for ExpandDilatedConv {
    fn name(&self) -> &'static str {
        "ExpandDilatedConv"
    }

    fn is_applicable(&self, graph: &Graph) -> bool {
        graph.nodes.iter().any(|n| n.op == OpKind::Conv)
    }

    fn apply(&self, graph: &mut Graph) -> RewriteResult<RewriteOutcome> {
        let mut outcome = RewriteOutcome::new();

        let convs: Vec<usize> = graph
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.op == OpKind::Conv)
            .map(|(idx, _)| idx)
            .collect();

        let mut any_rewritten = false;
        for idx in convs {
            if self.try_expand(graph, idx, &mut outcome)? {
                any_rewritten = true;
            }
        }

        if any_rewritten {
            stabilize(graph)?;
        }
        Ok(outcome)
    }
}

impl ExpandDilatedConv {
    fn try_expand(
        &self,
        graph: &mut Graph,
        idx: usize,
        outcome: &mut RewriteOutcome,
    ) -> RewriteResult<bool> {
        let (conv_name, weight_name, dilations) = {
            let node = &graph.nodes[idx];

            let dilations: Vec<i64> = match node.attr_ints("dilations") {
                Some(d) if d.iter().any(|&x| x != 1) => d.to_vec(),
                _ => return Ok(false),
            };

            let has_strides = node
                .attr_ints("strides")
                .map(|s| s.iter().any(|&x| x != 1))
                .unwrap_or(false);
            if has_strides {
                outcome.warn(format!(
                    "Conv {} has both non-unit strides and non-unit dilations; not expanded",
                    node.name
                ));
                return Ok(false);
            }

            if dilations.len() != 2 {
                outcome.warn(format!(
                    "Conv {} has non-2D dilations {:?}; not expanded",
                    node.name, dilations
                ));
                return Ok(false);
            }

            if node.inputs.len() < 2 {
                return Ok(false);
            }
            (node.name.clone(), node.inputs[1].clone(), dilations)
        };

        // The weight must come from a Constant node (initializer promotion
        // runs before this pass).
        let w_idx = graph
            .nodes
            .iter()
            .position(|n| n.outputs.iter().any(|o| o == &weight_name))
            .ok_or_else(|| RewriteError::ConstantNotFound(weight_name.clone()))?;
        if graph.nodes[w_idx].op != OpKind::Constant {
            return Err(RewriteError::ConstantNotFound(weight_name.clone()));
        }

        let tensor = graph.nodes[w_idx]
            .attr_tensor("value")
            .ok_or_else(|| RewriteError::MissingAttribute {
                node: graph.nodes[w_idx].name.clone(),
                attr: "value".to_string(),
            })?;

        if tensor.dims.len() != 4 {
            return Err(RewriteError::InvalidNode(format!(
                "Convolution weight {} must be rank 4, found rank {}",
                weight_name,
                tensor.dims.len()
            )));
        }

        let (co, ci, kh, kw) = (
            tensor.dims[0] as usize,
            tensor.dims[1] as usize,
            tensor.dims[2] as usize,
            tensor.dims[3] as usize,
        );
        if kh == 0 || kw == 0 {
            return Err(RewriteError::InvalidNode(format!(
                "Convolution weight {weight_name} has a zero-sized kernel"
            )));
        }
        let (dh, dw) = (dilations[0] as usize, dilations[1] as usize);
        let new_h = 1 + (kh - 1) * dh;
        let new_w = 1 + (kw - 1) * dw;

        // Decode (either payload encoding) and spread the taps.
        let flat = tensor.to_f32_vec()?;
        let weight = Array4::from_shape_vec((co, ci, kh, kw), flat)
            .map_err(|e| RewriteError::Internal(e.to_string()))?;

        let mut expanded = Array4::<f32>::zeros((co, ci, new_h, new_w));
        for b in 0..co {
            for c in 0..ci {
                for h in 0..kh {
                    for w in 0..kw {
                        expanded[[b, c, h * dh, w * dw]] = weight[[b, c, h, w]];
                    }
                }
            }
        }

        let new_dims = [co as i64, ci as i64, new_h as i64, new_w as i64];
        let tensor_name = tensor.name.clone();
        let new_tensor =
            Tensor::from_f32s(&tensor_name, &new_dims, expanded.iter().copied().collect());

        // Replace the weight Constant under the same name and outputs.
        let old_w = &graph.nodes[w_idx];
        let output_refs: Vec<&str> = old_w.outputs.iter().map(String::as_str).collect();
        let new_w_node = Node::new(OpKind::Constant, &[], &output_refs, &old_w.name)
            .with_attr("value", Attribute::Tensor(new_tensor));
        graph.nodes[w_idx] = new_w_node;

        // Keep the weight's metadata in step with the new spatial extent.
        if let Some(vi) = graph.find_value_by_name_mut(&weight_name) {
            if vi.dims.len() == 4 {
                vi.dims[2] = Dim::Fixed(new_h as i64);
                vi.dims[3] = Dim::Fixed(new_w as i64);
            }
        }

        let conv = &mut graph.nodes[idx];
        conv.set_attr_ints("kernel_shape", vec![new_h as i64, new_w as i64]);
        conv.set_attr_ints("dilations", vec![1, 1]);
        outcome.record(&conv_name);

        Ok(true)
    }
}

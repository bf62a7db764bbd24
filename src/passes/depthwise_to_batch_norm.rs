//! Depthwise 1x1 convolution conversion
//!
//! A depthwise convolution with a 1x1 kernel multiplies each channel by one
//! scalar and optionally adds a per-channel bias - exactly the affine form
//! of an inference-time BatchNormalization with mean 0 and variance 1. With
//! epsilon e the BatchNorm computes `y = scale*x/sqrt(1+e) + bias`, so the
//! conversion carries a ~1e-5 relative discrepancy. That approximation is
//! accepted, not a defect.

use crate::error::RewriteResult;
use crate::graph::{list_to_constant_f32, stabilize, Graph};
use crate::ir::{Node, OpKind};

use super::{GraphRewrite, RewriteOutcome};

/// Epsilon attached to the synthesized BatchNormalization
pub const BN_EPSILON: f32 = 1e-5;
/// Momentum attached to the synthesized BatchNormalization (inert at inference)
pub const BN_MOMENTUM: f32 = 0.9;

/// Convert depthwise 1x1 convolutions to BatchNormalization
#[derive(Debug, Default)]
pub struct DepthwiseConvToBatchNorm;

impl DepthwiseConvToBatchNorm {
    /// Create a new DepthwiseConvToBatchNorm pass
    pub fn new() -> Self {
        Self
    }
}

impl GraphRewrite for DepthwiseConvToBatchNorm {
    fn name(&self) -> &'static str {
        "DepthwiseConvToBatchNorm"
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
            if self.try_convert(graph, idx, &mut outcome)? {
                any_rewritten = true;
            }
        }

        if any_rewritten {
            stabilize(graph)?;
        }
        Ok(outcome)
    }
}

impl DepthwiseConvToBatchNorm {
    fn try_convert(
        &self,
        graph: &mut Graph,
        idx: usize,
        outcome: &mut RewriteOutcome,
    ) -> RewriteResult<bool> {
        let (name, data_input, weight_name, bias_input, outputs, groups) = {
            let node = &graph.nodes[idx];

            let groups = match node.attr_int("group") {
                Some(g) if g > 1 => g,
                _ => return Ok(false),
            };
            match node.attr_ints("kernel_shape") {
                Some([1, 1]) => {}
                _ => return Ok(false),
            }
            if let Some(pads) = node.attr_ints("pads") {
                if pads.iter().sum::<i64>() != 0 {
                    return Ok(false);
                }
            }
            if node.inputs.len() < 2 {
                return Ok(false);
            }

            (
                node.name.clone(),
                node.inputs[0].clone(),
                node.inputs[1].clone(),
                node.inputs.get(2).cloned(),
                node.outputs.clone(),
                groups,
            )
        };

        // True depthwise only: one input channel per group.
        let w_idx = match graph.nodes.iter().position(|n| {
            n.op == OpKind::Constant && n.outputs.iter().any(|o| o == &weight_name)
        }) {
            Some(i) => i,
            None => return Ok(false),
        };
        match graph.nodes[w_idx].attr_tensor("value") {
            Some(t) if t.dims.len() == 4 && t.dims[1] == 1 => {}
            _ => return Ok(false),
        }

        // Squeeze the weight from [groups, 1, 1, 1] to [groups]; it becomes
        // the per-channel scale.
        if let Some(t) = graph.nodes[w_idx].attr_tensor_mut("value") {
            t.dims.truncate(1);
        }
        if let Some(vi) = graph.find_value_by_name_mut(&weight_name) {
            vi.dims.truncate(1);
        }

        let n = groups as usize;
        let bias_name = match bias_input {
            Some(existing) => existing,
            None => {
                let bias_name = format!("{name}_bias");
                graph.push_node(list_to_constant_f32(&bias_name, &[groups], &vec![0.0; n]));
                bias_name
            }
        };

        let mean_name = format!("{name}_mean");
        let var_name = format!("{name}_var");
        graph.push_node(list_to_constant_f32(&mean_name, &[groups], &vec![0.0; n]));
        graph.push_node(list_to_constant_f32(&var_name, &[groups], &vec![1.0; n]));

        let output_refs: Vec<&str> = outputs.iter().map(String::as_str).collect();
        let mut bn = Node::new(
            OpKind::BatchNormalization,
            &[
                data_input.as_str(),
                weight_name.as_str(),
                bias_name.as_str(),
                mean_name.as_str(),
                var_name.as_str(),
            ],
            &output_refs,
            &name,
        );
        bn.set_attr_float("epsilon", BN_EPSILON);
        bn.set_attr_float("momentum", BN_MOMENTUM);

        graph.nodes[idx] = bn;
        outcome.record(&name);

        Ok(true)
    }
}

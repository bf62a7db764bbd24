//! Constant-node construction

use crate::ir::{Attribute, Node, OpKind};
use crate::tensor::Tensor;

/// Build a Constant node wrapping the given i64 values reshaped to `dims`
///
/// The node's name doubles as its single output name.
pub fn list_to_constant(name: &str, dims: &[i64], values: &[i64]) -> Node {
    let tensor = Tensor::from_i64s(name, dims, values.to_vec());
    Node::new(OpKind::Constant, &[], &[name], name).with_attr("value", Attribute::Tensor(tensor))
}

/// Build a Constant node wrapping the given f32 values reshaped to `dims`
pub fn list_to_constant_f32(name: &str, dims: &[i64], values: &[f32]) -> Node {
    let tensor = Tensor::from_f32s(name, dims, values.to_vec());
    Node::new(OpKind::Constant, &[], &[name], name).with_attr("value", Attribute::Tensor(tensor))
}

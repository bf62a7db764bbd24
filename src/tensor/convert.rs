//! Tensor / ndarray conversion
//!
//! Passes that manipulate tensor values (kernel expansion, numeric checks)
//! work on dense `ndarray` arrays and convert back on the way out.

use ndarray::{ArrayD, IxDyn};

use crate::error::{RewriteError, RewriteResult};

use super::data::Tensor;

/// Convert a tensor to an f32 ndarray
///
/// Handles both payload encodings.
pub fn tensor_to_array_f32(tensor: &Tensor) -> RewriteResult<ArrayD<f32>> {
    let shape: Vec<usize> = tensor.dims.iter().map(|&d| d.max(0) as usize).collect();
    let data = tensor.to_f32_vec()?;

    ArrayD::from_shape_vec(IxDyn(&shape), data)
        .map_err(|e| RewriteError::Internal(e.to_string()))
}

/// Convert a tensor to an i64 ndarray
pub fn tensor_to_array_i64(tensor: &Tensor) -> RewriteResult<ArrayD<i64>> {
    let shape: Vec<usize> = tensor.dims.iter().map(|&d| d.max(0) as usize).collect();
    let data = tensor.to_i64_vec()?;

    ArrayD::from_shape_vec(IxDyn(&shape), data)
        .map_err(|e| RewriteError::Internal(e.to_string()))
}

/// Create an f32 tensor from an ndarray
pub fn array_to_tensor_f32(array: &ArrayD<f32>, name: &str) -> Tensor {
    let dims: Vec<i64> = array.shape().iter().map(|&d| d as i64).collect();
    Tensor::from_f32s(name, &dims, array.iter().copied().collect())
}

/// Create an i64 tensor from an ndarray
pub fn array_to_tensor_i64(array: &ArrayD<i64>, name: &str) -> Tensor {
    let dims: Vec<i64> = array.shape().iter().map(|&d| d as i64).collect();
    Tensor::from_i64s(name, &dims, array.iter().copied().collect())
}

//! Constant tensor payloads
//!
//! A tensor's values arrive in one of two equally valid encodings: a typed
//! flat array, or a little-endian byte buffer. Both decode through the same
//! accessors so passes never see the difference.

use crate::error::{RewriteError, RewriteResult};

use super::dtype::DataType;

/// Tensor payload, in either of the two wire encodings
#[derive(Debug, Clone, PartialEq)]
pub enum TensorData {
    /// Densely packed f32 values
    Floats(Vec<f32>),
    /// Densely packed i64 values
    Ints(Vec<i64>),
    /// Fixed-width little-endian byte buffer
    Raw(Vec<u8>),
}

/// A named constant tensor (initializer payload or Constant-node attribute)
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    /// Tensor name
    pub name: String,
    /// Element type
    pub dtype: DataType,
    /// Ordered shape; dimensions are non-negative
    pub dims: Vec<i64>,
    /// The payload
    pub data: TensorData,
}

impl Tensor {
    /// Create an f32 tensor from flat values
    pub fn from_f32s(name: &str, dims: &[i64], values: Vec<f32>) -> Self {
        Self {
            name: name.to_string(),
            dtype: DataType::Float,
            dims: dims.to_vec(),
            data: TensorData::Floats(values),
        }
    }

    /// Create an i64 tensor from flat values
    pub fn from_i64s(name: &str, dims: &[i64], values: Vec<i64>) -> Self {
        Self {
            name: name.to_string(),
            dtype: DataType::Int64,
            dims: dims.to_vec(),
            data: TensorData::Ints(values),
        }
    }

    /// Create a tensor from a raw little-endian byte buffer
    pub fn from_raw(name: &str, dtype: DataType, dims: &[i64], bytes: Vec<u8>) -> Self {
        Self {
            name: name.to_string(),
            dtype,
            dims: dims.to_vec(),
            data: TensorData::Raw(bytes),
        }
    }

    /// Total number of elements implied by the shape
    pub fn num_elements(&self) -> usize {
        if self.dims.is_empty() {
            1 // scalar
        } else {
            self.dims.iter().map(|&d| d.max(0) as usize).product()
        }
    }

    /// Decode the payload to a dense f32 vector
    ///
    /// Handles both encodings. A declared-shape/data-length disagreement is
    /// fatal.
    pub fn to_f32_vec(&self) -> RewriteResult<Vec<f32>> {
        let expected = self.num_elements();

        let values: Vec<f32> = match &self.data {
            TensorData::Floats(v) => v.clone(),
            TensorData::Ints(v) => v.iter().map(|&x| x as f32).collect(),
            TensorData::Raw(bytes) => decode_raw_f32(bytes, self.dtype, expected, &self.name)?,
        };

        if values.len() != expected {
            return Err(RewriteError::MalformedTensor {
                name: self.name.clone(),
                expected,
                actual: values.len(),
            });
        }

        Ok(values)
    }

    /// Decode the payload to a dense i64 vector
    pub fn to_i64_vec(&self) -> RewriteResult<Vec<i64>> {
        let expected = self.num_elements();

        let values: Vec<i64> = match &self.data {
            TensorData::Ints(v) => v.clone(),
            TensorData::Floats(v) => v.iter().map(|&x| x as i64).collect(),
            TensorData::Raw(bytes) => decode_raw_i64(bytes, self.dtype, expected, &self.name)?,
        };

        if values.len() != expected {
            return Err(RewriteError::MalformedTensor {
                name: self.name.clone(),
                expected,
                actual: values.len(),
            });
        }

        Ok(values)
    }
}

// ============================================================================
// Raw-buffer decoding
// ============================================================================

fn check_raw_len(
    bytes: &[u8],
    dtype: DataType,
    expected: usize,
    name: &str,
) -> RewriteResult<()> {
    let elem_size = dtype.size_in_bytes();
    if bytes.len() != expected * elem_size {
        return Err(RewriteError::MalformedTensor {
            name: name.to_string(),
            expected,
            actual: bytes.len() / elem_size,
        });
    }
    Ok(())
}

fn decode_raw_f32(
    bytes: &[u8],
    dtype: DataType,
    expected: usize,
    name: &str,
) -> RewriteResult<Vec<f32>> {
    check_raw_len(bytes, dtype, expected, name)?;

    let values = match dtype {
        DataType::Float => bytes
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect(),
        DataType::Double => bytes
            .chunks_exact(8)
            .map(|b| {
                f64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]) as f32
            })
            .collect(),
        DataType::Int32 => bytes
            .chunks_exact(4)
            .map(|b| i32::from_le_bytes([b[0], b[1], b[2], b[3]]) as f32)
            .collect(),
        DataType::Int64 => bytes
            .chunks_exact(8)
            .map(|b| {
                i64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]) as f32
            })
            .collect(),
        DataType::Uint8 => bytes.iter().map(|&b| b as f32).collect(),
        DataType::Int8 => bytes.iter().map(|&b| b as i8 as f32).collect(),
    };

    Ok(values)
}

fn decode_raw_i64(
    bytes: &[u8],
    dtype: DataType,
    expected: usize,
    name: &str,
) -> RewriteResult<Vec<i64>> {
    check_raw_len(bytes, dtype, expected, name)?;

    let values = match dtype {
        DataType::Int64 => bytes
            .chunks_exact(8)
            .map(|b| i64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]))
            .collect(),
        DataType::Int32 => bytes
            .chunks_exact(4)
            .map(|b| i32::from_le_bytes([b[0], b[1], b[2], b[3]]) as i64)
            .collect(),
        DataType::Uint8 => bytes.iter().map(|&b| b as i64).collect(),
        DataType::Int8 => bytes.iter().map(|&b| b as i8 as i64).collect(),
        DataType::Float => bytes
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]) as i64)
            .collect(),
        DataType::Double => bytes
            .chunks_exact(8)
            .map(|b| {
                f64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]) as i64
            })
            .collect(),
    };

    Ok(values)
}

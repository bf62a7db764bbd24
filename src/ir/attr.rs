//! Node attribute values
//!
//! Operator attributes form a by-name lookup over a closed set of value
//! kinds. Each kind is a variant of [`Attribute`]; nodes store them in an
//! insertion-ordered map.

use crate::tensor::Tensor;

/// A single attribute value
#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
    /// Scalar integer
    Int(i64),
    /// Scalar float
    Float(f32),
    /// List of integers
    Ints(Vec<i64>),
    /// List of floats
    Floats(Vec<f32>),
    /// Embedded tensor (used by Constant nodes)
    Tensor(Tensor),
}

impl Attribute {
    /// Get the scalar integer value, if this is an `Int`
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Attribute::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Get the scalar float value, if this is a `Float`
    pub fn as_float(&self) -> Option<f32> {
        match self {
            Attribute::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Get the integer list, if this is an `Ints`
    pub fn as_ints(&self) -> Option<&[i64]> {
        match self {
            Attribute::Ints(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    /// Get the float list, if this is a `Floats`
    pub fn as_floats(&self) -> Option<&[f32]> {
        match self {
            Attribute::Floats(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    /// Get the embedded tensor, if this is a `Tensor`
    pub fn as_tensor(&self) -> Option<&Tensor> {
        match self {
            Attribute::Tensor(t) => Some(t),
            _ => None,
        }
    }

    /// Get the embedded tensor mutably, if this is a `Tensor`
    pub fn as_tensor_mut(&mut self) -> Option<&mut Tensor> {
        match self {
            Attribute::Tensor(t) => Some(t),
            _ => None,
        }
    }
}

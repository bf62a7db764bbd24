//! Tensor types and utilities
//!
//! - Element types (`dtype`)
//! - The dual-encoding payload type (`data`)
//! - Conversion to and from ndarray (`convert`)
//! - Shape helpers (`shape`)

pub mod convert;
pub mod data;
pub mod dtype;
pub mod shape;

pub use convert::{
    array_to_tensor_f32, array_to_tensor_i64, tensor_to_array_f32, tensor_to_array_i64,
};
pub use data::{Tensor, TensorData};
pub use dtype::{dtype_from_code, dtype_to_code, DataType};
pub use shape::{normalize_axis, numel};

//! Tensor element types

use crate::error::{RewriteError, RewriteResult};

/// Element type of a tensor or value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// 32-bit float
    Float,
    /// 64-bit float
    Double,
    /// 32-bit signed integer
    Int32,
    /// 64-bit signed integer
    Int64,
    /// 8-bit unsigned integer
    Uint8,
    /// 8-bit signed integer
    Int8,
}

impl DataType {
    /// Size of one element in bytes (the fixed-width raw encoding)
    pub fn size_in_bytes(&self) -> usize {
        match self {
            DataType::Float => 4,
            DataType::Double => 8,
            DataType::Int32 => 4,
            DataType::Int64 => 8,
            DataType::Uint8 => 1,
            DataType::Int8 => 1,
        }
    }

    /// Whether the type is floating point
    pub fn is_float(&self) -> bool {
        matches!(self, DataType::Float | DataType::Double)
    }

    /// Whether the type is integral
    pub fn is_int(&self) -> bool {
        matches!(
            self,
            DataType::Int32 | DataType::Int64 | DataType::Uint8 | DataType::Int8
        )
    }
}

/// Map an ONNX TensorProto data-type code to a [`DataType`]
pub fn dtype_from_code(code: i32) -> RewriteResult<DataType> {
    match code {
        1 => Ok(DataType::Float),
        2 => Ok(DataType::Uint8),
        3 => Ok(DataType::Int8),
        6 => Ok(DataType::Int32),
        7 => Ok(DataType::Int64),
        11 => Ok(DataType::Double),
        other => Err(RewriteError::Internal(format!(
            "Unsupported tensor data type code: {other}"
        ))),
    }
}

/// Map a [`DataType`] back to its ONNX TensorProto code
pub fn dtype_to_code(dtype: DataType) -> i32 {
    match dtype {
        DataType::Float => 1,
        DataType::Uint8 => 2,
        DataType::Int8 => 3,
        DataType::Int32 => 6,
        DataType::Int64 => 7,
        DataType::Double => 11,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_in_bytes() {
        assert_eq!(DataType::Float.size_in_bytes(), 4);
        assert_eq!(DataType::Int64.size_in_bytes(), 8);
        assert_eq!(DataType::Uint8.size_in_bytes(), 1);
    }

    #[test]
    fn test_code_round_trip() {
        for dtype in [
            DataType::Float,
            DataType::Uint8,
            DataType::Int8,
            DataType::Int32,
            DataType::Int64,
            DataType::Double,
        ] {
            assert_eq!(dtype_from_code(dtype_to_code(dtype)).unwrap(), dtype);
        }
        assert!(dtype_from_code(999).is_err());
    }
}

//! Value descriptors and dimensions

use crate::tensor::DataType;

/// One dimension of a value's shape
///
/// An unknown or symbolic extent is its own variant. `Fixed(0)` is a
/// legitimately zero-sized dimension, not an unknown one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dim {
    /// Statically known extent
    Fixed(i64),
    /// Unknown or symbolic extent
    Unknown,
}

impl Dim {
    /// The extent, if known
    pub fn value(&self) -> Option<i64> {
        match self {
            Dim::Fixed(v) => Some(*v),
            Dim::Unknown => None,
        }
    }

    /// Whether the extent is statically known
    pub fn is_known(&self) -> bool {
        matches!(self, Dim::Fixed(_))
    }
}

/// Shape/type metadata attached to a named value
#[derive(Debug, Clone, PartialEq)]
pub struct ValueInfo {
    /// Value name
    pub name: String,
    /// Element type
    pub elem_type: DataType,
    /// Ordered dimensions
    pub dims: Vec<Dim>,
}

impl ValueInfo {
    /// Create a descriptor with fully known dimensions
    pub fn new(name: &str, elem_type: DataType, shape: &[i64]) -> Self {
        Self {
            name: name.to_string(),
            elem_type,
            dims: shape.iter().map(|&d| Dim::Fixed(d)).collect(),
        }
    }

    /// Create a descriptor with explicit (possibly unknown) dimensions
    pub fn with_dims(name: &str, elem_type: DataType, dims: Vec<Dim>) -> Self {
        Self {
            name: name.to_string(),
            elem_type,
            dims,
        }
    }

    /// Number of dimensions
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// The full shape, if every dimension is statically known
    pub fn known_shape(&self) -> Option<Vec<i64>> {
        self.dims.iter().map(Dim::value).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_shape() {
        let vi = ValueInfo::new("X", DataType::Float, &[1, 3, 224, 224]);
        assert_eq!(vi.known_shape(), Some(vec![1, 3, 224, 224]));
        assert_eq!(vi.rank(), 4);
    }

    #[test]
    fn test_unknown_dim_blocks_shape() {
        let vi = ValueInfo::with_dims(
            "X",
            DataType::Float,
            vec![Dim::Unknown, Dim::Fixed(3), Dim::Fixed(224), Dim::Fixed(224)],
        );
        assert_eq!(vi.known_shape(), None);
        assert_eq!(vi.dims[1].value(), Some(3));
    }

    #[test]
    fn test_zero_dim_is_known() {
        // A zero-sized dimension is not the same thing as an unknown one.
        let vi = ValueInfo::with_dims("empty", DataType::Float, vec![Dim::Fixed(0), Dim::Fixed(4)]);
        assert_eq!(vi.known_shape(), Some(vec![0, 4]));
        assert!(vi.dims[0].is_known());
    }
}

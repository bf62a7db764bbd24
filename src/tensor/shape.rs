//! Shape utilities

use crate::error::{RewriteError, RewriteResult};

/// Total number of elements for a shape
pub fn numel(shape: &[i64]) -> usize {
    if shape.is_empty() {
        1 // scalar
    } else {
        shape.iter().map(|&d| d.max(0) as usize).product()
    }
}

/// Normalize a (possibly negative) axis to a positive index
pub fn normalize_axis(axis: i64, ndim: usize) -> RewriteResult<usize> {
    let ndim_i64 = ndim as i64;
    let normalized = if axis < 0 { axis + ndim_i64 } else { axis };

    if normalized < 0 || normalized >= ndim_i64 {
        return Err(RewriteError::InvalidNode(format!(
            "Axis {axis} out of bounds for rank {ndim}"
        )));
    }

    Ok(normalized as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numel() {
        assert_eq!(numel(&[2, 3, 4]), 24);
        assert_eq!(numel(&[]), 1);
        assert_eq!(numel(&[5, 0]), 0);
    }

    #[test]
    fn test_normalize_axis() {
        assert_eq!(normalize_axis(0, 4).unwrap(), 0);
        assert_eq!(normalize_axis(-1, 4).unwrap(), 3);
        assert!(normalize_axis(4, 4).is_err());
        assert!(normalize_axis(-5, 4).is_err());
    }
}

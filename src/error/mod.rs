//! Error types for onnx-rewrite
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Main error type for graph rewrite operations
#[derive(Error, Debug)]
pub enum RewriteError {
    /// A pass required static shape metadata that could not be resolved
    #[error("Cannot determine shape for value: {0}")]
    UnresolvableShape(String),

    /// A tensor's declared shape and actual data length disagree
    #[error("Malformed tensor {name}: expected {expected} elements, found {actual}")]
    MalformedTensor {
        /// Tensor name
        name: String,
        /// Element count implied by the declared shape
        expected: usize,
        /// Element count actually present in the payload
        actual: usize,
    },

    /// A required constant-producing node is absent
    #[error("No Constant node produces value: {0}")]
    ConstantNotFound(String),

    /// The node list could not be brought into dependency order
    #[error("Graph is cyclic or contains dangling references at node: {0}")]
    CyclicGraph(String),

    /// Invalid node configuration
    #[error("Invalid node: {0}")]
    InvalidNode(String),

    /// A node is missing an attribute a pass depends on
    #[error("Node {node} is missing attribute: {attr}")]
    MissingAttribute {
        /// Node name
        node: String,
        /// Attribute name
        attr: String,
    },

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for rewrite operations
pub type RewriteResult<T> = Result<T, RewriteError>;

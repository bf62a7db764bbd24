//! In-memory graph representation
//!
//! The data model mirrors the ONNX graph schema: a graph is an ordered node
//! list plus value descriptors for inputs, outputs, and intermediates, and a
//! map of named initializer tensors. Unlike the protobuf encoding, attributes
//! are a closed tagged union keyed by name in an ordered map, and unknown
//! dimensions are a distinct variant rather than a zero sentinel.

pub mod attr;
pub mod node;
pub mod value;

pub use attr::Attribute;
pub use node::{Node, OpKind};
pub use value::{Dim, ValueInfo};

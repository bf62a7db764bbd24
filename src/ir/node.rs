//! Graph nodes and operator kinds

use indexmap::IndexMap;

use crate::tensor::Tensor;

use super::attr::Attribute;

/// Operator kind tag
///
/// The set is closed over the operators the rewrite passes inspect; anything
/// else is carried through unmodified as `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OpKind {
    /// Constant-producing node
    Constant,
    /// Reshape
    Reshape,
    /// Flatten
    Flatten,
    /// Squeeze
    Squeeze,
    /// Unsqueeze
    Unsqueeze,
    /// AveragePool
    AveragePool,
    /// GlobalAveragePool
    GlobalAveragePool,
    /// Convolution
    Conv,
    /// BatchNormalization
    BatchNormalization,
    /// Shape
    Shape,
    /// Split
    Split,
    /// Slice
    Slice,
    /// Gemm (fully-connected / matrix multiply)
    Gemm,
    /// Any other operator, passed through unmodified
    Other(String),
}

impl OpKind {
    /// The operator's interchange-format name
    pub fn as_str(&self) -> &str {
        match self {
            OpKind::Constant => "Constant",
            OpKind::Reshape => "Reshape",
            OpKind::Flatten => "Flatten",
            OpKind::Squeeze => "Squeeze",
            OpKind::Unsqueeze => "Unsqueeze",
            OpKind::AveragePool => "AveragePool",
            OpKind::GlobalAveragePool => "GlobalAveragePool",
            OpKind::Conv => "Conv",
            OpKind::BatchNormalization => "BatchNormalization",
            OpKind::Shape => "Shape",
            OpKind::Split => "Split",
            OpKind::Slice => "Slice",
            OpKind::Gemm => "Gemm",
            OpKind::Other(s) => s.as_str(),
        }
    }
}

impl From<&str> for OpKind {
    fn from(s: &str) -> Self {
        match s {
            "Constant" => OpKind::Constant,
            "Reshape" => OpKind::Reshape,
            "Flatten" => OpKind::Flatten,
            "Squeeze" => OpKind::Squeeze,
            "Unsqueeze" => OpKind::Unsqueeze,
            "AveragePool" => OpKind::AveragePool,
            "GlobalAveragePool" => OpKind::GlobalAveragePool,
            "Conv" => OpKind::Conv,
            "BatchNormalization" => OpKind::BatchNormalization,
            "Shape" => OpKind::Shape,
            "Split" => OpKind::Split,
            "Slice" => OpKind::Slice,
            "Gemm" => OpKind::Gemm,
            other => OpKind::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for OpKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One operator instance in the graph
///
/// The name is also conventionally used as the default output identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Node name, unique within the graph
    pub name: String,
    /// Operator kind
    pub op: OpKind,
    /// Ordered input value names (an empty string marks an absent optional input)
    pub inputs: Vec<String>,
    /// Ordered output value names
    pub outputs: Vec<String>,
    /// Named attributes, insertion-ordered
    pub attrs: IndexMap<String, Attribute>,
}

impl Node {
    /// Create a new node
    pub fn new(op: OpKind, inputs: &[&str], outputs: &[&str], name: &str) -> Self {
        Self {
            name: name.to_string(),
            op,
            inputs: inputs.iter().map(|s| s.to_string()).collect(),
            outputs: outputs.iter().map(|s| s.to_string()).collect(),
            attrs: IndexMap::new(),
        }
    }

    /// Attach an attribute, builder-style
    pub fn with_attr(mut self, name: &str, value: Attribute) -> Self {
        self.attrs.insert(name.to_string(), value);
        self
    }

    // ========================================================================
    // Attribute accessors
    // ========================================================================

    /// Get an attribute by name
    pub fn attr(&self, name: &str) -> Option<&Attribute> {
        self.attrs.get(name)
    }

    /// Get an integer attribute value
    pub fn attr_int(&self, name: &str) -> Option<i64> {
        self.attrs.get(name).and_then(Attribute::as_int)
    }

    /// Get a float attribute value
    pub fn attr_float(&self, name: &str) -> Option<f32> {
        self.attrs.get(name).and_then(Attribute::as_float)
    }

    /// Get an integer-list attribute value
    pub fn attr_ints(&self, name: &str) -> Option<&[i64]> {
        self.attrs.get(name).and_then(Attribute::as_ints)
    }

    /// Get a float-list attribute value
    pub fn attr_floats(&self, name: &str) -> Option<&[f32]> {
        self.attrs.get(name).and_then(Attribute::as_floats)
    }

    /// Get an embedded tensor attribute
    pub fn attr_tensor(&self, name: &str) -> Option<&Tensor> {
        self.attrs.get(name).and_then(Attribute::as_tensor)
    }

    /// Get an embedded tensor attribute mutably
    pub fn attr_tensor_mut(&mut self, name: &str) -> Option<&mut Tensor> {
        self.attrs.get_mut(name).and_then(Attribute::as_tensor_mut)
    }

    /// Check if the node has an attribute
    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.contains_key(name)
    }

    // ========================================================================
    // Attribute mutators
    // ========================================================================

    /// Set or update an integer attribute
    pub fn set_attr_int(&mut self, name: &str, value: i64) {
        self.attrs.insert(name.to_string(), Attribute::Int(value));
    }

    /// Set or update a float attribute
    pub fn set_attr_float(&mut self, name: &str, value: f32) {
        self.attrs.insert(name.to_string(), Attribute::Float(value));
    }

    /// Set or update an integer-list attribute
    pub fn set_attr_ints(&mut self, name: &str, values: Vec<i64>) {
        self.attrs.insert(name.to_string(), Attribute::Ints(values));
    }

    /// Remove an attribute by name
    pub fn remove_attr(&mut self, name: &str) -> Option<Attribute> {
        self.attrs.shift_remove(name)
    }

    /// Drop all attributes
    pub fn clear_attrs(&mut self) {
        self.attrs.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_op_kind_round_trip() {
        assert_eq!(OpKind::from("Conv"), OpKind::Conv);
        assert_eq!(OpKind::Conv.as_str(), "Conv");

        let relu = OpKind::from("Relu");
        assert_eq!(relu, OpKind::Other("Relu".to_string()));
        assert_eq!(relu.as_str(), "Relu");
    }

    #[test]
    fn test_node_attributes() {
        let mut node = Node::new(OpKind::Conv, &["X", "W"], &["Y"], "conv_0");

        node.set_attr_int("group", 4);
        assert_eq!(node.attr_int("group"), Some(4));
        assert_eq!(node.attr_int("missing"), None);

        node.set_attr_int("group", 8);
        assert_eq!(node.attr_int("group"), Some(8));

        node.set_attr_ints("pads", vec![0, 0, 0, 0]);
        assert_eq!(node.attr_ints("pads"), Some(&[0i64, 0, 0, 0][..]));

        let removed = node.remove_attr("group");
        assert!(removed.is_some());
        assert!(!node.has_attr("group"));
    }

    #[test]
    fn test_attribute_order_preserved() {
        let node = Node::new(OpKind::Conv, &["X", "W"], &["Y"], "conv_0")
            .with_attr("kernel_shape", Attribute::Ints(vec![3, 3]))
            .with_attr("dilations", Attribute::Ints(vec![2, 2]))
            .with_attr("group", Attribute::Int(1));

        let names: Vec<_> = node.attrs.keys().collect();
        assert_eq!(names, vec!["kernel_shape", "dilations", "group"]);
    }
}

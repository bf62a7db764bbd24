//! Split decomposition
//!
//! A multi-way Split along a known axis is a set of independent Slice
//! operations, one per output. With an explicit size list the slices tile
//! the axis exactly; without one the axis is divided evenly and, when the
//! length is not divisible by the output count, the trailing remainder is
//! covered by no slice. That truncation mirrors the even-split rule as
//! specified; it is surfaced as a warning rather than silently corrected.

use rustc_hash::FxHashSet;

use crate::error::RewriteResult;
use crate::graph::{stabilize, Graph};
use crate::ir::{Attribute, Node, OpKind};
use crate::tensor::normalize_axis;

use super::{GraphRewrite, RewriteOutcome};

/// Decompose Split nodes into per-output Slices
#[derive(Debug, Default)]
pub struct SplitToSlices;

impl SplitToSlices {
    /// Create a new SplitToSlices pass
    pub fn new() -> Self {
        Self
    }
}

fn make_slice(data: &str, output: &str, axis: i64, start: i64, end: i64) -> Node {
    Node::new(OpKind::Slice, &[data], &[output], output)
        .with_attr("axes", Attribute::Ints(vec![axis]))
        .with_attr("starts", Attribute::Ints(vec![start]))
        .with_attr("ends", Attribute::Ints(vec![end]))
}

impl GraphRewrite for SplitToSlices {
    fn name(&self) -> &'static str {
        "SplitToSlices"
    }

    fn is_applicable(&self, graph: &Graph) -> bool {
        graph.nodes.iter().any(|n| n.op == OpKind::Split)
    }

    fn apply(&self, graph: &mut Graph) -> RewriteResult<RewriteOutcome> {
        let mut outcome = RewriteOutcome::new();
        let mut to_remove: FxHashSet<String> = FxHashSet::default();

        let splits: Vec<String> = graph
            .nodes
            .iter()
            .filter(|n| n.op == OpKind::Split)
            .map(|n| n.name.clone())
            .collect();

        for name in splits {
            let (data_input, outputs, axis, length, sizes) = {
                let node = match graph.find_node_by_name(&name) {
                    Some(n) => n,
                    None => continue,
                };
                let data_input = node.inputs[0].clone();

                let value = graph
                    .find_value_by_name(&data_input)
                    .or_else(|| graph.find_input_by_name(&data_input));
                let value = match value {
                    Some(vi) => vi,
                    None => continue,
                };

                let axis_attr = node.attr_int("axis").unwrap_or(0);
                let axis = match normalize_axis(axis_attr, value.rank()) {
                    Ok(a) => a,
                    Err(_) => continue,
                };

                // The extent along the split axis must be known.
                let length = match value.dims[axis].value() {
                    Some(l) => l,
                    None => continue,
                };

                let sizes = node.attr_ints("split").map(|s| s.to_vec());
                if let Some(ref s) = sizes {
                    if s.len() != node.outputs.len() {
                        continue;
                    }
                }

                (
                    data_input,
                    node.outputs.clone(),
                    axis as i64,
                    length,
                    sizes,
                )
            };

            match sizes {
                Some(sizes) => {
                    // Explicit sizes: a running offset tiles the axis.
                    let mut pos = 0i64;
                    for (output, size) in outputs.iter().zip(sizes) {
                        graph.push_node(make_slice(&data_input, output, axis, pos, pos + size));
                        pos += size;
                    }
                }
                None => {
                    let n_out = outputs.len() as i64;
                    let width = length / n_out;
                    if length % n_out != 0 {
                        outcome.warn(format!(
                            "Split {} divides {} unevenly across {} outputs; \
                             the trailing {} elements are dropped",
                            name,
                            length,
                            n_out,
                            length % n_out
                        ));
                    }
                    for (i, output) in outputs.iter().enumerate() {
                        let i = i as i64;
                        graph.push_node(make_slice(
                            &data_input,
                            output,
                            axis,
                            i * width,
                            (i + 1) * width,
                        ));
                    }
                }
            }

            to_remove.insert(name.clone());
            outcome.record(&name);
        }

        let removed = graph.remove_nodes(&to_remove);
        outcome.record_removed(removed);
        if removed > 0 {
            stabilize(graph)?;
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::ValueInfo;
    use crate::tensor::DataType;

    fn split_graph(length: i64, n_out: usize, sizes: Option<Vec<i64>>) -> Graph {
        let mut g = Graph::new();
        g.inputs.push(ValueInfo::new("X", DataType::Float, &[length]));
        let outputs: Vec<String> = (0..n_out).map(|i| format!("part_{i}")).collect();
        let output_refs: Vec<&str> = outputs.iter().map(String::as_str).collect();
        let mut split = Node::new(OpKind::Split, &["X"], &output_refs, "split_0");
        split.set_attr_int("axis", 0);
        if let Some(s) = sizes {
            split.set_attr_ints("split", s);
        }
        g.push_node(split);
        for o in &outputs {
            g.outputs.push(ValueInfo::new(o, DataType::Float, &[length / n_out as i64]));
        }
        g
    }

    fn slice_ranges(g: &Graph) -> Vec<(i64, i64)> {
        g.nodes
            .iter()
            .filter(|n| n.op == OpKind::Slice)
            .map(|n| {
                (
                    n.attr_ints("starts").unwrap()[0],
                    n.attr_ints("ends").unwrap()[0],
                )
            })
            .collect()
    }

    #[test]
    fn test_even_split_covers_exactly() {
        let mut g = split_graph(9, 3, None);
        let outcome = SplitToSlices::new().apply(&mut g).unwrap();

        assert_eq!(outcome.rewrites_applied, 1);
        assert!(outcome.warnings.is_empty());
        assert!(!g.nodes.iter().any(|n| n.op == OpKind::Split));
        assert_eq!(slice_ranges(&g), vec![(0, 3), (3, 6), (6, 9)]);
    }

    #[test]
    fn test_uneven_split_truncates_and_warns() {
        let mut g = split_graph(10, 3, None);
        let outcome = SplitToSlices::new().apply(&mut g).unwrap();

        // Element index 9 is covered by no slice; the behavior is kept but
        // surfaced.
        assert_eq!(slice_ranges(&g), vec![(0, 3), (3, 6), (6, 9)]);
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].contains("split_0"));
    }

    #[test]
    fn test_explicit_sizes_accumulate_offsets() {
        let mut g = split_graph(10, 3, Some(vec![2, 5, 3]));
        let outcome = SplitToSlices::new().apply(&mut g).unwrap();

        assert_eq!(outcome.rewrites_applied, 1);
        assert!(outcome.warnings.is_empty());
        assert_eq!(slice_ranges(&g), vec![(0, 2), (2, 7), (7, 10)]);
    }

    #[test]
    fn test_output_names_preserved() {
        let mut g = split_graph(9, 3, None);
        SplitToSlices::new().apply(&mut g).unwrap();

        for i in 0..3 {
            let expected = format!("part_{i}");
            let slice = g.find_node_by_output_name(&expected).unwrap();
            assert_eq!(slice.op, OpKind::Slice);
            assert_eq!(slice.name, expected);
            assert_eq!(slice.inputs, vec!["X"]);
        }
    }

    #[test]
    fn test_negative_axis_normalized() {
        let mut g = Graph::new();
        g.inputs.push(ValueInfo::new("X", DataType::Float, &[2, 6]));
        let mut split = Node::new(OpKind::Split, &["X"], &["a", "b"], "split_0");
        split.set_attr_int("axis", -1);
        g.push_node(split);
        g.outputs.push(ValueInfo::new("a", DataType::Float, &[2, 3]));
        g.outputs.push(ValueInfo::new("b", DataType::Float, &[2, 3]));

        SplitToSlices::new().apply(&mut g).unwrap();

        for n in g.nodes.iter().filter(|n| n.op == OpKind::Slice) {
            assert_eq!(n.attr_ints("axes"), Some(&[1i64][..]));
        }
        assert_eq!(slice_ranges(&g), vec![(0, 3), (3, 6)]);
    }

    #[test]
    fn test_unknown_axis_extent_skipped() {
        use crate::ir::Dim;

        let mut g = split_graph(9, 3, None);
        g.inputs[0] = ValueInfo::with_dims("X", DataType::Float, vec![Dim::Unknown]);

        let outcome = SplitToSlices::new().apply(&mut g).unwrap();
        assert!(!outcome.changed());
        assert!(g.nodes.iter().any(|n| n.op == OpKind::Split));
    }

    #[test]
    fn test_idempotent() {
        let mut g = split_graph(9, 3, None);
        SplitToSlices::new().apply(&mut g).unwrap();
        let outcome = SplitToSlices::new().apply(&mut g).unwrap();
        assert!(!outcome.changed());
    }
}

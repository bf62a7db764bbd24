//! Topological stabilizer
//!
//! Reorders the node list in place into a valid dependency order. Passes may
//! leave new nodes appended after their consumers; the stabilizer restores
//! the invariant. Idempotent on already-valid graphs.

use rustc_hash::FxHashSet;

use crate::error::{RewriteError, RewriteResult};

use super::Graph;

/// Reorder `graph.nodes` in place into topological order
///
/// A value is available if it is a graph input, an initializer, or the
/// output of an already-placed node. Nodes become placeable once all their
/// inputs are available; relative order among simultaneously-ready nodes is
/// preserved. Fails only if the graph is genuinely cyclic (or contains a
/// dangling input reference, which the passes must never produce).
pub fn stabilize(graph: &mut Graph) -> RewriteResult<()> {
    let mut available: FxHashSet<String> = FxHashSet::default();
    for vi in &graph.inputs {
        available.insert(vi.name.clone());
    }
    for name in graph.initializers.keys() {
        available.insert(name.clone());
    }

    let mut remaining = std::mem::take(&mut graph.nodes);
    let mut sorted = Vec::with_capacity(remaining.len());

    while !remaining.is_empty() {
        let mut deferred = Vec::with_capacity(remaining.len());
        let mut placed_any = false;

        for node in remaining {
            let ready = node
                .inputs
                .iter()
                .all(|i| i.is_empty() || available.contains(i));

            if ready {
                for output in &node.outputs {
                    if !output.is_empty() {
                        available.insert(output.clone());
                    }
                }
                sorted.push(node);
                placed_any = true;
            } else {
                deferred.push(node);
            }
        }

        if !placed_any {
            let stuck = deferred
                .first()
                .map(|n| n.name.clone())
                .unwrap_or_default();
            graph.nodes = sorted;
            graph.nodes.extend(deferred);
            return Err(RewriteError::CyclicGraph(stuck));
        }

        remaining = deferred;
    }

    graph.nodes = sorted;
    Ok(())
}

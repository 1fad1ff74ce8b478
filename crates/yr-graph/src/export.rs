//! Export to a petgraph graph for inspection and traversal.

use std::collections::BTreeMap;

use petgraph::graph::{DiGraph, NodeIndex};

use crate::analysis::Analysis;

impl Analysis {
    /// The analysis as a directed graph.
    ///
    /// Nodes are labelled `"<id> <Kind>"` and added in id order, so node
    /// index `i` is component id `i`. Each edge runs from an argument to
    /// the component consuming it and is labelled with the argument name.
    pub fn to_petgraph(&self) -> DiGraph<String, String> {
        let components = self.components();
        let mut graph = DiGraph::with_capacity(components.len(), components.len());
        let mut index: BTreeMap<_, NodeIndex> = BTreeMap::new();

        for component in &components {
            let Some(id) = component.id() else { continue };
            let node = graph.add_node(format!("{id} {}", component.kind()));
            index.insert(id, node);
        }

        for component in &components {
            let Some(consumer) = component.id().and_then(|id| index.get(&id)) else {
                continue;
            };
            for (name, argument) in component.arguments().iter() {
                if let Some(source) = argument.id().and_then(|id| index.get(&id)) {
                    graph.add_edge(*source, *consumer, name.to_owned());
                }
            }
        }
        graph
    }
}

//! Graph construction from a validated subtopic batch.
//!
//! Builds a [`petgraph`] directed graph over final subtopic ids. For each
//! subtopic `B` with prerequisite `A` we insert edge `A → B` (prerequisite →
//! dependent). The validator guarantees every referenced id is in the batch
//! and no entry references itself, so construction cannot dangle; duplicate
//! edges are suppressed.

#![allow(clippy::module_name_repetitions)]

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};
use uuid::Uuid;

use crate::validate::Subtopic;

/// The prerequisite relation as a directed graph.
///
/// Nodes are final subtopic ids. An edge `A → B` means "A must be learned
/// before B". May contain cycles until [`crate::graph::cycles::repair_cycles`]
/// has run.
#[derive(Debug)]
pub struct PrereqGraph {
    /// Directed graph: nodes = subtopic ids, edges = prerequisite relations.
    pub graph: DiGraph<Uuid, ()>,
    /// Mapping from subtopic id to petgraph `NodeIndex`.
    pub node_map: HashMap<Uuid, NodeIndex>,
}

impl PrereqGraph {
    /// Build the graph for a batch. Node order follows batch order, which
    /// keeps traversals deterministic for identical input.
    #[must_use]
    pub fn from_subtopics(subtopics: &[Subtopic]) -> Self {
        let mut graph = DiGraph::<Uuid, ()>::new();
        let mut node_map: HashMap<Uuid, NodeIndex> = HashMap::with_capacity(subtopics.len());

        for subtopic in subtopics {
            let idx = graph.add_node(subtopic.id);
            node_map.insert(subtopic.id, idx);
        }

        for subtopic in subtopics {
            let Some(&dependent_idx) = node_map.get(&subtopic.id) else {
                continue;
            };
            for prereq_id in &subtopic.prerequisite_ids {
                let Some(&prereq_idx) = node_map.get(prereq_id) else {
                    continue;
                };
                // petgraph allows parallel edges; keep the relation simple.
                if !graph.contains_edge(prereq_idx, dependent_idx) {
                    graph.add_edge(prereq_idx, dependent_idx, ());
                }
            }
        }

        Self { graph, node_map }
    }

    /// Number of nodes (subtopics) in the graph.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of prerequisite edges in the graph.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Look up the `NodeIndex` for a subtopic id.
    #[must_use]
    pub fn node_index(&self, id: Uuid) -> Option<NodeIndex> {
        self.node_map.get(&id).copied()
    }

    /// The subtopic id carried by a node.
    #[must_use]
    pub fn subtopic_id(&self, idx: NodeIndex) -> Option<Uuid> {
        self.graph.node_weight(idx).copied()
    }
}

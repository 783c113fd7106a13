//! Cycle detection and best-effort repair for the prerequisite relation.
//!
//! # Approximate localization
//!
//! Detection runs Kahn's algorithm (topological sort by repeated removal of
//! zero-in-degree nodes). When the sort cannot process every node, the nodes
//! whose in-degree never reached zero are flagged. That set is a **superset**
//! of the true cycle members — nodes merely downstream of a cycle are flagged
//! too. This imprecision is a deliberate tradeoff: the flagged set is cheap
//! to compute and errs toward cutting more, which is acceptable for repairing
//! provider output.
//!
//! # Repair
//!
//! For every flagged node, prerequisite edges pointing at another flagged
//! node are removed (edges wholly inside the flagged set are the likely cycle
//! edges; edges into non-flagged nodes are kept). Detection and repair then
//! re-run until nothing is flagged, so callers downstream can rely on a DAG.
//! The report always carries the *first* pass's flagged set — the pre-repair
//! picture.

#![allow(clippy::module_name_repetitions)]

use std::collections::{HashMap, HashSet, VecDeque};

use petgraph::graph::NodeIndex;
use petgraph::Direction;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{Warning, WarningKind};
use crate::graph::build::PrereqGraph;
use crate::validate::Subtopic;

/// Outcome of cycle detection and repair over one batch.
#[derive(Debug, Clone, Default)]
pub struct CycleRepair {
    /// Ids flagged by the first detection pass, in batch order. Empty when
    /// the input was already acyclic.
    pub detected: Vec<Uuid>,
    /// Total prerequisite edges removed across all repair passes.
    pub removed_edges: usize,
    /// Number of detect→break passes run (0 when already acyclic).
    pub passes: usize,
    /// One warning per subtopic that lost edges.
    pub warnings: Vec<Warning>,
}

/// Flag nodes implicated in (or downstream of) a cycle via Kahn's algorithm.
///
/// Returns the empty set when the graph is acyclic. See the module docs for
/// why the returned set is over-inclusive.
#[must_use]
pub fn flag_cycle_members(prereq: &PrereqGraph) -> HashSet<Uuid> {
    let graph = &prereq.graph;

    let mut in_degree: HashMap<NodeIndex, usize> = graph
        .node_indices()
        .map(|idx| {
            (
                idx,
                graph.neighbors_directed(idx, Direction::Incoming).count(),
            )
        })
        .collect();

    let mut queue: VecDeque<NodeIndex> = in_degree
        .iter()
        .filter_map(|(&idx, &degree)| (degree == 0).then_some(idx))
        .collect();

    let mut processed = 0_usize;
    while let Some(current) = queue.pop_front() {
        processed += 1;
        for dependent in graph.neighbors_directed(current, Direction::Outgoing) {
            if let Some(degree) = in_degree.get_mut(&dependent) {
                if *degree > 0 {
                    *degree -= 1;
                    if *degree == 0 {
                        queue.push_back(dependent);
                    }
                }
            }
        }
    }

    if processed == graph.node_count() {
        return HashSet::new();
    }

    // Nodes whose in-degree never drained are in or downstream of a cycle.
    in_degree
        .into_iter()
        .filter(|&(_, degree)| degree > 0)
        .filter_map(|(idx, _)| prereq.subtopic_id(idx))
        .collect()
}

/// Detect cycles and repair the batch in place until the prerequisite
/// relation is acyclic.
///
/// Each pass removes, for every flagged subtopic, the prerequisite entries
/// that point at another flagged subtopic. Every cycle lies wholly inside the
/// flagged set, so a pass that flags anything always removes at least one
/// edge and the loop terminates.
#[instrument(skip(subtopics), fields(subtopics = subtopics.len()))]
pub fn repair_cycles(subtopics: &mut [Subtopic]) -> CycleRepair {
    let mut flagged = flag_cycle_members(&PrereqGraph::from_subtopics(subtopics));
    if flagged.is_empty() {
        return CycleRepair::default();
    }

    // Pre-repair report, in batch order for deterministic output.
    let detected: Vec<Uuid> = subtopics
        .iter()
        .map(|subtopic| subtopic.id)
        .filter(|id| flagged.contains(id))
        .collect();
    tracing::warn!(flagged = detected.len(), "prerequisite cycle detected");

    let mut warnings: Vec<Warning> = Vec::new();
    let mut removed_edges = 0_usize;
    let mut passes = 0_usize;

    while !flagged.is_empty() {
        passes += 1;
        let mut removed_this_pass = 0_usize;

        for subtopic in subtopics
            .iter_mut()
            .filter(|subtopic| flagged.contains(&subtopic.id))
        {
            let before = subtopic.prerequisite_ids.len();
            subtopic
                .prerequisite_ids
                .retain(|prereq_id| !flagged.contains(prereq_id));
            let removed = before - subtopic.prerequisite_ids.len();
            if removed > 0 {
                removed_this_pass += removed;
                warnings.push(Warning::emit(
                    WarningKind::CycleEdgeRemoved,
                    format!(
                        "removed {removed} cycle-related prerequisite(s) from subtopic '{}'",
                        subtopic.name
                    ),
                ));
            }
        }

        removed_edges += removed_this_pass;
        if removed_this_pass == 0 {
            // Should be unreachable: every cycle is inside the flagged set.
            tracing::error!("cycle repair pass removed no edges; giving up");
            break;
        }

        flagged = flag_cycle_members(&PrereqGraph::from_subtopics(subtopics));
    }

    CycleRepair {
        detected,
        removed_edges,
        passes,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subtopic(name: &str, id: Uuid, prereqs: &[Uuid]) -> Subtopic {
        Subtopic {
            id,
            name: name.to_string(),
            time_minutes: 20,
            difficulty: 0.5,
            density: 0.5,
            prerequisite_ids: prereqs.to_vec(),
        }
    }

    fn is_acyclic(subtopics: &[Subtopic]) -> bool {
        flag_cycle_members(&PrereqGraph::from_subtopics(subtopics)).is_empty()
    }

    #[test]
    fn acyclic_batch_is_untouched() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let mut batch = vec![subtopic("A", a, &[]), subtopic("B", b, &[a])];

        let report = repair_cycles(&mut batch);

        assert!(report.detected.is_empty());
        assert_eq!(report.removed_edges, 0);
        assert_eq!(report.passes, 0);
        assert_eq!(batch[1].prerequisite_ids, vec![a]);
    }

    #[test]
    fn mutual_cycle_flags_both_and_breaks_edges() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let mut batch = vec![subtopic("A", a, &[b]), subtopic("B", b, &[a])];

        let report = repair_cycles(&mut batch);

        assert_eq!(report.detected, vec![a, b], "batch order preserved");
        assert!(report.removed_edges >= 1);
        assert!(is_acyclic(&batch));
        // Both edges were inside the flagged set — both removed.
        assert!(batch[0].prerequisite_ids.is_empty());
        assert!(batch[1].prerequisite_ids.is_empty());
    }

    #[test]
    fn downstream_of_cycle_is_flagged_too() {
        // A ⇄ B, then B → C. Kahn never drains C, so C is flagged as well —
        // the documented over-inclusive behavior.
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();
        let mut batch = vec![
            subtopic("A", a, &[b]),
            subtopic("B", b, &[a]),
            subtopic("C", c, &[b]),
        ];

        let flagged = flag_cycle_members(&PrereqGraph::from_subtopics(&batch));
        assert_eq!(flagged.len(), 3);

        let report = repair_cycles(&mut batch);
        assert_eq!(report.detected.len(), 3);
        assert!(is_acyclic(&batch));
        // C's edge from B was flagged→flagged and is gone as well.
        assert!(batch[2].prerequisite_ids.is_empty());
    }

    #[test]
    fn edges_into_non_flagged_nodes_are_kept() {
        // D is an independent prerequisite of A; the A ⇄ B cycle must not
        // cost A its edge from D.
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let d = Uuid::new_v4();
        let mut batch = vec![
            subtopic("D", d, &[]),
            subtopic("A", a, &[b, d]),
            subtopic("B", b, &[a]),
        ];

        let report = repair_cycles(&mut batch);

        assert!(is_acyclic(&batch));
        assert_eq!(batch[1].prerequisite_ids, vec![d], "edge from D kept");
        assert!(!report.detected.contains(&d));
    }

    #[test]
    fn self_contained_three_cycle_repaired_in_one_pass() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();
        let mut batch = vec![
            subtopic("A", a, &[c]),
            subtopic("B", b, &[a]),
            subtopic("C", c, &[b]),
        ];

        let report = repair_cycles(&mut batch);

        assert!(is_acyclic(&batch));
        assert_eq!(report.removed_edges, 3);
        // One repair pass plus the verifying re-detection.
        assert!(report.passes >= 1);
        assert_eq!(report.warnings.len(), 3);
    }
}

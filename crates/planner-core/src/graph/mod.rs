//! Prerequisite graph construction, cycle repair, and projection.
//!
//! # Overview
//!
//! The prerequisite relation over a validated batch is modeled as a petgraph
//! directed graph and pushed through two stages:
//!
//! ```text
//! Vec<Subtopic>
//!        ↓  build::PrereqGraph::from_subtopics()
//! PrereqGraph (DiGraph, may contain cycles)
//!        ↓  cycles::repair_cycles()
//! DAG-respecting prerequisite lists + CycleRepair report
//!        ↓  project::project()
//! GraphView (renderable nodes/edges with difficulty styling)
//! ```
//!
//! ## Edge Direction
//!
//! An edge `A → B` means "A is a **prerequisite** of B" — A should be learned
//! before B.

pub mod build;
pub mod cycles;
pub mod project;

// Re-export primary types at module level for convenience.
pub use build::PrereqGraph;
pub use cycles::{flag_cycle_members, repair_cycles, CycleRepair};
pub use project::{project, GraphEdge, GraphNode, GraphView};

#![forbid(unsafe_code)]
//! planner-core library.
//!
//! Turns the loosely structured JSON a generative model emits for a course
//! plan into an internally consistent bundle: validated subtopics, an acyclic
//! prerequisite graph, rebalanced time estimates, and a renderable node/edge
//! view.
//!
//! # Pipeline
//!
//! ```text
//! raw JSON document
//!        ↓  validate::validate_document()
//! ValidatedBatch (fresh UUIDs, rewritten prerequisites)
//!        ↓  graph::cycles::repair_cycles()
//! DAG-respecting prerequisite relation + cycle report
//!        ↓  rebalance::rebalance()
//! time estimates scaled toward the requested duration
//!        ↓  graph::project::project()
//! PlanBundle (subtopics + graph view + analysis)
//! ```
//!
//! The pipeline is pure computation over an in-memory document: no I/O, no
//! shared state, independent per call. Obtaining the raw document (typically
//! from a generative provider, see [`provider::StructureSource`]) and
//! persisting the result are the caller's concern.
//!
//! # Conventions
//!
//! - **Errors**: [`error::MalformedDocument`] for unrecoverable shape
//!   violations; everything else is repaired locally and recorded as a
//!   [`error::Warning`].
//! - **Logging**: `tracing` macros (`info!`, `warn!`, `error!`, `debug!`).

pub mod config;
pub mod error;
pub mod graph;
pub mod pipeline;
pub mod provider;
pub mod rebalance;
pub mod request;
pub mod validate;

pub use config::PlannerConfig;
pub use error::{MalformedDocument, Warning, WarningKind};
pub use pipeline::{process_structure, AnalysisSummary, PlanBundle};
pub use request::{Difficulty, PlanRequest};
pub use validate::{Subtopic, ValidatedBatch};

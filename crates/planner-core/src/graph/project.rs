//! Renderable graph projection.
//!
//! Derives a node/edge view of the final batch for the plan UI: one node per
//! subtopic with a difficulty-keyed color style, one edge per prerequisite
//! relation. Purely derived — inputs are never mutated, and identical input
//! yields identical output. Serde renames target the flow-renderer wire shape
//! (`fontSize`, `markerEnd`, `type`, …).

#![allow(clippy::module_name_repetitions)]

use std::collections::HashSet;

use serde::Serialize;
use uuid::Uuid;

use crate::error::{Warning, WarningKind};
use crate::validate::Subtopic;

/// Rendered node width in pixels.
pub const NODE_WIDTH: u32 = 180;

const FOREGROUND: &str = "#ffffff";
const EDGE_STROKE: &str = "#777";

/// Background color for a difficulty value.
///
/// Five fixed bands from very easy (dark green) to very hard (dark red);
/// the mid band is the brand purple. Thresholds are configuration constants,
/// not computed.
#[must_use]
pub const fn difficulty_background(difficulty: f64) -> &'static str {
    if difficulty > 0.75 {
        "#b71c1c"
    } else if difficulty > 0.55 {
        "#d32f2f"
    } else if difficulty < 0.25 {
        "#2e7d32"
    } else if difficulty < 0.45 {
        "#388e3c"
    } else {
        "#5823c8"
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeData {
    pub label: String,
}

/// Visual style for a node, fixed at projection time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeStyle {
    pub width: u32,
    #[serde(rename = "fontSize")]
    pub font_size: &'static str,
    #[serde(rename = "textAlign")]
    pub text_align: &'static str,
    pub padding: &'static str,
    #[serde(rename = "borderRadius")]
    pub border_radius: &'static str,
    pub background: &'static str,
    pub color: &'static str,
    pub border: String,
}

/// One renderable node per surviving subtopic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphNode {
    pub id: Uuid,
    pub position: Position,
    pub data: NodeData,
    pub style: NodeStyle,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeMarker {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub width: u32,
    pub height: u32,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeStyle {
    #[serde(rename = "strokeWidth")]
    pub stroke_width: f64,
    pub stroke: &'static str,
}

/// One renderable edge per prerequisite relation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphEdge {
    /// Deterministic id derived from the endpoints: `e-<source>-<target>`.
    pub id: String,
    pub source: Uuid,
    pub target: Uuid,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub animated: bool,
    #[serde(rename = "markerEnd")]
    pub marker_end: EdgeMarker,
    pub style: EdgeStyle,
}

/// The renderable graph for a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct GraphView {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

/// Project the final batch into a [`GraphView`].
///
/// Edges whose source is absent from the node set are dropped with a logged
/// inconsistency. That cannot happen after validation and cycle repair, but
/// the projector must not crash if it does.
#[must_use]
pub fn project(subtopics: &[Subtopic]) -> (GraphView, Vec<Warning>) {
    let node_ids: HashSet<Uuid> = subtopics.iter().map(|subtopic| subtopic.id).collect();

    let mut nodes: Vec<GraphNode> = Vec::with_capacity(subtopics.len());
    let mut edges: Vec<GraphEdge> = Vec::new();
    let mut warnings: Vec<Warning> = Vec::new();

    for subtopic in subtopics {
        let background = difficulty_background(subtopic.difficulty);
        nodes.push(GraphNode {
            id: subtopic.id,
            position: Position::default(),
            data: NodeData {
                label: display_label(&subtopic.name),
            },
            style: NodeStyle {
                width: NODE_WIDTH,
                font_size: "0.75rem",
                text_align: "center",
                padding: "10px 12px",
                border_radius: "8px",
                background,
                color: FOREGROUND,
                border: format!("1px solid {background}"),
            },
            kind: "default",
        });

        for &prereq_id in &subtopic.prerequisite_ids {
            if node_ids.contains(&prereq_id) {
                edges.push(GraphEdge {
                    id: format!("e-{prereq_id}-{}", subtopic.id),
                    source: prereq_id,
                    target: subtopic.id,
                    kind: "smoothstep",
                    animated: false,
                    marker_end: EdgeMarker {
                        kind: "arrowclosed",
                        width: 18,
                        height: 18,
                        color: EDGE_STROKE,
                    },
                    style: EdgeStyle {
                        stroke_width: 1.75,
                        stroke: EDGE_STROKE,
                    },
                });
            } else {
                tracing::error!(
                    subtopic = %subtopic.id,
                    prereq = %prereq_id,
                    "prerequisite missing from node set during edge creation"
                );
                warnings.push(Warning::emit(
                    WarningKind::EdgeSourceMissing,
                    format!(
                        "dropped edge {prereq_id} → {} (source not in node set)",
                        subtopic.id
                    ),
                ));
            }
        }
    }

    (GraphView { nodes, edges }, warnings)
}

/// Split `Type: Name` subtopic names into a bracketed tag plus main label.
fn display_label(name: &str) -> String {
    match name.split_once(':') {
        Some((prefix, rest)) => format!("[{}]\n{}", prefix.trim(), rest.trim()),
        None => name.to_string(),
    }
}

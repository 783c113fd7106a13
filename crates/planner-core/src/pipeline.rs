//! End-to-end structure pipeline.
//!
//! [`process_structure`] chains the stages — validate, repair cycles,
//! rebalance, project — and assembles the result bundle callers serialize
//! back to clients. Either a complete, internally consistent bundle comes
//! back, or [`MalformedDocument`]; there is no partial-success value.

use serde::Serialize;
use serde_json::Value;
use tracing::instrument;
use uuid::Uuid;

use crate::config::PlannerConfig;
use crate::error::{MalformedDocument, Warning};
use crate::graph::cycles::repair_cycles;
use crate::graph::project::{project, GraphView};
use crate::rebalance::rebalance;
use crate::validate::{validate_document, Subtopic, ValidatedBatch};

/// Curve and cycle data derived from the final batch, ordered the same way
/// as the subtopic list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisSummary {
    #[serde(rename = "difficultyCurve")]
    pub difficulty_curve: Vec<f64>,
    #[serde(rename = "densityCurve")]
    pub density_curve: Vec<f64>,
    /// Final sum of subtopic minutes after rebalancing.
    #[serde(rename = "estimatedTotalTime")]
    pub estimated_total_minutes: u64,
    /// Ids flagged by the pre-repair cycle report. Empty when the input
    /// prerequisite relation was already acyclic.
    #[serde(rename = "detectedCycles")]
    pub cycle_member_ids: Vec<Uuid>,
}

/// The complete pipeline result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanBundle {
    /// Final subtopics in validated order.
    pub subtopics: Vec<Subtopic>,
    /// Renderable node/edge view.
    pub graph: GraphView,
    /// Derived curves, total time, and cycle report.
    pub analysis: AnalysisSummary,
    /// Every defect recovered along the way. Not serialized; surfaced for
    /// callers that want observability without a tracing subscriber.
    #[serde(skip)]
    pub warnings: Vec<Warning>,
}

/// Run the full pipeline over a raw structure document.
///
/// `target_hours` is the caller-requested plan duration; subtopic times are
/// rebalanced toward `target_hours * 60` minutes.
///
/// # Errors
///
/// Returns [`MalformedDocument`] when the document shape is invalid or no
/// entries survive validation. Every other defect is repaired and recorded
/// in [`PlanBundle::warnings`].
#[instrument(skip(doc, config))]
pub fn process_structure(
    doc: &Value,
    target_hours: f64,
    config: &PlannerConfig,
) -> Result<PlanBundle, MalformedDocument> {
    let ValidatedBatch {
        mut subtopics,
        mut warnings,
    } = validate_document(doc, config)?;

    let repair = repair_cycles(&mut subtopics);
    warnings.extend(repair.warnings);

    let outcome = rebalance(&mut subtopics, target_hours * 60.0, config);

    let (graph, projection_warnings) = project(&subtopics);
    warnings.extend(projection_warnings);

    let analysis = AnalysisSummary {
        difficulty_curve: subtopics.iter().map(|s| s.difficulty).collect(),
        density_curve: subtopics.iter().map(|s| s.density).collect(),
        estimated_total_minutes: outcome.after_total,
        cycle_member_ids: repair.detected,
    };

    tracing::info!(
        subtopics = subtopics.len(),
        total_minutes = analysis.estimated_total_minutes,
        cycle_members = analysis.cycle_member_ids.len(),
        warnings = warnings.len(),
        "structure post-processing complete"
    );

    Ok(PlanBundle {
        subtopics,
        graph,
        analysis,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bundle_serializes_to_the_wire_shape() {
        let doc = json!({
            "subtopics": [{
                "id": "temp_id_1",
                "name": "Introduction: Basics",
                "time": 45,
                "difficultyValue": 0.2,
                "conceptDensity": 0.4,
                "prerequisiteIds": [],
            }],
            "analysis": {},
        });

        let bundle =
            process_structure(&doc, 0.75, &PlannerConfig::default()).expect("processes");
        let value = serde_json::to_value(&bundle).expect("serialize");

        assert!(value.get("subtopics").is_some());
        assert!(value.get("graph").is_some());
        let analysis = value.get("analysis").expect("analysis");
        assert!(analysis.get("difficultyCurve").is_some());
        assert!(analysis.get("densityCurve").is_some());
        assert!(analysis.get("estimatedTotalTime").is_some());
        assert!(analysis.get("detectedCycles").is_some());
        // Warnings are internal only.
        assert!(value.get("warnings").is_none());
    }

    #[test]
    fn curves_follow_subtopic_order() {
        let doc = json!({
            "subtopics": [
                {
                    "id": "temp_id_1", "name": "A", "time": 30,
                    "difficultyValue": 0.1, "conceptDensity": 0.9,
                    "prerequisiteIds": [],
                },
                {
                    "id": "temp_id_2", "name": "B", "time": 30,
                    "difficultyValue": 0.8, "conceptDensity": 0.2,
                    "prerequisiteIds": ["temp_id_1"],
                },
            ],
            "analysis": {},
        });

        let bundle = process_structure(&doc, 1.0, &PlannerConfig::default()).expect("processes");

        assert_eq!(bundle.analysis.difficulty_curve, vec![0.1, 0.8]);
        assert_eq!(bundle.analysis.density_curve, vec![0.9, 0.2]);
        assert_eq!(
            bundle.analysis.estimated_total_minutes,
            u64::from(bundle.subtopics[0].time_minutes) + u64::from(bundle.subtopics[1].time_minutes)
        );
    }
}

//! Structure validation and repair.
//!
//! Turns an untrusted provider document into a list of well-formed
//! [`Subtopic`] records with a rewritten prerequisite relation. Three levels
//! of checking:
//!
//! 1. **Document shape** — `subtopics` must be a list, `analysis` must be an
//!    object. Shape violations are fatal ([`MalformedDocument`]).
//! 2. **Per-entry validation** — required fields, name trimming, time floor,
//!    metric clamping, prerequisite list shape. Defective entries are dropped
//!    or repaired independently; one bad entry never aborts the batch.
//! 3. **Reference rewrite** — a second pass maps every temporary prerequisite
//!    token to its assigned UUID, dropping dangling and self references.
//!
//! Every field access goes through an explicit presence/type check on the
//! `serde_json::Value` — nothing is coerced implicitly. All recovered defects
//! are recorded as [`Warning`]s on the returned batch.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;
use uuid::Uuid;

use crate::config::PlannerConfig;
use crate::error::{MalformedDocument, Warning, WarningKind};

/// Prefix convention for caller-local temporary identifiers.
pub const TEMP_ID_PREFIX: &str = "temp_id_";

const REQUIRED_FIELDS: [&str; 6] = [
    "id",
    "name",
    "time",
    "difficultyValue",
    "conceptDensity",
    "prerequisiteIds",
];

// ---------------------------------------------------------------------------
// Subtopic
// ---------------------------------------------------------------------------

/// One validated unit of a learning plan.
///
/// `id` is assigned by this process (UUID v4), never derived from input.
/// Serde renames match the wire shape (`time`, `difficultyValue`,
/// `conceptDensity`, `prerequisiteIds`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subtopic {
    pub id: Uuid,
    pub name: String,
    /// Estimated minutes, always ≥ the configured floor.
    #[serde(rename = "time")]
    pub time_minutes: u32,
    /// Difficulty in `[0.0, 1.0]`.
    #[serde(rename = "difficultyValue")]
    pub difficulty: f64,
    /// Concept density in `[0.0, 1.0]`.
    #[serde(rename = "conceptDensity")]
    pub density: f64,
    /// Final ids of direct prerequisites. No self references, no ids outside
    /// the batch; acyclic only after [`crate::graph::cycles::repair_cycles`].
    #[serde(rename = "prerequisiteIds")]
    pub prerequisite_ids: Vec<Uuid>,
}

/// The validator's output: surviving subtopics plus every recovered defect.
#[derive(Debug, Clone, Default)]
pub struct ValidatedBatch {
    /// Subtopics in input order, with fresh UUIDs and rewritten prerequisites.
    pub subtopics: Vec<Subtopic>,
    /// Per-entry defects repaired along the way.
    pub warnings: Vec<Warning>,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// An entry that survived the first pass; prerequisites still hold raw
/// temp-id tokens until the second pass rewrites them.
struct PendingEntry {
    subtopic: Subtopic,
    raw_prereqs: Vec<String>,
}

/// Validate a raw structure document into a [`ValidatedBatch`].
///
/// # Errors
///
/// Returns [`MalformedDocument`] only when the document shape itself is
/// invalid or when zero entries survive per-entry validation. All per-entry
/// defects are recovered locally and recorded as warnings.
#[instrument(skip(doc, config))]
pub fn validate_document(
    doc: &Value,
    config: &PlannerConfig,
) -> Result<ValidatedBatch, MalformedDocument> {
    let root = doc.as_object().ok_or(MalformedDocument::NotAnObject)?;

    let entries = root
        .get("subtopics")
        .ok_or(MalformedDocument::MissingSubtopics)?
        .as_array()
        .ok_or(MalformedDocument::SubtopicsNotList)?;

    let analysis = root
        .get("analysis")
        .ok_or(MalformedDocument::MissingAnalysis)?;
    if !analysis.is_object() {
        return Err(MalformedDocument::AnalysisNotObject);
    }

    let mut warnings: Vec<Warning> = Vec::new();
    let mut id_map: HashMap<String, Uuid> = HashMap::new();
    let mut pending: Vec<PendingEntry> = Vec::with_capacity(entries.len());

    for (index, value) in entries.iter().enumerate() {
        if let Some(entry) = validate_entry(index, value, config, &mut id_map, &mut warnings) {
            pending.push(entry);
        }
    }

    if pending.is_empty() {
        return Err(MalformedDocument::NoSurvivingSubtopics);
    }

    // Second pass: rewrite temp-id references now that the full map exists.
    let subtopics = rewrite_prerequisites(pending, &id_map, &mut warnings);

    tracing::debug!(
        subtopics = subtopics.len(),
        warnings = warnings.len(),
        "document validated"
    );

    Ok(ValidatedBatch {
        subtopics,
        warnings,
    })
}

/// First-pass validation of a single entry. Returns `None` when the entry is
/// dropped; the reason is always recorded in `warnings`.
fn validate_entry(
    index: usize,
    value: &Value,
    config: &PlannerConfig,
    id_map: &mut HashMap<String, Uuid>,
    warnings: &mut Vec<Warning>,
) -> Option<PendingEntry> {
    let Some(entry) = value.as_object() else {
        warnings.push(Warning::emit(
            WarningKind::EntryNotObject,
            format!("dropping subtopic at index {index}: not an object"),
        ));
        return None;
    };

    let missing: Vec<&str> = REQUIRED_FIELDS
        .iter()
        .filter(|key| !entry.contains_key(**key))
        .copied()
        .collect();
    if !missing.is_empty() {
        warnings.push(Warning::emit(
            WarningKind::MissingFields,
            format!("dropping subtopic at index {index}: missing {missing:?}"),
        ));
        return None;
    }

    let Some(name) = entry
        .get("name")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|name| !name.is_empty())
    else {
        warnings.push(Warning::emit(
            WarningKind::InvalidName,
            format!("dropping subtopic at index {index}: invalid or empty name"),
        ));
        return None;
    };

    let time_minutes = validate_time(entry.get("time"), name, config, warnings);
    let difficulty = validate_metric(entry.get("difficultyValue"), "difficultyValue", name, warnings);
    let density = validate_metric(entry.get("conceptDensity"), "conceptDensity", name, warnings);
    let raw_prereqs = validate_prereq_tokens(entry.get("prerequisiteIds"), name, warnings);

    // Temp ids keep their original token whenever one exists, even without
    // the expected prefix, so that references to them still resolve in the
    // second pass. Only missing/non-string ids get a synthesized token.
    let temp_id = match entry.get("id").and_then(Value::as_str).map(str::trim) {
        Some(token) if !token.is_empty() => {
            if !token.starts_with(TEMP_ID_PREFIX) {
                warnings.push(Warning::emit(
                    WarningKind::TempIdUnconventional,
                    format!("subtopic '{name}' has unconventional temp id '{token}'"),
                ));
            }
            token.to_string()
        }
        _ => {
            warnings.push(Warning::emit(
                WarningKind::TempIdSynthesized,
                format!("subtopic '{name}' has no usable temp id; synthesizing one"),
            ));
            format!("{TEMP_ID_PREFIX}fallback_{}", Uuid::new_v4())
        }
    };

    if id_map.contains_key(&temp_id) {
        warnings.push(Warning::emit(
            WarningKind::DuplicateTempId,
            format!("dropping subtopic '{name}': duplicate temp id '{temp_id}'"),
        ));
        return None;
    }

    let id = Uuid::new_v4();
    id_map.insert(temp_id, id);

    Some(PendingEntry {
        subtopic: Subtopic {
            id,
            name: name.to_string(),
            time_minutes,
            difficulty,
            density,
            prerequisite_ids: Vec::new(),
        },
        raw_prereqs,
    })
}

/// `time` must be a positive integer; absent/invalid values default to the
/// floor, below-floor values are raised to it.
fn validate_time(
    value: Option<&Value>,
    name: &str,
    config: &PlannerConfig,
    warnings: &mut Vec<Warning>,
) -> u32 {
    let floor = config.min_subtopic_minutes;
    match value.and_then(Value::as_u64) {
        Some(time) if time >= u64::from(floor) => u32::try_from(time).unwrap_or(u32::MAX),
        Some(time) if time > 0 => {
            warnings.push(Warning::emit(
                WarningKind::TimeRaised,
                format!("raised subtopic '{name}' time from {time} to floor {floor} minutes"),
            ));
            floor
        }
        _ => {
            warnings.push(Warning::emit(
                WarningKind::TimeDefaulted,
                format!("subtopic '{name}' time invalid; defaulting to {floor} minutes"),
            ));
            floor
        }
    }
}

/// Clamp a `[0, 1]` metric; non-numeric (or non-finite) values become 0.5.
fn validate_metric(
    value: Option<&Value>,
    field: &str,
    name: &str,
    warnings: &mut Vec<Warning>,
) -> f64 {
    match value.and_then(Value::as_f64) {
        Some(metric) if metric.is_finite() => metric.clamp(0.0, 1.0),
        _ => {
            warnings.push(Warning::emit(
                WarningKind::MetricDefaulted,
                format!("subtopic '{name}' has non-numeric {field}; using 0.5"),
            ));
            0.5
        }
    }
}

/// `prerequisiteIds` must be a list; non-lists reset to empty. String and
/// integer elements are kept (integers stringified), anything else is
/// dropped silently.
fn validate_prereq_tokens(
    value: Option<&Value>,
    name: &str,
    warnings: &mut Vec<Warning>,
) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(token) => Some(token.clone()),
                Value::Number(n) if n.is_i64() || n.is_u64() => Some(n.to_string()),
                _ => None,
            })
            .collect(),
        _ => {
            warnings.push(Warning::emit(
                WarningKind::PrerequisitesReset,
                format!("subtopic '{name}' prerequisiteIds is not a list; resetting to empty"),
            ));
            Vec::new()
        }
    }
}

/// Second pass: map each raw token through the temp-id table. Dangling and
/// self references are dropped with a warning; duplicates collapse silently.
fn rewrite_prerequisites(
    pending: Vec<PendingEntry>,
    id_map: &HashMap<String, Uuid>,
    warnings: &mut Vec<Warning>,
) -> Vec<Subtopic> {
    pending
        .into_iter()
        .map(|entry| {
            let PendingEntry {
                mut subtopic,
                raw_prereqs,
            } = entry;

            for token in raw_prereqs {
                match id_map.get(&token) {
                    None => {
                        warnings.push(Warning::emit(
                            WarningKind::DanglingPrerequisite,
                            format!(
                                "subtopic '{}' references '{token}' which is not in this batch",
                                subtopic.name
                            ),
                        ));
                    }
                    Some(&prereq_id) if prereq_id == subtopic.id => {
                        warnings.push(Warning::emit(
                            WarningKind::SelfPrerequisite,
                            format!(
                                "removed self-referencing prerequisite on subtopic '{}'",
                                subtopic.name
                            ),
                        ));
                    }
                    Some(&prereq_id) => {
                        if !subtopic.prerequisite_ids.contains(&prereq_id) {
                            subtopic.prerequisite_ids.push(prereq_id);
                        }
                    }
                }
            }

            subtopic
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config() -> PlannerConfig {
        PlannerConfig::default()
    }

    fn entry(id: &str, name: &str, time: i64, prereqs: &[&str]) -> Value {
        json!({
            "id": id,
            "name": name,
            "time": time,
            "difficultyValue": 0.5,
            "conceptDensity": 0.5,
            "prerequisiteIds": prereqs,
        })
    }

    fn doc(subtopics: Vec<Value>) -> Value {
        json!({ "subtopics": subtopics, "analysis": {} })
    }

    #[test]
    fn rejects_non_object_document() {
        let err = validate_document(&json!([1, 2]), &config()).unwrap_err();
        assert_eq!(err, MalformedDocument::NotAnObject);
    }

    #[test]
    fn rejects_missing_or_mistyped_fields() {
        assert_eq!(
            validate_document(&json!({ "analysis": {} }), &config()).unwrap_err(),
            MalformedDocument::MissingSubtopics
        );
        assert_eq!(
            validate_document(&json!({ "subtopics": 3, "analysis": {} }), &config()).unwrap_err(),
            MalformedDocument::SubtopicsNotList
        );
        assert_eq!(
            validate_document(&json!({ "subtopics": [] }), &config()).unwrap_err(),
            MalformedDocument::MissingAnalysis
        );
        assert_eq!(
            validate_document(&json!({ "subtopics": [], "analysis": [] }), &config()).unwrap_err(),
            MalformedDocument::AnalysisNotObject
        );
    }

    #[test]
    fn empty_batch_after_drops_is_fatal() {
        // Single entry missing `name` — dropped, leaving nothing.
        let d = doc(vec![json!({
            "id": "temp_id_1",
            "time": 30,
            "difficultyValue": 0.5,
            "conceptDensity": 0.5,
            "prerequisiteIds": [],
        })]);
        assert_eq!(
            validate_document(&d, &config()).unwrap_err(),
            MalformedDocument::NoSurvivingSubtopics
        );
    }

    #[test]
    fn assigns_fresh_unique_ids() {
        let d = doc(vec![
            entry("temp_id_1", "A", 30, &[]),
            entry("temp_id_2", "B", 30, &[]),
        ]);
        let batch = validate_document(&d, &config()).expect("valid");
        assert_eq!(batch.subtopics.len(), 2);
        assert_ne!(batch.subtopics[0].id, batch.subtopics[1].id);
    }

    #[test]
    fn rewrites_prerequisites_to_final_ids() {
        let d = doc(vec![
            entry("temp_id_1", "A", 30, &[]),
            entry("temp_id_2", "B", 30, &["temp_id_1"]),
        ]);
        let batch = validate_document(&d, &config()).expect("valid");
        assert_eq!(
            batch.subtopics[1].prerequisite_ids,
            vec![batch.subtopics[0].id]
        );
    }

    #[test]
    fn time_below_floor_is_raised() {
        let d = doc(vec![entry("temp_id_1", "A", 5, &[])]);
        let batch = validate_document(&d, &config()).expect("valid");
        assert_eq!(batch.subtopics[0].time_minutes, 20);
        assert!(batch
            .warnings
            .iter()
            .any(|w| w.kind == WarningKind::TimeRaised));
    }

    #[test]
    fn non_integer_time_defaults_to_floor() {
        let mut e = entry("temp_id_1", "A", 30, &[]);
        e["time"] = json!("ninety");
        let batch = validate_document(&doc(vec![e]), &config()).expect("valid");
        assert_eq!(batch.subtopics[0].time_minutes, 20);
        assert!(batch
            .warnings
            .iter()
            .any(|w| w.kind == WarningKind::TimeDefaulted));
    }

    #[test]
    fn metrics_clamped_and_defaulted() {
        let mut e = entry("temp_id_1", "A", 30, &[]);
        e["difficultyValue"] = json!(3.5);
        e["conceptDensity"] = json!("dense");
        let batch = validate_document(&doc(vec![e]), &config()).expect("valid");
        assert!((batch.subtopics[0].difficulty - 1.0).abs() < f64::EPSILON);
        assert!((batch.subtopics[0].density - 0.5).abs() < f64::EPSILON);
        assert!(batch
            .warnings
            .iter()
            .any(|w| w.kind == WarningKind::MetricDefaulted));
    }

    #[test]
    fn non_list_prerequisites_reset() {
        let mut e = entry("temp_id_1", "A", 30, &[]);
        e["prerequisiteIds"] = json!("temp_id_2");
        let batch = validate_document(&doc(vec![e]), &config()).expect("valid");
        assert!(batch.subtopics[0].prerequisite_ids.is_empty());
        assert!(batch
            .warnings
            .iter()
            .any(|w| w.kind == WarningKind::PrerequisitesReset));
    }

    #[test]
    fn non_string_prereq_elements_dropped_silently() {
        let mut e = entry("temp_id_2", "B", 30, &[]);
        e["prerequisiteIds"] = json!(["temp_id_1", {"x": 1}, true]);
        let d = doc(vec![entry("temp_id_1", "A", 30, &[]), e]);
        let batch = validate_document(&d, &config()).expect("valid");
        assert_eq!(batch.subtopics[1].prerequisite_ids.len(), 1);
        // Object/bool elements are dropped without a warning.
        assert!(!batch
            .warnings
            .iter()
            .any(|w| w.kind == WarningKind::PrerequisitesReset));
    }

    #[test]
    fn duplicate_temp_id_first_occurrence_wins() {
        let d = doc(vec![
            entry("temp_id_1", "A", 30, &[]),
            entry("temp_id_1", "B", 30, &[]),
        ]);
        let batch = validate_document(&d, &config()).expect("valid");
        assert_eq!(batch.subtopics.len(), 1);
        assert_eq!(batch.subtopics[0].name, "A");
        assert!(batch
            .warnings
            .iter()
            .any(|w| w.kind == WarningKind::DuplicateTempId));
    }

    #[test]
    fn missing_temp_id_gets_fallback_but_entry_survives() {
        let mut e = entry("", "A", 30, &[]);
        e["id"] = json!(42);
        let batch = validate_document(&doc(vec![e]), &config()).expect("valid");
        assert_eq!(batch.subtopics.len(), 1);
        assert!(batch
            .warnings
            .iter()
            .any(|w| w.kind == WarningKind::TempIdSynthesized));
    }

    #[test]
    fn unconventional_temp_id_kept_so_references_resolve() {
        let d = doc(vec![
            entry("module-one", "A", 30, &[]),
            entry("temp_id_2", "B", 30, &["module-one"]),
        ]);
        let batch = validate_document(&d, &config()).expect("valid");
        assert_eq!(
            batch.subtopics[1].prerequisite_ids,
            vec![batch.subtopics[0].id]
        );
        assert!(batch
            .warnings
            .iter()
            .any(|w| w.kind == WarningKind::TempIdUnconventional));
    }

    #[test]
    fn self_reference_removed() {
        let d = doc(vec![entry("temp_id_1", "A", 30, &["temp_id_1"])]);
        let batch = validate_document(&d, &config()).expect("valid");
        assert!(batch.subtopics[0].prerequisite_ids.is_empty());
        assert!(batch
            .warnings
            .iter()
            .any(|w| w.kind == WarningKind::SelfPrerequisite));
    }

    #[test]
    fn dangling_reference_dropped_entry_retained() {
        let d = doc(vec![entry("temp_id_1", "A", 30, &["temp_id_99"])]);
        let batch = validate_document(&d, &config()).expect("valid");
        assert_eq!(batch.subtopics.len(), 1);
        assert!(batch.subtopics[0].prerequisite_ids.is_empty());
        assert!(batch
            .warnings
            .iter()
            .any(|w| w.kind == WarningKind::DanglingPrerequisite));
    }

    #[test]
    fn drops_in_one_entry_do_not_abort_the_batch() {
        let d = doc(vec![
            json!("not an object"),
            entry("temp_id_1", "A", 30, &[]),
        ]);
        let batch = validate_document(&d, &config()).expect("valid");
        assert_eq!(batch.subtopics.len(), 1);
        assert!(batch
            .warnings
            .iter()
            .any(|w| w.kind == WarningKind::EntryNotObject));
    }
}

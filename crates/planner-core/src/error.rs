//! Error and warning types for the structure pipeline.
//!
//! Two severities, mirroring the propagation policy:
//!
//! - [`MalformedDocument`] — the input shape itself is unusable. Fatal for
//!   the call; no partial result is returned.
//! - [`Warning`] — a per-entry defect (missing field, bad type, dangling or
//!   self-referencing prerequisite, duplicate temp id) that was repaired by
//!   dropping or rewriting the offending piece. Warnings are collected on the
//!   batch/bundle and also emitted via `tracing::warn!` as they occur.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Unrecoverable input-shape violation.
///
/// Raised only when the document itself is not usable or when validation
/// drops every entry. All other defects are recovered locally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedDocument {
    /// Provider text did not parse as JSON at all.
    #[error("document is not valid JSON: {0}")]
    InvalidJson(String),
    /// Document root is not a JSON object.
    #[error("document root is not a JSON object")]
    NotAnObject,
    /// The required `subtopics` field is absent.
    #[error("document is missing the required `subtopics` field")]
    MissingSubtopics,
    /// `subtopics` is present but not list-typed.
    #[error("`subtopics` must be a list")]
    SubtopicsNotList,
    /// The required `analysis` field is absent.
    #[error("document is missing the required `analysis` field")]
    MissingAnalysis,
    /// `analysis` is present but not object-typed.
    #[error("`analysis` must be an object")]
    AnalysisNotObject,
    /// Every entry was dropped during validation.
    #[error("no subtopics survived validation")]
    NoSurvivingSubtopics,
}

/// Category of a recovered per-entry defect.
///
/// Serializes to the same snake_case identifier [`WarningKind::as_str`]
/// returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// A `subtopics` element was not a JSON object; entry dropped.
    EntryNotObject,
    /// One or more required fields were absent; entry dropped.
    MissingFields,
    /// `name` was missing, not a string, or empty after trimming; entry dropped.
    InvalidName,
    /// `time` was absent, non-integer, or non-positive; set to the floor.
    TimeDefaulted,
    /// `time` was below the floor; raised to the floor.
    TimeRaised,
    /// `difficultyValue` or `conceptDensity` was non-numeric; replaced with 0.5.
    MetricDefaulted,
    /// `prerequisiteIds` was not a list; reset to empty.
    PrerequisitesReset,
    /// Temp id was missing or not a string; a fallback token was synthesized.
    TempIdSynthesized,
    /// Temp id lacks the `temp_id_` prefix convention; kept as-is.
    TempIdUnconventional,
    /// A later entry reused an earlier temp id; the duplicate was dropped.
    DuplicateTempId,
    /// A prerequisite referenced a temp id not in this batch; reference dropped.
    DanglingPrerequisite,
    /// An entry listed itself as a prerequisite; reference dropped.
    SelfPrerequisite,
    /// A cycle-repair pass removed a prerequisite edge.
    CycleEdgeRemoved,
    /// An edge referenced a node absent from the projected node set; dropped.
    EdgeSourceMissing,
}

impl WarningKind {
    /// Stable identifier for machine-readable output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EntryNotObject => "entry_not_object",
            Self::MissingFields => "missing_fields",
            Self::InvalidName => "invalid_name",
            Self::TimeDefaulted => "time_defaulted",
            Self::TimeRaised => "time_raised",
            Self::MetricDefaulted => "metric_defaulted",
            Self::PrerequisitesReset => "prerequisites_reset",
            Self::TempIdSynthesized => "temp_id_synthesized",
            Self::TempIdUnconventional => "temp_id_unconventional",
            Self::DuplicateTempId => "duplicate_temp_id",
            Self::DanglingPrerequisite => "dangling_prerequisite",
            Self::SelfPrerequisite => "self_prerequisite",
            Self::CycleEdgeRemoved => "cycle_edge_removed",
            Self::EdgeSourceMissing => "edge_source_missing",
        }
    }
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recovered defect, with enough context to trace it to the input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    /// The category of defect.
    pub kind: WarningKind,
    /// Human-readable description of what was repaired or dropped.
    pub message: String,
}

impl Warning {
    /// Build a warning and emit it through `tracing` at the same time.
    pub(crate) fn emit(kind: WarningKind, message: impl Into<String>) -> Self {
        let message = message.into();
        tracing::warn!(kind = kind.as_str(), "{message}");
        Self { kind, message }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

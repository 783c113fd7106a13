//! The plan request model.
//!
//! Callers describe the course they want before contacting the generative
//! provider. Validation here is the outer gate: it never touches the
//! structure pipeline, which only sees the raw document the provider returns.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Longest topic string accepted.
pub const MAX_TOPIC_LENGTH: usize = 200;
/// Shortest plan duration accepted, in hours.
pub const MIN_DURATION_HOURS: f64 = 0.5;
/// Longest plan duration accepted, in hours.
pub const MAX_DURATION_HOURS: f64 = 200.0;

/// Target difficulty for a generated plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Beginner => "Beginner",
            Self::Intermediate => "Intermediate",
            Self::Advanced => "Advanced",
        }
    }

    /// Number of assessment questions to request for this difficulty.
    #[must_use]
    pub const fn assessment_questions(self) -> u8 {
        match self {
            Self::Beginner => 4,
            Self::Intermediate => 6,
            Self::Advanced => 8,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "beginner" => Ok(Self::Beginner),
            "intermediate" => Ok(Self::Intermediate),
            "advanced" => Ok(Self::Advanced),
            _ => Err(RequestError::InvalidDifficulty {
                value: s.to_string(),
            }),
        }
    }
}

/// Why a [`PlanRequest`] was rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RequestError {
    #[error("topic cannot be empty")]
    EmptyTopic,
    #[error("topic too long ({len} chars, max {MAX_TOPIC_LENGTH})")]
    TopicTooLong { len: usize },
    #[error(
        "duration must be between {MIN_DURATION_HOURS} and {MAX_DURATION_HOURS} hours, got {hours}"
    )]
    DurationOutOfRange { hours: f64 },
    #[error("invalid difficulty {value:?}; choose Beginner, Intermediate, or Advanced")]
    InvalidDifficulty { value: String },
}

/// A validated-on-demand description of the plan a caller wants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRequest {
    /// Course topic, e.g. "Rust for embedded systems".
    pub topic: String,
    /// Requested total duration in hours.
    pub duration_hours: f64,
    /// Target difficulty band.
    pub difficulty: Difficulty,
    /// Free-text assumed prerequisites, if any.
    #[serde(default)]
    pub prerequisites: Option<String>,
    /// Target education level, e.g. "Undergraduate".
    #[serde(default)]
    pub category: Option<String>,
    /// Target grade or stream within the category.
    #[serde(default)]
    pub sub_category: Option<String>,
    /// Target subject within the category.
    #[serde(default)]
    pub category_topic: Option<String>,
}

impl PlanRequest {
    /// Check field constraints: non-empty topic within length bounds and a
    /// duration within `[MIN_DURATION_HOURS, MAX_DURATION_HOURS]`.
    ///
    /// # Errors
    ///
    /// Returns the first [`RequestError`] encountered.
    pub fn validate(&self) -> Result<(), RequestError> {
        let topic = self.topic.trim();
        if topic.is_empty() {
            return Err(RequestError::EmptyTopic);
        }
        if topic.len() > MAX_TOPIC_LENGTH {
            return Err(RequestError::TopicTooLong { len: topic.len() });
        }
        if !self.duration_hours.is_finite()
            || self.duration_hours < MIN_DURATION_HOURS
            || self.duration_hours > MAX_DURATION_HOURS
        {
            return Err(RequestError::DurationOutOfRange {
                hours: self.duration_hours,
            });
        }
        Ok(())
    }

    /// Requested duration in minutes.
    #[must_use]
    pub fn target_minutes(&self) -> f64 {
        self.duration_hours * 60.0
    }

    /// Expected subtopic count band for this duration: short courses get
    /// 5–10 modules, medium 8–18, long 15–30.
    #[must_use]
    pub fn subtopic_range(&self) -> (u8, u8) {
        if self.duration_hours < 8.0 {
            (5, 10)
        } else if self.duration_hours < 30.0 {
            (8, 18)
        } else {
            (15, 30)
        }
    }
}

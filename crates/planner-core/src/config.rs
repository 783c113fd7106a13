//! Pipeline tuning knobs.
//!
//! Defaults match the production profile: a 20-minute floor per subtopic and
//! a rebalance dead-band of 15 minutes or 10 % of the target, whichever is
//! larger. All fields have serde defaults so a partial TOML/JSON config
//! deserializes cleanly.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Minimum minutes any subtopic may carry. Entries below this are raised,
    /// absent/invalid times are set to it, and rebalancing never goes under it.
    #[serde(default = "default_min_subtopic_minutes")]
    pub min_subtopic_minutes: u32,

    /// Absolute rebalance tolerance in minutes.
    #[serde(default = "default_fixed_tolerance_minutes")]
    pub fixed_tolerance_minutes: u32,

    /// Relative rebalance tolerance as a fraction of the target total.
    #[serde(default = "default_relative_tolerance")]
    pub relative_tolerance: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            min_subtopic_minutes: default_min_subtopic_minutes(),
            fixed_tolerance_minutes: default_fixed_tolerance_minutes(),
            relative_tolerance: default_relative_tolerance(),
        }
    }
}

impl PlannerConfig {
    /// The dead-band around `target_minutes` inside which rebalancing is
    /// skipped: `max(fixed_tolerance_minutes, target * relative_tolerance)`.
    #[must_use]
    pub fn tolerance_for(&self, target_minutes: f64) -> f64 {
        f64::from(self.fixed_tolerance_minutes).max(target_minutes * self.relative_tolerance)
    }
}

const fn default_min_subtopic_minutes() -> u32 {
    20
}

const fn default_fixed_tolerance_minutes() -> u32 {
    15
}

const fn default_relative_tolerance() -> f64 {
    0.10
}

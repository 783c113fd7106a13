//! Proportional duration rebalancing.
//!
//! Scales subtopic time estimates so their sum approximates the requested
//! plan duration. The rescale is a fold over the batch in validated order,
//! carrying the fractional rounding remainder forward (largest-remainder
//! accumulation) so integer rounding does not drift the total. Deterministic
//! and order-dependent by design.
//!
//! The rebalancer never changes the number of subtopics and never touches
//! names, metrics, or prerequisites — only `time_minutes`.

use tracing::instrument;

use crate::config::PlannerConfig;
use crate::validate::Subtopic;

/// What the rebalancer did for one batch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RebalanceOutcome {
    /// Whether any times were rescaled.
    pub applied: bool,
    /// Sum of minutes before rebalancing.
    pub before_total: u64,
    /// Sum of minutes after rebalancing (equals `before_total` when skipped).
    pub after_total: u64,
}

/// Rescale `time_minutes` toward `target_minutes`.
///
/// Skipped when the current total is zero (degenerate input, reported only)
/// or already within [`PlannerConfig::tolerance_for`] of the target. Every
/// rescaled value is clamped to at least the configured floor, so the final
/// sum can exceed the target when the floor binds.
#[instrument(skip(subtopics, config), fields(subtopics = subtopics.len()))]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn rebalance(
    subtopics: &mut [Subtopic],
    target_minutes: f64,
    config: &PlannerConfig,
) -> RebalanceOutcome {
    let before_total: u64 = subtopics
        .iter()
        .map(|subtopic| u64::from(subtopic.time_minutes))
        .sum();

    if before_total == 0 {
        tracing::warn!("total time is zero; skipping rebalance");
        return RebalanceOutcome {
            applied: false,
            before_total,
            after_total: before_total,
        };
    }

    #[allow(clippy::cast_precision_loss)]
    let current = before_total as f64;
    if (current - target_minutes).abs() <= config.tolerance_for(target_minutes) {
        tracing::info!(
            current = before_total,
            target = target_minutes,
            "total time within tolerance; no adjustment needed"
        );
        return RebalanceOutcome {
            applied: false,
            before_total,
            after_total: before_total,
        };
    }

    let ratio = target_minutes / current;
    tracing::info!(
        current = before_total,
        target = target_minutes,
        ratio,
        "rescaling subtopic times"
    );

    let floor = f64::from(config.min_subtopic_minutes);
    let _final_remainder = subtopics.iter_mut().fold(0.0_f64, |remainder, subtopic| {
        let scaled = f64::from(subtopic.time_minutes).mul_add(ratio, remainder);
        let adjusted = scaled.round().max(floor);
        subtopic.time_minutes = adjusted as u32;
        scaled - adjusted
    });

    let after_total: u64 = subtopics
        .iter()
        .map(|subtopic| u64::from(subtopic.time_minutes))
        .sum();

    RebalanceOutcome {
        applied: true,
        before_total,
        after_total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn subtopic(minutes: u32) -> Subtopic {
        Subtopic {
            id: Uuid::new_v4(),
            name: "module".to_string(),
            time_minutes: minutes,
            difficulty: 0.5,
            density: 0.5,
            prerequisite_ids: Vec::new(),
        }
    }

    fn total(subtopics: &[Subtopic]) -> u64 {
        subtopics
            .iter()
            .map(|subtopic| u64::from(subtopic.time_minutes))
            .sum()
    }

    #[test]
    fn within_tolerance_is_skipped() {
        let config = PlannerConfig::default();
        // 110 vs target 120: within max(15, 12).
        let mut batch = vec![subtopic(55), subtopic(55)];
        let outcome = rebalance(&mut batch, 120.0, &config);

        assert!(!outcome.applied);
        assert_eq!(total(&batch), 110);
    }

    #[test]
    fn scales_up_toward_target() {
        let config = PlannerConfig {
            min_subtopic_minutes: 15,
            ..PlannerConfig::default()
        };
        // Two 15-minute entries, target one hour → 30 each.
        let mut batch = vec![subtopic(15), subtopic(15)];
        let outcome = rebalance(&mut batch, 60.0, &config);

        assert!(outcome.applied);
        assert_eq!(batch[0].time_minutes, 30);
        assert_eq!(batch[1].time_minutes, 30);
        assert_eq!(outcome.after_total, 60);
    }

    #[test]
    fn scales_down_but_never_below_floor() {
        let config = PlannerConfig::default();
        let mut batch = vec![subtopic(200), subtopic(25)];
        rebalance(&mut batch, 60.0, &config);

        for entry in &batch {
            assert!(entry.time_minutes >= config.min_subtopic_minutes);
        }
    }

    #[test]
    fn remainder_carry_keeps_sum_near_target() {
        let config = PlannerConfig {
            min_subtopic_minutes: 1,
            ..PlannerConfig::default()
        };
        // 7 × 10 = 70 minutes, target 100: ratio is non-terminating.
        let mut batch: Vec<Subtopic> = (0..7).map(|_| subtopic(10)).collect();
        let outcome = rebalance(&mut batch, 100.0, &config);

        assert!(outcome.applied);
        let diff = outcome.after_total.abs_diff(100);
        assert!(diff <= batch.len() as u64, "sum {} too far off", outcome.after_total);
    }

    #[test]
    fn zero_total_is_reported_not_failed() {
        let config = PlannerConfig::default();
        let mut batch: Vec<Subtopic> = Vec::new();
        let outcome = rebalance(&mut batch, 60.0, &config);

        assert!(!outcome.applied);
        assert_eq!(outcome.before_total, 0);
    }

    #[test]
    fn only_times_change() {
        let config = PlannerConfig::default();
        let prereq = Uuid::new_v4();
        let mut batch = vec![Subtopic {
            id: Uuid::new_v4(),
            name: "Intro: Basics".to_string(),
            time_minutes: 20,
            difficulty: 0.3,
            density: 0.7,
            prerequisite_ids: vec![prereq],
        }];
        let before = batch[0].clone();

        rebalance(&mut batch, 240.0, &config);

        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].id, before.id);
        assert_eq!(batch[0].name, before.name);
        assert!((batch[0].difficulty - before.difficulty).abs() < f64::EPSILON);
        assert!((batch[0].density - before.density).abs() < f64::EPSILON);
        assert_eq!(batch[0].prerequisite_ids, before.prerequisite_ids);
        assert_ne!(batch[0].time_minutes, before.time_minutes);
    }

    #[test]
    fn rescale_is_deterministic() {
        let config = PlannerConfig::default();
        let make = || vec![subtopic(33), subtopic(47), subtopic(21)];

        let mut first = make();
        let mut second = make();
        rebalance(&mut first, 300.0, &config);
        rebalance(&mut second, 300.0, &config);

        let times = |batch: &[Subtopic]| {
            batch
                .iter()
                .map(|subtopic| subtopic.time_minutes)
                .collect::<Vec<_>>()
        };
        assert_eq!(times(&first), times(&second));
    }
}

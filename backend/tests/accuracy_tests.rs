//! Tests for the accuracy metrics pipeline
//! Verifies the error statistics, trend detection, alert rules, and
//! per-tier accuracy grouping

use chrono::NaiveDate;
use proptest::prelude::*;
use uuid::Uuid;

use shared::metrics::{calculate_metrics, check_alerts, determine_trend, tier_accuracy};
use shared::models::{AccuracyMetrics, PredictionActualPair, QualityTier, TrendDirection};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn pair(predicted: f64, actual: f64, confidence: f64) -> PredictionActualPair {
    PredictionActualPair {
        prediction_id: Uuid::new_v4(),
        predicted_value: predicted,
        actual_value: actual,
        confidence,
        predicted_at: date(2025, 6, 1),
        measured_at: date(2025, 6, 10),
        tier: None,
    }
}

fn tiered(predicted: f64, actual: f64, tier: QualityTier) -> PredictionActualPair {
    PredictionActualPair {
        tier: Some(tier),
        ..pair(predicted, actual, 0.8)
    }
}

// =============================================================================
// Error statistics
// =============================================================================

mod statistics {
    use super::*;

    #[test]
    fn worked_example() {
        // Predictions 10, 11, 12 against a true value of 10 each time
        let pairs = vec![
            pair(10.0, 10.0, 0.9),
            pair(11.0, 10.0, 0.7),
            pair(12.0, 10.0, 0.5),
        ];
        let m = calculate_metrics(&pairs);

        assert_eq!(m.sample_count, 3);
        assert_eq!(m.mae, 1.0);
        assert_eq!(m.mean_error, 1.0); // consistent over-prediction
        assert_eq!(m.median_error, 1.0);
        assert_eq!(m.mape, 10.0);
        assert!((m.mse - 1.667).abs() < 0.001);
        assert!((m.rmse - 1.291).abs() < 0.001);
        assert_eq!(m.pct_within_0_5, 33.3);
        assert_eq!(m.pct_within_1_0, 66.7);
        assert_eq!(m.pct_within_1_5, 66.7);
        assert_eq!(m.pct_within_2_0, 100.0);
    }

    #[test]
    fn confidence_correlation_rewards_calibrated_confidence() {
        // High confidence on accurate predictions, low on misses
        let pairs = vec![
            pair(10.0, 10.0, 0.9),
            pair(10.1, 10.0, 0.85),
            pair(13.0, 10.0, 0.3),
            pair(14.0, 10.0, 0.2),
        ];
        let m = calculate_metrics(&pairs);
        assert!(m.confidence_correlation > 0.9);
    }

    #[test]
    fn anti_calibrated_confidence_correlates_negatively() {
        let pairs = vec![
            pair(10.0, 10.0, 0.2),
            pair(14.0, 10.0, 0.9),
            pair(13.5, 10.0, 0.8),
            pair(10.2, 10.0, 0.3),
        ];
        let m = calculate_metrics(&pairs);
        assert!(m.confidence_correlation < 0.0);
    }

    #[test]
    fn zero_actuals_are_excluded_from_mape() {
        let pairs = vec![pair(1.0, 0.0, 0.5), pair(11.0, 10.0, 0.5)];
        let m = calculate_metrics(&pairs);
        assert_eq!(m.mape, 10.0);
    }

    #[test]
    fn empty_input_yields_zeroed_metrics() {
        let m = calculate_metrics(&[]);
        assert_eq!(m, AccuracyMetrics::default());
        assert_eq!(m.sample_count, 0);
        assert_eq!(m.mae, 0.0);
    }

    #[test]
    fn single_pair_has_zero_stddev_and_correlation() {
        let m = calculate_metrics(&[pair(11.5, 10.0, 0.6)]);
        assert_eq!(m.error_stddev, 0.0);
        assert_eq!(m.confidence_correlation, 0.0);
        assert_eq!(m.mae, 1.5);
    }

    // Metrics are rounded as they are computed, so a stored JSON blob
    // must decode back to exactly the numbers it was built from
    #[test]
    fn metrics_survive_json_storage_exactly() {
        let pairs = vec![
            pair(10.0, 10.3, 0.9),
            pair(11.7, 10.0, 0.7),
            pair(12.2, 13.1, 0.5),
        ];
        let m = calculate_metrics(&pairs);

        let encoded = serde_json::to_value(&m).unwrap();
        let decoded: AccuracyMetrics = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded, m);
    }
}

// =============================================================================
// Trend detection
// =============================================================================

mod trend {
    use super::*;

    #[test]
    fn doubling_mae_is_degrading() {
        let (direction, change) = determine_trend(2.0, Some(1.0));
        assert_eq!(direction, TrendDirection::Degrading);
        assert_eq!(change, 100.0);
    }

    #[test]
    fn modestly_worse_is_still_stable() {
        let (direction, _) = determine_trend(1.08, Some(1.0));
        assert_eq!(direction, TrendDirection::Stable);
    }

    #[test]
    fn clearly_better_is_improving() {
        let (direction, change) = determine_trend(0.8, Some(1.0));
        assert_eq!(direction, TrendDirection::Improving);
        assert_eq!(change, -20.0);
    }

    #[test]
    fn slightly_better_is_still_stable() {
        let (direction, _) = determine_trend(0.97, Some(1.0));
        assert_eq!(direction, TrendDirection::Stable);
    }

    #[test]
    fn no_prior_report_reads_as_stable() {
        let (direction, change) = determine_trend(3.0, None);
        assert_eq!(direction, TrendDirection::Stable);
        assert_eq!(change, 0.0);

        let (direction, _) = determine_trend(3.0, Some(0.0));
        assert_eq!(direction, TrendDirection::Stable);
    }
}

// =============================================================================
// Alert rules
// =============================================================================

mod alerts {
    use super::*;

    fn metrics_with(mae: f64, pct_within_1_0: f64, samples: usize) -> AccuracyMetrics {
        AccuracyMetrics {
            sample_count: samples,
            mae,
            pct_within_1_0,
            ..AccuracyMetrics::default()
        }
    }

    #[test]
    fn healthy_metrics_raise_nothing() {
        let check = check_alerts(&metrics_with(0.8, 85.0, 20), Some(0.8));
        assert!(!check.alert_triggered);
        assert!(!check.needs_retraining);
        assert!(check.reasons.is_empty());
    }

    #[test]
    fn mae_above_alert_threshold_alerts_without_retraining() {
        let check = check_alerts(&metrics_with(1.6, 85.0, 20), None);
        assert!(check.alert_triggered);
        assert!(!check.needs_retraining);
    }

    #[test]
    fn retraining_requires_mae_above_two() {
        let at_two = check_alerts(&metrics_with(2.0, 85.0, 20), None);
        assert!(!at_two.needs_retraining);

        let above_two = check_alerts(&metrics_with(2.1, 85.0, 20), None);
        assert!(above_two.needs_retraining);
        assert!(above_two.alert_triggered);
    }

    #[test]
    fn mae_past_both_thresholds_reports_both_reasons() {
        let check = check_alerts(&metrics_with(2.1, 85.0, 20), None);
        assert_eq!(check.reasons.len(), 2);
        assert!(check.reasons.iter().any(|r| r.contains("retraining")));
        assert!(check.reasons.iter().any(|r| r.contains("alert")));
    }

    #[test]
    fn sharp_mae_increase_alerts_even_below_absolute_threshold() {
        // 0.7 -> 1.0 is a 42.9% increase
        let check = check_alerts(&metrics_with(1.0, 85.0, 20), Some(0.7));
        assert!(check.alert_triggered);
        assert!(!check.needs_retraining);
        assert!(check.reasons.iter().any(|r| r.contains("increased")));
    }

    #[test]
    fn low_hit_rate_alerts() {
        let check = check_alerts(&metrics_with(1.0, 55.0, 20), None);
        assert!(check.alert_triggered);
    }

    #[test]
    fn zero_sample_metrics_never_alert_on_hit_rate() {
        let check = check_alerts(&AccuracyMetrics::default(), None);
        assert!(!check.alert_triggered);
    }
}

// =============================================================================
// Per-tier accuracy
// =============================================================================

mod tiers {
    use super::*;

    #[test]
    fn small_tiers_are_suppressed() {
        let mut pairs: Vec<_> = (0..5)
            .map(|_| tiered(12.5, 12.0, QualityTier::Premium))
            .collect();
        pairs.extend((0..3).map(|_| tiered(15.0, 14.0, QualityTier::Artisan)));

        let rows = tier_accuracy(&pairs);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].tier, QualityTier::Premium);
        assert_eq!(rows[0].sample_count, 5);
        assert_eq!(rows[0].mae, 0.5);
        assert_eq!(rows[0].pct_within_1_0, 100.0);
    }

    #[test]
    fn untiered_pairs_are_ignored() {
        let pairs: Vec<_> = (0..10).map(|_| pair(12.0, 12.0, 0.8)).collect();
        assert!(tier_accuracy(&pairs).is_empty());
    }

    #[test]
    fn tiers_sort_best_first() {
        let mut pairs: Vec<_> = (0..5)
            .map(|_| tiered(9.0, 9.5, QualityTier::Commodity))
            .collect();
        pairs.extend((0..5).map(|_| tiered(15.0, 14.8, QualityTier::Artisan)));

        let rows = tier_accuracy(&pairs);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].tier, QualityTier::Artisan);
        assert_eq!(rows[1].tier, QualityTier::Commodity);
    }
}

// =============================================================================
// Invariants
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn metrics_are_finite_and_consistent(
        values in proptest::collection::vec((6.0..20.0f64, 6.0..20.0f64, 0.0..1.0f64), 1..40)
    ) {
        let pairs: Vec<_> = values
            .iter()
            .map(|(p, a, c)| pair(*p, *a, *c))
            .collect();
        let m = calculate_metrics(&pairs);

        // Tolerances cover the stored rounding precision
        prop_assert!(m.mae >= 0.0);
        prop_assert!(m.rmse + 0.002 >= m.mae); // RMSE dominates MAE
        prop_assert!(m.mean_error.abs() <= m.mae + 0.002);
        prop_assert!((0.0..=100.0).contains(&m.pct_within_1_0));
        prop_assert!(m.pct_within_0_5 <= m.pct_within_1_0 + 0.1);
        prop_assert!(m.pct_within_1_0 <= m.pct_within_1_5 + 0.1);
        prop_assert!(m.pct_within_1_5 <= m.pct_within_2_0 + 0.1);
        prop_assert!((-1.01..=1.01).contains(&m.confidence_correlation));
    }
}

//! Prediction accuracy statistics
//!
//! Pure math over matched prediction/actual pairs. The backend's
//! accuracy service loads the pairs and persists the report; everything
//! that could be wrong about the numbers is computable and testable
//! right here.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::calibration;
use crate::models::{
    AccuracyMetrics, PredictionActualPair, QualityTier, TierAccuracy, TrendDirection,
};
use crate::types::{round1, round2, round3};

/// Error magnitude at which realized accuracy bottoms out, for the
/// confidence correlation
const ACCURACY_ERROR_CEILING: f64 = 5.0;

/// Compute the full metric set over matched pairs.
///
/// An empty slice yields zeroed metrics rather than NaN; callers decide
/// whether a zero-sample report is worth persisting.
pub fn calculate_metrics(pairs: &[PredictionActualPair]) -> AccuracyMetrics {
    if pairs.is_empty() {
        return AccuracyMetrics::default();
    }
    let n = pairs.len() as f64;

    let errors: Vec<f64> = pairs.iter().map(|p| p.error()).collect();
    let abs_errors: Vec<f64> = errors.iter().map(|e| e.abs()).collect();

    let mae = abs_errors.iter().sum::<f64>() / n;
    let mse = errors.iter().map(|e| e * e).sum::<f64>() / n;
    let rmse = mse.sqrt();
    let mean_error = errors.iter().sum::<f64>() / n;

    // Pairs with a zero actual are excluded instead of dividing by zero
    let (mape_sum, mape_n) = pairs
        .iter()
        .filter(|p| p.actual_value != 0.0)
        .fold((0.0, 0usize), |(sum, count), p| {
            (sum + (p.error() / p.actual_value).abs() * 100.0, count + 1)
        });
    let mape = if mape_n > 0 { mape_sum / mape_n as f64 } else { 0.0 };

    let mut sorted = errors.clone();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let median_error = if sorted.len() % 2 == 1 {
        sorted[sorted.len() / 2]
    } else {
        (sorted[sorted.len() / 2 - 1] + sorted[sorted.len() / 2]) / 2.0
    };

    let variance = errors.iter().map(|e| (e - mean_error).powi(2)).sum::<f64>() / n;
    let error_stddev = variance.sqrt();

    let pct_within = |threshold: f64| -> f64 {
        let hits = abs_errors.iter().filter(|e| **e <= threshold).count();
        hits as f64 / n * 100.0
    };

    // Realized accuracy per pair: 1 at a perfect hit, falling linearly
    // to 0 once the error reaches the ceiling
    let realized: Vec<f64> = abs_errors
        .iter()
        .map(|e| 1.0 - (e / ACCURACY_ERROR_CEILING).min(1.0))
        .collect();
    let confidences: Vec<f64> = pairs.iter().map(|p| p.confidence).collect();
    let confidence_correlation = pearson(&confidences, &realized);

    AccuracyMetrics {
        sample_count: pairs.len(),
        mae: round3(mae),
        mse: round3(mse),
        rmse: round3(rmse),
        mape: round3(mape),
        mean_error: round3(mean_error),
        median_error: round3(median_error),
        error_stddev: round3(error_stddev),
        pct_within_0_5: round1(pct_within(0.5)),
        pct_within_1_0: round1(pct_within(1.0)),
        pct_within_1_5: round1(pct_within(1.5)),
        pct_within_2_0: round1(pct_within(2.0)),
        confidence_correlation: round2(confidence_correlation),
    }
}

/// Pearson correlation coefficient; 0 when either series has no
/// variance or fewer than two points
fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    if xs.len() < 2 || xs.len() != ys.len() {
        return 0.0;
    }
    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;
    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        return 0.0;
    }
    cov / (var_x.sqrt() * var_y.sqrt())
}

/// MAE movement versus the prior report of the same scope.
///
/// Returns the direction and the signed percent change. No prior (or a
/// zero prior) reads as stable with zero change.
pub fn determine_trend(current_mae: f64, prior_mae: Option<f64>) -> (TrendDirection, f64) {
    let Some(prior) = prior_mae.filter(|m| *m > 0.0) else {
        return (TrendDirection::Stable, 0.0);
    };
    let change_pct = (current_mae - prior) / prior * 100.0;
    let direction = if change_pct > calibration::TREND_DEGRADING_PCT {
        TrendDirection::Degrading
    } else if change_pct < calibration::TREND_IMPROVING_PCT {
        TrendDirection::Improving
    } else {
        TrendDirection::Stable
    };
    (direction, round1(change_pct))
}

/// Outcome of the alert evaluation over a metric set
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlertCheck {
    pub alert_triggered: bool,
    /// Only the hard MAE ceiling sets this; lesser alerts warrant
    /// attention, not a retrain
    pub needs_retraining: bool,
    pub reasons: Vec<String>,
}

/// Evaluate the alert rules against a metric set and the prior MAE
pub fn check_alerts(metrics: &AccuracyMetrics, prior_mae: Option<f64>) -> AlertCheck {
    let mut reasons = Vec::new();
    let mut needs_retraining = false;

    if metrics.mae > calibration::RETRAINING_MAE_THRESHOLD {
        needs_retraining = true;
        reasons.push(format!(
            "MAE {:.3} exceeds retraining threshold {:.1}",
            metrics.mae,
            calibration::RETRAINING_MAE_THRESHOLD
        ));
    }
    if metrics.mae > calibration::ALERT_MAE_THRESHOLD {
        reasons.push(format!(
            "MAE {:.3} exceeds alert threshold {:.1}",
            metrics.mae,
            calibration::ALERT_MAE_THRESHOLD
        ));
    }

    if let Some(prior) = prior_mae.filter(|m| *m > 0.0) {
        let change_pct = (metrics.mae - prior) / prior * 100.0;
        if change_pct > calibration::ALERT_MAE_INCREASE_PCT {
            reasons.push(format!(
                "MAE increased {:.1}% versus the prior period",
                change_pct
            ));
        }
    }

    if metrics.sample_count > 0 && metrics.pct_within_1_0 < calibration::ALERT_MIN_PCT_WITHIN_1_0 {
        reasons.push(format!(
            "only {:.1}% of predictions landed within ±1.0",
            metrics.pct_within_1_0
        ));
    }

    AlertCheck {
        alert_triggered: !reasons.is_empty(),
        needs_retraining,
        reasons,
    }
}

/// Per-tier accuracy for tiers with enough samples to be meaningful
pub fn tier_accuracy(pairs: &[PredictionActualPair]) -> Vec<TierAccuracy> {
    let mut by_tier: HashMap<QualityTier, Vec<&PredictionActualPair>> = HashMap::new();
    for pair in pairs {
        if let Some(tier) = pair.tier {
            by_tier.entry(tier).or_default().push(pair);
        }
    }

    let mut rows: Vec<TierAccuracy> = by_tier
        .into_iter()
        .filter(|(_, group)| group.len() >= calibration::TIER_MIN_SAMPLES)
        .map(|(tier, group)| {
            let n = group.len() as f64;
            let mae = group.iter().map(|p| p.error().abs()).sum::<f64>() / n;
            let within = group.iter().filter(|p| p.error().abs() <= 1.0).count();
            TierAccuracy {
                tier,
                sample_count: group.len(),
                mae: round3(mae),
                pct_within_1_0: round1(within as f64 / n * 100.0),
            }
        })
        .collect();
    rows.sort_by_key(|row| std::cmp::Reverse(row.tier.rank()));
    rows
}

//! Accuracy evaluation types
//!
//! Stored predictions joined to real-world measurements, the error
//! statistics computed over them, and the report record that persists
//! a scoring run. Reports are append-only: a later run supersedes an
//! earlier one, it never mutates it.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::QualityTier;

/// Which model layer produced a prediction
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PredictionLayer {
    /// Research-based baseline with no feedback applied
    ResearchBaseline,
    /// Adjusted with aggregated regional feedback
    RegionalCalibrated,
    /// Adjusted with farm-specific feedback history
    FarmCalibrated,
}

impl PredictionLayer {
    pub fn as_str(&self) -> &'static str {
        match self {
            PredictionLayer::ResearchBaseline => "research_baseline",
            PredictionLayer::RegionalCalibrated => "regional_calibrated",
            PredictionLayer::FarmCalibrated => "farm_calibrated",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "regional_calibrated" => PredictionLayer::RegionalCalibrated,
            "farm_calibrated" => PredictionLayer::FarmCalibrated,
            _ => PredictionLayer::ResearchBaseline,
        }
    }
}

/// Provenance of the actual measurement
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    LabVerified,
    SelfReported,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::LabVerified => "lab_verified",
            SourceType::SelfReported => "self_reported",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "lab_verified" => SourceType::LabVerified,
            _ => SourceType::SelfReported,
        }
    }
}

/// A stored prediction joined to one real-world measurement of the
/// same item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionActualPair {
    pub prediction_id: Uuid,
    pub predicted_value: f64,
    pub actual_value: f64,
    /// Confidence the model stated when it made the prediction
    pub confidence: f64,
    pub predicted_at: NaiveDate,
    pub measured_at: NaiveDate,
    pub tier: Option<QualityTier>,
}

impl PredictionActualPair {
    /// Signed error; positive means over-prediction
    pub fn error(&self) -> f64 {
        self.predicted_value - self.actual_value
    }
}

/// Error statistics over a set of matched pairs
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AccuracyMetrics {
    pub sample_count: usize,
    pub mae: f64,
    pub mse: f64,
    pub rmse: f64,
    /// Mean absolute percentage error; pairs with actual = 0 are
    /// excluded rather than dividing by zero
    pub mape: f64,
    /// Mean signed error; positive means the model over-predicts
    pub mean_error: f64,
    pub median_error: f64,
    pub error_stddev: f64,
    pub pct_within_0_5: f64,
    pub pct_within_1_0: f64,
    pub pct_within_1_5: f64,
    pub pct_within_2_0: f64,
    /// Pearson correlation between stated confidence and realized
    /// accuracy
    pub confidence_correlation: f64,
}

/// Accuracy for one quality tier. Only emitted for tiers with enough
/// samples to be statistically meaningful.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TierAccuracy {
    pub tier: QualityTier,
    pub sample_count: usize,
    pub mae: f64,
    pub pct_within_1_0: f64,
}

/// MAE direction versus the previous report of the same scope
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Improving,
    Stable,
    Degrading,
}

impl TrendDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendDirection::Improving => "improving",
            TrendDirection::Stable => "stable",
            TrendDirection::Degrading => "degrading",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "improving" => TrendDirection::Improving,
            "degrading" => TrendDirection::Degrading,
            _ => TrendDirection::Stable,
        }
    }
}

/// Reporting cadence
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReportPeriod {
    Daily,
    Weekly,
    Monthly,
    Seasonal,
    AllTime,
}

impl ReportPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportPeriod::Daily => "daily",
            ReportPeriod::Weekly => "weekly",
            ReportPeriod::Monthly => "monthly",
            ReportPeriod::Seasonal => "seasonal",
            ReportPeriod::AllTime => "all_time",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "daily" => ReportPeriod::Daily,
            "weekly" => ReportPeriod::Weekly,
            "monthly" => ReportPeriod::Monthly,
            "seasonal" => ReportPeriod::Seasonal,
            _ => ReportPeriod::AllTime,
        }
    }

    /// Length of the lookback window in days; `None` for all-time
    pub fn lookback_days(&self) -> Option<i64> {
        match self {
            ReportPeriod::Daily => Some(1),
            ReportPeriod::Weekly => Some(7),
            ReportPeriod::Monthly => Some(30),
            ReportPeriod::Seasonal => Some(120),
            ReportPeriod::AllTime => None,
        }
    }
}

/// What slice of predictions a report covers. All filters optional;
/// an empty scope means everything.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ReportScope {
    pub cultivar_id: Option<String>,
    pub region_id: Option<String>,
    pub layer: Option<PredictionLayer>,
    pub source_type: Option<SourceType>,
}

/// A scored summary over a scope and period. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccuracyReport {
    pub id: Uuid,
    pub scope: ReportScope,
    pub period: ReportPeriod,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub metrics: AccuracyMetrics,
    pub tier_accuracy: Vec<TierAccuracy>,
    pub trend: TrendDirection,
    /// Percent change in MAE versus the prior report of this scope
    pub trend_change_pct: f64,
    pub alert_triggered: bool,
    pub needs_retraining: bool,
    /// Matched alert reasons concatenated into one readable string
    pub alert_reasons: Option<String>,
    pub generated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_labels_round_trip() {
        for layer in [
            PredictionLayer::ResearchBaseline,
            PredictionLayer::RegionalCalibrated,
            PredictionLayer::FarmCalibrated,
        ] {
            assert_eq!(PredictionLayer::from_str(layer.as_str()), layer);
        }
    }

    #[test]
    fn source_type_labels_round_trip() {
        for source in [SourceType::LabVerified, SourceType::SelfReported] {
            assert_eq!(SourceType::from_str(source.as_str()), source);
        }
    }

    #[test]
    fn unknown_labels_fall_back_conservatively() {
        assert_eq!(
            PredictionLayer::from_str("experimental"),
            PredictionLayer::ResearchBaseline
        );
        assert_eq!(SourceType::from_str("hearsay"), SourceType::SelfReported);
    }
}

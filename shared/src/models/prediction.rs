//! Quality prediction request and result types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{Practices, QualityTier, SoilReadings};
use crate::timing::HarvestWindowStatus;

/// Biologically plausible bounds for the Brix-like quality value.
/// Predictions are always clamped into this range.
pub const QUALITY_VALUE_MIN: f64 = 6.0;
pub const QUALITY_VALUE_MAX: f64 = 20.0;

/// Lab or self-reported measurements attached to a request.
///
/// When present these override the computed prediction: a measurement
/// of the real item beats a model of it.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
pub struct ActualMeasurements {
    /// Measured sugar content for produce
    #[validate(range(min = 0.0, max = 35.0))]
    pub brix: Option<f64>,
    /// Measured omega-6:3 fatty-acid ratio for animal products
    /// (lower is better)
    #[validate(range(min = 0.1, max = 100.0))]
    pub omega_ratio: Option<f64>,
    /// Marbling score where graded
    #[validate(range(min = 0.0, max = 12.0))]
    pub marbling_score: Option<f64>,
    /// True when a laboratory produced the numbers, false when
    /// self-reported
    pub lab_verified: bool,
}

impl ActualMeasurements {
    pub fn has_quality_value(&self) -> bool {
        self.brix.is_some() || self.omega_ratio.is_some()
    }
}

/// Omega-6:3 ratio classification tiers. Boundaries are inclusive on
/// the lower (better) tier: a ratio of exactly 3.0 is exceptional.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OmegaTier {
    Exceptional,
    Premium,
    Standard,
    Commodity,
}

/// Upper bound constants for the omega tiers, kept public so report
/// consumers can label axes consistently
pub struct ActualOmegaTierBound;

impl ActualOmegaTierBound {
    pub const EXCEPTIONAL: f64 = 3.0;
    pub const PREMIUM: f64 = 6.0;
    pub const STANDARD: f64 = 12.0;
}

/// Classify an omega-6:3 ratio into its quality tier
pub fn classify_omega_ratio(ratio: f64) -> OmegaTier {
    if ratio <= ActualOmegaTierBound::EXCEPTIONAL {
        OmegaTier::Exceptional
    } else if ratio <= ActualOmegaTierBound::PREMIUM {
        OmegaTier::Premium
    } else if ratio <= ActualOmegaTierBound::STANDARD {
        OmegaTier::Standard
    } else {
        OmegaTier::Commodity
    }
}

impl OmegaTier {
    /// Equivalent ordinal quality tier
    pub fn as_quality_tier(&self) -> QualityTier {
        match self {
            OmegaTier::Exceptional => QualityTier::Artisan,
            OmegaTier::Premium => QualityTier::Premium,
            OmegaTier::Standard => QualityTier::Standard,
            OmegaTier::Commodity => QualityTier::Commodity,
        }
    }
}

/// A quality prediction request.
///
/// Constructed per request; either `current_gdd` is supplied directly
/// or the engine estimates accumulation from bloom to `as_of`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct QualityPredictionInput {
    pub cultivar_id: String,
    pub crop_id: String,
    pub region_id: String,
    pub rootstock_id: Option<String>,
    /// Tree or animal age in years
    #[validate(range(min = 0, max = 200))]
    pub age_years: Option<u32>,
    #[validate]
    pub soil: Option<SoilReadings>,
    pub practices: Option<Practices>,
    #[validate]
    pub actuals: Option<ActualMeasurements>,
    /// Accumulated GDD supplied by the caller (e.g. from the weather
    /// collaborator); skips estimation entirely
    #[validate(range(min = 0.0, max = 20000.0))]
    pub current_gdd: Option<f64>,
    /// Date the prediction is for; defaults to today at the service
    /// boundary
    pub as_of: Option<NaiveDate>,
}

/// Heritage pillar: genetics, graft base, and age
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HeritagePillar {
    /// Research-derived base quality value for the cultivar
    pub base_value: f64,
    pub rootstock_modifier: f64,
    pub age_modifier: f64,
    pub confidence: f64,
}

/// Soil pillar: 0-100 score and the resulting modifier
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SoilPillar {
    pub score: f64,
    pub modifier: f64,
    pub confidence: f64,
}

/// Agricultural-practice pillar
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PracticePillar {
    pub modifier: f64,
    pub confidence: f64,
}

/// Timing pillar: where the crop sits in its harvest window
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimingPillar {
    pub status: HarvestWindowStatus,
    pub current_gdd: f64,
    pub gdd_estimated: bool,
    pub modifier: f64,
    pub confidence: f64,
}

/// Actual-measurement pillar, present when measurements were supplied
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MeasurementPillar {
    pub measured_value: f64,
    pub omega_tier: Option<OmegaTier>,
    pub lab_verified: bool,
    pub confidence: f64,
}

/// The computed output of a prediction.
///
/// Produced fresh per request; numeric fields carry their documented
/// precision (quality values one decimal, confidences two) so a
/// persisted row decodes back to exactly these numbers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QualityPredictionResult {
    /// Predicted quality value on the Brix-like 6-20 scale
    pub predicted_value: f64,
    /// 0-100 quality score
    pub quality_score: f64,
    pub tier: QualityTier,
    /// Overall confidence in [0, 1]
    pub confidence: f64,
    pub heritage: HeritagePillar,
    pub soil: SoilPillar,
    pub practices: PracticePillar,
    pub timing: TimingPillar,
    pub measurement: Option<MeasurementPillar>,
    /// Projected date of peak quality
    pub optimal_harvest_date: Option<NaiveDate>,
    pub window_start: Option<NaiveDate>,
    pub window_end: Option<NaiveDate>,
    pub warnings: Vec<String>,
}

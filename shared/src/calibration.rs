//! Hand-tuned calibration tables
//!
//! Every fixed constant the prediction and evaluation math depends on
//! lives here, in one place, so recalibrating against new feedback data
//! means editing a table rather than hunting through the algorithms.
//! The numbers come from published horticultural research plus field
//! feedback; treat them as data, not code.

use crate::models::{
    ClimateZone, DrainageClass, FeedingRegime, FertilityStrategy, HeritageIntent,
    IrrigationMethod, PestManagement, WelfareStandard,
};

/// Quality-value shift by plant or animal age in years.
///
/// Young plantings have not developed full root systems or canopy;
/// quality climbs to a long prime plateau and then tapers as vigor
/// declines.
pub fn age_modifier(age_years: u32) -> f64 {
    match age_years {
        0..=2 => -0.8,
        3..=4 => -0.5,
        5..=7 => -0.2,
        8..=18 => 0.0,
        19..=25 => -0.2,
        _ => -0.3,
    }
}

/// Soil score starts from this neutral midpoint and moves with each
/// reading supplied
pub const SOIL_SCORE_BASE: f64 = 50.0;

/// Organic-matter thresholds (percent) and the score shift each earns
pub const SOIL_OM_SHIFTS: [(f64, f64); 3] = [(5.0, 15.0), (3.0, 10.0), (2.0, 5.0)];

/// Ideal pH band earns a bonus; outside the tolerable band costs one
pub const SOIL_PH_IDEAL: (f64, f64) = (6.0, 7.0);
pub const SOIL_PH_TOLERABLE: (f64, f64) = (5.5, 7.5);
pub const SOIL_PH_IDEAL_SHIFT: f64 = 10.0;
pub const SOIL_PH_OUTSIDE_SHIFT: f64 = -10.0;

pub fn drainage_shift(drainage: DrainageClass) -> f64 {
    match drainage {
        DrainageClass::Well => 10.0,
        DrainageClass::Moderate => 5.0,
        DrainageClass::Poor => -10.0,
    }
}

/// Maximum absolute quality-value contribution of the soil pillar
pub const SOIL_MODIFIER_CLAMP: f64 = 0.5;

/// Maximum absolute quality-value contribution of the practice pillar
pub const PRACTICE_MODIFIER_CLAMP: f64 = 0.5;

pub fn fertility_delta(strategy: FertilityStrategy) -> f64 {
    match strategy {
        FertilityStrategy::Regenerative => 0.25,
        FertilityStrategy::Organic => 0.2,
        FertilityStrategy::Integrated => 0.1,
        FertilityStrategy::Conventional => 0.0,
    }
}

/// Pest programme deltas. Conventional is deliberately 0, not negative:
/// the model rewards practices with measured quality upside rather than
/// penalizing the default.
pub fn pest_delta(programme: PestManagement) -> f64 {
    match programme {
        PestManagement::Organic => 0.1,
        PestManagement::Integrated => 0.05,
        PestManagement::Conventional => 0.0,
    }
}

pub fn irrigation_delta(method: IrrigationMethod) -> f64 {
    match method {
        IrrigationMethod::Drip => 0.05,
        IrrigationMethod::Rainfed => 0.0,
        IrrigationMethod::Flood => -0.05,
    }
}

/// Feeding regime dominates omega-6:3 outcomes in animal products,
/// hence the widest spread of any practice flag
pub fn feeding_delta(regime: FeedingRegime) -> f64 {
    match regime {
        FeedingRegime::GrassOnly => 0.3,
        FeedingRegime::PastureWithGrain => 0.1,
        FeedingRegime::GrainFed => -0.2,
    }
}

pub fn welfare_delta(standard: WelfareStandard) -> f64 {
    match standard {
        WelfareStandard::PastureRaised => 0.1,
        WelfareStandard::FreeRange => 0.05,
        WelfareStandard::Conventional => 0.0,
    }
}

/// Quality-score bonus for the breeding intent behind the cultivar
pub fn heritage_intent_bonus(intent: HeritageIntent) -> f64 {
    match intent {
        HeritageIntent::FlavorBred => 10.0,
        HeritageIntent::NutritionBred => 8.0,
        HeritageIntent::DualPurpose => 4.0,
        HeritageIntent::YieldShipping => 0.0,
        HeritageIntent::Unknown => 0.0,
    }
}

/// Quality-score bonus for the predicted value band
pub fn value_band_bonus(predicted_value: f64) -> f64 {
    if predicted_value >= 14.0 {
        30.0
    } else if predicted_value >= 12.0 {
        20.0
    } else if predicted_value >= 10.0 {
        10.0
    } else {
        0.0
    }
}

/// Quality-score bonuses for harvest timing
pub const TIMING_BONUS_PEAK: f64 = 10.0;
pub const TIMING_BONUS_WINDOW: f64 = 5.0;

/// Typical daily GDD accumulation by climate zone, for estimating
/// accumulation when no observed weather is available
pub fn zone_daily_gdd(zone: ClimateZone) -> f64 {
    match zone {
        ClimateZone::Tropical => 25.0,
        ClimateZone::Subtropical => 22.0,
        ClimateZone::Arid => 20.0,
        ClimateZone::Temperate => 15.0,
        ClimateZone::Continental => 12.0,
    }
}

/// Daily GDD rate when even the climate zone is unknown
pub const GENERIC_DAILY_GDD: f64 = 15.0;

/// Confidence blend weights; they sum with the baseline to 1.0
pub const CONFIDENCE_WEIGHT_HERITAGE: f64 = 0.30;
pub const CONFIDENCE_WEIGHT_TIMING: f64 = 0.25;
pub const CONFIDENCE_WEIGHT_SOIL: f64 = 0.15;
pub const CONFIDENCE_WEIGHT_PRACTICES: f64 = 0.10;
pub const CONFIDENCE_WEIGHT_AGE: f64 = 0.10;
pub const CONFIDENCE_BASELINE: f64 = 0.10;

/// Confidence boost when an actual measurement backs the prediction
pub const MEASUREMENT_CONFIDENCE_BOOST: f64 = 0.2;

/// Alert thresholds for accuracy reports
pub const ALERT_MAE_THRESHOLD: f64 = 1.5;
pub const RETRAINING_MAE_THRESHOLD: f64 = 2.0;
pub const ALERT_MAE_INCREASE_PCT: f64 = 25.0;
pub const ALERT_MIN_PCT_WITHIN_1_0: f64 = 60.0;

/// Trend thresholds: MAE percent change versus the prior report
pub const TREND_DEGRADING_PCT: f64 = 10.0;
pub const TREND_IMPROVING_PCT: f64 = -5.0;

/// Minimum samples before a per-tier accuracy row is emitted
pub const TIER_MIN_SAMPLES: usize = 5;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_weights_sum_to_one() {
        let sum = CONFIDENCE_WEIGHT_HERITAGE
            + CONFIDENCE_WEIGHT_TIMING
            + CONFIDENCE_WEIGHT_SOIL
            + CONFIDENCE_WEIGHT_PRACTICES
            + CONFIDENCE_WEIGHT_AGE
            + CONFIDENCE_BASELINE;
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn age_curve_peaks_in_prime_years() {
        assert_eq!(age_modifier(1), -0.8);
        assert_eq!(age_modifier(4), -0.5);
        assert_eq!(age_modifier(7), -0.2);
        assert_eq!(age_modifier(8), 0.0);
        assert_eq!(age_modifier(18), 0.0);
        assert_eq!(age_modifier(19), -0.2);
        assert_eq!(age_modifier(30), -0.3);
    }

    #[test]
    fn grass_feeding_outranks_every_other_practice_delta() {
        assert!(feeding_delta(FeedingRegime::GrassOnly) > fertility_delta(FertilityStrategy::Regenerative));
    }
}

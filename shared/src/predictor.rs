//! Multi-factor quality prediction
//!
//! Combines cultivar genetics, rootstock, age, soil, practices, and
//! harvest timing into a single quality value on the Brix-like 6-20
//! scale, with a per-pillar breakdown and a weighted confidence.
//!
//! The engine never fails on missing business data. Unknown cultivars,
//! absent soil tests, or unresolvable phenology degrade the prediction:
//! a warning is attached and the affected pillar's confidence drops,
//! but a best-effort number always comes back.

use chrono::NaiveDate;

use crate::calibration;
use crate::models::{
    classify_omega_ratio, ActualMeasurements, ClimateZone, CropPhenology,
    CultivarQualityProfile, FeedingRegime, GddAccumulation, HeritagePillar,
    MeasurementPillar, OmegaTier, PracticePillar, Practices, QualityPredictionInput,
    QualityPredictionResult, QualityTier, Rootstock, SoilPillar, SoilReadings, TimingPillar,
    QUALITY_VALUE_MAX, QUALITY_VALUE_MIN,
};
use crate::timing::{self, HarvestWindowStatus};
use crate::types::{round1, round2};

/// Quality value assumed when no cultivar profile resolves at all
const FALLBACK_BASE_VALUE: f64 = 10.0;

/// Reference records resolved ahead of prediction. The resolver always
/// fills `phenology` (falling back to generic thresholds) and flags the
/// fallback so timing confidence can reflect it.
#[derive(Debug, Clone)]
pub struct ResolvedReferences {
    pub cultivar: Option<CultivarQualityProfile>,
    pub rootstock: Option<Rootstock>,
    pub phenology: CropPhenology,
    /// True when `phenology` is the generic default, not a real record
    pub phenology_degraded: bool,
    pub climate_zone: Option<ClimateZone>,
    /// Region coordinates, when the region record carries them;
    /// observed-weather lookups need these
    pub coordinates: Option<crate::types::GpsCoordinates>,
}

/// Run the full five-pillar prediction.
///
/// `accumulation` is the GDD state the caller already obtained, whether
/// observed, caller-supplied, or zone-estimated; `as_of` anchors the
/// harvest date projection.
pub fn predict(
    input: &QualityPredictionInput,
    refs: &ResolvedReferences,
    accumulation: &GddAccumulation,
    as_of: NaiveDate,
) -> QualityPredictionResult {
    let mut warnings = Vec::new();

    let heritage = heritage_pillar(input, refs, &mut warnings);
    let soil = soil_pillar(input.soil.as_ref());
    let practices = practice_pillar(input.practices.as_ref(), &mut warnings);
    let timing = timing_pillar(accumulation, refs, &mut warnings);

    let mut predicted_value = heritage.base_value
        + heritage.rootstock_modifier
        + heritage.age_modifier
        + soil.modifier
        + practices.modifier
        + timing.modifier;
    predicted_value = predicted_value.clamp(QUALITY_VALUE_MIN, QUALITY_VALUE_MAX);

    let age_confidence = if input.age_years.is_some() { 1.0 } else { 0.4 };
    let mut confidence = calibration::CONFIDENCE_WEIGHT_HERITAGE * heritage.confidence
        + calibration::CONFIDENCE_WEIGHT_TIMING * timing.confidence
        + calibration::CONFIDENCE_WEIGHT_SOIL * soil.confidence
        + calibration::CONFIDENCE_WEIGHT_PRACTICES * practices.confidence
        + calibration::CONFIDENCE_WEIGHT_AGE * age_confidence
        + calibration::CONFIDENCE_BASELINE;

    let measurement = input
        .actuals
        .as_ref()
        .filter(|a| a.has_quality_value())
        .map(|actuals| {
            measurement_pillar(
                actuals,
                input.practices.as_ref(),
                &mut predicted_value,
                &mut warnings,
            )
        });
    let mut tier = QualityTier::from_quality_value(predicted_value);
    if let Some(pillar) = &measurement {
        confidence = (confidence + calibration::MEASUREMENT_CONFIDENCE_BOOST).min(1.0);
        if let Some(omega) = pillar.omega_tier {
            tier = omega.as_quality_tier();
        }
    }

    let quality_score = quality_score(predicted_value, refs, timing.status);
    let projection = timing::project_harvest_dates(accumulation, &refs.phenology, as_of);

    QualityPredictionResult {
        predicted_value: round1(predicted_value),
        quality_score,
        tier,
        confidence: round2(confidence.clamp(0.0, 1.0)),
        heritage,
        soil,
        practices,
        timing,
        measurement,
        optimal_harvest_date: projection.optimal,
        window_start: projection.window_start,
        window_end: projection.window_end,
        warnings,
    }
}

fn heritage_pillar(
    input: &QualityPredictionInput,
    refs: &ResolvedReferences,
    warnings: &mut Vec<String>,
) -> HeritagePillar {
    let (base_value, mut confidence): (f64, f64) = match refs
        .cultivar
        .as_ref()
        .and_then(|c| c.base_quality_value())
    {
        Some(value) => (value, 0.9),
        None => {
            warnings.push(format!(
                "no quality profile for cultivar '{}'; using generic base value",
                input.cultivar_id
            ));
            (FALLBACK_BASE_VALUE, 0.3)
        }
    };

    let rootstock_modifier = match (&input.rootstock_id, &refs.rootstock) {
        (Some(_), Some(rootstock)) => rootstock.brix_modifier,
        (Some(id), None) => {
            warnings.push(format!("unknown rootstock '{id}'; ignoring"));
            confidence = (confidence - 0.1).max(0.0);
            0.0
        }
        (None, _) => 0.0,
    };

    let age_modifier = input
        .age_years
        .map(calibration::age_modifier)
        .unwrap_or(0.0);

    HeritagePillar {
        base_value,
        rootstock_modifier,
        age_modifier,
        confidence: round2(confidence),
    }
}

/// Score soil readings from a neutral 50, then convert the score into
/// a quality-value modifier: `(score - 50) / 100`, clamped.
fn soil_pillar(soil: Option<&SoilReadings>) -> SoilPillar {
    let Some(readings) = soil else {
        return SoilPillar {
            score: calibration::SOIL_SCORE_BASE,
            modifier: 0.0,
            confidence: 0.2,
        };
    };

    let mut score = calibration::SOIL_SCORE_BASE;
    let mut readings_present = 0;

    if let Some(om) = readings.organic_matter_pct {
        readings_present += 1;
        for (threshold, shift) in calibration::SOIL_OM_SHIFTS {
            if om >= threshold {
                score += shift;
                break;
            }
        }
    }
    if let Some(ph) = readings.ph {
        readings_present += 1;
        let (ideal_lo, ideal_hi) = calibration::SOIL_PH_IDEAL;
        let (tol_lo, tol_hi) = calibration::SOIL_PH_TOLERABLE;
        if (ideal_lo..=ideal_hi).contains(&ph) {
            score += calibration::SOIL_PH_IDEAL_SHIFT;
        } else if !(tol_lo..=tol_hi).contains(&ph) {
            score += calibration::SOIL_PH_OUTSIDE_SHIFT;
        }
    }
    if let Some(drainage) = readings.drainage {
        readings_present += 1;
        score += calibration::drainage_shift(drainage);
    }

    let score = score.clamp(0.0, 100.0);
    let modifier = ((score - calibration::SOIL_SCORE_BASE) / 100.0)
        .clamp(-calibration::SOIL_MODIFIER_CLAMP, calibration::SOIL_MODIFIER_CLAMP);
    SoilPillar {
        score,
        modifier: round2(modifier),
        confidence: 0.2 + 0.2 * readings_present as f64,
    }
}

fn practice_pillar(practices: Option<&Practices>, warnings: &mut Vec<String>) -> PracticePillar {
    let Some(practices) = practices.filter(|p| p.has_data()) else {
        return PracticePillar {
            modifier: 0.0,
            confidence: 0.2,
        };
    };

    if practices.organic_grain_fed_conflict() {
        warnings.push(
            "organic practice claim is inconsistent with a grain-fed diet".to_string(),
        );
    }

    let (delta, flags_present) = match practices {
        Practices::Produce {
            fertility,
            pest_management,
            irrigation,
        } => {
            let mut delta = 0.0;
            let mut present = 0;
            if let Some(f) = fertility {
                delta += calibration::fertility_delta(*f);
                present += 1;
            }
            if let Some(p) = pest_management {
                delta += calibration::pest_delta(*p);
                present += 1;
            }
            if let Some(i) = irrigation {
                delta += calibration::irrigation_delta(*i);
                present += 1;
            }
            (delta, present)
        }
        Practices::Livestock {
            fertility,
            feeding,
            welfare,
        } => {
            let mut delta = 0.0;
            let mut present = 0;
            if let Some(f) = fertility {
                delta += calibration::fertility_delta(*f);
                present += 1;
            }
            if let Some(f) = feeding {
                delta += calibration::feeding_delta(*f);
                present += 1;
            }
            if let Some(w) = welfare {
                delta += calibration::welfare_delta(*w);
                present += 1;
            }
            (delta, present)
        }
    };

    PracticePillar {
        modifier: round2(delta.clamp(
            -calibration::PRACTICE_MODIFIER_CLAMP,
            calibration::PRACTICE_MODIFIER_CLAMP,
        )),
        confidence: (0.4 + 0.15 * flags_present as f64).min(0.85),
    }
}

fn timing_pillar(
    accumulation: &GddAccumulation,
    refs: &ResolvedReferences,
    warnings: &mut Vec<String>,
) -> TimingPillar {
    let status = timing::classify_window(accumulation.total_gdd, &refs.phenology);
    let modifier = timing::timing_modifier(accumulation.total_gdd, &refs.phenology);

    let mut confidence: f64 = if accumulation.estimated { 0.5 } else { 0.9 };
    if refs.phenology_degraded {
        warnings.push(format!(
            "no phenology record for crop '{}' in region '{}'; using generic thresholds",
            refs.phenology.crop_id, refs.phenology.region_id
        ));
        confidence = (confidence - 0.2).max(0.1);
    }

    TimingPillar {
        status,
        current_gdd: round1(accumulation.total_gdd),
        gdd_estimated: accumulation.estimated,
        modifier: round2(modifier),
        confidence: round2(confidence),
    }
}

/// Apply actual measurements: a measured Brix replaces the computed
/// value outright, and a measured omega ratio reclassifies the tier.
fn measurement_pillar(
    actuals: &ActualMeasurements,
    practices: Option<&Practices>,
    predicted_value: &mut f64,
    warnings: &mut Vec<String>,
) -> MeasurementPillar {
    let omega_tier = actuals.omega_ratio.map(classify_omega_ratio);

    if let (Some(ratio), Some(tier)) = (actuals.omega_ratio, omega_tier) {
        let claimed = practices.and_then(|p| p.claimed_feeding());
        if claimed == Some(FeedingRegime::GrassOnly)
            && matches!(tier, OmegaTier::Standard | OmegaTier::Commodity)
        {
            warnings.push(format!(
                "measured omega-6:3 ratio {ratio:.1} is inconsistent with a grass-only feeding claim"
            ));
        }
    }

    let measured_value = match actuals.brix {
        Some(brix) => {
            *predicted_value = brix.clamp(QUALITY_VALUE_MIN, QUALITY_VALUE_MAX);
            brix
        }
        // Omega ratios live on their own scale and only move the tier
        None => actuals.omega_ratio.unwrap_or(*predicted_value),
    };

    MeasurementPillar {
        measured_value,
        omega_tier,
        lab_verified: actuals.lab_verified,
        confidence: if actuals.lab_verified { 0.95 } else { 0.75 },
    }
}

/// 0-100 quality score: 50 base plus bonuses for the value band, the
/// breeding intent, and harvesting inside the window
fn quality_score(
    predicted_value: f64,
    refs: &ResolvedReferences,
    status: HarvestWindowStatus,
) -> f64 {
    let mut score = 50.0;
    score += calibration::value_band_bonus(predicted_value);
    if let Some(cultivar) = &refs.cultivar {
        score += calibration::heritage_intent_bonus(cultivar.heritage_intent);
    }
    score += match status {
        HarvestWindowStatus::Peak => calibration::TIMING_BONUS_PEAK,
        HarvestWindowStatus::HarvestWindow => calibration::TIMING_BONUS_WINDOW,
        _ => 0.0,
    };
    score.clamp(0.0, 100.0)
}

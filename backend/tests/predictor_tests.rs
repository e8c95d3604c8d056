//! Tests for the five-pillar quality predictor
//! Verifies pillar arithmetic, clamping, degradation warnings, and
//! actual-measurement overrides

use chrono::NaiveDate;
use proptest::prelude::*;

use shared::models::{
    classify_omega_ratio, ActualMeasurements, CropPhenology, CultivarQualityProfile,
    DrainageClass, FeedingRegime, FertilityStrategy, GddAccumulation, HeritageIntent,
    IrrigationMethod, MaturityType, OmegaTier, PestManagement, Practices,
    QualityPredictionInput, QualityTier, RipeningBehavior, Rootstock, SoilReadings,
    WelfareStandard, QUALITY_VALUE_MAX, QUALITY_VALUE_MIN,
};
use shared::predictor::{predict, ResolvedReferences};
use shared::timing::HarvestWindowStatus;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn phenology() -> CropPhenology {
    CropPhenology {
        crop_id: "navel_orange".to_string(),
        region_id: "central_valley".to_string(),
        bloom_month: 4,
        bloom_day: 1,
        gdd_base_temp_f: 55.0,
        gdd_to_maturity: 2000.0,
        gdd_to_peak: 2400.0,
        gdd_window_width: 800.0,
        chill_hours_required: None,
    }
}

fn navel_profile() -> CultivarQualityProfile {
    CultivarQualityProfile {
        cultivar_id: "washington_navel".to_string(),
        cultivar_name: "Washington Navel".to_string(),
        crop_id: "navel_orange".to_string(),
        tier: QualityTier::Premium,
        heritage_intent: HeritageIntent::FlavorBred,
        avg_brix: Some(12.5),
        peak_brix: Some(14.5),
        maturity: MaturityType::MidSeason,
        ripening: RipeningBehavior::NonClimacteric,
    }
}

fn full_refs() -> ResolvedReferences {
    ResolvedReferences {
        cultivar: Some(navel_profile()),
        rootstock: Some(Rootstock {
            rootstock_id: "trifoliate".to_string(),
            rootstock_name: "Trifoliate Orange".to_string(),
            brix_modifier: 0.6,
            vigor: Some("low".to_string()),
            disease_notes: None,
        }),
        phenology: phenology(),
        phenology_degraded: false,
        climate_zone: None,
        coordinates: None,
    }
}

fn observed(total_gdd: f64) -> GddAccumulation {
    GddAccumulation {
        total_gdd,
        avg_daily_gdd: 20.0,
        days: (total_gdd / 20.0) as i64,
        estimated: false,
    }
}

fn base_input() -> QualityPredictionInput {
    QualityPredictionInput {
        cultivar_id: "washington_navel".to_string(),
        crop_id: "navel_orange".to_string(),
        region_id: "central_valley".to_string(),
        rootstock_id: Some("trifoliate".to_string()),
        age_years: Some(10),
        soil: Some(SoilReadings {
            organic_matter_pct: Some(5.5),
            ph: Some(6.5),
            drainage: Some(DrainageClass::Well),
        }),
        practices: Some(Practices::Produce {
            fertility: Some(FertilityStrategy::Organic),
            pest_management: Some(PestManagement::Organic),
            irrigation: Some(IrrigationMethod::Drip),
        }),
        actuals: None,
        current_gdd: None,
        as_of: None,
    }
}

// =============================================================================
// Pillar arithmetic
// =============================================================================

mod pillars {
    use super::*;

    #[test]
    fn fully_specified_request_at_peak() {
        let result = predict(&base_input(), &full_refs(), &observed(2400.0), date(2025, 11, 1));

        // 12.5 base + 0.6 rootstock + 0.0 age(10) + 0.35 soil + 0.35
        // practices + 0.0 timing
        assert_eq!(result.predicted_value, 13.8);
        assert_eq!(result.tier, QualityTier::Premium);
        assert_eq!(result.timing.status, HarvestWindowStatus::Peak);

        // 50 + 20 (value >= 12) + 10 (flavor bred) + 10 (peak)
        assert_eq!(result.quality_score, 90.0);

        // 0.30*0.9 + 0.25*0.9 + 0.15*0.8 + 0.10*0.85 + 0.10*1.0 + 0.10
        assert_eq!(result.confidence, 0.9);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn soil_pillar_scores_and_converts() {
        let result = predict(&base_input(), &full_refs(), &observed(2400.0), date(2025, 11, 1));
        // 50 + 15 (OM >= 5) + 10 (pH ideal) + 10 (well drained)
        assert_eq!(result.soil.score, 85.0);
        assert_eq!(result.soil.modifier, 0.35);
    }

    #[test]
    fn acidic_soil_costs_the_ph_penalty() {
        let mut input = base_input();
        input.soil = Some(SoilReadings {
            organic_matter_pct: Some(1.0),
            ph: Some(5.0),
            drainage: Some(DrainageClass::Poor),
        });
        let result = predict(&input, &full_refs(), &observed(2400.0), date(2025, 11, 1));
        // 50 + 0 (OM below all thresholds) - 10 (pH outside 5.5-7.5)
        // - 10 (poor drainage)
        assert_eq!(result.soil.score, 30.0);
        assert_eq!(result.soil.modifier, -0.2);
    }

    #[test]
    fn young_planting_pays_the_age_penalty() {
        let mut input = base_input();
        input.age_years = Some(2);
        let result = predict(&input, &full_refs(), &observed(2400.0), date(2025, 11, 1));
        assert_eq!(result.heritage.age_modifier, -0.8);
        assert_eq!(result.predicted_value, 13.0);
    }

    #[test]
    fn livestock_practices_use_feeding_and_welfare() {
        let mut input = base_input();
        input.practices = Some(Practices::Livestock {
            fertility: None,
            feeding: Some(FeedingRegime::GrassOnly),
            welfare: Some(WelfareStandard::PastureRaised),
        });
        let result = predict(&input, &full_refs(), &observed(2400.0), date(2025, 11, 1));
        assert_eq!(result.practices.modifier, 0.4);
    }

    #[test]
    fn organic_claim_with_grain_feeding_warns() {
        let mut input = base_input();
        input.practices = Some(Practices::Livestock {
            fertility: Some(FertilityStrategy::Organic),
            feeding: Some(FeedingRegime::GrainFed),
            welfare: None,
        });
        let result = predict(&input, &full_refs(), &observed(2400.0), date(2025, 11, 1));

        assert!(result
            .warnings
            .iter()
            .any(|w| w.contains("grain-fed diet")));
        // Organic +0.2 and grain-fed -0.2 cancel out
        assert_eq!(result.practices.modifier, 0.0);
    }

    #[test]
    fn missing_optional_data_lowers_confidence_without_warnings() {
        let mut input = base_input();
        input.soil = None;
        input.practices = None;
        input.age_years = None;
        let result = predict(&input, &full_refs(), &observed(2400.0), date(2025, 11, 1));

        assert!(result.warnings.is_empty());
        assert_eq!(result.soil.modifier, 0.0);
        assert_eq!(result.practices.modifier, 0.0);
        // 0.30*0.9 + 0.25*0.9 + 0.15*0.2 + 0.10*0.2 + 0.10*0.4 + 0.10
        assert!((0.68..=0.69).contains(&result.confidence));
    }
}

// =============================================================================
// Degradation
// =============================================================================

mod degradation {
    use super::*;

    #[test]
    fn unknown_cultivar_warns_and_drops_heritage_confidence() {
        let mut refs = full_refs();
        refs.cultivar = None;
        let result = predict(&base_input(), &refs, &observed(2400.0), date(2025, 11, 1));

        assert_eq!(result.heritage.base_value, 10.0);
        assert_eq!(result.heritage.confidence, 0.3);
        assert!(result.warnings.iter().any(|w| w.contains("washington_navel")));
    }

    #[test]
    fn unknown_rootstock_warns_and_contributes_nothing() {
        let mut refs = full_refs();
        refs.rootstock = None;
        let result = predict(&base_input(), &refs, &observed(2400.0), date(2025, 11, 1));

        assert_eq!(result.heritage.rootstock_modifier, 0.0);
        assert!(result.warnings.iter().any(|w| w.contains("rootstock")));
    }

    #[test]
    fn generic_phenology_warns_and_drops_timing_confidence() {
        let mut refs = full_refs();
        refs.phenology = CropPhenology::generic_default("navel_orange", "central_valley");
        refs.phenology_degraded = true;
        let result = predict(&base_input(), &refs, &observed(2400.0), date(2025, 11, 1));

        assert_eq!(result.timing.confidence, 0.7);
        assert!(result.warnings.iter().any(|w| w.contains("phenology")));
    }

    #[test]
    fn estimated_gdd_lowers_timing_confidence() {
        let mut acc = observed(2400.0);
        acc.estimated = true;
        let result = predict(&base_input(), &full_refs(), &acc, date(2025, 11, 1));
        assert!(result.timing.gdd_estimated);
        assert_eq!(result.timing.confidence, 0.5);
    }
}

// =============================================================================
// Actual measurement overrides
// =============================================================================

mod measurements {
    use super::*;

    #[test]
    fn measured_brix_replaces_the_computed_value() {
        let mut input = base_input();
        input.actuals = Some(ActualMeasurements {
            brix: Some(15.2),
            omega_ratio: None,
            marbling_score: None,
            lab_verified: true,
        });
        let result = predict(&input, &full_refs(), &observed(2400.0), date(2025, 11, 1));

        assert_eq!(result.predicted_value, 15.2);
        assert_eq!(result.tier, QualityTier::Artisan);
        // Base confidence 0.9 plus the 0.2 measurement boost, capped
        assert_eq!(result.confidence, 1.0);
        let measurement = result.measurement.unwrap();
        assert!(measurement.lab_verified);
        assert_eq!(measurement.confidence, 0.95);
    }

    #[test]
    fn omega_ratio_reclassifies_the_tier() {
        let mut input = base_input();
        input.practices = None;
        input.actuals = Some(ActualMeasurements {
            brix: None,
            omega_ratio: Some(2.8),
            marbling_score: None,
            lab_verified: false,
        });
        let result = predict(&input, &full_refs(), &observed(2400.0), date(2025, 11, 1));

        let measurement = result.measurement.unwrap();
        assert_eq!(measurement.omega_tier, Some(OmegaTier::Exceptional));
        assert_eq!(result.tier, QualityTier::Artisan);
    }

    #[test]
    fn grass_only_claim_with_poor_omega_warns() {
        let mut input = base_input();
        input.practices = Some(Practices::Livestock {
            fertility: None,
            feeding: Some(FeedingRegime::GrassOnly),
            welfare: None,
        });
        input.actuals = Some(ActualMeasurements {
            brix: None,
            omega_ratio: Some(8.5),
            marbling_score: None,
            lab_verified: true,
        });
        let result = predict(&input, &full_refs(), &observed(2400.0), date(2025, 11, 1));

        assert!(result
            .warnings
            .iter()
            .any(|w| w.contains("grass-only")));
        assert_eq!(result.tier, QualityTier::Standard);
    }

    #[test]
    fn omega_tier_boundaries_are_inclusive_on_the_better_tier() {
        assert_eq!(classify_omega_ratio(3.0), OmegaTier::Exceptional);
        assert_eq!(classify_omega_ratio(3.01), OmegaTier::Premium);
        assert_eq!(classify_omega_ratio(6.0), OmegaTier::Premium);
        assert_eq!(classify_omega_ratio(6.01), OmegaTier::Standard);
        assert_eq!(classify_omega_ratio(12.0), OmegaTier::Standard);
        assert_eq!(classify_omega_ratio(12.01), OmegaTier::Commodity);
    }
}

// =============================================================================
// Stored-row fidelity
// =============================================================================

mod persistence {
    use super::*;
    use shared::models::QualityPredictionResult;

    // Results are rounded before they leave the engine, so a stored
    // JSON row must decode back to exactly the numbers the caller saw
    #[test]
    fn result_survives_json_storage_exactly() {
        let mut input = base_input();
        input.actuals = Some(ActualMeasurements {
            brix: Some(13.4),
            omega_ratio: None,
            marbling_score: None,
            lab_verified: true,
        });
        let result = predict(&input, &full_refs(), &observed(2350.0), date(2025, 11, 1));

        let encoded = serde_json::to_value(&result).unwrap();
        let decoded: QualityPredictionResult = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded, result);
    }
}

// =============================================================================
// Invariants
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn predicted_value_and_confidence_stay_in_range(
        gdd in 0.0..6_000.0f64,
        age in 0u32..60,
        om in 0.0..12.0f64,
        ph in 4.0..9.0f64,
        brix_mod in -0.8..0.6f64,
    ) {
        let mut input = base_input();
        input.age_years = Some(age);
        input.soil = Some(SoilReadings {
            organic_matter_pct: Some(om),
            ph: Some(ph),
            drainage: None,
        });
        let mut refs = full_refs();
        if let Some(stock) = refs.rootstock.as_mut() {
            stock.brix_modifier = brix_mod;
        }

        let result = predict(&input, &refs, &observed(gdd), date(2025, 11, 1));
        prop_assert!((QUALITY_VALUE_MIN..=QUALITY_VALUE_MAX).contains(&result.predicted_value));
        prop_assert!((0.0..=1.0).contains(&result.confidence));
        prop_assert!((0.0..=100.0).contains(&result.quality_score));
    }
}

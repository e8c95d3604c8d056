//! Built-in research reference catalog
//!
//! Fallback tier of the reference resolver. When the database has no
//! row for a cultivar, rootstock, region, or crop phenology, the
//! resolver degrades to these research-derived entries instead of
//! failing or inventing zeros. Values come from published cultivar
//! trials and extension phenology tables.

use shared::models::{
    ClimateZone, CropPhenology, CultivarQualityProfile, GddTargets, GrowingRegion,
    HeritageIntent, MaturityType, QualityTier, RipeningBehavior, Rootstock,
};

/// Look up a cultivar quality profile in the built-in catalog
pub fn cultivar(cultivar_id: &str) -> Option<CultivarQualityProfile> {
    let (name, crop, tier, intent, avg, peak, maturity, ripening) = match cultivar_id {
        "washington_navel" => (
            "Washington Navel",
            "navel_orange",
            QualityTier::Premium,
            HeritageIntent::FlavorBred,
            Some(12.5),
            Some(14.5),
            MaturityType::MidSeason,
            RipeningBehavior::NonClimacteric,
        ),
        "cara_cara" => (
            "Cara Cara Navel",
            "navel_orange",
            QualityTier::Artisan,
            HeritageIntent::FlavorBred,
            Some(13.0),
            Some(15.0),
            MaturityType::MidSeason,
            RipeningBehavior::NonClimacteric,
        ),
        "valencia" => (
            "Valencia",
            "valencia_orange",
            QualityTier::Standard,
            HeritageIntent::DualPurpose,
            Some(11.5),
            Some(13.0),
            MaturityType::LateSeason,
            RipeningBehavior::NonClimacteric,
        ),
        "tango" => (
            "Tango Mandarin",
            "mandarin",
            QualityTier::Premium,
            HeritageIntent::FlavorBred,
            Some(12.8),
            Some(14.0),
            MaturityType::MidSeason,
            RipeningBehavior::NonClimacteric,
        ),
        "chandler" => (
            "Chandler",
            "strawberry",
            QualityTier::Premium,
            HeritageIntent::FlavorBred,
            Some(9.5),
            Some(11.0),
            MaturityType::EarlySeason,
            RipeningBehavior::NonClimacteric,
        ),
        "albion" => (
            "Albion",
            "strawberry",
            QualityTier::Standard,
            HeritageIntent::DualPurpose,
            Some(8.5),
            Some(10.0),
            MaturityType::MidSeason,
            RipeningBehavior::NonClimacteric,
        ),
        "monterey" => (
            "Monterey",
            "strawberry",
            QualityTier::Standard,
            HeritageIntent::YieldShipping,
            Some(7.8),
            Some(9.0),
            MaturityType::MidSeason,
            RipeningBehavior::NonClimacteric,
        ),
        _ => return None,
    };
    Some(CultivarQualityProfile {
        cultivar_id: cultivar_id.to_string(),
        cultivar_name: name.to_string(),
        crop_id: crop.to_string(),
        tier,
        heritage_intent: intent,
        avg_brix: avg,
        peak_brix: peak,
        maturity,
        ripening,
    })
}

/// Look up a rootstock record in the built-in catalog
pub fn rootstock(rootstock_id: &str) -> Option<Rootstock> {
    let (name, brix_modifier, vigor, notes) = match rootstock_id {
        "trifoliate" => (
            "Trifoliate Orange",
            0.6,
            "low",
            Some("Cold hardy; concentrates solubles in fruit"),
        ),
        "c35_citrange" => ("C-35 Citrange", 0.3, "moderate", None),
        "swingle" => ("Swingle Citrumelo", 0.2, "moderate", None),
        "carrizo" => ("Carrizo Citrange", 0.0, "moderate", None),
        "macrophylla" => (
            "Alemow (Macrophylla)",
            -0.5,
            "high",
            Some("High yield; dilutes internal quality"),
        ),
        "rough_lemon" => (
            "Rough Lemon",
            -0.7,
            "high",
            Some("Vigorous; lowest fruit solubles of common stocks"),
        ),
        _ => return None,
    };
    Some(Rootstock {
        rootstock_id: rootstock_id.to_string(),
        rootstock_name: name.to_string(),
        brix_modifier,
        vigor: Some(vigor.to_string()),
        disease_notes: notes.map(str::to_string),
    })
}

/// Look up crop x region phenology in the built-in catalog
pub fn phenology(crop_id: &str, region_id: &str) -> Option<CropPhenology> {
    let (bloom_month, bloom_day, base, maturity, peak, width) = match (crop_id, region_id) {
        ("navel_orange", "central_valley") => (4, 1, 55.0, 2400.0, 2800.0, 900.0),
        ("valencia_orange", "central_valley") => (4, 10, 55.0, 3200.0, 3600.0, 1000.0),
        ("navel_orange", "indian_river") => (3, 20, 55.0, 2300.0, 2700.0, 900.0),
        ("mandarin", "central_valley") => (4, 5, 55.0, 2100.0, 2450.0, 700.0),
        ("strawberry", "salinas_valley") => (2, 15, 50.0, 600.0, 750.0, 300.0),
        ("strawberry", "central_valley") => (2, 1, 50.0, 550.0, 700.0, 300.0),
        ("blueberry", "willamette_valley") => (4, 15, 45.0, 900.0, 1050.0, 350.0),
        _ => return None,
    };
    Some(CropPhenology {
        crop_id: crop_id.to_string(),
        region_id: region_id.to_string(),
        bloom_month,
        bloom_day,
        gdd_base_temp_f: base,
        gdd_to_maturity: maturity,
        gdd_to_peak: peak,
        gdd_window_width: width,
        chill_hours_required: chill_hours(crop_id),
    })
}

fn chill_hours(crop_id: &str) -> Option<f64> {
    match crop_id {
        "blueberry" => Some(800.0),
        "strawberry" => Some(200.0),
        _ => None,
    }
}

/// Per-crop default GDD targets, used when no region-specific
/// phenology exists for a known crop
pub fn gdd_targets(crop_id: &str) -> Option<GddTargets> {
    let (base, maturity, peak, width) = match crop_id {
        "navel_orange" => (55.0, 2400.0, 2800.0, 900.0),
        "valencia_orange" => (55.0, 3200.0, 3600.0, 1000.0),
        "mandarin" => (55.0, 2100.0, 2450.0, 700.0),
        "strawberry" => (50.0, 600.0, 750.0, 300.0),
        "blueberry" => (45.0, 900.0, 1050.0, 350.0),
        _ => return None,
    };
    Some(GddTargets {
        crop_id: crop_id.to_string(),
        base_temp_f: base,
        gdd_to_maturity: maturity,
        gdd_to_peak: peak,
        gdd_window_width: width,
    })
}

/// Typical bloom date for a crop when no regional record supplies one
pub fn default_bloom(crop_id: &str) -> (u32, u32) {
    match crop_id {
        "strawberry" => (2, 15),
        "blueberry" => (4, 15),
        "valencia_orange" => (4, 10),
        _ => (3, 15),
    }
}

/// Look up a growing region in the built-in catalog
pub fn region(region_id: &str) -> Option<GrowingRegion> {
    let (name, zone) = match region_id {
        "central_valley" => ("California Central Valley", ClimateZone::Temperate),
        "indian_river" => ("Indian River District", ClimateZone::Subtropical),
        "salinas_valley" => ("Salinas Valley", ClimateZone::Temperate),
        "willamette_valley" => ("Willamette Valley", ClimateZone::Temperate),
        "rio_grande_valley" => ("Rio Grande Valley", ClimateZone::Subtropical),
        "yuma" => ("Yuma County", ClimateZone::Arid),
        _ => return None,
    };
    Some(GrowingRegion {
        region_id: region_id.to_string(),
        name: name.to_string(),
        climate_zone: zone,
        coordinates: None,
    })
}

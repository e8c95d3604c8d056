//! Cultivar and rootstock reference data

use serde::{Deserialize, Serialize};

/// Ordinal quality classification, independent of the numeric score
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum QualityTier {
    Artisan,
    Premium,
    Standard,
    Commodity,
}

impl QualityTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityTier::Artisan => "artisan",
            QualityTier::Premium => "premium",
            QualityTier::Standard => "standard",
            QualityTier::Commodity => "commodity",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "artisan" => QualityTier::Artisan,
            "premium" => QualityTier::Premium,
            "standard" => QualityTier::Standard,
            _ => QualityTier::Commodity,
        }
    }

    /// Numeric rank for comparison (higher is better)
    pub fn rank(&self) -> i32 {
        match self {
            QualityTier::Artisan => 4,
            QualityTier::Premium => 3,
            QualityTier::Standard => 2,
            QualityTier::Commodity => 1,
        }
    }

    /// Tier implied by a predicted quality value on the Brix-like scale
    pub fn from_quality_value(value: f64) -> Self {
        if value >= 14.0 {
            QualityTier::Artisan
        } else if value >= 12.0 {
            QualityTier::Premium
        } else if value >= 10.0 {
            QualityTier::Standard
        } else {
            QualityTier::Commodity
        }
    }
}

/// Why a cultivar was bred. Bounds the genetic quality ceiling:
/// varieties selected for yield and shipping tolerance trade away
/// flavor and nutrient density.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HeritageIntent {
    FlavorBred,
    NutritionBred,
    DualPurpose,
    YieldShipping,
    Unknown,
}

/// Relative position of the cultivar within its crop's season
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MaturityType {
    EarlySeason,
    MidSeason,
    LateSeason,
}

/// Post-harvest ripening behavior.
///
/// Climacteric crops keep ripening off the plant; non-climacteric
/// crops are fixed at harvest, so harvest timing is decisive.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RipeningBehavior {
    Climacteric,
    NonClimacteric,
}

/// Research-derived quality profile for a genetic variety
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CultivarQualityProfile {
    pub cultivar_id: String,
    pub cultivar_name: String,
    pub crop_id: String,
    pub tier: QualityTier,
    pub heritage_intent: HeritageIntent,
    /// Research-average Brix (or equivalent quality value)
    pub avg_brix: Option<f64>,
    /// Documented peak Brix under ideal conditions
    pub peak_brix: Option<f64>,
    pub maturity: MaturityType,
    pub ripening: RipeningBehavior,
}

impl CultivarQualityProfile {
    /// Base quality value for predictions: research average, falling
    /// back to the documented peak when no average exists
    pub fn base_quality_value(&self) -> Option<f64> {
        self.avg_brix.or(self.peak_brix)
    }
}

/// Graft base reference record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rootstock {
    pub rootstock_id: String,
    pub rootstock_name: String,
    /// Effect on internal quality, roughly -0.8 to +0.6 Brix
    pub brix_modifier: f64,
    pub vigor: Option<String>,
    pub disease_notes: Option<String>,
}

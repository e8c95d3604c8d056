//! Soil readings and agricultural practice flags
//!
//! Practices are a tagged union per product category: produce and
//! livestock carry different flags, and a request can only hold the
//! combination that makes sense for its category.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// How freely the soil drains
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DrainageClass {
    Well,
    Moderate,
    Poor,
}

/// Soil test results supplied with a prediction request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SoilReadings {
    #[validate(range(min = 0.0, max = 100.0))]
    pub organic_matter_pct: Option<f64>,
    #[validate(range(min = 0.0, max = 14.0))]
    pub ph: Option<f64>,
    pub drainage: Option<DrainageClass>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FertilityStrategy {
    Regenerative,
    Organic,
    Integrated,
    Conventional,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PestManagement {
    Organic,
    Integrated,
    Conventional,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IrrigationMethod {
    Drip,
    Rainfed,
    Flood,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FeedingRegime {
    GrassOnly,
    PastureWithGrain,
    GrainFed,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WelfareStandard {
    PastureRaised,
    FreeRange,
    Conventional,
}

/// Agricultural practice flags, split by product category
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum Practices {
    Produce {
        fertility: Option<FertilityStrategy>,
        pest_management: Option<PestManagement>,
        irrigation: Option<IrrigationMethod>,
    },
    Livestock {
        /// Pasture fertility management; organic claims here are
        /// cross-checked against the feeding regime
        fertility: Option<FertilityStrategy>,
        feeding: Option<FeedingRegime>,
        welfare: Option<WelfareStandard>,
    },
}

impl Practices {
    /// True when any flag is actually set
    pub fn has_data(&self) -> bool {
        match self {
            Practices::Produce {
                fertility,
                pest_management,
                irrigation,
            } => fertility.is_some() || pest_management.is_some() || irrigation.is_some(),
            Practices::Livestock {
                fertility,
                feeding,
                welfare,
            } => fertility.is_some() || feeding.is_some() || welfare.is_some(),
        }
    }

    /// True when an organic practice claim co-occurs with a grain-fed
    /// diet; the combination contradicts itself
    pub fn organic_grain_fed_conflict(&self) -> bool {
        matches!(
            self,
            Practices::Livestock {
                fertility: Some(FertilityStrategy::Organic | FertilityStrategy::Regenerative),
                feeding: Some(FeedingRegime::GrainFed),
                ..
            }
        )
    }

    /// Claimed feeding regime, for cross-checking against measured
    /// omega ratios
    pub fn claimed_feeding(&self) -> Option<FeedingRegime> {
        match self {
            Practices::Livestock { feeding, .. } => *feeding,
            Practices::Produce { .. } => None,
        }
    }
}

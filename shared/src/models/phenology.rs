//! Crop phenology reference data
//!
//! A phenology record ties a crop to a growing region: when it blooms
//! and how much accumulated heat it needs to reach harvestable maturity
//! and peak internal quality. These are immutable lookup records; the
//! prediction engine reads them and never writes them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Bloom date and GDD thresholds for a crop in a specific region
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CropPhenology {
    pub crop_id: String,
    pub region_id: String,
    /// Typical bloom month (1-12)
    pub bloom_month: u32,
    /// Typical bloom day of month
    pub bloom_day: u32,
    /// Base temperature for GDD accumulation (Fahrenheit)
    pub gdd_base_temp_f: f64,
    /// Accumulated GDD at which the crop becomes harvestable
    pub gdd_to_maturity: f64,
    /// Accumulated GDD at peak internal quality
    pub gdd_to_peak: f64,
    /// Width of the full harvest window in GDD units
    pub gdd_window_width: f64,
    /// Winter chill requirement, where the crop has one
    pub chill_hours_required: Option<f64>,
}

impl CropPhenology {
    /// Bloom date for a given calendar year
    pub fn bloom_date(&self, year: i32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(year, self.bloom_month, self.bloom_day)
    }

    /// Generic thresholds used when no crop x region record exists.
    ///
    /// Callers pairing this with a prediction lower the timing
    /// confidence and attach a warning; the fallback keeps the engine
    /// returning a best-effort answer instead of failing.
    pub fn generic_default(crop_id: &str, region_id: &str) -> Self {
        Self {
            crop_id: crop_id.to_string(),
            region_id: region_id.to_string(),
            bloom_month: 3,
            bloom_day: 15,
            gdd_base_temp_f: 50.0,
            gdd_to_maturity: 2000.0,
            gdd_to_peak: 2300.0,
            gdd_window_width: 800.0,
            chill_hours_required: None,
        }
    }

    /// GDD at which the harvest window closes
    pub fn gdd_window_end(&self) -> f64 {
        self.gdd_to_maturity + self.gdd_window_width
    }

    /// Lower edge of the peak sub-window (middle 50% of the window)
    pub fn gdd_peak_start(&self) -> f64 {
        self.gdd_to_peak - self.gdd_window_width / 4.0
    }

    /// Upper edge of the peak sub-window
    pub fn gdd_peak_end(&self) -> f64 {
        self.gdd_to_peak + self.gdd_window_width / 4.0
    }
}

/// Per-crop default GDD targets, applied when a region-specific
/// phenology record is missing but the crop itself is known
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GddTargets {
    pub crop_id: String,
    pub base_temp_f: f64,
    pub gdd_to_maturity: f64,
    pub gdd_to_peak: f64,
    pub gdd_window_width: f64,
}

impl GddTargets {
    /// Promote crop-level targets to a phenology record for a region
    pub fn into_phenology(self, region_id: &str, bloom_month: u32, bloom_day: u32) -> CropPhenology {
        CropPhenology {
            crop_id: self.crop_id,
            region_id: region_id.to_string(),
            bloom_month,
            bloom_day,
            gdd_base_temp_f: self.base_temp_f,
            gdd_to_maturity: self.gdd_to_maturity,
            gdd_to_peak: self.gdd_to_peak,
            gdd_window_width: self.gdd_window_width,
            chill_hours_required: None,
        }
    }
}

/// Broad climate classification for a growing region, used to estimate
/// typical daily GDD accumulation when observed weather is unavailable
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ClimateZone {
    Tropical,
    Subtropical,
    Arid,
    Temperate,
    Continental,
}

/// A growing region known to the platform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrowingRegion {
    pub region_id: String,
    pub name: String,
    pub climate_zone: ClimateZone,
    pub coordinates: Option<crate::types::GpsCoordinates>,
}

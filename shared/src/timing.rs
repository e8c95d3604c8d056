//! Harvest window classification and timing math
//!
//! The timing engine is a state machine over accumulated GDD. A crop
//! moves monotonically through the season states as heat accumulates;
//! classification is pure arithmetic against the phenology thresholds,
//! so the same inputs always classify the same way.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::calibration;
use crate::models::{ClimateZone, CropPhenology, GddAccumulation};

/// Where a crop sits in its season. Ordered: later variants mean more
/// accumulated heat, and a GDD total sitting exactly on a boundary
/// classifies into the later state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum HarvestWindowStatus {
    PreSeason,
    Approaching,
    HarvestWindow,
    Peak,
    LateSeason,
    PostSeason,
}

impl HarvestWindowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HarvestWindowStatus::PreSeason => "pre_season",
            HarvestWindowStatus::Approaching => "approaching",
            HarvestWindowStatus::HarvestWindow => "harvest_window",
            HarvestWindowStatus::Peak => "peak",
            HarvestWindowStatus::LateSeason => "late_season",
            HarvestWindowStatus::PostSeason => "post_season",
        }
    }

    /// True while harvesting makes commercial sense at all
    pub fn is_harvestable(&self) -> bool {
        matches!(
            self,
            HarvestWindowStatus::HarvestWindow
                | HarvestWindowStatus::Peak
                | HarvestWindowStatus::LateSeason
        )
    }
}

/// GDD at which the approaching state begins, as a fraction of the
/// maturity threshold
const APPROACHING_FRACTION: f64 = 0.8;

/// Classify accumulated GDD into a harvest window state.
///
/// The window opens at `gdd_to_maturity` and closes `gdd_window_width`
/// later; the peak sub-window is the middle 50% of the window, centered
/// on `gdd_to_peak`.
pub fn classify_window(current_gdd: f64, phenology: &CropPhenology) -> HarvestWindowStatus {
    let approaching_start = phenology.gdd_to_maturity * APPROACHING_FRACTION;
    if current_gdd < approaching_start {
        HarvestWindowStatus::PreSeason
    } else if current_gdd < phenology.gdd_to_maturity {
        HarvestWindowStatus::Approaching
    } else if current_gdd < phenology.gdd_peak_start() {
        HarvestWindowStatus::HarvestWindow
    } else if current_gdd < phenology.gdd_peak_end() {
        HarvestWindowStatus::Peak
    } else if current_gdd < phenology.gdd_window_end() {
        HarvestWindowStatus::LateSeason
    } else {
        HarvestWindowStatus::PostSeason
    }
}

/// Quality-value modifier for the current timing, in [-0.8, 0.0].
///
/// Piecewise linear and continuous: a fixed floor before the season,
/// ramping up through approaching and the early window, flat at zero
/// through peak, and ramping back down through late season to a fixed
/// post-season floor. Late harvest costs less than early harvest
/// because sugars have at least fully developed.
pub fn timing_modifier(current_gdd: f64, phenology: &CropPhenology) -> f64 {
    let approaching_start = phenology.gdd_to_maturity * APPROACHING_FRACTION;
    match classify_window(current_gdd, phenology) {
        HarvestWindowStatus::PreSeason => -0.8,
        HarvestWindowStatus::Approaching => {
            let span = phenology.gdd_to_maturity - approaching_start;
            let progress = if span > 0.0 {
                (current_gdd - approaching_start) / span
            } else {
                1.0
            };
            -0.8 + 0.5 * progress
        }
        HarvestWindowStatus::HarvestWindow => {
            let span = phenology.gdd_peak_start() - phenology.gdd_to_maturity;
            let progress = if span > 0.0 {
                (current_gdd - phenology.gdd_to_maturity) / span
            } else {
                1.0
            };
            -0.3 + 0.3 * progress
        }
        HarvestWindowStatus::Peak => 0.0,
        HarvestWindowStatus::LateSeason => {
            let span = phenology.gdd_window_end() - phenology.gdd_peak_end();
            let progress = if span > 0.0 {
                (current_gdd - phenology.gdd_peak_end()) / span
            } else {
                1.0
            };
            -0.5 * progress
        }
        HarvestWindowStatus::PostSeason => -0.5,
    }
}

/// Estimate GDD accumulation from bloom to a date using the typical
/// daily rate for the region's climate zone.
///
/// Used when no observed weather is available; the result is marked
/// `estimated` so downstream confidence can be lowered accordingly.
pub fn estimate_gdd(
    zone: Option<ClimateZone>,
    bloom: NaiveDate,
    as_of: NaiveDate,
) -> GddAccumulation {
    let days = (as_of - bloom).num_days().max(0);
    let rate = zone
        .map(calibration::zone_daily_gdd)
        .unwrap_or(calibration::GENERIC_DAILY_GDD);
    GddAccumulation {
        total_gdd: days as f64 * rate,
        avg_daily_gdd: rate,
        days,
        estimated: true,
    }
}

/// Projected dates for window open, peak quality, and window close
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HarvestProjection {
    pub window_start: Option<NaiveDate>,
    pub optimal: Option<NaiveDate>,
    pub window_end: Option<NaiveDate>,
}

/// Project calendar dates for the harvest window from the current
/// accumulation and its daily rate.
///
/// Targets already reached project to `as_of`. A zero daily rate
/// yields no projection at all.
pub fn project_harvest_dates(
    accumulation: &GddAccumulation,
    phenology: &CropPhenology,
    as_of: NaiveDate,
) -> HarvestProjection {
    let project = |target_gdd: f64| -> Option<NaiveDate> {
        accumulation
            .days_to_target(target_gdd)
            .and_then(|d| as_of.checked_add_signed(Duration::days(d)))
    };
    HarvestProjection {
        window_start: project(phenology.gdd_to_maturity),
        optimal: project(phenology.gdd_to_peak),
        window_end: project(phenology.gdd_window_end()),
    }
}

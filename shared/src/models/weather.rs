//! Weather observations and growing-degree-day accumulation
//!
//! GDD is the core mechanism for predicting harvest timing: crops
//! develop on accumulated heat, not calendar days. Temperatures are
//! Fahrenheit everywhere inside the platform; sources reporting in
//! Celsius are converted at the ingestion boundary.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One day of observed weather for a region
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyWeather {
    pub date: NaiveDate,
    pub temp_high_f: f64,
    pub temp_low_f: f64,
    pub precipitation_in: Option<Decimal>,
}

impl DailyWeather {
    /// Growing degree days contributed by this day:
    /// `max(0, (high + low) / 2 - base)`
    pub fn gdd(&self, base_temp_f: f64) -> f64 {
        let avg = (self.temp_high_f + self.temp_low_f) / 2.0;
        (avg - base_temp_f).max(0.0)
    }
}

/// Cumulative GDD from a reference date (typically bloom)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GddAccumulation {
    pub total_gdd: f64,
    pub avg_daily_gdd: f64,
    pub days: i64,
    /// True when the total was estimated from a climate-zone rate
    /// rather than summed from observed weather
    pub estimated: bool,
}

impl GddAccumulation {
    /// Sum observed days into an accumulation record
    pub fn from_observations(days: &[DailyWeather], base_temp_f: f64) -> Self {
        let total: f64 = days.iter().map(|d| d.gdd(base_temp_f)).sum();
        let n = days.len() as i64;
        Self {
            total_gdd: total,
            avg_daily_gdd: if n > 0 { total / n as f64 } else { 0.0 },
            days: n,
            estimated: false,
        }
    }

    /// Estimated days until a GDD target is reached, at the observed
    /// average daily rate. `None` when the rate is zero.
    pub fn days_to_target(&self, target_gdd: f64) -> Option<i64> {
        let remaining = target_gdd - self.total_gdd;
        if remaining <= 0.0 {
            return Some(0);
        }
        if self.avg_daily_gdd <= 0.0 {
            return None;
        }
        Some((remaining / self.avg_daily_gdd).ceil() as i64)
    }
}

/// A live reading from the weather source, with today's GDD already
/// computed against the crop's base temperature
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentReading {
    pub region_id: String,
    pub observed_at: NaiveDate,
    pub temp_f: f64,
    pub temp_high_f: f64,
    pub temp_low_f: f64,
    pub todays_gdd: f64,
}

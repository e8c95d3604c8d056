//! Weather API client for daily observations and GDD accumulation
//!
//! Integrates with the Open-Meteo archive and forecast APIs. All
//! temperatures are requested in Fahrenheit so the rest of the platform
//! never converts units; precipitation comes back in inches.

use chrono::NaiveDate;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::time::Duration;

use shared::models::{CurrentReading, DailyWeather, GddAccumulation};
use shared::types::GpsCoordinates;
use shared::validation::validate_date_range;

use crate::config::WeatherConfig;
use crate::error::{AppError, AppResult};

/// Weather API client
#[derive(Clone)]
pub struct WeatherClient {
    client: Client,
    archive_endpoint: String,
    forecast_endpoint: String,
}

/// Open-Meteo archive response
#[derive(Debug, Deserialize)]
struct OMArchiveResponse {
    daily: OMDaily,
}

#[derive(Debug, Deserialize)]
struct OMDaily {
    time: Vec<NaiveDate>,
    temperature_2m_max: Vec<Option<f64>>,
    temperature_2m_min: Vec<Option<f64>>,
    precipitation_sum: Vec<Option<f64>>,
}

/// Open-Meteo forecast response for current conditions
#[derive(Debug, Deserialize)]
struct OMCurrentResponse {
    current: OMCurrent,
    daily: OMDaily,
}

#[derive(Debug, Deserialize)]
struct OMCurrent {
    time: chrono::NaiveDateTime,
    temperature_2m: f64,
}

impl WeatherClient {
    /// Create a new WeatherClient from configuration
    pub fn new(config: &WeatherConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AppError::Configuration(format!("HTTP client build failed: {}", e)))?;
        Ok(Self {
            client,
            archive_endpoint: config.archive_endpoint.clone(),
            forecast_endpoint: config.forecast_endpoint.clone(),
        })
    }

    /// Create a WeatherClient against custom endpoints (for testing)
    pub fn with_endpoints(archive_endpoint: String, forecast_endpoint: String) -> Self {
        Self {
            client: Client::new(),
            archive_endpoint,
            forecast_endpoint,
        }
    }

    /// Fetch observed daily highs, lows, and precipitation for a
    /// coordinate across a date range
    pub async fn get_historical(
        &self,
        coordinates: &GpsCoordinates,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<DailyWeather>> {
        validate_date_range(start, end).map_err(|e| AppError::ValidationError(e.to_string()))?;

        let url = format!(
            "{}?latitude={}&longitude={}&start_date={}&end_date={}\
             &daily=temperature_2m_max,temperature_2m_min,precipitation_sum\
             &temperature_unit=fahrenheit&precipitation_unit=inch&timezone=auto",
            self.archive_endpoint, coordinates.latitude, coordinates.longitude, start, end
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|_| AppError::WeatherServiceUnavailable)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalService(format!(
                "Weather archive error: {} - {}",
                status, body
            )));
        }

        let data: OMArchiveResponse = response
            .json()
            .await
            .map_err(|e| AppError::ExternalService(format!("Failed to parse weather response: {}", e)))?;

        Ok(convert_daily(data.daily))
    }

    /// Fetch current conditions plus today's high/low, with today's GDD
    /// contribution already computed against the crop's base temperature
    pub async fn get_current(
        &self,
        region_id: &str,
        coordinates: &GpsCoordinates,
        gdd_base_temp_f: f64,
    ) -> AppResult<CurrentReading> {
        let url = format!(
            "{}?latitude={}&longitude={}&current=temperature_2m\
             &daily=temperature_2m_max,temperature_2m_min,precipitation_sum\
             &forecast_days=1&temperature_unit=fahrenheit&precipitation_unit=inch&timezone=auto",
            self.forecast_endpoint, coordinates.latitude, coordinates.longitude
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|_| AppError::WeatherServiceUnavailable)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalService(format!(
                "Weather forecast error: {} - {}",
                status, body
            )));
        }

        let data: OMCurrentResponse = response
            .json()
            .await
            .map_err(|e| AppError::ExternalService(format!("Failed to parse weather response: {}", e)))?;

        let today = convert_daily(data.daily).into_iter().next().ok_or_else(|| {
            AppError::ExternalService("Weather response missing today's observations".to_string())
        })?;

        Ok(CurrentReading {
            region_id: region_id.to_string(),
            observed_at: data.current.time.date(),
            temp_f: data.current.temperature_2m,
            temp_high_f: today.temp_high_f,
            temp_low_f: today.temp_low_f,
            todays_gdd: today.gdd(gdd_base_temp_f),
        })
    }

    /// Sum observed GDD from a reference date (typically bloom) up to
    /// an end date
    pub async fn get_gdd_accumulation(
        &self,
        coordinates: &GpsCoordinates,
        reference_date: NaiveDate,
        end_date: NaiveDate,
        gdd_base_temp_f: f64,
    ) -> AppResult<GddAccumulation> {
        let days = self
            .get_historical(coordinates, reference_date, end_date)
            .await?;
        Ok(GddAccumulation::from_observations(&days, gdd_base_temp_f))
    }
}

/// Flatten the parallel Open-Meteo arrays into daily records, skipping
/// days the archive has no temperatures for
fn convert_daily(daily: OMDaily) -> Vec<DailyWeather> {
    daily
        .time
        .into_iter()
        .zip(daily.temperature_2m_max)
        .zip(daily.temperature_2m_min)
        .zip(daily.precipitation_sum)
        .filter_map(|(((date, high), low), precip)| {
            let (high, low) = (high?, low?);
            Some(DailyWeather {
                date,
                temp_high_f: high,
                temp_low_f: low,
                precipitation_in: precip.and_then(Decimal::from_f64_retain),
            })
        })
        .collect()
}

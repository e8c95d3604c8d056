//! Quality prediction service
//!
//! Orchestrates a prediction request: resolves reference data through
//! the cached two-tier resolver, obtains GDD accumulation (caller
//! supplied, observed weather, or a climate-zone estimate, in that
//! order), runs the shared prediction math, and persists the result.

use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use shared::models::{
    CurrentReading, GddAccumulation, PredictionLayer, QualityPredictionInput,
    QualityPredictionResult,
};
use shared::predictor::{self, ResolvedReferences};
use shared::timing;
use shared::validation::validate_reference_id;

use crate::error::{AppError, AppResult};
use crate::external::WeatherClient;
use crate::reference::{PgReferenceSource, ReferenceResolver};

/// Prediction service
#[derive(Clone)]
pub struct PredictionService {
    db: PgPool,
    resolver: Arc<ReferenceResolver<PgReferenceSource>>,
    weather: WeatherClient,
}

/// A prediction together with its persisted identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredPrediction {
    pub id: Uuid,
    pub predicted_at: NaiveDate,
    pub layer: PredictionLayer,
    #[serde(flatten)]
    pub result: QualityPredictionResult,
}

impl PredictionService {
    pub fn new(
        db: PgPool,
        resolver: Arc<ReferenceResolver<PgReferenceSource>>,
        weather: WeatherClient,
    ) -> Self {
        Self {
            db,
            resolver,
            weather,
        }
    }

    /// Run and persist a quality prediction
    pub async fn predict(&self, input: QualityPredictionInput) -> AppResult<StoredPrediction> {
        input
            .validate()
            .map_err(|e| AppError::ValidationError(e.to_string()))?;
        let ids = [&input.cultivar_id, &input.crop_id, &input.region_id]
            .into_iter()
            .chain(input.rootstock_id.as_ref());
        for id in ids {
            validate_reference_id(id)
                .map_err(|e| AppError::ValidationError(format!("'{}': {}", id, e)))?;
        }

        let as_of = input.as_of.unwrap_or_else(|| Utc::now().date_naive());
        let refs = self
            .resolver
            .resolve(
                &input.cultivar_id,
                &input.crop_id,
                &input.region_id,
                input.rootstock_id.as_deref(),
            )
            .await?;

        let accumulation = self.obtain_gdd(&input, &refs, as_of).await;
        let result = predictor::predict(&input, &refs, &accumulation, as_of);

        tracing::info!(
            cultivar_id = %input.cultivar_id,
            region_id = %input.region_id,
            predicted_value = result.predicted_value,
            confidence = result.confidence,
            status = result.timing.status.as_str(),
            "prediction computed"
        );

        self.persist(&input, &result, as_of).await
    }

    /// Live conditions for a region, with today's GDD contribution
    /// computed against the crop's base temperature
    pub async fn current_conditions(
        &self,
        crop_id: &str,
        region_id: &str,
    ) -> AppResult<CurrentReading> {
        let region = self
            .resolver
            .region(region_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("region {region_id}")))?;
        let coordinates = region.coordinates.ok_or_else(|| {
            AppError::ValidationError(format!(
                "region '{region_id}' has no coordinates for weather lookup"
            ))
        })?;
        let (phenology, _) = self.resolver.resolve_phenology(crop_id, region_id).await?;

        self.weather
            .get_current(region_id, &coordinates, phenology.gdd_base_temp_f)
            .await
    }

    /// GDD precedence: caller supplied, then observed weather, then the
    /// climate-zone estimate. Weather failures degrade, they never fail
    /// the prediction.
    async fn obtain_gdd(
        &self,
        input: &QualityPredictionInput,
        refs: &ResolvedReferences,
        as_of: NaiveDate,
    ) -> GddAccumulation {
        let bloom = bloom_before(&refs.phenology, as_of);

        if let Some(total) = input.current_gdd {
            let days = bloom.map(|b| (as_of - b).num_days().max(1)).unwrap_or(1);
            return GddAccumulation {
                total_gdd: total,
                avg_daily_gdd: total / days as f64,
                days,
                estimated: false,
            };
        }

        let Some(bloom) = bloom else {
            return timing::estimate_gdd(refs.climate_zone, as_of, as_of);
        };

        // Observed weather needs coordinates; regions resolved from the
        // built-in catalog carry none
        if let Some(coordinates) = &refs.coordinates {
            match self
                .weather
                .get_gdd_accumulation(coordinates, bloom, as_of, refs.phenology.gdd_base_temp_f)
                .await
            {
                Ok(acc) => return acc,
                Err(e) => {
                    tracing::warn!(error = %e, "weather lookup failed, estimating GDD");
                }
            }
        }

        timing::estimate_gdd(refs.climate_zone, bloom, as_of)
    }

    async fn persist(
        &self,
        input: &QualityPredictionInput,
        result: &QualityPredictionResult,
        as_of: NaiveDate,
    ) -> AppResult<StoredPrediction> {
        let id = Uuid::new_v4();
        let layer = PredictionLayer::ResearchBaseline;
        let factors = serde_json::json!({
            "heritage": result.heritage,
            "soil": result.soil,
            "practices": result.practices,
            "timing": result.timing,
            "measurement": result.measurement,
        });
        let warnings = serde_json::to_value(&result.warnings)
            .map_err(|e| AppError::Internal(format!("warning serialization failed: {}", e)))?;

        sqlx::query(
            r#"
            INSERT INTO quality_predictions (
                id, cultivar_id, crop_id, region_id, rootstock_id, layer,
                predicted_value, quality_score, tier, confidence,
                harvest_status, current_gdd, gdd_estimated,
                factors, warnings,
                optimal_harvest_date, window_start, window_end,
                predicted_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13,
                    $14, $15, $16, $17, $18, $19)
            "#,
        )
        .bind(id)
        .bind(&input.cultivar_id)
        .bind(&input.crop_id)
        .bind(&input.region_id)
        .bind(&input.rootstock_id)
        .bind(layer.as_str())
        .bind(result.predicted_value)
        .bind(result.quality_score)
        .bind(result.tier.as_str())
        .bind(result.confidence)
        .bind(result.timing.status.as_str())
        .bind(result.timing.current_gdd)
        .bind(result.timing.gdd_estimated)
        .bind(factors)
        .bind(warnings)
        .bind(result.optimal_harvest_date)
        .bind(result.window_start)
        .bind(result.window_end)
        .bind(as_of)
        .execute(&self.db)
        .await?;

        Ok(StoredPrediction {
            id,
            predicted_at: as_of,
            layer,
            result: result.clone(),
        })
    }
}

/// Most recent bloom on or before `as_of`: this year's bloom date, or
/// last year's when the date falls before bloom (citrus harvested in
/// winter bloomed the previous spring)
fn bloom_before(
    phenology: &shared::models::CropPhenology,
    as_of: NaiveDate,
) -> Option<NaiveDate> {
    let this_year = phenology.bloom_date(as_of.year())?;
    if as_of >= this_year {
        Some(this_year)
    } else {
        phenology.bloom_date(as_of.year() - 1)
    }
}

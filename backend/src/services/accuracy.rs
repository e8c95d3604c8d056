//! Prediction accuracy service
//!
//! Records real-world measurements against stored predictions and
//! generates append-only accuracy reports over a scope and period. The
//! statistics themselves live in `shared::metrics`; this service owns
//! the pair loading and report persistence.

use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use shared::metrics::{calculate_metrics, check_alerts, determine_trend, tier_accuracy};
use shared::validation::{is_matchable_measurement, MEASUREMENT_MATCH_WINDOW_DAYS};
use shared::models::{
    AccuracyMetrics, AccuracyReport, PredictionActualPair, PredictionLayer, QualityTier,
    ReportPeriod, ReportScope, SourceType, TierAccuracy, TrendDirection,
};

use crate::error::{AppError, AppResult};

/// Accuracy evaluation service
#[derive(Clone)]
pub struct AccuracyService {
    db: PgPool,
}

/// A new real-world measurement to record against a prediction
#[derive(Debug, Clone, Deserialize)]
pub struct NewMeasurement {
    pub prediction_id: Uuid,
    /// Measured quality value on the same scale the prediction used
    pub actual_value: f64,
    pub source_type: SourceType,
    pub measured_at: NaiveDate,
    pub notes: Option<String>,
}

/// Filter for listing stored reports
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportFilter {
    pub cultivar_id: Option<String>,
    pub region_id: Option<String>,
    pub layer: Option<PredictionLayer>,
    pub source_type: Option<SourceType>,
    pub period: Option<ReportPeriod>,
    pub limit: Option<i64>,
}

#[derive(Debug, sqlx::FromRow)]
struct PairRow {
    prediction_id: Uuid,
    predicted_value: f64,
    actual_value: f64,
    confidence: f64,
    predicted_at: NaiveDate,
    measured_at: NaiveDate,
    tier: Option<String>,
}

impl From<PairRow> for PredictionActualPair {
    fn from(row: PairRow) -> Self {
        PredictionActualPair {
            prediction_id: row.prediction_id,
            predicted_value: row.predicted_value,
            actual_value: row.actual_value,
            confidence: row.confidence,
            predicted_at: row.predicted_at,
            measured_at: row.measured_at,
            tier: row.tier.as_deref().map(QualityTier::from_str),
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ReportRow {
    id: Uuid,
    cultivar_id: Option<String>,
    region_id: Option<String>,
    layer: Option<String>,
    source_type: Option<String>,
    period: String,
    period_start: NaiveDate,
    period_end: NaiveDate,
    metrics: serde_json::Value,
    tier_accuracy: serde_json::Value,
    trend: String,
    trend_change_pct: f64,
    alert_triggered: bool,
    needs_retraining: bool,
    alert_reasons: Option<String>,
    generated_at: chrono::DateTime<Utc>,
}

impl TryFrom<ReportRow> for AccuracyReport {
    type Error = AppError;

    fn try_from(row: ReportRow) -> Result<Self, Self::Error> {
        let metrics: AccuracyMetrics = serde_json::from_value(row.metrics)
            .map_err(|e| AppError::Internal(format!("stored metrics corrupt: {}", e)))?;
        let tier_accuracy: Vec<TierAccuracy> = serde_json::from_value(row.tier_accuracy)
            .map_err(|e| AppError::Internal(format!("stored tier accuracy corrupt: {}", e)))?;
        Ok(AccuracyReport {
            id: row.id,
            scope: ReportScope {
                cultivar_id: row.cultivar_id,
                region_id: row.region_id,
                layer: row.layer.as_deref().map(PredictionLayer::from_str),
                source_type: row.source_type.as_deref().map(SourceType::from_str),
            },
            period: ReportPeriod::from_str(&row.period),
            period_start: row.period_start,
            period_end: row.period_end,
            metrics,
            tier_accuracy,
            trend: TrendDirection::from_str(&row.trend),
            trend_change_pct: row.trend_change_pct,
            alert_triggered: row.alert_triggered,
            needs_retraining: row.needs_retraining,
            alert_reasons: row.alert_reasons,
            generated_at: row.generated_at,
        })
    }
}

impl AccuracyService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Record a real-world measurement against a stored prediction.
    ///
    /// The measurement must land on the prediction date or within the
    /// match window after it; anything else cannot be the same harvest.
    pub async fn record_measurement(&self, measurement: NewMeasurement) -> AppResult<Uuid> {
        if !(0.0..=100.0).contains(&measurement.actual_value) {
            return Err(AppError::ValidationError(
                "actual value out of plausible range".to_string(),
            ));
        }

        let predicted_at: Option<NaiveDate> =
            sqlx::query_scalar("SELECT predicted_at FROM quality_predictions WHERE id = $1")
                .bind(measurement.prediction_id)
                .fetch_optional(&self.db)
                .await?;
        let predicted_at = predicted_at.ok_or_else(|| {
            AppError::NotFound(format!("prediction {}", measurement.prediction_id))
        })?;

        if !is_matchable_measurement(predicted_at, measurement.measured_at) {
            return Err(AppError::ValidationError(format!(
                "measurement dated {} cannot match a prediction made {}; \
                 the match window is {} days",
                measurement.measured_at, predicted_at, MEASUREMENT_MATCH_WINDOW_DAYS
            )));
        }

        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO actual_measurements (
                id, prediction_id, actual_value, source_type, measured_at, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(id)
        .bind(measurement.prediction_id)
        .bind(measurement.actual_value)
        .bind(measurement.source_type.as_str())
        .bind(measurement.measured_at)
        .bind(&measurement.notes)
        .execute(&self.db)
        .await?;

        Ok(id)
    }

    /// Generate and persist one accuracy report for a scope and period.
    ///
    /// Returns `None` when no matched pairs fall inside the period;
    /// nothing is persisted in that case. Each call inserts a fresh
    /// report row, never updating an earlier one.
    pub async fn generate_report(
        &self,
        scope: ReportScope,
        period: ReportPeriod,
    ) -> AppResult<Option<AccuracyReport>> {
        let period_end = Utc::now().date_naive();
        let period_start = match period.lookback_days() {
            Some(days) => period_end - chrono::Duration::days(days),
            None => NaiveDate::from_ymd_opt(1970, 1, 1)
                .ok_or_else(|| AppError::Internal("epoch date construction failed".to_string()))?,
        };

        let pairs = self.load_pairs(&scope, period_start, period_end).await?;
        if pairs.is_empty() {
            tracing::info!(period = period.as_str(), "no matched pairs in period, skipping report");
            return Ok(None);
        }

        let metrics = calculate_metrics(&pairs);
        let tiers = tier_accuracy(&pairs);
        let prior_mae = self.latest_prior_mae(&scope, period).await?;
        let (trend, trend_change_pct) = determine_trend(metrics.mae, prior_mae);
        let alerts = check_alerts(&metrics, prior_mae);

        let report = AccuracyReport {
            id: Uuid::new_v4(),
            scope,
            period,
            period_start,
            period_end,
            metrics,
            tier_accuracy: tiers,
            trend,
            trend_change_pct,
            alert_triggered: alerts.alert_triggered,
            needs_retraining: alerts.needs_retraining,
            alert_reasons: if alerts.reasons.is_empty() {
                None
            } else {
                Some(alerts.reasons.join("; "))
            },
            generated_at: Utc::now(),
        };
        self.insert_report(&report).await?;

        tracing::info!(
            report_id = %report.id,
            mae = report.metrics.mae,
            samples = report.metrics.sample_count,
            alert = report.alert_triggered,
            "accuracy report generated"
        );
        Ok(Some(report))
    }

    /// List stored reports, newest first
    pub async fn list_reports(&self, filter: ReportFilter) -> AppResult<Vec<AccuracyReport>> {
        self.query_reports(filter, false).await
    }

    /// List stored reports that triggered an alert, newest first
    pub async fn list_alerting_reports(
        &self,
        filter: ReportFilter,
    ) -> AppResult<Vec<AccuracyReport>> {
        self.query_reports(filter, true).await
    }

    async fn load_pairs(
        &self,
        scope: &ReportScope,
        period_start: NaiveDate,
        period_end: NaiveDate,
    ) -> AppResult<Vec<PredictionActualPair>> {
        let rows = sqlx::query_as::<_, PairRow>(
            r#"
            SELECT p.id AS prediction_id,
                   p.predicted_value,
                   a.actual_value,
                   p.confidence,
                   p.predicted_at,
                   a.measured_at,
                   p.tier
            FROM actual_measurements a
            JOIN quality_predictions p ON p.id = a.prediction_id
            WHERE a.measured_at >= $1
              AND a.measured_at <= $2
              AND ($3::text IS NULL OR p.cultivar_id = $3)
              AND ($4::text IS NULL OR p.region_id = $4)
              AND ($5::text IS NULL OR p.layer = $5)
              AND ($6::text IS NULL OR a.source_type = $6)
            ORDER BY a.measured_at
            "#,
        )
        .bind(period_start)
        .bind(period_end)
        .bind(&scope.cultivar_id)
        .bind(&scope.region_id)
        .bind(scope.layer.map(|l| l.as_str()))
        .bind(scope.source_type.map(|s| s.as_str()))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// MAE of the most recent report with the same scope and period
    async fn latest_prior_mae(
        &self,
        scope: &ReportScope,
        period: ReportPeriod,
    ) -> AppResult<Option<f64>> {
        let mae: Option<f64> = sqlx::query_scalar(
            r#"
            SELECT (metrics->>'mae')::double precision
            FROM accuracy_reports
            WHERE period = $1
              AND cultivar_id IS NOT DISTINCT FROM $2
              AND region_id IS NOT DISTINCT FROM $3
              AND layer IS NOT DISTINCT FROM $4
              AND source_type IS NOT DISTINCT FROM $5
            ORDER BY generated_at DESC
            LIMIT 1
            "#,
        )
        .bind(period.as_str())
        .bind(&scope.cultivar_id)
        .bind(&scope.region_id)
        .bind(scope.layer.map(|l| l.as_str()))
        .bind(scope.source_type.map(|s| s.as_str()))
        .fetch_optional(&self.db)
        .await?;
        Ok(mae)
    }

    async fn insert_report(&self, report: &AccuracyReport) -> AppResult<()> {
        let metrics = serde_json::to_value(&report.metrics)
            .map_err(|e| AppError::Internal(format!("metrics serialization failed: {}", e)))?;
        let tiers = serde_json::to_value(&report.tier_accuracy)
            .map_err(|e| AppError::Internal(format!("tier serialization failed: {}", e)))?;

        sqlx::query(
            r#"
            INSERT INTO accuracy_reports (
                id, cultivar_id, region_id, layer, source_type,
                period, period_start, period_end,
                metrics, tier_accuracy,
                trend, trend_change_pct,
                alert_triggered, needs_retraining, alert_reasons,
                generated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12,
                    $13, $14, $15, $16)
            "#,
        )
        .bind(report.id)
        .bind(&report.scope.cultivar_id)
        .bind(&report.scope.region_id)
        .bind(report.scope.layer.map(|l| l.as_str()))
        .bind(report.scope.source_type.map(|s| s.as_str()))
        .bind(report.period.as_str())
        .bind(report.period_start)
        .bind(report.period_end)
        .bind(metrics)
        .bind(tiers)
        .bind(report.trend.as_str())
        .bind(report.trend_change_pct)
        .bind(report.alert_triggered)
        .bind(report.needs_retraining)
        .bind(&report.alert_reasons)
        .bind(report.generated_at)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    async fn query_reports(
        &self,
        filter: ReportFilter,
        alerting_only: bool,
    ) -> AppResult<Vec<AccuracyReport>> {
        let limit = filter.limit.unwrap_or(50).clamp(1, 500);
        let rows = sqlx::query_as::<_, ReportRow>(
            r#"
            SELECT id, cultivar_id, region_id, layer, source_type,
                   period, period_start, period_end,
                   metrics, tier_accuracy,
                   trend, trend_change_pct,
                   alert_triggered, needs_retraining, alert_reasons,
                   generated_at
            FROM accuracy_reports
            WHERE ($1::text IS NULL OR cultivar_id = $1)
              AND ($2::text IS NULL OR region_id = $2)
              AND ($3::text IS NULL OR layer = $3)
              AND ($4::text IS NULL OR source_type = $4)
              AND ($5::text IS NULL OR period = $5)
              AND (NOT $6 OR alert_triggered)
            ORDER BY generated_at DESC
            LIMIT $7
            "#,
        )
        .bind(&filter.cultivar_id)
        .bind(&filter.region_id)
        .bind(filter.layer.map(|l| l.as_str()))
        .bind(filter.source_type.map(|s| s.as_str()))
        .bind(filter.period.map(|p| p.as_str()))
        .bind(alerting_only)
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_filter_carries_every_scope_dimension() {
        let filter: ReportFilter = serde_json::from_value(serde_json::json!({
            "cultivar_id": "washington_navel",
            "region_id": "central_valley",
            "layer": "regional_calibrated",
            "source_type": "lab_verified",
            "period": "monthly",
            "limit": 10
        }))
        .unwrap();

        assert_eq!(filter.cultivar_id.as_deref(), Some("washington_navel"));
        assert_eq!(filter.layer, Some(PredictionLayer::RegionalCalibrated));
        assert_eq!(filter.source_type, Some(SourceType::LabVerified));
        assert_eq!(filter.period, Some(ReportPeriod::Monthly));
    }

    #[test]
    fn empty_filter_means_no_scoping() {
        let filter = ReportFilter::default();
        assert!(filter.layer.is_none());
        assert!(filter.source_type.is_none());
        assert!(filter.period.is_none());
    }
}

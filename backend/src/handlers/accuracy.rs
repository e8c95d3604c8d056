//! HTTP handlers for measurement recording and accuracy reporting

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared::models::{AccuracyReport, ReportPeriod, ReportScope};

use crate::error::{AppError, AppResult};
use crate::services::accuracy::{NewMeasurement, ReportFilter};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct MeasurementRecorded {
    pub id: Uuid,
}

/// Record a real-world measurement against a stored prediction
pub async fn record_measurement(
    State(state): State<AppState>,
    Json(input): Json<NewMeasurement>,
) -> AppResult<Json<MeasurementRecorded>> {
    let id = state.accuracy.record_measurement(input).await?;
    Ok(Json(MeasurementRecorded { id }))
}

#[derive(Debug, Deserialize)]
pub struct GenerateReportRequest {
    #[serde(default)]
    pub scope: ReportScope,
    pub period: ReportPeriod,
}

/// Generate and persist an accuracy report for a scope and period
pub async fn generate_report(
    State(state): State<AppState>,
    Json(request): Json<GenerateReportRequest>,
) -> AppResult<Json<AccuracyReport>> {
    let report = state
        .accuracy
        .generate_report(request.scope, request.period)
        .await?
        .ok_or_else(|| {
            AppError::NotFound("no matched measurements in the requested period".to_string())
        })?;
    Ok(Json(report))
}

/// List stored reports, newest first
pub async fn list_reports(
    State(state): State<AppState>,
    Query(filter): Query<ReportFilter>,
) -> AppResult<Json<Vec<AccuracyReport>>> {
    let reports = state.accuracy.list_reports(filter).await?;
    Ok(Json(reports))
}

/// List stored reports that raised an alert, newest first
pub async fn list_alerting_reports(
    State(state): State<AppState>,
    Query(filter): Query<ReportFilter>,
) -> AppResult<Json<Vec<AccuracyReport>>> {
    let reports = state.accuracy.list_alerting_reports(filter).await?;
    Ok(Json(reports))
}

//! HTTP handlers for weather lookups

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use shared::models::CurrentReading;

use crate::error::AppResult;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CurrentConditionsQuery {
    pub crop_id: String,
    pub region_id: String,
}

/// Current conditions for a region, with today's GDD contribution
/// against the crop's base temperature
pub async fn get_current_conditions(
    State(state): State<AppState>,
    Query(query): Query<CurrentConditionsQuery>,
) -> AppResult<Json<CurrentReading>> {
    let reading = state
        .predictions
        .current_conditions(&query.crop_id, &query.region_id)
        .await?;
    Ok(Json(reading))
}

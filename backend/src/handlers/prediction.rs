//! HTTP handlers for quality prediction endpoints

use axum::{extract::State, Json};

use shared::models::QualityPredictionInput;

use crate::error::AppResult;
use crate::services::prediction::StoredPrediction;
use crate::AppState;

/// Run a quality prediction and persist the result
pub async fn create_prediction(
    State(state): State<AppState>,
    Json(input): Json<QualityPredictionInput>,
) -> AppResult<Json<StoredPrediction>> {
    let prediction = state.predictions.predict(input).await?;
    Ok(Json(prediction))
}

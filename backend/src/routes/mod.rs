//! Route definitions for the Harvest Quality Prediction Platform

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Quality predictions
        .route("/predictions", post(handlers::create_prediction))
        // Real-world measurements recorded against predictions
        .route("/measurements", post(handlers::record_measurement))
        // Accuracy reports
        .route(
            "/reports",
            post(handlers::generate_report).get(handlers::list_reports),
        )
        .route("/reports/alerts", get(handlers::list_alerting_reports))
        // Live weather conditions
        .route("/weather/current", get(handlers::get_current_conditions))
}

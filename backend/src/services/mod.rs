//! Business logic services for the Harvest Quality Prediction Platform

pub mod accuracy;
pub mod prediction;

pub use accuracy::AccuracyService;
pub use prediction::PredictionService;

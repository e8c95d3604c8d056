//! Shared types and models for the Harvest Quality Prediction Platform
//!
//! This crate contains the domain models and the pure prediction math
//! shared between the backend and other components of the system.

pub mod calibration;
pub mod metrics;
pub mod models;
pub mod predictor;
pub mod timing;
pub mod types;
pub mod validation;

pub use metrics::*;
pub use models::*;
pub use predictor::*;
pub use timing::*;
pub use types::*;
pub use validation::*;

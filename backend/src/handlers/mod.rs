//! HTTP request handlers for the Harvest Quality Prediction Platform

pub mod accuracy;
pub mod health;
pub mod prediction;
pub mod weather;

pub use accuracy::*;
pub use health::*;
pub use prediction::*;
pub use weather::*;

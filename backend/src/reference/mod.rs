//! Reference data resolution for the Harvest Quality Prediction Platform

pub mod cache;
pub mod catalog;
pub mod resolver;

pub use cache::{Clock, SystemClock, TtlCache};
pub use resolver::{PgReferenceSource, ReferenceResolver, ReferenceSource};

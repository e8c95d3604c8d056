//! Domain models for the Harvest Quality Prediction Platform

mod accuracy;
mod cultivar;
mod phenology;
mod practices;
mod prediction;
mod weather;

pub use accuracy::*;
pub use cultivar::*;
pub use phenology::*;
pub use practices::*;
pub use prediction::*;
pub use weather::*;

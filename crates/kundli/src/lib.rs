pub mod error;
pub mod ephemeris;
pub mod geo;
pub mod vedic;
pub mod transit;
pub mod western;
pub mod signals;
pub mod predictions;
pub mod insights;
pub mod cache;
pub mod pipeline;

#[cfg(test)]
mod test_support;

pub use error::{KundliError, Result};
pub use ephemeris::{EphemerisAdapter, FrameEphemeris, GeoLocation, HouseSystem};
pub use geo::{BirthInput, Geocoder, StaticGeocoder};
pub use pipeline::{ChartPipeline, HoroscopeReport};
pub use predictions::{PredictionEngine, RuleSet, Timeframe};
pub use vedic::{Body, NatalChart, Sign};
pub use western::{build_western_chart, WesternChart};

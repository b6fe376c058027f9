//! Data models for `TempGraph`
//!
//! - Place: a geocoded city with coordinates
//! - Forecast: the index-aligned daily maximum-temperature series
//! - Category: per-point threshold classification

pub mod category;
pub mod forecast;
pub mod place;

pub use category::{PointCategory, classify};
pub use forecast::ForecastSeries;
pub use place::Place;

//! Upstream weather services
//!
//! The pipeline talks to two seams: a [`Geocoder`] turning a typed name into
//! a [`Place`], and a [`ForecastSource`] turning a place into a daily
//! [`ForecastSeries`]. [`open_meteo`] implements both over HTTP.

use async_trait::async_trait;

use crate::models::{ForecastSeries, Place};

pub mod open_meteo;

pub use open_meteo::{OpenMeteoForecast, OpenMeteoGeocoder};

/// Resolves free text to the single best-matching place
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolve `name`, failing with `NotFound` when nothing matches
    async fn resolve(&self, name: &str) -> crate::Result<Place>;
}

/// Retrieves the daily maximum-temperature series for a place
#[async_trait]
pub trait ForecastSource: Send + Sync {
    /// Fetch the series in the place's local timezone
    async fn fetch_daily(&self, place: &Place) -> crate::Result<ForecastSeries>;
}

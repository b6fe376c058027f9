//! `TempGraph` - daily maximum temperatures for a city, charted
//!
//! This library resolves a typed city name through Open-Meteo geocoding,
//! fetches its daily maximum-temperature forecast and renders it as a line
//! chart with threshold-colored points, behind a small web page.

pub mod api;
pub mod app;
pub mod chart;
pub mod config;
pub mod error;
pub mod models;
pub mod page;
pub mod telemetry;
pub mod validation;
pub mod view;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use app::TemperatureApp;
pub use chart::{ChartRenderer, ChartResource, LineChart};
pub use config::TempGraphConfig;
pub use error::TempGraphError;
pub use models::{ForecastSeries, Place, PointCategory, classify};
pub use view::{PageRegions, Region, RegionSurface, ViewController, ViewState};
pub use weather::{ForecastSource, Geocoder};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, TempGraphError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}

//! Daily maximum-temperature series

use crate::TempGraphError;
use chrono::NaiveDate;
use serde::Serialize;

/// Index-aligned dates and daily maximum temperatures.
///
/// Both sequences are non-empty and of equal length. Dates are kept as the
/// service sent them, in the service's order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastSeries {
    dates: Vec<String>,
    max_temps: Vec<f64>,
}

impl ForecastSeries {
    /// Build a series, rejecting anything that cannot be charted.
    pub fn new(dates: Vec<String>, max_temps: Vec<f64>) -> crate::Result<Self> {
        if dates.len() != max_temps.len() {
            return Err(TempGraphError::malformed(format!(
                "{} dates but {} temperatures",
                dates.len(),
                max_temps.len()
            )));
        }
        if dates.is_empty() {
            return Err(TempGraphError::malformed("empty daily series"));
        }
        if let Some(bad) = dates
            .iter()
            .find(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").is_err())
        {
            return Err(TempGraphError::malformed(format!("invalid date '{bad}'")));
        }
        if let Some(index) = max_temps.iter().position(|t| !t.is_finite()) {
            return Err(TempGraphError::malformed(format!(
                "non-finite temperature at index {index}"
            )));
        }

        Ok(Self { dates, max_temps })
    }

    #[must_use]
    pub fn dates(&self) -> &[String] {
        &self.dates
    }

    #[must_use]
    pub fn max_temps(&self) -> &[f64] {
        &self.max_temps
    }

    /// Number of days in the series (never zero)
    #[must_use]
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Iterate over `(date, max_temp)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.dates
            .iter()
            .map(String::as_str)
            .zip(self.max_temps.iter().copied())
    }

    /// Highest temperature in the whole series
    #[must_use]
    pub fn peak(&self) -> f64 {
        self.max_temps
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max)
    }
}

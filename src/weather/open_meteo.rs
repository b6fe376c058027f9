//! Open-Meteo geocoding and forecast clients
//!
//! Both clients make a single attempt per call. Transport failures and
//! non-2xx statuses become `Network` errors, bodies that do not have the
//! expected shape become `MalformedResponse` errors.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, error, info, instrument, warn};

use super::{ForecastSource, Geocoder};
use crate::TempGraphError;
use crate::config::{ForecastConfig, GeocodingConfig, HttpConfig};
use crate::models::{ForecastSeries, Place};

const SLOW_RESPONSE: Duration = Duration::from_secs(5);

/// Build the HTTP client shared by both Open-Meteo clients
pub fn build_http_client(config: &HttpConfig) -> crate::Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds.into()))
        .user_agent(config.user_agent.as_str())
        .build()
        .map_err(|e| TempGraphError::config(format!("Failed to create HTTP client: {e}")))
}

async fn get_json<T: DeserializeOwned>(client: &Client, url: &str) -> crate::Result<T> {
    debug!("Open-Meteo request URL: {}", url);
    let start_time = Instant::now();

    let response = client.get(url).send().await.map_err(|e| {
        warn!("Request to Open-Meteo failed: {}", e);
        TempGraphError::network(e.to_string())
    })?;

    let status = response.status();
    if !status.is_success() {
        warn!("Open-Meteo returned status {}", status);
        return Err(TempGraphError::network(format!("HTTP {status}")));
    }

    let body = response
        .text()
        .await
        .map_err(|e| TempGraphError::network(e.to_string()))?;

    let elapsed = start_time.elapsed();
    if elapsed > SLOW_RESPONSE {
        warn!("Slow Open-Meteo response: {:.3}s", elapsed.as_secs_f64());
    }

    serde_json::from_str(&body).map_err(|e| {
        error!("Failed to parse Open-Meteo response: {}", e);
        TempGraphError::malformed(e.to_string())
    })
}

fn trim_base(base_url: &str) -> &str {
    base_url.trim_end_matches('/')
}

/// Geocoder backed by the Open-Meteo search endpoint
#[derive(Debug, Clone)]
pub struct OpenMeteoGeocoder {
    client: Client,
    base_url: String,
    language: String,
}

impl OpenMeteoGeocoder {
    #[must_use]
    pub fn new(client: Client, config: &GeocodingConfig) -> Self {
        Self {
            client,
            base_url: trim_base(&config.base_url).to_string(),
            language: config.language.clone(),
        }
    }

    fn search_url(&self, name: &str) -> String {
        format!(
            "{}/search?name={}&count=1&language={}&format=json",
            self.base_url,
            urlencoding::encode(name),
            urlencoding::encode(&self.language)
        )
    }
}

#[async_trait]
impl Geocoder for OpenMeteoGeocoder {
    #[instrument(skip(self))]
    async fn resolve(&self, name: &str) -> crate::Result<Place> {
        let response: wire::GeocodingResponse = get_json(&self.client, &self.search_url(name)).await?;

        let place: Place = response
            .results
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or_else(|| TempGraphError::not_found(name))?
            .into();

        if !place.has_valid_coordinates() {
            return Err(TempGraphError::malformed(format!(
                "coordinates out of range for '{}': {}",
                place.name,
                place.format_coordinates()
            )));
        }

        info!("Resolved '{}' to {} ({})", name, place.name, place.format_coordinates());
        Ok(place)
    }
}

/// Daily forecast backed by the Open-Meteo forecast endpoint
#[derive(Debug, Clone)]
pub struct OpenMeteoForecast {
    client: Client,
    base_url: String,
}

impl OpenMeteoForecast {
    #[must_use]
    pub fn new(client: Client, config: &ForecastConfig) -> Self {
        Self {
            client,
            base_url: trim_base(&config.base_url).to_string(),
        }
    }

    fn forecast_url(&self, place: &Place) -> String {
        format!(
            "{}/forecast?latitude={}&longitude={}&daily=temperature_2m_max&timezone=auto",
            self.base_url, place.latitude, place.longitude
        )
    }
}

#[async_trait]
impl ForecastSource for OpenMeteoForecast {
    #[instrument(skip(self), fields(place = %place.name))]
    async fn fetch_daily(&self, place: &Place) -> crate::Result<ForecastSeries> {
        let response: wire::ForecastResponse =
            get_json(&self.client, &self.forecast_url(place)).await?;
        let series = response.into_series()?;

        info!("Retrieved {} daily maxima for {}", series.len(), place.name);
        Ok(series)
    }
}

/// Response bodies as Open-Meteo sends them
mod wire {
    use serde::Deserialize;

    use crate::TempGraphError;
    use crate::models::{ForecastSeries, Place};

    #[derive(Debug, Deserialize)]
    pub struct GeocodingResponse {
        pub results: Option<Vec<GeocodingResult>>,
    }

    #[derive(Debug, Deserialize)]
    pub struct GeocodingResult {
        pub name: String,
        pub latitude: f64,
        pub longitude: f64,
    }

    impl From<GeocodingResult> for Place {
        fn from(result: GeocodingResult) -> Self {
            Place::new(result.name, result.latitude, result.longitude)
        }
    }

    #[derive(Debug, Deserialize)]
    pub struct ForecastResponse {
        pub daily: Option<DailyData>,
    }

    #[derive(Debug, Deserialize)]
    pub struct DailyData {
        pub time: Option<Vec<String>>,
        pub temperature_2m_max: Option<Vec<Option<f64>>>,
    }

    impl ForecastResponse {
        pub fn into_series(self) -> crate::Result<ForecastSeries> {
            let daily = self
                .daily
                .ok_or_else(|| TempGraphError::malformed("missing `daily` section"))?;
            let time = daily
                .time
                .ok_or_else(|| TempGraphError::malformed("missing `daily.time`"))?;
            let temps = daily
                .temperature_2m_max
                .ok_or_else(|| TempGraphError::malformed("missing `daily.temperature_2m_max`"))?;

            let temps = temps
                .into_iter()
                .enumerate()
                .map(|(i, t)| {
                    t.ok_or_else(|| TempGraphError::malformed(format!("null temperature at index {i}")))
                })
                .collect::<crate::Result<Vec<f64>>>()?;

            ForecastSeries::new(time, temps)
        }
    }
}

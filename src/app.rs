//! Query pipeline
//!
//! validate → loading → geocode → forecast → render → success. The first
//! failure anywhere ends the query in the error state; nothing partial is
//! shown.

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, instrument, warn};

use crate::chart::{Canvas, ChartRenderer, ChartResource};
use crate::config::TempGraphConfig;
use crate::validation::validate_city_name;
use crate::view::{RegionSurface, ViewController, ViewState};
use crate::weather::open_meteo::build_http_client;
use crate::weather::{ForecastSource, Geocoder, OpenMeteoForecast, OpenMeteoGeocoder};
use crate::TempGraphError;

/// One page session: its clients, its chart and its view.
pub struct TemperatureApp<S: RegionSurface> {
    geocoder: Arc<dyn Geocoder>,
    forecasts: Arc<dyn ForecastSource>,
    renderer: ChartRenderer,
    view: ViewController<S>,
}

impl<S: RegionSurface> TemperatureApp<S> {
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        forecasts: Arc<dyn ForecastSource>,
        canvas: Canvas,
        surface: S,
    ) -> Self {
        Self {
            geocoder,
            forecasts,
            renderer: ChartRenderer::new(canvas),
            view: ViewController::new(surface),
        }
    }

    /// Wire the Open-Meteo clients and the canvas from configuration
    pub fn from_config(config: &TempGraphConfig, surface: S) -> crate::Result<Self> {
        let client = build_http_client(&config.http)?;
        Ok(Self::new(
            Arc::new(OpenMeteoGeocoder::new(client.clone(), &config.geocoding)),
            Arc::new(OpenMeteoForecast::new(client, &config.forecast)),
            Canvas::new(&config.chart),
            surface,
        ))
    }

    /// Run one query for the raw input text.
    ///
    /// Every failure is turned into [`ViewState::Error`] carrying the
    /// user-facing message; the detailed error is returned alongside for
    /// callers that need its kind.
    #[instrument(skip(self))]
    pub async fn search(&mut self, raw: &str) -> Result<&ViewState, TempGraphError> {
        let start_time = Instant::now();

        match self.run_query(raw).await {
            Ok(()) => {
                self.view.enter_success();
                info!(
                    "Query for '{}' succeeded in {:.3}s",
                    raw.trim(),
                    start_time.elapsed().as_secs_f64()
                );
                Ok(self.view.state())
            }
            Err(err) => {
                warn!("Query for '{}' failed: {}", raw.trim(), err);
                self.view.enter_error(err.user_message());
                Err(err)
            }
        }
    }

    async fn run_query(&mut self, raw: &str) -> crate::Result<()> {
        let name = validate_city_name(raw)?;

        self.view.enter_loading();

        let place = self.geocoder.resolve(&name).await?;
        let series = self.forecasts.fetch_daily(&place).await?;
        self.renderer.render(&series, &place.name)?;
        Ok(())
    }

    pub fn state(&self) -> &ViewState {
        self.view.state()
    }

    pub fn surface(&self) -> &S {
        self.view.surface()
    }

    /// The live chart, if any query has succeeded so far
    pub fn chart(&self) -> Option<&ChartResource> {
        self.renderer.current()
    }

    pub fn canvas(&self) -> &Canvas {
        self.renderer.canvas()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChartConfig;
    use crate::error::{CITY_NOT_FOUND_MESSAGE, INVALID_CITY_MESSAGE};
    use crate::models::{ForecastSeries, Place, PointCategory};
    use crate::view::PageRegions;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubGeocoder {
        place: Option<Place>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Geocoder for StubGeocoder {
        async fn resolve(&self, name: &str) -> crate::Result<Place> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.place
                .clone()
                .ok_or_else(|| TempGraphError::not_found(name))
        }
    }

    struct StubForecast {
        result: fn() -> crate::Result<ForecastSeries>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ForecastSource for StubForecast {
        async fn fetch_daily(&self, _place: &Place) -> crate::Result<ForecastSeries> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.result)()
        }
    }

    fn madrid_series() -> crate::Result<ForecastSeries> {
        ForecastSeries::new(
            vec!["2024-01-01".to_string(), "2024-01-02".to_string()],
            vec![32.0, 5.0],
        )
    }

    fn transport_failure() -> crate::Result<ForecastSeries> {
        Err(TempGraphError::network("connection reset by peer"))
    }

    fn app_with(
        place: Option<Place>,
        result: fn() -> crate::Result<ForecastSeries>,
    ) -> (
        TemperatureApp<PageRegions>,
        Arc<StubGeocoder>,
        Arc<StubForecast>,
    ) {
        let geocoder = Arc::new(StubGeocoder {
            place,
            calls: AtomicUsize::new(0),
        });
        let forecasts = Arc::new(StubForecast {
            result,
            calls: AtomicUsize::new(0),
        });
        let app = TemperatureApp::new(
            geocoder.clone(),
            forecasts.clone(),
            Canvas::new(&ChartConfig::default()),
            PageRegions::default(),
        );
        (app, geocoder, forecasts)
    }

    #[tokio::test]
    async fn test_short_input_makes_no_calls() {
        let (mut app, geocoder, forecasts) = app_with(None, madrid_series);

        let err = app.search("NY").await.unwrap_err();
        assert!(matches!(err, TempGraphError::Validation { .. }));
        assert_eq!(app.state(), &ViewState::Error(INVALID_CITY_MESSAGE.to_string()));
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 0);
        assert_eq!(forecasts.calls.load(Ordering::SeqCst), 0);
        assert!(!app.surface().loading);
    }

    #[tokio::test]
    async fn test_unknown_city_shows_not_found() {
        let (mut app, _, forecasts) = app_with(None, madrid_series);

        app.search("Atlantis").await.unwrap_err();
        assert_eq!(app.state(), &ViewState::Error(CITY_NOT_FOUND_MESSAGE.to_string()));
        assert_eq!(forecasts.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_successful_query_renders_chart() {
        let (mut app, _, _) = app_with(Some(Place::new("Madrid", 40.4, -3.7)), madrid_series);

        let state = app.search("  Madrid ").await.unwrap();
        assert_eq!(state, &ViewState::Success);

        let chart = app.chart().unwrap().chart();
        assert_eq!(chart.points.len(), 2);
        assert_eq!(chart.categories(), [PointCategory::Hot, PointCategory::Cold]);
        assert!(chart.title.contains("Madrid"));
        assert!(app.surface().chart);
        assert_eq!(app.surface().visible_count(), 1);
    }

    #[tokio::test]
    async fn test_forecast_failure_shows_transport_message() {
        let (mut app, _, _) =
            app_with(Some(Place::new("Madrid", 40.4, -3.7)), transport_failure);

        app.search("Madrid").await.unwrap_err();
        assert_eq!(
            app.state(),
            &ViewState::Error("connection reset by peer".to_string())
        );
        assert!(!app.surface().loading);
        assert!(!app.surface().chart);
        assert!(app.surface().error);
    }

    #[tokio::test]
    async fn test_repeated_queries_keep_one_chart() {
        let (mut app, _, _) = app_with(Some(Place::new("Madrid", 40.4, -3.7)), madrid_series);

        app.search("Madrid").await.unwrap();
        app.search("Madrid").await.unwrap();
        app.search("Madrid").await.unwrap();
        assert_eq!(app.canvas().live_charts(), 1);
    }
}

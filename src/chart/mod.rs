//! Temperature line chart
//!
//! [`ChartRenderer`] owns at most one live [`ChartResource`]. Every render
//! releases the previous resource before drawing the replacement, so repeated
//! queries never stack charts on the same canvas.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use serde::{Serialize, Serializer};
use tracing::debug;

use crate::config::ChartConfig;
use crate::models::{ForecastSeries, PointCategory, classify};

mod svg;

/// A fixed color, kept both as CSS text and as components for drawing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StyleColor {
    pub css: &'static str,
    pub rgba: (u8, u8, u8, f64),
}

impl Serialize for StyleColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.css)
    }
}

const WHITE: StyleColor = StyleColor {
    css: "white",
    rgba: (255, 255, 255, 1.0),
};

/// Fixed presentation constants. None of these depend on the data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartStyle {
    pub line_color: StyleColor,
    pub line_width: u32,
    /// Curve bend between points, 0 draws straight segments
    pub tension: f64,
    pub point_radius: i32,
    pub point_border_color: StyleColor,
    pub tick_color: StyleColor,
    pub grid_color: StyleColor,
    pub tooltip_background: StyleColor,
}

pub const CHART_STYLE: ChartStyle = ChartStyle {
    line_color: WHITE,
    line_width: 2,
    tension: 0.2,
    point_radius: 6,
    point_border_color: WHITE,
    tick_color: WHITE,
    grid_color: StyleColor {
        css: "rgba(255, 255, 255, 0.2)",
        rgba: (255, 255, 255, 0.2),
    },
    tooltip_background: StyleColor {
        css: "rgba(0, 0, 0, 0.9)",
        rgba: (0, 0, 0, 0.9),
    },
};

/// One plotted day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub date: String,
    pub temperature: f64,
    pub category: PointCategory,
    pub color: &'static str,
    pub tooltip: String,
}

/// Chart model built from a forecast series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineChart {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Dataset maximum, computed once per build
    pub peak: f64,
    pub points: Vec<ChartPoint>,
    pub style: ChartStyle,
}

/// Dataset label for a place
#[must_use]
pub fn chart_title(place_name: &str) -> String {
    format!("Temperatura Máxima en {place_name} (°C)")
}

/// Tooltip text for a value given the dataset maximum
#[must_use]
pub fn tooltip_label(value: f64, peak: f64) -> String {
    if value == peak {
        format!("Temperatura máxima: {value}°C")
    } else {
        format!("Temperatura: {value}°C")
    }
}

impl LineChart {
    /// Build the model. Points keep the series order.
    #[must_use]
    pub fn build(series: &ForecastSeries, place_name: &str, width: u32, height: u32) -> Self {
        let peak = series.peak();
        let points = series
            .iter()
            .map(|(date, temperature)| {
                let category = classify(temperature);
                ChartPoint {
                    date: date.to_string(),
                    temperature,
                    category,
                    color: category.css_color(),
                    tooltip: tooltip_label(temperature, peak),
                }
            })
            .collect();

        Self {
            title: chart_title(place_name),
            width,
            height,
            peak,
            points,
            style: CHART_STYLE,
        }
    }

    /// Tooltip for the point at `index`
    #[must_use]
    pub fn tooltip(&self, index: usize) -> Option<&str> {
        self.points.get(index).map(|p| p.tooltip.as_str())
    }

    /// Categories in point order
    #[must_use]
    pub fn categories(&self) -> Vec<PointCategory> {
        self.points.iter().map(|p| p.category).collect()
    }

    /// Y-axis bounds with some headroom around the data
    #[must_use]
    pub fn value_range(&self) -> (f64, f64) {
        let low = self
            .points
            .iter()
            .map(|p| p.temperature)
            .fold(f64::INFINITY, f64::min);
        let high = self.peak;
        let padding = if (high - low).abs() > 1e-6 {
            (high - low) * 0.1
        } else {
            1.0
        };
        (low - padding, high + padding)
    }
}

/// Drawing surface with fixed dimensions. Tracks how many chart resources
/// are alive on it.
#[derive(Debug, Clone)]
pub struct Canvas {
    width: u32,
    height: u32,
    live: Arc<AtomicUsize>,
    next_id: Arc<AtomicU64>,
}

impl Canvas {
    #[must_use]
    pub fn new(config: &ChartConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
            live: Arc::new(AtomicUsize::new(0)),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Number of chart resources currently alive on this canvas
    #[must_use]
    pub fn live_charts(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
}

/// A drawn chart. Released when dropped.
#[derive(Debug)]
pub struct ChartResource {
    id: u64,
    chart: LineChart,
    svg: String,
    anchors: Vec<(i32, i32)>,
    live: Arc<AtomicUsize>,
}

impl ChartResource {
    fn create(canvas: &Canvas, chart: LineChart) -> crate::Result<Self> {
        let drawing = svg::draw(&chart)?;
        let id = canvas.next_id.fetch_add(1, Ordering::SeqCst);
        canvas.live.fetch_add(1, Ordering::SeqCst);
        debug!(chart_id = id, points = chart.points.len(), "Chart created");
        Ok(Self {
            id,
            chart,
            svg: drawing.svg,
            anchors: drawing.anchors,
            live: Arc::clone(&canvas.live),
        })
    }

    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[must_use]
    pub fn chart(&self) -> &LineChart {
        &self.chart
    }

    /// Standalone SVG document
    #[must_use]
    pub fn svg(&self) -> &str {
        &self.svg
    }

    /// Pixel position of each point on the canvas, in point order
    #[must_use]
    pub fn anchors(&self) -> &[(i32, i32)] {
        &self.anchors
    }

    /// Release the resource
    pub fn destroy(self) {
        debug!(chart_id = self.id, "Chart destroyed");
    }
}

impl Drop for ChartResource {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Exclusive owner of the single chart on a canvas
#[derive(Debug)]
pub struct ChartRenderer {
    canvas: Canvas,
    current: Option<ChartResource>,
}

impl ChartRenderer {
    #[must_use]
    pub fn new(canvas: Canvas) -> Self {
        Self {
            canvas,
            current: None,
        }
    }

    /// Replace the current chart with one for `series`.
    ///
    /// The previous chart is released first, even if drawing the new one
    /// fails.
    pub fn render(
        &mut self,
        series: &ForecastSeries,
        place_name: &str,
    ) -> crate::Result<&ChartResource> {
        if let Some(previous) = self.current.take() {
            previous.destroy();
        }

        let chart = LineChart::build(series, place_name, self.canvas.width, self.canvas.height);
        let resource = ChartResource::create(&self.canvas, chart)?;
        Ok(&*self.current.insert(resource))
    }

    #[must_use]
    pub fn current(&self) -> Option<&ChartResource> {
        self.current.as_ref()
    }

    #[must_use]
    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(temps: &[f64]) -> ForecastSeries {
        let dates = (1..=temps.len())
            .map(|day| format!("2024-01-{day:02}"))
            .collect();
        ForecastSeries::new(dates, temps.to_vec()).unwrap()
    }

    fn renderer() -> ChartRenderer {
        ChartRenderer::new(Canvas::new(&ChartConfig::default()))
    }

    #[test]
    fn test_build_maps_every_point() {
        let input = series(&[32.0, 5.0, 18.5, 30.0, 10.0]);
        let chart = LineChart::build(&input, "Madrid", 800, 400);

        assert_eq!(chart.points.len(), input.len());
        for (point, (date, temp)) in chart.points.iter().zip(input.iter()) {
            assert_eq!(point.date, date);
            assert_eq!(point.temperature, temp);
            assert_eq!(point.category, classify(temp));
            assert_eq!(point.color, classify(temp).css_color());
        }
    }

    #[test]
    fn test_title_names_place() {
        let chart = LineChart::build(&series(&[20.0]), "Madrid", 800, 400);
        assert_eq!(chart.title, "Temperatura Máxima en Madrid (°C)");
    }

    #[test]
    fn test_tooltips_mark_dataset_maximum() {
        let chart = LineChart::build(&series(&[21.5, 27.0, 12.0, 27.0]), "Sevilla", 800, 400);
        assert_eq!(chart.peak, 27.0);
        assert_eq!(chart.tooltip(0), Some("Temperatura: 21.5°C"));
        assert_eq!(chart.tooltip(1), Some("Temperatura máxima: 27°C"));
        assert_eq!(chart.tooltip(2), Some("Temperatura: 12°C"));
        assert_eq!(chart.tooltip(3), Some("Temperatura máxima: 27°C"));
        assert_eq!(chart.tooltip(4), None);
    }

    #[test]
    fn test_style_is_fixed() {
        let hot = LineChart::build(&series(&[40.0, 41.0]), "A", 800, 400);
        let cold = LineChart::build(&series(&[-4.0]), "B", 800, 400);
        assert_eq!(hot.style, cold.style);
        assert_eq!(hot.style.grid_color.css, "rgba(255, 255, 255, 0.2)");
        assert_eq!(hot.style.tooltip_background.rgba, (0, 0, 0, 0.9));
    }

    #[test]
    fn test_value_range_pads_flat_series() {
        let chart = LineChart::build(&series(&[15.0, 15.0]), "A", 800, 400);
        assert_eq!(chart.value_range(), (14.0, 16.0));
    }

    #[test]
    fn test_render_twice_keeps_one_live_chart() {
        let mut renderer = renderer();
        let first_id = renderer.render(&series(&[12.0, 14.0]), "Bilbao").unwrap().id();
        assert_eq!(renderer.canvas().live_charts(), 1);

        let second_id = renderer.render(&series(&[31.0]), "Murcia").unwrap().id();
        assert_eq!(renderer.canvas().live_charts(), 1);
        assert_ne!(first_id, second_id);
        assert!(renderer.current().unwrap().chart().title.contains("Murcia"));
    }

    #[test]
    fn test_render_produces_svg_with_fixed_size() {
        let mut renderer = ChartRenderer::new(Canvas::new(&ChartConfig {
            width: 640,
            height: 320,
        }));
        let resource = renderer.render(&series(&[32.0, 5.0]), "Madrid").unwrap();

        assert!(resource.svg().contains("<svg"));
        assert!(resource.svg().contains("640"));
        assert_eq!(resource.chart().width, 640);
        assert_eq!(resource.chart().height, 320);
    }

    #[test]
    fn test_style_serializes_as_css() {
        let json = serde_json::to_value(CHART_STYLE).unwrap();
        assert_eq!(json["line_color"], "white");
        assert_eq!(json["grid_color"], "rgba(255, 255, 255, 0.2)");
        assert_eq!(json["tension"], 0.2);
    }

    #[test]
    fn test_anchors_follow_points_left_to_right() {
        let mut renderer = renderer();
        let resource = renderer
            .render(&series(&[32.0, 5.0, 18.0]), "Madrid")
            .unwrap();
        let anchors = resource.anchors();

        assert_eq!(anchors.len(), 3);
        assert!(anchors.windows(2).all(|w| w[0].0 < w[1].0));
        // Hotter day sits higher on the canvas
        assert!(anchors[0].1 < anchors[1].1);
        for &(x, y) in anchors {
            assert!((0..800).contains(&x));
            assert!((0..400).contains(&y));
        }
    }

    #[test]
    fn test_dropping_renderer_releases_chart() {
        let canvas = Canvas::new(&ChartConfig::default());
        let mut renderer = ChartRenderer::new(canvas.clone());
        renderer.render(&series(&[20.0]), "Toledo").unwrap();
        assert_eq!(canvas.live_charts(), 1);

        drop(renderer);
        assert_eq!(canvas.live_charts(), 0);
    }
}

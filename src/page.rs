//! Server-rendered page
//!
//! Markup lives in embedded tera templates with HTML autoescaping. The page
//! always contains all three regions; only their `display` style changes
//! with the view state. Each chart point gets a hover target over the SVG
//! carrying its tooltip.

use std::error::Error as _;
use std::sync::Arc;

use serde::Serialize;
use tera::{Context, Tera};
use tracing::debug;

use crate::TempGraphError;
use crate::chart::ChartResource;
use crate::view::{PageRegions, Region};
use crate::web::{BUSY_MESSAGE, Session};

const PAGE_TEMPLATE: &str = "page.html";
const BUSY_TEMPLATE: &str = "busy.html";

/// Hover area beyond the drawn point radius
const HIT_SLOP: i32 = 4;
const LABEL_HEIGHT: i32 = 22;
const LABEL_CHAR_WIDTH: i32 = 7;
const LABEL_PADDING: i32 = 6;
const LABEL_OFFSET: i32 = 10;

mod embedded {
    pub const PAGE: &str = r#"<!DOCTYPE html>
<html lang="es">
<head>
<meta charset="utf-8">
<title>Temperaturas máximas</title>
<style>
body { background: #000; color: #fff; font-family: monospace; margin: 2rem; }
input, button { background: #000; color: #fff; border: 2px solid #fff; padding: .5rem; font: inherit; }
button { cursor: pointer; }
#chartContainer { width: 100%; max-width: 820px; }
#errorMessage { border: 2px solid red; padding: 1rem; color: #fff; }
.plot { position: relative; }
.plot svg { position: absolute; left: 0; top: 0; }
.tip .label { display: none; }
.tip:hover .label { display: inline; }
table { border-collapse: collapse; margin-top: 1rem; }
td, th { border: 1px solid rgba(255, 255, 255, .2); padding: .25rem .5rem; }
</style>
</head>
<body>
<h1>Temperaturas máximas</h1>
<form method="get" action="/">
<input id="cityInput" name="city" placeholder="Ciudad" value="{{ query }}">
<button id="searchBtn" type="submit">Buscar</button>
</form>
<div id="loadingArea" style="display:{{ loading }}">Cargando…</div>
<div id="errorMessage" style="display:{{ error }}">{{ error_text }}</div>
<div id="chartContainer" style="display:{{ chart_display }}">
{%- if chart %}
<div class="plot" style="width:{{ chart.width }}px;height:{{ chart.height }}px">
{{ chart.svg | safe }}
<svg class="tips" xmlns="http://www.w3.org/2000/svg" width="{{ chart.width }}" height="{{ chart.height }}">
{%- for point in chart.points %}
<g class="tip" data-index="{{ point.index }}">
<circle cx="{{ point.x }}" cy="{{ point.y }}" r="{{ chart.hit_radius }}" fill="transparent"><title>{{ point.tooltip }}</title></circle>
<g class="label"><rect x="{{ point.label_x }}" y="{{ point.label_y }}" width="{{ point.label_width }}" height="{{ chart.label_height }}" rx="3" fill="{{ chart.tooltip_background }}"/><text x="{{ point.text_x }}" y="{{ point.text_y }}" fill="{{ chart.label_color }}" font-size="12">{{ point.tooltip }}</text></g>
</g>
{%- endfor %}
</svg>
</div>
<table><thead><tr><th>Fecha</th><th>Máxima</th></tr></thead><tbody>
{%- for point in chart.points %}
<tr title="{{ point.tooltip }}"><td>{{ point.date }}</td><td style="color:{{ point.color }}">{{ point.temperature }}°C</td></tr>
{%- endfor %}
</tbody></table>
{%- endif %}
</div>
</body>
</html>
"#;

    pub const BUSY: &str = r#"<!DOCTYPE html>
<html lang="es">
<head><meta charset="utf-8"><title>Temperaturas máximas</title></head>
<body><p>{{ message }}</p></body>
</html>
"#;
}

#[derive(Debug, Serialize)]
struct PointView<'a> {
    index: usize,
    date: &'a str,
    temperature: String,
    color: &'a str,
    tooltip: &'a str,
    x: i32,
    y: i32,
    label_x: i32,
    label_y: i32,
    label_width: i32,
    text_x: i32,
    text_y: i32,
}

#[derive(Debug, Serialize)]
struct ChartView<'a> {
    svg: &'a str,
    width: u32,
    height: u32,
    hit_radius: i32,
    label_height: i32,
    tooltip_background: &'a str,
    label_color: &'a str,
    points: Vec<PointView<'a>>,
}

#[derive(Debug, Serialize)]
struct PageView<'a> {
    query: &'a str,
    loading: &'static str,
    error: &'static str,
    chart_display: &'static str,
    error_text: &'a str,
    chart: Option<ChartView<'a>>,
}

fn display(regions: &PageRegions, region: Region) -> &'static str {
    if regions.is_visible(region) {
        "block"
    } else {
        "none"
    }
}

impl<'a> PageView<'a> {
    fn new(regions: &'a PageRegions, chart: Option<ChartView<'a>>, query: &'a str) -> Self {
        Self {
            query,
            loading: display(regions, Region::Loading),
            error: display(regions, Region::Error),
            chart_display: display(regions, Region::Chart),
            error_text: &regions.error_text,
            chart,
        }
    }
}

/// Hover targets and label boxes, keyed by point index
fn chart_view(resource: &ChartResource) -> ChartView<'_> {
    let chart = resource.chart();
    let width = i32::try_from(chart.width).unwrap_or(i32::MAX);

    let points = chart
        .points
        .iter()
        .zip(resource.anchors())
        .enumerate()
        .map(|(index, (point, &(x, y)))| {
            let chars = i32::try_from(point.tooltip.chars().count()).unwrap_or(0);
            let label_width = 2 * LABEL_PADDING + LABEL_CHAR_WIDTH * chars;
            let label_x = if x + LABEL_OFFSET + label_width > width {
                (x - LABEL_OFFSET - label_width).max(0)
            } else {
                x + LABEL_OFFSET
            };
            let label_y = (y - LABEL_OFFSET - LABEL_HEIGHT).max(0);
            PointView {
                index,
                date: &point.date,
                temperature: point.temperature.to_string(),
                color: point.color,
                tooltip: &point.tooltip,
                x,
                y,
                label_x,
                label_y,
                label_width,
                text_x: label_x + LABEL_PADDING,
                text_y: label_y + LABEL_HEIGHT - 7,
            }
        })
        .collect();

    ChartView {
        svg: resource.svg(),
        width: chart.width,
        height: chart.height,
        hit_radius: chart.style.point_radius + HIT_SLOP,
        label_height: LABEL_HEIGHT,
        tooltip_background: chart.style.tooltip_background.css,
        label_color: chart.style.tick_color.css,
        points,
    }
}

fn template_error(name: &str, err: &tera::Error) -> TempGraphError {
    let mut message = format!("{name}: {err}");
    let mut source = err.source();
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    TempGraphError::template(message)
}

/// Compiled page templates, shared by every request
#[derive(Debug, Clone)]
pub struct PageTemplates {
    tera: Arc<Tera>,
}

impl PageTemplates {
    pub fn new() -> crate::Result<Self> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![".html"]);
        tera.add_raw_template(PAGE_TEMPLATE, embedded::PAGE)
            .map_err(|e| template_error(PAGE_TEMPLATE, &e))?;
        tera.add_raw_template(BUSY_TEMPLATE, embedded::BUSY)
            .map_err(|e| template_error(BUSY_TEMPLATE, &e))?;

        Ok(Self {
            tera: Arc::new(tera),
        })
    }

    /// A fresh visit: idle, every region hidden
    pub fn render_idle(&self) -> crate::Result<String> {
        let regions = PageRegions::default();
        self.render_page(&PageView::new(&regions, None, ""))
    }

    /// The session's state right after a search for `query`
    pub fn render_session(&self, session: &Session, query: &str) -> crate::Result<String> {
        let regions = session.surface();
        let chart = if regions.chart {
            session.chart().map(chart_view)
        } else {
            None
        };
        self.render_page(&PageView::new(regions, chart, query))
    }

    /// Answer for a search that arrives while another one is running
    pub fn render_busy(&self) -> crate::Result<String> {
        let mut context = Context::new();
        context.insert("message", BUSY_MESSAGE);
        self.render(BUSY_TEMPLATE, &context)
    }

    fn render_page(&self, view: &PageView<'_>) -> crate::Result<String> {
        let context =
            Context::from_serialize(view).map_err(|e| template_error(PAGE_TEMPLATE, &e))?;
        self.render(PAGE_TEMPLATE, &context)
    }

    fn render(&self, name: &str, context: &Context) -> crate::Result<String> {
        debug!(template = name, "Rendering page");
        self.tera
            .render(name, context)
            .map_err(|e| template_error(name, &e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{Canvas, ChartRenderer};
    use crate::config::ChartConfig;
    use crate::models::ForecastSeries;

    fn templates() -> PageTemplates {
        PageTemplates::new().unwrap()
    }

    #[test]
    fn test_idle_page_hides_every_region() {
        let html = templates().render_idle().unwrap();
        assert!(html.contains("id=\"loadingArea\" style=\"display:none\""));
        assert!(html.contains("id=\"errorMessage\" style=\"display:none\""));
        assert!(html.contains("id=\"chartContainer\" style=\"display:none\""));
        assert!(!html.contains("<svg"));
    }

    #[test]
    fn test_user_text_is_escaped() {
        let regions = PageRegions {
            error: true,
            error_text: "<script>alert(1)</script>".into(),
            ..PageRegions::default()
        };
        let html = templates()
            .render_page(&PageView::new(&regions, None, "\"><b>"))
            .unwrap();

        assert!(html.contains("id=\"errorMessage\" style=\"display:block\""));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("value=\"&quot;&gt;&lt;b&gt;\""));
    }

    #[test]
    fn test_each_point_carries_its_tooltip() {
        let series = ForecastSeries::new(
            vec!["2024-01-01".to_string(), "2024-01-02".to_string()],
            vec![32.0, 5.0],
        )
        .unwrap();
        let mut renderer = ChartRenderer::new(Canvas::new(&ChartConfig::default()));
        let resource = renderer.render(&series, "Madrid").unwrap();

        let regions = PageRegions {
            chart: true,
            ..PageRegions::default()
        };
        let html = templates()
            .render_page(&PageView::new(&regions, Some(chart_view(resource)), "Madrid"))
            .unwrap();

        let first = html.find("data-index=\"0\"").unwrap();
        let second = html.find("data-index=\"1\"").unwrap();
        let peak = html.find("<title>Temperatura máxima: 32°C</title>").unwrap();
        let other = html.find("<title>Temperatura: 5°C</title>").unwrap();
        assert!(first < peak && peak < second);
        assert!(second < other);

        let (x, y) = resource.anchors()[0];
        assert!(html.contains(&format!("cx=\"{x}\" cy=\"{y}\"")));
        assert!(html.contains("fill=\"rgba(0, 0, 0, 0.9)\""));
    }

    #[test]
    fn test_label_stays_on_canvas() {
        let series = ForecastSeries::new(
            vec!["2024-01-01".to_string(), "2024-01-02".to_string()],
            vec![20.0, 25.0],
        )
        .unwrap();
        let mut renderer = ChartRenderer::new(Canvas::new(&ChartConfig::default()));
        let view = chart_view(renderer.render(&series, "Toledo").unwrap());

        for point in &view.points {
            assert!(point.label_x >= 0);
            assert!(point.label_x + point.label_width <= 800);
        }
    }

    #[test]
    fn test_busy_page_mentions_running_search() {
        assert!(templates().render_busy().unwrap().contains(BUSY_MESSAGE));
    }
}

//! SVG drawing with plotters

use plotters::prelude::*;

use super::{LineChart, StyleColor};
use crate::TempGraphError;

const BACKGROUND: RGBColor = RGBColor(0, 0, 0);
const NO_LINE: RGBAColor = RGBAColor(0, 0, 0, 0.0);

/// Samples per segment when the line is curved
const CURVE_STEPS: u32 = 12;

/// Finished SVG plus where each point landed on the canvas
pub(super) struct Drawing {
    pub svg: String,
    pub anchors: Vec<(i32, i32)>,
}

fn render_error<E: std::fmt::Display>(err: E) -> TempGraphError {
    TempGraphError::render(err.to_string())
}

fn color(style: StyleColor) -> RGBAColor {
    let (r, g, b, a) = style.rgba;
    RGBAColor(r, g, b, a)
}

fn x_of(index: usize) -> i32 {
    i32::try_from(index).unwrap_or(i32::MAX)
}

fn to_pixel((x, y): (f64, f64)) -> (i32, i32) {
    (x.round() as i32, y.round() as i32)
}

fn distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    (b.0 - a.0).hypot(b.1 - a.1)
}

fn bezier(p0: (f64, f64), c1: (f64, f64), c2: (f64, f64), p3: (f64, f64), t: f64) -> (f64, f64) {
    let u = 1.0 - t;
    let (w0, w1, w2, w3) = (u * u * u, 3.0 * u * u * t, 3.0 * u * t * t, t * t * t);
    (
        w0 * p0.0 + w1 * c1.0 + w2 * c2.0 + w3 * p3.0,
        w0 * p0.1 + w1 * c1.1 + w2 * c2.1 + w3 * p3.1,
    )
}

/// Path through `points` bent by `tension` like a cardinal spline.
///
/// Every input point is on the output path. Zero tension, or fewer than
/// three points, gives the straight polyline.
pub(super) fn smooth(points: &[(f64, f64)], tension: f64) -> Vec<(f64, f64)> {
    if points.len() < 3 || tension <= 0.0 {
        return points.to_vec();
    }

    let last = points.len() - 1;
    let controls: Vec<((f64, f64), (f64, f64))> = (0..points.len())
        .map(|i| {
            let prev = points[i.saturating_sub(1)];
            let cur = points[i];
            let next = points[(i + 1).min(last)];
            let (d01, d12) = (distance(prev, cur), distance(cur, next));
            let total = d01 + d12;
            let (fa, fb) = if total > 0.0 {
                (tension * d01 / total, tension * d12 / total)
            } else {
                (0.0, 0.0)
            };
            let (dx, dy) = (next.0 - prev.0, next.1 - prev.1);
            (
                (cur.0 - fa * dx, cur.1 - fa * dy),
                (cur.0 + fb * dx, cur.1 + fb * dy),
            )
        })
        .collect();

    let mut path = Vec::with_capacity(last * CURVE_STEPS as usize + 1);
    path.push(points[0]);
    for i in 0..last {
        for step in 1..=CURVE_STEPS {
            let t = f64::from(step) / f64::from(CURVE_STEPS);
            path.push(bezier(points[i], controls[i].1, controls[i + 1].0, points[i + 1], t));
        }
    }
    path
}

pub(super) fn draw(chart: &LineChart) -> crate::Result<Drawing> {
    let style = chart.style;
    let mut svg = String::new();
    let anchors;
    {
        let root = SVGBackend::with_string(&mut svg, (chart.width, chart.height))
            .into_drawing_area();
        root.fill(&BACKGROUND).map_err(render_error)?;

        let labels: Vec<&str> = chart.points.iter().map(|p| p.date.as_str()).collect();
        let last = x_of(labels.len().saturating_sub(1)).max(1);
        let (low, high) = chart.value_range();
        let text = ("sans-serif", 12).into_font().color(&color(style.tick_color));

        let mut ctx = ChartBuilder::on(&root)
            .caption(
                &chart.title,
                ("sans-serif", 20).into_font().color(&color(style.tick_color)),
            )
            .margin(16)
            .x_label_area_size(40)
            .y_label_area_size(56)
            .build_cartesian_2d(0..last, low..high)
            .map_err(render_error)?;

        ctx.configure_mesh()
            .bold_line_style(color(style.grid_color))
            .light_line_style(NO_LINE)
            .axis_style(color(style.grid_color))
            .label_style(text)
            .x_labels(labels.len())
            .x_label_formatter(&|i: &i32| {
                usize::try_from(*i)
                    .ok()
                    .and_then(|i| labels.get(i))
                    .map(|d| (*d).to_string())
                    .unwrap_or_default()
            })
            .y_label_formatter(&|t: &f64| format!("{t:.0}°C"))
            .draw()
            .map_err(render_error)?;

        anchors = chart
            .points
            .iter()
            .enumerate()
            .map(|(i, p)| ctx.backend_coord(&(x_of(i), p.temperature)))
            .collect::<Vec<_>>();

        let pixels: Vec<(f64, f64)> = anchors
            .iter()
            .map(|&(x, y)| (f64::from(x), f64::from(y)))
            .collect();
        let path: Vec<(i32, i32)> = smooth(&pixels, style.tension)
            .into_iter()
            .map(to_pixel)
            .collect();
        root.draw(&PathElement::new(
            path,
            color(style.line_color).stroke_width(style.line_width),
        ))
        .map_err(render_error)?;

        for (point, &anchor) in chart.points.iter().zip(&anchors) {
            let (r, g, b) = point.category.rgb();
            root.draw(&Circle::new(anchor, style.point_radius, RGBColor(r, g, b).filled()))
                .map_err(render_error)?;
            root.draw(&Circle::new(
                anchor,
                style.point_radius,
                color(style.point_border_color).stroke_width(1),
            ))
            .map_err(render_error)?;
        }

        root.present().map_err(render_error)?;
    }
    Ok(Drawing { svg, anchors })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smooth_without_tension_is_polyline() {
        let points = [(0.0, 0.0), (10.0, 5.0), (20.0, 0.0)];
        assert_eq!(smooth(&points, 0.0), points);
    }

    #[test]
    fn test_smooth_passes_through_every_point() {
        let points = [(0.0, 40.0), (50.0, 10.0), (100.0, 30.0), (150.0, 20.0)];
        let path = smooth(&points, 0.2);

        assert_eq!(path.len(), 3 * CURVE_STEPS as usize + 1);
        for (i, point) in points.iter().enumerate() {
            let sample = path[i * CURVE_STEPS as usize];
            assert!((sample.0 - point.0).abs() < 1e-9);
            assert!((sample.1 - point.1).abs() < 1e-9);
        }
    }

    #[test]
    fn test_smooth_bends_between_points() {
        let points = [(0.0, 0.0), (10.0, 10.0), (20.0, 0.0)];
        let path = smooth(&points, 0.2);
        let midway = path[CURVE_STEPS as usize / 2];
        // A straight segment would put this exactly on y = x
        assert!((midway.1 - midway.0).abs() > 1e-6);
    }
}

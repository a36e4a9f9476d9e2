//! Turn a redraw payload into drawable point lists and axis bounds.

use crate::axis::Series;
use crate::session::RedrawPayload;

/// One line ready for drawing: finite points only, in x order of the file.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub label: String,
    pub color: String,
    pub points: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartBounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl ChartBounds {
    /// Smallest box containing every point, widened when an axis has zero extent.
    /// `None` when there are no points at all.
    pub fn of<'a>(points: impl IntoIterator<Item = &'a (f64, f64)>) -> Option<Self> {
        let mut bounds: Option<Self> = None;
        for &(x, y) in points {
            let b = bounds.get_or_insert(Self {
                x_min: x,
                x_max: x,
                y_min: y,
                y_max: y,
            });
            b.x_min = b.x_min.min(x);
            b.x_max = b.x_max.max(x);
            b.y_min = b.y_min.min(y);
            b.y_max = b.y_max.max(y);
        }
        bounds.map(Self::widened)
    }

    fn widened(self) -> Self {
        let (x_min, x_max) = widen(self.x_min, self.x_max);
        let (y_min, y_max) = widen(self.y_min, self.y_max);
        Self {
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }
}

fn widen(min: f64, max: f64) -> (f64, f64) {
    if max > min {
        (min, max)
    } else {
        let pad = if min == 0.0 { 1.0 } else { min.abs() * 0.05 };
        (min - pad, max + pad)
    }
}

/// Everything a chart needs for the current Y name.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub y_name: String,
    /// X column name of the first series; files may name it differently.
    pub x_name: String,
    pub series: Vec<ChartSeries>,
    pub bounds: Option<ChartBounds>,
}

impl ChartData {
    pub fn is_empty(&self) -> bool {
        self.series.iter().all(|s| s.points.is_empty())
    }

    pub fn point_count(&self) -> usize {
        self.series.iter().map(|s| s.points.len()).sum()
    }
}

/// Keep at most `max_points` points, evenly spaced, always including the last one.
pub fn decimate(points: Vec<(f64, f64)>, max_points: usize) -> Vec<(f64, f64)> {
    if max_points < 2 || points.len() <= max_points {
        return points;
    }
    let last = points.len() - 1;
    let steps = max_points - 1;
    (0..max_points)
        .map(|i| points[i * last / steps])
        .collect()
}

fn chart_series(series: &Series) -> ChartSeries {
    ChartSeries {
        label: series.label.clone(),
        color: series.color.clone(),
        points: series.points().collect(),
    }
}

/// Prepare `payload` for drawing. `max_points` thins each series; `None` keeps every point.
/// Bounds are computed before thinning so both renderings share axes.
pub fn prepare_chart_data(
    payload: &RedrawPayload,
    x_name: &str,
    max_points: Option<usize>,
) -> ChartData {
    let full: Vec<ChartSeries> = payload
        .series
        .iter()
        .map(chart_series)
        .collect();
    let bounds = ChartBounds::of(full.iter().flat_map(|s| s.points.iter()));
    let series = match max_points {
        Some(max) => full
            .into_iter()
            .map(|s| ChartSeries {
                points: decimate(s.points, max),
                ..s
            })
            .collect(),
        None => full,
    };
    ChartData {
        y_name: payload.y_name.clone().unwrap_or_default(),
        x_name: x_name.to_string(),
        series,
        bounds,
    }
}

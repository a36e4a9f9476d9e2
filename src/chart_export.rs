//! Chart export to PNG and SVG (plotters) and of the raw redraw payload to JSON.

use color_eyre::eyre::eyre;
use color_eyre::Result;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::info;

use crate::chart_data::ChartData;
use crate::config::hex_to_rgb;
use crate::session::RedrawPayload;

const EXPORT_SIZE: (u32, u32) = (1024, 640);

/// Image format for chart export, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartExportFormat {
    Png,
    Svg,
}

impl ChartExportFormat {
    pub const ALL: [Self; 2] = [Self::Png, Self::Svg];

    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Svg => "svg",
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        Self::ALL.into_iter().find(|f| f.extension() == ext)
    }
}

fn series_color(hex: &str) -> RGBColor {
    let (r, g, b) = hex_to_rgb(hex).unwrap_or((0, 0, 0));
    RGBColor(r, g, b)
}

fn draw<DB>(root: DrawingArea<DB, Shift>, data: &ChartData) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let bounds = data
        .bounds
        .ok_or_else(|| eyre!("No data to export"))?;

    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(data.y_name.as_str(), ("sans-serif", 22))
        .margin(30)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(bounds.x_min..bounds.x_max, bounds.y_min..bounds.y_max)?;

    chart
        .configure_mesh()
        .x_desc(data.x_name.as_str())
        .y_desc(data.y_name.as_str())
        .draw()?;

    for s in data.series.iter().filter(|s| !s.points.is_empty()) {
        let color = series_color(&s.color);
        chart
            .draw_series(LineSeries::new(s.points.iter().copied(), color))?
            .label(s.label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

/// Render every series in `data` to `path`.
pub fn write_chart(path: &Path, format: ChartExportFormat, data: &ChartData) -> Result<()> {
    if data.is_empty() {
        return Err(eyre!("No data to export"));
    }

    match format {
        ChartExportFormat::Png => {
            draw(BitMapBackend::new(path, EXPORT_SIZE).into_drawing_area(), data)?
        }
        ChartExportFormat::Svg => {
            draw(SVGBackend::new(path, EXPORT_SIZE).into_drawing_area(), data)?
        }
    }
    info!(
        path = %path.display(),
        series = data.series.len(),
        points = data.point_count(),
        "exported chart"
    );
    Ok(())
}

/// Write the complete redraw payload as pretty JSON. Missing values become `null`.
pub fn write_payload_json(path: &Path, payload: &RedrawPayload) -> Result<()> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, payload)?;
    info!(path = %path.display(), series = payload.series.len(), "exported payload");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::Series;
    use crate::chart_data::prepare_chart_data;

    #[test]
    fn format_from_extension() {
        assert_eq!(
            ChartExportFormat::from_path(Path::new("out/plot.PNG")),
            Some(ChartExportFormat::Png)
        );
        assert_eq!(
            ChartExportFormat::from_path(Path::new("plot.svg")),
            Some(ChartExportFormat::Svg)
        );
        assert_eq!(ChartExportFormat::from_path(Path::new("plot.eps")), None);
        assert_eq!(ChartExportFormat::from_path(Path::new("plot")), None);
    }

    #[test]
    fn empty_chart_is_not_exported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.png");
        let data = prepare_chart_data(&RedrawPayload::default(), "t", None);
        assert!(write_chart(&path, ChartExportFormat::Png, &data).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn payload_json_has_nulls_for_missing_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("payload.json");
        let payload = RedrawPayload {
            y_name: Some("Voltage".into()),
            series: vec![Series {
                dataset_id: 3,
                label: "File 1".into(),
                color: "#1f77b4".into(),
                column: "voltage".into(),
                x: vec![0.0, 1.0],
                y: vec![1.5, f64::NAN],
            }],
        };
        write_payload_json(&path, &payload).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["y_name"], "Voltage");
        assert_eq!(value["series"][0]["label"], "File 1");
        assert_eq!(value["series"][0]["column"], "voltage");
        assert_eq!(value["series"][0]["y"][0], 1.5);
        assert!(value["series"][0]["y"][1].is_null());
    }

    #[test]
    fn unknown_palette_entry_draws_black() {
        assert_eq!(series_color("red"), RGBColor(0, 0, 0));
        assert_eq!(series_color("#ff7f0e"), RGBColor(0xff, 0x7f, 0x0e));
    }
}

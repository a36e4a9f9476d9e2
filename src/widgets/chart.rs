//! Chart area: one line per series in its dataset color, shared axes, legend.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    symbols::Marker,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, LegendPosition, Paragraph, Widget},
};

use crate::chart_data::ChartData;
use crate::config::{ColorParser, Theme};

pub struct ChartView<'a> {
    data: &'a ChartData,
    theme: &'a Theme,
    parser: &'a ColorParser,
    marker: Marker,
    show_legend: bool,
}

impl<'a> ChartView<'a> {
    pub fn new(data: &'a ChartData, theme: &'a Theme, parser: &'a ColorParser) -> Self {
        Self {
            data,
            theme,
            parser,
            marker: Marker::Braille,
            show_legend: true,
        }
    }

    pub fn marker(mut self, marker: Marker) -> Self {
        self.marker = marker;
        self
    }

    pub fn show_legend(mut self, show_legend: bool) -> Self {
        self.show_legend = show_legend;
        self
    }

    fn series_color(&self, color: &str) -> Color {
        self.parser.parse(color).unwrap_or(self.theme.get("primary"))
    }
}

impl Widget for ChartView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title = if self.data.y_name.is_empty() {
            " Chart ".to_string()
        } else {
            format!(" {} ", self.data.y_name)
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.get("modal_border")))
            .title(title);
        let inner = block.inner(area);
        block.render(area, buf);

        let Some(bounds) = self.data.bounds.filter(|_| !self.data.is_empty()) else {
            let hint = if self.data.series.is_empty() {
                "No series to plot. Press o to open a file"
            } else {
                "No finite points to plot"
            };
            Paragraph::new(hint)
                .style(Style::default().fg(self.theme.get("text_secondary")))
                .centered()
                .render(inner, buf);
            return;
        };

        let datasets: Vec<Dataset> = self
            .data
            .series
            .iter()
            .map(|s| {
                Dataset::default()
                    .name(s.label.as_str())
                    .marker(self.marker)
                    .graph_type(GraphType::Line)
                    .style(Style::default().fg(self.series_color(&s.color)))
                    .data(&s.points)
            })
            .collect();

        let label_style = Style::default().fg(self.theme.get("text_primary"));
        let labels = |min: f64, max: f64| {
            [min, (min + max) / 2.0, max]
                .into_iter()
                .map(|v| Span::styled(format_axis_label(v), label_style))
                .collect::<Vec<_>>()
        };
        let axis_style = Style::default().fg(self.theme.get("axis"));

        let x_axis = Axis::default()
            .title(Span::styled(self.data.x_name.as_str(), label_style))
            .bounds([bounds.x_min, bounds.x_max])
            .style(axis_style)
            .labels(labels(bounds.x_min, bounds.x_max));
        let y_axis = Axis::default()
            .bounds([bounds.y_min, bounds.y_max])
            .style(axis_style)
            .labels(labels(bounds.y_min, bounds.y_max));

        let legend = self.show_legend.then_some(LegendPosition::TopRight);
        Chart::new(datasets)
            .x_axis(x_axis)
            .y_axis(y_axis)
            .legend_position(legend)
            .render(inner, buf);
    }
}

fn format_axis_label(v: f64) -> String {
    if v.abs() >= 1e6 || (v.abs() < 1e-2 && v != 0.0) {
        format!("{:.2e}", v)
    } else {
        format!("{:.2}", v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart_data::{ChartBounds, ChartSeries};

    fn buffer_text(buf: &Buffer) -> String {
        buf.content.iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn axis_labels() {
        assert_eq!(format_axis_label(0.0), "0.00");
        assert_eq!(format_axis_label(12.345), "12.35");
        assert_eq!(format_axis_label(2_500_000.0), "2.50e6");
    }

    #[test]
    fn empty_chart_shows_hint() {
        let data = ChartData {
            y_name: String::new(),
            x_name: String::new(),
            series: Vec::new(),
            bounds: None,
        };
        let theme = Theme::default();
        let parser = ColorParser::with_capabilities(true, true);
        let area = Rect::new(0, 0, 60, 8);
        let mut buf = Buffer::empty(area);
        ChartView::new(&data, &theme, &parser).render(area, &mut buf);
        assert!(buffer_text(&buf).contains("Press o to open a file"));
    }

    #[test]
    fn legend_lists_series_labels() {
        let data = ChartData {
            y_name: "Voltage".into(),
            x_name: "Time".into(),
            series: vec![ChartSeries {
                label: "File 1".into(),
                color: "#1f77b4".into(),
                points: vec![(0.0, 1.0), (1.0, 2.0)],
            }],
            bounds: Some(ChartBounds {
                x_min: 0.0,
                x_max: 1.0,
                y_min: 1.0,
                y_max: 2.0,
            }),
        };
        let theme = Theme::default();
        let parser = ColorParser::with_capabilities(true, true);
        let area = Rect::new(0, 0, 80, 20);
        let mut buf = Buffer::empty(area);
        ChartView::new(&data, &theme, &parser).render(area, &mut buf);
        let text = buffer_text(&buf);
        assert!(text.contains("Voltage"));
        assert!(text.contains("File 1"));
    }
}

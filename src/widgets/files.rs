use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Widget},
};

use crate::axis::find_column;
use crate::config::{ColorParser, Theme};
use crate::registry::DatasetRegistry;

/// Loaded files in registry order: color swatch, label, row count.
/// Files without the current Y column are dimmed.
pub struct FilesPanel<'a> {
    registry: &'a DatasetRegistry,
    y_name: Option<&'a str>,
    theme: &'a Theme,
    parser: &'a ColorParser,
}

impl<'a> FilesPanel<'a> {
    pub fn new(
        registry: &'a DatasetRegistry,
        y_name: Option<&'a str>,
        theme: &'a Theme,
        parser: &'a ColorParser,
    ) -> Self {
        Self {
            registry,
            y_name,
            theme,
            parser,
        }
    }
}

impl Widget for FilesPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.get("dimmed")))
            .title(format!(" Files ({}) ", self.registry.len()));
        let inner = block.inner(area);
        block.render(area, buf);

        if self.registry.is_empty() {
            Paragraph::new("No files loaded")
                .style(Style::default().fg(self.theme.get("dimmed")))
                .render(inner, buf);
            return;
        }

        let items: Vec<ListItem> = self
            .registry
            .iter()
            .map(|dataset| {
                let plotted = self
                    .y_name
                    .is_some_and(|name| find_column(dataset, name).is_some());
                let text_color = if plotted {
                    self.theme.get("text_primary")
                } else {
                    self.theme.get("dimmed")
                };
                let swatch = self
                    .parser
                    .parse(dataset.color())
                    .unwrap_or(self.theme.get("primary"));
                let mut spans = vec![
                    Span::styled("■ ", Style::default().fg(swatch)),
                    Span::styled(dataset.label(), Style::default().fg(text_color)),
                    Span::styled(
                        format!(" {} rows", dataset.table().height()),
                        Style::default().fg(self.theme.get("text_secondary")),
                    ),
                ];
                if let Some(source) = dataset.source().filter(|s| *s != dataset.label()) {
                    spans.push(Span::styled(
                        format!(" {source}"),
                        Style::default().fg(self.theme.get("text_secondary")),
                    ));
                }
                ListItem::new(Line::from(spans))
            })
            .collect();
        List::new(items).render(inner, buf);
    }
}

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, StatefulWidget, Widget},
};

use crate::axis::SelectionState;
use crate::config::Theme;

/// Y-name chooser. Rendered disabled when no names are available.
pub struct YSelector<'a> {
    selection: &'a SelectionState,
    theme: &'a Theme,
    focused: bool,
}

impl<'a> YSelector<'a> {
    pub fn new(selection: &'a SelectionState, theme: &'a Theme) -> Self {
        Self {
            selection,
            theme,
            focused: true,
        }
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }
}

impl Widget for YSelector<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let enabled = self.selection.is_enabled();
        let border = if enabled && self.focused {
            self.theme.get("modal_border")
        } else {
            self.theme.get("dimmed")
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(" Y axis ");
        let inner = block.inner(area);
        block.render(area, buf);

        if !enabled {
            Paragraph::new("(none)")
                .style(Style::default().fg(self.theme.get("dimmed")))
                .render(inner, buf);
            return;
        }

        let items: Vec<ListItem> = self
            .selection
            .available()
            .iter()
            .map(|name| {
                ListItem::new(Line::from(Span::styled(
                    name.as_str(),
                    Style::default().fg(self.theme.get("text_primary")),
                )))
            })
            .collect();
        let list = List::new(items)
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = ListState::default().with_selected(self.selection.current_index());
        StatefulWidget::render(list, inner, buf, &mut state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_selector_renders_placeholder() {
        let selection = SelectionState::default();
        let theme = Theme::default();
        let area = Rect::new(0, 0, 20, 5);
        let mut buf = Buffer::empty(area);
        YSelector::new(&selection, &theme).render(area, &mut buf);
        let text: String = buf.content.iter().map(|c| c.symbol()).collect();
        assert!(text.contains("(none)"));
    }
}

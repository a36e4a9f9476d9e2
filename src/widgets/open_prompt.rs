//! Single-line path prompt shown by `o`.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Clear, Widget},
};
use tui_textarea::{Input, Key, TextArea};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptEvent {
    None,
    /// Enter pressed; carries the trimmed text, possibly empty.
    Submit(String),
    Cancel,
}

pub struct OpenPrompt {
    textarea: TextArea<'static>,
    border: Color,
}

impl OpenPrompt {
    pub fn new() -> Self {
        Self {
            textarea: Self::fresh_textarea(),
            border: Color::Cyan,
        }
    }

    fn fresh_textarea() -> TextArea<'static> {
        let mut textarea = TextArea::default();
        textarea.set_cursor_line_style(Style::default());
        textarea.set_placeholder_text("path/to/file.csv");
        textarea
    }

    pub fn with_border(mut self, border: Color) -> Self {
        self.border = border;
        self
    }

    pub fn clear(&mut self) {
        self.textarea = Self::fresh_textarea();
    }

    pub fn value(&self) -> String {
        self.textarea.lines().join("").trim().to_string()
    }

    pub fn handle_key(&mut self, event: &KeyEvent) -> PromptEvent {
        match event.code {
            KeyCode::Esc => PromptEvent::Cancel,
            KeyCode::Enter => PromptEvent::Submit(self.value()),
            _ => {
                self.textarea.input(key_event_to_input(event));
                PromptEvent::None
            }
        }
    }
}

impl Default for OpenPrompt {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert crossterm KeyEvent to tui_textarea::Input
fn key_event_to_input(event: &KeyEvent) -> Input {
    let key = match event.code {
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Delete => Key::Delete,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::Tab | KeyCode::BackTab => Key::Tab,
        _ => Key::Null,
    };
    Input {
        key,
        ctrl: event.modifiers.contains(KeyModifiers::CONTROL),
        alt: event.modifiers.contains(KeyModifiers::ALT),
        shift: event.modifiers.contains(KeyModifiers::SHIFT),
    }
}

impl Widget for &OpenPrompt {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.border))
            .title(" Open file (Enter to load, Esc to cancel) ");
        let inner = block.inner(area);
        block.render(area, buf);
        self.textarea.render(inner, buf);
        // The cursor is drawn reversed; drop the underline tui-textarea adds.
        for x in inner.left()..inner.right() {
            for y in inner.top()..inner.bottom() {
                if let Some(cell) = buf.cell_mut((x, y)) {
                    cell.modifier.remove(Modifier::UNDERLINED);
                }
            }
        }
    }
}

// Popup panels drawn over the grid: filter and column pickers, the cell
// editor, help and the log viewer.

use ratatui::{
    prelude::*,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};

use crate::grid::display::checkbox;
use crate::grid::editor::CellEditor;
use crate::logging::LogEntry;
use tracing::Level;

/// One checkable entry of a picker panel
#[derive(Debug, Clone, PartialEq)]
pub struct PanelItem {
    pub value: String,
    pub label: String,
    pub checked: bool,
}

/// A checkbox list bound to one column (filter) or to the grid (columns)
#[derive(Debug, Clone)]
pub struct PickerPanel {
    pub title: String,
    pub column: Option<String>,
    pub items: Vec<PanelItem>,
    pub cursor: usize,
}

impl PickerPanel {
    pub fn move_cursor(&mut self, delta: isize) {
        if self.items.is_empty() {
            return;
        }
        let max = self.items.len() as isize - 1;
        self.cursor = (self.cursor as isize + delta).clamp(0, max) as usize;
    }

    pub fn current(&self) -> Option<&PanelItem> {
        self.items.get(self.cursor)
    }
}

/// A rectangle centred in `area`, sized as a percentage of it
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

pub fn render_picker(f: &mut Frame, area: Rect, panel: &PickerPanel, use_glyphs: bool) {
    let popup = centered_rect(40, 60, area);
    f.render_widget(Clear, popup);

    let items: Vec<ListItem> = panel
        .items
        .iter()
        .map(|item| ListItem::new(format!("{} {}", checkbox(item.checked, use_glyphs), item.label)))
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("{} (Space toggle, x clear, Esc close)", panel.title)),
        )
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select((!panel.items.is_empty()).then_some(panel.cursor));
    f.render_stateful_widget(list, popup, &mut state);
}

/// Select editors get a popup list; text editors draw inline in the table
pub fn render_editor(f: &mut Frame, area: Rect, title: &str, editor: &CellEditor, use_glyphs: bool) {
    let (options, cursor, multi) = match editor {
        CellEditor::Select { options, cursor } => (options, *cursor, false),
        CellEditor::MultiSelect { options, cursor, .. } => (options, *cursor, true),
        _ => return,
    };

    let popup = centered_rect(40, 50, area);
    f.render_widget(Clear, popup);

    let items: Vec<ListItem> = options
        .iter()
        .map(|opt| {
            if multi {
                ListItem::new(format!("{} {}", checkbox(editor.is_chosen(opt), use_glyphs), opt.label))
            } else {
                ListItem::new(opt.label.clone())
            }
        })
        .collect();

    let hint = if multi {
        "Space toggle, Esc done"
    } else {
        "Enter choose, Esc cancel"
    };
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("{} ({})", title, hint)),
        )
        .highlight_style(Style::default().bg(Color::Blue).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select((!options.is_empty()).then_some(cursor));
    f.render_stateful_widget(list, popup, &mut state);
}

pub fn help_text() -> Vec<Line<'static>> {
    let rows = [
        ("Navigation", ""),
        ("  ↑↓←→ / hjkl", "Move the cursor"),
        ("  PgUp/PgDn g/G", "Page, first and last row"),
        ("View", ""),
        ("  /", "Search all columns (Esc clears)"),
        ("  s", "Cycle sort on the current column"),
        ("  f", "Filter the current column"),
        ("  c", "Show or hide columns"),
        ("Editing", ""),
        ("  Enter / e", "Edit the current cell"),
        ("  Space", "Select or deselect the row"),
        ("  a", "Select or deselect all rows"),
        ("  o", "Open the row"),
        ("Data", ""),
        ("  x", "Export selected rows (or the view) to CSV"),
        ("  w", "Save accepted edits"),
        ("  L", "Log panel"),
        ("  q / Ctrl-C", "Quit"),
    ];
    rows.iter()
        .map(|(key, desc)| {
            if desc.is_empty() {
                Line::from(Span::styled(
                    key.to_string(),
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                ))
            } else {
                Line::from(vec![
                    Span::styled(format!("{:<18}", key), Style::default().fg(Color::Yellow)),
                    Span::raw(desc.to_string()),
                ])
            }
        })
        .collect()
}

pub fn render_help(f: &mut Frame, area: Rect, scroll: u16) {
    let popup = centered_rect(60, 80, area);
    f.render_widget(Clear, popup);
    let help = Paragraph::new(help_text())
        .block(Block::default().borders(Borders::ALL).title("Help (Esc to close)"))
        .scroll((scroll, 0));
    f.render_widget(help, popup);
}

fn level_color(level: Level) -> Color {
    match level {
        Level::ERROR => Color::Red,
        Level::WARN => Color::Yellow,
        Level::INFO => Color::Green,
        Level::DEBUG => Color::Cyan,
        Level::TRACE => Color::DarkGray,
    }
}

pub fn render_log(f: &mut Frame, area: Rect, entries: &[LogEntry], scroll: u16) {
    let popup = centered_rect(90, 80, area);
    f.render_widget(Clear, popup);

    let lines: Vec<Line> = entries
        .iter()
        .map(|entry| {
            Line::from(Span::styled(
                entry.format_for_display(),
                Style::default().fg(level_color(entry.level)),
            ))
        })
        .collect();

    let log = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Log ({} entries, Esc to close)", entries.len())),
        )
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    f.render_widget(log, popup);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_picker_cursor_clamps() {
        let mut panel = PickerPanel {
            title: "Columns".to_string(),
            column: None,
            items: vec![
                PanelItem {
                    value: "a".to_string(),
                    label: "A".to_string(),
                    checked: true,
                },
                PanelItem {
                    value: "b".to_string(),
                    label: "B".to_string(),
                    checked: false,
                },
            ],
            cursor: 0,
        };
        panel.move_cursor(5);
        assert_eq!(panel.current().map(|i| i.value.as_str()), Some("b"));
        panel.move_cursor(-5);
        assert_eq!(panel.cursor, 0);
    }

    #[test]
    fn test_centered_rect_inside_area() {
        let area = Rect::new(0, 0, 100, 50);
        let popup = centered_rect(40, 60, area);
        assert!(popup.x >= 30 && popup.right() <= 70);
        assert!(popup.y >= 10 && popup.bottom() <= 40);
    }
}

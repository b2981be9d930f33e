// Pure table rendering that depends only on GridRenderContext

use ratatui::{
    layout::Constraint,
    prelude::*,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
};

use crate::config::config::{IconConfig, ThemeColor};
use crate::grid::display::{checkbox, display_cell};
use crate::grid::view_state::SortDirection;
use crate::grid::DataGrid;

const MIN_COLUMN_WIDTH: u16 = 4;
const MAX_COLUMN_WIDTH: u16 = 40;

/// Everything needed to draw one frame of the grid
pub struct GridRenderContext {
    pub headers: Vec<String>,
    pub sort: Vec<Option<SortDirection>>,
    pub filtered: Vec<bool>,
    pub column_widths: Vec<u16>,

    /// Display text of the rows in the viewport
    pub rows: Vec<Vec<String>>,
    pub row_selected: Vec<bool>,
    pub row_offset: usize,
    pub total_rows: usize,

    /// Cursor relative to the viewport
    pub cursor_row: usize,
    pub cursor_col: usize,

    /// Text shown in place of the edited cell
    pub editing: Option<(usize, usize, String)>,

    pub footer: Option<Vec<String>>,
    pub selectable: bool,
    pub all_selected: bool,
    pub show_row_numbers: bool,
    pub striped: bool,
    pub use_glyphs: bool,
    pub icons: IconConfig,
    pub accent: ThemeColor,
    pub title: String,
}

impl GridRenderContext {
    /// Snapshot the grid rows in `[offset, offset + height)`
    pub fn build(
        grid: &DataGrid,
        offset: usize,
        height: usize,
        cursor: (usize, usize),
        edit_text: Option<String>,
    ) -> Self {
        let columns = grid.visible_columns();
        let state = grid.state();

        let headers: Vec<String> = columns.iter().map(|c| c.title().to_string()).collect();
        let sort = columns.iter().map(|c| state.sort.direction_for(&c.key)).collect();
        let filtered = columns
            .iter()
            .map(|c| grid.filter_values(&c.key).map(|v| !v.is_empty()).unwrap_or(false))
            .collect();

        let mut rows = Vec::new();
        let mut row_selected = Vec::new();
        for position in offset..(offset + height).min(grid.view_len()) {
            let Some(record) = grid.row_at(position) else {
                break;
            };
            rows.push(
                columns
                    .iter()
                    .map(|c| display_cell(c, record, position, grid.options().use_glyphs))
                    .collect::<Vec<_>>(),
            );
            row_selected.push(grid.is_selected(record.key()));
        }

        let column_widths = columns
            .iter()
            .enumerate()
            .map(|(i, c)| {
                c.width.unwrap_or_else(|| {
                    let content = rows
                        .iter()
                        .map(|r: &Vec<String>| r[i].chars().count())
                        .max()
                        .unwrap_or(0);
                    (content.max(headers[i].chars().count() + 2) as u16)
                        .clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH)
                })
            })
            .collect();

        let editing = edit_text.and_then(|text| {
            cursor
                .0
                .checked_sub(offset)
                .map(|row| (row, cursor.1, text))
        });

        let footer = grid.has_footer().then(|| grid.footer_values());

        Self {
            headers,
            sort,
            filtered,
            column_widths,
            rows,
            row_selected,
            row_offset: offset,
            total_rows: grid.view_len(),
            cursor_row: cursor.0.saturating_sub(offset),
            cursor_col: cursor.1,
            editing,
            footer,
            selectable: grid.options().selectable,
            all_selected: grid.all_selected(),
            show_row_numbers: false,
            striped: true,
            use_glyphs: grid.options().use_glyphs,
            icons: IconConfig::for_glyphs(grid.options().use_glyphs),
            accent: ThemeColor::Default,
            title: if state.has_active_filters() {
                format!("Rows ({} of {}, filtered)", grid.view_len(), grid.rows().len())
            } else {
                format!("Rows ({} of {})", grid.view_len(), grid.rows().len())
            },
        }
    }

    fn sort_indicator(&self, col: usize) -> String {
        match self.sort.get(col).copied().flatten() {
            Some(direction) => format!(" {}", self.icons.sort_icon(direction)),
            None => String::new(),
        }
    }
}

pub fn accent_color(accent: ThemeColor) -> Color {
    match accent {
        ThemeColor::Default => Color::Cyan,
        ThemeColor::Primary => Color::Blue,
        ThemeColor::Secondary => Color::Gray,
        ThemeColor::Success => Color::Green,
        ThemeColor::Warning => Color::Yellow,
        ThemeColor::Danger => Color::Red,
    }
}

/// Render the grid using only the provided context
pub fn render_grid(f: &mut Frame, area: Rect, ctx: &GridRenderContext) {
    if ctx.headers.is_empty() || ctx.total_rows == 0 {
        let message = if ctx.headers.is_empty() {
            "All columns are hidden (press 'c')"
        } else {
            "No data available"
        };
        let empty = Paragraph::new(message)
            .block(Block::default().borders(Borders::ALL).title(ctx.title.clone()))
            .style(Style::default().fg(Color::Yellow));
        f.render_widget(empty, area);
        return;
    }

    let header = build_header_row(ctx);
    let mut rows = build_data_rows(ctx);
    if let Some(footer) = build_footer_row(ctx) {
        rows.push(footer);
    }
    let widths = calculate_column_widths(ctx);

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(ctx.title.clone()),
        )
        .column_spacing(1);

    f.render_widget(table, area);
}

fn leading_cells(ctx: &GridRenderContext, number: Option<usize>, checked: Option<bool>) -> Vec<Cell<'static>> {
    let mut cells = Vec::new();
    if ctx.show_row_numbers {
        let text = number.map(|n| n.to_string()).unwrap_or_else(|| "#".to_string());
        cells.push(Cell::from(text).style(Style::default().fg(Color::DarkGray)));
    }
    if ctx.selectable {
        let text = checked
            .map(|c| checkbox(c, ctx.use_glyphs).to_string())
            .unwrap_or_default();
        cells.push(Cell::from(text));
    }
    cells
}

fn build_header_row(ctx: &GridRenderContext) -> Row<'static> {
    let accent = accent_color(ctx.accent);
    let mut header_cells = leading_cells(ctx, None, Some(ctx.all_selected));

    for (col, header) in ctx.headers.iter().enumerate() {
        let filter_mark = if ctx.filtered.get(col).copied().unwrap_or(false) {
            format!(" {}", ctx.icons.filter)
        } else {
            String::new()
        };

        let mut style = Style::default().fg(accent).add_modifier(Modifier::BOLD);
        if col == ctx.cursor_col {
            style = style.fg(Color::Yellow).add_modifier(Modifier::UNDERLINED);
        }

        header_cells.push(
            Cell::from(format!("{}{}{}", header, ctx.sort_indicator(col), filter_mark)).style(style),
        );
    }

    Row::new(header_cells)
}

fn build_data_rows(ctx: &GridRenderContext) -> Vec<Row<'static>> {
    ctx.rows
        .iter()
        .enumerate()
        .map(|(row_idx, row_data)| {
            let is_current_row = row_idx == ctx.cursor_row;
            let checked = ctx.row_selected.get(row_idx).copied().unwrap_or(false);
            let mut cells = leading_cells(ctx, Some(ctx.row_offset + row_idx + 1), Some(checked));

            for (col_idx, val) in row_data.iter().enumerate() {
                let editing = ctx
                    .editing
                    .as_ref()
                    .filter(|(r, c, _)| *r == row_idx && *c == col_idx);

                let cell = match editing {
                    Some((_, _, text)) => Cell::from(format!("{}▏", text)).style(
                        Style::default()
                            .bg(Color::Blue)
                            .fg(Color::White)
                            .add_modifier(Modifier::BOLD),
                    ),
                    None if is_current_row && col_idx == ctx.cursor_col => Cell::from(val.clone()).style(
                        Style::default()
                            .bg(Color::Yellow)
                            .fg(Color::Black)
                            .add_modifier(Modifier::BOLD),
                    ),
                    None => Cell::from(val.clone()),
                };
                cells.push(cell);
            }

            let row_style = if is_current_row {
                Style::default().bg(Color::DarkGray)
            } else if checked {
                Style::default().bg(Color::Rgb(30, 50, 30))
            } else if ctx.striped && row_idx % 2 == 1 {
                Style::default().bg(Color::Rgb(28, 28, 28))
            } else {
                Style::default()
            };

            Row::new(cells).style(row_style)
        })
        .collect()
}

fn build_footer_row(ctx: &GridRenderContext) -> Option<Row<'static>> {
    let footer = ctx.footer.as_ref()?;
    let mut cells = leading_cells(ctx, None, None);
    cells.extend(footer.iter().map(|text| Cell::from(text.clone())));
    Some(
        Row::new(cells)
            .style(Style::default().add_modifier(Modifier::BOLD).fg(Color::Magenta))
            .top_margin(1),
    )
}

fn calculate_column_widths(ctx: &GridRenderContext) -> Vec<Constraint> {
    let mut widths: Vec<Constraint> = Vec::new();

    if ctx.show_row_numbers {
        widths.push(Constraint::Length(6));
    }
    if ctx.selectable {
        widths.push(Constraint::Length(3));
    }
    widths.extend(ctx.column_widths.iter().map(|&w| Constraint::Length(w)));

    widths
}

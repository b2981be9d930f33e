use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    prelude::*,
    widgets::{Block, Borders, Paragraph},
    Terminal,
};
use std::collections::BTreeSet;
use std::io;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use tui_input::backend::crossterm::EventHandler;
use tui_input::Input;

use crate::config::Config;
use crate::data::exporter::{DataExporter, ExportColumn};
use crate::data::record::Record;
use crate::grid::editor::CellEditor;
use crate::grid::DataGrid;
use crate::logging::{get_log_buffer, LogRingBuffer};
use crate::tooltip::{Placement, TooltipCoordinator};
use crate::ui::actions::{apply_navigation, Action, AppMode, NavigateAction};
use crate::ui::key_mapper::KeyMapper;
use crate::ui::panels::{self, PanelItem, PickerPanel};
use crate::ui::store::RecordStore;
use crate::ui::table_renderer::{accent_color, render_grid, GridRenderContext};

const STATUS_TIP: &str = "status";

/// Kind of transient status message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Notice {
    Info,
    Success,
    Error,
}

/// Cap on distinct values offered when a column has no filter options
const MAX_DERIVED_FILTER_VALUES: usize = 50;

/// Lines taken by the table border, header and footer
fn table_chrome(has_footer: bool) -> u16 {
    if has_footer {
        5
    } else {
        3
    }
}

pub struct GridApp {
    grid: DataGrid,
    store: RecordStore,
    config: Config,
    key_mapper: KeyMapper,
    mode: AppMode,

    cursor_row: usize,
    cursor_col: usize,
    row_offset: usize,
    viewport_height: usize,

    search_input: Input,
    picker: Option<PickerPanel>,
    scroll: u16,

    tooltips: TooltipCoordinator,
    status: String,
    notice: Notice,
    log_buffer: LogRingBuffer,
}

impl GridApp {
    pub fn new(grid: DataGrid, store: RecordStore, config: Config) -> Self {
        let tooltips = TooltipCoordinator::new(Duration::from_millis(config.behavior.auto_hide_ms));
        Self {
            grid,
            store,
            config,
            key_mapper: KeyMapper::new(),
            mode: AppMode::Grid,
            cursor_row: 0,
            cursor_col: 0,
            row_offset: 0,
            viewport_height: 20,
            search_input: Input::default(),
            picker: None,
            scroll: 0,
            tooltips,
            status: String::new(),
            notice: Notice::Info,
            log_buffer: get_log_buffer(),
        }
    }

    pub fn grid(&self) -> &DataGrid {
        &self.grid
    }

    pub fn mode(&self) -> AppMode {
        self.mode
    }

    pub fn run(mut self) -> Result<()> {
        if let Err(e) = enable_raw_mode() {
            return Err(anyhow::anyhow!("Failed to enable raw mode: {}", e));
        }

        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(anyhow::anyhow!("Failed to setup terminal: {}", e));
        }

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = match Terminal::new(backend) {
            Ok(t) => t,
            Err(e) => {
                let _ = disable_raw_mode();
                return Err(anyhow::anyhow!("Failed to create terminal: {}", e));
            }
        };

        let res = self.run_app(&mut terminal);

        // Always restore terminal, even on error
        let _ = disable_raw_mode();
        let _ = execute!(terminal.backend_mut(), LeaveAlternateScreen);
        let _ = terminal.show_cursor();

        if self.store.is_dirty() {
            warn!(target: "ui", "Quit with unsaved edits");
        }

        res.map_err(|e| anyhow::anyhow!("TUI error: {}", e))
    }

    fn run_app<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        info!(target: "ui", "Grid opened with {} rows", self.grid.rows().len());
        terminal.draw(|f| self.ui(f))?;

        loop {
            if event::poll(Duration::from_millis(50))? {
                match event::read()? {
                    Event::Key(key) => {
                        // Only handle key presses; some platforms also report releases
                        if key.kind != KeyEventKind::Press {
                            continue;
                        }

                        if self.handle_key(key)? {
                            break;
                        }
                        terminal.draw(|f| self.ui(f))?;
                    }
                    Event::Resize(_, _) => {
                        terminal.draw(|f| self.ui(f))?;
                    }
                    _ => {}
                }
            } else if self.tooltips.tick(Instant::now()) {
                terminal.draw(|f| self.ui(f))?;
            }
        }

        Ok(())
    }

    // ---- input ---------------------------------------------------------

    /// Returns true when the app should exit
    pub fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        let exit = match self.mode {
            AppMode::Grid | AppMode::Help | AppMode::Log => match self.key_mapper.map_key(key, self.mode) {
                Some(action) => self.handle_action(action)?,
                None => false,
            },
            AppMode::Search => self.handle_search_input(key),
            AppMode::Edit => self.handle_edit_input(key),
            AppMode::FilterPanel | AppMode::ColumnPanel => self.handle_picker_input(key),
        };

        self.sync_events();
        Ok(exit)
    }

    fn handle_action(&mut self, action: Action) -> Result<bool> {
        debug!(target: "ui", "Action {:?} in {:?}", action, self.mode);

        match action {
            Action::Quit | Action::ForceQuit => return Ok(true),
            Action::Navigate(nav) => self.navigate(&nav),
            Action::ExitCurrentMode => self.mode = AppMode::Grid,
            Action::ShowHelp => {
                self.scroll = 0;
                self.mode = AppMode::Help;
            }
            Action::ShowLog => {
                self.scroll = 0;
                self.mode = AppMode::Log;
            }
            Action::StartSearch => {
                if self.grid.options().searchable {
                    self.search_input = Input::new(self.grid.search_term().to_string());
                    self.mode = AppMode::Search;
                }
            }
            Action::ClearSearch => {
                if !self.grid.search_term().is_empty() {
                    self.keep_cursor_row(|grid| grid.set_search(""));
                }
            }
            Action::SortColumn => self.sort_current_column(),
            Action::OpenFilterPanel => self.open_filter_panel(),
            Action::OpenColumnPanel => self.open_column_panel(),
            Action::BeginEdit => self.begin_edit(),
            Action::ToggleRowSelection => {
                if !self.grid.options().selectable {
                    self.notify("Row selection is disabled", Notice::Info);
                } else if let Some(key) = self.current_key() {
                    self.grid.toggle_row_selected(&key);
                }
            }
            Action::ToggleSelectAll => {
                if self.grid.options().selectable {
                    let all = self.grid.all_selected();
                    self.grid.select_all(!all);
                }
            }
            Action::ActivateRow => {
                if let Some(key) = self.current_key() {
                    self.grid.click_row(&key);
                }
            }
            Action::ExportSelection => self.export_rows(),
            Action::SaveData => match self.store.save() {
                Ok(path) => self.notify(&format!("Saved to {}", path.display()), Notice::Success),
                Err(e) => self.notify(&format!("Save failed: {}", e), Notice::Error),
            },
        }

        Ok(false)
    }

    fn handle_search_input(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Enter => self.mode = AppMode::Grid,
            KeyCode::Esc => {
                self.search_input.reset();
                self.keep_cursor_row(|grid| grid.set_search(""));
                self.mode = AppMode::Grid;
            }
            _ => {
                self.search_input.handle_event(&Event::Key(key));
                let term = self.search_input.value().to_string();
                self.keep_cursor_row(|grid| grid.set_search(term));
            }
        }
        false
    }

    fn handle_edit_input(&mut self, key: KeyEvent) -> bool {
        let Some(editor) = self.grid.editor_mut() else {
            self.mode = AppMode::Grid;
            return false;
        };

        match editor {
            CellEditor::Text { input, .. } => match key.code {
                KeyCode::Enter | KeyCode::Tab => {
                    if let Err(e) = self.grid.commit_edit() {
                        self.notify(&e.to_string(), Notice::Error);
                    }
                }
                KeyCode::Esc => self.grid.cancel_edit(),
                _ => {
                    input.handle_event(&Event::Key(key));
                }
            },
            CellEditor::Select { .. } => match key.code {
                KeyCode::Up | KeyCode::Char('k') => editor.move_cursor(-1),
                KeyCode::Down | KeyCode::Char('j') => editor.move_cursor(1),
                KeyCode::Enter | KeyCode::Char(' ') => {
                    self.grid.choose_highlighted();
                }
                KeyCode::Esc => self.grid.cancel_edit(),
                _ => {}
            },
            CellEditor::MultiSelect { .. } => match key.code {
                KeyCode::Up | KeyCode::Char('k') => editor.move_cursor(-1),
                KeyCode::Down | KeyCode::Char('j') => editor.move_cursor(1),
                KeyCode::Enter | KeyCode::Char(' ') => {
                    self.grid.choose_highlighted();
                }
                KeyCode::Esc => self.grid.close_editor(),
                _ => {}
            },
            CellEditor::Checkbox { .. } => {
                self.grid.toggle_checkbox();
            }
        }

        if self.grid.editing().is_none() {
            self.mode = AppMode::Grid;
        }
        false
    }

    fn handle_picker_input(&mut self, key: KeyEvent) -> bool {
        let Some(panel) = self.picker.as_mut() else {
            self.mode = AppMode::Grid;
            return false;
        };

        match key.code {
            KeyCode::Up | KeyCode::Char('k') => panel.move_cursor(-1),
            KeyCode::Down | KeyCode::Char('j') => panel.move_cursor(1),
            KeyCode::Esc | KeyCode::Char('q') => {
                self.picker = None;
                self.mode = AppMode::Grid;
            }
            KeyCode::Char(' ') | KeyCode::Enter => {
                let Some(item) = panel.current().cloned() else {
                    return false;
                };
                match (self.mode, panel.column.clone()) {
                    (AppMode::FilterPanel, Some(column)) => {
                        self.keep_cursor_row(|grid| {
                            grid.toggle_filter_value(&column, &item.value);
                        });
                    }
                    (AppMode::ColumnPanel, _) => {
                        self.grid.toggle_column(&item.value);
                    }
                    _ => {}
                }
                self.refresh_picker();
            }
            KeyCode::Char('x') => {
                match (self.mode, panel.column.clone()) {
                    (AppMode::FilterPanel, Some(column)) => {
                        self.keep_cursor_row(|grid| {
                            grid.clear_filter(&column);
                        });
                    }
                    (AppMode::ColumnPanel, _) => self.grid.show_all_columns(),
                    _ => {}
                }
                self.refresh_picker();
            }
            _ => {}
        }

        self.clamp_cursor();
        false
    }

    // ---- grid operations -----------------------------------------------

    fn current_key(&self) -> Option<String> {
        self.grid.row_at(self.cursor_row).map(|r| r.key().to_string())
    }

    fn current_column(&self) -> Option<String> {
        self.grid
            .visible_columns()
            .get(self.cursor_col)
            .map(|c| c.key.clone())
    }

    /// Run a view change and keep the cursor on the same record if it survives
    fn keep_cursor_row<F: FnOnce(&mut DataGrid)>(&mut self, change: F) {
        let key = self.current_key();
        change(&mut self.grid);
        if let Some(position) = key.and_then(|k| self.grid.position_of(&k)) {
            self.cursor_row = position;
        }
        self.clamp_cursor();
    }

    fn clamp_cursor(&mut self) {
        self.cursor_row = self.cursor_row.min(self.grid.view_len().saturating_sub(1));
        self.cursor_col = self
            .cursor_col
            .min(self.grid.visible_columns().len().saturating_sub(1));
    }

    fn navigate(&mut self, nav: &NavigateAction) {
        match self.mode {
            AppMode::Help | AppMode::Log => {
                self.scroll = match nav {
                    NavigateAction::Up(n) => self.scroll.saturating_sub(*n as u16),
                    NavigateAction::Down(n) => self.scroll.saturating_add(*n as u16),
                    NavigateAction::PageUp => self.scroll.saturating_sub(10),
                    NavigateAction::PageDown => self.scroll.saturating_add(10),
                    _ => self.scroll,
                };
            }
            _ => {
                let (row, col) = apply_navigation(
                    nav,
                    self.cursor_row,
                    self.cursor_col,
                    self.grid.view_len(),
                    self.grid.visible_columns().len(),
                    self.viewport_height,
                );
                self.cursor_row = row;
                self.cursor_col = col;
            }
        }
    }

    fn sort_current_column(&mut self) {
        let Some(column) = self.current_column() else {
            return;
        };
        let mut sorted = false;
        self.keep_cursor_row(|grid| sorted = grid.click_header(&column));
        if !sorted {
            self.notify(&format!("Column '{}' is not sortable", column), Notice::Info);
        }
    }

    fn begin_edit(&mut self) {
        let (Some(key), Some(column)) = (self.current_key(), self.current_column()) else {
            return;
        };
        if !self.grid.begin_edit(&key, &column) {
            self.notify(&format!("Column '{}' is not editable", column), Notice::Info);
            return;
        }
        // Checkboxes commit on the first toggle
        if matches!(self.grid.editing().map(|s| &s.editor), Some(CellEditor::Checkbox { .. })) {
            self.grid.toggle_checkbox();
            return;
        }
        self.mode = AppMode::Edit;
    }

    fn filter_items(&self, column: &str) -> Vec<PanelItem> {
        let active = self.grid.filter_values(column);
        let checked = |value: &str| active.map(|set| set.contains(value)).unwrap_or(false);

        let Some(spec) = self.grid.column(column) else {
            return Vec::new();
        };
        if !spec.filter_options.is_empty() {
            return spec
                .filter_options
                .iter()
                .map(|opt| PanelItem {
                    value: opt.value.clone(),
                    label: opt.label.clone(),
                    checked: checked(&opt.value),
                })
                .collect();
        }

        // No declared options: offer the distinct values present in the data
        let distinct: BTreeSet<String> = self
            .grid
            .rows()
            .iter()
            .map(|r| r.value(column))
            .filter(|v| !v.is_empty())
            .map(|v| v.to_string())
            .take(MAX_DERIVED_FILTER_VALUES * 4)
            .collect();
        distinct
            .into_iter()
            .take(MAX_DERIVED_FILTER_VALUES)
            .map(|value| PanelItem {
                checked: checked(&value),
                label: value.clone(),
                value,
            })
            .collect()
    }

    fn open_filter_panel(&mut self) {
        let Some(column) = self.current_column() else {
            return;
        };
        let filterable = self.grid.column(&column).map(|c| c.filterable).unwrap_or(false);
        if !filterable {
            self.notify(&format!("Column '{}' is not filterable", column), Notice::Info);
            return;
        }

        let title = self
            .grid
            .column(&column)
            .map(|c| format!("Filter {}", c.title()))
            .unwrap_or_default();
        self.picker = Some(PickerPanel {
            title,
            items: self.filter_items(&column),
            column: Some(column),
            cursor: 0,
        });
        self.mode = AppMode::FilterPanel;
    }

    fn column_items(&self) -> Vec<PanelItem> {
        self.grid
            .columns()
            .iter()
            .map(|c| PanelItem {
                value: c.key.clone(),
                label: c.title().to_string(),
                checked: self.grid.is_column_visible(&c.key),
            })
            .collect()
    }

    fn open_column_panel(&mut self) {
        self.picker = Some(PickerPanel {
            title: "Columns".to_string(),
            column: None,
            items: self.column_items(),
            cursor: 0,
        });
        self.mode = AppMode::ColumnPanel;
    }

    fn refresh_picker(&mut self) {
        let items = match (self.mode, self.picker.as_ref().and_then(|p| p.column.clone())) {
            (AppMode::FilterPanel, Some(column)) => self.filter_items(&column),
            (AppMode::ColumnPanel, _) => self.column_items(),
            _ => return,
        };
        if let Some(panel) = self.picker.as_mut() {
            panel.items = items;
            panel.cursor = panel.cursor.min(panel.items.len().saturating_sub(1));
        }
    }

    /// Selected rows, or the whole view when nothing is selected
    fn export_rows(&mut self) {
        let selected = self.grid.selected_rows();
        let rows: Vec<&Record> = if selected.is_empty() {
            self.grid.view_rows()
        } else {
            selected
        };
        let columns: Vec<ExportColumn> = self
            .grid
            .visible_columns()
            .iter()
            .map(|c| ExportColumn::new(c.key.clone(), c.title()))
            .collect();

        let path = DataExporter::default_file_name("s42_export", "csv");
        let (message, notice) = match DataExporter::export_csv(&path, &columns, &rows) {
            Ok(message) => (message, Notice::Success),
            Err(e) => (format!("Export failed: {}", e), Notice::Error),
        };
        self.notify(&message, notice);
    }

    /// Deliver grid events to the store and report refused edits
    fn sync_events(&mut self) {
        let rejected = self.grid.dispatch(&mut self.store);
        for (id, error) in rejected {
            warn!(target: "ui", "Edit {:?} rolled back: {}", id, error);
            self.notify(&format!("Edit refused: {}", error), Notice::Error);
        }
        self.clamp_cursor();
    }

    fn notify(&mut self, message: &str, notice: Notice) {
        let placement = if notice == Notice::Error {
            Placement::BottomLeft
        } else {
            Placement::BottomRight
        };
        self.status = message.to_string();
        self.notice = notice;
        self.tooltips.show(STATUS_TIP, placement, Instant::now());
    }

    // ---- rendering -----------------------------------------------------

    fn ui(&mut self, f: &mut Frame) {
        let searchable = self.grid.options().searchable;
        let constraints = if searchable {
            vec![Constraint::Length(3), Constraint::Min(5), Constraint::Length(1)]
        } else {
            vec![Constraint::Min(5), Constraint::Length(1)]
        };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(f.area());

        let (table_area, status_area) = if searchable {
            self.render_search(f, chunks[0]);
            (chunks[1], chunks[2])
        } else {
            (chunks[0], chunks[1])
        };

        let has_footer = self.config.display.show_footer && self.grid.has_footer();
        self.viewport_height = table_area.height.saturating_sub(table_chrome(has_footer)).max(1) as usize;
        self.scroll_to_cursor();

        let edit_text = self.grid.editing().and_then(|s| s.editor.input()).map(|i| i.value().to_string());
        let mut ctx = GridRenderContext::build(
            &self.grid,
            self.row_offset,
            self.viewport_height,
            (self.cursor_row, self.cursor_col),
            edit_text,
        );
        ctx.show_row_numbers = self.config.display.show_row_numbers;
        ctx.striped = self.config.display.striped;
        ctx.accent = self.config.theme.color;
        ctx.icons = self.config.display.icons.clone();
        if !has_footer {
            ctx.footer = None;
        }
        render_grid(f, table_area, &ctx);

        self.render_status(f, status_area);

        let use_glyphs = self.config.display.use_glyphs;
        match self.mode {
            AppMode::FilterPanel | AppMode::ColumnPanel => {
                if let Some(panel) = &self.picker {
                    panels::render_picker(f, table_area, panel, use_glyphs);
                }
            }
            AppMode::Edit => {
                if let Some(session) = self.grid.editing() {
                    let title = self
                        .grid
                        .column(&session.target.column)
                        .map(|c| c.title().to_string())
                        .unwrap_or_default();
                    panels::render_editor(f, table_area, &title, &session.editor, use_glyphs);
                }
            }
            AppMode::Help => panels::render_help(f, f.area(), self.scroll),
            AppMode::Log => {
                let entries = self.log_buffer.get_recent(500);
                panels::render_log(f, f.area(), &entries, self.scroll);
            }
            _ => {}
        }
    }

    fn scroll_to_cursor(&mut self) {
        if self.cursor_row < self.row_offset {
            self.row_offset = self.cursor_row;
        } else if self.cursor_row >= self.row_offset + self.viewport_height {
            self.row_offset = self.cursor_row + 1 - self.viewport_height;
        }
    }

    fn render_search(&self, f: &mut Frame, area: Rect) {
        let active = self.mode == AppMode::Search;
        let text = if active {
            self.search_input.value().to_string()
        } else {
            self.grid.search_term().to_string()
        };
        let style = if active {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(accent_color(self.config.theme.color))
        };
        let search = Paragraph::new(text)
            .style(style)
            .block(Block::default().borders(Borders::ALL).title("Search (/)"));
        f.render_widget(search, area);

        if active {
            let width = area.width.saturating_sub(2) as usize;
            let scroll = self.search_input.visual_scroll(width);
            let x = self.search_input.visual_cursor().saturating_sub(scroll) as u16;
            f.set_cursor_position((area.x + 1 + x, area.y + 1));
        }
    }

    fn render_status(&self, f: &mut Frame, area: Rect) {
        let mode = format!("[{:?}]", self.mode);
        let mut left = vec![
            Span::styled(mode, Style::default().fg(Color::Black).bg(accent_color(self.config.theme.color))),
            Span::raw(format!(" {} rows", self.grid.view_len())),
        ];
        if let Some(summary) = self.grid.selection_summary() {
            left.push(Span::styled(format!(" | {}", summary), Style::default().fg(Color::Green)));
        }
        let icons = &self.config.display.icons;
        if self.store.is_dirty() {
            left.push(Span::styled(
                format!(" | {} unsaved", icons.warning),
                Style::default().fg(Color::Yellow),
            ));
        }

        let shown = self.tooltips.is_visible(STATUS_TIP);
        let (message, alignment) = match (shown, self.notice) {
            (false, _) => (Line::from("? help"), Alignment::Right),
            (true, Notice::Error) => (
                Line::from(Span::styled(
                    format!("{} {}", icons.error, self.status),
                    Style::default().fg(Color::Red),
                )),
                Alignment::Left,
            ),
            (true, Notice::Success) => (
                Line::from(Span::styled(
                    format!("{} {}", icons.success, self.status),
                    Style::default().fg(Color::Green),
                )),
                Alignment::Right,
            ),
            (true, Notice::Info) => (
                Line::from(Span::styled(
                    format!("{} {}", icons.info, self.status),
                    Style::default().fg(Color::Cyan),
                )),
                Alignment::Right,
            ),
        };

        let halves = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area);

        if alignment == Alignment::Left {
            f.render_widget(Paragraph::new(message), halves[0]);
            f.render_widget(Paragraph::new(Line::from(left)).alignment(Alignment::Right), halves[1]);
        } else {
            f.render_widget(Paragraph::new(Line::from(left)), halves[0]);
            f.render_widget(Paragraph::new(message).alignment(Alignment::Right), halves[1]);
        }
    }
}

/// Open the interactive grid and block until the user quits
pub fn run_grid_tui(grid: DataGrid, store: RecordStore, config: Config) -> Result<()> {
    GridApp::new(grid, store, config).run()
}
